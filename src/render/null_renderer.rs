use crate::error::StarMapResult;
use crate::render::{CelestialConfig, CelestialRenderer, RenderSurface};

/// Renderer that accepts every config and draws nothing.
///
/// Used by tests and dry runs; since no scene is ever mounted, capture
/// against it always ends in the failure path.
#[derive(Debug)]
pub struct NullRenderer {
    pub loaded: bool,
    pub display_count: usize,
    pub last_config: Option<CelestialConfig>,
}

impl Default for NullRenderer {
    fn default() -> Self {
        Self {
            loaded: true,
            display_count: 0,
            last_config: None,
        }
    }
}

impl NullRenderer {
    /// A renderer whose script never finished loading.
    #[must_use]
    pub fn unloaded() -> Self {
        Self {
            loaded: false,
            ..Self::default()
        }
    }
}

impl CelestialRenderer for NullRenderer {
    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn display(
        &mut self,
        config: &CelestialConfig,
        _surface: &mut dyn RenderSurface,
    ) -> StarMapResult<()> {
        self.display_count += 1;
        self.last_config = Some(config.clone());
        Ok(())
    }
}
