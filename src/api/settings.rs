use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{CoordinatePolicy, DefaultLocation};
use crate::error::{StarMapError, StarMapResult};
use crate::render::RenderOptions;

use super::CapturePolicy;

pub const DEFAULT_CONTAINER_ID: &str = "celestial-map";
pub const DEFAULT_FILENAME_PREFIX: &str = "star-map";

/// Controller configuration.
///
/// Serializable so hosts can keep map setup in a JSON file; every field has a
/// serde default, so partial documents load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarMapSettings {
    #[serde(default)]
    pub default_location: DefaultLocation,
    #[serde(default)]
    pub render: RenderOptions,
    #[serde(default = "default_container_id")]
    pub container_id: String,
    #[serde(default)]
    pub capture: CapturePolicy,
    #[serde(default)]
    pub coordinate_policy: CoordinatePolicy,
    #[serde(default = "default_filename_prefix")]
    pub filename_prefix: String,
}

fn default_container_id() -> String {
    DEFAULT_CONTAINER_ID.to_owned()
}

fn default_filename_prefix() -> String {
    DEFAULT_FILENAME_PREFIX.to_owned()
}

impl Default for StarMapSettings {
    fn default() -> Self {
        Self {
            default_location: DefaultLocation::default(),
            render: RenderOptions::default(),
            container_id: default_container_id(),
            capture: CapturePolicy::default(),
            coordinate_policy: CoordinatePolicy::default(),
            filename_prefix: default_filename_prefix(),
        }
    }
}

impl StarMapSettings {
    /// Sets the capture policy.
    #[must_use]
    pub fn with_capture_policy(mut self, capture: CapturePolicy) -> Self {
        self.capture = capture;
        self
    }

    /// Sets how coordinate text is validated before rendering.
    #[must_use]
    pub fn with_coordinate_policy(mut self, policy: CoordinatePolicy) -> Self {
        self.coordinate_policy = policy;
        self
    }

    #[must_use]
    pub fn with_render_options(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    pub fn validate(&self) -> StarMapResult<()> {
        if !self.render.canvas.is_valid() {
            return Err(StarMapError::InvalidSettings(format!(
                "canvas must be non-empty: {}x{}",
                self.render.canvas.width, self.render.canvas.height
            )));
        }
        if !self.render.background.opacity.is_finite()
            || !(0.0..=1.0).contains(&self.render.background.opacity)
        {
            return Err(StarMapError::InvalidSettings(
                "background opacity must be within [0, 1]".to_owned(),
            ));
        }
        if self.container_id.trim().is_empty() {
            return Err(StarMapError::InvalidSettings(
                "container id must not be empty".to_owned(),
            ));
        }
        if self.filename_prefix.contains(['/', '\\']) {
            return Err(StarMapError::InvalidSettings(
                "filename prefix must not contain path separators".to_owned(),
            ));
        }
        self.capture.validate()
    }

    pub fn from_json_str(input: &str) -> StarMapResult<Self> {
        let settings: Self = serde_json::from_str(input).map_err(|e| {
            StarMapError::InvalidSettings(format!("failed to parse settings json: {e}"))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> StarMapResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    pub fn to_json_pretty(&self) -> StarMapResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            StarMapError::InvalidSettings(format!("failed to serialize settings: {e}"))
        })
    }
}
