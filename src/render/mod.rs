mod config;
mod container;
mod null_renderer;
mod scene;
mod sky_renderer;

pub use config::{
    Background, CanvasSize, CelestialConfig, CoordinateFrame, FollowMode, OverlayVisibility,
    Projection, RenderOptions,
};
pub use container::SceneContainer;
pub use null_renderer::NullRenderer;
pub use scene::{SVG_NAMESPACE, SceneNode, escape_xml};
pub use sky_renderer::SkyRenderer;

use crate::error::StarMapResult;

/// Element the renderer draws into.
///
/// In a browser this is a DOM container located by id; headless hosts use
/// [`SceneContainer`].
pub trait RenderSurface {
    fn container_id(&self) -> String;

    fn assign_container_id(&mut self, id: &str);

    /// Removes everything previously drawn.
    fn clear(&mut self);

    /// Places a scene built natively (renderers that do not own the DOM).
    fn mount(&mut self, scene: SceneNode) -> StarMapResult<()>;

    /// Serializes the first `svg` element in document order, if any.
    fn capture_scene(&mut self) -> StarMapResult<Option<String>>;
}

/// External star-chart renderer, injected into the controller.
///
/// Implementations receive a fully built [`CelestialConfig`] and draw into
/// the surface, directly or through a container id lookup of their own.
pub trait CelestialRenderer {
    /// Whether the renderer can be invoked right now.
    fn is_loaded(&self) -> bool {
        true
    }

    fn display(
        &mut self,
        config: &CelestialConfig,
        surface: &mut dyn RenderSurface,
    ) -> StarMapResult<()>;
}
