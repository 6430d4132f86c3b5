//! night-sky-rs: star map generation controller.
//!
//! A form (date, time, latitude, longitude) is turned into a typed
//! configuration for an external celestial renderer; the rendered SVG scene
//! is captured from the render surface and exported as a downloadable
//! artifact. Renderer, surface, blob registry and download sink are traits so
//! the same controller runs in a browser (`web` feature) or headless.

pub mod api;
pub mod core;
pub mod error;
pub mod render;
pub mod telemetry;

#[cfg(feature = "web")]
pub mod platform_web;

pub use api::{StarMapController, StarMapSettings};
pub use error::{StarMapError, StarMapResult};
