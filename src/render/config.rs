use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::core::{CoordinatePolicy, FormState, GeoLocation, observation_instant};
use crate::error::{StarMapError, StarMapResult};

/// Map projection names understood by the celestial renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Projection {
    Airy,
    Aitoff,
    AzimuthalEqualArea,
    AzimuthalEquidistant,
    #[default]
    Equirectangular,
    Hammer,
    Mercator,
    Mollweide,
    Orthographic,
    Stereographic,
}

impl Projection {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Projection::Airy => "airy",
            Projection::Aitoff => "aitoff",
            Projection::AzimuthalEqualArea => "azimuthalEqualArea",
            Projection::AzimuthalEquidistant => "azimuthalEquidistant",
            Projection::Equirectangular => "equirectangular",
            Projection::Hammer => "hammer",
            Projection::Mercator => "mercator",
            Projection::Mollweide => "mollweide",
            Projection::Orthographic => "orthographic",
            Projection::Stereographic => "stereographic",
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Coordinate frame the sky is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateFrame {
    #[default]
    Equatorial,
    Ecliptic,
    Galactic,
    Supergalactic,
}

impl CoordinateFrame {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            CoordinateFrame::Equatorial => "equatorial",
            CoordinateFrame::Ecliptic => "ecliptic",
            CoordinateFrame::Galactic => "galactic",
            CoordinateFrame::Supergalactic => "supergalactic",
        }
    }
}

/// What the view center tracks once a location and instant are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowMode {
    #[default]
    Zenith,
    Center,
}

impl FollowMode {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            FollowMode::Zenith => "zenith",
            FollowMode::Center => "center",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Background {
    pub fill: String,
    pub opacity: f64,
}

impl Default for Background {
    fn default() -> Self {
        Self {
            fill: "#000".to_owned(),
            opacity: 1.0,
        }
    }
}

/// Show/hide flags for the renderer's overlay layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayVisibility {
    pub stars: bool,
    pub dsos: bool,
    pub constellations: bool,
    pub milky_way: bool,
}

impl Default for OverlayVisibility {
    fn default() -> Self {
        Self {
            stars: true,
            dsos: true,
            constellations: true,
            milky_way: true,
        }
    }
}

/// Fixed visual options shared by every render request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    #[serde(default = "default_canvas")]
    pub canvas: CanvasSize,
    #[serde(default)]
    pub projection: Projection,
    #[serde(default)]
    pub transform: CoordinateFrame,
    #[serde(default)]
    pub center: [f64; 2],
    #[serde(default = "default_datapath")]
    pub datapath: String,
    #[serde(default)]
    pub background: Background,
    #[serde(default)]
    pub overlays: OverlayVisibility,
    #[serde(default)]
    pub follow: FollowMode,
}

fn default_canvas() -> CanvasSize {
    CanvasSize::new(600, 800)
}

fn default_datapath() -> String {
    "/data/".to_owned()
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            canvas: default_canvas(),
            projection: Projection::default(),
            transform: CoordinateFrame::default(),
            center: [0.0, 0.0],
            datapath: default_datapath(),
            background: Background::default(),
            overlays: OverlayVisibility::default(),
            follow: FollowMode::default(),
        }
    }
}

/// Complete input for one renderer invocation.
///
/// Built fresh from the form on every render request and dropped afterwards;
/// the renderer only ever sees this typed value or its boundary conversion
/// from [`CelestialConfig::to_renderer_value`].
#[derive(Debug, Clone, PartialEq)]
pub struct CelestialConfig {
    pub options: RenderOptions,
    pub container: String,
    pub location: GeoLocation,
    /// `None` is an invalid instant: the form's date/time did not combine.
    pub date: Option<DateTime<Utc>>,
}

impl CelestialConfig {
    pub fn build(
        form: &FormState,
        options: &RenderOptions,
        container: &str,
        policy: CoordinatePolicy,
    ) -> StarMapResult<Self> {
        if !options.canvas.is_valid() {
            return Err(StarMapError::InvalidSettings(format!(
                "canvas must be non-empty: {}x{}",
                options.canvas.width, options.canvas.height
            )));
        }
        Ok(Self {
            options: options.clone(),
            container: container.to_owned(),
            location: GeoLocation::resolve(form, policy)?,
            date: observation_instant(&form.date, &form.time),
        })
    }

    /// Converts to the renderer's untyped configuration object.
    ///
    /// NaN coordinates and an invalid instant both serialize as `null`.
    #[must_use]
    pub fn to_renderer_value(&self) -> Value {
        let options = &self.options;
        json!({
            "width": options.canvas.width,
            "height": options.canvas.height,
            "projection": options.projection.name(),
            "transform": options.transform.name(),
            "center": options.center,
            "datapath": options.datapath,
            "container": self.container,
            "background": {
                "fill": options.background.fill,
                "opacity": options.background.opacity,
            },
            "stars": { "show": options.overlays.stars },
            "dsos": { "show": options.overlays.dsos },
            "constellations": { "show": options.overlays.constellations },
            "mw": { "show": options.overlays.milky_way },
            "location": {
                "lat": self.location.lat,
                "lon": self.location.lon,
            },
            "date": self.date.map(|date| date.to_rfc3339_opts(SecondsFormat::Millis, true)),
            "follow": options.follow.name(),
        })
    }

    pub fn to_renderer_json_pretty(&self) -> StarMapResult<String> {
        serde_json::to_string_pretty(&self.to_renderer_value()).map_err(|e| {
            StarMapError::Render(format!("failed to serialize renderer config: {e}"))
        })
    }
}
