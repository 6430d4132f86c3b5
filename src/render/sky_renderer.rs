use tracing::debug;

use crate::core::{EquatorialPoint, zenith};
use crate::error::{StarMapError, StarMapResult};
use crate::render::{
    CelestialConfig, CelestialRenderer, CoordinateFrame, FollowMode, Projection, RenderSurface,
    SceneNode,
};

const GRATICULE_STEP_DEG: f64 = 30.0;
const GRATICULE_STROKE: &str = "#333";
const ZENITH_STROKE: &str = "#f33";

/// Headless renderer producing a skeleton equirectangular sky.
///
/// It draws the background, a 30 degree graticule, one empty layer per
/// enabled overlay and a zenith marker; catalog data is out of its reach.
/// Right ascension grows to the left and the map is rotated so the view
/// center (or the zenith, when following it) sits in the middle column.
#[derive(Debug, Default)]
pub struct SkyRenderer {
    display_count: usize,
}

impl SkyRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn display_count(&self) -> usize {
        self.display_count
    }

    /// Builds the scene for `config` without touching any surface.
    pub fn build_scene(config: &CelestialConfig) -> StarMapResult<SceneNode> {
        let options = &config.options;
        if options.projection != Projection::Equirectangular {
            return Err(StarMapError::UnsupportedProjection(
                options.projection.name().to_owned(),
            ));
        }

        let zenith_point = match (config.date, options.transform) {
            (Some(instant), CoordinateFrame::Equatorial) => zenith(config.location, instant),
            _ => None,
        };
        let center_ra = match (options.follow, zenith_point) {
            (FollowMode::Zenith, Some(point)) => point.ra_deg,
            _ => options.center[0],
        };
        let projector = Equirectangular::new(options.canvas.width, options.canvas.height, center_ra);

        let mut root = SceneNode::svg_root(options.canvas.width, options.canvas.height)
            .with_child(metadata(config))
            .with_child(
                SceneNode::new("rect")
                    .with_attr("class", "background")
                    .with_attr("x", "0")
                    .with_attr("y", "0")
                    .with_attr("width", options.canvas.width.to_string())
                    .with_attr("height", options.canvas.height.to_string())
                    .with_attr("fill", options.background.fill.clone())
                    .with_attr("fill-opacity", options.background.opacity.to_string()),
            )
            .with_child(graticule(&projector));

        let overlays = options.overlays;
        for (class, shown) in [
            ("mw", overlays.milky_way),
            ("constellations", overlays.constellations),
            ("dsos", overlays.dsos),
            ("stars", overlays.stars),
        ] {
            if shown {
                root.push(SceneNode::new("g").with_attr("class", class));
            }
        }

        if let Some(point) = zenith_point {
            let (x, y) = projector.project(point);
            root.push(
                SceneNode::new("circle")
                    .with_attr("class", "zenith")
                    .with_attr("cx", fmt_px(x))
                    .with_attr("cy", fmt_px(y))
                    .with_attr("r", "4")
                    .with_attr("fill", "none")
                    .with_attr("stroke", ZENITH_STROKE),
            );
        }
        Ok(root)
    }
}

impl CelestialRenderer for SkyRenderer {
    fn display(
        &mut self,
        config: &CelestialConfig,
        surface: &mut dyn RenderSurface,
    ) -> StarMapResult<()> {
        let target = surface.container_id();
        if target != config.container {
            return Err(StarMapError::Render(format!(
                "container `{}` not found (surface is `{target}`)",
                config.container
            )));
        }
        let scene = Self::build_scene(config)?;
        debug!(
            container = %config.container,
            nodes = scene.node_count(),
            "sky scene built"
        );
        surface.mount(scene)?;
        self.display_count += 1;
        Ok(())
    }
}

fn metadata(config: &CelestialConfig) -> SceneNode {
    let date = config
        .date
        .map(|instant| instant.to_rfc3339())
        .unwrap_or_else(|| "Invalid Date".to_owned());
    SceneNode::new("metadata")
        .with_attr("data-lat", config.location.lat.to_string())
        .with_attr("data-lon", config.location.lon.to_string())
        .with_attr("data-date", date)
        .with_attr("data-projection", config.options.projection.name())
        .with_attr("data-transform", config.options.transform.name())
}

fn graticule(projector: &Equirectangular) -> SceneNode {
    let mut group = SceneNode::new("g")
        .with_attr("class", "graticule")
        .with_attr("stroke", GRATICULE_STROKE)
        .with_attr("fill", "none");

    let mut ra = 0.0;
    while ra < 360.0 {
        let (x, top) = projector.project(EquatorialPoint { ra_deg: ra, dec_deg: 90.0 });
        let (_, bottom) = projector.project(EquatorialPoint { ra_deg: ra, dec_deg: -90.0 });
        group.push(line(x, top, x, bottom));
        ra += GRATICULE_STEP_DEG;
    }

    let mut dec = -90.0 + GRATICULE_STEP_DEG;
    while dec < 90.0 {
        let (_, y) = projector.project(EquatorialPoint { ra_deg: 0.0, dec_deg: dec });
        group.push(line(0.0, y, projector.map_width(), y));
        dec += GRATICULE_STEP_DEG;
    }
    group
}

fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> SceneNode {
    SceneNode::new("line")
        .with_attr("x1", fmt_px(x1))
        .with_attr("y1", fmt_px(y1))
        .with_attr("x2", fmt_px(x2))
        .with_attr("y2", fmt_px(y2))
}

fn fmt_px(value: f64) -> String {
    format!("{value:.2}")
}

/// Plate carree over the full sky, fitted to the canvas width.
struct Equirectangular {
    width: f64,
    height: f64,
    scale: f64,
    center_ra: f64,
}

impl Equirectangular {
    fn new(width: u32, height: u32, center_ra: f64) -> Self {
        let width = f64::from(width);
        Self {
            width,
            height: f64::from(height),
            scale: width / 360.0,
            center_ra,
        }
    }

    fn map_width(&self) -> f64 {
        self.width
    }

    fn project(&self, point: EquatorialPoint) -> (f64, f64) {
        let offset = (point.ra_deg - self.center_ra + 180.0).rem_euclid(360.0) - 180.0;
        let x = self.width / 2.0 - offset * self.scale;
        let y = self.height / 2.0 - point.dec_deg * self.scale;
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn projection_centers_and_mirrors_right_ascension() {
        let projector = Equirectangular::new(600, 800, 90.0);
        let (x, y) = projector.project(EquatorialPoint { ra_deg: 90.0, dec_deg: 0.0 });
        assert_abs_diff_eq!(x, 300.0, epsilon = 1e-9);
        assert_abs_diff_eq!(y, 400.0, epsilon = 1e-9);

        let (x_east, _) = projector.project(EquatorialPoint { ra_deg: 120.0, dec_deg: 0.0 });
        assert!(x_east < 300.0);

        let (_, y_pole) = projector.project(EquatorialPoint { ra_deg: 0.0, dec_deg: 90.0 });
        assert_abs_diff_eq!(y_pole, 400.0 - 90.0 * 600.0 / 360.0, epsilon = 1e-9);
    }
}
