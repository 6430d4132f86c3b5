use night_sky::StarMapError;
use night_sky::core::{CoordinatePolicy, FormState};
use night_sky::render::{
    CelestialConfig, CelestialRenderer, CoordinateFrame, OverlayVisibility, Projection,
    RenderOptions, RenderSurface, SceneContainer, SceneNode, SkyRenderer,
};

fn config_for(form: &FormState, options: &RenderOptions) -> CelestialConfig {
    CelestialConfig::build(form, options, "celestial-map", CoordinatePolicy::Lenient)
        .expect("config build")
}

fn london() -> FormState {
    FormState::new("2024-03-01", "21:30", "51.5074", "-0.1278")
}

fn layer_classes(scene: &SceneNode) -> Vec<&str> {
    scene
        .children
        .iter()
        .filter(|child| child.tag == "g")
        .filter_map(|child| child.attr("class"))
        .collect()
}

#[test]
fn scene_has_background_graticule_layers_and_zenith() {
    let scene = SkyRenderer::build_scene(&config_for(&london(), &RenderOptions::default()))
        .expect("scene");

    assert_eq!(scene.tag, "svg");
    assert_eq!(scene.attr("width"), Some("600"));
    assert_eq!(scene.attr("height"), Some("800"));
    assert_eq!(scene.attr("viewBox"), Some("0 0 600 800"));

    let metadata = scene.find("metadata").expect("metadata");
    assert_eq!(metadata.attr("data-lat"), Some("51.5074"));
    assert_eq!(metadata.attr("data-lon"), Some("-0.1278"));
    assert_eq!(metadata.attr("data-projection"), Some("equirectangular"));

    let background = scene.find("rect").expect("background");
    assert_eq!(background.attr("fill"), Some("#000"));

    assert_eq!(
        layer_classes(&scene),
        vec!["graticule", "mw", "constellations", "dsos", "stars"]
    );
    let graticule = &scene.children[2];
    assert_eq!(graticule.children.len(), 12 + 5);

    let zenith = scene.find("circle").expect("zenith marker");
    assert_eq!(zenith.attr("class"), Some("zenith"));
    assert_eq!(zenith.attr("cx"), Some("300.00"));
    assert_eq!(zenith.attr("cy"), Some("314.15"));
}

#[test]
fn disabled_overlays_are_not_drawn() {
    let options = RenderOptions {
        overlays: OverlayVisibility {
            dsos: false,
            milky_way: false,
            ..OverlayVisibility::default()
        },
        ..RenderOptions::default()
    };
    let scene = SkyRenderer::build_scene(&config_for(&london(), &options)).expect("scene");
    assert_eq!(
        layer_classes(&scene),
        vec!["graticule", "constellations", "stars"]
    );
}

#[test]
fn invalid_date_draws_no_zenith() {
    let form = FormState::new("not-a-date", "21:30", "51.5074", "-0.1278");
    let scene = SkyRenderer::build_scene(&config_for(&form, &RenderOptions::default()))
        .expect("scene");
    assert!(scene.find("circle").is_none());
    assert_eq!(
        scene.find("metadata").and_then(|node| node.attr("data-date")),
        Some("Invalid Date")
    );
}

#[test]
fn non_equatorial_frame_draws_no_zenith() {
    let options = RenderOptions {
        transform: CoordinateFrame::Ecliptic,
        ..RenderOptions::default()
    };
    let scene = SkyRenderer::build_scene(&config_for(&london(), &options)).expect("scene");
    assert!(scene.find("circle").is_none());
}

#[test]
fn nan_latitude_still_renders_without_zenith() {
    let form = FormState::new("2024-03-01", "21:30", "abc", "-0.1278");
    let scene = SkyRenderer::build_scene(&config_for(&form, &RenderOptions::default()))
        .expect("scene");
    assert_eq!(
        scene.find("metadata").and_then(|node| node.attr("data-lat")),
        Some("NaN")
    );
    assert!(scene.find("circle").is_none());
}

#[test]
fn other_projections_are_unsupported() {
    let options = RenderOptions {
        projection: Projection::Stereographic,
        ..RenderOptions::default()
    };
    let err = SkyRenderer::build_scene(&config_for(&london(), &options)).unwrap_err();
    assert!(matches!(err, StarMapError::UnsupportedProjection(ref name) if name == "stereographic"));
}

#[test]
fn display_requires_matching_container() {
    let config = config_for(&london(), &RenderOptions::default());
    let mut renderer = SkyRenderer::new();

    let mut wrong = SceneContainer::new("elsewhere");
    let err = renderer.display(&config, &mut wrong).unwrap_err();
    assert!(matches!(err, StarMapError::Render(_)));
    assert!(wrong.nodes().is_empty());

    let mut right = SceneContainer::new("celestial-map");
    renderer.display(&config, &mut right).expect("display");
    assert_eq!(renderer.display_count(), 1);
    let markup = right.capture_scene().expect("capture").expect("scene present");
    assert!(markup.contains("class=\"zenith\""));
}
