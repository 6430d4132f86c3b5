use criterion::{Criterion, criterion_group, criterion_main};
use night_sky::api::{InMemoryBlobStore, ManualClock, StarMapController, StarMapSettings};
use night_sky::core::{CoordinatePolicy, FormState, parse_coordinate};
use night_sky::render::{CelestialConfig, RenderOptions, SceneContainer, SkyRenderer};
use std::hint::black_box;

fn london() -> FormState {
    FormState::new("2024-03-01", "21:30", "51.5074", "-0.1278")
}

fn bench_parse_coordinate(c: &mut Criterion) {
    c.bench_function("parse_coordinate", |b| {
        b.iter(|| {
            let _ = parse_coordinate(black_box("  -33.8688 deg S"));
        })
    });
}

fn bench_config_build_and_value(c: &mut Criterion) {
    let form = london();
    let options = RenderOptions::default();

    c.bench_function("celestial_config_to_renderer_value", |b| {
        b.iter(|| {
            let config = CelestialConfig::build(
                black_box(&form),
                &options,
                "celestial-map",
                CoordinatePolicy::Lenient,
            )
            .expect("config build");
            let _ = config.to_renderer_value();
        })
    });
}

fn bench_sky_scene_markup(c: &mut Criterion) {
    let config = CelestialConfig::build(
        &london(),
        &RenderOptions::default(),
        "celestial-map",
        CoordinatePolicy::Lenient,
    )
    .expect("config build");

    c.bench_function("sky_scene_markup", |b| {
        b.iter(|| {
            let scene = SkyRenderer::build_scene(black_box(&config)).expect("scene");
            let _ = scene.to_markup();
        })
    });
}

fn bench_generate_blocking_cycle(c: &mut Criterion) {
    let mut controller = StarMapController::with_form(
        StarMapSettings::default(),
        london(),
        SkyRenderer::new(),
        InMemoryBlobStore::new(),
    )
    .expect("controller init")
    .with_surface(SceneContainer::new("celestial-map"));
    let mut clock = ManualClock::new();

    c.bench_function("generate_blocking_cycle", |b| {
        b.iter(|| {
            let _ = controller
                .generate_blocking(&mut clock)
                .expect("generation dispatched");
        })
    });
}

criterion_group!(
    benches,
    bench_parse_coordinate,
    bench_config_build_and_value,
    bench_sky_scene_markup,
    bench_generate_blocking_cycle
);
criterion_main!(benches);
