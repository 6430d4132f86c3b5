mod support;

use night_sky::api::{
    CaptureOutcome, ControllerSnapshot, ManualClock, SVG_MIME_TYPE, StarMapSettings,
};
use night_sky::core::FormField;
use night_sky::render::{SceneContainer, SkyRenderer};

use support::{RecordingSink, controller_with};

#[test]
fn generate_capture_download_flow() {
    let mut controller = controller_with(
        StarMapSettings::default(),
        SkyRenderer::new(),
        SceneContainer::new("celestial-map"),
    );
    assert!(controller.can_generate());
    assert!(!controller.can_download());

    let mut clock = ManualClock::new();
    let outcome = controller
        .generate_blocking(&mut clock)
        .expect("generation dispatched");
    assert!(matches!(
        outcome,
        CaptureOutcome::Captured {
            generation: 1,
            attempts: 1,
            ..
        }
    ));
    assert!(!controller.is_generating());
    assert!(controller.can_download());

    let artifact = controller.artifact().expect("artifact stored");
    assert!(artifact.markup.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
    assert!(artifact.markup.ends_with("</svg>"));
    assert_eq!(artifact.mime_type, SVG_MIME_TYPE);
    let url = artifact.url.clone();
    assert_eq!(
        controller.registry().resolve(&url).map(|blob| blob.bytes.len()),
        Some(artifact.len())
    );

    let mut sink = RecordingSink::default();
    let filename = controller.download(&mut sink).expect("download");
    assert_eq!(
        filename.as_deref(),
        Some("star-map-2024-03-01--0.1278-51.5074.svg")
    );
    assert_eq!(sink.saved.len(), 1);
    assert_eq!(sink.saved[0].url, url.as_str());
    assert_eq!(sink.saved[0].mime_type, SVG_MIME_TYPE);
}

#[test]
fn snapshot_tracks_form_and_artifact() {
    let mut controller = controller_with(
        StarMapSettings::default(),
        SkyRenderer::new(),
        SceneContainer::new("celestial-map"),
    );
    controller.update_field(FormField::Latitude, "48.8566");
    controller
        .generate_blocking(&mut ManualClock::new())
        .expect("generation dispatched");

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.form.latitude, "48.8566");
    assert!(!snapshot.generating);
    assert_eq!(snapshot.generation, 1);
    let artifact = snapshot.artifact.as_ref().expect("artifact summary");
    assert_eq!(artifact.generation, 1);
    assert!(snapshot.last_outcome.as_ref().is_some_and(CaptureOutcome::is_captured));

    let json = controller
        .snapshot_json_contract_v1_pretty()
        .expect("contract json");
    assert!(json.contains("\"schema_version\": 1"));
    let parsed = ControllerSnapshot::from_json_compat_str(&json).expect("parse contract");
    assert_eq!(parsed, snapshot);

    let bare = snapshot.to_json_pretty().expect("bare json");
    assert_eq!(
        ControllerSnapshot::from_json_compat_str(&bare).expect("parse bare"),
        snapshot
    );
}

#[test]
fn unknown_snapshot_schema_is_rejected() {
    let json = r#"{"schema_version": 9, "snapshot": {"form": {"date": "", "time": "", "latitude": "", "longitude": ""}, "generating": false, "generation": 0, "artifact": null, "last_outcome": null}}"#;
    assert!(ControllerSnapshot::from_json_compat_str(json).is_err());
}
