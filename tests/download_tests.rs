mod support;

use night_sky::StarMapError;
use night_sky::api::{
    DownloadRequest, DownloadSink, FileSystemSink, ManualClock, ObjectUrl, StarMapSettings,
    validate_filename,
};
use night_sky::core::FormField;
use night_sky::render::{SceneContainer, SkyRenderer};

use support::{RecordingSink, controller_with};

#[test]
fn download_without_artifact_is_a_no_op() {
    let mut controller = controller_with(
        StarMapSettings::default(),
        SkyRenderer::new(),
        SceneContainer::new("celestial-map"),
    );
    let mut sink = RecordingSink::default();
    assert_eq!(controller.download(&mut sink).expect("no-op"), None);
    assert!(sink.saved.is_empty());
}

#[test]
fn filename_follows_form_at_download_time() {
    let mut controller = controller_with(
        StarMapSettings::default(),
        SkyRenderer::new(),
        SceneContainer::new("celestial-map"),
    );
    controller
        .generate_blocking(&mut ManualClock::new())
        .expect("generation dispatched");
    controller.update_field(FormField::Date, "2025-12-24");
    controller.update_field(FormField::Longitude, "2.3522");

    let mut sink = RecordingSink::default();
    let filename = controller.download(&mut sink).expect("download");
    assert_eq!(
        filename.as_deref(),
        Some("star-map-2025-12-24-2.3522-51.5074.svg")
    );
    let markup = &controller.artifact().expect("artifact").markup;
    assert_eq!(sink.saved[0].bytes, markup.as_bytes());
}

#[test]
fn file_system_sink_writes_artifact_bytes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut controller = controller_with(
        StarMapSettings::default(),
        SkyRenderer::new(),
        SceneContainer::new("celestial-map"),
    );
    controller
        .generate_blocking(&mut ManualClock::new())
        .expect("generation dispatched");

    let mut sink = FileSystemSink::new(dir.path());
    let filename = controller
        .download(&mut sink)
        .expect("download")
        .expect("artifact present");
    let path = dir.path().join(&filename);
    assert_eq!(sink.written(), &[path.clone()]);

    let written = std::fs::read_to_string(&path).expect("read written svg");
    assert_eq!(written, controller.artifact().expect("artifact").markup);
}

#[test]
fn separator_in_form_value_cannot_escape_the_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut controller = controller_with(
        StarMapSettings::default(),
        SkyRenderer::new(),
        SceneContainer::new("celestial-map"),
    );
    controller
        .generate_blocking(&mut ManualClock::new())
        .expect("generation dispatched");
    controller.update_field(FormField::Date, "../2024/03/01");

    let mut sink = FileSystemSink::new(dir.path());
    let err = controller.download(&mut sink).unwrap_err();
    assert!(matches!(err, StarMapError::InvalidFilename(_)));
    assert!(sink.written().is_empty());
}

#[test]
fn sink_rejects_reserved_names_directly() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut sink = FileSystemSink::new(dir.path());
    let url = ObjectUrl::new("blob:night-sky/1");
    for name in ["", ".", "..", "a/b.svg", "a\\b.svg"] {
        let request = DownloadRequest {
            url: &url,
            filename: name,
            mime_type: "image/svg+xml",
            bytes: b"<svg/>",
        };
        assert!(sink.save(request).is_err(), "{name:?} accepted");
        assert!(validate_filename(name).is_err());
    }
    assert!(sink.written().is_empty());
}
