mod artifact;
mod capture;
mod controller;
mod download;
mod events;
mod generation;
mod settings;
mod snapshot;

pub use artifact::{
    InMemoryBlobStore, ObjectUrl, ObjectUrlRegistry, RenderedArtifact, SVG_MIME_TYPE, StoredBlob,
    artifact_filename,
};
pub use capture::{
    CaptureClock, CaptureFailure, CaptureOutcome, CapturePolicy, ManualClock, PendingCapture,
    SystemClock,
};
pub use controller::{GenerationState, StarMapController};
pub use download::{DownloadRequest, DownloadSink, FileSystemSink, validate_filename};
pub use events::{ControllerContext, ControllerEvent, EventQueue, StarMapObserver};
pub use settings::{DEFAULT_CONTAINER_ID, DEFAULT_FILENAME_PREFIX, StarMapSettings};
pub use snapshot::{
    ArtifactSummary, CONTROLLER_SNAPSHOT_JSON_SCHEMA_V1, ControllerSnapshot,
    ControllerSnapshotJsonContractV1,
};
