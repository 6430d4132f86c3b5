#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use night_sky::StarMapResult;
use night_sky::api::{
    ControllerContext, ControllerEvent, DownloadRequest, DownloadSink, InMemoryBlobStore,
    StarMapController, StarMapObserver, StarMapSettings,
};
use night_sky::core::FormState;
use night_sky::render::{CelestialRenderer, SceneContainer};

pub fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

pub fn london_form() -> FormState {
    FormState::new("2024-03-01", "21:30", "51.5074", "-0.1278")
}

pub fn controller_with<R: CelestialRenderer>(
    settings: StarMapSettings,
    renderer: R,
    surface: SceneContainer,
) -> StarMapController<R, SceneContainer, InMemoryBlobStore> {
    StarMapController::with_form(settings, london_form(), renderer, InMemoryBlobStore::new())
        .expect("controller init")
        .with_surface(surface)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedDownload {
    pub url: String,
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Sink keeping every request in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub saved: Vec<SavedDownload>,
}

impl DownloadSink for RecordingSink {
    fn save(&mut self, request: DownloadRequest<'_>) -> StarMapResult<()> {
        self.saved.push(SavedDownload {
            url: request.url.as_str().to_owned(),
            filename: request.filename.to_owned(),
            mime_type: request.mime_type.to_owned(),
            bytes: request.bytes.to_vec(),
        });
        Ok(())
    }
}

/// Observer appending events to a shared log.
pub struct EventLog {
    pub id: String,
    pub events: Rc<RefCell<Vec<(ControllerEvent, ControllerContext)>>>,
}

impl StarMapObserver for EventLog {
    fn id(&self) -> &str {
        &self.id
    }

    fn on_event(&mut self, event: &ControllerEvent, context: ControllerContext) {
        self.events.borrow_mut().push((event.clone(), context));
    }
}
