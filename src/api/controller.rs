use tracing::{error, info, trace, warn};

use crate::core::{FormField, FormState};
use crate::error::{StarMapError, StarMapResult};
use crate::render::{CelestialRenderer, RenderSurface};

use super::{
    CaptureOutcome, ControllerContext, ControllerEvent, DownloadRequest, DownloadSink,
    ObjectUrlRegistry, PendingCapture, RenderedArtifact, StarMapObserver, StarMapSettings,
    artifact_filename,
};

/// Lifecycle of the generate trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    Idle,
    Generating(PendingCapture),
}

/// Main orchestration facade consumed by host applications.
///
/// `StarMapController` owns the form, turns it into a renderer config on
/// demand, drives the capture of the rendered scene and hands artifacts to
/// download sinks. The renderer, the surface and the object-URL registry are
/// injected so browser and headless hosts share the same state machine.
pub struct StarMapController<R, S, U>
where
    R: CelestialRenderer,
    S: RenderSurface,
    U: ObjectUrlRegistry,
{
    pub(super) settings: StarMapSettings,
    pub(super) form: FormState,
    pub(super) renderer: R,
    pub(super) surface: Option<S>,
    pub(super) registry: U,
    pub(super) state: GenerationState,
    pub(super) generation: u64,
    pub(super) artifact: Option<RenderedArtifact>,
    pub(super) last_outcome: Option<CaptureOutcome>,
    pub(super) observers: Vec<Box<dyn StarMapObserver>>,
}

impl<R, S, U> StarMapController<R, S, U>
where
    R: CelestialRenderer,
    S: RenderSurface,
    U: ObjectUrlRegistry,
{
    /// Creates a controller whose form defaults to the system clock and the
    /// configured default location.
    pub fn new(settings: StarMapSettings, renderer: R, registry: U) -> StarMapResult<Self> {
        let form = FormState::now(&settings.default_location);
        Self::with_form(settings, form, renderer, registry)
    }

    pub fn with_form(
        settings: StarMapSettings,
        form: FormState,
        renderer: R,
        registry: U,
    ) -> StarMapResult<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            form,
            renderer,
            surface: None,
            registry,
            state: GenerationState::Idle,
            generation: 0,
            artifact: None,
            last_outcome: None,
            observers: Vec::new(),
        })
    }

    /// Builder variant of [`Self::attach_surface`].
    #[must_use]
    pub fn with_surface(mut self, surface: S) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn attach_surface(&mut self, surface: S) -> Option<S> {
        self.surface.replace(surface)
    }

    pub fn detach_surface(&mut self) -> Option<S> {
        self.surface.take()
    }

    #[must_use]
    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[must_use]
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[must_use]
    pub fn registry(&self) -> &U {
        &self.registry
    }

    #[must_use]
    pub fn settings(&self) -> &StarMapSettings {
        &self.settings
    }

    #[must_use]
    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// Sets one form field verbatim.
    ///
    /// Never touches the current artifact or an in-flight render: the config
    /// of a dispatched render was fixed when it was built.
    pub fn update_field(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        trace!(%field, value = %value, "update form field");
        self.form.set(field, value);
        self.emit(ControllerEvent::FieldUpdated { field });
    }

    #[must_use]
    pub fn state(&self) -> GenerationState {
        self.state
    }

    #[must_use]
    pub fn is_generating(&self) -> bool {
        matches!(self.state, GenerationState::Generating(_))
    }

    /// Whether the generate trigger should be enabled.
    #[must_use]
    pub fn can_generate(&self) -> bool {
        !self.is_generating()
    }

    /// Whether the download trigger should be shown.
    #[must_use]
    pub fn can_download(&self) -> bool {
        self.artifact.is_some()
    }

    /// Number of the most recently dispatched generation (0 before any).
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn artifact(&self) -> Option<&RenderedArtifact> {
        self.artifact.as_ref()
    }

    #[must_use]
    pub fn last_outcome(&self) -> Option<&CaptureOutcome> {
        self.last_outcome.as_ref()
    }

    /// Drops the current artifact and revokes its object URL.
    pub fn release_artifact(&mut self) -> Option<RenderedArtifact> {
        let artifact = self.artifact.take()?;
        self.registry.revoke_object_url(&artifact.url);
        Some(artifact)
    }

    /// Hands the current artifact to `sink` under the form-derived filename.
    ///
    /// Without an artifact this is a no-op returning `Ok(None)`. The filename
    /// reflects the form as it is now, not as it was when the artifact was
    /// generated.
    pub fn download(&mut self, sink: &mut dyn DownloadSink) -> StarMapResult<Option<String>> {
        let Some(artifact) = self.artifact.as_ref() else {
            trace!("download requested without artifact");
            return Ok(None);
        };
        let filename = artifact_filename(&self.settings.filename_prefix, &self.form);
        sink.save(DownloadRequest {
            url: &artifact.url,
            filename: &filename,
            mime_type: artifact.mime_type,
            bytes: artifact.bytes(),
        })?;
        let generation = artifact.generation;
        info!(generation, filename = %filename, "artifact downloaded");
        self.emit(ControllerEvent::Downloaded {
            generation,
            filename: filename.clone(),
        });
        Ok(Some(filename))
    }

    /// Registers an observer; returns `false` if its id is taken.
    pub fn add_observer(&mut self, observer: Box<dyn StarMapObserver>) -> bool {
        if self
            .observers
            .iter()
            .any(|existing| existing.id() == observer.id())
        {
            warn!(id = observer.id(), "observer id already registered");
            return false;
        }
        self.observers.push(observer);
        true
    }

    pub fn remove_observer(&mut self, id: &str) -> bool {
        let before = self.observers.len();
        self.observers.retain(|observer| observer.id() != id);
        self.observers.len() != before
    }

    #[must_use]
    pub fn context(&self) -> ControllerContext {
        ControllerContext {
            generating: self.is_generating(),
            generation: self.generation,
            has_artifact: self.artifact.is_some(),
        }
    }

    pub(super) fn emit(&mut self, event: ControllerEvent) {
        if self.observers.is_empty() {
            return;
        }
        let context = self.context();
        for observer in &mut self.observers {
            observer.on_event(&event, context);
        }
    }

    pub(super) fn precondition_failed(&self, err: StarMapError) -> StarMapError {
        error!(error = %err, "cannot generate star map");
        err
    }
}
