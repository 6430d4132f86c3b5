use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::error::{StarMapError, StarMapResult};
use crate::render::{CelestialConfig, CelestialRenderer, RenderSurface};

use super::{
    CaptureClock, CaptureFailure, CaptureOutcome, ControllerEvent, GenerationState,
    ObjectUrlRegistry, PendingCapture, RenderedArtifact, SVG_MIME_TYPE, StarMapController,
};

impl<R, S, U> StarMapController<R, S, U>
where
    R: CelestialRenderer,
    S: RenderSurface,
    U: ObjectUrlRegistry,
{
    /// Dispatches a render of the current form at host time `now`.
    ///
    /// Fails without any state change while a generation is in flight, when
    /// the renderer is not loaded, when no surface is attached or when the
    /// coordinate policy rejects the form. Otherwise the surface is cleared,
    /// re-targeted to the configured container id and handed to the renderer;
    /// the first capture attempt is due `initial_delay` later.
    ///
    /// A renderer rejection consumes the generation number: it is recorded as
    /// a [`CaptureFailure::Renderer`] outcome and reported to observers before
    /// the error is returned.
    pub fn generate(&mut self, now: Duration) -> StarMapResult<u64> {
        if let GenerationState::Generating(pending) = self.state {
            return Err(self.precondition_failed(StarMapError::GenerationInProgress {
                generation: pending.generation,
            }));
        }
        if !self.renderer.is_loaded() {
            return Err(self.precondition_failed(StarMapError::RendererUnavailable));
        }
        if self.surface.is_none() {
            return Err(self.precondition_failed(StarMapError::SurfaceUnavailable));
        }
        let config = CelestialConfig::build(
            &self.form,
            &self.settings.render,
            &self.settings.container_id,
            self.settings.coordinate_policy,
        )
        .map_err(|err| self.precondition_failed(err))?;

        let surface = self
            .surface
            .as_mut()
            .ok_or(StarMapError::SurfaceUnavailable)?;
        surface.clear();
        surface.assign_container_id(&self.settings.container_id);

        self.generation += 1;
        let generation = self.generation;
        info!(
            generation,
            lat = config.location.lat,
            lon = config.location.lon,
            date = ?config.date,
            projection = %config.options.projection,
            "dispatching star map render"
        );
        let pending = PendingCapture::new(generation, now, &self.settings.capture);
        if let Err(err) = self.renderer.display(&config, surface) {
            error!(generation, error = %err, "renderer rejected config");
            self.finish_failed(pending, CaptureFailure::Renderer(err.to_string()));
            return Err(err);
        }

        self.state = GenerationState::Generating(pending);
        self.emit(ControllerEvent::GenerationStarted { generation });
        Ok(generation)
    }

    /// When the pending capture attempt is due, if one is pending.
    #[must_use]
    pub fn next_capture_due(&self) -> Option<Duration> {
        match self.state {
            GenerationState::Generating(pending) => Some(pending.next_attempt_at),
            GenerationState::Idle => None,
        }
    }

    /// Advances the capture state machine to host time `now`.
    ///
    /// Returns the outcome once the in-flight generation settles; `None`
    /// while idle, before the next attempt is due, or after a miss that was
    /// rescheduled.
    pub fn tick(&mut self, now: Duration) -> Option<CaptureOutcome> {
        let GenerationState::Generating(mut pending) = self.state else {
            return None;
        };
        if now < pending.next_attempt_at {
            return None;
        }
        pending.attempts += 1;

        let captured = match self.surface.as_mut() {
            Some(surface) => surface.capture_scene(),
            None => return Some(self.finish_failed(pending, CaptureFailure::SurfaceDetached)),
        };

        match captured {
            Ok(Some(markup)) => Some(self.finish_captured(pending, markup)),
            Ok(None) => match pending.reschedule(now, &self.settings.capture) {
                Some(next) => {
                    debug!(
                        generation = next.generation,
                        attempts = next.attempts,
                        next_attempt_ms = next.next_attempt_at.as_millis() as u64,
                        "scene not ready, retrying capture"
                    );
                    self.state = GenerationState::Generating(next);
                    self.emit(ControllerEvent::CaptureRetry {
                        generation: next.generation,
                        attempts: next.attempts,
                    });
                    None
                }
                None => {
                    let waited_ms = now.saturating_sub(pending.dispatched_at).as_millis() as u64;
                    Some(self.finish_failed(
                        pending,
                        CaptureFailure::SceneNotFound {
                            attempts: pending.attempts,
                            waited_ms,
                        },
                    ))
                }
            },
            Err(err) => Some(self.finish_failed(pending, CaptureFailure::Surface(err.to_string()))),
        }
    }

    /// Abandons the in-flight capture, for hosts that can no longer drive
    /// [`Self::tick`]. The previous artifact is kept. Returns `None` when idle.
    pub fn cancel_capture(&mut self, reason: impl Into<String>) -> Option<CaptureOutcome> {
        let GenerationState::Generating(pending) = self.state else {
            return None;
        };
        Some(self.finish_failed(pending, CaptureFailure::Cancelled(reason.into())))
    }

        /// Sleeps on `clock` through every pending attempt until the in-flight
    /// generation settles. Returns `None` when nothing was in flight.
    pub fn run_until_settled(&mut self, clock: &mut dyn CaptureClock) -> Option<CaptureOutcome> {
        loop {
            let due = self.next_capture_due()?;
            clock.sleep_until(due);
            if let Some(outcome) = self.tick(clock.now()) {
                return Some(outcome);
            }
        }
    }

    /// `generate` followed by [`Self::run_until_settled`].
    pub fn generate_blocking(
        &mut self,
        clock: &mut dyn CaptureClock,
    ) -> StarMapResult<CaptureOutcome> {
        let generation = self.generate(clock.now())?;
        self.run_until_settled(clock).ok_or_else(|| {
            StarMapError::Capture(format!("generation {generation} did not settle"))
        })
    }

    fn finish_captured(&mut self, pending: PendingCapture, markup: String) -> CaptureOutcome {
        let url = match self
            .registry
            .create_object_url(markup.as_bytes(), SVG_MIME_TYPE)
        {
            Ok(url) => url,
            Err(err) => return self.finish_failed(pending, CaptureFailure::Registry(err.to_string())),
        };

        let bytes = markup.len();
        let artifact = RenderedArtifact {
            generation: pending.generation,
            markup,
            mime_type: SVG_MIME_TYPE,
            url,
        };
        if let Some(previous) = self.artifact.replace(artifact) {
            self.registry.revoke_object_url(&previous.url);
        }

        let outcome = CaptureOutcome::Captured {
            generation: pending.generation,
            bytes,
            attempts: pending.attempts,
        };
        self.state = GenerationState::Idle;
        self.last_outcome = Some(outcome.clone());
        info!(
            generation = pending.generation,
            bytes,
            attempts = pending.attempts,
            "star map captured"
        );
        self.emit(ControllerEvent::CaptureSucceeded {
            generation: pending.generation,
            bytes,
        });
        outcome
    }

    fn finish_failed(&mut self, pending: PendingCapture, failure: CaptureFailure) -> CaptureOutcome {
        let outcome = CaptureOutcome::Failed {
            generation: pending.generation,
            failure: failure.clone(),
        };
        self.state = GenerationState::Idle;
        self.last_outcome = Some(outcome.clone());
        if matches!(failure, CaptureFailure::SceneNotFound { .. }) {
            error!(generation = pending.generation, ?failure, "no scene found in container");
        } else {
            warn!(generation = pending.generation, ?failure, "scene capture failed");
        }
        self.emit(ControllerEvent::CaptureFailed {
            generation: pending.generation,
            failure,
        });
        outcome
    }
}
