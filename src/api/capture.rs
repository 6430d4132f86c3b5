use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::{StarMapError, StarMapResult};

/// When and how often the controller looks for the rendered scene.
///
/// The first attempt happens `initial_delay_ms` after the renderer call.
/// Misses are retried with a poll interval that grows by `backoff_factor`
/// (capped at `max_poll_interval_ms`) until `timeout_ms` after the renderer
/// call; an attempt is never scheduled past that deadline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapturePolicy {
    pub initial_delay_ms: u64,
    pub poll_interval_ms: u64,
    pub backoff_factor: f64,
    pub max_poll_interval_ms: u64,
    pub timeout_ms: u64,
}

impl Default for CapturePolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: 50,
            poll_interval_ms: 100,
            backoff_factor: 2.0,
            max_poll_interval_ms: 800,
            timeout_ms: 5_000,
        }
    }
}

impl CapturePolicy {
    /// One blind attempt after `delay_ms`, no retries.
    #[must_use]
    pub fn fixed_delay(delay_ms: u64) -> Self {
        Self {
            initial_delay_ms: delay_ms,
            poll_interval_ms: 0,
            backoff_factor: 1.0,
            max_poll_interval_ms: 0,
            timeout_ms: delay_ms,
        }
    }

    /// A single capture attempt two seconds after rendering.
    #[must_use]
    pub fn legacy() -> Self {
        Self::fixed_delay(2_000)
    }

    pub fn validate(&self) -> StarMapResult<()> {
        if !self.backoff_factor.is_finite() || self.backoff_factor < 1.0 {
            return Err(StarMapError::InvalidSettings(
                "capture backoff factor must be finite and >= 1".to_owned(),
            ));
        }
        if self.timeout_ms < self.initial_delay_ms {
            return Err(StarMapError::InvalidSettings(
                "capture timeout must not precede the initial delay".to_owned(),
            ));
        }
        if self.poll_interval_ms > self.max_poll_interval_ms {
            return Err(StarMapError::InvalidSettings(
                "capture poll interval exceeds its maximum".to_owned(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Wait before retry number `retry` (0 for the first retry).
    #[must_use]
    pub fn retry_interval(&self, retry: u32) -> Duration {
        let grown = self.poll_interval_ms as f64 * self.backoff_factor.powi(retry as i32);
        let capped = grown.min(self.max_poll_interval_ms as f64);
        Duration::from_millis(capped.max(0.0) as u64)
    }
}

/// Capture attempt scheduled for an in-flight generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingCapture {
    pub generation: u64,
    pub dispatched_at: Duration,
    pub next_attempt_at: Duration,
    pub deadline: Duration,
    pub attempts: u32,
}

impl PendingCapture {
    #[must_use]
    pub fn new(generation: u64, dispatched_at: Duration, policy: &CapturePolicy) -> Self {
        Self {
            generation,
            dispatched_at,
            next_attempt_at: dispatched_at + policy.initial_delay(),
            deadline: dispatched_at + policy.timeout(),
            attempts: 0,
        }
    }

    /// Schedules the next attempt after a miss at `now`, or returns `None`
    /// when no attempt fits before the deadline.
    #[must_use]
    pub fn reschedule(mut self, now: Duration, policy: &CapturePolicy) -> Option<Self> {
        let interval = policy.retry_interval(self.attempts.saturating_sub(1));
        if interval.is_zero() || now >= self.deadline {
            return None;
        }
        self.next_attempt_at = (now + interval).min(self.deadline);
        Some(self)
    }
}

/// Why a generation ended without an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureFailure {
    /// No scene appeared in the container before the deadline.
    SceneNotFound { attempts: u32, waited_ms: u64 },
    /// The surface was detached while the capture was pending.
    SurfaceDetached,
    /// The surface failed to serialize its scene.
    Surface(String),
    /// The object-URL registry refused the artifact.
    Registry(String),
    /// The renderer rejected the config after the surface was cleared.
    Renderer(String),
    /// The host abandoned the pending capture.
    Cancelled(String),
}

/// Result of one finished generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureOutcome {
    Captured { generation: u64, bytes: usize, attempts: u32 },
    Failed { generation: u64, failure: CaptureFailure },
}

impl CaptureOutcome {
    #[must_use]
    pub fn generation(&self) -> u64 {
        match self {
            CaptureOutcome::Captured { generation, .. }
            | CaptureOutcome::Failed { generation, .. } => *generation,
        }
    }

    #[must_use]
    pub fn is_captured(&self) -> bool {
        matches!(self, CaptureOutcome::Captured { .. })
    }
}

/// Time source and sleeper for blocking capture drivers.
pub trait CaptureClock {
    /// Monotonic time since an arbitrary origin.
    fn now(&self) -> Duration;

    fn sleep_until(&mut self, deadline: Duration);
}

/// Wall clock driver backed by `std::time::Instant` and thread sleeps.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl CaptureClock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep_until(&mut self, deadline: Duration) {
        let now = self.now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }
}

/// Clock that only moves when slept on; deterministic for tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Duration,
    sleeps: Vec<Duration>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    /// Deadlines slept until, in order.
    #[must_use]
    pub fn sleeps(&self) -> &[Duration] {
        &self.sleeps
    }
}

impl CaptureClock for ManualClock {
    fn now(&self) -> Duration {
        self.now
    }

    fn sleep_until(&mut self, deadline: Duration) {
        self.sleeps.push(deadline);
        self.now = self.now.max(deadline);
    }
}
