//! Opt-in `tracing` setup for hosts embedding `night-sky-rs`.
//!
//! The library only emits events. Binaries and hosts without a subscriber of
//! their own can install a compact stderr one here; `RUST_LOG` wins over the
//! default directive when set.

/// Installs the stderr subscriber with `info` as the default directive.
#[must_use]
pub fn init_default_tracing() -> bool {
    init_tracing("info")
}

/// Installs a compact stderr subscriber filtered by `RUST_LOG`, falling back
/// to `default_directive` (for example `"warn"` or `"night_sky=debug"`).
///
/// Returns `false` without the `telemetry` feature, or when a global
/// subscriber is already set.
#[must_use]
pub fn init_tracing(default_directive: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_directive))
            .unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .try_init()
            .is_ok()
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = default_directive;
        false
    }
}
