//! Telemetry helpers for applications embedding `mapnik-capi`.
//!
//! This module keeps tracing setup explicit and opt-in.
//! Consumers can either call `init_default_tracing` or wire their own
//! `tracing` subscriber and filters; [`crate::logger::allows`] is public so
//! custom subscribers can honor the runtime severity as well.

/// Initializes a default `tracing` subscriber when the `telemetry` feature is enabled.
///
/// Events must pass both `RUST_LOG` (default: everything) and the process-wide
/// severity set through [`crate::logger::set_severity`].
///
/// Returns `true` when initialization succeeds.
/// Returns `false` when no initialization is performed (feature disabled) or if a
/// global subscriber was already set by the host application.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        use tracing_subscriber::filter::filter_fn;
        use tracing_subscriber::prelude::*;

        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("trace"));
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .compact()
            .with_filter(filter_fn(|metadata| {
                crate::logger::allows(metadata.level())
            }));

        return tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}
