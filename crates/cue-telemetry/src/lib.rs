//! # cue-telemetry
//!
//! Process-wide `tracing` setup plus an in-memory capture subscriber that
//! tests use to assert on logged events.

#![deny(unsafe_code)]

mod capture;

pub use capture::{capture_logs, CapturedEvent, CapturedLogs};

use cue_settings::LoggingSettings;
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter {directive:?}: {message}")]
    InvalidFilter { directive: String, message: String },
}

/// Build the filter: `RUST_LOG` when set, else the configured level.
fn build_filter(settings: &LoggingSettings) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&settings.level).map_err(|e| TelemetryError::InvalidFilter {
        directive: settings.level.clone(),
        message: e.to_string(),
    })
}

/// Install the global subscriber, writing to stderr.
///
/// Call once at startup. A second call (or a subscriber installed by
/// someone else) is left in place and reported as `Ok`.
pub fn init_telemetry(settings: &LoggingSettings) -> Result<(), TelemetryError> {
    let filter = build_filter(settings)?;

    let fmt_layer = if settings.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed()
    };

    if tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .try_init()
        .is_err()
    {
        tracing::debug!("global subscriber already installed");
    }
    Ok(())
}
