//! HIPAA-aware logging for clinical text processing
//!
//! Dictated notes are PHI. This crate gives every RustCare component the same
//! two pieces of logging plumbing:
//!
//! - [`init`]: installs a `tracing-subscriber` registry with an `EnvFilter`
//!   and either a pretty or a JSON formatter.
//! - [`PiiRedactor`]: scrubs e-mail addresses, phone numbers, SSNs, medical
//!   record numbers and dates of birth out of text before it is attached to a
//!   log event, and bounds its length.
//!
//! # Example
//!
//! ```rust
//! use logger_redacted::{LoggerConfig, PiiRedactor};
//! use tracing::warn;
//!
//! let _ = logger_redacted::init(&LoggerConfig::default());
//!
//! let redactor = PiiRedactor::default();
//! warn!(
//!     excerpt = %redactor.excerpt("MRN 123456 reports chest pain"),
//!     "Unparseable model output"
//! );
//! ```

pub mod config;
pub mod redactor;

pub use config::*;
pub use redactor::*;

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.log_level`. Returns `Ok(false)`
/// when a global subscriber was already installed.
pub fn init(config: &LoggerConfig) -> Result<bool, LoggerError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level).map_err(|e| LoggerError::InvalidFilter {
            filter: config.log_level.clone(),
            reason: e.to_string(),
        })?,
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    // Logs go to stderr so command output on stdout stays machine-readable
    let installed = match config.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(false).with_writer(std::io::stderr))
            .try_init(),
    };

    Ok(installed.is_ok())
}

/// Redactor configured from a [`LoggerConfig`]
pub fn redactor_for(config: &LoggerConfig) -> PiiRedactor {
    if config.redaction_enabled {
        PiiRedactor::default()
    } else {
        PiiRedactor::new(RedactionConfig::disabled())
    }
}
