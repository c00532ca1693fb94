//! Logging initialization for the netlog binary.
//!
//! Configures `tracing-subscriber` based on the `[general]` section
//! of `NetlogConfig`. Supports JSON structured logging and
//! human-readable pretty format. Logs always go to stderr so that
//! stdout carries only command output.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use netlog_core::config::GeneralConfig;

use crate::error::CliError;

/// Initialize the global tracing subscriber.
///
/// Must be called exactly once, before any tracing macros are used.
///
/// Filter precedence: `level_override` (`--log-level`), then `RUST_LOG`,
/// then `config.log_level`.
///
/// # Formats
///
/// * `"json"` - Machine-parseable JSON lines
/// * `"pretty"` - Human-readable colored output (default)
pub fn init_tracing(config: &GeneralConfig, level_override: Option<&str>) -> Result<(), CliError> {
    let env_filter = build_filter(config, level_override)?;

    match config.log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .try_init()
                .map_err(|e| {
                    CliError::Command(format!(
                        "failed to initialize JSON tracing subscriber: {}",
                        e
                    ))
                })?;
        }
        "pretty" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_writer(std::io::stderr),
                )
                .try_init()
                .map_err(|e| {
                    CliError::Command(format!(
                        "failed to initialize pretty tracing subscriber: {}",
                        e
                    ))
                })?;
        }
        _ => {
            return Err(CliError::Config(format!(
                "unknown log format '{}', expected 'json' or 'pretty'",
                config.log_format
            )));
        }
    }

    Ok(())
}

fn build_filter(config: &GeneralConfig, level_override: Option<&str>) -> Result<EnvFilter, CliError> {
    if let Some(level) = level_override {
        return EnvFilter::try_new(level)
            .map_err(|e| CliError::Config(format!("invalid --log-level '{}': {}", level, e)));
    }

    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.log_level).map_err(|e| {
            CliError::Config(format!(
                "invalid general.log_level '{}': {}",
                config.log_level, e
            ))
        }),
    }
}
