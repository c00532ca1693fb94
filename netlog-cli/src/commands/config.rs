//! `netlog config` command handler

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use netlog_core::config::NetlogConfig;

use crate::cli::{ConfigAction, ConfigArgs, DEFAULT_CONFIG_PATH};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Label used as the source when no configuration file is read.
pub const DEFAULTS_SOURCE: &str = "(built-in defaults)";

/// Sections accepted by `config show --section`.
const SECTIONS: [&str; 5] = ["general", "router", "normalizer", "passthrough", "runtime"];

/// Configuration together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: NetlogConfig,
    /// File path, or [`DEFAULTS_SOURCE`].
    pub source: String,
}

/// Resolve the effective configuration.
///
/// An explicit `--config` path must exist. Without one, `./netlog.toml` is
/// read when present and the built-in defaults are used otherwise.
pub async fn load_effective(explicit: Option<&Path>) -> Result<LoadedConfig, CliError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_PATH);
            if !tokio::fs::try_exists(&default).await.unwrap_or(false) {
                debug!("no configuration file found, using defaults");
                let config = NetlogConfig::default();
                config.validate()?;
                return Ok(LoadedConfig {
                    config,
                    source: DEFAULTS_SOURCE.to_owned(),
                });
            }
            default
        }
    };

    let config = NetlogConfig::load(&path).await?;
    Ok(LoadedConfig {
        config,
        source: path.display().to_string(),
    })
}

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: Option<&Path>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Execute the config validate subcommand.
///
/// # Errors
///
/// Returns `CliError::Config` if validation fails (missing file, invalid values, parse errors).
async fn execute_validate(
    config_path: Option<&Path>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let report = validate_report(config_path).await;
    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Load the configuration and turn the outcome into a report.
pub async fn validate_report(config_path: Option<&Path>) -> ConfigValidationReport {
    let fallback_source = config_path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_owned());
    info!(source = %fallback_source, "validating configuration");

    match load_effective(config_path).await {
        Ok(loaded) => ConfigValidationReport {
            source: loaded.source,
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: fallback_source,
            valid: false,
            errors: vec![e.to_string()],
        },
    }
}

/// Execute the config show subcommand.
///
/// # Errors
///
/// Returns `CliError::Core` if loading fails or `CliError::Command` if the section name is unknown.
async fn execute_show(
    config_path: Option<&Path>,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let loaded = load_effective(config_path).await?;
    let report = show_report(&loaded, section)?;
    writer.render(&report)?;
    Ok(())
}

/// Build the `config show` report for the whole configuration or one section.
pub fn show_report(loaded: &LoadedConfig, section: Option<String>) -> Result<ConfigReport, CliError> {
    let config = &loaded.config;
    let config_toml = match section.as_deref() {
        None => to_toml(config)?,
        Some("general") => to_toml(&config.general)?,
        Some("router") => to_toml(&config.router)?,
        Some("normalizer") => to_toml(&config.normalizer)?,
        Some("passthrough") => to_toml(&config.passthrough)?,
        Some("runtime") => to_toml(&config.runtime)?,
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {} (expected: {})",
                other,
                SECTIONS.join(", ")
            )));
        }
    };

    let value = toml::from_str(&config_toml)
        .map_err(|e| CliError::Command(format!("failed to re-read configuration: {}", e)))?;

    Ok(ConfigReport {
        source: loaded.source.clone(),
        section,
        config: value,
        config_toml,
    })
}

fn to_toml<T: Serialize>(value: &T) -> Result<String, CliError> {
    toml::to_string_pretty(value)
        .map_err(|e| CliError::Command(format!("failed to serialize configuration: {}", e)))
}

/// Configuration display report.
///
/// Text output prints the TOML form; JSON output carries the same values
/// as a structured `config` object.
#[derive(Debug, Serialize)]
pub struct ConfigReport {
    /// Configuration file path or the defaults label
    pub source: String,
    /// Optional section name (None = full config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Structured configuration values
    pub config: toml::Table,
    /// Serialized TOML configuration
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(ref section) = self.section {
            let section_label = format!("[{}]", section);
            writeln!(
                w,
                "Configuration {} (source: {})",
                section_label.bold(),
                self.source
            )?;
        } else {
            writeln!(w, "Configuration (source: {})", self.source.bold())?;
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;

        Ok(())
    }
}

/// Configuration validation report.
#[derive(Debug, Serialize)]
pub struct ConfigValidationReport {
    /// Configuration file path
    pub source: String,
    /// Whether the configuration is valid
    pub valid: bool,
    /// Validation error messages (empty if valid)
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}
