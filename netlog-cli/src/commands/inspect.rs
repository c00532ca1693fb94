//! `netlog inspect` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use netlog_core::config::NetlogConfig;
use netlog_pipeline::{FileReport, FileStatus, FlattenPipeline, PipelineConfig};

use crate::cli::InspectArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `inspect` command.
///
/// Nothing is written under the output root.
pub async fn execute(
    args: InspectArgs,
    config: &NetlogConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let report = inspect(&args, config)?;
    writer.render(&report)?;

    if let FileStatus::Failed { reason } = &report.file.status {
        return Err(CliError::Command(format!(
            "{}: {}",
            report.file.source.display(),
            reason
        )));
    }

    Ok(())
}

/// Convert the first `args.limit` events of one file in memory.
pub fn inspect(args: &InspectArgs, config: &NetlogConfig) -> Result<InspectReport, CliError> {
    info!(file = %args.file.display(), limit = args.limit, "inspecting file");

    let pipeline = FlattenPipeline::new(PipelineConfig::from_core(config))?;
    let inspection = pipeline.inspect(&args.file, args.limit)?;

    let events = inspection
        .lines
        .iter()
        .map(|line| serde_json::from_str(line))
        .collect::<Result<Vec<serde_json::Value>, _>>()?;

    Ok(InspectReport {
        file: inspection.report,
        events,
        lines: inspection.lines,
    })
}

/// Single file preview.
#[derive(Serialize)]
pub struct InspectReport {
    pub file: FileReport,
    pub events: Vec<serde_json::Value>,
    /// Compact JSON lines, exactly as `run` would write them
    #[serde(skip)]
    pub lines: Vec<String>,
}

impl Render for InspectReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let mode = self.file.mode.map(|m| m.as_str()).unwrap_or("-");
        writeln!(
            w,
            "File: {} ({})",
            self.file.source.display().to_string().bold(),
            mode
        )?;
        if let Some(client) = &self.file.client {
            writeln!(w, "  Client: {}", client)?;
        }
        if let Some(destination) = &self.file.destination {
            writeln!(w, "  Destination: {}", destination.display())?;
        }
        writeln!(
            w,
            "  Records: {}  shown: {}  skipped: {}",
            self.file.records, self.file.written, self.file.skipped
        )?;
        if let FileStatus::Failed { reason } = &self.file.status {
            writeln!(w, "  Error: {}", reason.red())?;
        }

        writeln!(w)?;
        for line in &self.lines {
            writeln!(w, "{}", line)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn args(file: &Path, limit: usize) -> InspectArgs {
        InspectArgs {
            file: file.to_path_buf(),
            limit,
        }
    }

    #[test]
    fn test_inspect_limits_events_and_writes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("client_data/acme/network_logs/fw.log");
        std::fs::create_dir_all(source.parent().expect("parent")).expect("mkdir");
        std::fs::write(
            &source,
            "<1><2>x: proto=6 a=1\n<1><2>x: proto=17 a=2\n<1><2>x: proto=1 a=3\n",
        )
        .expect("write");

        let report = inspect(&args(&source, 2), &NetlogConfig::default()).expect("inspect");

        assert_eq!(report.events.len(), 2);
        assert_eq!(report.lines.len(), 2);
        assert_eq!(report.events[0]["network_transport"], "tcp");
        assert_eq!(report.events[1]["network_transport"], "udp");
        assert_eq!(report.file.client.as_deref(), Some("acme"));
        assert!(!dir.path().join("parsed_data").exists());
    }

    #[test]
    fn test_inspect_outside_marker_still_previews() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("loose.csv");
        std::fs::write(&source, "action=deny,proto=6\n").expect("write");

        let report = inspect(&args(&source, 10), &NetlogConfig::default()).expect("inspect");
        assert!(report.file.client.is_none());
        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0]["action"], "deny");
    }

    #[test]
    fn test_inspect_missing_file_is_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = inspect(&args(&dir.path().join("absent.log"), 10), &NetlogConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_inspect_report_render_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("cloud.json");
        std::fs::write(&source, "{\"b\":1,\"a\":2}\n").expect("write");

        let report = inspect(&args(&source, 10), &NetlogConfig::default()).expect("inspect");
        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render");
        let output = String::from_utf8(buffer).expect("valid UTF-8");

        assert!(output.contains("json_lines"));
        assert!(output.contains("{\"b\":1,\"a\":2}"));
    }
}
