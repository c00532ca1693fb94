//! `netlog run` command handler

use std::io::Write;

use tracing::{info, warn};

use netlog_core::config::NetlogConfig;
use netlog_pipeline::{FileStatus, FlattenPipeline, PipelineConfig, PipelineConfigBuilder, RunSummary};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `run` command.
///
/// Renders the run summary and returns `CliError::RunFailed` when any
/// source file could not be converted.
pub async fn execute(
    args: RunArgs,
    config: &NetlogConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let summary = run(args, config).await?;
    writer.render(&summary)?;

    if summary.has_failures() {
        return Err(CliError::RunFailed {
            failed: summary.totals.failed,
        });
    }

    Ok(())
}

/// Build the pipeline from configuration plus command-line overrides and run it.
pub async fn run(args: RunArgs, config: &NetlogConfig) -> Result<RunSummary, CliError> {
    let pipeline_config = pipeline_config(args, config)?;

    if !pipeline_config.input_root.is_dir() {
        return Err(CliError::Command(format!(
            "input root is not a directory: {}",
            pipeline_config.input_root.display()
        )));
    }

    let pipeline = FlattenPipeline::new(pipeline_config)?;
    let summary = pipeline.run().await?;

    info!(
        files = summary.totals.files,
        ok = summary.totals.ok,
        failed = summary.totals.failed,
        superseded = summary.totals.superseded,
        written = summary.totals.written,
        "flatten run finished"
    );
    if summary.has_failures() {
        warn!(failed = summary.totals.failed, "some files could not be converted");
    }

    Ok(summary)
}

/// Apply `run` arguments on top of the file configuration.
pub fn pipeline_config(args: RunArgs, config: &NetlogConfig) -> Result<PipelineConfig, CliError> {
    let mut builder = PipelineConfigBuilder::from_core(config);
    if let Some(root) = args.root {
        builder = builder.input_root(root);
    }
    if let Some(output_root) = args.output_root {
        builder = builder.output_root(output_root);
    }
    if let Some(workers) = args.workers {
        builder = builder.workers(workers);
    }
    Ok(builder.build()?)
}

impl Render for RunSummary {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Run: {} -> {}",
            self.input_root.display().to_string().bold(),
            self.output_root.display()
        )?;
        writeln!(
            w,
            "Files: {} (ok {}, failed {}, superseded {})",
            self.totals.files,
            self.totals.ok.to_string().green(),
            if self.totals.failed > 0 {
                self.totals.failed.to_string().red()
            } else {
                self.totals.failed.to_string().normal()
            },
            self.totals.superseded.to_string().yellow()
        )?;
        writeln!(
            w,
            "Records: {}  written: {}  skipped: {}",
            self.totals.records, self.totals.written, self.totals.skipped
        )?;

        if self.files.is_empty() {
            return Ok(());
        }

        writeln!(w)?;
        writeln!(
            w,
            "{:<11} {:<13} {:>8} {:>8} {:>8}  Source",
            "Status", "Mode", "Records", "Written", "Skipped"
        )?;
        writeln!(w, "{}", "-".repeat(78))?;

        for report in &self.files {
            let status = match &report.status {
                FileStatus::Ok => format!("{:<11}", "ok").green(),
                FileStatus::Failed { .. } => format!("{:<11}", "failed").red(),
                FileStatus::Superseded { .. } => format!("{:<11}", "superseded").yellow(),
            };
            let mode = report.mode.map(|m| m.as_str()).unwrap_or("-");
            let source = report
                .source
                .strip_prefix(&self.input_root)
                .unwrap_or(&report.source);

            writeln!(
                w,
                "{} {:<13} {:>8} {:>8} {:>8}  {}",
                status,
                mode,
                report.records,
                report.written,
                report.skipped,
                source.display()
            )?;

            match &report.status {
                FileStatus::Failed { reason } => writeln!(w, "  {}", reason.dimmed())?,
                FileStatus::Superseded { by } => {
                    writeln!(w, "  {}", format!("superseded by {}", by.display()).dimmed())?
                }
                FileStatus::Ok => {}
            }
        }

        Ok(())
    }
}
