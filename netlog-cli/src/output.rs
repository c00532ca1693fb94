//! Output formatting abstraction for text vs JSON rendering
//!
//! All subcommand output flows through [`OutputWriter`] which handles format switching.
//! This keeps format-specific logic out of command handlers entirely.

use std::io::Write;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Abstraction for writing CLI output in different formats.
///
/// Subcommand handlers call `writer.render(&payload)` where `payload`
/// implements both `Serialize` (for JSON) and `Render` (for text).
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    /// Create a new output writer with the specified format.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use netlog_cli::output::OutputWriter;
    /// use netlog_cli::cli::OutputFormat;
    ///
    /// let writer = OutputWriter::new(OutputFormat::Text);
    /// ```
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render a payload to stdout.
    pub fn render<T: Render + Serialize>(&self, payload: &T) -> Result<(), CliError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.render_to(&mut handle, payload)
    }

    /// Render a payload to an arbitrary sink.
    ///
    /// For `Text` format, delegates to `Render::render_text()`.
    /// For `Json` format, serialises via `serde_json`.
    pub fn render_to<T: Render + Serialize>(
        &self,
        w: &mut dyn Write,
        payload: &T,
    ) -> Result<(), CliError> {
        match self.format {
            OutputFormat::Text => {
                payload.render_text(w)?;
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *w, payload)?;
                writeln!(w)?;
            }
        }
        Ok(())
    }
}

/// Trait for human-readable text rendering.
///
/// Implemented by every CLI output payload alongside `serde::Serialize`.
pub trait Render {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()>;
}
