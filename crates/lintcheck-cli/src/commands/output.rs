//! Shared output formatting for lint results.

use anyhow::Result;
use lintcheck_core::report::{color_enabled, render_compact, render_json, render_text};
use lintcheck_core::Report;
use std::io::{IsTerminal, Write};

use crate::OutputFormat;

/// Print lint results in the specified format.
pub fn print(report: &Report, format: OutputFormat) -> Result<()> {
    let rendered = match format {
        OutputFormat::Text => {
            let color = color_enabled() && std::io::stdout().is_terminal();
            render_text(report, color)
        }
        OutputFormat::Json => render_json(report)? + "\n",
        OutputFormat::Compact => render_compact(report),
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
