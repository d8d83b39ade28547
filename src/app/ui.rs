// Renders the end-of-run summary to the terminal.

use std::io::{self, Write};

use crossterm::queue;
use crossterm::style::{Color, Print, PrintStyledContent, Stylize, style};

use super::RunSummary;

/// Writes the human-readable summary of a finished run.
pub fn render_summary(out: &mut impl Write, summary: &RunSummary, color: bool) -> io::Result<()> {
    match &summary.error {
        None => status_line(out, "Run completed successfully".to_string(), Color::Green, color)?,
        Some(error) => status_line(out, format!("Run failed: {error}"), Color::Red, color)?,
    }

    writeln!(out, "Stopped services logged: {}", summary.stopped_count)?;
    writeln!(out, "Log file: {}", summary.log_path.display())?;
    out.flush()
}

fn status_line(out: &mut impl Write, text: String, fg: Color, color: bool) -> io::Result<()> {
    if color {
        queue!(out, PrintStyledContent(style(text).with(fg).bold()), Print("\n"))
    } else {
        writeln!(out, "{text}")
    }
}
