//! Output formatting: table, JSON, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! JSON uses serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use adbdeck_core::{BatchOutcome, BatchReport};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

/// Resolved presentation settings for one invocation.
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    pub format: OutputFormat,
    pub color: bool,
    pub quiet: bool,
}

impl Printer {
    pub fn new(format: OutputFormat, color: ColorMode, quiet: bool) -> Self {
        Self {
            format,
            color: should_color(color),
            quiet,
        }
    }

    /// Render a list of records in the chosen format and print it.
    pub fn list<T, R>(
        &self,
        data: &[T],
        to_row: impl Fn(&T) -> R,
        id_fn: impl Fn(&T) -> String,
    ) -> Result<(), CliError>
    where
        T: serde::Serialize,
        R: Tabled,
    {
        let rendered = match self.format {
            OutputFormat::Table => {
                let rows: Vec<R> = data.iter().map(to_row).collect();
                render_table(&rows)
            }
            OutputFormat::Json => render_json(data)?,
            OutputFormat::Plain => data.iter().map(id_fn).collect::<Vec<_>>().join("\n"),
        };
        print_output(&rendered, self.quiet);
        Ok(())
    }

    /// Render one record. Table mode uses `detail_fn`'s pre-formatted text
    /// since detail views don't derive `Tabled`.
    pub fn single<T>(
        &self,
        data: &T,
        detail_fn: impl Fn(&T) -> String,
        id_fn: impl Fn(&T) -> String,
    ) -> Result<(), CliError>
    where
        T: serde::Serialize,
    {
        let rendered = match self.format {
            OutputFormat::Table => detail_fn(data),
            OutputFormat::Json => render_json(data)?,
            OutputFormat::Plain => id_fn(data),
        };
        print_output(&rendered, self.quiet);
        Ok(())
    }

    /// A dimmed footer line, shown in table mode only.
    pub fn footer(&self, text: &str) {
        if self.format != OutputFormat::Table {
            return;
        }
        if self.color {
            print_output(&text.dimmed().to_string(), self.quiet);
        } else {
            print_output(text, self.quiet);
        }
    }

    /// Report the result of a single-item operation.
    pub fn done(&self, operation: &str, message: &str) -> Result<(), CliError> {
        let rendered = match self.format {
            OutputFormat::Json => render_json(&serde_json::json!({
                "operation": operation,
                "success": true,
                "message": message,
            }))?,
            OutputFormat::Plain => message.to_owned(),
            OutputFormat::Table => {
                let head = format!("{operation} succeeded");
                let head = if self.color {
                    head.green().to_string()
                } else {
                    head
                };
                if message.is_empty() {
                    head
                } else {
                    format!("{head}: {message}")
                }
            }
        };
        print_output(&rendered, self.quiet);
        Ok(())
    }

    /// Print a batch report: headline, then each listed failure.
    pub fn report(&self, report: &BatchReport) -> Result<(), CliError> {
        let rendered = match self.format {
            OutputFormat::Json => render_json(report)?,
            OutputFormat::Plain => report
                .failures
                .iter()
                .map(|f| f.key.clone())
                .collect::<Vec<_>>()
                .join("\n"),
            OutputFormat::Table => self.report_text(report),
        };
        print_output(&rendered, self.quiet);
        Ok(())
    }

    fn report_text(&self, report: &BatchReport) -> String {
        let headline = format!("{}: {}", report.kind, report.headline());
        let headline = match (self.color, report.outcome()) {
            (false, _) => headline,
            (true, BatchOutcome::AllSucceeded) => headline.green().to_string(),
            (true, BatchOutcome::Partial) => headline.yellow().to_string(),
            (true, BatchOutcome::AllFailed) => headline.red().to_string(),
        };
        let mut lines = vec![headline];
        if let Some(summary) = &report.summary {
            lines.push(format!("  {summary}"));
        }
        for failure in report.shown_failures() {
            let key = if self.color {
                failure.key.bold().to_string()
            } else {
                failure.key.clone()
            };
            lines.push(format!("  {key}: {}", failure.message));
        }
        let hidden = report.hidden_failures();
        if hidden > 0 {
            lines.push(format!("  ...and {hidden} more"));
        }
        lines.join("\n")
    }
}

/// Determine whether color output should be enabled.
fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Human-readable byte count.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "K", "M", "G", "T"];
    let mut unit = 0;
    let mut whole = bytes;
    let mut rem = 0;
    while whole >= 1024 && unit < UNITS.len() - 1 {
        rem = whole % 1024;
        whole /= 1024;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        // One decimal, truncated.
        format!("{whole}.{}{}", rem * 10 / 1024, UNITS[unit])
    }
}
