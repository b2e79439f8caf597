//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one record per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use portsplit_core::{Disposition, InterfaceOutcome};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color ────────────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

fn paint_disposition(disposition: Disposition, color: bool) -> String {
    let label = disposition.to_string();
    if !color {
        return label;
    }
    match disposition {
        Disposition::Templated => label.green().to_string(),
        Disposition::Retained => label.cyan().to_string(),
        Disposition::Excluded | Disposition::Dropped => label.yellow().to_string(),
    }
}

// ── Interface outcome table ──────────────────────────────────────────

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "Interface")]
    interface: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Disposition")]
    disposition: String,
    #[tabled(rename = "Lines")]
    lines: usize,
}

impl OutcomeRow {
    fn new(outcome: &InterfaceOutcome, color: bool) -> Self {
        Self {
            interface: outcome
                .interface
                .strip_prefix("interface ")
                .unwrap_or(&outcome.interface)
                .to_owned(),
            category: outcome.category.to_string(),
            disposition: paint_disposition(outcome.disposition, color),
            lines: outcome.body_lines,
        }
    }
}

/// Classification table for a list of interface outcomes.
pub fn outcome_table(outcomes: &[InterfaceOutcome], color: bool) -> String {
    if outcomes.is_empty() {
        return "No interfaces found".into();
    }
    let rows: Vec<_> = outcomes.iter().map(|o| OutcomeRow::new(o, color)).collect();
    render_table(&rows)
}

/// `<header>\t<category>\t<disposition>` for scripting.
pub fn outcome_plain(outcome: &InterfaceOutcome) -> String {
    format!(
        "{}\t{}\t{}",
        outcome.interface, outcome.category, outcome.disposition
    )
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn` for a pre-formatted human view; plain
/// uses `plain_fn`.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    plain_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
{
    Ok(match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
        OutputFormat::Plain => plain_fn(data),
    })
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    if output.ends_with('\n') {
        let _ = write!(stdout, "{output}");
    } else {
        let _ = writeln!(stdout, "{output}");
    }
}

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}
