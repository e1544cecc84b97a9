//! Shared display helpers used across commands.

use colored::{ColoredString, Colorize};

use crate::analyzer::Severity;
use crate::cli::ExportFormat;
use crate::cost::CostSeverity;
use crate::output::Format;

// ---------------------------------------------------------------------------
// Number formatting
// ---------------------------------------------------------------------------

/// Format a dollar amount: six decimals below one cent, four otherwise.
pub fn format_currency(amount: f64) -> String {
    if amount < 0.01 {
        format!("${amount:.6}")
    } else {
        format!("${amount:.4}")
    }
}

/// Abbreviate large counts: `1.50K`, `2.00M`.
pub fn format_number(n: usize) -> String {
    if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1000 {
        format!("{:.2}K", n as f64 / 1000.0)
    } else {
        n.to_string()
    }
}

/// Format a dollar amount with two decimals, for monthly/yearly totals.
pub fn format_dollars(amount: f64) -> String {
    format!("${amount:.2}")
}

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

/// Color a label by cost tier: green, yellow, red.
pub fn paint_cost(text: &str, severity: CostSeverity) -> ColoredString {
    match severity {
        CostSeverity::Cheap => text.green(),
        CostSeverity::Moderate => text.yellow(),
        CostSeverity::Expensive => text.red(),
    }
}

/// Color a label by issue severity.
pub fn paint_severity(text: &str, severity: Severity) -> ColoredString {
    match severity {
        Severity::Low => text.blue(),
        Severity::Medium => text.yellow(),
        Severity::High => text.red().bold(),
    }
}

// ---------------------------------------------------------------------------
// Format mapping
// ---------------------------------------------------------------------------

/// Map the clap [`ExportFormat`] to the library [`Format`].
pub fn cli_format_to_output_format(fmt: &ExportFormat) -> Format {
    match fmt {
        ExportFormat::Json => Format::Json,
        ExportFormat::Markdown => Format::Markdown,
        ExportFormat::Plain => Format::Plain,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
