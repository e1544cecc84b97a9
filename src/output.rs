//! Output formatting for export reports.
//!
//! Transforms an [`ExportReport`] into the user's chosen format (JSON,
//! Markdown, or plain text) and writes the result to a file or stdout.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{PromptCostError, Result};
use crate::report::{Analysis, ExportReport};
use crate::utils::{format_currency, format_number};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Controls where and how output is written.
#[derive(Debug, Clone)]
pub struct FormatOptions {
    pub format: Format,
    /// If true, write to stdout instead of a file.
    pub stdout: bool,
    /// File path to write to (ignored when `stdout` is true).
    pub out: Option<PathBuf>,
}

/// Supported export formats.
///
/// Mirrors [`crate::cli::ExportFormat`] but decoupled from clap so that
/// library code can use it without pulling in CLI dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Markdown,
    Plain,
}

impl Format {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
            Self::Plain => "txt",
        }
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Render a report to a string in the given format.
pub fn format_report(report: &ExportReport, format: Format) -> Result<String> {
    match format {
        Format::Json => format_json(report),
        Format::Markdown => Ok(format_markdown(report)),
        Format::Plain => Ok(format_plain(report)),
    }
}

fn format_json(report: &ExportReport) -> Result<String> {
    serde_json::to_string_pretty(report)
        .map_err(|e| PromptCostError::serialization("encoding export report", e))
}

/// Markdown: one cost table per prompt.
fn format_markdown(report: &ExportReport) -> String {
    let mut out = String::new();
    out.push_str("# Token Cost Analysis\n\n");
    out.push_str(&format!("> generated {}\n\n", report.timestamp));

    if let Some(ref current) = report.current_prompt {
        out.push_str("## Current prompt\n\n");
        push_quoted(&mut out, &current.text);
        push_token_line(&mut out, current.tokens, current.estimated_output_tokens);
        push_cost_table(&mut out, current);

        if !current.issues.is_empty() {
            out.push_str("### Issues\n\n");
            for issue in &current.issues {
                out.push_str(&format!(
                    "- **{}** ({}): {} *{}*\n",
                    issue.kind.as_str(),
                    issue.severity.as_str(),
                    issue.message,
                    issue.suggestion
                ));
            }
            out.push('\n');
        }
        if !current.suggestions.is_empty() {
            out.push_str("### Suggestions\n\n");
            for s in &current.suggestions {
                out.push_str(&format!("- {s}\n"));
            }
            out.push('\n');
        }
    }

    if !report.saved_prompts.is_empty() {
        out.push_str(&format!("## Saved prompts ({})\n\n", report.saved_prompts.len()));
        for priced in &report.saved_prompts {
            let selected = report
                .selected_prompts
                .iter()
                .any(|p| p.id == priced.prompt.id);
            out.push_str(&format!(
                "### `{}`{}\n\n",
                priced.prompt.id,
                if selected { " (selected)" } else { "" }
            ));
            push_quoted(&mut out, &priced.prompt.text);
            push_token_line(&mut out, priced.prompt.tokens, priced.prompt.estimated_output_tokens);
            out.push_str("| Model | Provider | Total |\n|---|---|---:|\n");
            for c in &priced.costs {
                out.push_str(&format!(
                    "| {} | {} | {} |\n",
                    c.model_name,
                    c.provider,
                    format_currency(c.total_cost)
                ));
            }
            out.push('\n');
        }
    }

    out
}

fn push_quoted(out: &mut String, text: &str) {
    for line in text.lines() {
        out.push_str(&format!("> {line}\n"));
    }
    out.push('\n');
}

fn push_token_line(out: &mut String, input: usize, output: usize) {
    out.push_str(&format!(
        "Tokens: {} in, ~{} out\n\n",
        format_number(input),
        format_number(output)
    ));
}

fn push_cost_table(out: &mut String, analysis: &Analysis) {
    out.push_str("| Model | Provider | Input | Output | Total |\n|---|---|---:|---:|---:|\n");
    for c in &analysis.costs {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            c.model_name,
            c.provider,
            format_currency(c.input_cost),
            format_currency(c.output_cost),
            format_currency(c.total_cost)
        ));
    }
    out.push('\n');
}

/// Plain text: no decoration, one cost per line.
fn format_plain(report: &ExportReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("Token cost analysis ({})\n\n", report.timestamp));

    if let Some(ref current) = report.current_prompt {
        out.push_str("--- current prompt ---\n");
        out.push_str(&current.text);
        out.push('\n');
        out.push_str(&format!(
            "tokens: {} in, {} out\n",
            current.tokens, current.estimated_output_tokens
        ));
        for c in &current.costs {
            out.push_str(&format!("  {:<24} {}\n", c.model_name, format_currency(c.total_cost)));
        }
        for issue in &current.issues {
            out.push_str(&format!("  [{}] {}\n", issue.severity.as_str(), issue.message));
        }
        for s in &current.suggestions {
            out.push_str(&format!("  * {s}\n"));
        }
        out.push('\n');
    }

    for priced in &report.saved_prompts {
        out.push_str(&format!("--- {} ---\n", priced.prompt.id));
        out.push_str(&priced.prompt.text);
        out.push('\n');
        for c in &priced.costs {
            out.push_str(&format!("  {:<24} {}\n", c.model_name, format_currency(c.total_cost)));
        }
        out.push('\n');
    }

    out
}

// ---------------------------------------------------------------------------
// Output writing
// ---------------------------------------------------------------------------

/// Default export file name: `token-analysis-<millis>.<ext>`.
pub fn default_export_path(format: Format, millis: i64) -> PathBuf {
    PathBuf::from(format!("token-analysis-{millis}.{}", format.extension()))
}

/// Write a formatted string to the appropriate destination.
///
/// If `options.stdout` is true, or no path is given, writes to stdout.
/// Otherwise writes to `options.out`, creating parent directories as needed.
pub fn write_output(content: &str, options: &FormatOptions) -> Result<()> {
    match options.out {
        Some(ref path) if !options.stdout => write_to_file(content, path),
        _ => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .map_err(|e| PromptCostError::io("writing to stdout", e))
        }
    }
}

/// Write content to a file, creating parent directories if needed.
fn write_to_file(content: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PromptCostError::io(format!("creating directory '{}'", parent.display()), e)
            })?;
        }
    }
    std::fs::write(path, content)
        .map_err(|e| PromptCostError::io(format!("writing output to '{}'", path.display()), e))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Analyzer;
    use crate::history::Prompt;
    use crate::tokens::CharEstimator;
    use chrono::DateTime;

    fn sample_report() -> ExportReport {
        let analyzer = Analyzer::default();
        let current = Analysis::new(
            "Summarize this in order to save time",
            &CharEstimator::default(),
            &analyzer,
        );
        let prompts = vec![Prompt {
            id: "1700000000000".to_string(),
            text: "Translate to French".to_string(),
            timestamp: 1_700_000_000_000,
            tokens: 4,
            estimated_output_tokens: 7,
        }];
        let selected = prompts.clone();
        let at = DateTime::from_timestamp_millis(0).unwrap();
        ExportReport::build(at, Some(current), &prompts, &selected, &analyzer)
    }

    #[test]
    fn json_is_valid() {
        let output = format_report(&sample_report(), Format::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["savedPrompts"].as_array().unwrap().len(), 1);
        assert_eq!(parsed["timestamp"], "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn markdown_has_sections_and_tables() {
        let output = format_report(&sample_report(), Format::Markdown).unwrap();
        assert!(output.starts_with("# Token Cost Analysis"));
        assert!(output.contains("## Current prompt"));
        assert!(output.contains("| GPT-4 | OpenAI |"));
        assert!(output.contains("### `1700000000000` (selected)"));
        assert!(output.contains(r#"- Replace "in order to" with "to""#));
    }

    #[test]
    fn plain_has_separators() {
        let output = format_report(&sample_report(), Format::Plain).unwrap();
        assert!(output.contains("--- current prompt ---"));
        assert!(output.contains("--- 1700000000000 ---"));
        assert!(output.contains("Gemini 2.0 Flash"));
    }

    #[test]
    fn default_path_uses_extension() {
        assert_eq!(
            default_export_path(Format::Markdown, 42),
            PathBuf::from("token-analysis-42.md")
        );
        assert_eq!(
            default_export_path(Format::Json, 42),
            PathBuf::from("token-analysis-42.json")
        );
    }

    #[test]
    fn write_to_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("dir").join("report.json");
        write_to_file("{}", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }
}
