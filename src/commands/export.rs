//! Handler for the `promptcost export` command.
//!
//! Bundles the current draft (if any), every saved prompt repriced against
//! the active catalog, and the selected prompts into one report.

use std::path::PathBuf;

use chrono::Utc;
use colored::Colorize;
use tracing::info;

use crate::cli::{ExportFormat, PromptInput};
use crate::commands::{open_store, read_explicit_prompt};
use crate::config::Config;
use crate::error::Result;
use crate::history::History;
use crate::output::{default_export_path, format_report, write_output, FormatOptions};
use crate::report::{Analysis, ExportReport};
use crate::tokens;
use crate::utils::cli_format_to_output_format;

#[derive(Debug)]
pub struct ExportCommandOptions {
    pub input: PromptInput,
    pub format: ExportFormat,
    pub out: Option<PathBuf>,
    pub stdout: bool,
    pub store: Option<PathBuf>,
    pub quiet: bool,
    pub config_path: Option<PathBuf>,
}

pub fn run(options: ExportCommandOptions) -> Result<()> {
    let config = Config::discover(options.config_path.as_deref())?;
    let analyzer = config.analyzer();
    let history = History::open(open_store(options.store.as_deref(), &config)?)?;

    let current = read_explicit_prompt(&options.input)?
        .filter(|text| !text.trim().is_empty())
        .map(|text| {
            let estimator = tokens::estimator(options.input.heuristic);
            Analysis::new(&text, estimator.as_ref(), &analyzer)
        });

    let now = Utc::now();
    let report = ExportReport::build(
        now,
        current,
        history.prompts(),
        &history.selected_prompts(),
        &analyzer,
    );

    let format = cli_format_to_output_format(&options.format);
    let content = format_report(&report, format)?;

    let out = match options.out {
        Some(path) => Some(path),
        None if options.stdout => None,
        None => Some(default_export_path(format, now.timestamp_millis())),
    };
    let target = FormatOptions {
        format,
        stdout: options.stdout,
        out,
    };
    write_output(&content, &target)?;

    if let (false, Some(path)) = (target.stdout, target.out.as_ref()) {
        info!(path = %path.display(), saved = report.saved_prompts.len(), "export written");
        if !options.quiet {
            eprintln!("{} Wrote {}", "ok".green().bold(), path.display());
        }
    }
    Ok(())
}
