//! Handler for the `promptcost samples` command.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use crate::cli::SampleFilter;
use crate::commands::print_json;
use crate::config::Config;
use crate::error::Result;
use crate::report::Analysis;
use crate::samples::{samples, ExamplePrompt, SampleKind};
use crate::tokens::CharEstimator;
use crate::utils::format_number;

#[derive(Debug)]
pub struct SamplesCommandOptions {
    pub kind: Option<SampleFilter>,
    pub analyze: bool,
    pub json: bool,
    pub quiet: bool,
    pub config_path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct SampleEntry {
    #[serde(flatten)]
    sample: &'static ExamplePrompt,
    #[serde(skip_serializing_if = "Option::is_none")]
    analysis: Option<Analysis>,
}

pub fn run(options: SamplesCommandOptions) -> Result<()> {
    let config = Config::discover(options.config_path.as_deref())?;
    let analyzer = config.analyzer();
    let kind = options.kind.map(|k| match k {
        SampleFilter::Good => SampleKind::Good,
        SampleFilter::Bad => SampleKind::Bad,
    });

    // Samples are analyzed with the heuristic so counts are stable.
    let entries: Vec<SampleEntry> = samples(kind)
        .map(|sample| SampleEntry {
            sample,
            analysis: options
                .analyze
                .then(|| Analysis::new(sample.prompt, &CharEstimator::default(), &analyzer)),
        })
        .collect();

    if options.json {
        return print_json(&entries);
    }

    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            println!();
        }
        let title = match entry.sample.kind {
            SampleKind::Good => entry.sample.title.green().bold(),
            SampleKind::Bad => entry.sample.title.red().bold(),
        };
        println!("{title}");
        println!("{}", entry.sample.prompt);
        if !options.quiet {
            println!("{}", entry.sample.explanation.dimmed());
        }
        if let Some(ref analysis) = entry.analysis {
            println!(
                "  {} tokens, {} issue(s), {} suggestion(s)",
                format_number(analysis.tokens),
                analysis.issues.len(),
                analysis.suggestions.len()
            );
        }
    }
    Ok(())
}
