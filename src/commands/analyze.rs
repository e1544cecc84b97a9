//! Handler for the `promptcost analyze` command.
//!
//! Shows the token breakdown, a one-line cost summary, detected issues, and
//! rewrite suggestions for a single prompt.

use std::path::PathBuf;

use colored::Colorize;

use crate::cli::PromptInput;
use crate::commands::{print_json, read_prompt};
use crate::config::Config;
use crate::cost::{average_cost, cheapest, cost_severity, most_expensive};
use crate::error::Result;
use crate::report::Analysis;
use crate::tokens;
use crate::utils::{format_currency, format_number, paint_cost, paint_severity};

#[derive(Debug)]
pub struct AnalyzeCommandOptions {
    pub input: PromptInput,
    pub json: bool,
    pub quiet: bool,
    pub config_path: Option<PathBuf>,
}

pub fn run(options: AnalyzeCommandOptions) -> Result<()> {
    let config = Config::discover(options.config_path.as_deref())?;
    let text = read_prompt(&options.input)?;
    let estimator = tokens::estimator(options.input.heuristic);
    let analysis = Analysis::new(&text, estimator.as_ref(), &config.analyzer());

    if options.json {
        return print_json(&analysis);
    }
    print_analysis(&analysis, &config, options.quiet);
    Ok(())
}

fn print_analysis(analysis: &Analysis, config: &Config, quiet: bool) {
    println!("{}", "Token Breakdown".bold());
    println!(
        "  input tokens:    {} ({})",
        format_number(analysis.tokens),
        analysis.tokenizer
    );
    println!(
        "  output tokens:   ~{} (est.)",
        format_number(analysis.estimated_output_tokens)
    );
    println!("  total tokens:    {}", format_number(analysis.total_tokens()));

    let thresholds = &config.cost_thresholds;
    if let (Some(low), Some(high)) = (cheapest(&analysis.costs), most_expensive(&analysis.costs)) {
        let avg = average_cost(&analysis.costs);
        println!();
        println!("{}", "Cost".bold());
        println!(
            "  cheapest:        {} {}",
            low.model_name,
            paint_cost(&format_currency(low.total_cost), cost_severity(low.total_cost, thresholds))
        );
        println!(
            "  most expensive:  {} {}",
            high.model_name,
            paint_cost(&format_currency(high.total_cost), cost_severity(high.total_cost, thresholds))
        );
        println!(
            "  average:         {}",
            paint_cost(&format_currency(avg), cost_severity(avg, thresholds))
        );
    }

    println!();
    if analysis.issues.is_empty() {
        println!("{}", "No issues found.".green());
    } else {
        println!("{}", "Issues".bold());
        for issue in &analysis.issues {
            let tag = format!("[{}]", issue.severity.as_str().to_uppercase());
            println!(
                "  {} {:<13} {}",
                paint_severity(&tag, issue.severity),
                issue.kind.as_str(),
                issue.message
            );
            if !quiet {
                println!("  {}", format!("   -> {}", issue.suggestion).dimmed());
            }
        }
    }

    if !analysis.suggestions.is_empty() {
        println!();
        println!("{}", "Suggestions".bold());
        for s in &analysis.suggestions {
            println!("  * {s}");
        }
    }
}
