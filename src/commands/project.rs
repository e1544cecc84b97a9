//! Handler for the `promptcost project` command.
//!
//! Extrapolates one request's cost to monthly and yearly totals at a fixed
//! request rate, plus a ladder of common rates.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use crate::cli::PromptInput;
use crate::commands::{print_json, read_prompt};
use crate::config::Config;
use crate::cost::{
    filter_by_provider, get_cost_breakdown, potential_savings, project_usage, projection_table,
    UsageProjection,
};
use crate::error::{PromptCostError, Result};
use crate::pricing::PROJECTION_LADDER;
use crate::tokens::{self, estimate_output_tokens_with_ratio};
use crate::utils::{format_currency, format_dollars};

#[derive(Debug)]
pub struct ProjectCommandOptions {
    pub input: PromptInput,
    pub per_day: Option<u64>,
    pub provider: Option<String>,
    pub json: bool,
    pub config_path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LadderRung {
    frequency: u64,
    min_monthly: f64,
    max_monthly: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectOutput {
    per_day: u64,
    projections: Vec<UsageProjection>,
    ladder: Vec<LadderRung>,
    monthly_savings: f64,
}

pub fn run(options: ProjectCommandOptions) -> Result<()> {
    let config = Config::discover(options.config_path.as_deref())?;
    let per_day = options.per_day.unwrap_or(config.default_frequency);
    if per_day == 0 {
        return Err(PromptCostError::validation("per-day", "must be greater than 0"));
    }

    let text = read_prompt(&options.input)?;
    let estimator = tokens::estimator(options.input.heuristic);
    let input_tokens = estimator.estimate(&text);
    let output_tokens = estimate_output_tokens_with_ratio(input_tokens, config.output_ratio);

    let all = get_cost_breakdown(config.catalog(), input_tokens, output_tokens);
    let breakdown = filter_by_provider(&all, options.provider.as_deref());
    if breakdown.is_empty() {
        return Err(PromptCostError::validation(
            "provider",
            format!(
                "no models from '{}' in the catalog",
                options.provider.unwrap_or_default()
            ),
        ));
    }

    let projections = project_usage(&breakdown, per_day);
    let ladder = projection_table(&breakdown, &PROJECTION_LADDER)
        .into_iter()
        .map(|(frequency, rows)| LadderRung {
            frequency,
            min_monthly: rows.iter().map(|p| p.monthly_cost).fold(f64::INFINITY, f64::min),
            max_monthly: rows.iter().map(|p| p.monthly_cost).fold(0.0, f64::max),
        })
        .collect();

    let output = ProjectOutput {
        per_day,
        monthly_savings: potential_savings(&projections),
        projections,
        ladder,
    };

    if options.json {
        return print_json(&output);
    }
    print_projection(&output);
    Ok(())
}

fn print_projection(output: &ProjectOutput) {
    println!(
        "{}",
        format!("Usage projection at {} requests/day", output.per_day).bold()
    );
    println!(
        "  {:<22} {:>12} {:>12} {:>12}",
        "model", "per request", "monthly", "yearly"
    );
    for p in &output.projections {
        println!(
            "  {:<22} {:>12} {:>12} {:>12}",
            p.model_name,
            format_currency(p.cost_per_request),
            format_dollars(p.monthly_cost),
            format_dollars(p.yearly_cost),
        );
    }

    println!();
    println!("{}", "Monthly cost by volume".bold());
    for rung in &output.ladder {
        println!(
            "  {:>5}/day  {} - {}",
            rung.frequency,
            format_dollars(rung.min_monthly),
            format_dollars(rung.max_monthly)
        );
    }

    let cheapest = output
        .projections
        .iter()
        .reduce(|a, b| if b.monthly_cost < a.monthly_cost { b } else { a });
    let yearly = output.projections.iter().map(|p| p.yearly_cost);
    let min_yearly = yearly.clone().fold(f64::INFINITY, f64::min);
    let max_yearly = yearly.fold(0.0, f64::max);

    if let Some(cheapest) = cheapest {
        println!();
        println!(
            "  Choosing {} saves up to {} compared to the most expensive option.",
            cheapest.model_name.green(),
            format!("{}/month", format_dollars(output.monthly_savings)).bold()
        );
        println!(
            "  Yearly spend ranges from {} to {} depending on the model.",
            format_dollars(min_yearly),
            format_dollars(max_yearly)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::default_config;

    fn options(per_day: Option<u64>, json: bool, config: &std::path::Path) -> ProjectCommandOptions {
        ProjectCommandOptions {
            input: PromptInput {
                text: Some("Draft a product announcement".into()),
                file: None,
                heuristic: true,
            },
            per_day,
            provider: None,
            json,
            config_path: Some(config.to_path_buf()),
        }
    }

    #[test]
    fn project_text_and_json() {
        let (_dir, config) = default_config();
        run(options(Some(250), false, &config)).unwrap();
        run(options(None, true, &config)).unwrap();
    }

    #[test]
    fn zero_rate_is_rejected() {
        let (_dir, config) = default_config();
        let err = run(options(Some(0), false, &config)).unwrap_err();
        assert!(err.is_user_error());
    }
}
