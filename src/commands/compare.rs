//! Handler for the `promptcost compare` command.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use crate::cli::PromptInput;
use crate::commands::{print_json, read_prompt};
use crate::config::Config;
use crate::cost::{
    cheapest, cost_severity, filter_by_provider, get_cost_breakdown, most_expensive,
    CostBreakdown, CostSeverity,
};
use crate::error::{PromptCostError, Result};
use crate::tokens::{self, estimate_output_tokens_with_ratio};
use crate::utils::{format_currency, format_number, paint_cost};

#[derive(Debug)]
pub struct CompareCommandOptions {
    pub input: PromptInput,
    pub provider: Option<String>,
    pub sort: bool,
    pub json: bool,
    pub config_path: Option<PathBuf>,
}

/// One table row: a breakdown plus its tier.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompareRow {
    #[serde(flatten)]
    breakdown: CostBreakdown,
    severity: CostSeverity,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompareOutput {
    input_tokens: usize,
    output_tokens: usize,
    models: Vec<CompareRow>,
    cheapest: Option<String>,
    most_expensive: Option<String>,
}

pub fn run(options: CompareCommandOptions) -> Result<()> {
    let config = Config::discover(options.config_path.as_deref())?;
    let text = read_prompt(&options.input)?;
    let estimator = tokens::estimator(options.input.heuristic);

    let input_tokens = estimator.estimate(&text);
    let output_tokens = estimate_output_tokens_with_ratio(input_tokens, config.output_ratio);
    let all = get_cost_breakdown(config.catalog(), input_tokens, output_tokens);

    let mut breakdown = filter_by_provider(&all, options.provider.as_deref());
    if breakdown.is_empty() {
        return Err(PromptCostError::validation(
            "provider",
            format!(
                "no models from '{}' in the catalog",
                options.provider.unwrap_or_default()
            ),
        ));
    }
    if options.sort {
        breakdown.sort_by(|a, b| a.total_cost.total_cmp(&b.total_cost));
    }

    let low = cheapest(&breakdown).map(|b| b.model_name.clone());
    let high = most_expensive(&breakdown).map(|b| b.model_name.clone());
    let rows: Vec<CompareRow> = breakdown
        .into_iter()
        .map(|b| CompareRow {
            severity: cost_severity(b.total_cost, &config.cost_thresholds),
            breakdown: b,
        })
        .collect();

    let output = CompareOutput {
        input_tokens,
        output_tokens,
        models: rows,
        cheapest: low,
        most_expensive: high,
    };

    if options.json {
        return print_json(&output);
    }
    print_table(&output);
    Ok(())
}

fn print_table(output: &CompareOutput) {
    println!(
        "{}",
        format!(
            "Cost comparison ({} in, ~{} out)",
            format_number(output.input_tokens),
            format_number(output.output_tokens)
        )
        .bold()
    );
    println!(
        "  {:<22} {:<10} {:>11} {:>11} {:>11}  {}",
        "model", "provider", "input", "output", "total", "tier"
    );
    for row in &output.models {
        let b = &row.breakdown;
        println!(
            "  {:<22} {:<10} {:>11} {:>11} {:>11}  {}",
            b.model_name,
            b.provider,
            format_currency(b.input_cost),
            format_currency(b.output_cost),
            format_currency(b.total_cost),
            paint_cost(row.severity.as_str(), row.severity),
        );
    }

    if let (Some(low), Some(high)) = (&output.cheapest, &output.most_expensive) {
        println!();
        println!("  cheapest:       {}", low.green());
        println!("  most expensive: {}", high.red());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::default_config;

    fn options(provider: Option<&str>, config: &std::path::Path) -> CompareCommandOptions {
        CompareCommandOptions {
            input: PromptInput {
                text: Some("Summarize the attached meeting notes".into()),
                file: None,
                heuristic: true,
            },
            provider: provider.map(String::from),
            sort: true,
            json: true,
            config_path: Some(config.to_path_buf()),
        }
    }

    #[test]
    fn compare_known_provider() {
        let (_dir, config) = default_config();
        run(options(Some("Anthropic"), &config)).unwrap();
    }

    #[test]
    fn unknown_provider_is_user_error() {
        let (_dir, config) = default_config();
        let err = run(options(Some("Nobody"), &config)).unwrap_err();
        assert!(err.is_user_error());
    }

    #[test]
    fn row_serializes_flat() {
        let row = CompareRow {
            breakdown: CostBreakdown {
                model_name: "M".into(),
                input_cost: 0.0,
                output_cost: 0.0,
                total_cost: 0.0,
                color: "#000".into(),
                provider: "P".into(),
            },
            severity: CostSeverity::Cheap,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["modelName"], "M");
        assert_eq!(json["severity"], "cheap");
    }
}
