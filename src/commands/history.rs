//! Handler for the `promptcost history` subcommands.

use std::path::PathBuf;

use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use serde::Serialize;
use tracing::info;

use crate::cli::HistoryCommand;
use crate::commands::{open_store, preview, print_json, read_prompt};
use crate::config::Config;
use crate::cost::{average_cost, cost_severity, get_cost_breakdown, CostBreakdown};
use crate::error::{PromptCostError, Result};
use crate::history::{History, Prompt, PromptStore};
use crate::tokens::{self, estimate_output_tokens_with_ratio};
use crate::utils::{format_currency, format_number, paint_cost};

#[derive(Debug)]
pub struct HistoryCommandOptions {
    pub command: HistoryCommand,
    pub store: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
    pub config_path: Option<PathBuf>,
}

/// A saved prompt as listed: the record plus derived cost fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListedPrompt<'a> {
    #[serde(flatten)]
    prompt: &'a Prompt,
    selected: bool,
    average_cost: f64,
}

pub fn run(options: HistoryCommandOptions) -> Result<()> {
    let config = Config::discover(options.config_path.as_deref())?;
    let store = open_store(options.store.as_deref(), &config)?;
    let mut history = History::open(store)?;
    let now = Utc::now();

    match options.command {
        HistoryCommand::Save { input } => {
            let text = read_prompt(&input)?;
            let estimator = tokens::estimator(input.heuristic);
            let tokens = estimator.estimate(&text);
            let output = estimate_output_tokens_with_ratio(tokens, config.output_ratio);
            match history.commit(&text, tokens, output, now.timestamp_millis())? {
                Some(prompt) => {
                    info!(id = %prompt.id, tokens, "saved prompt");
                    if options.json {
                        print_json(&prompt)?;
                    } else if !options.quiet {
                        println!(
                            "{} Saved prompt {} ({} tokens)",
                            "ok".green().bold(),
                            prompt.id.bold(),
                            format_number(prompt.tokens)
                        );
                    }
                    Ok(())
                }
                None => Err(PromptCostError::validation("text", "cannot save an empty prompt")),
            }
        }
        HistoryCommand::List => {
            if options.json {
                let listed: Vec<ListedPrompt<'_>> = history
                    .prompts()
                    .iter()
                    .map(|p| ListedPrompt {
                        prompt: p,
                        selected: history.is_selected(&p.id),
                        average_cost: average_cost(&costs_for(p, &config)),
                    })
                    .collect();
                return print_json(&listed);
            }
            print_list(&history, &config, now);
            Ok(())
        }
        HistoryCommand::Show { id } => {
            let prompt = history
                .get(&id)
                .ok_or_else(|| PromptCostError::not_found(id.as_str()))?;
            let costs = costs_for(prompt, &config);
            if options.json {
                return print_json(&ListedPrompt {
                    prompt,
                    selected: history.is_selected(&prompt.id),
                    average_cost: average_cost(&costs),
                });
            }
            print_prompt(prompt, &costs, &config, now);
            Ok(())
        }
        HistoryCommand::Delete { id } => {
            let removed = history.delete(&id)?;
            if !options.quiet {
                println!("{} Deleted prompt {}", "ok".green().bold(), removed.id.bold());
            }
            Ok(())
        }
        HistoryCommand::Clear { yes } => {
            if !yes {
                return Err(PromptCostError::validation(
                    "clear",
                    "this deletes every saved prompt; pass --yes to confirm",
                ));
            }
            let count = history.clear()?;
            if !options.quiet {
                println!("{} Cleared {count} saved prompts", "ok".green().bold());
            }
            Ok(())
        }
        HistoryCommand::Select { ids } => {
            history.select(&ids)?;
            report_selection(&history, options.quiet);
            Ok(())
        }
        HistoryCommand::Deselect { ids } => {
            history.deselect(&ids)?;
            report_selection(&history, options.quiet);
            Ok(())
        }
        HistoryCommand::Toggle { id } => {
            let selected = history.toggle_select(&id)?;
            if !options.quiet {
                let state = if selected { "selected" } else { "deselected" };
                println!("{} {} {state}", "ok".green().bold(), id.bold());
            }
            Ok(())
        }
    }
}

fn costs_for(prompt: &Prompt, config: &Config) -> Vec<CostBreakdown> {
    get_cost_breakdown(config.catalog(), prompt.tokens, prompt.estimated_output_tokens)
}

fn report_selection<S: PromptStore>(history: &History<S>, quiet: bool) {
    if !quiet {
        println!(
            "{} {} prompt(s) selected",
            "ok".green().bold(),
            history.selected_ids().len()
        );
    }
}

fn print_list<S: PromptStore>(history: &History<S>, config: &Config, now: DateTime<Utc>) {
    if history.is_empty() {
        println!("{}", "No saved prompts.".dimmed());
        return;
    }

    println!(
        "{}",
        format!("Prompt History ({})", history.prompts().len()).bold()
    );
    for prompt in history.prompts() {
        let avg = average_cost(&costs_for(prompt, config));
        let marker = if history.is_selected(&prompt.id) { "*" } else { " " };
        println!(
            "  {} {}  {:>9}  {:>7} tokens  {}  {}",
            marker.cyan().bold(),
            prompt.id,
            format_age(prompt.timestamp, now),
            format_number(prompt.tokens),
            paint_cost(
                &format_currency(avg),
                cost_severity(avg, &config.cost_thresholds)
            ),
            preview(&prompt.text, 50).dimmed()
        );
    }
}

fn print_prompt(prompt: &Prompt, costs: &[CostBreakdown], config: &Config, now: DateTime<Utc>) {
    println!("{} {}", "Prompt".bold(), prompt.id);
    println!("  saved:          {}", format_age(prompt.timestamp, now));
    println!("  input tokens:   {}", format_number(prompt.tokens));
    println!(
        "  output tokens:  ~{}",
        format_number(prompt.estimated_output_tokens)
    );
    println!();
    println!("{}", prompt.text);
    println!();
    for c in costs {
        println!(
            "  {:<22} {}",
            c.model_name,
            paint_cost(
                &format_currency(c.total_cost),
                cost_severity(c.total_cost, &config.cost_thresholds)
            )
        );
    }
}

/// Relative age: `Just now`, `5m ago`, `3h ago`, or the local date.
fn format_age(timestamp: i64, now: DateTime<Utc>) -> String {
    let minutes = (now.timestamp_millis() - timestamp) / 60_000;
    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if minutes < 1440 {
        format!("{}h ago", minutes / 60)
    } else {
        match DateTime::from_timestamp_millis(timestamp) {
            Some(t) => t.with_timezone(&Local).format("%Y-%m-%d").to_string(),
            None => timestamp.to_string(),
        }
    }
}
