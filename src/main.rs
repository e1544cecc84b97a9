use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use promptcost::cli::{Cli, ColorMode, Command};
use promptcost::commands;
use promptcost::commands::analyze::AnalyzeCommandOptions;
use promptcost::commands::compare::CompareCommandOptions;
use promptcost::commands::export::ExportCommandOptions;
use promptcost::commands::history::HistoryCommandOptions;
use promptcost::commands::init::{InitOptions, InitResult};
use promptcost::commands::models::ModelsCommandOptions;
use promptcost::commands::project::ProjectCommandOptions;
use promptcost::commands::samples::SamplesCommandOptions;
use promptcost::error::PromptCostError;

fn main() {
    let cli = Cli::parse();

    // Configure color output
    match cli.color {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {}
    }

    // Init tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli) {
        eprintln!("{} {err}", "error:".red().bold());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), PromptCostError> {
    match cli.command {
        Command::Init { path, force } => {
            let result = commands::init::run(InitOptions {
                config_path: path.or(cli.config),
                force,
            })?;
            if !cli.quiet {
                print_init_result(&result);
            }
            Ok(())
        }
        Command::Analyze { input } => commands::analyze::run(AnalyzeCommandOptions {
            input,
            json: cli.json,
            quiet: cli.quiet,
            config_path: cli.config,
        }),
        Command::Compare {
            input,
            provider,
            sort,
        } => commands::compare::run(CompareCommandOptions {
            input,
            provider,
            sort,
            json: cli.json,
            config_path: cli.config,
        }),
        Command::Project {
            input,
            per_day,
            provider,
        } => commands::project::run(ProjectCommandOptions {
            input,
            per_day,
            provider,
            json: cli.json,
            config_path: cli.config,
        }),
        Command::History(command) => commands::history::run(HistoryCommandOptions {
            command,
            store: cli.store,
            json: cli.json,
            quiet: cli.quiet,
            config_path: cli.config,
        }),
        Command::Export {
            input,
            format,
            out,
            stdout,
        } => commands::export::run(ExportCommandOptions {
            input,
            format,
            out,
            stdout,
            store: cli.store,
            quiet: cli.quiet,
            config_path: cli.config,
        }),
        Command::Samples { kind, analyze } => commands::samples::run(SamplesCommandOptions {
            kind,
            analyze,
            json: cli.json,
            quiet: cli.quiet,
            config_path: cli.config,
        }),
        Command::Models => commands::models::run(ModelsCommandOptions {
            json: cli.json,
            config_path: cli.config,
        }),
    }
}

fn print_init_result(result: &InitResult) {
    let verb = if result.overwritten { "Overwrote" } else { "Created" };
    println!(
        "{} {verb} config at {}",
        "ok".green().bold(),
        result.config_path.display()
    );
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit {} to adjust rates and thresholds",
        result.config_path.display().to_string().bold()
    );
    println!(
        "  2. Run {} to check a prompt",
        "promptcost analyze \"...\"".bold()
    );
    println!(
        "  3. Run {} to see it priced on every model",
        "promptcost compare \"...\"".bold()
    );
}
