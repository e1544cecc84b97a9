use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "promptcost",
    about = "Estimate LLM prompt tokens and costs, compare models, and flag wasteful phrasing",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for saved prompt history
    #[arg(long, global = true, env = "PROMPTCOST_STORE")]
    pub store: Option<PathBuf>,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Color output mode
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

/// Where the prompt text comes from.
#[derive(Args, Debug, Clone, Default)]
pub struct PromptInput {
    /// Prompt text (reads stdin when neither TEXT nor --file is given)
    pub text: Option<String>,

    /// Read the prompt from a file
    #[arg(short, long, conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Count tokens with the character heuristic instead of BPE
    #[arg(long)]
    pub heuristic: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default config file
    Init {
        /// Path to write config file
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Token counts, cost summary, issues and suggestions for a prompt
    #[command(alias = "a")]
    Analyze {
        #[command(flatten)]
        input: PromptInput,
    },

    /// Compare the cost of a prompt across all models
    #[command(alias = "c")]
    Compare {
        #[command(flatten)]
        input: PromptInput,

        /// Only show models from this provider
        #[arg(long)]
        provider: Option<String>,

        /// Sort by total cost, cheapest first
        #[arg(long)]
        sort: bool,
    },

    /// Project monthly and yearly cost at a request rate
    #[command(alias = "p")]
    Project {
        #[command(flatten)]
        input: PromptInput,

        /// Requests per day (defaults to config default_frequency)
        #[arg(long)]
        per_day: Option<u64>,

        /// Only show models from this provider
        #[arg(long)]
        provider: Option<String>,
    },

    /// Manage saved prompt history
    #[command(subcommand)]
    History(HistoryCommand),

    /// Export the current prompt and saved history
    #[command(alias = "e")]
    Export {
        #[command(flatten)]
        input: PromptInput,

        /// Output format
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,

        /// Write output to file
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Write to stdout
        #[arg(long)]
        stdout: bool,
    },

    /// Show example prompts
    Samples {
        /// Only good or bad examples
        #[arg(long, value_enum)]
        kind: Option<SampleFilter>,

        /// Run the analyzer on each example
        #[arg(long)]
        analyze: bool,
    },

    /// List the active pricing catalog
    Models,
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// Save a prompt to history
    Save {
        #[command(flatten)]
        input: PromptInput,
    },

    /// List saved prompts
    #[command(alias = "ls")]
    List,

    /// Show one saved prompt with its current costs
    Show { id: String },

    /// Delete a saved prompt
    #[command(alias = "rm")]
    Delete { id: String },

    /// Delete all saved prompts
    Clear {
        /// Confirm deleting everything
        #[arg(long)]
        yes: bool,
    },

    /// Mark prompts as selected
    Select {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Unmark selected prompts
    Deselect {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Flip the selection of one prompt
    Toggle { id: String },
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ExportFormat {
    Json,
    Markdown,
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SampleFilter {
    Good,
    Bad,
}
