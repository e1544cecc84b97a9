//! Handler for the `promptcost models` command.

use std::path::PathBuf;

use colored::Colorize;

use crate::commands::print_json;
use crate::config::Config;
use crate::error::Result;
use crate::pricing::providers;

#[derive(Debug)]
pub struct ModelsCommandOptions {
    pub json: bool,
    pub config_path: Option<PathBuf>,
}

pub fn run(options: ModelsCommandOptions) -> Result<()> {
    let config = Config::discover(options.config_path.as_deref())?;
    let catalog = config.catalog();

    if options.json {
        return print_json(catalog);
    }

    for provider in providers(catalog) {
        println!("{}", provider.bold());
        for model in catalog.iter().filter(|m| m.provider == provider) {
            let rate = if model.is_free() {
                "free".green().to_string()
            } else {
                format!(
                    "${}/1K in  ${}/1K out",
                    model.input_cost_per_1k, model.output_cost_per_1k
                )
            };
            println!("  {:<22} {rate}", model.name);
        }
    }
    Ok(())
}
