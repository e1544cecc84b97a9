pub mod analyze;
pub mod compare;
pub mod export;
pub mod history;
pub mod init;
pub mod models;
pub mod project;
pub mod samples;

use std::io::{IsTerminal, Read};
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::cli::PromptInput;
use crate::config::Config;
use crate::error::{PromptCostError, Result};
use crate::history::JsonFileStore;

/// Read the prompt from TEXT, `--file`, or piped stdin.
pub fn read_prompt(input: &PromptInput) -> Result<String> {
    if let Some(text) = read_explicit_prompt(input)? {
        return Ok(text);
    }

    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Err(PromptCostError::EmptyInput);
    }
    let mut buf = String::new();
    stdin
        .read_to_string(&mut buf)
        .map_err(|e| PromptCostError::io("reading prompt from stdin", e))?;
    debug!(bytes = buf.len(), "read prompt from stdin");
    Ok(buf)
}

/// Read the prompt from TEXT or `--file` only; `None` when neither is given.
pub fn read_explicit_prompt(input: &PromptInput) -> Result<Option<String>> {
    if let Some(ref text) = input.text {
        return Ok(Some(text.clone()));
    }
    match input.file {
        Some(ref path) => std::fs::read_to_string(path)
            .map(Some)
            .map_err(|e| PromptCostError::io(format!("reading prompt from '{}'", path.display()), e)),
        None => Ok(None),
    }
}

/// Resolve the history store: `--store`, then config `store.path`, then the
/// platform data directory.
pub fn open_store(explicit: Option<&Path>, config: &Config) -> Result<JsonFileStore> {
    if let Some(dir) = explicit {
        return Ok(JsonFileStore::new(dir));
    }
    if let Some(ref dir) = config.store.path {
        return Ok(JsonFileStore::new(dir));
    }
    JsonFileStore::default_location()
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| PromptCostError::serialization("encoding JSON output", e))?;
    println!("{json}");
    Ok(())
}

/// Shorten text to `max` characters on one line.
pub fn preview(text: &str, max: usize) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
