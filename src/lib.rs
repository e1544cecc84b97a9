pub mod analyzer;
pub mod cli;
pub mod commands;
pub mod config;
pub mod cost;
pub mod error;
pub mod history;
pub mod output;
pub mod pricing;
pub mod report;
pub mod samples;
pub mod suggestions;
pub mod tokens;
pub mod utils;
