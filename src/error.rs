use std::io;
use thiserror::Error;

/// Core error type for promptcost.
///
/// Only the shell (config, history store, export, CLI input) can fail; the
/// analysis engine itself is total and never returns this type.
#[derive(Error, Debug)]
pub enum PromptCostError {
    #[error("config error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("validation error on '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("serialization error: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no prompt with id '{id}' in history")]
    NotFound { id: String },

    #[error("no prompt text given (pass TEXT, --file, or pipe into stdin)")]
    EmptyInput,
}

impl PromptCostError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Returns true if this error is caused by user input (vs internal/system).
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::NotFound { .. } | Self::EmptyInput
        )
    }
}

pub type Result<T> = std::result::Result<T, PromptCostError>;
