//! Error types for the voice bot backend.

use thiserror::Error;

/// Errors surfaced by the query flow, the store and configuration loading.
#[derive(Error, Debug)]
pub enum BotError {
    /// Query text was empty or whitespace only
    #[error("Query text cannot be empty")]
    EmptyQuery,

    /// Database access failed
    #[error(transparent)]
    Store(#[from] anyhow::Error),

    /// Configuration value rejected by validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// Config file could not be parsed
    #[error("Failed to parse config: {0}")]
    ParseConfig(#[from] toml::de::Error),

    /// File system I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BotError {
    /// Whether the caller sent a bad request, as opposed to a server-side failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, BotError::EmptyQuery)
    }

    /// Message including every cause in an anyhow context chain.
    pub fn detail(&self) -> String {
        match self {
            BotError::Store(err) => format!("{:#}", err),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
