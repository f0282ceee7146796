//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Declaration error: {0}")]
    Declaration(#[from] DeclarationError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Command execution errors, raised from inside a reply handler
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Registry unavailable")]
    RegistryGone,
}

impl From<BotError> for CommandError {
    fn from(e: BotError) -> Self {
        match e {
            BotError::Storage(e) => CommandError::Storage(e),
            BotError::Command(e) => e,
            other => CommandError::ExecutionFailed(other.to_string()),
        }
    }
}

/// Argument declaration errors, raised while a command is being built
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeclarationError {
    #[error("a required parameter after an optional parameter is not allowed")]
    RequiredAfterOptional,

    #[error("a required parameter after a default parameter is not allowed")]
    RequiredAfterDefault,

    #[error("a {kind} parameter after a vararg parameter is not allowed")]
    AfterVararg { kind: &'static str },
}

/// Errors produced while splitting a command line into tokens
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("missing command name")]
    MissingName,

    #[error("unterminated quote starting at byte {0}")]
    UnterminatedQuote(usize),

    #[error("unexpected character after closing quote at byte {0}")]
    TrailingQuote(usize),
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Lock poisoned")]
    Poisoned,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
}
