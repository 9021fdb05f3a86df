//! Error types for the rules engine

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Failures turning raw input (user strings, persisted JSON) into rule data.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Unknown {kind}: '{value}' (expected one of: {expected})")]
    UnknownVariant {
        kind: &'static str,
        value: String,
        expected: String,
    },

    #[error("Invalid rule: {reason}")]
    InvalidRule { reason: String },

    #[error("Malformed rule data: {reason}")]
    Malformed { reason: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Rule storage I/O failed at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Rule storage at {path} is corrupt: {reason}")]
    Corrupt { path: String, reason: String },

    #[error("Failed to encode rules: {reason}")]
    Encode { reason: String },
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to fetch transactions: {reason}")]
    FetchFailed { reason: String },

    #[error("Failed to update transaction {transaction_id}: {reason}")]
    UpdateFailed {
        transaction_id: String,
        reason: String,
    },

    #[error("Transaction not found: {transaction_id}")]
    NotFound { transaction_id: String },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("No transaction source configured: {reason}")]
    SourceUnavailable { reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine the home directory; set YNAB_RULES_CONFIG_DIR")]
    NoHomeDir,

    #[error("Cannot create config directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
