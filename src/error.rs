use sqlx::migrate::MigrateError;
use thiserror::Error;

/// Top-level error type for the entire application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Duplicate key: transaction {0} already recorded")]
    DuplicateKey(String),

    #[error("Node unavailable: {0}")]
    NodeUnavailable(String),

    #[error("Node rejected request ({status}): {message}")]
    NodeRejected { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Errors the watch loop logs and survives; everything else halts it.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::NodeRejected { .. }
                | AppError::DuplicateKey(_)
                | AppError::Encoding(_)
                | AppError::InvalidAddress(_)
        )
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        AppError::NodeUnavailable(format!("HTTP request error: {}", error))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(error: config::ConfigError) -> Self {
        AppError::Config(error.to_string())
    }
}

impl From<base64::DecodeError> for AppError {
    fn from(error: base64::DecodeError) -> Self {
        AppError::Encoding(format!("Invalid base64: {}", error))
    }
}

impl From<rmp_serde::encode::Error> for AppError {
    fn from(error: rmp_serde::encode::Error) -> Self {
        AppError::Encoding(format!("Msgpack encoding failed: {}", error))
    }
}

impl From<MigrateError> for AppError {
    fn from(error: MigrateError) -> Self {
        AppError::Internal(format!("Migration error: {:?}", error))
    }
}

/// Result type alias for the application
pub type AppResult<T> = Result<T, AppError>;
