use thiserror::Error;

/// Audit relay application error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid setting {key}: {reason}")]
    InvalidSetting { key: String, reason: String },

    #[error("Server error: {0}")]
    Server(String),
}

impl Error {
    pub fn invalid_setting(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidSetting {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::Server(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
