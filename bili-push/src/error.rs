//! Application-wide error types.

use thiserror::Error;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Application-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    /// An acquisition adapter (dynamic, live, season, feed) failed.
    #[error("Adapter error ({source_name}): {message}")]
    Adapter {
        source_name: &'static str,
        message: String,
    },

    /// Message delivery to a destination failed.
    #[error("Delivery to group {group_id} failed: {message}")]
    Delivery { group_id: i64, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn adapter(source_name: &'static str, message: impl Into<String>) -> Self {
        Self::Adapter {
            source_name,
            message: message.into(),
        }
    }

    pub fn delivery(group_id: i64, message: impl Into<String>) -> Self {
        Self::Delivery {
            group_id,
            message: message.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}
