//! Error types for the task list library

use thiserror::Error;

/// Message shown when the creation form is submitted with a missing field
pub const REQUIRED_FIELDS_MESSAGE: &str = "All fields (Title, Description, Due Date, and Status) are required.";

/// Errors produced by the task list library
#[derive(Debug, Error)]
pub enum Error {
    /// A required form field was empty at creation time
    #[error("{0}")]
    Validation(&'static str),

    /// Reading or writing persisted data failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the task collection failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration file could not be parsed
    #[error("Config error: {0}")]
    Config(#[from] serde_yaml::Error),
}

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, Error>;
