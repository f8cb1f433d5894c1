use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Failed to fetch events: {0}")]
    #[diagnostic(code(horai::fetch_failure))]
    FetchFailure(String),

    /// Carries the collaborator's message verbatim so it can be shown to the user
    #[error("{0}")]
    #[diagnostic(code(horai::validation_failure))]
    ValidationFailure(String),

    #[error("Assistant error: {0}")]
    #[diagnostic(code(horai::assistant))]
    Assistant(String),

    #[error("Environment error: {0}")]
    #[diagnostic(code(horai::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(horai::config))]
    Config(String),

    #[error("Component error: {0}")]
    #[diagnostic(code(horai::component))]
    Component(String),

    #[error(transparent)]
    #[diagnostic(code(horai::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(horai::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(horai::other))]
    Other(String),
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type ScheduleResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create assistant errors
pub fn assistant_error(message: &str) -> Error {
    Error::Assistant(message.to_string())
}

/// Helper to create component errors
pub fn component_error(message: &str) -> Error {
    Error::Component(message.to_string())
}

/// Helper to create fetch errors
pub fn fetch_error(message: &str) -> Error {
    Error::FetchFailure(message.to_string())
}

/// Helper to create validation errors
pub fn validation_error(message: &str) -> Error {
    Error::ValidationFailure(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
