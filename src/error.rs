//! Error types for syntaxcolor

use thiserror::Error;

/// Result type alias for syntaxcolor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reading colors, definitions and preferences
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid component '{component}': {reason}")]
    InvalidDefinition { component: String, reason: String },

    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("No such syntax definition: {0}")]
    UnknownSyntax(String),

    #[error("{0}")]
    Usage(String),
}

impl Error {
    /// Shorthand for a definition validation failure
    pub fn invalid(component: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidDefinition {
            component: component.into(),
            reason: reason.into(),
        }
    }
}
