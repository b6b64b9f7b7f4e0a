use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThreatlensError {
    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    Network { message: String },

    #[error("{message}")]
    Request { status: u16, message: String },

    #[error("{message}")]
    Remote { message: String },

    #[error("Upstream error from {source_name}: {message}")]
    Upstream { source_name: String, message: String },

    #[error("{var} not found in environment")]
    MissingApiKey { var: String },

    #[error("Invalid {expected} '{kind}'")]
    InvalidKind { kind: String, expected: &'static str },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Validation error in config file '{}':\n{}", .file.display(), .errors.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    InvalidConfig { file: PathBuf, errors: Vec<String> },

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Invalid YAML syntax in '{}' at line {line}, column {column}: {message}", .file.display())]
    YamlSyntaxError {
        file: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl ThreatlensError {
    pub fn validation(message: impl Into<String>) -> Self {
        ThreatlensError::Validation {
            message: message.into(),
        }
    }

    /// True for the four failures a single query can end in. The view
    /// treats all of them the same way.
    pub fn is_query_failure(&self) -> bool {
        matches!(
            self,
            ThreatlensError::Validation { .. }
                | ThreatlensError::Network { .. }
                | ThreatlensError::Request { .. }
                | ThreatlensError::Remote { .. }
        )
    }
}

impl From<reqwest::Error> for ThreatlensError {
    fn from(e: reqwest::Error) -> Self {
        ThreatlensError::Network {
            message: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ThreatlensError>;
