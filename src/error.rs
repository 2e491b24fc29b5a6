// ABOUTME: Error types with structured exit codes for CLI
// ABOUTME: Maps domain errors to specific exit codes for shell scripting

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {status} on {endpoint}: {message}")]
    Api {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Notebook hierarchy contains a cycle through notebook {id}")]
    NotebookCycle { id: String },

    #[error("Notebook id {id} appears more than once")]
    DuplicateNotebook { id: String },
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Auth(_) => 2,
            Error::Network(_) => 3,
            Error::Api { .. } => 4,
            Error::Parse(_) | Error::Yaml(_) => 5,
            Error::Filesystem(_) => 6,
            Error::Config(_) => 7,
            Error::NotebookCycle { .. } | Error::DuplicateNotebook { .. } => 8,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
