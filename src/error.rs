//! Error types.
//!
//! `AppError` is the single user-facing error: a message plus the process exit
//! code. Library modules return typed errors (`DatasetError`, `ConfigError`)
//! which are converted at the application boundary.
//!
//! Exit codes:
//! - `2` input / configuration / usage problems
//! - `3` schema problems (missing columns, uncoercible values, empty dataset)
//! - `4` terminal, runtime and output failures

use std::path::PathBuf;

use thiserror::Error;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failure while loading the order sheet.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DatasetError {
    /// The file is missing, unreadable, or not a parsable table.
    #[error("Failed to load dataset '{}': {reason}", path.display())]
    Load { path: PathBuf, reason: String },
    /// The table was read but does not have the expected shape or values.
    #[error("Dataset schema error: {0}")]
    Schema(String),
}

impl DatasetError {
    pub fn load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }
}

impl From<DatasetError> for AppError {
    fn from(err: DatasetError) -> Self {
        let code = match err {
            DatasetError::Load { .. } => 2,
            DatasetError::Schema(_) => 3,
        };
        AppError::new(code, err.to_string())
    }
}

/// Failure while reading `salesdash.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config '{origin}': {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::new(2, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_errors_map_to_distinct_exit_codes() {
        let load: AppError = DatasetError::load("missing.xls", "not found").into();
        assert_eq!(load.exit_code(), 2);
        assert!(load.message().contains("missing.xls"));

        let schema: AppError = DatasetError::schema("Missing required column: `Sales`").into();
        assert_eq!(schema.exit_code(), 3);
        assert!(schema.message().contains("`Sales`"));
    }
}
