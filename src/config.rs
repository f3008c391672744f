//! Runtime configuration (`salesdash.toml`).
//!
//! Search order:
//! 1. an explicit `--config PATH`
//! 2. `salesdash.toml` in the working directory
//! 3. `salesdash.toml` next to the executable
//! 4. the embedded default below
//!
//! After the file, `SALESDASH_DATA` (process env or `.env`) overrides the data
//! path; CLI flags are applied last by the caller.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

pub const CONFIG_FILE_NAME: &str = "salesdash.toml";
pub const DATA_PATH_ENV: &str = "SALESDASH_DATA";

/// Default configuration embedded in the binary.
const DEFAULT_CONFIG: &str = r#"
[data]
path = "data/Superstore.xls"

[logging]
level = "info"
file = "target/logs/salesdash.log"
"#;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub data: DataConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    pub path: PathBuf,
    /// Worksheet to read; the first sheet when absent.
    #[serde(default)]
    pub sheet: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: default_log_file(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("target/logs/salesdash.log")
}

impl AppConfig {
    pub fn embedded() -> Result<Self, ConfigError> {
        parse(DEFAULT_CONFIG, "<embedded>")
    }

    /// Apply an override for the data path (env var or CLI flag).
    pub fn with_data_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.data.path = path;
        }
        self
    }

    pub fn with_sheet(mut self, sheet: Option<String>) -> Self {
        if sheet.is_some() {
            self.data.sheet = sheet;
        }
        self
    }
}

/// Load configuration following the search order, then apply `SALESDASH_DATA`.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();

    let config = match find_config_file(explicit) {
        Some(path) => read_config_file(&path)?,
        None => AppConfig::embedded()?,
    };

    let env_path = std::env::var_os(DATA_PATH_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    Ok(config.with_data_path(env_path))
}

fn find_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }

    let exe = std::env::current_exe().ok()?;
    let beside_exe = exe.parent()?.join(CONFIG_FILE_NAME);
    beside_exe.exists().then_some(beside_exe)
}

pub fn read_config_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&contents, &path.display().to_string())
}

fn parse(contents: &str, origin: &str) -> Result<AppConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::Parse {
        origin: origin.to_string(),
        source,
    })
}
