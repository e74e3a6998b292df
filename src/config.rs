//! Configuration for the build pipeline
//!
//! Precedence:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (CASCADE_*)
//! 3. Project config (cascade.toml)
//! 4. Built-in defaults (lowest priority)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CascadeError, CascadeResult};

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub build: BuildConfig,
}

/// Directory layout: where sources live, where compiled units are staged,
/// and where the aggregate output lands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_source")]
    pub source: PathBuf,

    #[serde(default = "default_staging")]
    pub staging: PathBuf,

    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            staging: default_staging(),
            output: default_output(),
        }
    }
}

fn default_source() -> PathBuf {
    PathBuf::from("src")
}

fn default_staging() -> PathBuf {
    PathBuf::from(".cascade/stage")
}

fn default_output() -> PathBuf {
    PathBuf::from("dist/styles.css")
}

/// Unit extensions: which source files qualify, what staged units are named.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "default_source_extension")]
    pub source_extension: String,

    #[serde(default = "default_output_extension")]
    pub output_extension: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source_extension: default_source_extension(),
            output_extension: default_output_extension(),
        }
    }
}

fn default_source_extension() -> String {
    "scss".to_string()
}

fn default_output_extension() -> String {
    "css".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> CascadeResult<Self> {
        load_with_warnings(path).map(|(config, _)| config)
    }
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> CascadeResult<(Config, Vec<ConfigWarning>)> {
    let content = std::fs::read_to_string(path)?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| CascadeError::InvalidConfig {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                key,
                file: path.to_path_buf(),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Load from `<project_root>/cascade.toml`, or defaults when absent
pub fn load_or_default(project_root: &Path) -> Config {
    let config_path = project_root.join("cascade.toml");
    let config = if config_path.exists() {
        Config::load(&config_path).unwrap_or_default()
    } else {
        Config::default()
    };
    with_env_overrides(config)
}

/// Apply environment variable overrides (CASCADE_* prefix)
pub fn with_env_overrides(mut config: Config) -> Config {
    if let Ok(source) = std::env::var("CASCADE_SOURCE_DIR") {
        config.paths.source = PathBuf::from(source);
    }
    if let Ok(staging) = std::env::var("CASCADE_STAGING_DIR") {
        config.paths.staging = PathBuf::from(staging);
    }
    if let Ok(output) = std::env::var("CASCADE_OUTPUT") {
        config.paths.output = PathBuf::from(output);
    }
    config
}
