//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use intake_llm::GeminiConfig;
use intake_pipeline::PipelineConfig;
use intake_store::RedisSettings;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding the oracle credential.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Intent oracle settings
    #[serde(default)]
    pub oracle: GeminiConfig,

    /// Conversation log store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Pipeline limits and JSON schema
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Redis connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Redis host
    #[serde(default = "default_host")]
    pub host: String,

    /// Redis port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".intake").join("config.toml"))
    }

    /// Load configuration from `path` (or the default path), defaults if the file is absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::path()?,
        };

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            Self::from_toml(&contents)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.pipeline.validate()?;
        Ok(config)
    }

    /// Store settings with `INTAKE_REDIS_HOST` / `INTAKE_REDIS_PORT` applied.
    pub fn redis_settings(&self) -> RedisSettings {
        RedisSettings {
            host: self.store.host.clone(),
            port: self.store.port,
        }
        .with_env_overrides()
    }
}

/// Raw credential value from the process environment.
pub fn api_key_from_env() -> Option<String> {
    env::var(API_KEY_VAR).ok()
}

/// Validate the oracle credential; absent or blank is a startup error.
pub fn api_key(value: Option<String>) -> Result<String> {
    match value {
        Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(CliError::MissingCredential(API_KEY_VAR.to_string())),
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_host() -> String {
    intake_store::redis_backend::DEFAULT_REDIS_HOST.to_string()
}

fn default_port() -> u16 {
    intake_store::redis_backend::DEFAULT_REDIS_PORT
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.settings.color);
        assert_eq!(config.settings.format, OutputFormat::Table);
        assert_eq!(config.store.port, 6379);
        assert_eq!(config.oracle.model, "gemini-1.5-flash-latest");
        assert_eq!(config.pipeline.max_prompt_chars, 8000);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [oracle]
            model = "gemini-1.5-pro"

            [store]
            host = "redis.internal"

            [pipeline]
            snippet_chars = 250

            [settings]
            color = false
            format = "json"
            "#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.oracle.model, "gemini-1.5-pro");
        assert_eq!(config.oracle.max_output_tokens, 256);
        assert_eq!(config.store.host, "redis.internal");
        assert_eq!(config.store.port, 6379);
        assert_eq!(config.pipeline.snippet_chars, 250);
        assert!(!config.settings.color);
        assert_eq!(config.settings.format, OutputFormat::Json);
    }

    #[test]
    fn test_api_key() {
        assert_eq!(api_key(Some(" key-123 \n".to_string())).unwrap(), "key-123");
        assert!(matches!(api_key(None), Err(CliError::MissingCredential(_))));
        assert!(matches!(
            api_key(Some("   ".to_string())),
            Err(CliError::MissingCredential(_))
        ));
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            Config::from_toml("[settings]\nformat = \"yaml\""),
            Err(CliError::Toml(_))
        ));
        assert!(matches!(
            Config::from_toml("[pipeline]\nsnippet_chars = 0"),
            Err(CliError::Pipeline(_))
        ));
    }
}
