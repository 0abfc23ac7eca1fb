//! Configuration types for ConditionEngine

use crate::error::{Result, SdkError};
use docpolicy_runtime::MatchSettings;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main engine configuration
///
/// Loaded by [`EngineConfig::load`] from an optional `config/docpolicy` file
/// (any format the `config` crate understands) and `DOCPOLICY__*` environment
/// variables, e.g. `DOCPOLICY__REGEX__TIMEOUT_SECS=2`.
#[derive(Debug, Default, Deserialize)]
pub struct EngineConfig {
    /// Regex matching limits
    #[serde(default)]
    pub regex: RegexConfig,

    /// Evaluation metadata signing
    #[serde(default)]
    pub metadata: MetadataConfig,
}

impl EngineConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set regex configuration
    pub fn with_regex(mut self, regex: RegexConfig) -> Self {
        self.regex = regex;
        self
    }

    /// Set metadata configuration
    pub fn with_metadata(mut self, metadata: MetadataConfig) -> Self {
        self.metadata = metadata;
        self
    }

    /// Load configuration from environment variables and config file
    pub fn load() -> Result<Self> {
        // Load .env file if exists
        dotenvy::dotenv().ok();

        let config_result = config::Config::builder()
            .add_source(config::File::with_name("config/docpolicy").required(false))
            .add_source(environment())
            .build();

        match config_result {
            Ok(cfg) => cfg
                .try_deserialize()
                .map_err(|e| SdkError::ConfigError(format!("Failed to deserialize config: {}", e))),
            Err(e) => {
                tracing::info!("No usable configuration ({}), using defaults", e);
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific file, with environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(environment())
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(|e| {
                SdkError::ConfigError(format!(
                    "Failed to load config from {}: {}",
                    path.as_ref().display(),
                    e
                ))
            })
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("DOCPOLICY")
        .separator("__")
        .try_parsing(true)
}

/// Regex matching limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegexConfig {
    /// Timeout of one regex condition on one document, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of compiled patterns kept
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,

    /// Lifetime of a compiled pattern, in seconds
    #[serde(default = "default_cache_expiry_secs")]
    pub cache_expiry_secs: u64,

    /// Maximum number of concurrent match jobs
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_cache_max_entries() -> usize {
    1000
}

fn default_cache_expiry_secs() -> u64 {
    3600
}

fn default_worker_threads() -> usize {
    4
}

impl Default for RegexConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            cache_max_entries: default_cache_max_entries(),
            cache_expiry_secs: default_cache_expiry_secs(),
            worker_threads: default_worker_threads(),
        }
    }
}

impl RegexConfig {
    pub fn match_settings(&self) -> MatchSettings {
        MatchSettings {
            regex_timeout: Duration::from_secs(self.timeout_secs),
            cache_max_entries: self.cache_max_entries,
            cache_expiry: Duration::from_secs(self.cache_expiry_secs),
            worker_threads: self.worker_threads,
        }
    }
}

/// Key derivation settings for evaluation metadata
#[derive(Debug, Deserialize)]
pub struct MetadataConfig {
    #[serde(default = "default_password", deserialize_with = "deserialize_secret")]
    pub password: SecretString,

    #[serde(default = "default_salt")]
    pub salt: String,

    /// PBKDF2 iterations
    #[serde(default = "default_iterations")]
    pub iterations: u32,
}

fn default_password() -> SecretString {
    SecretString::from("docpolicy".to_string())
}

fn default_salt() -> String {
    "docpolicy-evaluation-metadata".to_string()
}

fn default_iterations() -> u32 {
    10_000
}

fn deserialize_secret<'de, D>(deserializer: D) -> std::result::Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            password: default_password(),
            salt: default_salt(),
            iterations: default_iterations(),
        }
    }
}

impl MetadataConfig {
    pub fn new(password: impl Into<String>, salt: impl Into<String>, iterations: u32) -> Self {
        Self {
            password: SecretString::from(password.into()),
            salt: salt.into(),
            iterations,
        }
    }
}
