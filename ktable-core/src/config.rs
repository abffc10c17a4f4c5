//! Process-wide settings for the knowledge table services.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `KTABLE_`-prefixed environment variables (`__` separates nested keys, e.g.
//! `KTABLE_LLM__MODEL`), then `OPENAI_API_KEY`.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Environment variable holding the remote API credential.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Prefix for all other environment overrides.
pub const ENV_PREFIX: &str = "KTABLE";

/// Top-level settings, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Remote LLM settings.
    #[serde(default)]
    pub llm: LlmSettings,
    /// Logging output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Settings {
    /// Load settings from a TOML string.
    ///
    /// # Errors
    /// Returns `CoreError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Load settings from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load settings from defaults, an optional TOML file and the environment.
    ///
    /// # Errors
    /// Returns `CoreError::Config` if a layer cannot be read or the merged
    /// result does not deserialize.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder =
            ::config::Config::builder().add_source(::config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(
                ::config::File::from(path)
                    .format(::config::FileFormat::Toml)
                    .required(true),
            );
        }

        let settings: Self = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("llm.openai_api_key", std::env::var(API_KEY_ENV).ok())?
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }
}

/// Remote structured-output API settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// API credential. Empty means no remote calls are possible.
    #[serde(default)]
    pub openai_api_key: String,
    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model identifier used for every completion.
    #[serde(default = "default_model")]
    pub model: String,
    /// Ask the API to enforce the response schema strictly.
    #[serde(default = "default_true")]
    pub strict_schema: bool,
}

impl LlmSettings {
    /// Whether an API credential is configured.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.openai_api_key.trim().is_empty()
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            strict_schema: true,
        }
    }
}

// The key never reaches log output.
impl fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = if self.has_credentials() { "<redacted>" } else { "<unset>" };
        f.debug_struct("LlmSettings")
            .field("openai_api_key", &key)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("strict_schema", &self.strict_schema)
            .finish()
    }
}

/// Logging output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level: trace, debug, info, warn, error. `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_base_url() -> String { "https://api.openai.com".to_string() }
fn default_model() -> String { "gpt-4o".to_string() }
