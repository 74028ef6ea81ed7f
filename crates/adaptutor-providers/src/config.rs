//! Configuration loading and provider factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use adaptutor_core::engine::EngineConfig;
use adaptutor_core::prompt::DEFAULT_QUESTION_COUNT;
use adaptutor_core::traits::LlmProvider;

use crate::gemini::GeminiProvider;
use crate::offline::OfflineProvider;
use crate::openai::OpenAiProvider;

/// Configuration for a single generation provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
    Gemini {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Offline,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                org_id,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
            ProviderConfig::Gemini {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Offline => f.write_str("Offline"),
        }
    }
}

impl ProviderConfig {
    fn api_key(&self) -> Option<&str> {
        match self {
            ProviderConfig::OpenAI { api_key, .. } | ProviderConfig::Gemini { api_key, .. } => {
                Some(api_key)
            }
            ProviderConfig::Offline => None,
        }
    }
}

/// Top-level adaptutor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptutorConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Provider used when none is named on the command line.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Default model to use.
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default = "default_temperature")]
    pub default_temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Max retries on transient provider errors.
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Initial delay between retries in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Upper bound on one generation call.
    #[serde(default = "default_generation_timeout")]
    pub generation_timeout_secs: u64,
    /// Attempts at a conflicting progress update before giving up.
    #[serde(default = "default_update_attempts")]
    pub max_update_attempts: u32,
    /// Questions per round.
    #[serde(default = "default_question_count")]
    pub question_count: usize,
    /// Directory holding learner progress records.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_temperature() -> f64 {
    0.7
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_retries() -> u32 {
    2
}
fn default_retry_delay() -> u64 {
    500
}
fn default_generation_timeout() -> u64 {
    30
}
fn default_update_attempts() -> u32 {
    5
}
fn default_question_count() -> usize {
    DEFAULT_QUESTION_COUNT
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./adaptutor-data")
}

impl Default for AdaptutorConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_retries: default_retries(),
            retry_delay_ms: default_retry_delay(),
            generation_timeout_secs: default_generation_timeout(),
            max_update_attempts: default_update_attempts(),
            question_count: default_question_count(),
            data_dir: default_data_dir(),
        }
    }
}

impl AdaptutorConfig {
    /// Engine settings derived from this configuration.
    pub fn engine_config(&self, model: Option<&str>) -> EngineConfig {
        EngineConfig {
            model: model.unwrap_or(&self.default_model).to_string(),
            temperature: self.default_temperature,
            max_tokens: self.max_tokens,
            generation_timeout: Duration::from_secs(self.generation_timeout_secs),
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            max_update_attempts: self.max_update_attempts.max(1),
            question_count: self.question_count.max(1),
            system_prompt_override: None,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let Some(end) = rest[start..].find('}') else {
            rest = &rest[start..];
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Resolve env vars in a provider config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            org_id: org_id.as_ref().map(|o| resolve_env_vars(o)),
        },
        ProviderConfig::Gemini { api_key, base_url } => ProviderConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
        ProviderConfig::Offline => ProviderConfig::Offline,
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `adaptutor.toml` in the current directory
/// 2. `~/.config/adaptutor/config.toml`
///
/// Environment variable overrides: `ADAPTUTOR_OPENAI_KEY`, `ADAPTUTOR_GEMINI_KEY`.
pub fn load_config() -> Result<AdaptutorConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<AdaptutorConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("adaptutor.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<AdaptutorConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => AdaptutorConfig::default(),
    };

    // Apply env var overrides
    if let Ok(key) = std::env::var("ADAPTUTOR_GEMINI_KEY") {
        let entry = config
            .providers
            .entry("gemini".into())
            .or_insert(ProviderConfig::Gemini {
                api_key: String::new(),
                base_url: None,
            });
        if let ProviderConfig::Gemini { api_key, .. } = entry {
            *api_key = key;
        }
    }

    if let Ok(key) = std::env::var("ADAPTUTOR_OPENAI_KEY") {
        let entry = config
            .providers
            .entry("openai".into())
            .or_insert(ProviderConfig::OpenAI {
                api_key: String::new(),
                base_url: None,
                org_id: None,
            });
        if let ProviderConfig::OpenAI { api_key, .. } = entry {
            *api_key = key;
        }
    }

    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("adaptutor"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn LlmProvider>> {
    match config {
        ProviderConfig::Gemini { api_key, base_url } => {
            Ok(Box::new(GeminiProvider::new(api_key, base_url.clone())?))
        }
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => Ok(Box::new(OpenAiProvider::new(
            api_key,
            base_url.clone(),
            org_id.clone(),
        )?)),
        ProviderConfig::Offline => Ok(Box::new(OfflineProvider::default())),
    }
}

/// Pick the named provider (or the default one) from `config`.
///
/// A provider that is not configured, or whose API key resolved to an empty
/// string, degrades to the offline provider so requests are still served
/// from built-in content.
pub fn resolve_provider(
    config: &AdaptutorConfig,
    name: Option<&str>,
) -> Result<Box<dyn LlmProvider>> {
    let name = name.unwrap_or(&config.default_provider);
    match config.providers.get(name) {
        Some(provider) if provider.api_key().is_some_and(|k| k.trim().is_empty()) => {
            tracing::warn!("provider '{name}' has no API key, serving built-in content");
            Ok(Box::new(OfflineProvider::new(format!(
                "provider '{name}' has no API key"
            ))))
        }
        Some(provider) => create_provider(provider),
        None => {
            tracing::warn!("provider '{name}' is not configured, serving built-in content");
            Ok(Box::new(OfflineProvider::new(format!(
                "provider '{name}' is not configured"
            ))))
        }
    }
}
