//! Service configuration (`scenic-gr.toml`)
//!
//! Every field has a compiled default so a missing or partial file still
//! yields a usable configuration.

use scenic_common::config::{is_valid_key, LoggingConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::completion::OpenAiCompatConfig;

/// Environment variable carrying the completion API key
pub const COMPLETION_API_KEY_ENV: &str = "SCENIC_COMPLETION_API_KEY";

pub const DEFAULT_PORT: u16 = 5750;

/// Top-level TOML layout
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub root_folder: Option<PathBuf>,
    /// Defaults to `<root>/genres`
    #[serde(default)]
    pub taxonomy_dir: Option<PathBuf>,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            taxonomy_dir: None,
            bind_address: default_bind_address(),
            port: default_port(),
            logging: LoggingConfig::default(),
            cache: CacheConfig::default(),
            search: SearchConfig::default(),
            completion: CompletionConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Explicit `taxonomy_dir`, else `<root>/genres`
    pub fn taxonomy_dir_for(&self, root_folder: &Path) -> PathBuf {
        self.taxonomy_dir
            .clone()
            .unwrap_or_else(|| root_folder.join("genres"))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            capacity: default_capacity(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            requests_per_minute: default_requests_per_minute(),
            temperature: default_temperature(),
        }
    }
}

impl CompletionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Client settings for the resolved `api_key`
    pub fn client_config(&self, api_key: String) -> OpenAiCompatConfig {
        OpenAiCompatConfig {
            base_url: self.base_url.clone(),
            api_key,
            model: self.model.clone(),
            temperature: self.temperature,
            requests_per_minute: self.requests_per_minute,
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_ttl_secs() -> u64 {
    300
}

fn default_capacity() -> usize {
    100
}

fn default_limit() -> usize {
    5
}

fn default_max_limit() -> usize {
    20
}

fn default_base_url() -> String {
    "https://api.deepseek.com/v1".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_requests_per_minute() -> u32 {
    60
}

fn default_temperature() -> f32 {
    0.3
}

/// Resolve the completion API key.
///
/// Priority: `SCENIC_COMPLETION_API_KEY` environment variable, then
/// `[completion] api_key` in the TOML file. Blank values do not count.
/// `None` means the semantic path is disabled.
pub fn resolve_completion_api_key(config: &CompletionConfig) -> Option<String> {
    let env_key = std::env::var(COMPLETION_API_KEY_ENV)
        .ok()
        .filter(|key| is_valid_key(key));
    let toml_key = config.api_key.clone().filter(|key| is_valid_key(key));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "Completion API key found in multiple sources: environment, TOML. Using environment (highest priority)."
        );
    }

    if let Some(key) = env_key {
        info!("Completion API key loaded from environment variable");
        return Some(key);
    }

    if let Some(key) = toml_key {
        info!("Completion API key loaded from TOML config");
        return Some(key);
    }

    warn!(
        "Completion API key not configured; scene descriptions cannot be resolved. Set {} or [completion] api_key in scenic-gr.toml",
        COMPLETION_API_KEY_ENV
    );
    None
}
