use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::editorial::patcher::TreeStrategy;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Document store connection
    #[serde(default)]
    pub store: StoreConfig,

    /// Completion provider settings
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Review session settings
    #[serde(default)]
    pub review: ReviewConfig,

    /// Audit trail settings
    #[serde(default)]
    pub audit: AuditConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Completion provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompletionProviderKind {
    // @provider: Ollama
    #[default]
    Ollama,
    // @provider: OpenAI
    OpenAI,
    // @provider: Anthropic
    Anthropic,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl CompletionProviderKind {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::LMStudio => "LM Studio",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
        }
    }

    // @returns: Whether the hosted API needs a key
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAI | Self::Anthropic)
    }
}

impl std::fmt::Display for CompletionProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for CompletionProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Max tokens in a completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: CompletionProviderKind) -> Self {
        let (model, endpoint) = match provider_type {
            CompletionProviderKind::Ollama => (default_ollama_model(), default_ollama_endpoint()),
            CompletionProviderKind::OpenAI => (default_openai_model(), default_openai_endpoint()),
            CompletionProviderKind::Anthropic => {
                (default_anthropic_model(), default_anthropic_endpoint())
            }
            CompletionProviderKind::LMStudio => {
                (default_lmstudio_model(), default_lmstudio_endpoint())
            }
        };

        Self {
            provider_type: provider_type.to_lowercase_string(),
            model,
            api_key: String::new(),
            endpoint,
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Document store connection settings
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct StoreConfig {
    /// Base URL of the Ghost site, e.g. `https://blog.example.com`
    #[serde(default)]
    pub url: String,

    /// Admin API key in `id:secret` form
    #[serde(default)]
    pub admin_api_key: String,
}

impl StoreConfig {
    /// Whether enough is set to talk to a store
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty() && !self.admin_api_key.trim().is_empty()
    }
}

/// Completion service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CompletionConfig {
    /// Completion provider to use
    #[serde(default)]
    pub provider: CompletionProviderKind,

    /// Available completion providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common settings
    #[serde(default)]
    pub common: CompletionCommonConfig,
}

/// Common completion settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CompletionCommonConfig {
    /// Delay in milliseconds between consecutive pipeline stages
    #[serde(default = "default_stage_delay_ms")]
    pub stage_delay_ms: u64,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for CompletionCommonConfig {
    fn default() -> Self {
        Self {
            stage_delay_ms: default_stage_delay_ms(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
        }
    }
}

/// Review session settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReviewConfig {
    /// Number of published documents used to derive style guidelines
    #[serde(default = "default_corpus_size")]
    pub corpus_size: usize,

    /// How approved edits are applied to tree-structured bodies
    #[serde(default)]
    pub tree_strategy: TreeStrategy,

    /// Warn before writing when visible text shrinks by more than this ratio
    #[serde(default = "default_deletion_warning_threshold")]
    pub deletion_warning_threshold: f64,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            corpus_size: default_corpus_size(),
            tree_strategy: TreeStrategy::default(),
            deletion_warning_threshold: default_deletion_warning_threshold(),
        }
    }
}

/// Audit trail settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuditConfig {
    /// Whether sessions are recorded at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Database file; defaults to the user data directory
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            database_path: None,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<&LogLevel> for log::LevelFilter {
    fn from(level: &LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_stage_delay_ms() -> u64 {
    1000
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // doubled on each retry
}

fn default_temperature() -> f32 {
    0.3
}

fn default_corpus_size() -> usize {
    15
}

fn default_deletion_warning_threshold() -> f64 {
    0.2
}

fn default_true() -> bool {
    true
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_lmstudio_endpoint() -> String {
    "http://localhost:1234/v1".to_string()
}

fn default_ollama_model() -> String {
    "llama3.1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

fn default_lmstudio_model() -> String {
    // Placeholder; users should set to the loaded model name in LM Studio
    "local-model".to_string()
}

impl Config {
    /// Load the configuration from `path`, writing a default one first when
    /// the file does not exist
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            return serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()));
        }

        log::warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.completion.provider.requires_api_key() && self.completion.get_api_key().is_empty() {
            return Err(anyhow!(
                "API key is required for {} provider",
                self.completion.provider.display_name()
            ));
        }

        let threshold = self.review.deletion_warning_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(anyhow!(
                "deletion_warning_threshold must be between 0.0 and 1.0, got {}",
                threshold
            ));
        }

        if !(0.0..=2.0).contains(&self.completion.common.temperature) {
            return Err(anyhow!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.completion.common.temperature
            ));
        }

        if !self.store.url.trim().is_empty() {
            url::Url::parse(&self.store.url)
                .with_context(|| format!("Invalid store url: {}", self.store.url))?;
        }

        if !self.store.admin_api_key.trim().is_empty() && !self.store.admin_api_key.contains(':') {
            return Err(anyhow!("Admin API key must have the form <id>:<secret>"));
        }

        Ok(())
    }

    /// Resolve the audit database location
    pub fn audit_database_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.audit.database_path {
            return Some(path.clone());
        }
        dirs::data_dir().map(|dir| dir.join("proofreader").join("audit.db"))
    }
}

impl CompletionConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &CompletionProviderKind) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Mutable access to the active provider's entry, created from defaults if missing
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        let index = match self
            .available_providers
            .iter()
            .position(|p| p.provider_type == provider_str)
        {
            Some(index) => index,
            None => {
                self.available_providers
                    .push(ProviderConfig::new(self.provider.clone()));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[index]
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        ProviderConfig::new(self.provider.clone()).model
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.api_key.clone())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        ProviderConfig::new(self.provider.clone()).endpoint
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .unwrap_or_else(default_timeout_secs)
    }

    /// Get the completion token limit for the active provider
    pub fn get_max_tokens(&self) -> u32 {
        self.get_active_provider_config()
            .map(|p| p.max_tokens)
            .unwrap_or_else(default_max_tokens)
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            provider: CompletionProviderKind::default(),
            available_providers: vec![
                ProviderConfig::new(CompletionProviderKind::Ollama),
                ProviderConfig::new(CompletionProviderKind::OpenAI),
                ProviderConfig::new(CompletionProviderKind::Anthropic),
                ProviderConfig::new(CompletionProviderKind::LMStudio),
            ],
            common: CompletionCommonConfig::default(),
        }
    }
}
