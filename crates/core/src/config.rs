//! Configuration management for Study Buddy.
//!
//! Configuration is layered, later sources winning:
//! - Built-in defaults
//! - Config file (`.studybuddy/config.yaml` in the workspace, or `--config`)
//! - Environment variables
//! - Command-line flags
//!
//! The API key is held in memory only. It is never serialized and never
//! shown in `Debug` output.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Providers the LLM factory knows how to build.
pub const KNOWN_PROVIDERS: [&str; 2] = ["groq", "ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .studybuddy/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Active LLM provider ("groq" or "ollama")
    pub provider: String,

    /// Chat model identifier
    pub model: String,

    /// Session API key (from STUDYBUDDY_API_KEY or interactive entry)
    #[serde(skip)]
    pub api_key: Option<ApiKey>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// LLM provider configurations
    pub llm: LlmConfig,

    /// Chunking and retrieval settings
    pub retrieval: RetrievalConfig,

    /// Embedding model settings
    pub embedding: EmbeddingConfig,

    /// Question paper export settings
    pub export: ExportConfig,
}

/// A secret API key. Debug output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key. Surrounding whitespace is dropped; an empty key is `None`.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    /// Access the raw key for building request headers.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let mut providers = HashMap::new();
        providers.insert("groq".to_string(), ProviderConfig::groq_default());
        providers.insert("ollama".to_string(), ProviderConfig::ollama_default());

        Self {
            active_provider: "groq".to_string(),
            providers,
        }
    }
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProviderConfig {
    /// Chat model for this provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Base URL override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Environment variable holding the API key
    #[serde(rename = "apiKeyEnv", skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl ProviderConfig {
    fn groq_default() -> Self {
        Self {
            model: Some("llama-3.3-70b-versatile".to_string()),
            endpoint: None,
            api_key_env: Some("GROQ_API_KEY".to_string()),
            temperature: Some(0.7),
            timeout: Some(120),
        }
    }

    fn ollama_default() -> Self {
        Self {
            model: Some("llama3.2".to_string()),
            endpoint: Some("http://localhost:11434".to_string()),
            api_key_env: None,
            temperature: Some(0.7),
            timeout: Some(120),
        }
    }
}

/// Chunking and retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalConfig {
    /// Maximum chunk length in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Number of chunks retrieved per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Number of history messages fed back into prompts
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

fn default_chunk_size() -> usize {
    3000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_top_k() -> usize {
    4
}

fn default_history_window() -> usize {
    6
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            history_window: default_history_window(),
        }
    }
}

/// Embedding model settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingConfig {
    /// Provider name: "ollama" or "hashed"
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    /// Model identifier (provider-specific)
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Embedding vector dimensions
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Base URL for HTTP providers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Maximum number of texts per embedding request batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Request timeout in seconds
    #[serde(default = "default_embedding_timeout")]
    pub timeout: u64,
}

fn default_embedding_provider() -> String {
    "ollama".to_string()
}

fn default_embedding_model() -> String {
    "all-minilm".to_string()
}

fn default_dimensions() -> usize {
    384
}

fn default_batch_size() -> usize {
    32
}

fn default_embedding_timeout() -> u64 {
    30
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            dimensions: default_dimensions(),
            endpoint: None,
            batch_size: default_batch_size(),
            timeout: default_embedding_timeout(),
        }
    }
}

/// Fixed header and footer text for exported question papers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfig {
    #[serde(default = "default_institution")]
    pub institution: String,

    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_footer")]
    pub footer: String,
}

fn default_institution() -> String {
    "IIIT Sri City".to_string()
}

fn default_title() -> String {
    "Question Paper".to_string()
}

fn default_footer() -> String {
    "Generated by Study-Buddy AI Assistant".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            institution: default_institution(),
            title: default_title(),
            footer: default_footer(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    retrieval: Option<RetrievalConfig>,
    embedding: Option<EmbeddingConfig>,
    export: Option<ExportConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let llm = LlmConfig::default();
        let model = llm
            .providers
            .get(&llm.active_provider)
            .and_then(|p| p.model.clone())
            .unwrap_or_else(|| "llama-3.3-70b-versatile".to_string());

        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: llm.active_provider.clone(),
            model,
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm,
            retrieval: RetrievalConfig::default(),
            embedding: EmbeddingConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file and environment.
    ///
    /// Environment variables:
    /// - `STUDYBUDDY_WORKSPACE`: Override workspace path
    /// - `STUDYBUDDY_CONFIG`: Path to config file
    /// - `STUDYBUDDY_PROVIDER`: LLM provider
    /// - `STUDYBUDDY_MODEL`: Model identifier
    /// - `STUDYBUDDY_API_KEY`: API key for the active provider
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use studybuddy_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("STUDYBUDDY_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("STUDYBUDDY_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config.config_path();
        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        config.apply_env();

        Ok(config)
    }

    /// Environment variables override YAML config.
    fn apply_env(&mut self) {
        if let Ok(provider) = std::env::var("STUDYBUDDY_PROVIDER") {
            self.set_provider(provider);
        }

        if let Ok(model) = std::env::var("STUDYBUDDY_MODEL") {
            self.model = model;
        }

        if let Ok(key) = std::env::var("STUDYBUDDY_API_KEY") {
            self.api_key = ApiKey::new(key);
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            self.no_color = true;
        }
    }

    /// Path of the YAML config file this configuration reads.
    pub fn config_path(&self) -> PathBuf {
        match self.config_file {
            Some(ref cf) => cf.clone(),
            None => self.app_dir().join("config.yaml"),
        }
    }

    /// Merge a YAML configuration file into this config.
    pub fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        self.merge_yaml_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config file {:?}: {}", path, e)))
    }

    fn merge_yaml_str(&self, contents: &str) -> Result<Self, serde_yaml::Error> {
        let config_file: ConfigFile = serde_yaml::from_str(contents)?;

        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = config_file.llm {
            // Provider entries in the file extend the built-in ones.
            for (name, provider) in llm.providers {
                result.llm.providers.insert(name, provider);
            }
            result.llm.active_provider = llm.active_provider.clone();
            result.set_provider(llm.active_provider);
        }

        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }

        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }

        if let Some(export) = config_file.export {
            result.export = export;
        }

        Ok(result)
    }

    /// Switch the active provider and pick up its configured model.
    fn set_provider(&mut self, provider: String) {
        if let Some(model) = self
            .llm
            .providers
            .get(&provider)
            .and_then(|p| p.model.clone())
        {
            self.model = model;
        }
        self.provider = provider;
    }

    /// Move the configuration to another workspace.
    ///
    /// Unless an explicit config file is set, `<workspace>/.studybuddy/config.yaml`
    /// is merged when present and environment overrides are applied again
    /// on top of it.
    pub fn with_workspace(mut self, workspace: PathBuf) -> AppResult<Self> {
        if workspace == self.workspace {
            return Ok(self);
        }
        if !workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                workspace
            )));
        }

        self.workspace = workspace.clone();
        if self.config_file.is_none() {
            let config_path = self.config_path();
            if config_path.exists() {
                self = self.merge_yaml(&config_path)?;
                self.workspace = workspace;
                self.apply_env();
            }
        }

        Ok(self)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.set_provider(provider);
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .studybuddy directory.
    pub fn app_dir(&self) -> PathBuf {
        self.workspace.join(".studybuddy")
    }

    /// Get the active provider configuration.
    pub fn provider_config(&self) -> Option<&ProviderConfig> {
        self.llm.providers.get(&self.provider)
    }

    /// Endpoint override for the active provider.
    pub fn provider_endpoint(&self) -> Option<&str> {
        self.provider_config().and_then(|p| p.endpoint.as_deref())
    }

    /// Sampling temperature for the active provider.
    pub fn temperature(&self) -> f32 {
        self.provider_config()
            .and_then(|p| p.temperature)
            .unwrap_or(0.7)
    }

    /// Request timeout for the active provider, in seconds.
    pub fn request_timeout(&self) -> u64 {
        self.provider_config().and_then(|p| p.timeout).unwrap_or(120)
    }

    /// Resolve the API key for the active provider.
    ///
    /// An explicit session key (STUDYBUDDY_API_KEY or interactive entry)
    /// wins over the provider's `apiKeyEnv` variable.
    pub fn resolve_api_key(&self) -> Option<ApiKey> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        let env_var = self.provider_config()?.api_key_env.as_ref()?;
        std::env::var(env_var).ok().and_then(ApiKey::new)
    }

    /// Name of the environment variable users should set for the key.
    pub fn api_key_env_name(&self) -> String {
        self.provider_config()
            .and_then(|p| p.api_key_env.clone())
            .unwrap_or_else(|| "STUDYBUDDY_API_KEY".to_string())
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.as_str();
        if !KNOWN_PROVIDERS.contains(&provider) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        let retrieval = &self.retrieval;
        if retrieval.chunk_size == 0 {
            return Err(AppError::Config("chunkSize must be at least 1".to_string()));
        }
        if retrieval.chunk_overlap >= retrieval.chunk_size {
            return Err(AppError::Config(format!(
                "chunkOverlap ({}) must be smaller than chunkSize ({})",
                retrieval.chunk_overlap, retrieval.chunk_size
            )));
        }
        if retrieval.top_k == 0 {
            return Err(AppError::Config("topK must be at least 1".to_string()));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "embedding dimensions must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
