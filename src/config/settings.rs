//! Configuration settings for the Meridian MCP server.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub database: DatabaseConfig,
    pub access: AccessConfig,
    pub alerts: AlertConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            llm: LlmConfig::default(),
            database: DatabaseConfig::default(),
            access: AccessConfig::default(),
            alerts: AlertConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations or use defaults.
    pub fn load() -> Result<Self> {
        let config_paths = [
            // Current directory
            PathBuf::from("config.toml"),
            PathBuf::from("meridian.toml"),
            // User config directory
            dirs::config_dir()
                .map(|p| p.join("meridian/config.toml"))
                .unwrap_or_default(),
            // Home directory
            dirs::home_dir()
                .map(|p| p.join(".meridian/config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.llm.base_url.is_empty() {
            return Err(ConfigError::MissingField("llm.base_url".to_string()).into());
        }
        if self.llm.model.is_empty() {
            return Err(ConfigError::MissingField("llm.model".to_string()).into());
        }
        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::Invalid("llm.timeout_secs must be > 0".to_string()).into());
        }
        if self.alerts.enabled && self.alerts.webhook_url.is_empty() {
            return Err(ConfigError::MissingField("alerts.webhook_url".to_string()).into());
        }
        Ok(())
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Transport type: "stdio" or "http"
    pub transport: TransportType,
    /// HTTP port (only used when transport is "http")
    pub http_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: TransportType::Stdio,
            http_port: 8080,
        }
    }
}

/// Transport type enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportType {
    Stdio,
    Http,
}

/// Language-model service configuration.
///
/// One OpenAI-compatible endpoint serves both the classifier
/// (structured output) and the synthesizer (free text).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the chat-completions API.
    pub base_url: String,
    /// Model used for synthesis.
    pub model: String,
    /// Model used for intent classification. Falls back to `model`
    /// when empty.
    pub classifier_model: String,
    /// API key. Falls back to the OPENAI_API_KEY environment variable.
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum tokens for synthesis responses.
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            classifier_model: "gpt-4o-mini".to_string(),
            api_key: None,
            timeout_secs: 60,
            max_tokens: 2048,
        }
    }
}

impl LlmConfig {
    /// Model to use for classification requests.
    pub fn classifier_model(&self) -> &str {
        if self.classifier_model.is_empty() {
            &self.model
        } else {
            &self.classifier_model
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL. Falls back to the DATABASE_URL
    /// environment variable when empty.
    pub url: String,
    /// Maximum connections in the pool.
    pub max_connections: u32,
    /// Apply embedded migrations on startup.
    pub migrate_on_start: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            migrate_on_start: true,
        }
    }
}

impl DatabaseConfig {
    /// Resolve the connection URL from config or environment.
    pub fn resolve_url(&self) -> Result<String> {
        if !self.url.is_empty() {
            return Ok(self.url.clone());
        }
        std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingField("database.url".to_string()).into())
    }
}

/// Access control configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Owner id this server instance serves. Products owned by a
    /// different user are rejected as access denied. Empty disables
    /// the check (single-tenant deployment).
    pub user_id: Option<String>,
}

/// Error-alert webhook configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Whether error alerts are dispatched at all.
    pub enabled: bool,
    /// Target URL for alert payloads.
    pub webhook_url: String,
    /// Timeout in seconds for alert delivery.
    pub timeout_secs: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            webhook_url: String::new(),
            timeout_secs: 10,
        }
    }
}
