//! Configuration loading, validation, and management for Pitwall.
//!
//! Loads configuration from `~/.pitwall/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.pitwall/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default inference provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per reply
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Conversation window and context digest limits
    #[serde(default)]
    pub session: SessionConfig,

    /// Strategy simulation defaults
    #[serde(default)]
    pub strategy: StrategyConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Session storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "workers_ai".into()
}
fn default_model() -> String {
    "@cf/meta/llama-3.1-8b-instruct".into()
}
fn default_temperature() -> f32 {
    0.3
}
fn default_max_tokens() -> u32 {
    512
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("session", &self.session)
            .field("strategy", &self.strategy)
            .field("gateway", &self.gateway)
            .field("storage", &self.storage)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("account_id", &self.account_id)
            .field("default_model", &self.default_model)
            .finish()
    }
}

/// Conversation window and digest truncation limits.
///
/// The character limits are hard caps on what reaches the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Exchanges kept in the sliding window; the log holds `2 * max_turns` messages.
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    #[serde(default = "default_header_chars")]
    pub header_chars: usize,

    #[serde(default = "default_notes_chars")]
    pub analysis_chars: usize,

    #[serde(default = "default_notes_chars")]
    pub commentary_chars: usize,

    /// Columns listed in a telemetry digest's "notable" line
    #[serde(default = "default_notable_columns")]
    pub notable_columns: usize,

    /// Fixed system instruction placed first in every chat prompt
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_max_turns() -> usize {
    12
}
fn default_header_chars() -> usize {
    160
}
fn default_notes_chars() -> usize {
    360
}
fn default_notable_columns() -> usize {
    5
}
fn default_system_prompt() -> String {
    "You are Pitwall, a concise, helpful race-engineering assistant. \
     Use short bullet points when advising. Admit uncertainty. \
     Keep replies under ~200 words unless asked."
        .into()
}

impl SessionConfig {
    /// Maximum number of messages kept in a session log.
    pub fn window(&self) -> usize {
        2 * self.max_turns
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            header_chars: default_header_chars(),
            analysis_chars: default_notes_chars(),
            commentary_chars: default_notes_chars(),
            notable_columns: default_notable_columns(),
            system_prompt: default_system_prompt(),
        }
    }
}

/// Values the strategy simulator assumes when a request omits them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    #[serde(default)]
    pub laps: i64,

    #[serde(default = "default_base_lap_time")]
    pub base_lap_time: f64,

    #[serde(default = "default_fuel_per_lap")]
    pub fuel_per_lap: f64,

    #[serde(default = "default_tank_size")]
    pub tank_size: f64,

    #[serde(default = "default_pit_loss")]
    pub pit_loss: f64,

    #[serde(default = "default_tire_degradation")]
    pub tire_degradation_per_lap: f64,

    #[serde(default = "default_safety_car_delta")]
    pub safety_car_delta: f64,

    /// Longest race the gateway will simulate, counted in laps and stints
    #[serde(default = "default_max_laps")]
    pub max_laps: i64,
}

fn default_base_lap_time() -> f64 {
    90.0
}
fn default_fuel_per_lap() -> f64 {
    0.12
}
fn default_tank_size() -> f64 {
    8.0
}
fn default_pit_loss() -> f64 {
    22.0
}
fn default_tire_degradation() -> f64 {
    0.08
}
fn default_safety_car_delta() -> f64 {
    -7.0
}
fn default_max_laps() -> i64 {
    1000
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            laps: 0,
            base_lap_time: default_base_lap_time(),
            fuel_per_lap: default_fuel_per_lap(),
            tank_size: default_tank_size(),
            pit_loss: default_pit_loss(),
            tire_degradation_per_lap: default_tire_degradation(),
            safety_car_delta: default_safety_car_delta(),
            max_laps: default_max_laps(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Largest accepted request body (CSV uploads dominate)
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_port() -> u16 {
    8787
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_body_limit() -> usize {
    2 * 1024 * 1024
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// "memory" or "file"
    #[serde(default = "default_storage_backend")]
    pub backend: String,

    /// Root directory for the file backend (default: `~/.pitwall/sessions`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_storage_backend() -> String {
    "file".into()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            path: None,
        }
    }
}

impl StorageConfig {
    /// The directory the file backend writes to.
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| AppConfig::config_dir().join("sessions"))
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Cloudflare account (Workers AI only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.pitwall/config.toml).
    ///
    /// Also checks environment variables:
    /// - `PITWALL_API_KEY` (highest priority), `CLOUDFLARE_API_TOKEN`, `OPENAI_API_KEY`
    /// - `PITWALL_PROVIDER`, `PITWALL_MODEL`
    /// - `CLOUDFLARE_ACCOUNT_ID`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("PITWALL_API_KEY")
                .ok()
                .or_else(|| std::env::var("CLOUDFLARE_API_TOKEN").ok())
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(provider) = std::env::var("PITWALL_PROVIDER") {
            config.default_provider = provider;
        }

        if let Ok(model) = std::env::var("PITWALL_MODEL") {
            config.default_model = model;
        }

        if let Ok(account) = std::env::var("CLOUDFLARE_ACCOUNT_ID") {
            config
                .providers
                .entry("workers_ai".into())
                .or_insert_with(|| ProviderConfig {
                    api_key: None,
                    api_url: None,
                    account_id: None,
                    default_model: None,
                })
                .account_id = Some(account);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".pitwall")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.session.max_turns == 0 {
            return Err(ConfigError::ValidationError(
                "session.max_turns must be at least 1".into(),
            ));
        }

        if self.strategy.tank_size < 0.0 {
            return Err(ConfigError::ValidationError(
                "strategy.tank_size must not be negative".into(),
            ));
        }

        if self.strategy.max_laps < 1 {
            return Err(ConfigError::ValidationError(
                "strategy.max_laps must be at least 1".into(),
            ));
        }

        if !matches!(self.storage.backend.as_str(), "memory" | "file") {
            return Err(ConfigError::ValidationError(format!(
                "storage.backend must be \"memory\" or \"file\", got \"{}\"",
                self.storage.backend
            )));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            session: SessionConfig::default(),
            strategy: StrategyConfig::default(),
            gateway: GatewayConfig::default(),
            storage: StorageConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_provider, "workers_ai");
        assert_eq!(config.session.max_turns, 12);
        assert_eq!(config.session.window(), 24);
        assert_eq!(config.session.header_chars, 160);
        assert_eq!(config.session.analysis_chars, 360);
        assert_eq!(config.session.commentary_chars, 360);
    }

    #[test]
    fn strategy_defaults_match_documented_values() {
        let s = StrategyConfig::default();
        assert_eq!(s.base_lap_time, 90.0);
        assert_eq!(s.fuel_per_lap, 0.12);
        assert_eq!(s.tank_size, 8.0);
        assert_eq!(s.pit_loss, 22.0);
        assert_eq!(s.tire_degradation_per_lap, 0.08);
        assert_eq!(s.safety_car_delta, -7.0);
        assert_eq!(s.max_laps, 1000);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_model, config.default_model);
        assert_eq!(parsed.gateway.port, config.gateway.port);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let parsed: AppConfig = toml::from_str("[session]\nmax_turns = 4\n").unwrap();
        assert_eq!(parsed.session.max_turns, 4);
        assert_eq!(parsed.session.header_chars, 160);
        assert_eq!(parsed.strategy.pit_loss, 22.0);
    }

    #[test]
    fn zero_turn_window_rejected() {
        let config = AppConfig {
            session: SessionConfig {
                max_turns: 0,
                ..SessionConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_storage_backend_rejected() {
        let config = AppConfig {
            storage: StorageConfig {
                backend: "redis".into(),
                path: None,
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_positive_lap_limit_rejected() {
        let config = AppConfig {
            strategy: StrategyConfig {
                max_laps: 0,
                ..StrategyConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            default_temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.default_provider, "workers_ai");
    }

    #[test]
    fn load_from_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "default_provider = \"openai\"\n[strategy]\npit_loss = 19.5\n",
        )
        .unwrap();
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.strategy.pit_loss, 19.5);
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("[REDACTED]"));
    }
}
