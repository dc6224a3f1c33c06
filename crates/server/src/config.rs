//! Configuration loading from building-assistant.toml and the environment.

use bridge::ExecutorConfig;
use runtime::{DEFAULT_MAX_ROUNDS, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Config file read from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "building-assistant.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub executor: ExecutorSection,
    #[serde(rename = "loop")]
    pub tool_loop: LoopConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Listen address.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Model service settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Anthropic API key. Usually supplied through `ANTHROPIC_API_KEY`.
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// How to launch the tool executor.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutorSection {
    pub program: String,
    pub script: String,
    /// Serial port forwarded to every invocation.
    pub port: Option<String>,
    /// Baud rate forwarded to every invocation.
    pub baud: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ExecutorSection {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            script: "app/scripts/mcp_call.py".to_string(),
            port: None,
            baud: None,
            timeout_secs: bridge::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// Tool loop bounds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoopConfig {
    pub max_rounds: usize,
    /// Wall-clock limit for a whole turn.
    pub turn_timeout_secs: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            turn_timeout_secs: 300,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Resolve the startup configuration.
    ///
    /// An explicit path must exist. Without one, `building-assistant.toml`
    /// is read if present. Environment variables win over the file.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::load(DEFAULT_CONFIG_FILE)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Override fields from environment variables. Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(key) = var("ANTHROPIC_API_KEY") {
            self.model.api_key = Some(key);
        }
        if let Some(model) = var("CLAUDE_MODEL") {
            self.model.model = model;
        }
        if let Some(program) = var("MCP_PYTHON") {
            self.executor.program = program;
        }
        if let Some(script) = var("MCP_CALL_SCRIPT") {
            self.executor.script = script;
        }
        if let Some(port) = var("ARDUINO_PORT") {
            self.executor.port = Some(port);
        }
        if let Some(baud) = var("ARDUINO_BAUD") {
            self.executor.baud = Some(baud);
        }
    }

    /// Check that the configuration can start a server.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api_key()?;
        if self.tool_loop.max_rounds == 0 {
            return Err(ConfigError::Invalid("loop.max_rounds must be at least 1".into()));
        }
        if self.executor.timeout_secs == 0 {
            return Err(ConfigError::Invalid("executor.timeout_secs must be positive".into()));
        }
        if self.tool_loop.turn_timeout_secs == 0 {
            return Err(ConfigError::Invalid("loop.turn_timeout_secs must be positive".into()));
        }
        if let Some(baud) = &self.executor.baud {
            if baud.parse::<u32>().is_err() {
                return Err(ConfigError::Invalid(format!("invalid baud rate: {baud}")));
            }
        }
        Ok(())
    }

    pub fn api_key(&self) -> Result<&str, ConfigError> {
        match self.model.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ConfigError::MissingApiKey),
        }
    }

    pub fn executor_config(&self) -> ExecutorConfig {
        let mut config = ExecutorConfig::new(&self.executor.program)
            .arg(&self.executor.script)
            .timeout(Duration::from_secs(self.executor.timeout_secs));
        config.port = self.executor.port.clone();
        config.baud = self.executor.baud.clone();
        config
    }

    pub fn turn_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_loop.turn_timeout_secs)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("API key not configured: set ANTHROPIC_API_KEY or model.api_key")]
    MissingApiKey,

    #[error("invalid config: {0}")]
    Invalid(String),
}
