//! Configuration for the voice bot server and CLI.
//!
//! Values come from defaults, then an optional TOML file, then environment
//! variables (`VOICE_BOT_BIND`, `VOICE_BOT_DATABASE`, `VOICE_BOT_DEFAULT_USER`).

use crate::error::{BotError, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "voice-bot.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub bot: BotConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    pub bind: String,
    /// Origins allowed by the CORS layer.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file.
    pub path: PathBuf,
    /// Insert demo accounts and FAQs into empty tables at startup.
    pub seed_demo_data: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("voice_bot.db"),
            seed_demo_data: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BotConfig {
    /// Account used for balance queries that name no user.
    pub default_username: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            default_username: "demo_user".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            bot: BotConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, else from `voice-bot.toml` when it exists,
    /// else defaults. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                tracing::info!("Loading config from: {}", path.display());
                Self::from_file(path)?
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                tracing::info!("Loading config from: {}", DEFAULT_CONFIG_FILE);
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => {
                tracing::info!("No config file found, using defaults");
                Config::default()
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply `VOICE_BOT_*` overrides using `lookup` to read variables.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("VOICE_BOT_BIND") {
            self.server.bind = bind;
        }
        if let Some(path) = lookup("VOICE_BOT_DATABASE") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(username) = lookup("VOICE_BOT_DEFAULT_USER") {
            self.bot.default_username = username;
        }
    }

    /// Parsed bind address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind
            .parse()
            .map_err(|_| BotError::Config(format!("invalid bind address: {}", self.server.bind)))
    }

    fn validate(&self) -> Result<()> {
        self.bind_addr()?;

        if self.database.path.as_os_str().is_empty() {
            return Err(BotError::Config("database.path must not be empty".to_string()));
        }
        if self.bot.default_username.trim().is_empty() {
            return Err(BotError::Config(
                "bot.default_username must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.bind_addr().unwrap().port(), 8000);
        assert_eq!(config.database.path, PathBuf::from("voice_bot.db"));
        assert!(config.database.seed_demo_data);
        assert_eq!(config.bot.default_username, "demo_user");
        assert_eq!(config.server.cors_origins.len(), 3);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::parse(
            r#"
            [database]
            path = "/tmp/bot.db"

            [bot]
            default_username = "guest"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, PathBuf::from("/tmp/bot.db"));
        assert!(config.database.seed_demo_data);
        assert_eq!(config.bot.default_username, "guest");
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Config::parse("[server]\nbind = \"not an address\"").unwrap_err();
        assert!(matches!(err, BotError::Config(_)));

        let err = Config::parse("[bot]\ndefault_username = \"  \"").unwrap_err();
        assert!(matches!(err, BotError::Config(_)));

        let err = Config::parse("[server\nbind = 1").unwrap_err();
        assert!(matches!(err, BotError::ParseConfig(_)));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("VOICE_BOT_BIND", "127.0.0.1:9000"),
            ("VOICE_BOT_DATABASE", "override.db"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert_eq!(config.database.path, PathBuf::from("override.db"));
        assert_eq!(config.bot.default_username, "demo_user");
    }

    #[test]
    fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("voice-bot.toml");
        std::fs::write(&path, "[server]\nbind = \"127.0.0.1:8080\"\ncors_origins = []\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.bind_addr().unwrap().port(), 8080);
        assert!(config.server.cors_origins.is_empty());

        let missing = Config::from_file(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, BotError::Io(_)));
    }
}
