//! Server Configuration
//!
//! Read from an optional TOML file, then overridden from `BEACON_*`
//! environment variables.

use beacon_vpn::ProviderSettings;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory
pub const CONFIG_FILE: &str = "beacon.toml";

/// Server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub listen: String,
    /// Put error details in HTTP responses
    pub debug: bool,
    /// Refuse to start if any provider fails to bootstrap
    pub strict_bootstrap: bool,
    pub providers: ProviderSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8080".to_string(),
            debug: false,
            strict_bootstrap: false,
            providers: ProviderSettings::default(),
        }
    }
}

impl ServerConfig {
    /// Load `path` if it exists, then apply the process environment
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            Self::from_toml_file(path)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply `BEACON_*` overrides from `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(listen) = lookup("BEACON_LISTEN") {
            self.listen = listen;
        }
        if let Some(debug) = lookup("BEACON_DEBUG") {
            self.debug = is_truthy(&debug);
        }
        if let Some(strict) = lookup("BEACON_STRICT_BOOTSTRAP") {
            self.strict_bootstrap = is_truthy(&strict);
        }
        if let Some(dir) = lookup("BEACON_DATA_DIR") {
            self.providers.data_dir = PathBuf::from(dir);
        }
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.listen
            .parse()
            .map_err(|_| ConfigError::InvalidListen(self.listen.clone()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listen_addr()?;
        if self.providers.enabled.is_empty() {
            return Err(ConfigError::NoProviders);
        }
        Ok(())
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "yes" | "true")
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid listen address: {0}")]
    InvalidListen(String),

    #[error("No providers enabled")]
    NoProviders,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.listen, "0.0.0.0:8080");
        assert!(!config.debug);
        assert!(!config.strict_bootstrap);
        assert_eq!(config.providers.enabled, vec!["riseup", "tunnelbear"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = ServerConfig::from_toml(
            r#"
            debug = true

            [providers]
            enabled = ["riseup"]
            data_dir = "/var/lib/beacon"
            "#,
        )
        .unwrap();

        assert!(config.debug);
        assert_eq!(config.listen, "0.0.0.0:8080");
        assert_eq!(config.providers.enabled, vec!["riseup"]);
        assert_eq!(config.providers.data_dir, PathBuf::from("/var/lib/beacon"));
        assert_eq!(
            config.providers.riseup_api_url,
            ProviderSettings::default().riseup_api_url
        );
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            ServerConfig::from_toml("listen = ["),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ServerConfig::default();
        config.apply_env(env(&[
            ("BEACON_LISTEN", "127.0.0.1:9000"),
            ("BEACON_DEBUG", "yes"),
            ("BEACON_STRICT_BOOTSTRAP", "1"),
            ("BEACON_DATA_DIR", "/tmp/beacon"),
        ]));

        assert_eq!(config.listen, "127.0.0.1:9000");
        assert!(config.debug);
        assert!(config.strict_bootstrap);
        assert_eq!(config.providers.data_dir, PathBuf::from("/tmp/beacon"));
    }

    #[test]
    fn test_env_falsy() {
        let mut config = ServerConfig {
            debug: true,
            ..ServerConfig::default()
        };
        config.apply_env(env(&[("BEACON_DEBUG", "0")]));
        assert!(!config.debug);
    }

    #[test]
    fn test_validate() {
        let bad_listen = ServerConfig {
            listen: "localhost".into(),
            ..ServerConfig::default()
        };
        assert_eq!(
            bad_listen.validate(),
            Err(ConfigError::InvalidListen("localhost".into()))
        );

        let mut none = ServerConfig::default();
        none.providers.enabled.clear();
        assert_eq!(none.validate(), Err(ConfigError::NoProviders));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("beacon-config-test-missing.toml");
        let _ = std::fs::remove_file(&path);
        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.providers.enabled, ProviderSettings::default().enabled);
    }
}
