//! Provider Registry
//!
//! Owns every long-lived provider, keyed by name. Built once at startup,
//! bootstrapped, then shared read-only with the request path.

use crate::provider::Provider;
use crate::riseup::{self, RiseupConfig, RiseupProvider, RISEUP_NAME};
use crate::tunnelbear::{self, TunnelbearConfig, TunnelbearProvider, TUNNELBEAR_NAME};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Provider endpoints and which providers to load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub riseup_api_url: String,
    pub riseup_cert_url: String,
    pub tunnelbear_config_url: String,
    /// Root for provider data; Tunnelbear unpacks under `{data_dir}/tunnelbear`
    pub data_dir: PathBuf,
    pub enabled: Vec<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            riseup_api_url: riseup::DEFAULT_API_URL.to_string(),
            riseup_cert_url: riseup::DEFAULT_CERT_URL.to_string(),
            tunnelbear_config_url: tunnelbear::DEFAULT_CONFIG_URL.to_string(),
            data_dir: PathBuf::from("data"),
            enabled: vec![RISEUP_NAME.to_string(), TUNNELBEAR_NAME.to_string()],
        }
    }
}

/// Registry errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown provider {0:?} in enabled list")]
    UnknownProvider(String),
}

/// Outcome of bootstrapping every registered provider
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    pub succeeded: Vec<String>,
    /// (provider, error text)
    pub failed: Vec<(String, String)>,
}

impl BootstrapReport {
    pub fn all_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Named providers
#[derive(Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the providers listed in `settings.enabled`
    pub fn with_defaults(settings: &ProviderSettings) -> Result<Self, RegistryError> {
        let mut registry = Self::new();

        for name in &settings.enabled {
            let provider: Arc<dyn Provider> = match name.as_str() {
                RISEUP_NAME => Arc::new(RiseupProvider::new(RiseupConfig {
                    api_url: settings.riseup_api_url.clone(),
                    cert_url: settings.riseup_cert_url.clone(),
                })),
                TUNNELBEAR_NAME => Arc::new(TunnelbearProvider::new(TunnelbearConfig {
                    config_url: settings.tunnelbear_config_url.clone(),
                    data_dir: settings.data_dir.join(TUNNELBEAR_NAME),
                })),
                other => return Err(RegistryError::UnknownProvider(other.to_string())),
            };
            registry.register(provider);
        }

        Ok(registry)
    }

    /// Add a provider under its own name, replacing any previous one
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Bootstrap every provider, one after the other
    pub async fn bootstrap_all(&self) -> BootstrapReport {
        let mut report = BootstrapReport::default();

        for (name, provider) in &self.providers {
            info!("Initializing provider {}", name);
            match provider.bootstrap().await {
                Ok(()) => {
                    info!("{}: ready with {} endpoints", name, provider.endpoints().len());
                    report.succeeded.push(name.clone());
                }
                Err(e) => {
                    error!("{}: bootstrap failed: {}", name, e);
                    report.failed.push((name.clone(), e.to_string()));
                }
            }
        }

        report
    }
}
