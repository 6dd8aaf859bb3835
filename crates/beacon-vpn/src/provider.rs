//! Provider Abstraction
//!
//! A provider is a VPN service backend that can list its endpoints and
//! hand out credentials. Every variant (Riseup, Tunnelbear, Custom)
//! implements the same four operations behind [`Provider`].

use crate::auth::{AuthDetails, CredentialError};
use crate::endpoint::Endpoint;
use async_trait::async_trait;
use beacon_net::{DnsError, HttpError};
use parking_lot::RwLock;
use std::sync::Arc;

/// Uniform access to a VPN backend
///
/// `bootstrap` is called once per provider at startup, before any
/// selection reads. It is not idempotent: a second call re-fetches and
/// replaces the provider's state, and concurrent calls must be
/// serialized by the caller.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable machine identifier (registry key, descriptor URLs)
    fn name(&self) -> &str;

    /// Display identifier
    fn long_name(&self) -> String {
        self.name().to_string()
    }

    /// Fetch everything needed to populate endpoints and credentials
    async fn bootstrap(&self) -> Result<(), ProviderError>;

    /// Snapshot of the known endpoints; empty before bootstrap
    fn endpoints(&self) -> Arc<[Endpoint]>;

    /// Current credential bundle; empty when unavailable
    fn auth(&self) -> AuthDetails;
}

/// Bootstrap errors
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Catalog parse error: {0}")]
    Catalog(#[from] serde_json::Error),

    #[error("Credential bundle error: {0}")]
    Credentials(#[from] CredentialError),

    #[error("DNS error: {0}")]
    Dns(#[from] DnsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config archive error: {0}")]
    Archive(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

/// Endpoint list and credentials of a bootstrapped provider
///
/// Both live under one lock and bootstrap swaps them together; readers
/// get cheap snapshots and never see a half-written list or endpoints
/// paired with another generation's credentials.
pub struct ProviderState {
    current: RwLock<Snapshot>,
}

struct Snapshot {
    endpoints: Arc<[Endpoint]>,
    auth: AuthDetails,
}

impl ProviderState {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Snapshot {
                endpoints: Arc::from(Vec::new()),
                auth: AuthDetails::default(),
            }),
        }
    }

    pub fn endpoints(&self) -> Arc<[Endpoint]> {
        self.current.read().endpoints.clone()
    }

    pub fn auth(&self) -> AuthDetails {
        self.current.read().auth.clone()
    }

    /// Endpoints and credentials of the same generation
    pub fn snapshot(&self) -> (Arc<[Endpoint]>, AuthDetails) {
        let current = self.current.read();
        (current.endpoints.clone(), current.auth.clone())
    }

    /// Replace endpoints and credentials in one step
    pub fn replace(&self, endpoints: Vec<Endpoint>, auth: AuthDetails) {
        *self.current.write() = Snapshot {
            endpoints: Arc::from(endpoints),
            auth,
        };
    }

    /// Replace the endpoint list, keeping credentials
    pub fn replace_endpoints(&self, endpoints: Vec<Endpoint>) {
        self.current.write().endpoints = Arc::from(endpoints);
    }
}

impl Default for ProviderState {
    fn default() -> Self {
        Self::new()
    }
}
