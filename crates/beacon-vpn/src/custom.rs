//! Custom Provider
//!
//! An ephemeral provider built on demand around caller-supplied
//! endpoints. Used to replay a single known remote, optionally with the
//! credentials of a real provider.

use crate::auth::AuthDetails;
use crate::endpoint::Endpoint;
use crate::provider::{Provider, ProviderError};
use async_trait::async_trait;
use std::sync::Arc;

/// Name used when a custom provider is not tied to a real one
pub const UNKNOWN_PROVIDER: &str = "unknown";

/// Provider fully specified at construction
#[derive(Debug, Clone, Default)]
pub struct CustomProvider {
    name: String,
    long_name: Option<String>,
    endpoints: Vec<Endpoint>,
    auth: AuthDetails,
}

impl CustomProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Override the display name
    pub fn with_long_name(mut self, long_name: impl Into<String>) -> Self {
        self.long_name = Some(long_name.into());
        self
    }

    pub fn add_endpoint(&mut self, endpoint: Endpoint) {
        self.endpoints.push(endpoint);
    }

    pub fn set_auth(&mut self, auth: AuthDetails) {
        self.auth = auth;
    }

    /// Copy another provider's current credentials
    ///
    /// The copy is a snapshot: later changes on `reference` do not show
    /// up here.
    pub fn auth_from_provider(&mut self, reference: &dyn Provider) {
        self.auth = reference.auth();
    }
}

#[async_trait]
impl Provider for CustomProvider {
    fn name(&self) -> &str {
        if self.name.is_empty() {
            UNKNOWN_PROVIDER
        } else {
            &self.name
        }
    }

    fn long_name(&self) -> String {
        match &self.long_name {
            Some(long) if !long.is_empty() => long.clone(),
            _ => self.name().to_string(),
        }
    }

    async fn bootstrap(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    fn endpoints(&self) -> Arc<[Endpoint]> {
        Arc::from(self.endpoints.as_slice())
    }

    fn auth(&self) -> AuthDetails {
        self.auth.clone()
    }
}
