//! Experiments
//!
//! A stored, shareable request for a descriptor: either "`max` endpoints
//! of provider P in country CC", or one fixed remote replayed under a
//! custom provider.

use crate::custom::{CustomProvider, UNKNOWN_PROVIDER};
use crate::endpoint::{Endpoint, OBFS_NONE, PROTO_OPENVPN, TRANSPORT_TCP};
use crate::registry::ProviderRegistry;
use crate::render::{self, Descriptor, RenderError};
use crate::select::{Picker, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Experiment definition as submitted by users
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experiment {
    #[serde(rename = "ID", default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub provider: String,
    #[serde(rename = "cc", default)]
    pub country_code: String,
    #[serde(default)]
    pub comment: String,
    /// Requested endpoint count, as typed by the user
    #[serde(default)]
    pub max: String,
    /// `ip:port` of a fixed remote, or empty
    #[serde(default)]
    pub endpoint_remote: String,
    #[serde(rename = "UUID", default)]
    pub uuid: String,
}

/// Experiment errors
#[derive(Debug, thiserror::Error)]
pub enum ExperimentError {
    #[error("malformed endpoint remote {0:?}, expected ip:port")]
    MalformedRemote(String),

    #[error("unknown provider {0:?}")]
    UnknownProvider(String),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl Experiment {
    /// `max` as a count; empty or unparsable means 1, negative means 0
    pub fn max_or_one(&self) -> usize {
        let max = self.max.trim();
        if max.is_empty() {
            return 1;
        }
        match max.parse::<i64>() {
            Ok(n) => usize::try_from(n).unwrap_or(0),
            Err(_) => 1,
        }
    }

    pub fn has_custom_remote(&self) -> bool {
        !self.endpoint_remote.trim().is_empty()
    }

    /// Split `endpoint_remote` into host and port
    ///
    /// Accepts `ip:port` and `[v6]:port`.
    pub fn remote(&self) -> Result<(String, String), ExperimentError> {
        let remote = self.endpoint_remote.trim();
        let malformed = || ExperimentError::MalformedRemote(self.endpoint_remote.clone());

        let (host, port) = remote.rsplit_once(':').ok_or_else(malformed)?;
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);

        if host.is_empty() || port.is_empty() {
            return Err(malformed());
        }
        Ok((host.to_string(), port.to_string()))
    }
}

/// Single-endpoint provider replaying the experiment's remote
///
/// Credentials are copied from the registered provider of the same name,
/// unless the experiment names the `unknown` sentinel.
pub fn custom_provider(exp: &Experiment, registry: &ProviderRegistry) -> Result<CustomProvider, ExperimentError> {
    let (ip, port) = exp.remote()?;

    let mut provider = CustomProvider::new(exp.provider.clone())
        .with_long_name(format!("{}-{}", exp.provider, exp.name));

    if exp.provider != UNKNOWN_PROVIDER {
        let reference = registry
            .get(&exp.provider)
            .ok_or_else(|| ExperimentError::UnknownProvider(exp.provider.clone()))?;
        provider.auth_from_provider(reference.as_ref());
    }

    provider.add_endpoint(Endpoint {
        label: exp.name.clone(),
        ip,
        port,
        proto: PROTO_OPENVPN.to_string(),
        transport: TRANSPORT_TCP.to_string(),
        obfuscation: OBFS_NONE.to_string(),
        country_code: exp.country_code.clone(),
    });

    Ok(provider)
}

/// Descriptor for a stored experiment
pub fn descriptor_for_experiment(
    exp: &Experiment,
    registry: &ProviderRegistry,
    picker: &Picker,
) -> Result<Descriptor, ExperimentError> {
    if exp.has_custom_remote() {
        debug!("Experiment {}: custom remote {}", exp.uuid, exp.endpoint_remote);
        let provider = custom_provider(exp, registry)?;
        return Ok(render::render(&provider, &Selector::random(), picker)?);
    }

    let provider = registry
        .get(&exp.provider)
        .ok_or_else(|| ExperimentError::UnknownProvider(exp.provider.clone()))?;
    let selector = Selector::by_country(exp.country_code.clone(), exp.max_or_one());
    Ok(render::render(provider.as_ref(), &selector, picker)?)
}
