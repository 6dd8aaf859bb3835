//! Descriptor Rendering
//!
//! Turns a provider and a selection into the JSON descriptor consumed by
//! the measurement client. Descriptors are built fresh for every request.

use crate::endpoint::Endpoint;
use crate::options::{Options, OptionsPolicy};
use crate::provider::Provider;
use crate::select::{EmptyReason, Picker, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const AUTHOR: &str = "Ain Ghazal <ain@openobservatory.org>";

/// Top-level descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    pub name: String,
    pub description: String,
    pub author: String,
    #[serde(rename = "nettests")]
    pub net_tests: Vec<NetTest>,
}

/// One measurement to run against one endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetTest {
    pub test_name: String,
    pub inputs: Vec<String>,
    pub options: Options,
}

/// Rendering errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// Selection came back empty; the reason is for logs only
    #[error("cannot build config")]
    CannotBuildConfig { reason: EmptyReason },
}

/// `vpn://{proto}.{provider}/?addr={ip}:{port}&transport={transport}`
pub fn endpoint_url(provider: &str, endpoint: &Endpoint) -> String {
    format!(
        "vpn://{}.{}/?addr={}&transport={}",
        endpoint.proto,
        provider,
        endpoint.address(),
        endpoint.transport
    )
}

/// Select endpoints and render them
pub fn render(provider: &dyn Provider, selector: &Selector, picker: &Picker) -> Result<Descriptor, RenderError> {
    let endpoints = picker
        .pick(provider, selector)
        .map_err(|reason| RenderError::CannotBuildConfig { reason })?;
    Ok(render_endpoints(provider, &endpoints))
}

/// Render an already selected, non-empty endpoint list
///
/// Credentials are read once, so every entry carries the same bundle even
/// if the provider re-bootstraps concurrently.
pub fn render_endpoints(provider: &dyn Provider, endpoints: &[Endpoint]) -> Descriptor {
    let name = provider.name();
    let auth = provider.auth();
    let policy = OptionsPolicy::for_provider(name);

    let net_tests = endpoints
        .iter()
        .map(|endpoint| NetTest {
            test_name: endpoint.proto.clone(),
            inputs: vec![endpoint_url(name, endpoint)],
            options: policy.options(&auth),
        })
        .collect::<Vec<_>>();

    debug!("Rendered {} entries for {}", net_tests.len(), name);

    Descriptor {
        name: format!("openvpn-{name}"),
        description: format!("measure vpn connection to random {} gateways", provider.long_name()),
        author: AUTHOR.to_string(),
        net_tests,
    }
}
