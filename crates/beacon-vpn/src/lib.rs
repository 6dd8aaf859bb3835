//! Beacon VPN - Endpoint Selection and Descriptor Rendering
//!
//! Produces OpenVPN measurement descriptors from provider catalogs.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   endpoints()   ┌─────────────────────────┐
//! │  Provider    │────────────────▶│  Picker                 │
//! │  riseup      │                 │  filter ∧ health gate   │
//! │  tunnelbear  │                 │  max draws, replacement │
//! │  custom      │                 └───────────┬─────────────┘
//! └──────┬───────┘                             │
//!        │ auth()                              ▼
//!        │                         ┌─────────────────────────┐
//!        └────────────────────────▶│  render → Descriptor    │
//!                                  └─────────────────────────┘
//! ```
//!
//! # Features
//!
//! - **Providers**: Riseup (pinned API), Tunnelbear (config bundle), Custom
//! - **Health gate**: per-provider oracle, fail-open
//! - **Selection**: seedable RNG, uniform draws with replacement
//! - **Experiments**: stored descriptor requests, fixed-remote replay

mod auth;
mod certs;
mod custom;
mod endpoint;
mod experiment;
mod health;
mod options;
mod provider;
mod registry;
mod render;
mod riseup;
mod select;
mod tunnelbear;

#[cfg(test)]
mod testing;

pub use auth::{AuthDetails, ClientCredentials, CredentialError, BASE64_TAG, base64_tagged};
pub use custom::{CustomProvider, UNKNOWN_PROVIDER};
pub use endpoint::{Endpoint, OBFS_NONE, OBFS_OBFS4, PROTO_OPENVPN, TRANSPORT_TCP, TRANSPORT_UDP};
pub use experiment::{Experiment, ExperimentError, custom_provider, descriptor_for_experiment};
pub use health::{
    DEFAULT_MAX_AGE, EndpointHealth, HealthError, HealthGate, HealthOracle, HealthRegistry, HealthTable,
    ProbeOutcome,
};
pub use options::{Options, OptionsPolicy};
pub use provider::{Provider, ProviderError, ProviderState};
pub use registry::{BootstrapReport, ProviderRegistry, ProviderSettings, RegistryError};
pub use render::{AUTHOR, Descriptor, NetTest, RenderError, endpoint_url, render, render_endpoints};
pub use riseup::{RiseupConfig, RiseupProvider, RISEUP_NAME};
pub use select::{EmptyReason, EndpointFilter, Picker, Selector, draw, eligible, pick_with};
pub use tunnelbear::{Remote, TunnelbearConfig, TunnelbearProvider, TUNNELBEAR_NAME};
