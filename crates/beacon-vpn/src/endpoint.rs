//! VPN Endpoints
//!
//! One endpoint is one reachable gateway instance: an address plus the
//! protocol, transport and obfuscation it speaks there.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};

/// OpenVPN, the only tunnel protocol providers hand out today
pub const PROTO_OPENVPN: &str = "openvpn";

pub const TRANSPORT_TCP: &str = "tcp";
pub const TRANSPORT_UDP: &str = "udp";

pub const OBFS_NONE: &str = "none";
pub const OBFS_OBFS4: &str = "obfs4";

/// A single gateway endpoint
///
/// Endpoints are plain values. Providers hand out snapshots of their
/// endpoint list, so a caller holding one never observes later changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// Human readable tag (gateway host, `cc-n`, experiment name)
    pub label: String,
    /// IP address as published by the provider
    pub ip: String,
    /// Port, kept as published (not validated as numeric)
    pub port: String,
    /// Tunnel protocol, e.g. `openvpn`
    pub proto: String,
    /// `tcp` or `udp`
    pub transport: String,
    /// `none` or `obfs4`
    pub obfuscation: String,
    /// Lower-case ISO country code, or empty when unknown
    pub country_code: String,
}

impl Endpoint {
    /// Plain OpenVPN over TCP endpoint with no label or country
    pub fn openvpn(ip: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            label: String::new(),
            ip: ip.into(),
            port: port.into(),
            proto: PROTO_OPENVPN.to_string(),
            transport: TRANSPORT_TCP.to_string(),
            obfuscation: OBFS_NONE.to_string(),
            country_code: String::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_transport(mut self, transport: impl Into<String>) -> Self {
        self.transport = transport.into();
        self
    }

    pub fn with_obfuscation(mut self, obfuscation: impl Into<String>) -> Self {
        self.obfuscation = obfuscation.into();
        self
    }

    pub fn with_country(mut self, country_code: impl Into<String>) -> Self {
        self.country_code = country_code.into();
        self
    }

    /// `ip:port`, as used in descriptor inputs and logs
    pub fn address(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }

    /// Parsed socket address, if both IP and port are well formed
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        let ip: IpAddr = self.ip.parse().ok()?;
        let port: u16 = self.port.parse().ok()?;
        Some(SocketAddr::new(ip, port))
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.address(), self.transport)
    }
}
