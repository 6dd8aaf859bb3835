//! Beacon Network Layer
//!
//! Outbound plumbing used by VPN providers while bootstrapping.
//!
//! - HTTPS client with either public or pinned trust roots
//! - Cached DNS resolution for gateway hostnames

mod client;
mod dns;

pub use client::{HttpClient, HttpClientConfig, HttpError, Response, TrustRoots};
pub use dns::{DnsConfig, DnsError, DnsResolver};
