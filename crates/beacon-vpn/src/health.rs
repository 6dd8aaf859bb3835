//! Endpoint Health
//!
//! Reachability oracles are registered per provider name by whatever runs
//! background probing. Selection only queries them, through a
//! [`HealthGate`].
//!
//! # Fail-open
//!
//! A provider without an oracle passes every endpoint, and an oracle
//! error counts as healthy. Only an explicit `Ok(false)` removes an
//! endpoint from selection.

use crate::endpoint::Endpoint;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Health query errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HealthError {
    #[error("No health record for {0}")]
    NoRecord(String),

    #[error("Health record for {0} is stale")]
    Stale(String),

    #[error("Probe failed: {0}")]
    Probe(String),
}

/// Answers "is this address reachable over this transport?"
///
/// Called synchronously on the request path; implementations must bound
/// their own latency.
pub trait HealthOracle: Send + Sync {
    fn healthy(&self, addr: SocketAddr, transport: &str) -> Result<bool, HealthError>;
}

/// Oracles by provider name
#[derive(Default)]
pub struct HealthRegistry {
    oracles: RwLock<HashMap<String, Arc<dyn HealthOracle>>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the oracle for a provider
    pub fn register(&self, provider: impl Into<String>, oracle: Arc<dyn HealthOracle>) {
        self.oracles.write().insert(provider.into(), oracle);
    }

    /// Remove a provider's oracle; its endpoints become ungated
    pub fn unregister(&self, provider: &str) -> Option<Arc<dyn HealthOracle>> {
        self.oracles.write().remove(provider)
    }

    pub fn get(&self, provider: &str) -> Option<Arc<dyn HealthOracle>> {
        self.oracles.read().get(provider).cloned()
    }

    /// Gate for one selection over `provider`'s endpoints
    pub fn gate(&self, provider: &str) -> HealthGate {
        match self.get(provider) {
            Some(oracle) => HealthGate::Probed {
                provider: provider.to_string(),
                oracle,
            },
            None => HealthGate::Open,
        }
    }
}

/// Filter predicate backed by an optional oracle
#[derive(Clone)]
pub enum HealthGate {
    /// No oracle registered: everything passes
    Open,
    /// Ask the oracle; errors pass
    Probed {
        provider: String,
        oracle: Arc<dyn HealthOracle>,
    },
}

impl HealthGate {
    pub fn passes(&self, endpoint: &Endpoint) -> bool {
        let HealthGate::Probed { provider, oracle } = self else {
            return true;
        };

        let Some(addr) = endpoint.socket_addr() else {
            warn!(
                "{}: cannot probe malformed address {}, treating as healthy",
                provider,
                endpoint.address()
            );
            return true;
        };

        match oracle.healthy(addr, &endpoint.transport) {
            Ok(healthy) => {
                debug!("{}: {} healthy={}", provider, endpoint, healthy);
                healthy
            }
            Err(e @ (HealthError::NoRecord(_) | HealthError::Stale(_))) => {
                debug!("{}: {} ({}), treating as healthy", provider, endpoint, e);
                true
            }
            Err(e) => {
                warn!("{}: health check for {} failed ({}), treating as healthy", provider, endpoint, e);
                true
            }
        }
    }
}

impl std::fmt::Debug for HealthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthGate::Open => write!(f, "HealthGate::Open"),
            HealthGate::Probed { provider, .. } => write!(f, "HealthGate::Probed({provider})"),
        }
    }
}

/// Consecutive failed probes before an endpoint counts as down
const FAILURE_THRESHOLD: u32 = 3;

/// Reports older than this no longer decide anything
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(600);

/// Probe history of one (address, transport) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointHealth {
    /// When the latest probe report arrived
    pub last_report: Instant,
    /// When a probe last got through
    pub last_success: Option<Instant>,
    /// Round trip of the last successful probe
    pub latency: Option<Duration>,
    /// Failed probes since the last success
    pub consecutive_failures: u32,
}

impl EndpointHealth {
    fn new(now: Instant) -> Self {
        Self {
            last_report: now,
            last_success: None,
            latency: None,
            consecutive_failures: 0,
        }
    }

    /// Verdict at `now`, or `None` once every report is older than `max_age`
    ///
    /// An endpoint stays up through isolated failures as long as it
    /// answered recently; it goes down after three failures in a row
    /// or when it has not answered within `max_age`.
    pub fn verdict(&self, now: Instant, max_age: Duration) -> Option<bool> {
        if now.saturating_duration_since(self.last_report) > max_age {
            return None;
        }
        if self.consecutive_failures >= FAILURE_THRESHOLD {
            return Some(false);
        }
        Some(match self.last_success {
            Some(at) => now.saturating_duration_since(at) <= max_age,
            // reported, never answered, below the threshold
            None => true,
        })
    }

    fn record(&mut self, outcome: ProbeOutcome, now: Instant) {
        self.last_report = now;
        match outcome {
            ProbeOutcome::Reachable { latency } => {
                self.last_success = Some(now);
                self.latency = Some(latency);
                self.consecutive_failures = 0;
            }
            ProbeOutcome::Unreachable => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
            }
        }
    }
}

/// Result of one external probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Reachable { latency: Duration },
    Unreachable,
}

/// In-memory oracle fed by an external prober
///
/// Unknown and stale endpoints answer with an error, which the gate
/// treats as healthy.
pub struct HealthTable {
    entries: RwLock<HashMap<(SocketAddr, String), EndpointHealth>>,
    max_age: Duration,
}

impl HealthTable {
    pub fn new() -> Self {
        Self::with_max_age(DEFAULT_MAX_AGE)
    }

    pub fn with_max_age(max_age: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_age,
        }
    }

    /// Record a probe result received now
    pub fn report(&self, addr: SocketAddr, transport: &str, outcome: ProbeOutcome) {
        self.report_at(addr, transport, outcome, Instant::now());
    }

    fn report_at(&self, addr: SocketAddr, transport: &str, outcome: ProbeOutcome, now: Instant) {
        self.entries
            .write()
            .entry((addr, transport.to_string()))
            .or_insert_with(|| EndpointHealth::new(now))
            .record(outcome, now);
    }

    pub fn status(&self, addr: SocketAddr, transport: &str) -> Option<EndpointHealth> {
        self.entries
            .read()
            .get(&(addr, transport.to_string()))
            .cloned()
    }

    /// Drop entries whose latest report is older than the max age
    pub fn prune(&self) -> usize {
        self.prune_at(Instant::now())
    }

    fn prune_at(&self, now: Instant) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, h| h.verdict(now, self.max_age).is_some());
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn healthy_at(&self, addr: SocketAddr, transport: &str, now: Instant) -> Result<bool, HealthError> {
        let key = format!("{addr}/{transport}");
        let status = self
            .status(addr, transport)
            .ok_or_else(|| HealthError::NoRecord(key.clone()))?;
        status
            .verdict(now, self.max_age)
            .ok_or(HealthError::Stale(key))
    }
}

impl Default for HealthTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthOracle for HealthTable {
    fn healthy(&self, addr: SocketAddr, transport: &str) -> Result<bool, HealthError> {
        self.healthy_at(addr, transport, Instant::now())
    }
}
