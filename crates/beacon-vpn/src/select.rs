//! Endpoint Selection
//!
//! filter ∧ health gate, then `max` independent uniform draws with
//! replacement. The result length is exactly `max` whenever anything
//! survives filtering, so small pools yield duplicates.

use crate::endpoint::Endpoint;
use crate::health::{HealthGate, HealthRegistry};
use crate::provider::Provider;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Which endpoints are eligible
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointFilter {
    /// Every endpoint
    Any,
    /// Exact match on the stored (lower-case) country code
    Country(String),
}

impl EndpointFilter {
    pub fn matches(&self, endpoint: &Endpoint) -> bool {
        match self {
            EndpointFilter::Any => true,
            EndpointFilter::Country(cc) => endpoint.country_code == *cc,
        }
    }
}

/// Filter plus the number of draws
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub filter: EndpointFilter,
    pub max: usize,
}

impl Selector {
    pub fn new(filter: EndpointFilter, max: usize) -> Self {
        Self { filter, max }
    }

    /// One endpoint from anywhere
    pub fn random() -> Self {
        Self::new(EndpointFilter::Any, 1)
    }

    /// `max` endpoints located in `cc`
    ///
    /// Matching is case-sensitive; callers pass lower-case codes.
    pub fn by_country(cc: impl Into<String>, max: usize) -> Self {
        Self::new(EndpointFilter::Country(cc.into()), max)
    }
}

/// Why a selection came back empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// Provider has no endpoints (not bootstrapped, or bootstrap found none)
    NoEndpoints,
    /// No endpoint matched the filter
    NoMatch,
    /// Endpoints matched, but the health gate rejected all of them
    AllUnhealthy,
    /// Zero draws requested
    NothingRequested,
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            EmptyReason::NoEndpoints => "provider has no endpoints",
            EmptyReason::NoMatch => "no endpoint matches the filter",
            EmptyReason::AllUnhealthy => "all matching endpoints are unhealthy",
            EmptyReason::NothingRequested => "zero endpoints requested",
        };
        f.write_str(text)
    }
}

/// Endpoints that match `filter` and pass `gate`
///
/// Consults the health oracle once per matching endpoint.
pub fn eligible<'a>(
    endpoints: &'a [Endpoint],
    filter: &EndpointFilter,
    gate: &HealthGate,
) -> Result<Vec<&'a Endpoint>, EmptyReason> {
    if endpoints.is_empty() {
        return Err(EmptyReason::NoEndpoints);
    }

    let matching: Vec<&Endpoint> = endpoints.iter().filter(|e| filter.matches(e)).collect();
    if matching.is_empty() {
        return Err(EmptyReason::NoMatch);
    }

    let valid: Vec<&Endpoint> = matching.into_iter().filter(|e| gate.passes(e)).collect();
    if valid.is_empty() {
        return Err(EmptyReason::AllUnhealthy);
    }

    Ok(valid)
}

/// `max` uniform draws with replacement from a non-empty pool
pub fn draw<R: Rng + ?Sized>(
    valid: &[&Endpoint],
    max: usize,
    rng: &mut R,
) -> Result<Vec<Endpoint>, EmptyReason> {
    if valid.is_empty() {
        return Err(EmptyReason::AllUnhealthy);
    }
    if max == 0 {
        return Err(EmptyReason::NothingRequested);
    }

    let picked = (0..max)
        .map(|_| {
            let i = rng.gen_range(0..valid.len());
            debug!("Drew {} of {}: {}", i, valid.len(), valid[i]);
            valid[i].clone()
        })
        .collect();

    Ok(picked)
}

/// Core selection over an endpoint slice
pub fn pick_with<R: Rng + ?Sized>(
    endpoints: &[Endpoint],
    filter: &EndpointFilter,
    gate: &HealthGate,
    max: usize,
    rng: &mut R,
) -> Result<Vec<Endpoint>, EmptyReason> {
    let valid = eligible(endpoints, filter, gate)?;
    draw(&valid, max, rng)
}

/// Selection engine: health registry plus a shared RNG
pub struct Picker {
    rng: Mutex<StdRng>,
    health: Arc<HealthRegistry>,
}

impl Picker {
    pub fn new(health: Arc<HealthRegistry>) -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
            health,
        }
    }

    /// Deterministic draws
    pub fn seeded(seed: u64, health: Arc<HealthRegistry>) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            health,
        }
    }

    pub fn health(&self) -> &Arc<HealthRegistry> {
        &self.health
    }

    /// Select endpoints of `provider` according to `selector`
    ///
    /// Health checks run before the RNG lock is taken, so a slow oracle
    /// only delays its own caller.
    pub fn pick(&self, provider: &dyn Provider, selector: &Selector) -> Result<Vec<Endpoint>, EmptyReason> {
        let endpoints = provider.endpoints();
        let gate = self.health.gate(provider.name());

        let result = eligible(&endpoints, &selector.filter, &gate)
            .and_then(|valid| draw(&valid, selector.max, &mut *self.rng.lock()));
        if let Err(reason) = &result {
            debug!("{}: empty selection ({})", provider.name(), reason);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::custom::CustomProvider;
    use crate::health::{HealthError, HealthOracle};
    use std::collections::HashSet;
    use std::net::SocketAddr;
    use std::sync::mpsc;
    use std::thread;
    use std::time::{Duration, Instant};

    struct Broken;

    impl HealthOracle for Broken {
        fn healthy(&self, _: SocketAddr, _: &str) -> Result<bool, HealthError> {
            Err(HealthError::Probe("timeout".into()))
        }
    }

    /// Only port 443 is up
    struct Only443;

    impl HealthOracle for Only443 {
        fn healthy(&self, addr: SocketAddr, _: &str) -> Result<bool, HealthError> {
            Ok(addr.port() == 443)
        }
    }

    /// Blocks inside `healthy` until released (or a long timeout)
    struct Stalled {
        entered: parking_lot::Mutex<mpsc::Sender<()>>,
        release: parking_lot::Mutex<mpsc::Receiver<()>>,
    }

    impl HealthOracle for Stalled {
        fn healthy(&self, _: SocketAddr, _: &str) -> Result<bool, HealthError> {
            let _ = self.entered.lock().send(());
            let _ = self.release.lock().recv_timeout(Duration::from_secs(5));
            Ok(true)
        }
    }

    fn provider(name: &str, endpoints: &[(&str, &str, &str)]) -> CustomProvider {
        let mut p = CustomProvider::new(name);
        for (ip, port, cc) in endpoints {
            p.add_endpoint(Endpoint::openvpn(*ip, *port).with_country(*cc));
        }
        p
    }

    fn picker() -> Picker {
        Picker::seeded(7, Arc::new(HealthRegistry::new()))
    }

    #[test]
    fn test_draws_exactly_max_from_pool() {
        let p = provider("p", &[("10.0.0.1", "1194", "de"), ("10.0.0.2", "1194", "fr")]);
        let pool: HashSet<_> = p.endpoints().iter().cloned().collect();

        for max in [1, 2, 5, 17] {
            let picked = picker().pick(&p, &Selector::new(EndpointFilter::Any, max)).unwrap();
            assert_eq!(picked.len(), max);
            assert!(picked.iter().all(|e| pool.contains(e)));
        }
    }

    #[test]
    fn test_single_endpoint_repeats() {
        let p = provider("p", &[("10.0.0.1", "1194", "de")]);
        let picked = picker().pick(&p, &Selector::new(EndpointFilter::Any, 3)).unwrap();
        assert_eq!(picked.len(), 3);
        assert!(picked.iter().all(|e| e.ip == "10.0.0.1"));
    }

    #[test]
    fn test_empty_provider() {
        let p = provider("p", &[]);
        let result = picker().pick(&p, &Selector::random());
        assert_eq!(result, Err(EmptyReason::NoEndpoints));
    }

    #[test]
    fn test_country_filter_is_exact() {
        let p = provider(
            "p",
            &[
                ("10.0.0.1", "1194", "de"),
                ("10.0.0.2", "1194", "fr"),
                ("10.0.0.3", "1194", ""),
            ],
        );
        let picker = picker();

        let de = picker.pick(&p, &Selector::by_country("de", 10)).unwrap();
        assert!(de.iter().all(|e| e.country_code == "de"));

        assert_eq!(picker.pick(&p, &Selector::by_country("DE", 1)), Err(EmptyReason::NoMatch));
        assert_eq!(picker.pick(&p, &Selector::by_country("us", 1)), Err(EmptyReason::NoMatch));
    }

    #[test]
    fn test_no_oracle_passes_everything() {
        let p = provider("p", &[("10.0.0.1", "1194", "de"), ("10.0.0.2", "80", "de")]);
        let picked = picker().pick(&p, &Selector::by_country("de", 50)).unwrap();
        let seen: HashSet<_> = picked.iter().map(|e| e.ip.as_str()).collect();
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_oracle_error_passes_everything() {
        let health = Arc::new(HealthRegistry::new());
        health.register("p", Arc::new(Broken));
        let picker = Picker::seeded(1, health);

        let p = provider("p", &[("10.0.0.1", "1194", "de")]);
        assert_eq!(picker.pick(&p, &Selector::random()).unwrap().len(), 1);
    }

    #[test]
    fn test_oracle_filters() {
        let health = Arc::new(HealthRegistry::new());
        health.register("p", Arc::new(Only443));
        let picker = Picker::seeded(3, health);

        let p = provider("p", &[("10.0.0.1", "1194", "de"), ("10.0.0.2", "443", "de")]);
        let picked = picker.pick(&p, &Selector::by_country("de", 20)).unwrap();
        assert!(picked.iter().all(|e| e.port == "443"));

        let down = provider("p", &[("10.0.0.1", "1194", "de")]);
        assert_eq!(picker.pick(&down, &Selector::random()), Err(EmptyReason::AllUnhealthy));
    }

    #[test]
    fn test_slow_oracle_does_not_block_other_providers() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let health = Arc::new(HealthRegistry::new());
        health.register(
            "slow",
            Arc::new(Stalled {
                entered: parking_lot::Mutex::new(entered_tx),
                release: parking_lot::Mutex::new(release_rx),
            }),
        );
        let picker = Arc::new(Picker::seeded(11, health));

        let slow_pick = {
            let picker = picker.clone();
            thread::spawn(move || {
                let slow = provider("slow", &[("10.0.0.1", "1194", "de")]);
                picker.pick(&slow, &Selector::random())
            })
        };
        entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        let fast = provider("fast", &[("10.0.0.2", "1194", "fr")]);
        let started = Instant::now();
        let picked = picker.pick(&fast, &Selector::random()).unwrap();
        let waited = started.elapsed();

        release_tx.send(()).unwrap();
        assert_eq!(picked[0].ip, "10.0.0.2");
        assert!(waited < Duration::from_secs(1), "waited {waited:?}");
        assert_eq!(slow_pick.join().unwrap().unwrap().len(), 1);
    }

    #[test]
    fn test_eligible_then_draw() {
        let p = provider("p", &[("10.0.0.1", "1194", "de"), ("10.0.0.2", "1194", "fr")]);
        let endpoints = p.endpoints();
        let valid = eligible(&endpoints, &EndpointFilter::Country("fr".into()), &HealthGate::Open).unwrap();
        assert_eq!(valid.len(), 1);

        let mut rng = StdRng::seed_from_u64(1);
        let picked = draw(&valid, 4, &mut rng).unwrap();
        assert!(picked.iter().all(|e| e.ip == "10.0.0.2"));
        assert_eq!(draw(&[], 1, &mut rng), Err(EmptyReason::AllUnhealthy));
    }

    #[test]
    fn test_zero_max() {
        let p = provider("p", &[("10.0.0.1", "1194", "de")]);
        let result = picker().pick(&p, &Selector::new(EndpointFilter::Any, 0));
        assert_eq!(result, Err(EmptyReason::NothingRequested));
    }

    #[test]
    fn test_seeded_is_deterministic() {
        let p = provider(
            "p",
            &[
                ("10.0.0.1", "1194", "de"),
                ("10.0.0.2", "1194", "de"),
                ("10.0.0.3", "1194", "de"),
            ],
        );
        let selector = Selector::new(EndpointFilter::Any, 8);
        let a = Picker::seeded(42, Arc::new(HealthRegistry::new())).pick(&p, &selector).unwrap();
        let b = Picker::seeded(42, Arc::new(HealthRegistry::new())).pick(&p, &selector).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_selectors() {
        assert_eq!(Selector::random(), Selector::new(EndpointFilter::Any, 1));
        assert_eq!(
            Selector::by_country("nl", 4),
            Selector::new(EndpointFilter::Country("nl".into()), 4)
        );
    }
}
