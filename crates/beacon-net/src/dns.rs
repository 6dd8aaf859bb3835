//! Async DNS Resolver with Caching
//!
//! Resolves gateway hostnames found in provider config bundles.
//! Successful lookups are cached for a configurable TTL.

use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::net::IpAddr;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

/// DNS resolution errors
#[derive(Debug, Error)]
pub enum DnsError {
    #[error("Resolution failed: {0}")]
    ResolutionFailed(String),

    #[error("No addresses found for domain")]
    NoAddresses,

    #[error("Resolver error: {0}")]
    ResolverError(String),
}

/// DNS resolver configuration
#[derive(Debug, Clone)]
pub struct DnsConfig {
    /// Cache TTL for successful lookups
    pub cache_ttl: Duration,
    /// Maximum cache size
    pub max_cache_entries: usize,
    /// Whether to use system DNS or Cloudflare
    pub use_system_dns: bool,
    /// Timeout for a single DNS query
    pub timeout: Duration,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(300), // 5 minutes
            max_cache_entries: 4096,
            use_system_dns: true,
            timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Clone)]
struct CacheEntry {
    addresses: Vec<IpAddr>,
    expires_at: Instant,
}

/// Async DNS resolver with caching
pub struct DnsResolver {
    resolver: TokioAsyncResolver,
    cache: RwLock<HashMap<String, CacheEntry>>,
    config: DnsConfig,
}

impl DnsResolver {
    /// Create a new DNS resolver
    pub fn new(config: DnsConfig) -> Result<Self, DnsError> {
        let resolver = if config.use_system_dns {
            TokioAsyncResolver::tokio_from_system_conf()
                .map_err(|e| DnsError::ResolverError(e.to_string()))?
        } else {
            let mut opts = ResolverOpts::default();
            opts.timeout = config.timeout;
            TokioAsyncResolver::tokio(ResolverConfig::cloudflare(), opts)
        };

        info!("DNS resolver initialized (system: {})", config.use_system_dns);

        Ok(Self {
            resolver,
            cache: RwLock::new(HashMap::new()),
            config,
        })
    }

    /// Create with default configuration
    pub fn with_defaults() -> Result<Self, DnsError> {
        Self::new(DnsConfig::default())
    }

    /// Resolve a domain to IP addresses
    pub async fn resolve(&self, domain: &str) -> Result<Vec<IpAddr>, DnsError> {
        let normalized = domain.trim().trim_end_matches('.').to_lowercase();

        if let Ok(ip) = normalized.parse::<IpAddr>() {
            return Ok(vec![ip]);
        }

        if let Some(cached) = self.get_cached(&normalized) {
            debug!("DNS cache hit for: {}", domain);
            return Ok(cached);
        }

        debug!("DNS lookup for: {}", domain);
        let lookup = self
            .resolver
            .lookup_ip(normalized.as_str())
            .await
            .map_err(|e| DnsError::ResolutionFailed(e.to_string()))?;

        let addresses: Vec<IpAddr> = lookup.iter().collect();
        if addresses.is_empty() {
            return Err(DnsError::NoAddresses);
        }

        self.cache_addresses(&normalized, &addresses);
        Ok(addresses)
    }

    /// (total entries, unexpired entries)
    pub fn cache_stats(&self) -> (usize, usize) {
        let cache = self.cache.read();
        let now = Instant::now();
        let total = cache.len();
        let valid = cache.values().filter(|e| e.expires_at > now).count();
        (total, valid)
    }

    fn get_cached(&self, domain: &str) -> Option<Vec<IpAddr>> {
        self.cache
            .read()
            .get(domain)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.addresses.clone())
    }

    fn cache_addresses(&self, domain: &str, addresses: &[IpAddr]) {
        let mut cache = self.cache.write();

        if cache.len() >= self.config.max_cache_entries {
            let now = Instant::now();
            cache.retain(|_, v| v.expires_at > now);

            if cache.len() >= self.config.max_cache_entries {
                let keys_to_remove: Vec<_> = cache
                    .keys()
                    .take(cache.len() / 4 + 1)
                    .cloned()
                    .collect();
                for key in keys_to_remove {
                    cache.remove(&key);
                }
            }
        }

        cache.insert(
            domain.to_string(),
            CacheEntry {
                addresses: addresses.to_vec(),
                expires_at: Instant::now() + self.config.cache_ttl,
            },
        );
    }
}
