//! Tunnelbear Provider
//!
//! Tunnelbear publishes a zip of OpenVPN client configs, one per country.
//! Bootstrap makes sure the bundle is on disk, scans it for `remote`
//! lines and resolves every gateway hostname. The leading subdomain label
//! of each hostname is the country code (`de.lazerpenguin.com` → `de`).

use crate::auth::AuthDetails;
use crate::endpoint::{Endpoint, OBFS_NONE, TRANSPORT_TCP};
use crate::provider::{Provider, ProviderError, ProviderState};
use async_trait::async_trait;
use beacon_net::{DnsConfig, DnsResolver, HttpClient};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

pub const TUNNELBEAR_NAME: &str = "tunnelbear";

pub const DEFAULT_CONFIG_URL: &str =
    "https://tunnelbear.s3.amazonaws.com/support/linux/openvpn.zip";

const ARCHIVE_NAME: &str = "openvpn.zip";
const PARTIAL_NAME: &str = "openvpn.zip.part";
const REMOTE_TOKEN: &str = "remote";

/// Where the config bundle comes from and where it is unpacked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelbearConfig {
    /// Bundle download URL
    pub config_url: String,
    /// Provider data directory (archive + unpacked `config/`)
    pub data_dir: PathBuf,
}

impl Default for TunnelbearConfig {
    fn default() -> Self {
        Self {
            config_url: DEFAULT_CONFIG_URL.to_string(),
            data_dir: PathBuf::from("data").join(TUNNELBEAR_NAME),
        }
    }
}

impl TunnelbearConfig {
    fn archive_path(&self) -> PathBuf {
        self.data_dir.join(ARCHIVE_NAME)
    }

    /// Download target until the bundle has been unpacked
    fn partial_path(&self) -> PathBuf {
        self.data_dir.join(PARTIAL_NAME)
    }

    fn extract_dir(&self) -> PathBuf {
        self.data_dir.join("config")
    }

    /// Directory scanned for `remote` lines
    pub fn openvpn_dir(&self) -> PathBuf {
        self.extract_dir().join("openvpn")
    }
}

/// A `remote host port` directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    pub host: String,
    pub port: String,
}

/// Tunnelbear VPN
///
/// The resolver is created on first bootstrap and kept, so a later
/// bootstrap answers repeated hostnames from its cache.
pub struct TunnelbearProvider {
    config: TunnelbearConfig,
    dns: DnsConfig,
    resolver: OnceCell<DnsResolver>,
    state: ProviderState,
}

impl TunnelbearProvider {
    pub fn new(config: TunnelbearConfig) -> Self {
        Self::with_dns(config, DnsConfig::default())
    }

    /// Use a specific resolver configuration for gateway hostnames
    pub fn with_dns(config: TunnelbearConfig, dns: DnsConfig) -> Self {
        Self {
            config,
            dns,
            resolver: OnceCell::new(),
            state: ProviderState::new(),
        }
    }

    async fn resolver(&self) -> Result<&DnsResolver, ProviderError> {
        let resolver = self
            .resolver
            .get_or_try_init(|| async { DnsResolver::new(self.dns.clone()) })
            .await?;
        Ok(resolver)
    }

    /// Download and unpack the config bundle unless it is already present
    ///
    /// A fresh download only becomes the archive once it unpacks. An
    /// archive that fails to unpack is deleted so the next bootstrap
    /// fetches it again.
    async fn ensure_bundle(&self) -> Result<(), ProviderError> {
        let archive = self.config.archive_path();

        if archive.exists() {
            if !self.config.openvpn_dir().exists() {
                if let Err(e) = self.unpack(&archive).await {
                    warn!("Discarding unusable bundle {}: {}", archive.display(), e);
                    discard(&archive).await;
                    return Err(e);
                }
            }
            return Ok(());
        }

        tokio::fs::create_dir_all(&self.config.data_dir).await?;
        let partial = self.config.partial_path();
        let downloaded = match self.download(&partial).await {
            Ok(()) => self.unpack(&partial).await,
            Err(e) => Err(e),
        };
        if let Err(e) = downloaded {
            discard(&partial).await;
            return Err(e);
        }

        tokio::fs::rename(&partial, &archive).await?;
        Ok(())
    }

    async fn download(&self, dest: &Path) -> Result<(), ProviderError> {
        let client = HttpClient::with_defaults()?;
        let response = client.get(&self.config.config_url).await?;
        if !response.is_success() {
            return Err(ProviderError::Status {
                url: self.config.config_url.clone(),
                status: response.status.as_u16(),
            });
        }
        tokio::fs::write(dest, &response.body).await?;
        info!(
            "Downloaded config bundle {} ({} bytes)",
            self.config.config_url,
            response.body.len()
        );
        Ok(())
    }

    async fn unpack(&self, archive: &Path) -> Result<(), ProviderError> {
        let (archive, dest) = (archive.to_path_buf(), self.config.extract_dir());
        tokio::task::spawn_blocking(move || extract_archive(&archive, &dest))
            .await
            .map_err(|e| ProviderError::Task(e.to_string()))?
    }
}

async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        debug!("Could not remove {}: {}", path.display(), e);
    }
}

impl Default for TunnelbearProvider {
    fn default() -> Self {
        Self::new(TunnelbearConfig::default())
    }
}

#[async_trait]
impl Provider for TunnelbearProvider {
    fn name(&self) -> &str {
        TUNNELBEAR_NAME
    }

    async fn bootstrap(&self) -> Result<(), ProviderError> {
        info!("Bootstrapping Tunnelbear");
        self.ensure_bundle().await?;

        let dir = self.config.openvpn_dir();
        let remotes = tokio::task::spawn_blocking(move || {
            find_in_dir(&dir, REMOTE_TOKEN).map(|lines| remotes_by_country(&lines))
        })
        .await
        .map_err(|e| ProviderError::Task(e.to_string()))??;
        info!("Got {} Tunnelbear endpoint domains", remotes.len());

        let resolver = self.resolver().await?;
        let mut endpoints = Vec::new();
        for (cc, remote) in &remotes {
            match resolver.resolve(&remote.host).await {
                Ok(ips) => endpoints.extend(endpoints_for(cc, remote, &ips)),
                Err(e) => warn!("Cannot resolve {}: {}", remote.host, e),
            }
        }
        let (cached, fresh) = resolver.cache_stats();
        info!(
            "Got {} Tunnelbear endpoints (DNS cache: {} hosts, {} fresh)",
            endpoints.len(),
            cached,
            fresh
        );

        self.state.replace_endpoints(endpoints);
        Ok(())
    }

    fn endpoints(&self) -> Arc<[Endpoint]> {
        self.state.endpoints()
    }

    fn auth(&self) -> AuthDetails {
        self.state.auth()
    }
}

fn endpoints_for(cc: &str, remote: &Remote, ips: &[std::net::IpAddr]) -> Vec<Endpoint> {
    ips.iter()
        .enumerate()
        .map(|(i, ip)| {
            Endpoint::openvpn(ip.to_string(), remote.port.clone())
                .with_label(format!("{cc}-{i}"))
                .with_transport(TRANSPORT_TCP)
                .with_obfuscation(OBFS_NONE)
                .with_country(cc)
        })
        .collect()
}

fn extract_archive(archive: &Path, dest: &Path) -> Result<(), ProviderError> {
    let file = fs::File::open(archive)?;
    let mut zip =
        zip::ZipArchive::new(file).map_err(|e| ProviderError::Archive(e.to_string()))?;
    zip.extract(dest)
        .map_err(|e| ProviderError::Archive(e.to_string()))?;
    info!("Extracted {} files into {}", zip.len(), dest.display());
    Ok(())
}

/// Parse a `remote <host> <port>` line
pub fn parse_remote_line(line: &str) -> Option<Remote> {
    let mut words = line.split_whitespace();
    if words.next()? != REMOTE_TOKEN {
        return None;
    }
    let host = words.next()?;
    let port = words.next()?;
    Some(Remote {
        host: host.to_string(),
        port: port.to_string(),
    })
}

/// Country code from the leading subdomain label
pub fn country_from_host(host: &str) -> String {
    host.split('.').next().unwrap_or_default().to_lowercase()
}

/// Map country code → remote; later lines win for a repeated country
pub fn remotes_by_country(lines: &[String]) -> BTreeMap<String, Remote> {
    lines
        .iter()
        .filter_map(|line| parse_remote_line(line))
        .map(|remote| (country_from_host(&remote.host), remote))
        .filter(|(cc, _)| !cc.is_empty())
        .collect()
}

/// Every line containing `pattern` in all files below `dir`
///
/// Unreadable entries are logged and skipped; only a missing or
/// unreadable root is an error.
pub fn find_in_dir(dir: &Path, pattern: &str) -> io::Result<Vec<String>> {
    let mut matches = Vec::new();
    let mut entries: Vec<_> = fs::read_dir(dir)?.filter_map(Result::ok).collect();
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            match find_in_dir(&path, pattern) {
                Ok(found) => matches.extend(found),
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
            continue;
        }
        match find_in_file(&path, pattern) {
            Ok(found) => matches.extend(found),
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }
    }

    debug!("{} lines matching {:?} under {}", matches.len(), pattern, dir.display());
    Ok(matches)
}

fn find_in_file(path: &Path, pattern: &str) -> io::Result<Vec<String>> {
    let reader = BufReader::new(fs::File::open(path)?);
    let mut matches = Vec::new();
    for line in reader.split(b'\n') {
        let line = String::from_utf8_lossy(&line?).into_owned();
        if line.contains(pattern) {
            matches.push(line);
        }
    }
    Ok(matches)
}
