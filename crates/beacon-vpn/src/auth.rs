//! Provider Credentials
//!
//! Credential material travels inside descriptors as `base64:`-tagged
//! strings: the literal prefix followed by URL-safe base64 of the PEM text.

use base64::{Engine as _, engine::general_purpose::URL_SAFE as BASE64_URL};
use pem::{EncodeConfig, LineEnding, Pem, PemError};
use serde::{Deserialize, Serialize};

/// Prefix marking a base64 payload in descriptor options
pub const BASE64_TAG: &str = "base64:";

const LABEL_CERTIFICATE: &str = "CERTIFICATE";
const LABEL_RSA_PRIVATE_KEY: &str = "RSA PRIVATE KEY";

/// Credential bundle of one provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthDetails {
    /// CA certificate
    pub ca: String,
    /// Client certificate
    pub cert: String,
    /// Client private key
    pub key: String,
}

impl AuthDetails {
    /// No credential material at all
    pub fn is_empty(&self) -> bool {
        self.ca.is_empty() && self.cert.is_empty() && self.key.is_empty()
    }
}

/// Encode bytes as a `base64:` tagged string
pub fn base64_tagged(bytes: &[u8]) -> String {
    format!("{BASE64_TAG}{}", BASE64_URL.encode(bytes))
}

/// Credential bundle errors
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("PEM error: {0}")]
    Pem(#[from] PemError),

    #[error("expected a key and a certificate block, found {0} blocks")]
    BlockCount(usize),

    #[error("block {position}: expected {expected}, found {found}")]
    UnexpectedBlock {
        position: usize,
        expected: &'static str,
        found: String,
    },
}

/// PEM text of a client key and its certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub key: String,
    pub cert: String,
}

/// Split a combined bundle into its key and certificate
///
/// The bundle must hold exactly two blocks: an RSA private key followed
/// by a certificate. Any other shape is rejected. Each block is
/// re-encoded on its own with LF line endings.
pub fn split_combined_pem(bundle: &str) -> Result<ClientCredentials, CredentialError> {
    let blocks = pem::parse_many(bundle)?;
    let [key, cert] = blocks.as_slice() else {
        return Err(CredentialError::BlockCount(blocks.len()));
    };

    for (position, block, expected) in [
        (0, key, LABEL_RSA_PRIVATE_KEY),
        (1, cert, LABEL_CERTIFICATE),
    ] {
        if block.tag() != expected {
            return Err(CredentialError::UnexpectedBlock {
                position,
                expected,
                found: block.tag().to_string(),
            });
        }
    }

    Ok(ClientCredentials {
        key: pem_text(key),
        cert: pem_text(cert),
    })
}

fn pem_text(block: &Pem) -> String {
    pem::encode_config(block, EncodeConfig::new().set_line_ending(LineEnding::LF))
}

/// Build a tagged credential bundle from a combined key+cert PEM and a CA
pub fn tagged_bundle(combined: &str, ca_pem: &str) -> Result<AuthDetails, CredentialError> {
    let creds = split_combined_pem(combined)?;
    Ok(AuthDetails {
        ca: base64_tagged(ca_pem.as_bytes()),
        cert: base64_tagged(creds.cert.as_bytes()),
        key: base64_tagged(creds.key.as_bytes()),
    })
}
