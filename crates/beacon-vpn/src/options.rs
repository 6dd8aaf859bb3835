//! OpenVPN Options
//!
//! Cipher, digest and credential fields attached to every rendered
//! endpoint, keyed by provider.

use crate::auth::AuthDetails;
use crate::tunnelbear::TUNNELBEAR_NAME;
use serde::{Deserialize, Serialize};

/// Per-endpoint connection options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Options {
    pub cipher: String,
    pub auth: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compress: Option<String>,
    #[serde(default)]
    pub safe_ca: String,
    #[serde(default)]
    pub safe_cert: String,
    #[serde(default)]
    pub safe_key: String,
    #[serde(default)]
    pub safe_local_creds: bool,
}

/// How a provider wants its tunnels configured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionsPolicy {
    pub cipher: &'static str,
    pub auth: &'static str,
    pub compress: Option<&'static str>,
    /// Client certificate and key go into the options
    pub cert_auth: bool,
    /// User credentials are supplied on the measuring host
    pub local_creds: bool,
}

impl OptionsPolicy {
    /// AES-256-GCM / SHA512 with certificate auth
    pub const DEFAULT: OptionsPolicy = OptionsPolicy {
        cipher: "AES-256-GCM",
        auth: "SHA512",
        compress: None,
        cert_auth: true,
        local_creds: false,
    };

    pub const TUNNELBEAR: OptionsPolicy = OptionsPolicy {
        cipher: "AES-256-CBC",
        auth: "SHA256",
        compress: Some("comp-lzo"),
        cert_auth: false,
        local_creds: true,
    };

    pub fn for_provider(name: &str) -> Self {
        match name {
            TUNNELBEAR_NAME => Self::TUNNELBEAR,
            _ => Self::DEFAULT,
        }
    }

    /// Options for one endpoint given the provider's credentials
    pub fn options(&self, auth: &AuthDetails) -> Options {
        let (safe_cert, safe_key) = if self.cert_auth {
            (auth.cert.clone(), auth.key.clone())
        } else {
            (String::new(), String::new())
        };

        Options {
            cipher: self.cipher.to_string(),
            auth: self.auth.to_string(),
            compress: self.compress.map(str::to_string),
            safe_ca: auth.ca.clone(),
            safe_cert,
            safe_key,
            safe_local_creds: self.local_creds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> AuthDetails {
        AuthDetails {
            ca: "base64:Y2E=".into(),
            cert: "base64:Y2VydA==".into(),
            key: "base64:a2V5".into(),
        }
    }

    #[test]
    fn test_riseup_policy() {
        let options = OptionsPolicy::for_provider("riseup").options(&auth());
        assert_eq!(options.cipher, "AES-256-GCM");
        assert_eq!(options.auth, "SHA512");
        assert_eq!(options.compress, None);
        assert_eq!(options.safe_ca, "base64:Y2E=");
        assert_eq!(options.safe_cert, "base64:Y2VydA==");
        assert_eq!(options.safe_key, "base64:a2V5");
        assert!(!options.safe_local_creds);
    }

    #[test]
    fn test_tunnelbear_policy() {
        let options = OptionsPolicy::for_provider("tunnelbear").options(&auth());
        assert_eq!(options.cipher, "AES-256-CBC");
        assert_eq!(options.auth, "SHA256");
        assert_eq!(options.compress.as_deref(), Some("comp-lzo"));
        assert_eq!(options.safe_ca, "base64:Y2E=");
        assert!(options.safe_cert.is_empty());
        assert!(options.safe_key.is_empty());
        assert!(options.safe_local_creds);
    }

    #[test]
    fn test_unknown_provider_gets_default() {
        assert_eq!(OptionsPolicy::for_provider("unknown"), OptionsPolicy::DEFAULT);
        assert_eq!(OptionsPolicy::for_provider(""), OptionsPolicy::DEFAULT);
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(OptionsPolicy::DEFAULT.options(&auth())).unwrap();
        let obj = json.as_object().unwrap();
        for key in ["Cipher", "Auth", "SafeCa", "SafeCert", "SafeKey", "SafeLocalCreds"] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert!(!obj.contains_key("Compress"));

        let json = serde_json::to_value(OptionsPolicy::TUNNELBEAR.options(&auth())).unwrap();
        assert_eq!(json["Compress"], "comp-lzo");
    }
}
