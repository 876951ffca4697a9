//! Pinning configuration as delivered by application code.
//!
//! The configuration mirrors what a mobile bridge hands over: a mode name, a
//! list of pin strings, an optional domain scope and the `rejectUnauthorized`
//! policy flag. It can be built in code or parsed from a JSON document.

use crate::base::neterror::NetError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a pin is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PinningMode {
    /// Full DER-encoded certificate bytes.
    #[serde(rename = "certificate")]
    Certificate,
    /// DER-encoded SubjectPublicKeyInfo extracted from the certificate.
    #[serde(rename = "publicKey")]
    PublicKey,
    /// Lowercase hex SHA-256 digest of the DER-encoded certificate.
    #[default]
    #[serde(rename = "sha256")]
    Sha256,
}

impl PinningMode {
    /// The name used in configuration documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            PinningMode::Certificate => "certificate",
            PinningMode::PublicKey => "publicKey",
            PinningMode::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for PinningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PinningMode {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "certificate" => Ok(PinningMode::Certificate),
            "publicKey" => Ok(PinningMode::PublicKey),
            "sha256" => Ok(PinningMode::Sha256),
            other => Err(NetError::invalid_pin_config(format!(
                "unknown pinning mode '{}'",
                other
            ))),
        }
    }
}

fn default_reject_unauthorized() -> bool {
    true
}

/// Configuration applied by [`PinStore::configure`](super::pinning::PinStore::configure).
///
/// ```
/// use certpin::tls::{PinningConfig, PinningMode};
///
/// let config = PinningConfig::new(PinningMode::Sha256, ["ab12"])
///     .enabled_domains(["example.com"])
///     .reject_unauthorized(false);
/// assert_eq!(config.enabled_domains, vec!["example.com".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinningConfig {
    /// Pinning mode. Defaults to `sha256` when absent.
    #[serde(default)]
    pub mode: PinningMode,

    /// Raw pin strings: base64 DER for certificate and public key modes,
    /// hex digests for sha256 mode. `None` means the list was not supplied.
    #[serde(default, alias = "certs")]
    pub pins: Option<Vec<String>>,

    /// Hosts pinning applies to (exact or subdomain match). Empty = all hosts.
    #[serde(default)]
    pub enabled_domains: Vec<String>,

    /// Hostname policy for in-scope hosts.
    #[serde(default = "default_reject_unauthorized")]
    pub reject_unauthorized: bool,
}

impl Default for PinningConfig {
    fn default() -> Self {
        Self {
            mode: PinningMode::default(),
            pins: None,
            enabled_domains: Vec::new(),
            reject_unauthorized: default_reject_unauthorized(),
        }
    }
}

impl PinningConfig {
    /// Create a configuration for `mode` with the given pin strings.
    pub fn new<I, S>(mode: PinningMode, pins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mode,
            pins: Some(pins.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Restrict pinning to these domains and their subdomains.
    #[must_use]
    pub fn enabled_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enabled_domains = domains.into_iter().map(Into::into).collect();
        self
    }

    /// Set the `rejectUnauthorized` policy.
    #[must_use]
    pub fn reject_unauthorized(mut self, reject: bool) -> Self {
        self.reject_unauthorized = reject;
        self
    }

    /// Parse a configuration from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, NetError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize this configuration as JSON.
    pub fn to_json(&self) -> Result<String, NetError> {
        Ok(serde_json::to_string(self)?)
    }
}
