//! Pin matching and host scoping.
//!
//! Every check works on a single [`PinConfig`] snapshot so concurrent
//! reconfiguration cannot change the answer halfway through a chain.

use crate::base::neterror::NetError;
use crate::tls::cert;
use crate::tls::pinning::{PinConfig, PinSet, PinStore};
use std::fmt;

/// Why a chain was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The peer presented no certificates.
    EmptyChain,
    /// No certificate in the chain matched a configured pin.
    NoMatchingPin,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::EmptyChain => f.write_str("empty chain"),
            RejectReason::NoMatchingPin => f.write_str("no certificate in chain matches a pin"),
        }
    }
}

/// Result of a pin check. A rejection is an expected outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(RejectReason),
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }

    /// Map a rejection to [`NetError::CertPinningFailed`].
    pub fn into_result(self) -> Result<(), NetError> {
        match self {
            Verdict::Accept => Ok(()),
            Verdict::Reject(reason) => Err(NetError::CertPinningFailed(reason)),
        }
    }
}

/// Whether `host` is `domain` or one of its subdomains.
///
/// A single trailing dot on a fully qualified host is ignored.
fn host_matches(host: &str, domain: &str) -> bool {
    let host = host.strip_suffix('.').unwrap_or(host).as_bytes();
    let domain = domain.as_bytes();

    if host.len() == domain.len() {
        return host.eq_ignore_ascii_case(domain);
    }
    if host.len() <= domain.len() {
        return false;
    }

    // Only a whole label may precede the domain.
    let (prefix, suffix) = host.split_at(host.len() - domain.len());
    prefix.last() == Some(&b'.') && suffix.eq_ignore_ascii_case(domain)
}

/// Compare one peer certificate against the pins of the active mode.
///
/// Malformed peer input is a non-match, never an error.
fn certificate_matches(pins: &PinSet, der: &[u8], depth: usize) -> bool {
    if der.is_empty() {
        tracing::debug!(depth, "skipping empty certificate");
        return false;
    }

    match pins {
        PinSet::Certificate(certs) => certs.contains(der),
        PinSet::PublicKey(keys) => match cert::public_key_der(der) {
            Ok(spki) => keys.contains(&spki),
            Err(err) => {
                tracing::debug!(depth, error = %err, "cannot extract public key from peer certificate");
                false
            }
        },
        PinSet::Sha256(hashes) => match cert::sha256_hex(der) {
            Ok(digest) => hashes.contains(&digest),
            Err(err) => {
                tracing::debug!(depth, error = %err, "cannot hash peer certificate");
                false
            }
        },
    }
}

impl PinConfig {
    /// Check if pinning applies to `host`.
    ///
    /// With no enabled domains every host is in scope; otherwise the host must
    /// equal a domain or be a subdomain of it (`api.example.com` matches
    /// `example.com`, `evilexample.com` does not).
    pub fn is_in_scope(&self, host: &str) -> bool {
        let domains = self.enabled_domains();
        domains.is_empty() || domains.iter().any(|domain| host_matches(host, domain))
    }

    /// Hostname verification override.
    ///
    /// `true` accepts the host without further hostname checks; `false`
    /// leaves the transport's standard hostname verification in force. For
    /// in-scope hosts this is `!reject_unauthorized`.
    pub fn verify_hostname(&self, host: &str) -> bool {
        if !self.is_enabled() || !self.is_in_scope(host) {
            return true;
        }
        !self.reject_unauthorized()
    }

    /// Check a peer chain (DER certificates, leaf first) against the pins.
    ///
    /// Any certificate in the chain may match, so intermediates and roots can
    /// be pinned as well as leaves.
    pub fn check_chain<C: AsRef<[u8]>>(&self, chain: &[C]) -> Verdict {
        if !self.is_enabled() {
            return Verdict::Accept;
        }
        if chain.is_empty() {
            tracing::debug!("rejecting empty certificate chain");
            return Verdict::Reject(RejectReason::EmptyChain);
        }

        let pins = self.pins();
        if !pins.is_empty() {
            for (depth, der) in chain.iter().enumerate() {
                if certificate_matches(pins, der.as_ref(), depth) {
                    tracing::debug!(depth, mode = %self.mode(), "certificate pin matched");
                    return Verdict::Accept;
                }
            }
        }

        tracing::debug!(
            mode = %self.mode(),
            chain_len = chain.len(),
            pins = pins.len(),
            "no certificate in chain matches a pin"
        );
        Verdict::Reject(RejectReason::NoMatchingPin)
    }

    /// Session-level check: hosts outside the scope are not pinned.
    pub fn evaluate<C: AsRef<[u8]>>(&self, host: &str, chain: &[C]) -> Verdict {
        if !self.is_enabled() {
            return Verdict::Accept;
        }
        if !self.is_in_scope(host) {
            tracing::debug!(host = %host, "host outside pinning scope");
            return Verdict::Accept;
        }
        self.check_chain(chain)
    }
}

/// Validator bound to a [`PinStore`].
///
/// Each call reads one snapshot of the store.
#[derive(Debug, Clone, Default)]
pub struct PinValidator {
    store: PinStore,
}

impl PinValidator {
    pub fn new(store: PinStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &PinStore {
        &self.store
    }

    pub fn is_in_scope(&self, host: &str) -> bool {
        self.store.snapshot().is_in_scope(host)
    }

    pub fn verify_hostname(&self, host: &str) -> bool {
        self.store.snapshot().verify_hostname(host)
    }

    pub fn check_chain<C: AsRef<[u8]>>(&self, chain: &[C]) -> Verdict {
        self.store.snapshot().check_chain(chain)
    }

    pub fn evaluate<C: AsRef<[u8]>>(&self, host: &str, chain: &[C]) -> Verdict {
        self.store.snapshot().evaluate(host, chain)
    }
}
