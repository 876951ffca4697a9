//! Certificate pinning store for MITM prevention.
//!
//! Holds the active pin set together with its scope and policy. The whole
//! configuration lives in one immutable [`PinConfig`] snapshot; every update
//! builds a new snapshot and swaps it in, so a handshake never observes new
//! pins paired with an old mode or scope.

use crate::base::neterror::NetError;
use crate::tls::cert;
use crate::tls::config::{PinningConfig, PinningMode};
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

/// The pins of the active mode.
///
/// The variant is the mode: pins decoded for one mode can never be consulted
/// under another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinSet {
    /// DER-encoded certificates.
    Certificate(HashSet<Vec<u8>>),
    /// DER-encoded SubjectPublicKeyInfo structures.
    PublicKey(HashSet<Vec<u8>>),
    /// Lowercase hex SHA-256 digests of DER certificates.
    Sha256(HashSet<String>),
}

impl PinSet {
    /// An empty set for `mode`.
    pub fn empty(mode: PinningMode) -> Self {
        match mode {
            PinningMode::Certificate => PinSet::Certificate(HashSet::new()),
            PinningMode::PublicKey => PinSet::PublicKey(HashSet::new()),
            PinningMode::Sha256 => PinSet::Sha256(HashSet::new()),
        }
    }

    pub fn mode(&self) -> PinningMode {
        match self {
            PinSet::Certificate(_) => PinningMode::Certificate,
            PinSet::PublicKey(_) => PinningMode::PublicKey,
            PinSet::Sha256(_) => PinningMode::Sha256,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PinSet::Certificate(pins) | PinSet::PublicKey(pins) => pins.len(),
            PinSet::Sha256(pins) => pins.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode raw pin strings for `mode`.
    ///
    /// Malformed entries do not abort the batch: each one is skipped and
    /// returned as a [`NetError::InvalidPin`].
    pub fn decode<S: AsRef<str>>(mode: PinningMode, raw_pins: &[S]) -> (Self, Vec<NetError>) {
        let mut set = Self::empty(mode);
        let mut skipped = Vec::new();

        for (index, raw) in raw_pins.iter().enumerate() {
            let raw = raw.as_ref();
            let result = match &mut set {
                PinSet::Certificate(certs) => decode_der(index, raw).map(|der| {
                    certs.insert(der);
                }),
                PinSet::PublicKey(keys) => decode_der(index, raw).and_then(|der| {
                    let spki = cert::public_key_der(&der)
                        .map_err(|_| NetError::invalid_pin(index, "not a DER certificate"))?;
                    keys.insert(spki);
                    Ok(())
                }),
                PinSet::Sha256(hashes) => {
                    let normalized = raw.trim().to_ascii_lowercase();
                    if normalized.is_empty() {
                        Err(NetError::invalid_pin(index, "empty hash"))
                    } else {
                        hashes.insert(normalized);
                        Ok(())
                    }
                }
            };

            if let Err(err) = result {
                tracing::warn!(mode = %mode, error = %err, "skipping malformed pin");
                skipped.push(err);
            }
        }

        (set, skipped)
    }
}

fn decode_der(index: usize, raw: &str) -> Result<Vec<u8>, NetError> {
    let der = cert::decode_base64(raw)
        .map_err(|e| NetError::invalid_pin(index, format!("invalid base64: {}", e)))?;
    if der.is_empty() {
        return Err(NetError::invalid_pin(index, "empty pin"));
    }
    Ok(der)
}

/// Immutable snapshot of the pinning configuration.
#[derive(Debug, Clone)]
pub struct PinConfig {
    pins: Arc<PinSet>,
    enabled_domains: Arc<[String]>,
    reject_unauthorized: bool,
    enabled: bool,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            pins: Arc::new(PinSet::empty(PinningMode::default())),
            enabled_domains: Arc::from(Vec::new()),
            reject_unauthorized: true,
            enabled: false,
        }
    }
}

impl PinConfig {
    pub fn pins(&self) -> &PinSet {
        &self.pins
    }

    pub fn mode(&self) -> PinningMode {
        self.pins.mode()
    }

    /// Lowercased domains pinning is restricted to. Empty = every host.
    pub fn enabled_domains(&self) -> &[String] {
        &self.enabled_domains
    }

    pub fn reject_unauthorized(&self) -> bool {
        self.reject_unauthorized
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Outcome of applying a pin list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinReport {
    /// Mode the pins were decoded for.
    pub mode: PinningMode,
    /// Number of distinct pins now active.
    pub active: usize,
    /// Entries that could not be decoded.
    pub skipped: Vec<NetError>,
}

impl PinReport {
    fn new(pins: &PinSet, skipped: Vec<NetError>) -> Self {
        Self {
            mode: pins.mode(),
            active: pins.len(),
            skipped,
        }
    }
}

/// Thread-safe store for the pinning configuration.
///
/// Cloning is cheap and every clone shares the same configuration.
#[derive(Clone)]
pub struct PinStore {
    config: Arc<RwLock<Arc<PinConfig>>>,
}

impl Default for PinStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PinStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinStore")
            .field("config", &self.snapshot())
            .finish()
    }
}

impl PinStore {
    /// Create a new, disabled store with no pins.
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(Arc::new(PinConfig::default()))),
        }
    }

    /// The process-wide store.
    pub fn global() -> &'static PinStore {
        static GLOBAL: LazyLock<PinStore> = LazyLock::new(PinStore::new);
        &GLOBAL
    }

    /// Replace the whole configuration and enable pinning.
    ///
    /// Fails with [`NetError::PinsMissing`] when no pins are supplied; the
    /// store is left untouched in that case. Individually malformed pins are
    /// skipped and listed in the returned report. A configuration whose pins
    /// were all skipped is still applied and rejects every in-scope chain.
    pub fn configure(&self, config: &PinningConfig) -> Result<PinReport, NetError> {
        let raw_pins = match config.pins.as_deref() {
            Some(pins) if !pins.is_empty() => pins,
            _ => {
                tracing::warn!(mode = %config.mode, "pinning configuration has no pins");
                return Err(NetError::PinsMissing);
            }
        };

        let (pins, skipped) = PinSet::decode(config.mode, raw_pins);
        let report = PinReport::new(&pins, skipped);

        let enabled_domains: Vec<String> = config
            .enabled_domains
            .iter()
            .map(|domain| domain.trim().to_ascii_lowercase())
            .filter(|domain| !domain.is_empty())
            .collect();
        let domain_count = enabled_domains.len();

        let next = PinConfig {
            pins: Arc::new(pins),
            enabled_domains: Arc::from(enabled_domains),
            reject_unauthorized: config.reject_unauthorized,
            enabled: true,
        };
        *self.config.write() = Arc::new(next);

        tracing::info!(
            mode = %report.mode,
            active = report.active,
            skipped = report.skipped.len(),
            domains = domain_count,
            reject_unauthorized = config.reject_unauthorized,
            "certificate pinning configured"
        );
        if report.active == 0 {
            tracing::warn!(mode = %report.mode, "no usable pins, in-scope connections will be rejected");
        }

        Ok(report)
    }

    /// Replace the pins, decoding them for the current mode.
    ///
    /// Mode, scope, policy and the enabled flag are kept.
    pub fn replace_pins<S: AsRef<str>>(&self, raw_pins: &[S]) -> Result<PinReport, NetError> {
        if raw_pins.is_empty() {
            tracing::warn!("pin replacement has no pins");
            return Err(NetError::PinsMissing);
        }

        // Excludes other writers while decoding; readers keep running.
        let guard = self.config.upgradable_read();
        let current: &PinConfig = &guard;

        let (pins, skipped) = PinSet::decode(current.mode(), raw_pins);
        let report = PinReport::new(&pins, skipped);
        let next = PinConfig {
            pins: Arc::new(pins),
            ..current.clone()
        };

        let mut guard = RwLockUpgradableReadGuard::upgrade(guard);
        *guard = Arc::new(next);
        drop(guard);

        tracing::info!(
            mode = %report.mode,
            active = report.active,
            skipped = report.skipped.len(),
            "certificate pins replaced"
        );
        if report.active == 0 {
            tracing::warn!(mode = %report.mode, "no usable pins, in-scope connections will be rejected");
        }

        Ok(report)
    }

    /// Toggle the kill switch without touching pins.
    pub fn set_enabled(&self, enabled: bool) {
        let mut guard = self.config.write();
        if guard.enabled == enabled {
            return;
        }

        let mut next = PinConfig::clone(&guard);
        next.enabled = enabled;
        *guard = Arc::new(next);
        drop(guard);

        tracing::info!(enabled, "certificate pinning toggled");
    }

    pub fn is_enabled(&self) -> bool {
        self.config.read().enabled
    }

    pub fn mode(&self) -> PinningMode {
        self.config.read().mode()
    }

    /// The current configuration. Stays consistent however the store changes.
    pub fn snapshot(&self) -> Arc<PinConfig> {
        Arc::clone(&*self.config.read())
    }

    /// Number of active pins.
    pub fn len(&self) -> usize {
        self.config.read().pins.len()
    }

    /// Check if no pins are active.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
