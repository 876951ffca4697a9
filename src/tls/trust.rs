//! Transport seam for certificate pinning.
//!
//! [`TrustAdapter`] exposes the three callbacks a TLS stack invokes during a
//! handshake (client trust, server trust, hostname verification) and binds
//! them to BoringSSL's verify callback.
//!
//! The BoringSSL binding augments the library's own chain verification: a
//! chain BoringSSL rejects stays rejected, and an accepted chain must also
//! satisfy the pins.

use crate::base::neterror::NetError;
use crate::tls::pinning::PinStore;
use crate::tls::validator::{PinValidator, RejectReason, Verdict};
use boring::ssl::{ConnectConfiguration, SslConnector, SslConnectorBuilder, SslVerifyMode};
use boring::x509::X509StoreContextRef;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_boring::SslStream;

/// Pin rejection recorded by a per-connection verify callback.
#[derive(Debug, Clone, Default)]
pub struct PinRejection(Arc<Mutex<Option<RejectReason>>>);

impl PinRejection {
    /// The reason the handshake was rejected by pinning, if it was.
    pub fn get(&self) -> Option<RejectReason> {
        *self.0.lock()
    }

    fn set(&self, reason: RejectReason) {
        *self.0.lock() = Some(reason);
    }
}

/// DER encodings of the chain being verified, leaf first.
fn peer_chain(ctx: &X509StoreContextRef) -> Vec<Vec<u8>> {
    ctx.chain()
        .map(|stack| stack.iter().filter_map(|cert| cert.to_der().ok()).collect())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Default)]
pub struct TrustAdapter {
    validator: PinValidator,
}

impl TrustAdapter {
    pub fn new(store: PinStore) -> Self {
        Self {
            validator: PinValidator::new(store),
        }
    }

    /// Adapter over the process-wide store.
    pub fn global() -> Self {
        Self::new(PinStore::global().clone())
    }

    pub fn validator(&self) -> &PinValidator {
        &self.validator
    }

    /// Client certificates are not pinned.
    pub fn check_client_trusted<C: AsRef<[u8]>>(&self, _chain: &[C]) -> Result<(), NetError> {
        Ok(())
    }

    /// Server trust decision for a peer chain (DER, leaf first).
    ///
    /// A rejection is returned as [`NetError::CertPinningFailed`] and must
    /// abort the handshake.
    pub fn check_server_trusted<C: AsRef<[u8]>>(&self, chain: &[C]) -> Result<(), NetError> {
        let verdict = self.validator.check_chain(chain);
        if let Verdict::Reject(reason) = verdict {
            tracing::warn!(reason = %reason, "server certificate chain rejected by pinning");
        }
        verdict.into_result()
    }

    /// Hostname verification override; see [`PinConfig::verify_hostname`](crate::tls::PinConfig::verify_hostname).
    pub fn verify_hostname(&self, host: &str) -> bool {
        self.validator.verify_hostname(host)
    }

    /// Enforce the store's pins on every connection made through `builder`.
    ///
    /// The store is read at each handshake, so later reconfiguration applies
    /// to new connections. No hostname is known here, so domain scope is not
    /// applied; use [`configure_connection`](Self::configure_connection) for
    /// scoped pinning.
    ///
    /// Pins are checked in addition to BoringSSL's own chain verification,
    /// against the chain BoringSSL built from its trust store rather than
    /// the chain the peer sent. A pinned certificate that does not chain to
    /// a trusted root, such as a self-signed leaf missing from the store, is
    /// still rejected.
    pub fn install(&self, builder: &mut SslConnectorBuilder) {
        let store = self.validator.store().clone();
        builder.set_verify_callback(SslVerifyMode::PEER, move |preverify_ok, ctx| {
            if !preverify_ok || ctx.error_depth() != 0 {
                return preverify_ok;
            }
            let verdict = store.snapshot().check_chain(&peer_chain(ctx));
            if let Verdict::Reject(reason) = verdict {
                tracing::warn!(reason = %reason, "server certificate chain rejected by pinning");
            }
            verdict.is_accept()
        });
    }

    /// Apply pinning to a single connection to `host`.
    ///
    /// Uses one snapshot of the store for both the hostname policy and the
    /// chain check. When pinning is disabled or `host` is outside the pinned
    /// domains the configuration is left untouched, so BoringSSL's hostname
    /// verification stays in force. It is only switched off for in-scope
    /// hosts when `reject_unauthorized` is false. Chain verification follows
    /// [`install`](Self::install).
    pub fn configure_connection(&self, config: &mut ConnectConfiguration, host: &str) -> PinRejection {
        let rejection = PinRejection::default();
        let snapshot = self.validator.store().snapshot();
        if !snapshot.is_enabled() || !snapshot.is_in_scope(host) {
            return rejection;
        }

        if !snapshot.reject_unauthorized() {
            config.set_verify_hostname(false);
        }

        let host = host.to_string();
        let slot = rejection.clone();
        config.set_verify_callback(SslVerifyMode::PEER, move |preverify_ok, ctx| {
            if !preverify_ok || ctx.error_depth() != 0 {
                return preverify_ok;
            }
            match snapshot.check_chain(&peer_chain(ctx)) {
                Verdict::Accept => true,
                Verdict::Reject(reason) => {
                    tracing::warn!(host = %host, reason = %reason, "server certificate chain rejected by pinning");
                    slot.set(reason);
                    false
                }
            }
        });

        rejection
    }

    /// Perform a TLS handshake to `host` over `stream` with pinning applied.
    pub async fn connect<S>(
        &self,
        connector: &SslConnector,
        host: &str,
        stream: S,
    ) -> Result<SslStream<S>, NetError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut config = connector
            .configure()
            .map_err(|_| NetError::SslProtocolError)?;
        let rejection = self.configure_connection(&mut config, host);

        tokio_boring::connect(config, host, stream)
            .await
            .map_err(|_| match rejection.get() {
                Some(reason) => NetError::CertPinningFailed(reason),
                None => {
                    tracing::debug!(host = %host, "TLS handshake failed");
                    NetError::SslProtocolError
                }
            })
    }
}
