//! Certificate helpers shared by pin decoding and chain matching.
//!
//! All parsing is delegated to BoringSSL. Input arriving from a peer is
//! attacker controlled, so every helper returns a `Result` and callers decide
//! whether a failure is fatal.

use crate::base::neterror::NetError;
use base64::Engine as _;
use boring::hash::{hash, MessageDigest};
use boring::x509::X509;
use std::fmt::Write;

/// Largest certificate handed to the X.509 parser.
pub const MAX_CERT_DER_LEN: usize = 64 * 1024;

/// Decode a standard base64 pin, ignoring embedded ASCII whitespace.
pub fn decode_base64(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = input
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    base64::engine::general_purpose::STANDARD.decode(compact)
}

/// Extract the DER-encoded SubjectPublicKeyInfo from a DER certificate.
pub fn public_key_der(cert_der: &[u8]) -> Result<Vec<u8>, NetError> {
    if cert_der.len() > MAX_CERT_DER_LEN {
        return Err(NetError::SslServerCertBadFormat);
    }

    let cert = X509::from_der(cert_der).map_err(|_| NetError::SslServerCertBadFormat)?;
    let pubkey = cert
        .public_key()
        .map_err(|_| NetError::SslServerCertBadFormat)?;
    pubkey
        .public_key_to_der()
        .map_err(|_| NetError::SslServerCertBadFormat)
}

/// Lowercase hex SHA-256 digest of `data`.
pub fn sha256_hex(data: &[u8]) -> Result<String, NetError> {
    let digest = hash(MessageDigest::sha256(), data).map_err(|_| NetError::SslProtocolError)?;

    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest.iter() {
        // Writing to a String cannot fail.
        let _ = write!(hex, "{:02x}", byte);
    }
    Ok(hex)
}
