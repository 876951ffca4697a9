use crate::tls::validator::RejectReason;
use thiserror::Error;

/// First code of the range used for pin configuration errors.
///
/// Chromium reserves everything above -1000, so custom codes start well below.
pub const PIN_ERROR_BASE: i32 = -10000;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum NetError {
    // TLS Errors
    #[error("SSL protocol error")]
    SslProtocolError,
    #[error("Certificate pinning failed: {0}")]
    CertPinningFailed(RejectReason),
    #[error("SSL server cert bad format")]
    SslServerCertBadFormat,

    // Pin Configuration Errors
    #[error("Missing certificates")]
    PinsMissing,
    #[error("Invalid pin at index {index}: {reason}")]
    InvalidPin { index: usize, reason: String },
    #[error("Invalid pinning configuration: {reason}")]
    InvalidPinConfig { reason: String },

    #[error("Unknown error: {0}")]
    Unknown(i32),
}

impl NetError {
    /// Create an error for a single malformed pin entry.
    pub fn invalid_pin(index: usize, reason: impl Into<String>) -> Self {
        NetError::InvalidPin {
            index,
            reason: reason.into(),
        }
    }

    /// Create an error for a configuration document that could not be read.
    pub fn invalid_pin_config(reason: impl Into<String>) -> Self {
        NetError::InvalidPinConfig {
            reason: reason.into(),
        }
    }

    /// Whether this error was produced while applying pin configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            NetError::PinsMissing | NetError::InvalidPin { .. } | NetError::InvalidPinConfig { .. }
        )
    }

    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::SslProtocolError => -107,
            NetError::CertPinningFailed(_) => -150,
            NetError::SslServerCertBadFormat => -167,

            NetError::PinsMissing => PIN_ERROR_BASE,
            NetError::InvalidPin { .. } => PIN_ERROR_BASE - 1,
            NetError::InvalidPinConfig { .. } => PIN_ERROR_BASE - 2,

            NetError::Unknown(code) => *code,
        }
    }
}

impl From<i32> for NetError {
    fn from(code: i32) -> Self {
        match code {
            -107 => NetError::SslProtocolError,
            -150 => NetError::CertPinningFailed(RejectReason::NoMatchingPin),
            -167 => NetError::SslServerCertBadFormat,
            PIN_ERROR_BASE => NetError::PinsMissing,
            _ => NetError::Unknown(code),
        }
    }
}

impl From<serde_json::Error> for NetError {
    fn from(err: serde_json::Error) -> Self {
        NetError::invalid_pin_config(err.to_string())
    }
}
