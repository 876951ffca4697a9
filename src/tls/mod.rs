//! TLS certificate pinning: configuration, pin store, validator and the
//! transport adapter.

pub mod cert;
pub mod config;
pub mod pinning;
pub mod trust;
pub mod validator;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::{PinningConfig, PinningMode};
pub use pinning::{PinConfig, PinReport, PinSet, PinStore};
pub use trust::{PinRejection, TrustAdapter};
pub use validator::{PinValidator, RejectReason, Verdict};
