//! # certpin
//!
//! TLS certificate pinning for Rust, built on BoringSSL.
//!
//! `certpin` decides whether a peer's certificate chain matches a configured
//! set of pins and whether pinning applies to a given host. It plugs into a
//! TLS handshake as a verify callback and never performs I/O of its own.
//!
//! ## Features
//!
//! - **Three pinning modes**: full certificate bytes, SubjectPublicKeyInfo, or
//!   SHA-256 certificate fingerprints
//! - **Domain scope**: restrict pinning to domains and their subdomains
//! - **Atomic reconfiguration**: pins, mode and scope are swapped as one
//!   snapshot, safe under concurrent handshakes
//! - **Kill switch**: disable enforcement without discarding pins
//! - **BoringSSL binding**: verify callbacks for `SslConnector` and per-connection
//!   configuration, plus an async `connect` helper over `tokio-boring`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use certpin::tls::{PinStore, PinningConfig, PinningMode, TrustAdapter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), certpin::base::neterror::NetError> {
//!     let store = PinStore::global();
//!     store.configure(
//!         &PinningConfig::new(PinningMode::Sha256, ["3f1a...c9"])
//!             .enabled_domains(["example.com"]),
//!     )?;
//!
//!     let adapter = TrustAdapter::new(store.clone());
//!     let connector = boring::ssl::SslConnector::builder(boring::ssl::SslMethod::tls())
//!         .unwrap()
//!         .build();
//!     let tcp = tokio::net::TcpStream::connect("api.example.com:443").await.unwrap();
//!     let tls = adapter.connect(&connector, "api.example.com", tcp).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error definitions
//! - [`tls`] - Pin configuration, store, validator and transport adapter
//!
//! ## Security
//!
//! - Every ambiguous outcome resolves to rejection; the only unconditional
//!   accept paths are "pinning disabled" and "host out of scope"
//! - Malformed peer certificates are treated as non-matching, never as errors
//! - An empty chain is always rejected

pub mod base;
pub mod tls;
