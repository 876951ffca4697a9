//! Base types and error handling.
//!
//! Provides foundational types mirroring Chromium's `net/base/`:
//! - [`NetError`](neterror::NetError): error codes matching `net_error_list.h`,
//!   extended with a custom range for pin configuration failures

pub mod neterror;
