//! Utility modules for common functionality.
//!
//! - backoff: Linear reconnect policy used by the facade
//! - constants: Default endpoints and configuration values
//! - logging: Logging setup helpers
//! - units: Smallest-unit / decimal conversions

mod backoff;

pub mod constants;
pub mod logging;
pub mod units;

pub use backoff::ReconnectPolicy;
pub use constants::*;
