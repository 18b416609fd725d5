//! Core domain models for the SDK.
//!
//! - Chain types and known networks
//! - Balance and token data returned by providers
//! - Connection state and chain metadata exposed by the facade

mod balance;
mod chain;
mod connection;

pub use balance::{AccountBalance, TokenInfo};
pub use chain::{ChainType, Network};
pub use connection::{ChainMetadata, ConnectionInfo, ConnectionState, HealthStatus};
