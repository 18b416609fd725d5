//! Domain models and data structures.
//!
//! - `config`: Options, merged configuration and their validation
//! - `core`: Chain types, networks, balances and connection state

mod config;
mod core;

pub use config::{validate_options, ConfigError, ConfigLoader, SdkConfig, SdkOptions};

pub use core::{
	AccountBalance, ChainMetadata, ChainType, ConnectionInfo, ConnectionState, HealthStatus, Network,
	TokenInfo,
};
