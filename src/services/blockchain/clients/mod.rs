//! Backend client implementations.
//!
//! One trait per chain family describing what the provider needs from the
//! chain library, a connector trait that opens clients, and the real alloy
//! and subxt implementations.

mod evm;
mod substrate;

pub use evm::{AlloyClient, AlloyConnector, EvmClientTrait, EvmConnector};
pub use substrate::{SubstrateClientTrait, SubstrateConnector, SubxtClient, SubxtConnector};

/// Buffer of each client's signal channel
pub(crate) const SIGNAL_CAPACITY: usize = 16;

/// Transport state changes reported by a backend client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendSignal {
	Connected,
	Disconnected,
	Error(String),
}
