//! Blockchain providers and backend clients.
//!
//! - Address parsing and the EVM / Substrate account mapping
//! - Backend client traits with alloy (EVM) and subxt (Substrate)
//!   implementations
//! - The two provider variants and their shared capability trait
//! - Provider factory and the tagged active provider
//! - Minimal contract interfaces for EVM calls
//! - Error handling for provider operations

mod address;
mod clients;
mod contract;
mod error;
mod factory;
mod provider;
mod providers;

pub use address::{
	evm_to_substrate, parse_evm_address, parse_ss58_address, substrate_to_evm, ChainAddress,
};
pub use clients::{
	AlloyClient, AlloyConnector, BackendSignal, EvmClientTrait, EvmConnector,
	SubstrateClientTrait, SubstrateConnector, SubxtClient, SubxtConnector,
};
pub use contract::{ContractInterface, ERC20_SIGNATURES};
pub use error::ProviderError;
pub use factory::{ActiveProvider, ProviderFactory};
pub use provider::{ChainProvider, ProviderEvent};
pub use providers::{EvmProvider, SubstrateProvider};
