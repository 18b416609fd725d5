//! Provider factory.
//!
//! Picks the provider variant for the configured chain type. The connectors
//! default to the alloy and subxt clients and can be replaced, e.g. with
//! mocks.

use std::sync::Arc;

use crate::{
	models::{ChainType, SdkConfig},
	services::blockchain::{
		clients::{AlloyConnector, EvmConnector, SubstrateConnector, SubxtConnector},
		provider::ChainProvider,
		EvmProvider, SubstrateProvider,
	},
};

/// The provider a facade currently owns, tagged by chain type
#[derive(Clone)]
pub enum ActiveProvider {
	Evm(Arc<EvmProvider>),
	Substrate(Arc<SubstrateProvider>),
}

impl ActiveProvider {
	pub fn chain_type(&self) -> ChainType {
		match self {
			Self::Evm(_) => ChainType::EVM,
			Self::Substrate(_) => ChainType::Substrate,
		}
	}

	/// Capability view shared by both variants
	pub fn as_chain_provider(&self) -> &dyn ChainProvider {
		match self {
			Self::Evm(provider) => provider.as_ref(),
			Self::Substrate(provider) => provider.as_ref(),
		}
	}

	pub fn as_evm(&self) -> Option<&Arc<EvmProvider>> {
		match self {
			Self::Evm(provider) => Some(provider),
			Self::Substrate(_) => None,
		}
	}

	pub fn as_substrate(&self) -> Option<&Arc<SubstrateProvider>> {
		match self {
			Self::Substrate(provider) => Some(provider),
			Self::Evm(_) => None,
		}
	}
}

/// Creates providers from a configuration snapshot
#[derive(Clone)]
pub struct ProviderFactory {
	evm: Arc<dyn EvmConnector>,
	substrate: Arc<dyn SubstrateConnector>,
}

impl Default for ProviderFactory {
	fn default() -> Self {
		Self::new(Arc::new(AlloyConnector), Arc::new(SubxtConnector))
	}
}

impl ProviderFactory {
	pub fn new(evm: Arc<dyn EvmConnector>, substrate: Arc<dyn SubstrateConnector>) -> Self {
		Self { evm, substrate }
	}

	/// Builds an unconnected provider matching `config.chain_type`
	pub fn create(&self, config: &SdkConfig) -> ActiveProvider {
		let endpoint = config.endpoint.clone();
		let timeout = config.timeout_duration();
		match config.chain_type {
			ChainType::EVM => ActiveProvider::Evm(Arc::new(EvmProvider::new(
				endpoint,
				timeout,
				Arc::clone(&self.evm),
			))),
			ChainType::Substrate => ActiveProvider::Substrate(Arc::new(SubstrateProvider::new(
				endpoint,
				timeout,
				Arc::clone(&self.substrate),
			))),
		}
	}
}
