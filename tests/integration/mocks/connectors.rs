//! Mock connectors plus helpers for wiring them into an SDK.

use async_trait::async_trait;
use mockall::mock;
use selendra_sdk::{
	services::blockchain::{
		EvmClientTrait, EvmConnector, ProviderFactory, SubstrateClientTrait, SubstrateConnector,
	},
	ChainType, SdkEvent, SdkOptions, SelendraSdk,
};
use std::sync::Arc;
use tokio::sync::broadcast;

use super::{MockEvmClient, MockSubstrateClient};

pub const EVM_ENDPOINT: &str = "http://127.0.0.1:8545";
pub const SUBSTRATE_ENDPOINT: &str = "ws://127.0.0.1:9944";

mock! {
	/// Mock EVM connector.
	pub EvmConnector {}

	#[async_trait]
	impl EvmConnector for EvmConnector {
		async fn connect(&self, endpoint: &str) -> Result<Arc<dyn EvmClientTrait>, anyhow::Error>;
	}
}

mock! {
	/// Mock Substrate connector.
	pub SubstrateConnector {}

	#[async_trait]
	impl SubstrateConnector for SubstrateConnector {
		async fn connect(
			&self,
			endpoint: &str,
		) -> Result<Arc<dyn SubstrateClientTrait>, anyhow::Error>;
	}
}

/// Connector whose connection attempts never complete
pub struct PendingConnector;

#[async_trait]
impl EvmConnector for PendingConnector {
	async fn connect(&self, _endpoint: &str) -> Result<Arc<dyn EvmClientTrait>, anyhow::Error> {
		std::future::pending().await
	}
}

#[async_trait]
impl SubstrateConnector for PendingConnector {
	async fn connect(
		&self,
		_endpoint: &str,
	) -> Result<Arc<dyn SubstrateClientTrait>, anyhow::Error> {
		std::future::pending().await
	}
}

/// An EVM connector that hands out `client` on its only call
pub fn evm_connector_once(client: MockEvmClient) -> MockEvmConnector {
	let mut connector = MockEvmConnector::new();
	connector
		.expect_connect()
		.times(1)
		.return_once(move |_| Ok(Arc::new(client) as Arc<dyn EvmClientTrait>));
	connector
}

/// A Substrate connector that hands out `client` on its only call
pub fn substrate_connector_once(client: MockSubstrateClient) -> MockSubstrateConnector {
	let mut connector = MockSubstrateConnector::new();
	connector
		.expect_connect()
		.times(1)
		.return_once(move |_| Ok(Arc::new(client) as Arc<dyn SubstrateClientTrait>));
	connector
}

pub fn evm_factory(connector: impl EvmConnector + 'static) -> ProviderFactory {
	ProviderFactory::new(Arc::new(connector), Arc::new(MockSubstrateConnector::new()))
}

pub fn substrate_factory(connector: impl SubstrateConnector + 'static) -> ProviderFactory {
	ProviderFactory::new(Arc::new(MockEvmConnector::new()), Arc::new(connector))
}

/// EVM options against a local node, without automatic reconnects
pub fn evm_options() -> SdkOptions {
	SdkOptions::default()
		.with_chain_type(ChainType::EVM)
		.with_endpoint(EVM_ENDPOINT)
		.with_auto_reconnect(false)
}

/// Substrate options against a local node, without automatic reconnects
pub fn substrate_options() -> SdkOptions {
	SdkOptions::default()
		.with_chain_type(ChainType::Substrate)
		.with_endpoint(SUBSTRATE_ENDPOINT)
		.with_auto_reconnect(false)
}

/// A connected EVM SDK backed by `client`
pub async fn connected_evm_sdk(client: MockEvmClient) -> SelendraSdk {
	let sdk = SelendraSdk::with_factory(evm_options(), evm_factory(evm_connector_once(client)))
		.expect("valid options");
	sdk.connect().await.expect("mock connection succeeds");
	sdk
}

/// A connected Substrate SDK backed by `client`
pub async fn connected_substrate_sdk(client: MockSubstrateClient) -> SelendraSdk {
	let sdk = SelendraSdk::with_factory(
		substrate_options(),
		substrate_factory(substrate_connector_once(client)),
	)
	.expect("valid options");
	sdk.connect().await.expect("mock connection succeeds");
	sdk
}

/// Everything buffered on `events` so far
pub fn drain(events: &mut broadcast::Receiver<SdkEvent>) -> Vec<SdkEvent> {
	let mut drained = Vec::new();
	while let Ok(event) = events.try_recv() {
		drained.push(event);
	}
	drained
}
