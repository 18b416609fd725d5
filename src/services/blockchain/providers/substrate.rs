//! Substrate provider.

use async_trait::async_trait;
use std::{sync::Arc, time::Duration};
use tracing::instrument;

use crate::{
	models::{AccountBalance, ChainMetadata, ChainType},
	services::{
		blockchain::{
			address::parse_ss58_address,
			clients::{SubstrateClientTrait, SubstrateConnector},
			provider::{ChainProvider, ConnectionSlot},
			ProviderError, ProviderEvent,
		},
		events::EventEmitter,
	},
};

/// Provider for Substrate chains
pub struct SubstrateProvider {
	endpoint: Option<String>,
	timeout: Duration,
	connector: Arc<dyn SubstrateConnector>,
	slot: Arc<ConnectionSlot<dyn SubstrateClientTrait>>,
}

impl SubstrateProvider {
	pub fn new(
		endpoint: Option<String>,
		timeout: Duration,
		connector: Arc<dyn SubstrateConnector>,
	) -> Self {
		Self {
			endpoint,
			timeout,
			connector,
			slot: ConnectionSlot::new(),
		}
	}

	/// The live client, or `None` once disconnected
	pub fn client(&self) -> Option<Arc<dyn SubstrateClientTrait>> {
		self.slot.client()
	}

	/// Free, reserved and frozen balance of an account
	#[instrument(skip(self))]
	pub async fn get_account_balance(&self, address: &str) -> Result<AccountBalance, ProviderError> {
		let account = parse_ss58_address(address)?;
		let client = self.slot.client().ok_or(ProviderError::NotConnected)?;
		client.account_balance(account).await.map_err(|e| {
			ProviderError::operation_error(format!("Failed to get Substrate balance: {:#}", e))
		})
	}
}

#[async_trait]
impl ChainProvider for SubstrateProvider {
	fn chain_type(&self) -> ChainType {
		ChainType::Substrate
	}

	fn endpoint(&self) -> Option<&str> {
		self.endpoint.as_deref()
	}

	/// Opens the transport and queries chain, node name and node version; the
	/// connection only counts once those queries succeed
	#[instrument(skip(self), fields(endpoint = ?self.endpoint))]
	async fn connect(&self) -> Result<(), ProviderError> {
		if self.slot.is_connected() {
			return Ok(());
		}

		let endpoint = self
			.endpoint
			.as_deref()
			.filter(|endpoint| !endpoint.trim().is_empty())
			.ok_or_else(ProviderError::missing_endpoint)?;

		let attempt = async {
			let client = self.connector.connect(endpoint).await?;
			let (chain, node_name, node_version) = tokio::try_join!(
				client.system_chain(),
				client.system_name(),
				client.system_version()
			)?;
			Ok::<_, anyhow::Error>((
				client,
				ChainMetadata::Substrate {
					chain,
					node_name,
					node_version,
				},
			))
		};

		let (client, metadata) = match tokio::time::timeout(self.timeout, attempt).await {
			Ok(Ok(connected)) => connected,
			Ok(Err(e)) => {
				return Err(ProviderError::connection_error(format!(
					"Failed to connect to Substrate chain: {:#}",
					e
				)));
			}
			Err(_) => {
				return Err(ProviderError::connection_timeout(format!(
					"Failed to connect to Substrate chain: no response from {} within {}ms",
					endpoint,
					self.timeout.as_millis()
				)));
			}
		};

		if let ChainMetadata::Substrate {
			chain,
			node_name,
			node_version,
		} = &metadata
		{
			tracing::info!(endpoint, %chain, %node_name, %node_version, "connected to Substrate chain");
		}

		let signals = client.signals();
		self.slot.attach(client, metadata, signals);
		Ok(())
	}

	async fn ping(&self) -> Result<(), ProviderError> {
		let client = self.slot.client().ok_or(ProviderError::NotConnected)?;
		client.system_chain().await.map(|_| ()).map_err(|e| {
			ProviderError::operation_error(format!("Substrate node did not answer: {:#}", e))
		})
	}

	#[instrument(skip(self))]
	async fn disconnect(&self) -> Result<(), ProviderError> {
		let Some(client) = self.slot.detach() else {
			return Ok(());
		};

		if let Err(e) = client.close().await {
			let error = ProviderError::connection_error(format!(
				"Failed to disconnect from Substrate chain: {:#}",
				e
			));
			self.slot.events().emit(ProviderEvent::Error(error.clone()));
			return Err(error);
		}

		self.slot.events().emit(ProviderEvent::Disconnected);
		tracing::info!("disconnected from Substrate chain");
		Ok(())
	}

	fn is_connected(&self) -> bool {
		self.slot.is_connected()
	}

	fn metadata(&self) -> Option<ChainMetadata> {
		self.slot.metadata()
	}

	fn events(&self) -> &EventEmitter<ProviderError> {
		self.slot.events()
	}
}
