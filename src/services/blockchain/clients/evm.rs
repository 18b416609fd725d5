//! EVM backend client.
//!
//! [`EvmClientTrait`] is the surface the EVM provider needs from the chain
//! library; [`AlloyClient`] implements it over an alloy provider.

use alloy::{
	network::EthereumWallet,
	primitives::{Address, Bytes, B256, U256},
	providers::{DynProvider, Provider, ProviderBuilder},
	rpc::types::TransactionRequest,
	signers::local::PrivateKeySigner,
	transports::{RpcError, TransportErrorKind, TransportResult},
};
use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::instrument;

use super::{BackendSignal, SIGNAL_CAPACITY};

/// Operations the EVM provider delegates to the backend library
#[async_trait]
pub trait EvmClientTrait: Send + Sync {
	/// `net_version` of the node
	async fn network_version(&self) -> Result<String, anyhow::Error>;

	async fn chain_id(&self) -> Result<u64, anyhow::Error>;

	/// Native balance in wei
	async fn get_balance(&self, address: Address) -> Result<U256, anyhow::Error>;

	/// Number of transactions sent from `address`
	async fn nonce(&self, address: Address) -> Result<u64, anyhow::Error>;

	/// Read-only `eth_call`
	async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, anyhow::Error>;

	async fn estimate_gas(
		&self,
		from: Option<Address>,
		to: Address,
		value: U256,
		input: Bytes,
	) -> Result<u64, anyhow::Error>;

	/// Signs and submits a transaction, then waits for its receipt
	async fn send_transaction(
		&self,
		signer: PrivateKeySigner,
		to: Address,
		value: U256,
		input: Bytes,
	) -> Result<B256, anyhow::Error>;

	async fn close(&self) -> Result<(), anyhow::Error>;

	/// Transport level signals (connected, disconnected, error)
	fn signals(&self) -> broadcast::Receiver<BackendSignal>;
}

/// Opens EVM clients; swapped out in tests
#[async_trait]
pub trait EvmConnector: Send + Sync {
	async fn connect(&self, endpoint: &str) -> Result<Arc<dyn EvmClientTrait>, anyhow::Error>;
}

/// Connector producing [`AlloyClient`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct AlloyConnector;

#[async_trait]
impl EvmConnector for AlloyConnector {
	async fn connect(&self, endpoint: &str) -> Result<Arc<dyn EvmClientTrait>, anyhow::Error> {
		let client = AlloyClient::connect(endpoint).await?;
		Ok(Arc::new(client))
	}
}

/// EVM client backed by an alloy provider over http(s) or ws(s)
#[derive(Clone)]
pub struct AlloyClient {
	endpoint: String,
	provider: DynProvider,
	signals: broadcast::Sender<BackendSignal>,
}

impl AlloyClient {
	/// Opens a provider for `endpoint`; the transport is picked from the
	/// URL scheme
	pub async fn connect(endpoint: &str) -> Result<Self, anyhow::Error> {
		let provider = ProviderBuilder::new()
			.connect(endpoint)
			.await
			.with_context(|| format!("Failed to open EVM transport to {}", endpoint))?
			.erased();

		let (signals, _) = broadcast::channel(SIGNAL_CAPACITY);
		let _ = signals.send(BackendSignal::Connected);

		Ok(Self {
			endpoint: endpoint.to_string(),
			provider,
			signals,
		})
	}

	/// Turns a lost backend into a `Disconnected` signal before handing the
	/// result back
	fn observe<T>(&self, result: TransportResult<T>) -> TransportResult<T> {
		if let Err(RpcError::Transport(kind)) = &result {
			let signal = match kind {
				TransportErrorKind::BackendGone => BackendSignal::Disconnected,
				other => BackendSignal::Error(other.to_string()),
			};
			let _ = self.signals.send(signal);
		}
		result
	}
}

#[async_trait]
impl EvmClientTrait for AlloyClient {
	#[instrument(skip(self))]
	async fn network_version(&self) -> Result<String, anyhow::Error> {
		let version = self
			.observe(self.provider.get_net_version().await)
			.context("Failed to get network version")?;
		Ok(version.to_string())
	}

	#[instrument(skip(self))]
	async fn chain_id(&self) -> Result<u64, anyhow::Error> {
		self.observe(self.provider.get_chain_id().await)
			.context("Failed to get chain id")
	}

	#[instrument(skip(self))]
	async fn get_balance(&self, address: Address) -> Result<U256, anyhow::Error> {
		self.observe(self.provider.get_balance(address).await)
			.with_context(|| format!("Failed to get balance of {}", address))
	}

	#[instrument(skip(self))]
	async fn nonce(&self, address: Address) -> Result<u64, anyhow::Error> {
		self.observe(self.provider.get_transaction_count(address).await)
			.with_context(|| format!("Failed to get nonce of {}", address))
	}

	#[instrument(skip(self, input))]
	async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, anyhow::Error> {
		let tx = TransactionRequest::default().to(to).input(input.into());
		self.observe(self.provider.call(tx).await)
			.with_context(|| format!("eth_call to {} failed", to))
	}

	#[instrument(skip(self, input))]
	async fn estimate_gas(
		&self,
		from: Option<Address>,
		to: Address,
		value: U256,
		input: Bytes,
	) -> Result<u64, anyhow::Error> {
		let mut tx = TransactionRequest::default()
			.to(to)
			.value(value)
			.input(input.into());
		if let Some(from) = from {
			tx = tx.from(from);
		}
		self.observe(self.provider.estimate_gas(tx).await)
			.context("Failed to estimate gas")
	}

	#[instrument(skip(self, signer, input))]
	async fn send_transaction(
		&self,
		signer: PrivateKeySigner,
		to: Address,
		value: U256,
		input: Bytes,
	) -> Result<B256, anyhow::Error> {
		let from = signer.address();
		let provider = ProviderBuilder::new()
			.wallet(EthereumWallet::from(signer))
			.connect(&self.endpoint)
			.await
			.context("Failed to open signing provider")?;

		let tx = TransactionRequest::default()
			.from(from)
			.to(to)
			.value(value)
			.input(input.into());

		let pending = self
			.observe(provider.send_transaction(tx).await)
			.context("Failed to submit transaction")?;
		let tx_hash = *pending.tx_hash();
		tracing::debug!(%tx_hash, "transaction submitted, waiting for receipt");

		let receipt = pending
			.get_receipt()
			.await
			.with_context(|| format!("Failed to get receipt for {}", tx_hash))?;
		if !receipt.status() {
			anyhow::bail!("Transaction {} reverted", tx_hash);
		}

		Ok(receipt.transaction_hash)
	}

	async fn close(&self) -> Result<(), anyhow::Error> {
		// The transport shuts down once the last provider handle is dropped
		tracing::debug!(endpoint = %self.endpoint, "closing EVM client");
		Ok(())
	}

	fn signals(&self) -> broadcast::Receiver<BackendSignal> {
		self.signals.subscribe()
	}
}
