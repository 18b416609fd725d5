//! Substrate backend client.
//!
//! [`SubstrateClientTrait`] is the surface the Substrate provider needs from
//! the chain library; [`SubxtClient`] implements it with subxt.

use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;
use subxt::{
	backend::{legacy::LegacyRpcMethods, rpc::RpcClient},
	dynamic::Value,
	ext::scale_value::At,
	utils::AccountId32,
	OnlineClient, SubstrateConfig,
};
use tokio::sync::broadcast;
use tracing::instrument;
use url::Url;

use crate::models::AccountBalance;

use super::{BackendSignal, SIGNAL_CAPACITY};

/// Operations the Substrate provider delegates to the backend library
#[async_trait]
pub trait SubstrateClientTrait: Send + Sync {
	/// `system_chain`
	async fn system_chain(&self) -> Result<String, anyhow::Error>;

	/// `system_name`
	async fn system_name(&self) -> Result<String, anyhow::Error>;

	/// `system_version`
	async fn system_version(&self) -> Result<String, anyhow::Error>;

	/// `System.Account` data at the latest block; an unknown account has a
	/// zero balance
	async fn account_balance(&self, account: AccountId32) -> Result<AccountBalance, anyhow::Error>;

	async fn close(&self) -> Result<(), anyhow::Error>;

	/// Transport level signals (connected, disconnected, error)
	fn signals(&self) -> broadcast::Receiver<BackendSignal>;
}

/// Opens Substrate clients; swapped out in tests
#[async_trait]
pub trait SubstrateConnector: Send + Sync {
	async fn connect(
		&self,
		endpoint: &str,
	) -> Result<Arc<dyn SubstrateClientTrait>, anyhow::Error>;
}

/// Connector producing [`SubxtClient`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct SubxtConnector;

#[async_trait]
impl SubstrateConnector for SubxtConnector {
	async fn connect(
		&self,
		endpoint: &str,
	) -> Result<Arc<dyn SubstrateClientTrait>, anyhow::Error> {
		let client = SubxtClient::connect(endpoint).await?;
		Ok(Arc::new(client))
	}
}

/// Substrate client over a single subxt RPC connection
#[derive(Clone)]
pub struct SubxtClient {
	rpc: LegacyRpcMethods<SubstrateConfig>,
	api: OnlineClient<SubstrateConfig>,
	signals: broadcast::Sender<BackendSignal>,
}

impl SubxtClient {
	/// Connects and downloads runtime metadata. Plain `ws`/`http` endpoints
	/// are accepted for local nodes.
	pub async fn connect(endpoint: &str) -> Result<Self, anyhow::Error> {
		let url = Url::parse(endpoint).with_context(|| format!("Invalid endpoint {}", endpoint))?;
		let rpc_client = match url.scheme() {
			"wss" | "https" => RpcClient::from_url(endpoint).await,
			_ => RpcClient::from_insecure_url(endpoint).await,
		}
		.with_context(|| format!("Failed to open Substrate transport to {}", endpoint))?;

		let api = OnlineClient::<SubstrateConfig>::from_rpc_client(rpc_client.clone())
			.await
			.context("Failed to fetch runtime metadata")?;
		let rpc = LegacyRpcMethods::<SubstrateConfig>::new(rpc_client);

		let (signals, _) = broadcast::channel(SIGNAL_CAPACITY);
		let _ = signals.send(BackendSignal::Connected);

		Ok(Self { rpc, api, signals })
	}

	fn observe<T>(&self, result: Result<T, subxt::Error>) -> Result<T, subxt::Error> {
		if let Err(subxt::Error::Rpc(err)) = &result {
			let _ = self.signals.send(BackendSignal::Error(err.to_string()));
		}
		result
	}
}

/// Reads `data.<name>` out of a decoded `AccountInfo`
fn balance_field(info: &Value<u32>, name: &str) -> Option<u128> {
	info.at("data").at(name).and_then(|v| v.as_u128())
}

#[async_trait]
impl SubstrateClientTrait for SubxtClient {
	#[instrument(skip(self))]
	async fn system_chain(&self) -> Result<String, anyhow::Error> {
		self.observe(self.rpc.system_chain().await.map_err(subxt::Error::from))
			.context("Failed to get chain name")
	}

	#[instrument(skip(self))]
	async fn system_name(&self) -> Result<String, anyhow::Error> {
		self.observe(self.rpc.system_name().await.map_err(subxt::Error::from))
			.context("Failed to get node name")
	}

	#[instrument(skip(self))]
	async fn system_version(&self) -> Result<String, anyhow::Error> {
		self.observe(self.rpc.system_version().await.map_err(subxt::Error::from))
			.context("Failed to get node version")
	}

	#[instrument(skip(self))]
	async fn account_balance(&self, account: AccountId32) -> Result<AccountBalance, anyhow::Error> {
		let query = subxt::dynamic::storage("System", "Account", vec![Value::from_bytes(account.0)]);

		let storage = self
			.observe(self.api.storage().at_latest().await)
			.context("Failed to get latest block")?;
		let Some(thunk) = self
			.observe(storage.fetch(&query).await)
			.with_context(|| format!("Failed to fetch account {}", account))?
		else {
			return Ok(AccountBalance::default());
		};

		let info = thunk.to_value().context("Failed to decode account info")?;
		let free = balance_field(&info, "free")
			.ok_or_else(|| anyhow::anyhow!("Account info has no free balance"))?;
		let reserved = balance_field(&info, "reserved").unwrap_or_default();
		// Older runtimes split frozen funds into misc/fee
		let frozen = balance_field(&info, "frozen").unwrap_or_else(|| {
			balance_field(&info, "misc_frozen")
				.max(balance_field(&info, "fee_frozen"))
				.unwrap_or_default()
		});

		Ok(AccountBalance {
			free,
			reserved,
			frozen,
		})
	}

	async fn close(&self) -> Result<(), anyhow::Error> {
		// Background tasks end when the last client handle is dropped
		tracing::debug!("closing Substrate client");
		Ok(())
	}

	fn signals(&self) -> broadcast::Receiver<BackendSignal> {
		self.signals.subscribe()
	}
}
