//! EVM provider.
//!
//! Wraps an [`EvmClientTrait`] handle and shapes the caller's arguments
//! (string addresses, decimal amounts, signature lists) into typed calls.

use alloy::{
	dyn_abi::DynSolValue,
	primitives::{Bytes, B256, U256},
	signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use std::{str::FromStr, sync::Arc, time::Duration};
use tracing::instrument;

use crate::{
	models::{ChainMetadata, ChainType, TokenInfo},
	services::{
		blockchain::{
			address::parse_evm_address,
			clients::{EvmClientTrait, EvmConnector},
			contract::ContractInterface,
			provider::{ChainProvider, ConnectionSlot},
			ProviderError, ProviderEvent,
		},
		events::EventEmitter,
	},
	utils::{constants::NATIVE_DECIMALS, units::parse_amount},
};

/// Provider for EVM-compatible chains
pub struct EvmProvider {
	endpoint: Option<String>,
	timeout: Duration,
	connector: Arc<dyn EvmConnector>,
	slot: Arc<ConnectionSlot<dyn EvmClientTrait>>,
}

fn parse_signer(private_key: &str) -> Result<PrivateKeySigner, ProviderError> {
	// The key itself never ends up in the message
	PrivateKeySigner::from_str(private_key.trim())
		.map_err(|_| ProviderError::invalid_argument("Invalid private key"))
}

fn operation_failed(context: &str, err: anyhow::Error) -> ProviderError {
	ProviderError::operation_error(format!("{}: {:#}", context, err))
}

fn expect_uint(values: &[DynSolValue], function: &str) -> Result<U256, ProviderError> {
	values
		.first()
		.and_then(DynSolValue::as_uint)
		.map(|(value, _)| value)
		.ok_or_else(|| {
			ProviderError::operation_error(format!("Invalid {} return value", function))
		})
}

fn expect_string(values: &[DynSolValue], function: &str) -> Result<String, ProviderError> {
	values
		.first()
		.and_then(DynSolValue::as_str)
		.map(str::to_string)
		.ok_or_else(|| {
			ProviderError::operation_error(format!("Invalid {} return value", function))
		})
}

impl EvmProvider {
	pub fn new(endpoint: Option<String>, timeout: Duration, connector: Arc<dyn EvmConnector>) -> Self {
		Self {
			endpoint,
			timeout,
			connector,
			slot: ConnectionSlot::new(),
		}
	}

	/// The live client, or `None` once disconnected
	pub fn client(&self) -> Option<Arc<dyn EvmClientTrait>> {
		self.slot.client()
	}

	fn require_client(&self) -> Result<Arc<dyn EvmClientTrait>, ProviderError> {
		self.slot.client().ok_or(ProviderError::NotConnected)
	}

	/// Native balance in wei
	#[instrument(skip(self))]
	pub async fn get_balance(&self, address: &str) -> Result<U256, ProviderError> {
		let address = parse_evm_address(address)?;
		let client = self.require_client()?;
		client
			.get_balance(address)
			.await
			.map_err(|e| operation_failed("Failed to get EVM balance", e))
	}

	/// Transactions sent so far from `address`; the next one uses this value
	#[instrument(skip(self))]
	pub async fn get_nonce(&self, address: &str) -> Result<u64, ProviderError> {
		let address = parse_evm_address(address)?;
		let client = self.require_client()?;
		client
			.nonce(address)
			.await
			.map_err(|e| operation_failed("Failed to get nonce", e))
	}

	/// Sends `amount` (decimal, in the native currency) and waits for
	/// inclusion
	#[instrument(skip(self, private_key))]
	pub async fn send_transfer(
		&self,
		private_key: &str,
		to: &str,
		amount: &str,
	) -> Result<B256, ProviderError> {
		let signer = parse_signer(private_key)?;
		let to = parse_evm_address(to)?;
		let value = parse_amount(amount, NATIVE_DECIMALS)?;
		let client = self.require_client()?;

		let tx_hash = client
			.send_transaction(signer, to, value, Bytes::new())
			.await
			.map_err(|e| operation_failed("Failed to send transfer", e))?;
		tracing::info!(%tx_hash, %to, %value, "transfer included");
		Ok(tx_hash)
	}

	/// Transfers `amount` token units (smallest unit) of an ERC20 token
	#[instrument(skip(self, private_key))]
	pub async fn send_erc20_transfer(
		&self,
		private_key: &str,
		token: &str,
		to: &str,
		amount: U256,
	) -> Result<B256, ProviderError> {
		let signer = parse_signer(private_key)?;
		let token = parse_evm_address(token)?;
		let to = parse_evm_address(to)?;
		let input = ContractInterface::erc20()?
			.encode_call("transfer", &[DynSolValue::Address(to), DynSolValue::Uint(amount, 256)])?;
		let client = self.require_client()?;

		client
			.send_transaction(signer, token, U256::ZERO, input)
			.await
			.map_err(|e| operation_failed("Failed to send ERC20 transfer", e))
	}

	/// Lets `spender` move up to `amount` token units from the signer's
	/// account
	#[instrument(skip(self, private_key))]
	pub async fn approve_erc20(
		&self,
		private_key: &str,
		token: &str,
		spender: &str,
		amount: U256,
	) -> Result<B256, ProviderError> {
		let signer = parse_signer(private_key)?;
		let token = parse_evm_address(token)?;
		let spender = parse_evm_address(spender)?;
		let input = ContractInterface::erc20()?.encode_call(
			"approve",
			&[DynSolValue::Address(spender), DynSolValue::Uint(amount, 256)],
		)?;
		let client = self.require_client()?;

		let tx_hash = client
			.send_transaction(signer, token, U256::ZERO, input)
			.await
			.map_err(|e| operation_failed("Failed to approve ERC20 spender", e))?;
		tracing::info!(%tx_hash, %spender, %amount, "allowance approved");
		Ok(tx_hash)
	}

	/// Signs and submits a call to `function` on a contract described by
	/// `signatures`
	#[instrument(skip(self, private_key, signatures, args))]
	pub async fn execute_contract_transaction(
		&self,
		private_key: &str,
		contract: &str,
		signatures: &[&str],
		function: &str,
		args: &[DynSolValue],
		value: Option<U256>,
	) -> Result<B256, ProviderError> {
		let signer = parse_signer(private_key)?;
		let contract = parse_evm_address(contract)?;
		let input = ContractInterface::parse(signatures)?.encode_call(function, args)?;
		let client = self.require_client()?;

		client
			.send_transaction(signer, contract, value.unwrap_or(U256::ZERO), input)
			.await
			.map_err(|e| operation_failed(&format!("Failed to execute {}", function), e))
	}

	/// Read-only call; returns the decoded outputs
	#[instrument(skip(self, signatures, args))]
	pub async fn call_contract_function(
		&self,
		contract: &str,
		signatures: &[&str],
		function: &str,
		args: &[DynSolValue],
	) -> Result<Vec<DynSolValue>, ProviderError> {
		let contract = parse_evm_address(contract)?;
		let interface = ContractInterface::parse(signatures)?;
		let input = interface.encode_call(function, args)?;
		let client = self.require_client()?;

		let output = client
			.call(contract, input)
			.await
			.map_err(|e| operation_failed(&format!("Failed to call {}", function), e))?;
		interface.decode_output(function, args.len(), &output)
	}

	#[instrument(skip(self))]
	pub async fn get_erc20_balance(&self, token: &str, owner: &str) -> Result<U256, ProviderError> {
		let owner = parse_evm_address(owner)?;
		let values = self
			.erc20_call(token, "balanceOf", &[DynSolValue::Address(owner)])
			.await?;
		expect_uint(&values, "balanceOf")
	}

	/// Token units `spender` may still move on behalf of `owner`
	#[instrument(skip(self))]
	pub async fn get_erc20_allowance(
		&self,
		token: &str,
		owner: &str,
		spender: &str,
	) -> Result<U256, ProviderError> {
		let owner = parse_evm_address(owner)?;
		let spender = parse_evm_address(spender)?;
		let values = self
			.erc20_call(
				token,
				"allowance",
				&[DynSolValue::Address(owner), DynSolValue::Address(spender)],
			)
			.await?;
		expect_uint(&values, "allowance")
	}

	#[instrument(skip(self))]
	pub async fn get_erc20_info(&self, token: &str) -> Result<TokenInfo, ProviderError> {
		let (name, symbol, decimals, total_supply) = tokio::try_join!(
			self.erc20_call(token, "name", &[]),
			self.erc20_call(token, "symbol", &[]),
			self.erc20_call(token, "decimals", &[]),
			self.erc20_call(token, "totalSupply", &[]),
		)?;

		let decimals = expect_uint(&decimals, "decimals")?;
		let decimals = u8::try_from(decimals).map_err(|_| {
			ProviderError::operation_error(format!("Token decimals out of range: {}", decimals))
		})?;

		Ok(TokenInfo {
			name: expect_string(&name, "name")?,
			symbol: expect_string(&symbol, "symbol")?,
			decimals,
			total_supply: expect_uint(&total_supply, "totalSupply")?,
		})
	}

	async fn erc20_call(
		&self,
		token: &str,
		function: &str,
		args: &[DynSolValue],
	) -> Result<Vec<DynSolValue>, ProviderError> {
		let token = parse_evm_address(token)?;
		let interface = ContractInterface::erc20()?;
		let input = interface.encode_call(function, args)?;
		let client = self.require_client()?;

		let output = client
			.call(token, input)
			.await
			.map_err(|e| operation_failed(&format!("Failed to call ERC20 {}", function), e))?;
		interface.decode_output(function, args.len(), &output)
	}

	/// Gas estimate for sending `amount` of the native currency
	#[instrument(skip(self))]
	pub async fn estimate_gas(
		&self,
		from: Option<&str>,
		to: &str,
		amount: &str,
	) -> Result<u64, ProviderError> {
		let from = from.map(parse_evm_address).transpose()?;
		let to = parse_evm_address(to)?;
		let value = parse_amount(amount, NATIVE_DECIMALS)?;
		let client = self.require_client()?;

		client
			.estimate_gas(from, to, value, Bytes::new())
			.await
			.map_err(|e| operation_failed("Failed to estimate gas", e))
	}
}

#[async_trait]
impl ChainProvider for EvmProvider {
	fn chain_type(&self) -> ChainType {
		ChainType::EVM
	}

	fn endpoint(&self) -> Option<&str> {
		self.endpoint.as_deref()
	}

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
			let (chain_id, network_version) =
				tokio::try_join!(client.chain_id(), client.network_version())?;
			Ok::<_, anyhow::Error>((
				client,
				ChainMetadata::Evm {
					chain_id,
					network_version,
				},
			))
		};

		let (client, metadata) = match tokio::time::timeout(self.timeout, attempt).await {
			Ok(Ok(connected)) => connected,
			Ok(Err(e)) => {
				return Err(ProviderError::connection_error(format!(
					"Failed to connect to EVM chain: {:#}",
					e
				)));
			}
			Err(_) => {
				return Err(ProviderError::connection_timeout(format!(
					"Failed to connect to EVM chain: no response from {} within {}ms",
					endpoint,
					self.timeout.as_millis()
				)));
			}
		};

		let signals = client.signals();
		self.slot.attach(client, metadata, signals);
		tracing::info!(endpoint, "connected to EVM chain");
		Ok(())
	}

	async fn ping(&self) -> Result<(), ProviderError> {
		let client = self.require_client()?;
		client
			.chain_id()
			.await
			.map(|_| ())
			.map_err(|e| operation_failed("EVM node did not answer", e))
	}

	#[instrument(skip(self))]
	async fn disconnect(&self) -> Result<(), ProviderError> {
		let Some(client) = self.slot.detach() else {
			return Ok(());
		};

		if let Err(e) = client.close().await {
			let error = ProviderError::connection_error(format!(
				"Failed to disconnect from EVM chain: {:#}",
				e
			));
			self.slot.events().emit(ProviderEvent::Error(error.clone()));
			return Err(error);
		}

		self.slot.events().emit(ProviderEvent::Disconnected);
		tracing::info!("disconnected from EVM chain");
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
