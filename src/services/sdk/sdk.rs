//! The SDK facade.
//!
//! `SelendraSdk` owns at most one provider, chosen by the configured chain
//! type, and drives the `Disconnected -> Connecting -> Connected` lifecycle.
//! Failed connections are retried with a linear backoff when
//! `auto_reconnect` is set. Every error is both emitted as an `Error` event
//! and returned to the caller.
//!
//! The handle is cheap to clone; clones share the same connection.

use alloy::{
	dyn_abi::DynSolValue,
	primitives::{Address, B256, U256},
};
use chrono::{DateTime, Utc};
use std::{
	mem,
	sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak},
};
use tokio::{task::JoinHandle, time::Instant};
use tracing::instrument;

use crate::{
	models::{
		AccountBalance, ChainMetadata, ChainType, ConfigLoader, ConnectionInfo, ConnectionState,
		HealthStatus, Network, SdkConfig, SdkOptions, TokenInfo,
	},
	services::{
		blockchain::{
			evm_to_substrate, parse_evm_address, parse_ss58_address, substrate_to_evm,
			ActiveProvider, ChainAddress, EvmProvider, ProviderError, ProviderEvent,
			ProviderFactory, SubstrateProvider,
		},
		events::{ChainEvent, EventEmitter, EventKind, SubscriptionId},
		sdk::SdkError,
	},
	utils::{constants::NATIVE_DECIMALS, units::to_display_float},
};

/// Lifecycle event published by the facade
pub type SdkEvent = ChainEvent<SdkError>;

/// What started a connection attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
	Caller,
	Reconnect,
}

#[derive(Default)]
struct State {
	connection: ConnectionState,
	connected_at: Option<DateTime<Utc>>,
	retry_count: u32,
	provider: Option<ActiveProvider>,
	provider_subscriptions: Vec<SubscriptionId>,
	reconnect_task: Option<JoinHandle<()>>,
	/// Bumped whenever the provider is replaced or dropped, so late events
	/// from an old provider are ignored
	generation: u64,
	destroyed: bool,
}

struct Inner {
	config: RwLock<SdkConfig>,
	state: Mutex<State>,
	events: EventEmitter<SdkError>,
	factory: ProviderFactory,
}

impl Drop for Inner {
	fn drop(&mut self) {
		let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
		if let Some(task) = state.reconnect_task.take() {
			task.abort();
		}
	}
}

/// Unified SDK over an EVM or a Substrate backend
#[derive(Clone)]
pub struct SelendraSdk {
	inner: Arc<Inner>,
}

impl std::fmt::Debug for SelendraSdk {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SelendraSdk")
			.field("config", &self.config())
			.field("state", &self.state().connection)
			.finish()
	}
}

impl SelendraSdk {
	/// Validates `options` and merges them over the defaults. Nothing is
	/// connected yet.
	pub fn new(options: SdkOptions) -> Result<Self, SdkError> {
		Self::with_factory(options, ProviderFactory::default())
	}

	/// Like [`SelendraSdk::new`] with custom backend connectors
	pub fn with_factory(options: SdkOptions, factory: ProviderFactory) -> Result<Self, SdkError> {
		options.validate()?;
		let config = SdkConfig::merge(&options);
		tracing::debug!(?config, "sdk configured");

		Ok(Self {
			inner: Arc::new(Inner {
				config: RwLock::new(config),
				state: Mutex::new(State::default()),
				events: EventEmitter::new(),
				factory,
			}),
		})
	}

	/// Builds the SDK from a JSON options document
	pub fn from_json(json: &str) -> Result<Self, SdkError> {
		Self::new(SdkOptions::from_json(json)?)
	}

	fn state(&self) -> MutexGuard<'_, State> {
		self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
	}

	/// Snapshot of the current configuration
	pub fn config(&self) -> SdkConfig {
		self.inner
			.config
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}

	fn update_config(&self, update: impl FnOnce(&mut SdkConfig)) {
		let mut config = self.inner.config.write().unwrap_or_else(PoisonError::into_inner);
		update(&mut config);
	}

	pub fn chain_type(&self) -> ChainType {
		self.config().chain_type
	}

	pub fn is_connected(&self) -> bool {
		self.state().connection == ConnectionState::Connected
	}

	/// Endpoint and chain type come from the live provider when there is
	/// one, since builder changes only apply on the next `connect()`
	pub fn connection_info(&self) -> ConnectionInfo {
		let config = self.config();
		let state = self.state();
		let (endpoint, chain_type, metadata) = match &state.provider {
			Some(provider) => {
				let provider = provider.as_chain_provider();
				(
					provider.endpoint().map(str::to_string),
					provider.chain_type(),
					provider.metadata(),
				)
			}
			None => (config.endpoint, config.chain_type, None),
		};
		ConnectionInfo {
			is_connected: state.connection == ConnectionState::Connected,
			is_connecting: state.connection == ConnectionState::Connecting,
			connected_at: state.connected_at,
			endpoint,
			chain_type,
			reconnect_attempts: state.retry_count,
			metadata,
		}
	}

	/// Connected, and the provider still holds a live client
	pub fn is_healthy(&self) -> bool {
		match self.connected_provider() {
			Ok(provider) => provider.as_chain_provider().is_connected(),
			Err(_) => false,
		}
	}

	/// Times one round trip to the node. Failures are reported in the
	/// status rather than returned.
	#[instrument(skip(self))]
	pub async fn health_check(&self) -> HealthStatus {
		let provider = match self.connected_provider() {
			Ok(provider) => provider,
			Err(_) => {
				let chain_type = self.chain_type();
				return HealthStatus::unhealthy(
					chain_type,
					None,
					format!("No {} connection", chain_type),
				);
			}
		};

		let provider = provider.as_chain_provider();
		let started = Instant::now();
		let result = provider.ping().await;
		let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

		match result {
			Ok(()) => HealthStatus::healthy(provider.chain_type(), latency_ms),
			Err(error) => {
				tracing::warn!(%error, latency_ms, "health check failed");
				HealthStatus::unhealthy(provider.chain_type(), Some(latency_ms), error.to_string())
			}
		}
	}

	/// Chain identity captured when the connection was opened
	pub fn chain_metadata(&self) -> Option<ChainMetadata> {
		if !self.is_connected() {
			return None;
		}
		self.provider()
			.and_then(|provider| provider.as_chain_provider().metadata())
	}

	/// The active provider, if one exists
	pub fn provider(&self) -> Option<ActiveProvider> {
		self.state().provider.clone()
	}

	pub fn events(&self) -> &EventEmitter<SdkError> {
		&self.inner.events
	}

	/// Registers a callback for one event kind
	pub fn subscribe<F>(&self, kind: EventKind, listener: F) -> SubscriptionId
	where
		F: Fn(&SdkEvent) + Send + Sync + 'static,
	{
		self.inner.events.subscribe(kind, listener)
	}

	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		self.inner.events.unsubscribe(id)
	}

	fn emit(&self, event: SdkEvent) {
		if self.config().debug {
			match &event {
				ChainEvent::Error(err) => tracing::debug!(event = %event.kind(), error = %err, "sdk event"),
				ChainEvent::Reconnecting(attempt) => {
					tracing::debug!(event = %event.kind(), attempt, "sdk event")
				}
				_ => tracing::debug!(event = %event.kind(), "sdk event"),
			}
		}
		self.inner.events.emit(event);
	}

	/// Opens a connection with the configured backend.
	///
	/// A no-op while connected or while another attempt is in flight. On
	/// failure the facade is left disconnected and, with `auto_reconnect`,
	/// a retry is scheduled.
	pub async fn connect(&self) -> Result<(), SdkError> {
		self.connect_with(Trigger::Caller).await
	}

	#[instrument(skip(self), fields(chain_type = %self.chain_type()))]
	async fn connect_with(&self, trigger: Trigger) -> Result<(), SdkError> {
		let config = self.config();
		let (provider, generation) = {
			let mut state = self.state();
			if state.destroyed {
				return Err(SdkError::NotConnected);
			}
			if state.connection != ConnectionState::Disconnected {
				return Ok(());
			}
			if trigger == Trigger::Caller {
				if let Some(task) = state.reconnect_task.take() {
					task.abort();
				}
				state.retry_count = 0;
			}

			let provider = self.inner.factory.create(&config);
			state.connection = ConnectionState::Connecting;
			state.generation += 1;
			state.provider = Some(provider.clone());
			state.provider_subscriptions = self.wire_provider(&provider, state.generation);
			(provider, state.generation)
		};

		tracing::info!(endpoint = ?config.endpoint, "connecting");
		self.emit(SdkEvent::Connecting);

		match provider.as_chain_provider().connect().await {
			Ok(()) => {
				let newly_connected = {
					let mut state = self.state();
					if state.generation != generation {
						None
					} else {
						let newly = state.connection != ConnectionState::Connected;
						state.connection = ConnectionState::Connected;
						state.connected_at.get_or_insert_with(Utc::now);
						state.retry_count = 0;
						Some(newly)
					}
				};

				match newly_connected {
					Some(true) => {
						tracing::info!("connected");
						self.emit(SdkEvent::Connected);
						Ok(())
					}
					Some(false) => Ok(()),
					None => {
						// A disconnect raced this attempt; drop what was opened
						if let Err(error) = provider.as_chain_provider().disconnect().await {
							tracing::warn!(
								%error,
								"failed to close connection opened during a disconnect"
							);
						}
						Err(SdkError::NotConnected)
					}
				}
			}
			Err(err) => {
				let error = SdkError::from(err);
				let current = self.release_provider(generation);
				let still_current = current.is_some();
				if let Some((provider, subscriptions)) = current {
					unwire_provider(&provider, subscriptions);
				}
				tracing::warn!(%error, "connection attempt failed");
				self.emit(SdkEvent::Error(error.clone()));
				// A concurrent disconnect() wins over the retry policy
				if still_current {
					self.schedule_reconnect();
				}
				Err(error)
			}
		}
	}

	/// Resets to `Disconnected` and hands back the provider if it still
	/// belongs to `generation`
	fn release_provider(&self, generation: u64) -> Option<(ActiveProvider, Vec<SubscriptionId>)> {
		let mut state = self.state();
		if state.generation != generation {
			return None;
		}
		state.connection = ConnectionState::Disconnected;
		state.connected_at = None;
		let subscriptions = mem::take(&mut state.provider_subscriptions);
		state.provider.take().map(|provider| (provider, subscriptions))
	}

	fn wire_provider(&self, provider: &ActiveProvider, generation: u64) -> Vec<SubscriptionId> {
		let events = provider.as_chain_provider().events();
		[EventKind::Connected, EventKind::Disconnected, EventKind::Error]
			.into_iter()
			.map(|kind| {
				let sdk = Arc::downgrade(&self.inner);
				events.subscribe(kind, move |event| {
					on_provider_event(&sdk, generation, event);
				})
			})
			.collect()
	}

	fn schedule_reconnect(&self) {
		let config = self.config();
		if !config.auto_reconnect {
			return;
		}
		let policy = config.reconnect_policy();

		let attempt = {
			let mut state = self.state();
			if state.destroyed || !policy.can_retry(state.retry_count) {
				tracing::debug!(attempts = state.retry_count, "not scheduling a reconnect");
				return;
			}
			state.retry_count += 1;
			let attempt = state.retry_count;
			let Some(delay) = policy.delay_for(attempt) else {
				return;
			};

			let sdk = Arc::downgrade(&self.inner);
			let task = tokio::spawn(async move {
				tokio::time::sleep(delay).await;
				let Some(inner) = sdk.upgrade() else {
					return;
				};
				let sdk = SelendraSdk { inner };
				// Detach our own handle so the attempt cannot abort itself
				sdk.state().reconnect_task.take();
				if let Err(error) = sdk.connect_with(Trigger::Reconnect).await {
					tracing::debug!(attempt, %error, "reconnect attempt failed");
				}
			});
			if let Some(previous) = state.reconnect_task.replace(task) {
				previous.abort();
			}
			tracing::info!(attempt, delay_ms = delay.as_millis() as u64, "reconnect scheduled");
			attempt
		};

		self.emit(SdkEvent::Reconnecting(attempt));
	}

	/// Closes the connection and cancels any pending reconnect.
	///
	/// A no-op when already disconnected. Errors from the provider are
	/// emitted and returned; the facade ends up disconnected either way.
	#[instrument(skip(self))]
	pub async fn disconnect(&self) -> Result<(), SdkError> {
		let current = {
			let mut state = self.state();
			if let Some(task) = state.reconnect_task.take() {
				task.abort();
			}
			state.retry_count = 0;
			if state.connection == ConnectionState::Disconnected && state.provider.is_none() {
				return Ok(());
			}
			state.generation += 1;
			state.connection = ConnectionState::Disconnected;
			state.connected_at = None;
			let subscriptions = mem::take(&mut state.provider_subscriptions);
			state.provider.take().map(|provider| (provider, subscriptions))
		};

		let result = match current {
			Some((provider, subscriptions)) => {
				unwire_provider(&provider, subscriptions);
				provider.as_chain_provider().disconnect().await
			}
			None => Ok(()),
		};

		match result {
			Ok(()) => {
				tracing::info!("disconnected");
				self.emit(SdkEvent::Disconnected);
				Ok(())
			}
			Err(err) => {
				let error = SdkError::from(err);
				self.emit(SdkEvent::Error(error.clone()));
				Err(error)
			}
		}
	}

	/// Disconnects and removes every subscriber. The instance should not be
	/// used afterwards.
	pub async fn destroy(&self) -> Result<(), SdkError> {
		let result = self.disconnect().await;
		self.state().destroyed = true;
		self.inner.events.close();
		tracing::debug!("sdk destroyed");
		result
	}

	/// Replaces the endpoint. Takes effect on the next `connect()`.
	pub fn with_endpoint(&self, endpoint: impl Into<String>) -> &Self {
		let endpoint = endpoint.into();
		self.update_config(|config| config.endpoint = Some(endpoint));
		self
	}

	/// Switches network; known networks also switch to their default
	/// endpoint. Takes effect on the next `connect()`.
	pub fn with_network(&self, network: Network) -> &Self {
		self.update_config(|config| config.set_network(network));
		self
	}

	/// Takes effect on the next `connect()`
	pub fn with_chain_type(&self, chain_type: ChainType) -> &Self {
		self.update_config(|config| config.chain_type = chain_type);
		self
	}

	/// Overlays validated options on the current configuration. Takes effect
	/// on the next `connect()`.
	pub fn with_options(&self, options: &SdkOptions) -> Result<&Self, SdkError> {
		options.validate()?;
		self.update_config(|config| config.apply(options));
		Ok(self)
	}

	fn connected_provider(&self) -> Result<ActiveProvider, SdkError> {
		let state = self.state();
		if state.connection != ConnectionState::Connected {
			return Err(SdkError::NotConnected);
		}
		state.provider.clone().ok_or(SdkError::NotConnected)
	}

	fn evm_provider(&self, operation: &str) -> Result<Arc<EvmProvider>, SdkError> {
		let configured = self.chain_type();
		if configured != ChainType::EVM {
			return Err(SdkError::wrong_chain_type(operation, ChainType::EVM, configured));
		}
		let provider = self.connected_provider()?;
		provider
			.as_evm()
			.cloned()
			.ok_or_else(|| SdkError::wrong_chain_type(operation, ChainType::EVM, provider.chain_type()))
	}

	fn substrate_provider(&self, operation: &str) -> Result<Arc<SubstrateProvider>, SdkError> {
		let configured = self.chain_type();
		if configured != ChainType::Substrate {
			return Err(SdkError::wrong_chain_type(operation, ChainType::Substrate, configured));
		}
		let provider = self.connected_provider()?;
		provider.as_substrate().cloned().ok_or_else(|| {
			SdkError::wrong_chain_type(operation, ChainType::Substrate, provider.chain_type())
		})
	}

	/// Emits provider failures before returning them
	fn report<T>(&self, result: Result<T, ProviderError>) -> Result<T, SdkError> {
		result.map_err(|err| {
			let error = SdkError::from(err);
			self.emit(SdkEvent::Error(error.clone()));
			error
		})
	}

	/// Balance in the chain's smallest unit: the free balance on Substrate,
	/// wei on EVM
	#[instrument(skip(self))]
	pub async fn get_balance(&self, address: &str) -> Result<U256, SdkError> {
		match self.connected_provider()? {
			ActiveProvider::Evm(provider) => self.report(provider.get_balance(address).await),
			ActiveProvider::Substrate(provider) => self
				.report(provider.get_account_balance(address).await)
				.map(|balance| balance.free_u256()),
		}
	}

	/// Balance divided by `10^decimals` (18 when `None`). For display only.
	pub async fn get_formatted_balance(
		&self,
		address: &str,
		decimals: Option<u8>,
	) -> Result<f64, SdkError> {
		let balance = self.get_balance(address).await?;
		let decimals = decimals.unwrap_or(NATIVE_DECIMALS);
		self.report(to_display_float(balance, decimals).map_err(ProviderError::from))
	}

	/// Structured free/reserved/frozen balance. Substrate only.
	pub async fn get_account_balance(&self, address: &str) -> Result<AccountBalance, SdkError> {
		let provider = self.substrate_provider("get_account_balance")?;
		self.report(provider.get_account_balance(address).await)
	}

	/// Native transfer of a decimal `amount`. EVM only.
	pub async fn send_transfer(
		&self,
		private_key: &str,
		to: &str,
		amount: &str,
	) -> Result<B256, SdkError> {
		let provider = self.evm_provider("send_transfer")?;
		self.report(provider.send_transfer(private_key, to, amount).await)
	}

	/// ERC20 transfer of `amount` smallest token units. EVM only.
	pub async fn send_erc20_transfer(
		&self,
		private_key: &str,
		token: &str,
		to: &str,
		amount: U256,
	) -> Result<B256, SdkError> {
		let provider = self.evm_provider("send_erc20_transfer")?;
		self.report(
			provider
				.send_erc20_transfer(private_key, token, to, amount)
				.await,
		)
	}

	/// EVM only
	pub async fn execute_contract_transaction(
		&self,
		private_key: &str,
		contract: &str,
		signatures: &[&str],
		function: &str,
		args: &[DynSolValue],
		value: Option<U256>,
	) -> Result<B256, SdkError> {
		let provider = self.evm_provider("execute_contract_transaction")?;
		self.report(
			provider
				.execute_contract_transaction(private_key, contract, signatures, function, args, value)
				.await,
		)
	}

	/// EVM only
	pub async fn call_contract_function(
		&self,
		contract: &str,
		signatures: &[&str],
		function: &str,
		args: &[DynSolValue],
	) -> Result<Vec<DynSolValue>, SdkError> {
		let provider = self.evm_provider("call_contract_function")?;
		self.report(
			provider
				.call_contract_function(contract, signatures, function, args)
				.await,
		)
	}

	/// EVM only
	pub async fn get_erc20_balance(&self, token: &str, owner: &str) -> Result<U256, SdkError> {
		let provider = self.evm_provider("get_erc20_balance")?;
		self.report(provider.get_erc20_balance(token, owner).await)
	}

	/// EVM only
	pub async fn get_erc20_info(&self, token: &str) -> Result<TokenInfo, SdkError> {
		let provider = self.evm_provider("get_erc20_info")?;
		self.report(provider.get_erc20_info(token).await)
	}

	/// Transactions sent so far from `address`. EVM only.
	pub async fn get_nonce(&self, address: &str) -> Result<u64, SdkError> {
		let provider = self.evm_provider("get_nonce")?;
		self.report(provider.get_nonce(address).await)
	}

	/// Approves `spender` for `amount` smallest token units. EVM only.
	pub async fn approve_erc20(
		&self,
		private_key: &str,
		token: &str,
		spender: &str,
		amount: U256,
	) -> Result<B256, SdkError> {
		let provider = self.evm_provider("approve_erc20")?;
		self.report(
			provider
				.approve_erc20(private_key, token, spender, amount)
				.await,
		)
	}

	/// EVM only
	pub async fn get_erc20_allowance(
		&self,
		token: &str,
		owner: &str,
		spender: &str,
	) -> Result<U256, SdkError> {
		let provider = self.evm_provider("get_erc20_allowance")?;
		self.report(provider.get_erc20_allowance(token, owner, spender).await)
	}

	/// SS58 form of the account mapped to an EVM address. Needs no
	/// connection.
	pub fn convert_evm_to_substrate(&self, address: &str) -> Result<String, SdkError> {
		self.report(parse_evm_address(address))
			.map(|address| evm_to_substrate(address).to_string())
	}

	/// EVM address mapped to an SS58 account. Needs no connection.
	pub fn convert_substrate_to_evm(&self, address: &str) -> Result<Address, SdkError> {
		self.report(parse_ss58_address(address))
			.map(|account| substrate_to_evm(&account))
	}

	/// Parses an address of either family, rejecting the zero address
	pub fn validate_address(&self, address: &str) -> Result<ChainAddress, SdkError> {
		self.report(ChainAddress::parse(address))
	}

	/// Gas estimate for a native transfer. EVM only.
	pub async fn estimate_gas(
		&self,
		from: Option<&str>,
		to: &str,
		amount: &str,
	) -> Result<u64, SdkError> {
		let provider = self.evm_provider("estimate_gas")?;
		self.report(provider.estimate_gas(from, to, amount).await)
	}
}

fn unwire_provider(provider: &ActiveProvider, subscriptions: Vec<SubscriptionId>) {
	let events = provider.as_chain_provider().events();
	for id in subscriptions {
		events.unsubscribe(id);
	}
}

/// Mirrors provider events onto the facade
fn on_provider_event(sdk: &Weak<Inner>, generation: u64, event: &ProviderEvent) {
	let Some(inner) = sdk.upgrade() else {
		return;
	};
	let sdk = SelendraSdk { inner };

	match event {
		ChainEvent::Connected => {
			let changed = {
				let mut state = sdk.state();
				if state.generation != generation
					|| state.connection != ConnectionState::Disconnected
				{
					false
				} else {
					state.connection = ConnectionState::Connected;
					state.connected_at = Some(Utc::now());
					state.retry_count = 0;
					true
				}
			};
			if changed {
				sdk.emit(SdkEvent::Connected);
			}
		}
		ChainEvent::Disconnected => {
			let dropped = {
				let mut state = sdk.state();
				if state.generation != generation
					|| state.connection != ConnectionState::Connected
				{
					false
				} else {
					state.generation += 1;
					state.connection = ConnectionState::Disconnected;
					state.connected_at = None;
					state.provider_subscriptions.clear();
					state.provider = None;
					true
				}
			};
			if dropped {
				tracing::warn!("connection lost");
				sdk.emit(SdkEvent::Disconnected);
				sdk.schedule_reconnect();
			}
		}
		ChainEvent::Error(err) => {
			let current = sdk.state().generation == generation;
			if current {
				sdk.emit(SdkEvent::Error(SdkError::from(err.clone())));
			}
		}
		ChainEvent::Connecting | ChainEvent::Reconnecting(_) => {}
	}
}
