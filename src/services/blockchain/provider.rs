//! Provider capability interface and the connection state both providers
//! share.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};
use tokio::{sync::broadcast, task::JoinHandle};

use crate::{
	models::{ChainMetadata, ChainType},
	services::{
		blockchain::{clients::BackendSignal, ProviderError},
		events::{ChainEvent, EventEmitter},
	},
};

/// Lifecycle event published by a provider
pub type ProviderEvent = ChainEvent<ProviderError>;

/// Capabilities shared by the EVM and Substrate providers
#[async_trait]
pub trait ChainProvider: Send + Sync {
	fn chain_type(&self) -> ChainType;

	fn endpoint(&self) -> Option<&str>;

	/// Opens the transport. A no-op when already connected.
	async fn connect(&self) -> Result<(), ProviderError>;

	/// Closes the transport. A no-op when nothing is open.
	async fn disconnect(&self) -> Result<(), ProviderError>;

	fn is_connected(&self) -> bool;

	/// One cheap round trip to the node
	async fn ping(&self) -> Result<(), ProviderError>;

	/// Identity reported by the node at connect time
	fn metadata(&self) -> Option<ChainMetadata>;

	fn events(&self) -> &EventEmitter<ProviderError>;
}

/// Live client handle plus everything tied to its lifetime
pub(crate) struct ConnectionSlot<C: ?Sized> {
	client: RwLock<Option<Arc<C>>>,
	metadata: RwLock<Option<ChainMetadata>>,
	listener: Mutex<Option<JoinHandle<()>>>,
	events: EventEmitter<ProviderError>,
}

impl<C: ?Sized + Send + Sync + 'static> ConnectionSlot<C> {
	pub(crate) fn new() -> Arc<Self> {
		Arc::new(Self {
			client: RwLock::new(None),
			metadata: RwLock::new(None),
			listener: Mutex::new(None),
			events: EventEmitter::new(),
		})
	}

	pub(crate) fn client(&self) -> Option<Arc<C>> {
		self.client
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}

	pub(crate) fn is_connected(&self) -> bool {
		self.client
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.is_some()
	}

	pub(crate) fn metadata(&self) -> Option<ChainMetadata> {
		self.metadata
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}

	pub(crate) fn events(&self) -> &EventEmitter<ProviderError> {
		&self.events
	}

	/// Stores a freshly connected client and starts translating its signals
	pub(crate) fn attach(
		self: &Arc<Self>,
		client: Arc<C>,
		metadata: ChainMetadata,
		signals: broadcast::Receiver<BackendSignal>,
	) {
		*self.client.write().unwrap_or_else(PoisonError::into_inner) = Some(client);
		*self.metadata.write().unwrap_or_else(PoisonError::into_inner) = Some(metadata);

		let listener = tokio::spawn(listen(Arc::downgrade(self), signals));
		if let Some(previous) = self
			.listener
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.replace(listener)
		{
			previous.abort();
		}
	}

	/// Stops the signal listener and hands back the client, if any
	pub(crate) fn detach(&self) -> Option<Arc<C>> {
		if let Some(listener) = self
			.listener
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.take()
		{
			listener.abort();
		}
		self.metadata
			.write()
			.unwrap_or_else(PoisonError::into_inner)
			.take();
		self.client
			.write()
			.unwrap_or_else(PoisonError::into_inner)
			.take()
	}
}

impl<C: ?Sized> Drop for ConnectionSlot<C> {
	fn drop(&mut self) {
		if let Some(listener) = self
			.listener
			.get_mut()
			.unwrap_or_else(PoisonError::into_inner)
			.take()
		{
			listener.abort();
		}
	}
}

async fn listen<C: ?Sized + Send + Sync + 'static>(
	slot: Weak<ConnectionSlot<C>>,
	mut signals: broadcast::Receiver<BackendSignal>,
) {
	loop {
		let signal = match signals.recv().await {
			Ok(signal) => signal,
			Err(broadcast::error::RecvError::Lagged(skipped)) => {
				tracing::warn!(skipped, "provider lagged behind backend signals");
				continue;
			}
			Err(broadcast::error::RecvError::Closed) => return,
		};
		let Some(slot) = slot.upgrade() else {
			return;
		};

		match signal {
			BackendSignal::Connected => slot.events.emit(ProviderEvent::Connected),
			BackendSignal::Error(message) => slot
				.events
				.emit(ProviderEvent::Error(ProviderError::connection_error(message))),
			BackendSignal::Disconnected => {
				tracing::warn!("backend reported the connection as lost");
				slot.metadata
					.write()
					.unwrap_or_else(PoisonError::into_inner)
					.take();
				let had_client = slot
					.client
					.write()
					.unwrap_or_else(PoisonError::into_inner)
					.take()
					.is_some();
				if had_client {
					slot.events.emit(ProviderEvent::Disconnected);
				}
				return;
			}
		}
	}
}
