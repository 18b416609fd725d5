//! Connection lifecycle events.
//!
//! Providers and the SDK facade publish the same five events. Consumers
//! either register callbacks per event kind or take a broadcast receiver that
//! sees every event. Closing an emitter drops all callbacks and makes later
//! subscriptions inert.

use std::{
	collections::HashMap,
	fmt,
	str::FromStr,
	sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tokio::sync::broadcast;

/// Capacity of the broadcast channel behind [`EventEmitter::receiver`]
const CHANNEL_CAPACITY: usize = 64;

/// A lifecycle event, generic over the error type it carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainEvent<E> {
	Connecting,
	Connected,
	Disconnected,
	Error(E),
	/// Carries the 1-based reconnect attempt number
	Reconnecting(u32),
}

impl<E> ChainEvent<E> {
	pub fn kind(&self) -> EventKind {
		match self {
			Self::Connecting => EventKind::Connecting,
			Self::Connected => EventKind::Connected,
			Self::Disconnected => EventKind::Disconnected,
			Self::Error(_) => EventKind::Error,
			Self::Reconnecting(_) => EventKind::Reconnecting,
		}
	}
}

/// Event names consumers subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
	Connecting,
	Connected,
	Disconnected,
	Error,
	Reconnecting,
}

impl EventKind {
	pub const ALL: [EventKind; 5] = [
		Self::Connecting,
		Self::Connected,
		Self::Disconnected,
		Self::Error,
		Self::Reconnecting,
	];

	pub fn name(&self) -> &'static str {
		match self {
			Self::Connecting => "connecting",
			Self::Connected => "connected",
			Self::Disconnected => "disconnected",
			Self::Error => "error",
			Self::Reconnecting => "reconnecting",
		}
	}
}

impl fmt::Display for EventKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for EventKind {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|kind| kind.name() == s)
			.ok_or_else(|| format!("Unknown event: {}", s))
	}
}

/// Handle returned by [`EventEmitter::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callback invoked for a matching event
pub type Listener<E> = Arc<dyn Fn(&ChainEvent<E>) + Send + Sync>;

struct Registry<E> {
	next_id: u64,
	closed: bool,
	listeners: HashMap<EventKind, Vec<(SubscriptionId, Listener<E>)>>,
}

/// Subscriber lists, one per event kind
pub struct EventEmitter<E> {
	registry: Mutex<Registry<E>>,
	sender: broadcast::Sender<ChainEvent<E>>,
}

impl<E: Clone + Send + 'static> Default for EventEmitter<E> {
	fn default() -> Self {
		Self::new()
	}
}

impl<E: Clone + Send + 'static> EventEmitter<E> {
	pub fn new() -> Self {
		let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
		Self {
			registry: Mutex::new(Registry {
				next_id: 0,
				closed: false,
				listeners: HashMap::new(),
			}),
			sender,
		}
	}

	fn registry(&self) -> MutexGuard<'_, Registry<E>> {
		self.registry.lock().unwrap_or_else(PoisonError::into_inner)
	}

	/// Registers `listener` for events of `kind`.
	///
	/// On a closed emitter the returned id refers to nothing and the
	/// listener is never called.
	pub fn subscribe<F>(&self, kind: EventKind, listener: F) -> SubscriptionId
	where
		F: Fn(&ChainEvent<E>) + Send + Sync + 'static,
	{
		let mut registry = self.registry();
		let id = SubscriptionId(registry.next_id);
		registry.next_id += 1;
		if !registry.closed {
			registry
				.listeners
				.entry(kind)
				.or_default()
				.push((id, Arc::new(listener)));
		}
		id
	}

	/// Removes a listener; returns whether it was registered
	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		let mut registry = self.registry();
		for listeners in registry.listeners.values_mut() {
			if let Some(position) = listeners.iter().position(|(sid, _)| *sid == id) {
				listeners.remove(position);
				return true;
			}
		}
		false
	}

	/// Calls every listener registered for the event's kind, in subscription
	/// order, and forwards the event to broadcast receivers
	pub fn emit(&self, event: ChainEvent<E>) {
		let listeners: Vec<Listener<E>> = {
			let registry = self.registry();
			if registry.closed {
				return;
			}
			registry
				.listeners
				.get(&event.kind())
				.map(|entries| entries.iter().map(|(_, l)| Arc::clone(l)).collect())
				.unwrap_or_default()
		};

		// Listeners run outside the lock so they may subscribe or unsubscribe
		for listener in listeners {
			listener(&event);
		}

		let _ = self.sender.send(event);
	}

	/// Receiver that sees every event emitted from now on
	pub fn receiver(&self) -> broadcast::Receiver<ChainEvent<E>> {
		self.sender.subscribe()
	}

	pub fn listener_count(&self, kind: EventKind) -> usize {
		self.registry()
			.listeners
			.get(&kind)
			.map_or(0, |listeners| listeners.len())
	}

	/// Drops every listener; the emitter stays usable
	pub fn remove_all_listeners(&self) {
		self.registry().listeners.clear();
	}

	/// Drops every listener and stops accepting new ones
	pub fn close(&self) {
		let mut registry = self.registry();
		registry.listeners.clear();
		registry.closed = true;
	}

	pub fn is_closed(&self) -> bool {
		self.registry().closed
	}
}
