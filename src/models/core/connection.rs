use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ChainType;

/// Lifecycle state of a facade
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConnectionState {
	#[default]
	Disconnected,
	Connecting,
	Connected,
}

/// Identity reported by the node when the connection was established
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChainMetadata {
	Substrate {
		chain: String,
		node_name: String,
		node_version: String,
	},
	Evm {
		chain_id: u64,
		network_version: String,
	},
}

impl ChainMetadata {
	pub fn chain_type(&self) -> ChainType {
		match self {
			Self::Substrate { .. } => ChainType::Substrate,
			Self::Evm { .. } => ChainType::EVM,
		}
	}
}

/// Snapshot of the facade's connection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionInfo {
	pub is_connected: bool,
	pub is_connecting: bool,
	/// Set only while `is_connected` is true
	pub connected_at: Option<DateTime<Utc>>,
	pub endpoint: Option<String>,
	pub chain_type: ChainType,
	pub reconnect_attempts: u32,
	pub metadata: Option<ChainMetadata>,
}

impl ConnectionInfo {
	pub fn state(&self) -> ConnectionState {
		match (self.is_connected, self.is_connecting) {
			(true, _) => ConnectionState::Connected,
			(false, true) => ConnectionState::Connecting,
			(false, false) => ConnectionState::Disconnected,
		}
	}
}

/// Outcome of a facade health check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
	pub healthy: bool,
	pub chain_type: ChainType,
	/// Round trip of the check call; `None` when no call was made
	pub latency_ms: Option<u64>,
	pub error: Option<String>,
	pub checked_at: DateTime<Utc>,
}

impl HealthStatus {
	pub fn healthy(chain_type: ChainType, latency_ms: u64) -> Self {
		Self {
			healthy: true,
			chain_type,
			latency_ms: Some(latency_ms),
			error: None,
			checked_at: Utc::now(),
		}
	}

	pub fn unhealthy(chain_type: ChainType, latency_ms: Option<u64>, error: impl Into<String>) -> Self {
		Self {
			healthy: false,
			chain_type,
			latency_ms,
			error: Some(error.into()),
			checked_at: Utc::now(),
		}
	}
}
