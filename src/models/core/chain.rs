use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::utils::constants::{
	DEFAULT_EVM_ENDPOINT, DEFAULT_SUBSTRATE_ENDPOINT, DEFAULT_TESTNET_EVM_ENDPOINT,
	DEFAULT_TESTNET_SUBSTRATE_ENDPOINT,
};

/// Backend family a facade talks to
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ChainType {
	/// Substrate chain reached through subxt
	#[default]
	#[serde(alias = "substrate", alias = "SUBSTRATE")]
	Substrate,
	/// EVM-compatible chain reached through alloy
	#[serde(alias = "evm", alias = "Evm")]
	EVM,
}

impl fmt::Display for ChainType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Substrate => write!(f, "Substrate"),
			Self::EVM => write!(f, "EVM"),
		}
	}
}

impl FromStr for ChainType {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"substrate" => Ok(Self::Substrate),
			"evm" => Ok(Self::EVM),
			other => Err(format!("Unknown chain type: {}", other)),
		}
	}
}

/// Known Selendra deployments
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Network {
	#[default]
	#[serde(alias = "mainnet")]
	Selendra,
	#[serde(alias = "testnet")]
	SelendraTestnet,
	/// Any other node; the endpoint has to be supplied explicitly
	Custom,
}

impl Network {
	/// Default endpoint for the given chain type, if the network has one
	pub fn default_endpoint(&self, chain_type: ChainType) -> Option<&'static str> {
		match (self, chain_type) {
			(Self::Selendra, ChainType::Substrate) => Some(DEFAULT_SUBSTRATE_ENDPOINT),
			(Self::Selendra, ChainType::EVM) => Some(DEFAULT_EVM_ENDPOINT),
			(Self::SelendraTestnet, ChainType::Substrate) => Some(DEFAULT_TESTNET_SUBSTRATE_ENDPOINT),
			(Self::SelendraTestnet, ChainType::EVM) => Some(DEFAULT_TESTNET_EVM_ENDPOINT),
			(Self::Custom, _) => None,
		}
	}
}

impl fmt::Display for Network {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Selendra => write!(f, "selendra"),
			Self::SelendraTestnet => write!(f, "selendratestnet"),
			Self::Custom => write!(f, "custom"),
		}
	}
}

impl FromStr for Network {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"selendra" | "mainnet" => Ok(Self::Selendra),
			"selendratestnet" | "selendra_testnet" | "testnet" => Ok(Self::SelendraTestnet),
			"custom" => Ok(Self::Custom),
			other => Err(format!("Unknown network: {}", other)),
		}
	}
}
