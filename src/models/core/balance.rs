use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

/// Structured Substrate account balance, in planck
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountBalance {
	pub free: u128,
	pub reserved: u128,
	pub frozen: u128,
}

impl AccountBalance {
	/// Free balance that is not frozen
	pub fn transferable(&self) -> u128 {
		self.free.saturating_sub(self.frozen)
	}

	/// Free plus reserved
	pub fn total(&self) -> u128 {
		self.free.saturating_add(self.reserved)
	}

	/// Free balance widened to the facade's balance type
	pub fn free_u256(&self) -> U256 {
		U256::from(self.free)
	}
}

/// Metadata of an ERC20 token
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenInfo {
	pub name: String,
	pub symbol: String,
	pub decimals: u8,
	pub total_supply: U256,
}
