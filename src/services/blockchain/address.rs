//! Address parsing and the EVM / Substrate account mapping.
//!
//! An EVM address maps onto a 32 byte account as the `0x6d` tag, the 20
//! address bytes, then zero padding. Accounts without that layout map back
//! to the last 20 bytes of their keccak256 hash.

use alloy::primitives::{keccak256, Address};
use std::{fmt, str::FromStr};
use subxt::utils::AccountId32;

use crate::{models::ChainType, services::blockchain::ProviderError};

const EVM_ACCOUNT_TAG: u8 = 0x6d;

/// Parses a 0x-prefixed hex address
pub fn parse_evm_address(address: &str) -> Result<Address, ProviderError> {
	Address::from_str(address.trim())
		.map_err(|e| ProviderError::invalid_argument(format!("Invalid EVM address '{}': {}", address, e)))
}

/// Parses an SS58 address
pub fn parse_ss58_address(address: &str) -> Result<AccountId32, ProviderError> {
	AccountId32::from_str(address.trim()).map_err(|e| {
		ProviderError::invalid_argument(format!("Invalid SS58 address '{}': {}", address, e))
	})
}

/// Account that receives the balance of `address` on the Substrate side
pub fn evm_to_substrate(address: Address) -> AccountId32 {
	let mut account = [0u8; 32];
	account[0] = EVM_ACCOUNT_TAG;
	account[1..21].copy_from_slice(address.as_slice());
	AccountId32(account)
}

/// Inverse of [`evm_to_substrate`] for mapped accounts, keccak256 derived
/// otherwise
pub fn substrate_to_evm(account: &AccountId32) -> Address {
	let bytes = &account.0;
	if bytes[0] == EVM_ACCOUNT_TAG && bytes[21..].iter().all(|b| *b == 0) {
		Address::from_slice(&bytes[1..21])
	} else {
		Address::from_slice(&keccak256(bytes)[12..])
	}
}

/// An address of either chain family
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainAddress {
	Evm(Address),
	Substrate(AccountId32),
}

impl ChainAddress {
	/// Hex input is read as EVM, anything else as SS58. The zero address
	/// of either family is rejected.
	pub fn parse(address: &str) -> Result<Self, ProviderError> {
		let trimmed = address.trim();
		let parsed = if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
			Self::Evm(parse_evm_address(trimmed)?)
		} else {
			Self::Substrate(parse_ss58_address(trimmed)?)
		};

		if parsed.is_zero() {
			return Err(ProviderError::invalid_argument(format!(
				"'{}' is the zero address",
				trimmed
			)));
		}
		Ok(parsed)
	}

	pub fn chain_type(&self) -> ChainType {
		match self {
			Self::Evm(_) => ChainType::EVM,
			Self::Substrate(_) => ChainType::Substrate,
		}
	}

	pub fn is_zero(&self) -> bool {
		match self {
			Self::Evm(address) => address.is_zero(),
			Self::Substrate(account) => account.0.iter().all(|b| *b == 0),
		}
	}

	/// The same account expressed for the other chain family
	pub fn counterpart(&self) -> Self {
		match self {
			Self::Evm(address) => Self::Substrate(evm_to_substrate(*address)),
			Self::Substrate(account) => Self::Evm(substrate_to_evm(account)),
		}
	}
}

impl fmt::Display for ChainAddress {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Evm(address) => write!(f, "{}", address.to_checksum(None)),
			Self::Substrate(account) => write!(f, "{}", account),
		}
	}
}

impl FromStr for ChainAddress {
	type Err = ProviderError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}
