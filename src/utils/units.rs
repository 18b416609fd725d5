//! Conversions between smallest-unit integers and human decimal amounts.
//!
//! Balances are carried as `U256` so that values at the 10^18 scale (and far
//! beyond) never lose precision. The float conversion exists only for display.

use alloy::primitives::{
	utils::{format_units as alloy_format_units, parse_units as alloy_parse_units},
	U256,
};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConversionError {
	#[error("Invalid amount '{0}': {1}")]
	InvalidAmount(String, String),

	#[error("Negative amounts are not allowed: {0}")]
	NegativeAmount(String),

	#[error("Unsupported number of decimals: {0}")]
	InvalidDecimals(u8),
}

/// Parses a decimal amount such as `"1.5"` into the smallest unit
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, ConversionError> {
	let trimmed = amount.trim();
	if trimmed.starts_with('-') {
		return Err(ConversionError::NegativeAmount(trimmed.to_string()));
	}
	alloy_parse_units(trimmed, decimals)
		.map(Into::into)
		.map_err(|e| ConversionError::InvalidAmount(trimmed.to_string(), e.to_string()))
}

/// Formats a smallest-unit value as an exact decimal string
pub fn format_amount(value: U256, decimals: u8) -> Result<String, ConversionError> {
	alloy_format_units(value, decimals).map_err(|_| ConversionError::InvalidDecimals(decimals))
}

/// Divides a smallest-unit value by `10^decimals` and returns a float
/// approximation
pub fn to_display_float(value: U256, decimals: u8) -> Result<f64, ConversionError> {
	let formatted = format_amount(value, decimals)?;
	formatted
		.parse::<f64>()
		.map_err(|e| ConversionError::InvalidAmount(formatted, e.to_string()))
}
