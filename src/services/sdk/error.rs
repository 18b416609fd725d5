//! SDK facade error types.

use log::error;

use crate::{
	models::{ChainType, ConfigError},
	services::blockchain::ProviderError,
};

/// Errors surfaced by the SDK facade
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdkError {
	/// Options failed validation at construction or in `with_options`
	InvalidConfiguration(String),

	/// A data operation was called while the facade is not connected
	NotConnected,

	/// A chain specific operation was called on the other chain type
	WrongChainType {
		operation: String,
		expected: ChainType,
		actual: ChainType,
	},

	/// Failure reported by the active provider
	Provider(ProviderError),
}

impl SdkError {
	fn format_message(&self) -> String {
		match self {
			Self::InvalidConfiguration(msg) => format!("Invalid configuration: {}", msg),
			Self::NotConnected => "SDK is not connected".to_string(),
			Self::WrongChainType {
				operation,
				expected,
				actual,
			} => format!(
				"{} is only available on {} chains (current: {})",
				operation, expected, actual
			),
			Self::Provider(err) => err.to_string(),
		}
	}

	/// Creates a new chain type mismatch error with logging
	pub fn wrong_chain_type(operation: &str, expected: ChainType, actual: ChainType) -> Self {
		let error = Self::WrongChainType {
			operation: operation.to_string(),
			expected,
			actual,
		};
		error!("{}", error.format_message());
		error
	}

	pub fn is_connection_timeout(&self) -> bool {
		matches!(self, Self::Provider(ProviderError::ConnectionTimeout(_)))
	}
}

impl std::fmt::Display for SdkError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl std::error::Error for SdkError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Provider(err) => Some(err),
			_ => None,
		}
	}
}

impl From<ConfigError> for SdkError {
	fn from(err: ConfigError) -> Self {
		// ConfigError already logged itself
		Self::InvalidConfiguration(err.detail())
	}
}

impl From<ProviderError> for SdkError {
	fn from(err: ProviderError) -> Self {
		match err {
			ProviderError::NotConnected => Self::NotConnected,
			other => Self::Provider(other),
		}
	}
}
