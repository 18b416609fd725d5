//! Provider error types and handling.
//!
//! Errors raised by the EVM and Substrate providers: connection failures,
//! argument validation and wrapped backend failures. Every variant carries
//! its message as a string so errors can be cloned into events and returned
//! to the caller at the same time.

use log::error;

/// Represents possible errors that can occur in a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
	/// `connect()` was called without a usable endpoint
	MissingEndpoint,

	/// The connection attempt did not finish within the configured timeout
	ConnectionTimeout(String),

	/// The transport could not be opened or closed
	ConnectionError(String),

	/// An operation needed a live client but none is held
	NotConnected,

	/// A caller supplied value (address, key, amount, ABI) was rejected
	InvalidArgument(String),

	/// The backend library failed while serving a call
	OperationError(String),
}

impl ProviderError {
	fn format_message(&self) -> String {
		match self {
			Self::MissingEndpoint => "No endpoint configured".to_string(),
			Self::ConnectionTimeout(msg) => format!("Connection timeout: {}", msg),
			Self::ConnectionError(msg) => format!("Connection error: {}", msg),
			Self::NotConnected => "Provider is not connected".to_string(),
			Self::InvalidArgument(msg) => format!("Invalid argument: {}", msg),
			Self::OperationError(msg) => format!("Operation failed: {}", msg),
		}
	}

	/// Creates a new missing endpoint error with logging
	pub fn missing_endpoint() -> Self {
		let error = Self::MissingEndpoint;
		error!("{}", error.format_message());
		error
	}

	/// Creates a new timeout error with logging
	pub fn connection_timeout(msg: impl Into<String>) -> Self {
		let error = Self::ConnectionTimeout(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new connection error with logging
	pub fn connection_error(msg: impl Into<String>) -> Self {
		let error = Self::ConnectionError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new invalid argument error with logging
	pub fn invalid_argument(msg: impl Into<String>) -> Self {
		let error = Self::InvalidArgument(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Creates a new operation error with logging
	pub fn operation_error(msg: impl Into<String>) -> Self {
		let error = Self::OperationError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Whether the error came out of a connection attempt
	pub fn is_connection_failure(&self) -> bool {
		matches!(
			self,
			Self::MissingEndpoint | Self::ConnectionTimeout(_) | Self::ConnectionError(_)
		)
	}
}

impl std::fmt::Display for ProviderError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl std::error::Error for ProviderError {}

impl From<crate::utils::units::ConversionError> for ProviderError {
	fn from(err: crate::utils::units::ConversionError) -> Self {
		Self::invalid_argument(err.to_string())
	}
}
