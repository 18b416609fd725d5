//! SDK options and the merged configuration.
//!
//! `SdkOptions` is what the caller supplies: every field optional, read from
//! code, JSON, a file or `SELENDRA_*` environment variables. `SdkConfig` is
//! the result of overlaying those options on the defaults.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{env, path::Path, str::FromStr, time::Duration};
use url::Url;

use crate::{
	models::{ChainType, ConfigLoader, Network},
	utils::{
		constants::{
			DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY_MS, DEFAULT_TIMEOUT_MS, ENV_PREFIX,
			SUPPORTED_ENDPOINT_SCHEMES,
		},
		ReconnectPolicy,
	},
};

use super::error::ConfigError;

/// User supplied options. Absent fields take the defaults on merge.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SdkOptions {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub endpoint: Option<String>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub chain_type: Option<ChainType>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub network: Option<Network>,

	/// Connection timeout in milliseconds
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub timeout: Option<u64>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub retry_attempts: Option<u32>,

	/// Base reconnect delay in milliseconds
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub retry_delay: Option<u64>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub auto_reconnect: Option<bool>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub debug: Option<bool>,
}

impl SdkOptions {
	pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.endpoint = Some(endpoint.into());
		self
	}

	pub fn with_chain_type(mut self, chain_type: ChainType) -> Self {
		self.chain_type = Some(chain_type);
		self
	}

	pub fn with_network(mut self, network: Network) -> Self {
		self.network = Some(network);
		self
	}

	pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
		self.timeout = Some(timeout_ms);
		self
	}

	pub fn with_retry(mut self, attempts: u32, delay_ms: u64) -> Self {
		self.retry_attempts = Some(attempts);
		self.retry_delay = Some(delay_ms);
		self
	}

	pub fn with_auto_reconnect(mut self, enabled: bool) -> Self {
		self.auto_reconnect = Some(enabled);
		self
	}

	pub fn with_debug(mut self, enabled: bool) -> Self {
		self.debug = Some(enabled);
		self
	}

	/// Parses options from a JSON document, validating the raw values first
	pub fn from_json(json: &str) -> Result<Self, ConfigError> {
		let raw: Value = serde_json::from_str(json)?;
		Self::from_value(raw)
	}

	/// Builds options from an already parsed JSON value
	pub fn from_value(raw: Value) -> Result<Self, ConfigError> {
		validate_options(&raw)?;
		let options: SdkOptions = serde_json::from_value(raw)?;
		options.validate()?;
		Ok(options)
	}

	/// Reads `SELENDRA_*` variables, loading a `.env` file first if present
	pub fn from_env() -> Result<Self, ConfigError> {
		dotenvy::dotenv().ok();

		let options = Self {
			endpoint: env_var("ENDPOINT")?,
			chain_type: env_var("CHAIN_TYPE")?,
			network: env_var("NETWORK")?,
			timeout: env_var("TIMEOUT_MS")?,
			retry_attempts: env_var("RETRY_ATTEMPTS")?,
			retry_delay: env_var("RETRY_DELAY_MS")?,
			auto_reconnect: env_flag("AUTO_RECONNECT")?,
			debug: env_flag("DEBUG")?,
		};
		options.validate()?;
		Ok(options)
	}
}

impl ConfigLoader for SdkOptions {
	fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		if !Self::is_json_file(path) {
			return Err(ConfigError::file_error(path, "not a JSON file"));
		}
		let contents =
			std::fs::read_to_string(path).map_err(|e| ConfigError::file_error(path, e))?;
		Self::from_json(&contents)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if let Some(endpoint) = &self.endpoint {
			validate_endpoint(endpoint)?;
		}

		if self.timeout == Some(0) {
			return Err(ConfigError::invalid_field("timeout", "must be a positive number"));
		}

		Ok(())
	}
}

/// Checks raw user input before it is deserialized or merged with defaults
pub fn validate_options(raw: &Value) -> Result<(), ConfigError> {
	let Some(fields) = raw.as_object() else {
		return Err(ConfigError::not_an_object());
	};

	if let Some(endpoint) = fields.get("endpoint") {
		if !endpoint.is_string() {
			return Err(ConfigError::invalid_field("endpoint", "must be a string"));
		}
	}

	if let Some(timeout) = fields.get("timeout") {
		if !timeout.as_f64().is_some_and(|t| t > 0.0) {
			return Err(ConfigError::invalid_field("timeout", "must be a positive number"));
		}
	}

	for key in ["retryAttempts", "retryDelay"] {
		if let Some(value) = fields.get(key) {
			if !value.as_f64().is_some_and(|v| v >= 0.0) {
				return Err(ConfigError::invalid_field(key, "must be a non-negative number"));
			}
		}
	}

	Ok(())
}

fn validate_endpoint(endpoint: &str) -> Result<(), ConfigError> {
	if endpoint.trim().is_empty() {
		return Err(ConfigError::invalid_field("endpoint", "must not be empty"));
	}

	let url = Url::parse(endpoint).map_err(|e| {
		ConfigError::invalid_field("endpoint", format!("'{}' is not a URL: {}", endpoint, e))
	})?;
	if !SUPPORTED_ENDPOINT_SCHEMES.contains(&url.scheme()) {
		return Err(ConfigError::invalid_field(
			"endpoint",
			format!(
				"scheme must be one of: {}",
				SUPPORTED_ENDPOINT_SCHEMES.join(", ")
			),
		));
	}

	Ok(())
}

fn env_var<T>(suffix: &str) -> Result<Option<T>, ConfigError>
where
	T: FromStr,
	T::Err: std::fmt::Display,
{
	let name = format!("{}{}", ENV_PREFIX, suffix);
	match env::var(&name) {
		Ok(value) if value.trim().is_empty() => Ok(None),
		Ok(value) => value
			.trim()
			.parse::<T>()
			.map(Some)
			.map_err(|e| ConfigError::invalid_env_var(&name, value.trim(), e.to_string())),
		Err(env::VarError::NotPresent) => Ok(None),
		Err(env::VarError::NotUnicode(raw)) => Err(ConfigError::invalid_env_var(
			&name,
			raw.to_string_lossy(),
			"not valid unicode",
		)),
	}
}

fn env_flag(suffix: &str) -> Result<Option<bool>, ConfigError> {
	let Some(value) = env_var::<String>(suffix)? else {
		return Ok(None);
	};
	match value.to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(Some(true)),
		"0" | "false" | "no" | "off" => Ok(Some(false)),
		other => Err(ConfigError::invalid_env_var(
			format!("{}{}", ENV_PREFIX, suffix),
			other,
			"expected a boolean",
		)),
	}
}

/// Effective configuration held by the facade
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SdkConfig {
	/// `None` only for a custom network without an explicit endpoint
	pub endpoint: Option<String>,
	pub chain_type: ChainType,
	pub network: Network,
	/// Milliseconds
	pub timeout: u64,
	pub retry_attempts: u32,
	/// Milliseconds
	pub retry_delay: u64,
	pub auto_reconnect: bool,
	pub debug: bool,
}

impl Default for SdkConfig {
	fn default() -> Self {
		Self::merge(&SdkOptions::default())
	}
}

impl SdkConfig {
	/// Overlays `options` on the defaults
	pub fn merge(options: &SdkOptions) -> Self {
		let chain_type = options.chain_type.unwrap_or_default();
		let network = options.network.unwrap_or_default();
		let endpoint = options
			.endpoint
			.clone()
			.or_else(|| network.default_endpoint(chain_type).map(str::to_string));

		Self {
			endpoint,
			chain_type,
			network,
			timeout: options.timeout.unwrap_or(DEFAULT_TIMEOUT_MS),
			retry_attempts: options.retry_attempts.unwrap_or(DEFAULT_RETRY_ATTEMPTS),
			retry_delay: options.retry_delay.unwrap_or(DEFAULT_RETRY_DELAY_MS),
			auto_reconnect: options.auto_reconnect.unwrap_or(true),
			debug: options.debug.unwrap_or(false),
		}
	}

	/// Overlays `options` on this configuration, leaving absent fields as they are
	pub fn apply(&mut self, options: &SdkOptions) {
		if let Some(chain_type) = options.chain_type {
			self.chain_type = chain_type;
		}
		if let Some(network) = options.network {
			self.set_network(network);
		}
		if let Some(endpoint) = &options.endpoint {
			self.endpoint = Some(endpoint.clone());
		}
		if let Some(timeout) = options.timeout {
			self.timeout = timeout;
		}
		if let Some(attempts) = options.retry_attempts {
			self.retry_attempts = attempts;
		}
		if let Some(delay) = options.retry_delay {
			self.retry_delay = delay;
		}
		if let Some(auto_reconnect) = options.auto_reconnect {
			self.auto_reconnect = auto_reconnect;
		}
		if let Some(debug) = options.debug {
			self.debug = debug;
		}
	}

	/// Switches network; known networks also replace the endpoint with their
	/// default for the current chain type
	pub fn set_network(&mut self, network: Network) {
		self.network = network;
		if let Some(endpoint) = network.default_endpoint(self.chain_type) {
			self.endpoint = Some(endpoint.to_string());
		}
	}

	pub fn timeout_duration(&self) -> Duration {
		Duration::from_millis(self.timeout)
	}

	pub fn reconnect_policy(&self) -> ReconnectPolicy {
		ReconnectPolicy::new(self.retry_attempts, Duration::from_millis(self.retry_delay))
	}
}
