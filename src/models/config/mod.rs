//! Configuration loading and validation.
//!
//! - `SdkOptions`: caller supplied, all fields optional
//! - `SdkConfig`: options merged over the defaults
//! - `ConfigLoader`: common interface for file backed configuration

use std::path::Path;

mod error;
mod sdk_config;

pub use error::ConfigError;
pub use sdk_config::{validate_options, SdkConfig, SdkOptions};

/// Common interface for loading configuration files
pub trait ConfigLoader: Sized {
	fn load_from_path(path: &Path) -> Result<Self, ConfigError>;

	fn validate(&self) -> Result<(), ConfigError>;

	fn is_json_file(path: &Path) -> bool {
		path.extension()
			.map(|ext| ext.to_string_lossy().to_lowercase() == "json")
			.unwrap_or(false)
	}
}
