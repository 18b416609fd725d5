//! Configuration error types.
//!
//! Every variant names where the bad input came from: the option key, the
//! environment variable or the file. Constructors log before returning.

use log::error;
use std::{fmt, path::PathBuf};

/// Why a set of SDK options was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
	/// The options document is not a JSON object
	NotAnObject,

	/// An option holds a value of the wrong type or range
	InvalidField { field: String, reason: String },

	/// A `SELENDRA_*` variable could not be read as its option type
	InvalidEnvVar {
		name: String,
		value: String,
		reason: String,
	},

	/// The document is not JSON, or does not have the options shape
	MalformedJson(String),

	/// An options file could not be used
	FileError { path: PathBuf, reason: String },
}

impl ConfigError {
	/// The problem without the category prefix
	pub fn detail(&self) -> String {
		match self {
			Self::NotAnObject => "options must be a JSON object".to_string(),
			Self::InvalidField { field, reason } => format!("{} {}", field, reason),
			Self::InvalidEnvVar {
				name,
				value,
				reason,
			} => format!("{}='{}': {}", name, value, reason),
			Self::MalformedJson(msg) => msg.clone(),
			Self::FileError { path, reason } => format!("{}: {}", path.display(), reason),
		}
	}

	/// The option key or environment variable at fault, if there is one
	pub fn source_name(&self) -> Option<&str> {
		match self {
			Self::InvalidField { field, .. } => Some(field),
			Self::InvalidEnvVar { name, .. } => Some(name),
			_ => None,
		}
	}

	fn format_message(&self) -> String {
		match self {
			Self::NotAnObject | Self::InvalidField { .. } => {
				format!("Invalid configuration: {}", self.detail())
			}
			Self::InvalidEnvVar { .. } => format!("Invalid environment variable {}", self.detail()),
			Self::MalformedJson(_) => format!("Malformed options JSON: {}", self.detail()),
			Self::FileError { .. } => format!("Cannot load options from {}", self.detail()),
		}
	}

	fn logged(self) -> Self {
		error!("{}", self.format_message());
		self
	}

	pub fn not_an_object() -> Self {
		Self::NotAnObject.logged()
	}

	/// `reason` reads after the field name, e.g. "must be a positive number"
	pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::InvalidField {
			field: field.into(),
			reason: reason.into(),
		}
		.logged()
	}

	pub fn invalid_env_var(
		name: impl Into<String>,
		value: impl Into<String>,
		reason: impl Into<String>,
	) -> Self {
		Self::InvalidEnvVar {
			name: name.into(),
			value: value.into(),
			reason: reason.into(),
		}
		.logged()
	}

	pub fn file_error(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
		Self::FileError {
			path: path.into(),
			reason: reason.to_string(),
		}
		.logged()
	}
}

impl fmt::Display for ConfigError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
	fn from(err: serde_json::Error) -> Self {
		Self::MalformedJson(err.to_string()).logged()
	}
}
