//! Convenience constructors and the lazily initialised SDK holder.

use once_cell::sync::OnceCell;

use crate::{
	models::SdkOptions,
	services::sdk::{SdkError, SelendraSdk},
};

/// Builds an SDK without connecting
pub fn create_sdk(options: SdkOptions) -> Result<SelendraSdk, SdkError> {
	SelendraSdk::new(options)
}

/// Builds an SDK and connects it
pub async fn create_and_connect(options: SdkOptions) -> Result<SelendraSdk, SdkError> {
	let sdk = SelendraSdk::new(options)?;
	sdk.connect().await?;
	Ok(sdk)
}

/// A single SDK instance, constructed on first use and torn down explicitly.
///
/// Applications keep one of these (typically in a `static`) instead of a
/// module level default instance:
///
/// ```no_run
/// use selendra_sdk::{LazySdk, SdkOptions};
///
/// static SDK: LazySdk = LazySdk::new();
///
/// # async fn run() -> Result<(), selendra_sdk::SdkError> {
/// let sdk = SDK.get_or_init(SdkOptions::default)?;
/// sdk.connect().await?;
/// // ...
/// SDK.shutdown().await?;
/// # Ok(())
/// # }
/// ```
pub struct LazySdk {
	cell: OnceCell<SelendraSdk>,
}

impl Default for LazySdk {
	fn default() -> Self {
		Self::new()
	}
}

impl LazySdk {
	pub const fn new() -> Self {
		Self {
			cell: OnceCell::new(),
		}
	}

	/// The instance, constructing it from `options` the first time. Later
	/// calls ignore `options`.
	pub fn get_or_init<F>(&self, options: F) -> Result<&SelendraSdk, SdkError>
	where
		F: FnOnce() -> SdkOptions,
	{
		self.cell.get_or_try_init(|| SelendraSdk::new(options()))
	}

	/// The instance if it has been constructed
	pub fn get(&self) -> Option<&SelendraSdk> {
		self.cell.get()
	}

	/// Destroys the instance if it was ever constructed
	pub async fn shutdown(&self) -> Result<(), SdkError> {
		match self.cell.get() {
			Some(sdk) => sdk.destroy().await,
			None => Ok(()),
		}
	}
}
