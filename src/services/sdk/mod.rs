//! The SDK facade, its errors and factory helpers.

mod error;
mod factory;
#[allow(clippy::module_inception)]
mod sdk;

pub use error::SdkError;
pub use factory::{create_and_connect, create_sdk, LazySdk};
pub use sdk::{SdkEvent, SelendraSdk};
