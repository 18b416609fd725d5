//! Selendra SDK.
//!
//! One configuration driven facade over an EVM (alloy) or a Substrate (subxt)
//! backend. The facade picks the provider for the configured chain type,
//! manages the connection lifecycle with bounded linear reconnects, and
//! forwards balance, transfer and contract calls to the backend.
//!
//! ```no_run
//! use selendra_sdk::{utils::NATIVE_SYMBOL, ChainType, EventKind, SdkOptions, SelendraSdk};
//!
//! # async fn run() -> Result<(), selendra_sdk::SdkError> {
//! let sdk = SelendraSdk::new(
//! 	SdkOptions::default()
//! 		.with_chain_type(ChainType::EVM)
//! 		.with_endpoint("https://rpc.selendra.org"),
//! )?;
//! sdk.subscribe(EventKind::Reconnecting, |event| println!("{:?}", event));
//! sdk.connect().await?;
//!
//! let balance = sdk
//! 	.get_formatted_balance("0x742d35Cc6634C0532925a3b844Bc454e4438f44e", None)
//! 	.await?;
//! println!("{} {}", balance, NATIVE_SYMBOL);
//!
//! sdk.destroy().await?;
//! # Ok(())
//! # }
//! ```

pub mod models;
pub mod services;
pub mod utils;

pub use models::{
	AccountBalance, ChainMetadata, ChainType, ConfigError, ConnectionInfo, ConnectionState,
	HealthStatus, Network, SdkConfig, SdkOptions, TokenInfo,
};
pub use services::{
	events::{ChainEvent, EventEmitter, EventKind, SubscriptionId},
	sdk::{create_and_connect, create_sdk, LazySdk, SdkError, SdkEvent, SelendraSdk},
};
