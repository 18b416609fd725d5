//! Core services of the SDK.
//!
//! - `blockchain`: Backend clients and the EVM/Substrate providers
//! - `events`: Lifecycle event emitter shared by providers and the facade
//! - `sdk`: The unified facade and its factory helpers

pub mod blockchain;
pub mod events;
pub mod sdk;
