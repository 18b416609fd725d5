//! The two provider variants.

mod evm;
mod substrate;

pub use evm::EvmProvider;
pub use substrate::SubstrateProvider;
