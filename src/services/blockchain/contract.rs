//! Minimal contract interfaces built from human readable signatures.

use alloy::{
	dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt},
	json_abi::{Function, JsonAbi},
	primitives::Bytes,
};

use crate::services::blockchain::ProviderError;

/// ERC20 functions used by the token helpers
pub const ERC20_SIGNATURES: [&str; 8] = [
	"function name() view returns (string)",
	"function symbol() view returns (string)",
	"function decimals() view returns (uint8)",
	"function totalSupply() view returns (uint256)",
	"function balanceOf(address owner) view returns (uint256)",
	"function transfer(address to, uint256 amount) returns (bool)",
	"function approve(address spender, uint256 amount) returns (bool)",
	"function allowance(address owner, address spender) view returns (uint256)",
];

/// A contract ABI assembled from a list of function signatures such as
/// `"function balanceOf(address) view returns (uint256)"`
#[derive(Debug, Clone)]
pub struct ContractInterface {
	abi: JsonAbi,
}

impl ContractInterface {
	pub fn parse<S: AsRef<str>>(signatures: &[S]) -> Result<Self, ProviderError> {
		let abi = JsonAbi::parse(signatures.iter().map(AsRef::as_ref))
			.map_err(|e| ProviderError::invalid_argument(format!("Invalid ABI signature: {}", e)))?;
		Ok(Self { abi })
	}

	pub fn erc20() -> Result<Self, ProviderError> {
		Self::parse(&ERC20_SIGNATURES)
	}

	/// The overload of `name` taking `arg_count` inputs
	pub fn function(&self, name: &str, arg_count: usize) -> Result<&Function, ProviderError> {
		self.abi
			.function(name)
			.and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == arg_count))
			.ok_or_else(|| {
				ProviderError::invalid_argument(format!(
					"Function {} with {} argument(s) not found in interface",
					name, arg_count
				))
			})
	}

	/// Selector followed by the ABI encoded arguments
	pub fn encode_call(&self, name: &str, args: &[DynSolValue]) -> Result<Bytes, ProviderError> {
		let function = self.function(name, args.len())?;
		function
			.abi_encode_input(args)
			.map(Bytes::from)
			.map_err(|e| {
				ProviderError::invalid_argument(format!("Failed to encode {} arguments: {}", name, e))
			})
	}

	pub fn decode_output(
		&self,
		name: &str,
		arg_count: usize,
		data: &[u8],
	) -> Result<Vec<DynSolValue>, ProviderError> {
		let function = self.function(name, arg_count)?;
		function.abi_decode_output(data).map_err(|e| {
			ProviderError::operation_error(format!("Failed to decode {} output: {}", name, e))
		})
	}
}
