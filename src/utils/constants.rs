//! Constants shared across the SDK.

/// Default Substrate websocket endpoint for Selendra mainnet
pub const DEFAULT_SUBSTRATE_ENDPOINT: &str = "wss://rpc.selendra.org";

/// Default EVM JSON-RPC endpoint for Selendra mainnet
pub const DEFAULT_EVM_ENDPOINT: &str = "https://rpc.selendra.org";

/// Default Substrate websocket endpoint for Selendra testnet
pub const DEFAULT_TESTNET_SUBSTRATE_ENDPOINT: &str = "wss://rpc-testnet.selendra.org";

/// Default EVM JSON-RPC endpoint for Selendra testnet
pub const DEFAULT_TESTNET_EVM_ENDPOINT: &str = "https://rpc-testnet.selendra.org";

/// Default connection timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default number of facade-level reconnect attempts
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Default base delay between reconnect attempts in milliseconds
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;

/// Decimals of the native SEL currency on both chain types
pub const NATIVE_DECIMALS: u8 = 18;

/// Symbol of the native currency
pub const NATIVE_SYMBOL: &str = "SEL";

/// URL schemes accepted for endpoints
pub const SUPPORTED_ENDPOINT_SCHEMES: [&str; 4] = ["ws", "wss", "http", "https"];

/// Environment variable prefix used by `SdkOptions::from_env`
pub const ENV_PREFIX: &str = "SELENDRA_";
