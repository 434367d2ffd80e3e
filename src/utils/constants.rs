//! Gateway constants and defaults.
//!
//! Node defaults, amount scaling and the environment variable names the
//! configuration layer honours are all defined here.

use rust_decimal::Decimal;

// ═══════════════════════════════════════════════════════════════════════════════
// COIN CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Currency tag of the coin handled by the gateway
pub const DEFAULT_CURRENCY: &str = "LTC";

/// Minor units per coin (1 coin = 100,000,000 minor units)
pub const DEFAULT_COIN_FACTOR: u64 = 100_000_000;

/// Decimal places kept when converting minor units back to coins
pub const DEFAULT_ROUND_PRECISION: u32 = 8;

/// Largest display precision a decimal amount can carry
pub const MAX_ROUND_PRECISION: u32 = 28;

/// Smallest amount worth optimising a selection for (0.0000001)
pub const DEFAULT_MIN_OPTIMIZED_AMOUNT: Decimal = Decimal::from_parts(1, 0, 0, false, 7);

// ═══════════════════════════════════════════════════════════════════════════════
// NODE CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Default JSON-RPC endpoint of a local node
pub const DEFAULT_NODE_URL: &str = "http://127.0.0.1:9332";

/// Default request timeout in seconds
pub const DEFAULT_NODE_TIMEOUT_SECS: u64 = 30;

// ═══════════════════════════════════════════════════════════════════════════════
// ENVIRONMENT VARIABLES
// ═══════════════════════════════════════════════════════════════════════════════

/// Path of the JSON configuration file
pub const ENV_CONFIG: &str = "UTXO_GATEWAY_CONFIG";

/// Node URL override
pub const ENV_NODE_URL: &str = "UTXO_GATEWAY_NODE_URL";

/// Node RPC user override
pub const ENV_NODE_USER: &str = "UTXO_GATEWAY_NODE_USER";

/// Node RPC password override
pub const ENV_NODE_PASSWORD: &str = "UTXO_GATEWAY_NODE_PASSWORD";

/// Deployment environment override (`prod`, `debug`, `test`)
pub const ENV_ENVIRONMENT: &str = "UTXO_GATEWAY_ENVIRONMENT";
