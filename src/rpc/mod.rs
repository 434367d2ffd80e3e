//! Node access layer.
//!
//! Everything the core knows about the node goes through [`NodeRpc`]:
//! - [`NodeClient`]: JSON-RPC over HTTP against a running node
//! - [`ProxyGuard`]: caps the number of calls in flight (the node accepts one)
//! - [`types`]: the records the node returns
//!
//! Services hold an `Arc<dyn NodeRpc>`, so tests swap in a scripted node.

pub mod client;
pub mod guard;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use client::*;
pub use guard::*;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::{OutPoint, UnspentOutput};

/// Result type alias for node calls
pub type NodeResult<T> = std::result::Result<T, NodeError>;

/// Failure of a single node call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// The request did not reach the node or the response did not arrive
    #[error("transport failure: {0}")]
    Transport(String),

    /// The node answered with a failure status and no JSON-RPC error body
    #[error("unexpected HTTP status {0}")]
    HttpStatus(u16),

    /// The node answered with a JSON-RPC error object
    #[error("rpc error {code}: {message}")]
    Rpc {
        /// Node error code
        code: i64,
        /// Node error message
        message: String,
    },

    /// The node answered without a result
    #[error("empty response")]
    EmptyResponse,

    /// The result could not be decoded into the expected record
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The access guard was shut down
    #[error("node access guard closed")]
    GuardClosed,
}

impl NodeError {
    /// Returns true if the node itself answered with an error, as opposed
    /// to the node being unreachable or misbehaving
    pub fn is_rpc(&self) -> bool {
        matches!(self, NodeError::Rpc { .. })
    }

    /// Node error code, if the node answered with one
    pub fn rpc_code(&self) -> Option<i64> {
        match self {
            NodeError::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for NodeError {
    fn from(e: serde_json::Error) -> Self {
        NodeError::Decode(e.to_string())
    }
}

/// Request/response interface of the node.
///
/// One method per node call; each call is one round trip.
#[async_trait]
pub trait NodeRpc: Send + Sync {
    /// Enumerate spendable outputs owned by any of `addresses`
    async fn list_unspent(&self, addresses: &[String]) -> NodeResult<Vec<UnspentOutput>>;

    /// Build an unsigned transaction, returning its hex
    async fn create_raw_transaction(
        &self,
        inputs: &[OutPoint],
        outputs: &OutputMap,
    ) -> NodeResult<String>;

    /// Sign a raw transaction with the node's managed keys
    async fn sign_raw_transaction(&self, raw: &str) -> NodeResult<SignedTransaction>;

    /// Broadcast a signed transaction, returning its ID
    async fn send_raw_transaction(&self, signed_hex: &str) -> NodeResult<String>;

    /// Fetch the raw hex of a transaction
    async fn get_raw_transaction(&self, txid: &str) -> NodeResult<String>;

    /// Decode raw transaction hex
    async fn decode_raw_transaction(&self, raw: &str) -> NodeResult<DecodedTransaction>;

    /// Hash of the block at `height` on the best chain
    async fn get_block_hash(&self, height: u64) -> NodeResult<String>;

    /// Block header data and transaction IDs
    async fn get_block(&self, hash: &str) -> NodeResult<Block>;

    /// Wallet-relative view of a transaction
    async fn get_transaction(&self, txid: &str) -> NodeResult<WalletTransaction>;

    /// Chain height and node status
    async fn get_info(&self) -> NodeResult<NodeInfo>;

    /// Check an address for validity and ownership
    async fn validate_address(&self, address: &str) -> NodeResult<AddressValidation>;

    /// Mint a new receiving address in the node's wallet
    async fn get_new_address(&self) -> NodeResult<String>;
}
