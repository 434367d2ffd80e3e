//! Gateway facade.
//!
//! [`CoinGateway`] wires one node handle, guarded by a [`ProxyGuard`], into
//! every coin service and exposes the operations the orchestration layer
//! calls.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use utxo_gateway::prelude::*;
//!
//! let config = GatewayConfig::load("gateway.json")?.with_env_overrides()?;
//! let gateway = CoinGateway::connect(&config)?;
//!
//! let height = gateway.get_height_of_highest_block().await?;
//! let txs = gateway.get_transactions_of_block(height).await?;
//! ```

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::debug;

use crate::coin::{AddressFactory, AddressValidator, ChainQueryService, TransactionService};
use crate::core::config::GatewayConfig;
use crate::core::types::{Transaction, TransactionAttempt};
use crate::error::Result;
use crate::rpc::{NodeClient, NodeRpc, ProxyGuard};
use crate::utils::convert::IntegerConverter;

/// Coin-handling core of the payment gateway
#[derive(Debug)]
pub struct CoinGateway {
    addresses: AddressFactory,
    validator: AddressValidator,
    query: ChainQueryService,
    transactions: TransactionService,
    converter: IntegerConverter,
}

impl CoinGateway {
    /// Validate `config` and connect to the configured node
    pub fn connect(config: &GatewayConfig) -> Result<Self> {
        config.validate()?;

        let client = NodeClient::new(&config.node)?;
        debug!(
            endpoint = %client.endpoint(),
            max_parallel_access = config.node.max_parallel_access,
            "connecting to node"
        );
        let guard = ProxyGuard::new(client, config.node.max_parallel_access)?;

        Self::with_node(Arc::new(guard), config)
    }

    /// Build the gateway over an existing node handle.
    ///
    /// The handle is used as is; wrap it in a [`ProxyGuard`] if the node
    /// needs its calls limited.
    pub fn with_node(node: Arc<dyn NodeRpc>, config: &GatewayConfig) -> Result<Self> {
        Ok(Self {
            addresses: AddressFactory::new(node.clone()),
            validator: AddressValidator::new(node.clone()),
            query: ChainQueryService::new(node.clone()),
            transactions: TransactionService::with_min_optimized_amount(
                node,
                config.min_optimized_amount,
            ),
            converter: IntegerConverter::from_config(config)?,
        })
    }

    /// Minor-unit converter for the configured coin
    pub fn converter(&self) -> &IntegerConverter {
        &self.converter
    }

    /// Create a new receiving address
    pub async fn create_address(&self) -> Result<String> {
        self.addresses.create_address().await
    }

    /// Whether the node accepts `address`
    pub async fn validate_address(&self, address: &str) -> Result<bool> {
        self.validator.validate_address(address).await
    }

    /// Resolve a transaction
    pub async fn get_transaction(&self, txid: &str) -> Result<Transaction> {
        self.query.get_transaction(txid).await
    }

    /// Resolve a transaction, reporting an unknown ID explicitly
    pub async fn get_transaction_by_tx(&self, txid: &str) -> Result<Transaction> {
        self.query.get_transaction_by_tx(txid).await
    }

    /// Resolve every transaction of a block, in block order
    pub async fn get_transactions_of_block(&self, height: u64) -> Result<Vec<Transaction>> {
        self.query.get_transactions_of_block(height).await
    }

    /// Net effect of a transaction on the node's wallet
    pub async fn get_amount_of_transaction(&self, txid: &str) -> Result<Decimal> {
        self.query.get_amount_of_transaction(txid).await
    }

    /// Height of the node's best chain
    pub async fn get_height_of_highest_block(&self) -> Result<u64> {
        self.query.get_height_of_highest_block().await
    }

    /// Fund, sign and broadcast an outgoing payment
    pub async fn send(&self, attempt: &TransactionAttempt) -> Result<Transaction> {
        self.transactions.send(attempt).await
    }
}
