//! Transaction resolution.
//!
//! Receivers come straight from a transaction's outputs. Senders need one
//! extra lookup per input: the prior transaction is fetched and the address
//! on the spent output is read. Unresolvable entries (coinbase inputs,
//! non-standard scripts, dangling output indices) are skipped.

use std::sync::Arc;

use futures::future::try_join_all;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::core::types::{Transaction, TransactionReceiver, TransactionSender};
use crate::error::{Error, Result};
use crate::rpc::types::DecodedTransaction;
use crate::rpc::NodeRpc;

/// Resolves transactions and blocks through the node
#[derive(Clone)]
pub struct ChainQueryService {
    node: Arc<dyn NodeRpc>,
}

impl std::fmt::Debug for ChainQueryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainQueryService").finish_non_exhaustive()
    }
}

impl ChainQueryService {
    /// Create a resolver over a shared node handle
    pub fn new(node: Arc<dyn NodeRpc>) -> Self {
        Self { node }
    }

    async fn fetch_decoded(&self, txid: &str) -> Result<DecodedTransaction> {
        let raw = self.node.get_raw_transaction(txid).await?;
        Ok(self.node.decode_raw_transaction(&raw).await?)
    }

    /// Resolve a transaction into its receivers and senders
    pub async fn get_transaction(&self, txid: &str) -> Result<Transaction> {
        let decoded = self.fetch_decoded(txid).await?;

        let mut receivers = Vec::new();
        for output in &decoded.vout {
            for address in output.script_pub_key.resolvable_addresses() {
                receivers.push(TransactionReceiver::new(address, output.value));
            }
        }

        let mut senders: Vec<TransactionSender> = Vec::new();
        for input in &decoded.vin {
            let Some((prev_txid, prev_vout)) = input.previous_output() else {
                continue;
            };

            let prev = self.fetch_decoded(prev_txid).await?;
            let Some(spent) = prev.vout.get(prev_vout as usize) else {
                warn!(
                    txid,
                    prev_txid,
                    prev_vout,
                    outputs = prev.vout.len(),
                    "input references missing output, skipping"
                );
                continue;
            };

            for address in spent.script_pub_key.resolvable_addresses() {
                if !senders.iter().any(|s| s.address == address) {
                    senders.push(TransactionSender::new(address));
                }
            }
        }

        debug!(
            txid,
            receivers = receivers.len(),
            senders = senders.len(),
            "resolved transaction"
        );

        Ok(Transaction::new(txid, receivers, senders))
    }

    /// Resolve a transaction, reporting an unknown ID as
    /// [`Error::InvalidTransactionIdentifier`]
    pub async fn get_transaction_by_tx(&self, txid: &str) -> Result<Transaction> {
        match self.get_transaction(txid).await {
            Err(Error::Node(e)) if e.is_rpc() => {
                debug!(txid, error = %e, "node rejected transaction id");
                Err(Error::InvalidTransactionIdentifier(txid.to_string()))
            }
            other => other,
        }
    }

    /// Resolve every transaction of the block at `height`, in block order.
    ///
    /// Lookups are issued concurrently; the node guard decides how many
    /// actually run at once. Any failed lookup fails the whole block.
    pub async fn get_transactions_of_block(&self, height: u64) -> Result<Vec<Transaction>> {
        let hash = self.node.get_block_hash(height).await.map_err(|e| {
            if e.is_rpc() {
                Error::InvalidBlockHeight(height)
            } else {
                Error::Node(e)
            }
        })?;
        let block = self.node.get_block(&hash).await?;

        info!(height, %hash, transactions = block.tx.len(), "scanning block");

        try_join_all(block.tx.iter().map(|txid| self.get_transaction(txid))).await
    }

    /// Net effect of a transaction on the node's wallet
    pub async fn get_amount_of_transaction(&self, txid: &str) -> Result<Decimal> {
        Ok(self.node.get_transaction(txid).await?.amount)
    }

    /// Height of the node's best chain
    pub async fn get_height_of_highest_block(&self) -> Result<u64> {
        Ok(self.node.get_info().await?.blocks)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
