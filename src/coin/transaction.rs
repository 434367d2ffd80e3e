//! Outgoing transaction assembly.
//!
//! One send is: list the sender's unspent outputs, select enough of them to
//! cover payments plus fee, build the output map with the change going back
//! to the sender, then create, sign and broadcast. That whole sequence runs
//! under a lock owned by the service so two sends cannot pick the same
//! outputs. The broadcast transaction is resolved after the lock is
//! released.

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::coin::query::ChainQueryService;
use crate::coin::utxo::select_unspents;
use crate::core::types::{sum_unspents, OutPoint, Transaction, TransactionAttempt};
use crate::error::{Error, Result};
use crate::rpc::types::OutputMap;
use crate::rpc::NodeRpc;
use crate::utils::constants::DEFAULT_MIN_OPTIMIZED_AMOUNT;

/// Builds, signs and broadcasts outgoing transactions
pub struct TransactionService {
    node: Arc<dyn NodeRpc>,
    query: ChainQueryService,
    /// Advisory only; selection does not filter outputs below it
    min_optimized_amount: Decimal,
    submit_lock: Mutex<()>,
}

impl std::fmt::Debug for TransactionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionService")
            .field("min_optimized_amount", &self.min_optimized_amount)
            .finish_non_exhaustive()
    }
}

impl TransactionService {
    /// Create a service over a shared node handle
    pub fn new(node: Arc<dyn NodeRpc>) -> Self {
        Self::with_min_optimized_amount(node, DEFAULT_MIN_OPTIMIZED_AMOUNT)
    }

    /// Create a service with an explicit minimum optimised amount
    pub fn with_min_optimized_amount(node: Arc<dyn NodeRpc>, min_optimized_amount: Decimal) -> Self {
        Self {
            query: ChainQueryService::new(node.clone()),
            node,
            min_optimized_amount,
            submit_lock: Mutex::new(()),
        }
    }

    /// Smallest amount worth optimising a selection for.
    ///
    /// Advisory: [`select_unspents`] does not read it, so dust outputs are
    /// still eligible.
    pub fn min_optimized_amount(&self) -> Decimal {
        self.min_optimized_amount
    }

    /// Fund, sign and broadcast `attempt`, returning the resolved transaction
    pub async fn send(&self, attempt: &TransactionAttempt) -> Result<Transaction> {
        validate_attempt(attempt)?;

        let txid = {
            let _guard = self.submit_lock.lock().await;
            self.submit(attempt).await?
        };

        self.query.get_transaction(&txid).await
    }

    async fn submit(&self, attempt: &TransactionAttempt) -> Result<String> {
        let unspents = self
            .node
            .list_unspent(std::slice::from_ref(&attempt.sender))
            .await?;

        let overall = attempt.overall_amount();
        let target = overall + attempt.fee;

        let selected = select_unspents(&unspents, target).ok_or_else(|| {
            Error::NoSuitableCombination {
                required: target,
                available: sum_unspents(&unspents),
            }
        })?;
        let selected_sum = sum_unspents(&selected);

        let mut outputs = OutputMap::new();
        for receiver in &attempt.receivers {
            outputs.insert(receiver.address.clone(), receiver.amount);
        }
        let change = selected_sum - attempt.fee - overall;
        if outputs.insert(attempt.sender.clone(), change).is_some() {
            debug!(sender = %attempt.sender, "sender is also a receiver, change replaces payment");
        }

        let inputs: Vec<OutPoint> = selected.iter().map(|u| u.outpoint()).collect();
        debug!(
            sender = %attempt.sender,
            inputs = inputs.len(),
            %selected_sum,
            %change,
            "funding selected"
        );

        let raw = self.node.create_raw_transaction(&inputs, &outputs).await?;
        let signed = self.node.sign_raw_transaction(&raw).await?;
        if !signed.complete {
            warn!(sender = %attempt.sender, "node reports incomplete signatures, broadcasting anyway");
        }
        let txid = self.node.send_raw_transaction(&signed.hex).await?;

        info!(
            %txid,
            sender = %attempt.sender,
            currency = %attempt.currency,
            amount = %overall,
            fee = %attempt.fee,
            "transaction broadcast"
        );

        Ok(txid)
    }
}

fn validate_attempt(attempt: &TransactionAttempt) -> Result<()> {
    if attempt.receivers.is_empty() {
        return Err(Error::InvalidParameter {
            name: "receivers".into(),
            reason: "at least one receiver is required".into(),
        });
    }

    if attempt.fee.is_sign_negative() {
        return Err(Error::InvalidParameter {
            name: "fee".into(),
            reason: format!("must not be negative, got {}", attempt.fee),
        });
    }

    for (i, receiver) in attempt.receivers.iter().enumerate() {
        if receiver.amount <= Decimal::ZERO {
            return Err(Error::InvalidParameter {
                name: "receivers".into(),
                reason: format!("amount for {} must be positive", receiver.address),
            });
        }
        if attempt.receivers[..i].iter().any(|r| r.address == receiver.address) {
            return Err(Error::InvalidParameter {
                name: "receivers".into(),
                reason: format!("duplicate receiver {}", receiver.address),
            });
        }
    }

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
