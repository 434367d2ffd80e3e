//! Gateway-facing value types.
//!
//! These are the shapes the orchestration layer sees: unspent outputs as the
//! node reports them, resolved transactions, and outgoing transaction
//! attempts. All amounts are exact decimals in whole coins.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════════════
// UNSPENT OUTPUTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Reference to a transaction output: the identity the node needs to spend it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    /// Transaction ID containing the output
    pub txid: String,
    /// Output index within the transaction
    pub vout: u32,
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.vout)
    }
}

/// An unspent output as reported by the node's `listunspent`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnspentOutput {
    /// Transaction ID containing this output
    pub txid: String,
    /// Output index within the transaction
    pub vout: u32,
    /// Owning address, if the node could resolve one
    #[serde(default)]
    pub address: Option<String>,
    /// Value in whole coins
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
    /// Number of confirmations
    #[serde(default)]
    pub confirmations: Option<u64>,
    /// Whether the node holds the key to spend it
    #[serde(default)]
    pub spendable: Option<bool>,
}

impl UnspentOutput {
    /// Create an unspent output with only the spend reference and amount
    pub fn new(txid: impl Into<String>, vout: u32, amount: Decimal) -> Self {
        Self {
            txid: txid.into(),
            vout,
            address: None,
            amount,
            confirmations: None,
            spendable: None,
        }
    }

    /// Attach the owning address
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Get the outpoint for this output
    pub fn outpoint(&self) -> OutPoint {
        OutPoint {
            txid: self.txid.clone(),
            vout: self.vout,
        }
    }
}

/// Sum the amounts of a set of unspent outputs
pub fn sum_unspents<'a, I>(unspents: I) -> Decimal
where
    I: IntoIterator<Item = &'a UnspentOutput>,
{
    unspents.into_iter().map(|u| u.amount).sum()
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESOLVED TRANSACTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// One credited output of a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceiver {
    /// Receiving address
    pub address: String,
    /// Amount credited in whole coins
    pub amount: Decimal,
}

impl TransactionReceiver {
    /// Create a new receiver
    pub fn new(address: impl Into<String>, amount: Decimal) -> Self {
        Self {
            address: address.into(),
            amount,
        }
    }
}

/// An address whose earlier output funded one of a transaction's inputs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionSender {
    /// Sending address
    pub address: String,
}

impl TransactionSender {
    /// Create a new sender
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

/// A settled transaction with its receivers and resolved senders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction ID
    pub tx: String,
    /// Receivers in output order
    pub receivers: Vec<TransactionReceiver>,
    /// Senders, deduplicated by address in first-seen order
    pub senders: Vec<TransactionSender>,
}

impl Transaction {
    /// Create a new transaction
    pub fn new(
        tx: impl Into<String>,
        receivers: Vec<TransactionReceiver>,
        senders: Vec<TransactionSender>,
    ) -> Self {
        Self {
            tx: tx.into(),
            receivers,
            senders,
        }
    }

    /// Total amount credited across all receivers
    pub fn received_amount(&self) -> Decimal {
        self.receivers.iter().map(|r| r.amount).sum()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRANSACTION ATTEMPTS
// ═══════════════════════════════════════════════════════════════════════════════

/// A receiver of an outgoing transaction attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptReceiver {
    /// Destination address
    pub address: String,
    /// Amount to send in whole coins
    pub amount: Decimal,
}

impl AttemptReceiver {
    /// Create a new attempt receiver
    pub fn new(address: impl Into<String>, amount: Decimal) -> Self {
        Self {
            address: address.into(),
            amount,
        }
    }
}

/// An outgoing payment requested by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionAttempt {
    /// Funding address; also receives the change
    pub sender: String,
    /// Payments in the order they were requested
    pub receivers: Vec<AttemptReceiver>,
    /// Network fee in whole coins
    pub fee: Decimal,
    /// Currency tag
    pub currency: String,
}

impl TransactionAttempt {
    /// Create a new attempt
    pub fn new(
        sender: impl Into<String>,
        receivers: Vec<AttemptReceiver>,
        fee: Decimal,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            receivers,
            fee,
            currency: currency.into(),
        }
    }

    /// Sum of all receiver amounts, excluding the fee
    pub fn overall_amount(&self) -> Decimal {
        self.receivers.iter().map(|r| r.amount).sum()
    }
}
