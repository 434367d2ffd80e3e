//! Error types for the gateway core.
//!
//! Errors fall into four groups: funding shortfalls, unknown identifiers,
//! node communication failures and local validation problems. Callers can
//! tell a funding shortfall apart from an unreachable node by variant or by
//! [`Error::code`].

use rust_decimal::Decimal;
use thiserror::Error;

use crate::core::config::ConfigError;
use crate::rpc::NodeError;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the gateway core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ═══════════════════════════════════════════════════════════════════
    // Funding Errors
    // ═══════════════════════════════════════════════════════════════════

    /// No combination of the sender's unspent outputs covers the target
    #[error("No suitable combination of unspent outputs found: required {required}, available {available}")]
    NoSuitableCombination {
        /// Amount that had to be covered (payments plus fee)
        required: Decimal,
        /// Sum of all unspent outputs of the sender
        available: Decimal,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Identifier Errors
    // ═══════════════════════════════════════════════════════════════════

    /// The node does not know the given transaction
    #[error("Invalid transaction identifier: {0}")]
    InvalidTransactionIdentifier(String),

    /// The node does not know a block at the given height
    #[error("Invalid block height: {0}")]
    InvalidBlockHeight(u64),

    // ═══════════════════════════════════════════════════════════════════
    // Node Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Communication with the node failed
    #[error("Node error: {0}")]
    Node(#[from] NodeError),

    // ═══════════════════════════════════════════════════════════════════
    // Validation Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Invalid input parameter
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Overflow in calculation
    #[error("Arithmetic overflow in {operation}")]
    Overflow {
        /// Operation that overflowed
        operation: String,
    },

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Returns true if the caller may retry once conditions change
    /// (more funds arrive, the node comes back).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::NoSuitableCombination { .. } | Error::Node(NodeError::Transport(_))
        )
    }

    /// Returns true if this error is a funding shortfall rather than an outage
    pub fn is_funding_shortfall(&self) -> bool {
        matches!(self, Error::NoSuitableCombination { .. })
    }

    /// Returns the error code for external systems
    pub fn code(&self) -> u32 {
        match self {
            // Funding errors: 1xxx
            Error::NoSuitableCombination { .. } => 1001,

            // Identifier errors: 2xxx
            Error::InvalidTransactionIdentifier(_) => 2001,
            Error::InvalidBlockHeight(_) => 2002,

            // Node errors: 3xxx
            Error::Node(_) => 3001,

            // Validation errors: 5xxx
            Error::InvalidParameter { .. } => 5001,
            Error::Overflow { .. } => 5002,
            Error::Config(_) => 5003,
        }
    }
}
