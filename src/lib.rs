//! # UTXO Gateway
//!
//! Coin-handling core of a payment gateway for a UTXO-model coin, driven
//! entirely through the node's JSON-RPC interface.
//!
//! ## Architecture
//!
//! - **RPC**: node client, the access guard that limits calls in flight, and
//!   the records the node returns
//! - **Coin**: unspent output selection, transaction assembly, transaction
//!   and block resolution, address services
//! - **Core**: configuration and gateway-facing value types
//! - **Utils**: constants and amount conversion
//!
//! ## Example
//!
//! ```rust,ignore
//! use utxo_gateway::prelude::*;
//!
//! let gateway = CoinGateway::connect(&GatewayConfig::default())?;
//!
//! let attempt = TransactionAttempt::new(
//!     sender,
//!     vec![AttemptReceiver::new(receiver, amount)],
//!     fee,
//!     "LTC",
//! );
//! let tx = gateway.send(&attempt).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    trivial_casts,
    unused_lifetimes,
    unused_qualifications
)]

pub mod coin;
pub mod core;
pub mod error;
pub mod gateway;
pub mod rpc;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coin::{
        address::{AddressFactory, AddressValidator},
        query::ChainQueryService,
        transaction::TransactionService,
        utxo::select_unspents,
    };
    pub use crate::core::{
        config::{Environment, GatewayConfig, NodeConfig},
        types::{
            AttemptReceiver, OutPoint, Transaction, TransactionAttempt, TransactionReceiver,
            TransactionSender, UnspentOutput,
        },
    };
    pub use crate::error::{Error, Result};
    pub use crate::gateway::CoinGateway;
    pub use crate::rpc::{NodeClient, NodeError, NodeRpc, ProxyGuard};
    pub use crate::utils::convert::IntegerConverter;
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
