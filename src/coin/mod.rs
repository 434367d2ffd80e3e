//! Coin services.
//!
//! - [`utxo`]: unspent output selection
//! - [`query`]: transaction and block resolution
//! - [`transaction`]: outgoing transaction assembly
//! - [`address`]: address creation and validation

pub mod address;
pub mod query;
pub mod transaction;
pub mod utxo;

pub use address::*;
pub use query::*;
pub use transaction::*;
pub use utxo::*;
