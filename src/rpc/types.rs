//! Records returned by the node.
//!
//! Ledger records are loosely structured: coinbase inputs carry no previous
//! output, non-standard scripts carry no address, and newer node releases
//! report a single `address` where older ones report an `addresses` list.
//! Every field that may be absent is an `Option` or defaults to empty.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// DECODED TRANSACTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// A transaction as returned by `decoderawtransaction`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DecodedTransaction {
    /// Transaction ID
    #[serde(default)]
    pub txid: Option<String>,
    /// Inputs
    #[serde(default)]
    pub vin: Vec<TxInput>,
    /// Outputs
    #[serde(default)]
    pub vout: Vec<TxOutput>,
}

/// A transaction input
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TxInput {
    /// Transaction holding the spent output
    #[serde(default)]
    pub txid: Option<String>,
    /// Index of the spent output
    #[serde(default)]
    pub vout: Option<u32>,
    /// Coinbase data; set only for newly issued coins
    #[serde(default)]
    pub coinbase: Option<String>,
}

impl TxInput {
    /// The previous output this input spends, if it references one
    pub fn previous_output(&self) -> Option<(&str, u32)> {
        match (&self.txid, self.vout) {
            (Some(txid), Some(vout)) => Some((txid.as_str(), vout)),
            _ => None,
        }
    }
}

/// A transaction output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxOutput {
    /// Value in whole coins
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub value: Decimal,
    /// Output index
    #[serde(default)]
    pub n: u32,
    /// Locking script
    #[serde(rename = "scriptPubKey", default)]
    pub script_pub_key: ScriptPubKey,
}

/// Locking script summary
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScriptPubKey {
    /// Addresses (older node releases)
    #[serde(default)]
    pub addresses: Option<Vec<String>>,
    /// Single address (newer node releases)
    #[serde(default)]
    pub address: Option<String>,
    /// Script type, e.g. `pubkeyhash`, `scripthash`, `nulldata`
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Script hex
    #[serde(default)]
    pub hex: Option<String>,
}

impl ScriptPubKey {
    /// Addresses the script pays to; empty for non-standard scripts
    pub fn resolvable_addresses(&self) -> Vec<&str> {
        match (&self.addresses, &self.address) {
            (Some(addresses), _) => addresses.iter().map(String::as_str).collect(),
            (None, Some(address)) => vec![address.as_str()],
            (None, None) => Vec::new(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BLOCKS & WALLET VIEW
// ═══════════════════════════════════════════════════════════════════════════════

/// A block as returned by `getblock` (verbosity 1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Block hash
    pub hash: String,
    /// Block height
    #[serde(default)]
    pub height: Option<u64>,
    /// Transaction IDs in block order
    #[serde(default)]
    pub tx: Vec<String>,
}

/// Wallet-relative transaction view from `gettransaction`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletTransaction {
    /// Transaction ID
    #[serde(default)]
    pub txid: Option<String>,
    /// Net effect on the local wallet
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
    /// Number of confirmations (negative when conflicted)
    #[serde(default)]
    pub confirmations: Option<i64>,
}

/// Node status from `getinfo`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    /// Height of the best chain
    pub blocks: u64,
    /// Node version
    #[serde(default)]
    pub version: Option<u64>,
    /// Peer connections
    #[serde(default)]
    pub connections: Option<u64>,
    /// Whether the node runs on testnet
    #[serde(default)]
    pub testnet: Option<bool>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// ADDRESSES & SIGNING
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of `validateaddress`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressValidation {
    /// Whether the address is valid on the node's chain
    pub isvalid: bool,
    /// Normalised address
    #[serde(default)]
    pub address: Option<String>,
    /// Whether the node's wallet owns the address
    #[serde(default)]
    pub ismine: Option<bool>,
}

/// Result of the signing call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// Signed transaction hex
    pub hex: String,
    /// Whether all inputs carry complete signatures
    #[serde(default)]
    pub complete: bool,
}

// ═══════════════════════════════════════════════════════════════════════════════
// OUTPUT MAP
// ═══════════════════════════════════════════════════════════════════════════════

/// Address to amount map handed to `createrawtransaction`.
///
/// Keeps insertion order. Inserting an address that is already present
/// replaces its amount in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutputMap {
    entries: Vec<(String, Decimal)>,
}

impl OutputMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the amount for an address, returning the amount it replaced
    pub fn insert(&mut self, address: impl Into<String>, amount: Decimal) -> Option<Decimal> {
        let address = address.into();
        match self.entries.iter_mut().find(|(a, _)| *a == address) {
            Some((_, existing)) => Some(std::mem::replace(existing, amount)),
            None => {
                self.entries.push((address, amount));
                None
            }
        }
    }

    /// Amount assigned to an address
    pub fn get(&self, address: &str) -> Option<Decimal> {
        self.entries
            .iter()
            .find(|(a, _)| a == address)
            .map(|(_, amount)| *amount)
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.entries.iter().map(|(a, amount)| (a.as_str(), *amount))
    }

    /// Number of outputs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all amounts
    pub fn total(&self) -> Decimal {
        self.entries.iter().map(|(_, amount)| *amount).sum()
    }
}

impl Serialize for OutputMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (address, amount) in &self.entries {
            let number = amount
                .normalize()
                .to_string()
                .parse::<serde_json::Number>()
                .map_err(serde::ser::Error::custom)?;
            map.serialize_entry(address, &number)?;
        }
        map.end()
    }
}
