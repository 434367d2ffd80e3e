//! Scripted in-memory node for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::core::types::{OutPoint, UnspentOutput};
use crate::rpc::types::{
    AddressValidation, Block, DecodedTransaction, NodeInfo, OutputMap, ScriptPubKey,
    SignedTransaction, TxInput, TxOutput, WalletTransaction,
};
use crate::rpc::{NodeError, NodeResult, NodeRpc};

/// Node error for an unknown transaction, as the node reports it
pub fn unknown_transaction() -> NodeError {
    NodeError::Rpc {
        code: -5,
        message: "No such mempool or blockchain transaction".into(),
    }
}

/// Build a decoded transaction spending `inputs` and paying `outputs`
pub fn decoded_tx(inputs: &[(&str, u32)], outputs: &[(&str, Decimal)]) -> DecodedTransaction {
    DecodedTransaction {
        txid: None,
        vin: inputs
            .iter()
            .map(|(txid, vout)| TxInput {
                txid: Some(txid.to_string()),
                vout: Some(*vout),
                coinbase: None,
            })
            .collect(),
        vout: outputs
            .iter()
            .enumerate()
            .map(|(n, (address, value))| TxOutput {
                value: *value,
                n: n as u32,
                script_pub_key: ScriptPubKey {
                    addresses: Some(vec![address.to_string()]),
                    kind: Some("pubkeyhash".into()),
                    ..ScriptPubKey::default()
                },
            })
            .collect(),
    }
}

#[derive(Debug, Default)]
struct MockState {
    unspents: Vec<(String, UnspentOutput)>,
    decoded: HashMap<String, DecodedTransaction>,
    block_hashes: HashMap<u64, String>,
    blocks: HashMap<String, Block>,
    wallet: HashMap<String, Decimal>,
    height: u64,
    valid_addresses: Vec<String>,
    broadcast_txid: Option<String>,
    incomplete_signatures: bool,
    failures: HashMap<(String, String), NodeError>,
    raw_delays: HashMap<String, Duration>,
    created: Vec<(Vec<OutPoint>, OutputMap)>,
    log: Vec<String>,
    next_address: usize,
}

/// Scripted node; every call is logged and can be delayed or failed
#[derive(Debug, Default)]
pub struct MockNode {
    state: Mutex<MockState>,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_unspent(self, address: &str, unspent: UnspentOutput) -> Self {
        self.state
            .lock()
            .unwrap()
            .unspents
            .push((address.to_string(), unspent.with_address(address)));
        self
    }

    pub fn with_transaction(self, txid: &str, mut tx: DecodedTransaction) -> Self {
        tx.txid = Some(txid.to_string());
        self.state
            .lock()
            .unwrap()
            .decoded
            .insert(format!("raw-{}", txid), tx);
        self
    }

    pub fn with_block(self, height: u64, hash: &str, txids: &[&str]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.block_hashes.insert(height, hash.to_string());
            state.blocks.insert(
                hash.to_string(),
                Block {
                    hash: hash.to_string(),
                    height: Some(height),
                    tx: txids.iter().map(|t| t.to_string()).collect(),
                },
            );
        }
        self
    }

    pub fn with_wallet_amount(self, txid: &str, amount: Decimal) -> Self {
        self.state.lock().unwrap().wallet.insert(txid.to_string(), amount);
        self
    }

    pub fn with_height(self, height: u64) -> Self {
        self.state.lock().unwrap().height = height;
        self
    }

    pub fn with_valid_address(self, address: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .valid_addresses
            .push(address.to_string());
        self
    }

    pub fn with_broadcast_txid(self, txid: &str) -> Self {
        self.state.lock().unwrap().broadcast_txid = Some(txid.to_string());
        self
    }

    pub fn with_incomplete_signatures(self) -> Self {
        self.state.lock().unwrap().incomplete_signatures = true;
        self
    }

    /// Fail `method`; `arg` of `"*"` matches every argument
    pub fn with_failure(self, method: &str, arg: &str, error: NodeError) -> Self {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert((method.to_string(), arg.to_string()), error);
        self
    }

    /// Delay `getrawtransaction` for one transaction
    pub fn with_raw_delay(self, txid: &str, delay: Duration) -> Self {
        self.state
            .lock()
            .unwrap()
            .raw_delays
            .insert(txid.to_string(), delay);
        self
    }

    /// Method names in call order
    pub fn log(&self) -> Vec<String> {
        self.state.lock().unwrap().log.clone()
    }

    pub fn calls(&self, method: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .log
            .iter()
            .filter(|m| m.as_str() == method)
            .count()
    }

    /// Arguments of every `createrawtransaction` call
    pub fn created(&self) -> Vec<(Vec<OutPoint>, OutputMap)> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn begin(&self, method: &str, arg: &str) -> NodeResult<()> {
        let delay = {
            let mut state = self.state.lock().unwrap();
            state.log.push(method.to_string());
            match method {
                "getrawtransaction" => state.raw_delays.get(arg).copied().unwrap_or(self.delay),
                _ => self.delay,
            }
        };

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let state = self.state.lock().unwrap();
        let failure = state
            .failures
            .get(&(method.to_string(), arg.to_string()))
            .or_else(|| state.failures.get(&(method.to_string(), "*".to_string())));
        match failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl NodeRpc for MockNode {
    async fn list_unspent(&self, addresses: &[String]) -> NodeResult<Vec<UnspentOutput>> {
        self.begin("listunspent", &addresses.join(",")).await?;
        let state = self.state.lock().unwrap();
        Ok(state
            .unspents
            .iter()
            .filter(|(owner, _)| addresses.contains(owner))
            .map(|(_, unspent)| unspent.clone())
            .collect())
    }

    async fn create_raw_transaction(
        &self,
        inputs: &[OutPoint],
        outputs: &OutputMap,
    ) -> NodeResult<String> {
        self.begin("createrawtransaction", "").await?;
        let mut state = self.state.lock().unwrap();
        state.created.push((inputs.to_vec(), outputs.clone()));
        Ok(format!("unsigned-{}", state.created.len()))
    }

    async fn sign_raw_transaction(&self, raw: &str) -> NodeResult<SignedTransaction> {
        self.begin("signrawtransaction", raw).await?;
        let complete = !self.state.lock().unwrap().incomplete_signatures;
        Ok(SignedTransaction {
            hex: format!("signed-{}", raw),
            complete,
        })
    }

    async fn send_raw_transaction(&self, signed_hex: &str) -> NodeResult<String> {
        self.begin("sendrawtransaction", signed_hex).await?;
        let state = self.state.lock().unwrap();
        Ok(state
            .broadcast_txid
            .clone()
            .unwrap_or_else(|| format!("txid-{}", signed_hex)))
    }

    async fn get_raw_transaction(&self, txid: &str) -> NodeResult<String> {
        self.begin("getrawtransaction", txid).await?;
        let raw = format!("raw-{}", txid);
        if self.state.lock().unwrap().decoded.contains_key(&raw) {
            Ok(raw)
        } else {
            Err(unknown_transaction())
        }
    }

    async fn decode_raw_transaction(&self, raw: &str) -> NodeResult<DecodedTransaction> {
        self.begin("decoderawtransaction", raw).await?;
        self.state
            .lock()
            .unwrap()
            .decoded
            .get(raw)
            .cloned()
            .ok_or(NodeError::Rpc {
                code: -22,
                message: "TX decode failed".into(),
            })
    }

    async fn get_block_hash(&self, height: u64) -> NodeResult<String> {
        self.begin("getblockhash", &height.to_string()).await?;
        self.state
            .lock()
            .unwrap()
            .block_hashes
            .get(&height)
            .cloned()
            .ok_or(NodeError::Rpc {
                code: -8,
                message: "Block height out of range".into(),
            })
    }

    async fn get_block(&self, hash: &str) -> NodeResult<Block> {
        self.begin("getblock", hash).await?;
        self.state
            .lock()
            .unwrap()
            .blocks
            .get(hash)
            .cloned()
            .ok_or(NodeError::Rpc {
                code: -5,
                message: "Block not found".into(),
            })
    }

    async fn get_transaction(&self, txid: &str) -> NodeResult<WalletTransaction> {
        self.begin("gettransaction", txid).await?;
        let state = self.state.lock().unwrap();
        let amount = state.wallet.get(txid).copied().ok_or_else(|| NodeError::Rpc {
            code: -5,
            message: "Invalid or non-wallet transaction id".into(),
        })?;
        Ok(WalletTransaction {
            txid: Some(txid.to_string()),
            amount,
            confirmations: Some(1),
        })
    }

    async fn get_info(&self) -> NodeResult<NodeInfo> {
        self.begin("getinfo", "").await?;
        Ok(NodeInfo {
            blocks: self.state.lock().unwrap().height,
            version: Some(130_200),
            connections: Some(8),
            testnet: Some(false),
        })
    }

    async fn validate_address(&self, address: &str) -> NodeResult<AddressValidation> {
        self.begin("validateaddress", address).await?;
        let isvalid = self
            .state
            .lock()
            .unwrap()
            .valid_addresses
            .iter()
            .any(|a| a == address);
        Ok(AddressValidation {
            isvalid,
            address: isvalid.then(|| address.to_string()),
            ismine: Some(false),
        })
    }

    async fn get_new_address(&self) -> NodeResult<String> {
        self.begin("getnewaddress", "").await?;
        let mut state = self.state.lock().unwrap();
        state.next_address += 1;
        Ok(format!("Laddr{}", state.next_address))
    }
}
