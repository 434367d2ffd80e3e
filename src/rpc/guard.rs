//! Node access guard.
//!
//! The node serves one connection at a time. [`ProxyGuard`] wraps any
//! [`NodeRpc`] and makes every call wait for a permit first, so callers can
//! fan out freely while at most `max_parallel_access` calls reach the node.

use std::future::Future;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tracing::trace;

use crate::core::types::{OutPoint, UnspentOutput};
use crate::error::{Error, Result};
use crate::rpc::types::{
    AddressValidation, Block, DecodedTransaction, NodeInfo, OutputMap, SignedTransaction,
    WalletTransaction,
};
use crate::rpc::{NodeError, NodeResult, NodeRpc};

/// Default number of node calls allowed in flight
pub const DEFAULT_MAX_PARALLEL_ACCESS: usize = 1;

/// Bounded-concurrency gate in front of a node
#[derive(Debug)]
pub struct ProxyGuard<N> {
    inner: N,
    permits: Semaphore,
    capacity: usize,
}

impl<N: NodeRpc> ProxyGuard<N> {
    /// Wrap `inner`, allowing `max_parallel_access` calls in flight
    pub fn new(inner: N, max_parallel_access: usize) -> Result<Self> {
        if max_parallel_access == 0 {
            return Err(Error::InvalidParameter {
                name: "max_parallel_access".into(),
                reason: "must allow at least one call in flight".into(),
            });
        }

        Ok(Self {
            inner,
            permits: Semaphore::new(max_parallel_access),
            capacity: max_parallel_access,
        })
    }

    /// Wrap `inner` with the default capacity of one
    pub fn single(inner: N) -> Self {
        Self {
            inner,
            permits: Semaphore::new(DEFAULT_MAX_PARALLEL_ACCESS),
            capacity: DEFAULT_MAX_PARALLEL_ACCESS,
        }
    }

    /// Maximum calls in flight
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits not currently held
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Stop admitting calls; waiting and future callers get `GuardClosed`
    pub fn close(&self) {
        self.permits.close();
    }

    /// The wrapped node
    pub fn inner(&self) -> &N {
        &self.inner
    }

    async fn run<T>(&self, method: &'static str, call: impl Future<Output = NodeResult<T>>) -> NodeResult<T> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| NodeError::GuardClosed)?;
        trace!(method, "node access granted");
        call.await
    }
}

#[async_trait]
impl<N: NodeRpc> NodeRpc for ProxyGuard<N> {
    async fn list_unspent(&self, addresses: &[String]) -> NodeResult<Vec<UnspentOutput>> {
        self.run("listunspent", self.inner.list_unspent(addresses)).await
    }

    async fn create_raw_transaction(
        &self,
        inputs: &[OutPoint],
        outputs: &OutputMap,
    ) -> NodeResult<String> {
        self.run(
            "createrawtransaction",
            self.inner.create_raw_transaction(inputs, outputs),
        )
        .await
    }

    async fn sign_raw_transaction(&self, raw: &str) -> NodeResult<SignedTransaction> {
        self.run("signrawtransaction", self.inner.sign_raw_transaction(raw)).await
    }

    async fn send_raw_transaction(&self, signed_hex: &str) -> NodeResult<String> {
        self.run("sendrawtransaction", self.inner.send_raw_transaction(signed_hex)).await
    }

    async fn get_raw_transaction(&self, txid: &str) -> NodeResult<String> {
        self.run("getrawtransaction", self.inner.get_raw_transaction(txid)).await
    }

    async fn decode_raw_transaction(&self, raw: &str) -> NodeResult<DecodedTransaction> {
        self.run("decoderawtransaction", self.inner.decode_raw_transaction(raw)).await
    }

    async fn get_block_hash(&self, height: u64) -> NodeResult<String> {
        self.run("getblockhash", self.inner.get_block_hash(height)).await
    }

    async fn get_block(&self, hash: &str) -> NodeResult<Block> {
        self.run("getblock", self.inner.get_block(hash)).await
    }

    async fn get_transaction(&self, txid: &str) -> NodeResult<WalletTransaction> {
        self.run("gettransaction", self.inner.get_transaction(txid)).await
    }

    async fn get_info(&self) -> NodeResult<NodeInfo> {
        self.run("getinfo", self.inner.get_info()).await
    }

    async fn validate_address(&self, address: &str) -> NodeResult<AddressValidation> {
        self.run("validateaddress", self.inner.validate_address(address)).await
    }

    async fn get_new_address(&self) -> NodeResult<String> {
        self.run("getnewaddress", self.inner.get_new_address()).await
    }
}
