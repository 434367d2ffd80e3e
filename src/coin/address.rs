//! Address creation and validation, delegated to the node's wallet.

use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::rpc::NodeRpc;

/// Mints receiving addresses in the node's wallet
#[derive(Clone)]
pub struct AddressFactory {
    node: Arc<dyn NodeRpc>,
}

impl std::fmt::Debug for AddressFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressFactory").finish_non_exhaustive()
    }
}

impl AddressFactory {
    /// Create a factory over a shared node handle
    pub fn new(node: Arc<dyn NodeRpc>) -> Self {
        Self { node }
    }

    /// Create a new receiving address
    pub async fn create_address(&self) -> Result<String> {
        let address = self.node.get_new_address().await?;
        info!(%address, "created address");
        Ok(address)
    }
}

/// Checks addresses against the node
#[derive(Clone)]
pub struct AddressValidator {
    node: Arc<dyn NodeRpc>,
}

impl std::fmt::Debug for AddressValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressValidator").finish_non_exhaustive()
    }
}

impl AddressValidator {
    /// Create a validator over a shared node handle
    pub fn new(node: Arc<dyn NodeRpc>) -> Self {
        Self { node }
    }

    /// Whether the node accepts `address` as valid
    pub async fn validate_address(&self, address: &str) -> Result<bool> {
        Ok(self.node.validate_address(address).await?.isvalid)
    }
}
