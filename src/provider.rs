//! Contract for the remote chain data provider.
//!
//! The reconciler consumes this trait; [`RpcChainProvider`](crate::rpc::RpcChainProvider)
//! is the bundled alloy-backed implementation. Retry/backoff policy is the
//! provider's own concern.

use std::collections::HashMap;

use alloy::{
    primitives::{Address, Bytes, TxHash},
    rpc::types::Log,
};

use crate::ProviderError;

/// Confirmation status of a transaction as reported by the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Known to the node but not yet mined.
    Pending,
    /// Mined and executed successfully.
    Confirmed,
    /// Mined but reverted.
    Failed,
    /// Unknown to the node.
    NotFound,
}

/// Remote collaborator supplying chain height, transfer logs, transaction
/// statuses, and transaction submission.
#[allow(async_fn_in_trait)]
pub trait ChainProvider {
    /// The current chain height.
    async fn current_chain_height(&self) -> Result<u64, ProviderError>;

    /// Raw `Transfer` logs for `contract` involving `account` (as sender or
    /// recipient) within `[from_block, to_block]`, ordered chronologically.
    async fn fetch_logs(
        &self,
        contract: Address,
        account: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<Log>, ProviderError>;

    /// Confirmation statuses for the given transaction hashes.
    async fn fetch_statuses(
        &self,
        hashes: &[TxHash],
    ) -> Result<HashMap<TxHash, TransactionStatus>, ProviderError>;

    /// Submits a contract call with the given calldata and gas parameters,
    /// returning the transaction hash on acceptance.
    async fn submit(
        &self,
        contract: Address,
        call_data: Bytes,
        gas_price: u128,
        gas_limit: u64,
    ) -> Result<TxHash, ProviderError>;
}
