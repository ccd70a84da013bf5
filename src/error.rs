use std::sync::Arc;

use alloy::transports::{RpcError, TransportErrorKind};
use thiserror::Error;

/// Errors emitted by a [`ChainProvider`](crate::ChainProvider) implementation.
///
/// The RPC variant wraps the transport error in an `Arc` so provider errors stay
/// cheaply cloneable and can be re-delivered through observer channels.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// The underlying RPC transport returned an error.
    #[error("RPC error: {0}")]
    Rpc(Arc<RpcError<TransportErrorKind>>),

    /// A timeout elapsed while waiting for an RPC response.
    #[error("Operation timed out")]
    Timeout,
}

impl From<RpcError<TransportErrorKind>> for ProviderError {
    fn from(error: RpcError<TransportErrorKind>) -> Self {
        ProviderError::Rpc(Arc::new(error))
    }
}

/// Errors surfaced by the [`Reconciler`](crate::Reconciler).
///
/// Only the mandatory steps of a cycle can fail: the log-range fetch (including
/// chain height retrieval) and transaction submission. Status-lookup failures
/// during failure detection are absorbed and never reach this type.
#[derive(Error, Debug, Clone)]
pub enum ReconcileError {
    /// Chain height retrieval or the transfer log fetch failed. The store is
    /// left untouched for this cycle.
    #[error("Transfer log fetch failed: {0}")]
    Fetch(#[source] ProviderError),

    /// The provider rejected a transaction submission. Nothing was persisted.
    #[error("Transaction submission failed: {0}")]
    Submission(#[source] ProviderError),
}
