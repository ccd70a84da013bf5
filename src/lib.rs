//! transfer-reconciler reconciles an ERC-20 token contract's on-chain transfer
//! event stream with a local transaction ledger for a single watched account.
//!
//! The main entry point is [`Reconciler`], created from a [`LedgerStore`] and a
//! [`ChainProvider`] for one `(contract, account)` pair.
//!
//! After constructing a reconciler, register the observer with
//! [`Reconciler::subscribe`], then call [`Reconciler::sync`] to run sync
//! cycles. Each cycle fetches the transfer logs since the last persisted block,
//! normalizes them into [`TransferRecord`]s, aligns them with locally known
//! pending transactions, flags pending transactions the chain reports as
//! failed, and persists the merged batch in a single write.
//!
//! # Observer notifications
//!
//! The stream returned by [`Reconciler::subscribe`] yields exactly one
//! [`SyncResult`] per `sync` call that reaches a terminal state: `Ok` with the
//! merged records, or `Err` when the mandatory fetch step failed (in which case
//! the store is untouched).
//!
//! # Failure absorption
//!
//! Status lookups during failure detection are best-effort: a provider error
//! there degrades to "no failures found this cycle" and the sync still
//! completes with log-derived records. Only fetch and submission failures
//! escalate.
//!
//! # Concurrency
//!
//! `sync` serializes its remote calls and the storage merge on one logical
//! thread of execution. Overlapping `sync` invocations are the caller's
//! responsibility to avoid or serialize; the ledger store must support
//! concurrent reads against at most one in-flight writer.
//!
//! # Providers
//!
//! The [`rpc`] module provides [`rpc::RpcChainProvider`], an Alloy-backed
//! [`ChainProvider`] with per-call timeouts and exponential backoff retries.

pub mod provider;
pub mod rpc;
pub mod store;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

mod erc20;
mod error;
mod reconciler;
mod types;

pub use erc20::{IErc20, encode_transfer_input};
pub use error::{ProviderError, ReconcileError};
pub use provider::{ChainProvider, TransactionStatus};
pub use reconciler::Reconciler;
pub use store::{LedgerStore, TransactionKey};
pub use types::{SyncResult, TransferRecord};
