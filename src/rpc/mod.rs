//! Alloy-backed [`ChainProvider`](crate::ChainProvider) implementation.
//!
//! [`RpcChainProvider`] wraps an Alloy [`RootProvider`](alloy::providers::RootProvider)
//! and adds:
//! * bounded per-call timeouts
//! * exponential backoff retries
//!
//! Use [`RpcChainProviderBuilder`] to construct one with sensible defaults:
//!
//! ```rust,no_run
//! use alloy::providers::RootProvider;
//! use std::time::Duration;
//! use transfer_reconciler::rpc::RpcChainProviderBuilder;
//!
//! # fn example() -> anyhow::Result<()> {
//! let root: RootProvider = RootProvider::new_http("http://localhost:8545".parse()?);
//! let provider = RpcChainProviderBuilder::new(root)
//!     .call_timeout(Duration::from_secs(30))
//!     .max_retries(5)
//!     .build();
//! # Ok(()) }
//! ```
//!
//! Transaction submission relies on node-side signing (`eth_sendTransaction`);
//! key management is not this crate's concern.

mod builder;
mod provider;

pub use builder::{
    DEFAULT_CALL_TIMEOUT, DEFAULT_MAX_RETRIES, DEFAULT_MIN_DELAY, RpcChainProviderBuilder,
};
pub use provider::RpcChainProvider;
