use std::time::Duration;

use alloy::{
    network::{Ethereum, Network},
    providers::RootProvider,
};
use tracing::debug;

use crate::rpc::RpcChainProvider;

/// Default total timeout per RPC call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);
/// Default maximum number of retry attempts.
pub const DEFAULT_MAX_RETRIES: usize = 3;
/// Default base delay between retries.
pub const DEFAULT_MIN_DELAY: Duration = Duration::from_secs(1);

/// Builder for constructing an [`RpcChainProvider`].
///
/// Use this to configure the per-call timeout and retry/backoff settings.
#[derive(Debug)]
pub struct RpcChainProviderBuilder<N: Network = Ethereum> {
    provider: RootProvider<N>,
    call_timeout: Duration,
    max_retries: usize,
    min_delay: Duration,
}

impl<N: Network> RpcChainProviderBuilder<N> {
    /// Creates a builder around an existing [`RootProvider`] with default settings.
    #[must_use]
    pub fn new(provider: RootProvider<N>) -> Self {
        Self {
            provider,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            min_delay: DEFAULT_MIN_DELAY,
        }
    }

    /// Creates a builder with no retry attempts and only the timeout set.
    #[must_use]
    pub fn fragile(provider: RootProvider<N>) -> Self {
        Self::new(provider).max_retries(0).min_delay(Duration::ZERO)
    }

    /// Sets the total timeout for each RPC operation, retries included.
    #[must_use]
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Sets the maximum number of retry attempts.
    #[must_use]
    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the base delay for exponential backoff retries.
    #[must_use]
    pub fn min_delay(mut self, min_delay: Duration) -> Self {
        self.min_delay = min_delay;
        self
    }

    /// Final builder method: consumes the builder and returns the built
    /// [`RpcChainProvider`].
    #[must_use]
    pub fn build(self) -> RpcChainProvider<N> {
        debug!(
            call_timeout_ms = self.call_timeout.as_millis(),
            max_retries = self.max_retries,
            "Building RpcChainProvider"
        );

        RpcChainProvider {
            provider: self.provider,
            call_timeout: self.call_timeout,
            max_retries: self.max_retries,
            min_delay: self.min_delay,
        }
    }
}
