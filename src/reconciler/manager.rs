use alloy::primitives::{Address, TxHash, U256};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use crate::{
    ChainProvider, LedgerStore, ReconcileError, TransferRecord,
    erc20::encode_transfer_input,
    reconciler::{failure::detect_failures, matcher::align_with_pending, normalizer::normalize_logs},
    store::TransactionKey,
    types::{SyncResult, TryNotify},
};

/// Capacity of the observer channel. One message is emitted per completed sync
/// cycle, so a small buffer is enough to absorb a slow consumer.
const OBSERVER_BUFFER_CAPACITY: usize = 16;

/// Reconciles one token contract's transfer event stream with the local ledger
/// for a single watched account.
///
/// One instance tracks one `(contract, account)` pair. A [`sync`](Self::sync)
/// call drives one cycle: fetch, normalize, match, detect failures, merge,
/// persist, notify. Within one call the fetch, the status lookup and the merge
/// run in a fixed sequence; issuing overlapping `sync` calls against the same
/// store is the caller's responsibility to avoid or serialize.
#[derive(Debug)]
pub struct Reconciler<S, P> {
    contract: Address,
    account: Address,
    store: S,
    provider: P,
    observer: Option<mpsc::Sender<SyncResult>>,
}

impl<S: LedgerStore, P: ChainProvider> Reconciler<S, P> {
    /// Creates a reconciler for `contract` transfers involving `account`.
    #[must_use]
    pub fn new(contract: Address, account: Address, store: S, provider: P) -> Self {
        Self { contract, account, store, provider, observer: None }
    }

    /// Registers the sync observer, replacing any previous registration.
    ///
    /// The returned stream yields exactly one [`SyncResult`] per [`sync`](Self::sync)
    /// call that reaches a terminal state: `Ok` with the merged records on
    /// success, `Err` when the fetch step failed. Register before issuing the
    /// first `sync`.
    #[must_use]
    pub fn subscribe(&mut self) -> ReceiverStream<SyncResult> {
        let (sender, receiver) = mpsc::channel::<SyncResult>(OBSERVER_BUFFER_CAPACITY);
        self.observer = Some(sender);
        ReceiverStream::new(receiver)
    }

    /// A reference to the ledger store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// A reference to the chain provider.
    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Read-only pass-through query to the ledger store, newest first.
    pub fn get_transactions(
        &self,
        from: Option<&TransactionKey>,
        limit: Option<usize>,
    ) -> Vec<TransferRecord> {
        self.store.get_transactions(from, limit)
    }

    /// The highest block number of any persisted record, if one exists.
    pub fn last_transaction_block_height(&self) -> Option<u64> {
        self.store.last_transaction_block_height()
    }

    /// Runs one sync cycle and notifies the observer with its terminal outcome.
    ///
    /// On fetch failure nothing is persisted and the observer receives a single
    /// error notification. A failed status lookup is absorbed: the cycle still
    /// completes with log-derived records only.
    pub async fn sync(&self) {
        let outcome = self.run_cycle().await;
        match &outcome {
            Ok(records) => info!(count = records.len(), "Transfer sync completed"),
            Err(err) => warn!(error = %err, "Transfer sync failed"),
        }
        if let Some(observer) = &self.observer {
            observer.try_notify(outcome).await;
        }
    }

    async fn run_cycle(&self) -> Result<Vec<TransferRecord>, ReconcileError> {
        let chain_height =
            self.provider.current_chain_height().await.map_err(ReconcileError::Fetch)?;
        let from_block = self.store.last_transaction_block_height().unwrap_or(0) + 1;
        let pending = self.store.get_pending_transactions();

        info!(from_block, to_block = chain_height, "Fetching transfer logs");
        let logs = self
            .provider
            .fetch_logs(self.contract, self.account, from_block, chain_height)
            .await
            .map_err(ReconcileError::Fetch)?;

        let mut records = normalize_logs(&logs);
        align_with_pending(&mut records, &pending);

        if !pending.is_empty() {
            records.extend(detect_failures(&self.provider, &pending).await);
        }

        self.store.save(&records);
        Ok(records)
    }

    /// Submits an ERC-20 transfer of `value` to `to` and persists the resulting
    /// pending record.
    ///
    /// The record is written only after the provider accepts the submission; a
    /// rejected submission propagates as [`ReconcileError::Submission`] and
    /// writes nothing.
    pub async fn send(
        &self,
        to: Address,
        value: U256,
        gas_price: u128,
        gas_limit: u64,
    ) -> Result<TransferRecord, ReconcileError> {
        let input = encode_transfer_input(to, value);
        let hash: TxHash = self
            .provider
            .submit(self.contract, input, gas_price, gas_limit)
            .await
            .map_err(ReconcileError::Submission)?;

        let record = TransferRecord::pending(hash, self.account, to, value);
        self.store.save(std::slice::from_ref(&record));
        info!(transaction_hash = %hash, "Transfer submitted");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::Address;
    use tokio_stream::StreamExt;

    use super::*;
    use crate::test_utils::{MemoryLedgerStore, MockChainProvider};

    fn reconciler() -> Reconciler<MemoryLedgerStore, MockChainProvider> {
        Reconciler::new(
            Address::with_last_byte(0xCC),
            Address::with_last_byte(0xA1),
            MemoryLedgerStore::new(),
            MockChainProvider::new(),
        )
    }

    #[tokio::test]
    async fn sync_without_observer_does_not_panic() {
        let manager = reconciler();
        manager.sync().await;
    }

    #[tokio::test]
    async fn subscribe_replaces_previous_observer() {
        let mut manager = reconciler();
        let mut first = manager.subscribe();
        let mut second = manager.subscribe();

        manager.sync().await;

        assert!(second.next().await.is_some());
        // the first stream's sender was dropped on re-registration
        assert!(first.next().await.is_none());
    }
}
