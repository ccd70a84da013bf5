//! Scriptable collaborators and fixture helpers for testing the reconciler.
//!
//! Enabled with the `test-utils` feature (always available to this crate's own
//! tests).

mod macros;

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use alloy::{
    primitives::{Address, B256, Bytes, TxHash, U256},
    rpc::types::Log,
    sol_types::SolEvent,
};

use crate::{
    ChainProvider, LedgerStore, ProviderError, TransactionStatus, TransferRecord,
    erc20::IErc20,
    store::TransactionKey,
};

/// Fabricates a well-formed `Transfer` log entry.
#[must_use]
pub fn transfer_log(
    hash: TxHash,
    log_index: u64,
    from: Address,
    to: Address,
    value: U256,
    block_number: u64,
) -> Log {
    let event = IErc20::Transfer { from, to, value };
    Log {
        inner: alloy::primitives::Log { address: Address::ZERO, data: event.encode_log_data() },
        block_hash: Some(B256::from(U256::from(block_number))),
        block_number: Some(block_number),
        block_timestamp: Some(1_700_000_000 + block_number),
        transaction_hash: Some(hash),
        transaction_index: Some(0),
        log_index: Some(log_index),
        removed: false,
    }
}

/// Fabricates a locally known pending record (no block data).
#[must_use]
pub fn pending_record(hash: TxHash, from: Address, to: Address, value: U256) -> TransferRecord {
    TransferRecord::pending(hash, from, to, value)
}

/// In-memory [`LedgerStore`] honoring the upsert-by-key invariant and
/// newest-first query ordering.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    records: Mutex<Vec<TransferRecord>>,
}

impl MemoryLedgerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every persisted record, in insertion order.
    #[must_use]
    pub fn all(&self) -> Vec<TransferRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn get_transactions(
        &self,
        from: Option<&TransactionKey>,
        limit: Option<usize>,
    ) -> Vec<TransferRecord> {
        let mut records = self.records.lock().unwrap().clone();
        records.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then(b.block_number.cmp(&a.block_number))
                .then(b.log_index.cmp(&a.log_index))
        });

        let start = from
            .and_then(|key| records.iter().position(|r| r.key() == *key).map(|i| i + 1))
            .unwrap_or(0);
        let records = records.into_iter().skip(start);
        match limit {
            Some(limit) => records.take(limit).collect(),
            None => records.collect(),
        }
    }

    fn get_pending_transactions(&self) -> Vec<TransferRecord> {
        self.records.lock().unwrap().iter().filter(|r| r.is_pending()).cloned().collect()
    }

    fn save(&self, records: &[TransferRecord]) {
        let mut stored = self.records.lock().unwrap();
        for record in records {
            if let Some(existing) = stored.iter_mut().find(|r| r.key() == record.key()) {
                *existing = record.clone();
            } else {
                stored.push(record.clone());
            }
        }
    }

    fn last_transaction_block_height(&self) -> Option<u64> {
        self.records.lock().unwrap().iter().filter_map(|r| r.block_number).max()
    }
}

/// Scriptable [`ChainProvider`].
///
/// Configure responses with the `with_*` builder methods; every call site is
/// recorded so tests can assert which lookups ran.
#[derive(Debug, Default)]
pub struct MockChainProvider {
    height: u64,
    height_error: Option<ProviderError>,
    logs: Vec<Log>,
    fetch_error: Option<ProviderError>,
    statuses: HashMap<TxHash, TransactionStatus>,
    status_error: Option<ProviderError>,
    submit_hash: TxHash,
    submit_error: Option<ProviderError>,
    status_lookups: AtomicUsize,
    fetched_ranges: Mutex<Vec<(u64, u64)>>,
    submissions: Mutex<Vec<(Address, Bytes, u128, u64)>>,
}

impl MockChainProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_height(mut self, height: u64) -> Self {
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_height_error(mut self, error: ProviderError) -> Self {
        self.height_error = Some(error);
        self
    }

    #[must_use]
    pub fn with_logs(mut self, logs: impl Into<Vec<Log>>) -> Self {
        self.logs = logs.into();
        self
    }

    #[must_use]
    pub fn with_fetch_error(mut self, error: ProviderError) -> Self {
        self.fetch_error = Some(error);
        self
    }

    #[must_use]
    pub fn with_statuses(
        mut self,
        statuses: impl IntoIterator<Item = (TxHash, TransactionStatus)>,
    ) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_status_error(mut self, error: ProviderError) -> Self {
        self.status_error = Some(error);
        self
    }

    #[must_use]
    pub fn with_submit_hash(mut self, hash: TxHash) -> Self {
        self.submit_hash = hash;
        self
    }

    #[must_use]
    pub fn with_submit_error(mut self, error: ProviderError) -> Self {
        self.submit_error = Some(error);
        self
    }

    /// How many status lookups ran.
    #[must_use]
    pub fn status_lookups(&self) -> usize {
        self.status_lookups.load(Ordering::SeqCst)
    }

    /// Every `(from_block, to_block)` range passed to `fetch_logs`.
    #[must_use]
    pub fn fetched_ranges(&self) -> Vec<(u64, u64)> {
        self.fetched_ranges.lock().unwrap().clone()
    }

    /// Every `(contract, call_data, gas_price, gas_limit)` submission attempt.
    #[must_use]
    pub fn submissions(&self) -> Vec<(Address, Bytes, u128, u64)> {
        self.submissions.lock().unwrap().clone()
    }
}

impl ChainProvider for MockChainProvider {
    async fn current_chain_height(&self) -> Result<u64, ProviderError> {
        if let Some(err) = &self.height_error {
            return Err(err.clone());
        }
        Ok(self.height)
    }

    async fn fetch_logs(
        &self,
        _contract: Address,
        _account: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<Log>, ProviderError> {
        self.fetched_ranges.lock().unwrap().push((from_block, to_block));
        if let Some(err) = &self.fetch_error {
            return Err(err.clone());
        }
        Ok(self.logs.clone())
    }

    async fn fetch_statuses(
        &self,
        hashes: &[TxHash],
    ) -> Result<HashMap<TxHash, TransactionStatus>, ProviderError> {
        self.status_lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.status_error {
            return Err(err.clone());
        }
        Ok(hashes.iter().filter_map(|h| self.statuses.get(h).map(|s| (*h, *s))).collect())
    }

    async fn submit(
        &self,
        contract: Address,
        call_data: Bytes,
        gas_price: u128,
        gas_limit: u64,
    ) -> Result<TxHash, ProviderError> {
        self.submissions.lock().unwrap().push((contract, call_data, gas_price, gas_limit));
        if let Some(err) = &self.submit_error {
            return Err(err.clone());
        }
        Ok(self.submit_hash)
    }
}
