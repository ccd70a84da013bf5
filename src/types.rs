use std::time::{SystemTime, UNIX_EPOCH};

use alloy::primitives::{Address, BlockHash, TxHash, U256};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::{ReconcileError, store::TransactionKey};

/// A typed token transfer, either observed in a chain log or created locally on
/// submission.
///
/// `(transaction_hash, inter_transaction_index)` uniquely identifies a record
/// within the ledger store. A record without block data is *pending*: it was
/// submitted (or partially observed) but has no confirmed block placement yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    pub transaction_hash: TxHash,
    /// Disambiguates multiple transfers inside one transaction. Defaults to the
    /// source log's index; forced to 0 for transfers that originated locally.
    pub inter_transaction_index: u64,
    pub transaction_index: Option<u64>,
    pub log_index: Option<u64>,
    pub from: Address,
    pub to: Address,
    pub value: U256,
    /// Seconds since epoch. Falls back to local wall-clock time when the
    /// provider supplies no block timestamp.
    pub timestamp: u64,
    pub block_hash: Option<BlockHash>,
    pub block_number: Option<u64>,
    /// Set by the failure detector when the chain reports the transaction as
    /// failed or unknown. Once set it stays set.
    pub is_error: bool,
}

impl TransferRecord {
    /// Creates a record for a just-submitted transfer with no block data.
    #[must_use]
    pub fn pending(transaction_hash: TxHash, from: Address, to: Address, value: U256) -> Self {
        Self {
            transaction_hash,
            inter_transaction_index: 0,
            transaction_index: None,
            log_index: None,
            from,
            to,
            value,
            timestamp: unix_now(),
            block_hash: None,
            block_number: None,
            is_error: false,
        }
    }

    /// The store identity of this record.
    #[must_use]
    pub fn key(&self) -> TransactionKey {
        TransactionKey {
            transaction_hash: self.transaction_hash,
            inter_transaction_index: self.inter_transaction_index,
        }
    }

    /// Whether this record still lacks confirmed block placement.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.block_number.is_none()
    }
}

/// Current wall-clock time in seconds since epoch.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default()
}

/// Terminal outcome of one sync cycle, delivered to the registered observer.
pub type SyncResult = Result<Vec<TransferRecord>, ReconcileError>;

pub(crate) trait TryNotify {
    async fn try_notify(&self, outcome: SyncResult) -> bool;
}

impl TryNotify for mpsc::Sender<SyncResult> {
    async fn try_notify(&self, outcome: SyncResult) -> bool {
        match &outcome {
            Ok(records) => info!(count = records.len(), "Notifying sync success"),
            Err(err) => info!(error = %err, "Notifying sync error"),
        }
        if let Err(err) = self.send(outcome).await {
            warn!(error = %err, "Observer channel closed, dropping notification");
            return false;
        }
        true
    }
}
