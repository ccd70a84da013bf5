//! Contract for the durable transaction ledger.
//!
//! The persistence engine itself (schema, migrations, encoding) is out of
//! scope; the reconciler only requires the operations below. Implementations
//! must support concurrent reads against at most one in-flight writer.

use alloy::primitives::TxHash;

use crate::TransferRecord;

/// Paging cursor and upsert key for the ledger store.
///
/// Together the two fields uniquely identify a [`TransferRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionKey {
    pub transaction_hash: TxHash,
    pub inter_transaction_index: u64,
}

/// Durable append/update store for [`TransferRecord`]s.
///
/// All operations are synchronous: the reconciler performs its merge as plain
/// CPU work between the provider's suspension points.
pub trait LedgerStore {
    /// Returns persisted records ordered newest first, starting strictly after
    /// `from` when given, up to `limit` entries.
    fn get_transactions(
        &self,
        from: Option<&TransactionKey>,
        limit: Option<usize>,
    ) -> Vec<TransferRecord>;

    /// Returns every record that still lacks block data.
    fn get_pending_transactions(&self) -> Vec<TransferRecord>;

    /// Idempotent upsert keyed by `(transaction_hash, inter_transaction_index)`.
    fn save(&self, records: &[TransferRecord]);

    /// The maximum `block_number` across persisted records, if any.
    fn last_transaction_block_height(&self) -> Option<u64>;
}
