use alloy::primitives::TxHash;
use tracing::{info, warn};

use crate::{ChainProvider, TransactionStatus, TransferRecord};

/// Flags pending transactions the chain reports as failed or unknown.
///
/// Returns a clone of each affected pending record with `is_error` set. If the
/// status lookup itself fails, the error is absorbed and no failures are
/// reported this cycle; the sync still completes with log-derived candidates.
pub(crate) async fn detect_failures<P: ChainProvider>(
    provider: &P,
    pending: &[TransferRecord],
) -> Vec<TransferRecord> {
    let hashes: Vec<TxHash> = pending.iter().map(|p| p.transaction_hash).collect();

    let statuses = match provider.fetch_statuses(&hashes).await {
        Ok(statuses) => statuses,
        Err(err) => {
            warn!(error = %err, "Status lookup failed, deferring failure detection");
            return Vec::new();
        }
    };

    let failed: Vec<TransferRecord> = statuses
        .iter()
        .filter(|(_, status)| {
            matches!(status, TransactionStatus::Failed | TransactionStatus::NotFound)
        })
        .filter_map(|(hash, _)| pending.iter().find(|p| p.transaction_hash == *hash))
        .map(|record| {
            let mut failed = record.clone();
            failed.is_error = true;
            failed
        })
        .collect();

    if !failed.is_empty() {
        info!(count = failed.len(), "Pending transactions flagged as failed");
    }

    failed
}
