use alloy::{rpc::types::Log, sol_types::SolEvent};
use tracing::warn;

use crate::{
    TransferRecord,
    erc20::IErc20,
    types::unix_now,
};

/// Turns raw log entries into typed transfer candidates.
///
/// Zero-value logs are dropped only when they are not the sole log for their
/// transaction: this suppresses no-op duplicate zero-transfer noise while still
/// recording a transaction whose only log happens to be a zero transfer.
///
/// Malformed entries (undecodable event data or a missing transaction hash) are
/// skipped with a warning rather than failing the cycle. Input order is
/// preserved.
pub(crate) fn normalize_logs(logs: &[Log]) -> Vec<TransferRecord> {
    let decoded: Vec<(&Log, IErc20::Transfer)> = logs
        .iter()
        .filter_map(|log| {
            if log.transaction_hash.is_none() {
                warn!(log_index = ?log.log_index, "Skipping log without transaction hash");
                return None;
            }
            match IErc20::Transfer::decode_log(&log.inner) {
                Ok(event) => Some((log, event.data)),
                Err(err) => {
                    warn!(
                        error = %err,
                        transaction_hash = ?log.transaction_hash,
                        "Skipping undecodable transfer log"
                    );
                    None
                }
            }
        })
        .collect();

    decoded
        .iter()
        .filter(|(log, event)| {
            // Siblings are counted over the raw input so a skipped malformed
            // entry still disqualifies its zero-value counterpart.
            let siblings = logs
                .iter()
                .filter(|other| other.transaction_hash == log.transaction_hash)
                .count();
            siblings == 1 || !event.value.is_zero()
        })
        .map(|(log, event)| TransferRecord {
            transaction_hash: log.transaction_hash.unwrap_or_default(),
            inter_transaction_index: log.log_index.unwrap_or_default(),
            transaction_index: log.transaction_index,
            log_index: log.log_index,
            from: event.from,
            to: event.to,
            value: event.value,
            timestamp: log.block_timestamp.unwrap_or_else(unix_now),
            block_hash: log.block_hash,
            block_number: log.block_number,
            is_error: false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, B256, U256};

    use super::*;
    use crate::test_utils::transfer_log;

    const A: Address = Address::with_last_byte(0xA1);
    const B: Address = Address::with_last_byte(0xB2);

    #[test]
    fn zero_value_log_with_siblings_is_dropped() {
        let hash = B256::with_last_byte(1);
        let logs = vec![
            transfer_log(hash, 0, A, B, U256::ZERO, 10),
            transfer_log(hash, 1, A, B, U256::from(5), 10),
        ];

        let records = normalize_logs(&logs);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].transaction_hash, hash);
        assert_eq!(records[0].value, U256::from(5));
        assert_eq!(records[0].inter_transaction_index, 1);
    }

    #[test]
    fn solitary_zero_value_log_is_kept() {
        let logs = vec![transfer_log(B256::with_last_byte(2), 3, A, B, U256::ZERO, 11)];

        let records = normalize_logs(&logs);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, U256::ZERO);
    }

    #[test]
    fn decoded_fields_and_order_are_preserved() {
        let first = transfer_log(B256::with_last_byte(3), 2, A, B, U256::from(7), 12);
        let second = transfer_log(B256::with_last_byte(4), 0, B, A, U256::from(9), 13);

        let records = normalize_logs(&[first.clone(), second]);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].from, A);
        assert_eq!(records[0].to, B);
        assert_eq!(records[0].inter_transaction_index, 2);
        assert_eq!(records[0].block_number, first.block_number);
        assert_eq!(records[0].block_hash, first.block_hash);
        assert_eq!(records[1].from, B);
        assert_eq!(records[1].value, U256::from(9));
    }

    #[test]
    fn malformed_log_is_skipped() {
        let mut malformed = transfer_log(B256::with_last_byte(5), 0, A, B, U256::from(1), 14);
        malformed.inner.data = alloy::primitives::LogData::new_unchecked(vec![], Default::default());
        let good = transfer_log(B256::with_last_byte(6), 1, A, B, U256::from(2), 14);

        let records = normalize_logs(&[malformed, good]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, U256::from(2));
    }

    #[test]
    fn zero_value_log_with_malformed_sibling_is_still_dropped() {
        let hash = B256::with_last_byte(8);
        let mut malformed = transfer_log(hash, 0, A, B, U256::from(3), 16);
        malformed.inner.data = alloy::primitives::LogData::new_unchecked(vec![], Default::default());
        let zero = transfer_log(hash, 1, A, B, U256::ZERO, 16);

        let records = normalize_logs(&[malformed, zero]);

        // the zero-value entry has a raw sibling, so it is not solitary
        assert!(records.is_empty());
    }

    #[test]
    fn missing_block_timestamp_falls_back_to_wall_clock() {
        let mut log = transfer_log(B256::with_last_byte(7), 0, A, B, U256::from(1), 15);
        log.block_timestamp = None;

        let records = normalize_logs(&[log]);

        assert!(records[0].timestamp > 0);
    }
}
