use tracing::debug;

use crate::TransferRecord;

/// Aligns candidate records with the locally known pending set.
///
/// A candidate whose `(transaction_hash, from, to)` matches a pending record
/// originated from a local send; its `inter_transaction_index` is normalized to
/// 0 so the observed log updates the stored pending row instead of inserting a
/// second record under the log's index.
pub(crate) fn align_with_pending(candidates: &mut [TransferRecord], pending: &[TransferRecord]) {
    for candidate in candidates.iter_mut() {
        let locally_known = pending.iter().any(|p| {
            p.transaction_hash == candidate.transaction_hash
                && p.from == candidate.from
                && p.to == candidate.to
        });
        if locally_known && candidate.inter_transaction_index != 0 {
            debug!(
                transaction_hash = %candidate.transaction_hash,
                log_index = ?candidate.log_index,
                "Normalizing index for locally initiated transfer"
            );
            candidate.inter_transaction_index = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, B256, U256};

    use super::*;
    use crate::test_utils::{pending_record, transfer_log};
    use crate::reconciler::normalizer::normalize_logs;

    const A: Address = Address::with_last_byte(0xA1);
    const B: Address = Address::with_last_byte(0xB2);
    const C: Address = Address::with_last_byte(0xC3);

    #[test]
    fn matching_pending_record_forces_index_zero() {
        let hash = B256::with_last_byte(1);
        let mut candidates = normalize_logs(&[transfer_log(hash, 3, A, C, U256::from(5), 20)]);
        let pending = vec![pending_record(hash, A, C, U256::from(5))];

        align_with_pending(&mut candidates, &pending);

        assert_eq!(candidates[0].inter_transaction_index, 0);
    }

    #[test]
    fn unrelated_candidates_keep_their_log_index() {
        let mut candidates =
            normalize_logs(&[transfer_log(B256::with_last_byte(2), 3, A, B, U256::from(5), 20)]);
        // same hash but different recipient
        let pending = vec![pending_record(B256::with_last_byte(2), A, C, U256::from(5))];

        align_with_pending(&mut candidates, &pending);

        assert_eq!(candidates[0].inter_transaction_index, 3);
    }

    #[test]
    fn empty_pending_set_is_a_no_op() {
        let mut candidates =
            normalize_logs(&[transfer_log(B256::with_last_byte(3), 7, A, B, U256::from(1), 21)]);

        align_with_pending(&mut candidates, &[]);

        assert_eq!(candidates[0].inter_transaction_index, 7);
    }
}
