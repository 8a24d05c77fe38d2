//! Top-level consistency check over one write batch read from the WAL.

use crate::error::RecoveryError;
use crate::handler::TimestampRecoveryHandler;
use crate::reconcile::{key_adjustment, KeyAdjustment, RecordedTimestampSizes, RunningTimestampSizes};
use udtwal_batch::WriteBatch;

/// How to treat a timestamp size inconsistency found in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampSizeConsistencyMode {
    /// Require the recorded size to match the running size for every
    /// column family the batch references. Dropped column families are
    /// ignored. No new batch is produced.
    VerifyConsistency,
    /// Tolerate any inconsistency a best-effort rewrite can bridge and
    /// rebuild the batch against the running sizes. The rebuilt batch is
    /// returned even when no entry needed rewriting.
    ReconcileInconsistency,
}

/// Checks one batch against the recorded and running timestamp sizes.
///
/// `running_ts_sz` must cover every running column family, zero sizes
/// included; `record_ts_sz` is the sparse map accumulated from the sidecar
/// records logged ahead of this batch.
///
/// Returns `Ok(None)` in verify mode and `Ok(Some(new_batch))` in reconcile
/// mode. An error means the batch has an inconsistency the given mode does
/// not tolerate; no batch is returned in that case.
pub fn handle_write_batch_timestamp_size_difference(
    batch: &WriteBatch,
    running_ts_sz: &RunningTimestampSizes,
    record_ts_sz: &RecordedTimestampSizes,
    check_mode: TimestampSizeConsistencyMode,
) -> Result<Option<WriteBatch>, RecoveryError> {
    match check_mode {
        TimestampSizeConsistencyMode::VerifyConsistency => {
            for cf_id in batch.column_family_ids() {
                let Some(running) = running_ts_sz.get(cf_id) else {
                    continue;
                };
                let recorded = record_ts_sz.get(cf_id);
                match key_adjustment(cf_id, recorded, running)? {
                    KeyAdjustment::Keep => {}
                    KeyAdjustment::Pad { .. } | KeyAdjustment::Strip { .. } => {
                        return Err(RecoveryError::InconsistentTimestampSize {
                            cf_id,
                            recorded,
                            running,
                        });
                    }
                }
            }
            Ok(None)
        }
        TimestampSizeConsistencyMode::ReconcileInconsistency => {
            let mut handler = TimestampRecoveryHandler::new(running_ts_sz, record_ts_sz);
            batch.iterate(&mut handler)?;
            if handler.new_batch_differs() {
                tracing::warn!(
                    "Rewrote user keys in a recovered write batch of {} entries to match \
                     running timestamp sizes",
                    batch.len()
                );
            }
            Ok(Some(handler.transfer_new_batch()))
        }
    }
}
