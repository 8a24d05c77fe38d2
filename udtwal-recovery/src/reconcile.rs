//! The per-column-family reconciliation rule and the two size maps it
//! consults.
//!
//! The rule over (recorded size, running size):
//! 1. Both zero, or both nonzero and equal: keep the key as is.
//! 2. Recorded zero, running nonzero: pad the key with a min timestamp of
//!    the running size.
//! 3. Recorded nonzero, running zero: strip the trailing recorded-size
//!    bytes from the key.
//! 4. Both nonzero but unequal: not reconcilable without the original
//!    timestamp value.

use crate::error::RecoveryError;
use crate::record::TimestampSizeRecord;
use std::collections::HashMap;
use udtwal_batch::ColumnFamilyId;

/// How a logged user key must change to match the running timestamp size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAdjustment {
    /// Recorded and running sizes agree; the key is already correct.
    Keep,
    /// Append a zero-filled timestamp suffix of the running size.
    Pad { running_ts_sz: usize },
    /// Remove the trailing recorded-size bytes.
    Strip { recorded_ts_sz: usize },
}

/// Decides how a user key logged under `recorded` must be adjusted to match
/// the `running` timestamp size of column family `cf_id`.
///
/// Fails when both sizes are nonzero and unequal: neither padding nor
/// stripping can bridge two different suffix widths.
pub fn key_adjustment(
    cf_id: ColumnFamilyId,
    recorded: usize,
    running: usize,
) -> Result<KeyAdjustment, RecoveryError> {
    if recorded == running {
        Ok(KeyAdjustment::Keep)
    } else if recorded == 0 {
        Ok(KeyAdjustment::Pad {
            running_ts_sz: running,
        })
    } else if running == 0 {
        Ok(KeyAdjustment::Strip {
            recorded_ts_sz: recorded,
        })
    } else {
        Err(RecoveryError::InconsistentTimestampSize {
            cf_id,
            recorded,
            running,
        })
    }
}

/// Timestamp sizes of all running column families, zero included.
///
/// A column family absent from this map has been dropped; stale references
/// to it in old log records are harmless and are ignored.
#[derive(Debug, Clone, Default)]
pub struct RunningTimestampSizes {
    sizes: HashMap<ColumnFamilyId, usize>,
}

impl RunningTimestampSizes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the running timestamp size of a column family.
    pub fn insert(&mut self, cf_id: ColumnFamilyId, ts_sz: usize) {
        self.sizes.insert(cf_id, ts_sz);
    }

    /// Returns the running size, or `None` if the column family was dropped.
    pub fn get(&self, cf_id: ColumnFamilyId) -> Option<usize> {
        self.sizes.get(&cf_id).copied()
    }
}

impl From<HashMap<ColumnFamilyId, usize>> for RunningTimestampSizes {
    fn from(sizes: HashMap<ColumnFamilyId, usize>) -> Self {
        Self { sizes }
    }
}

/// Timestamp sizes as recorded in the WAL ahead of the batches that need
/// them.
///
/// Sparse by writer convention: only column families with a nonzero size
/// are logged, so an absent column family reads as size zero.
#[derive(Debug, Clone, Default)]
pub struct RecordedTimestampSizes {
    sizes: HashMap<ColumnFamilyId, usize>,
}

impl RecordedTimestampSizes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one decoded sidecar record into the map, last writer wins.
    pub fn apply_record(&mut self, record: &TimestampSizeRecord) {
        for (cf_id, ts_sz) in record.entries() {
            self.sizes.insert(*cf_id, *ts_sz as usize);
        }
    }

    /// Returns the recorded size, defaulting to zero when absent.
    pub fn get(&self, cf_id: ColumnFamilyId) -> usize {
        self.sizes.get(&cf_id).copied().unwrap_or(0)
    }
}

impl From<HashMap<ColumnFamilyId, usize>> for RecordedTimestampSizes {
    fn from(sizes: HashMap<ColumnFamilyId, usize>) -> Self {
        Self { sizes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_zero_keeps_key() {
        assert_eq!(key_adjustment(1, 0, 0).unwrap(), KeyAdjustment::Keep);
    }

    #[test]
    fn test_equal_nonzero_keeps_key() {
        assert_eq!(key_adjustment(1, 8, 8).unwrap(), KeyAdjustment::Keep);
        assert_eq!(key_adjustment(1, 1, 1).unwrap(), KeyAdjustment::Keep);
    }

    #[test]
    fn test_recorded_zero_pads_to_running() {
        assert_eq!(
            key_adjustment(1, 0, 8).unwrap(),
            KeyAdjustment::Pad { running_ts_sz: 8 }
        );
    }

    #[test]
    fn test_running_zero_strips_recorded() {
        assert_eq!(
            key_adjustment(1, 8, 0).unwrap(),
            KeyAdjustment::Strip { recorded_ts_sz: 8 }
        );
    }

    #[test]
    fn test_unequal_nonzero_is_unreconcilable() {
        let err = key_adjustment(9, 3, 5).unwrap_err();
        match err {
            RecoveryError::InconsistentTimestampSize {
                cf_id,
                recorded,
                running,
            } => {
                assert_eq!(cf_id, 9);
                assert_eq!(recorded, 3);
                assert_eq!(running, 5);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!err.is_corruption());

        // Symmetric case.
        assert!(key_adjustment(9, 5, 3).is_err());
    }

    #[test]
    fn test_recorded_sizes_default_to_zero() {
        let recorded = RecordedTimestampSizes::new();
        assert_eq!(recorded.get(12), 0);
    }

    #[test]
    fn test_apply_record_last_writer_wins() {
        let mut recorded = RecordedTimestampSizes::new();
        recorded.apply_record(&TimestampSizeRecord::new(vec![(1, 8), (2, 4)]));
        recorded.apply_record(&TimestampSizeRecord::new(vec![(1, 16)]));

        assert_eq!(recorded.get(1), 16);
        assert_eq!(recorded.get(2), 4);
    }

    #[test]
    fn test_running_sizes_distinguish_zero_from_dropped() {
        let mut running = RunningTimestampSizes::new();
        running.insert(1, 0);

        assert_eq!(running.get(1), Some(0));
        assert_eq!(running.get(2), None);
    }
}
