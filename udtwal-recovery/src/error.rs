//! Recovery error types.

use thiserror::Error;
use udtwal_batch::ColumnFamilyId;

/// Errors raised while reconciling timestamp sizes during WAL replay.
#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("user-defined timestamp size record length {len} is not a multiple of 6")]
    MalformedSizeRecord { len: usize },

    #[error(
        "column family {cf_id} has inconsistent user-defined timestamp sizes: \
         recorded {recorded}, running {running}"
    )]
    InconsistentTimestampSize {
        cf_id: ColumnFamilyId,
        recorded: usize,
        running: usize,
    },

    #[error(
        "user key of length {key_len} in column family {cf_id} is shorter than \
         its recorded timestamp size {ts_sz}"
    )]
    KeyTooShort {
        cf_id: ColumnFamilyId,
        key_len: usize,
        ts_sz: usize,
    },
}

impl RecoveryError {
    /// Returns whether this error means the log bytes themselves are
    /// untrustworthy, as opposed to a configuration mismatch.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            RecoveryError::MalformedSizeRecord { .. } | RecoveryError::KeyTooShort { .. }
        )
    }
}
