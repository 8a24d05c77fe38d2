//! Replay handler that rebuilds a write batch with reconciled user keys.

use crate::error::RecoveryError;
use crate::reconcile::{key_adjustment, KeyAdjustment, RecordedTimestampSizes, RunningTimestampSizes};
use bytes::{BufMut, Bytes, BytesMut};
use udtwal_batch::{BatchHandler, ColumnFamilyId, WriteBatch};

/// Rebuilds a batch read from the WAL so every user key matches the running
/// timestamp size of its column family.
///
/// Feed it to [`WriteBatch::iterate`], then call
/// [`transfer_new_batch`](Self::transfer_new_batch) to take the rebuilt
/// batch. The rebuilt batch is fresh even when nothing needed rewriting, in
/// which case it compares equal to the original.
///
/// Entries for column families missing from the running map belong to
/// dropped column families and are copied over unchanged. Transaction
/// markers carry no user keys and are not replicated.
pub struct TimestampRecoveryHandler<'a> {
    running_ts_sz: &'a RunningTimestampSizes,
    record_ts_sz: &'a RecordedTimestampSizes,
    new_batch: WriteBatch,
    new_batch_diff_from_orig_batch: bool,
}

impl<'a> TimestampRecoveryHandler<'a> {
    pub fn new(
        running_ts_sz: &'a RunningTimestampSizes,
        record_ts_sz: &'a RecordedTimestampSizes,
    ) -> Self {
        Self {
            running_ts_sz,
            record_ts_sz,
            new_batch: WriteBatch::new(),
            new_batch_diff_from_orig_batch: false,
        }
    }

    /// Returns whether any user key was rewritten so far.
    pub fn new_batch_differs(&self) -> bool {
        self.new_batch_diff_from_orig_batch
    }

    /// Takes ownership of the rebuilt batch, consuming the handler.
    pub fn transfer_new_batch(self) -> WriteBatch {
        self.new_batch
    }

    fn reconcile_key(
        &mut self,
        cf_id: ColumnFamilyId,
        key: &Bytes,
    ) -> Result<Bytes, RecoveryError> {
        // A column family absent from the running map has been dropped;
        // its stale entries are copied over as is.
        let Some(running) = self.running_ts_sz.get(cf_id) else {
            return Ok(key.clone());
        };
        let recorded = self.record_ts_sz.get(cf_id);

        match key_adjustment(cf_id, recorded, running)? {
            KeyAdjustment::Keep => Ok(key.clone()),
            KeyAdjustment::Pad { running_ts_sz } => {
                let mut buf = BytesMut::with_capacity(key.len() + running_ts_sz);
                buf.put_slice(key);
                buf.put_bytes(0, running_ts_sz);
                self.new_batch_diff_from_orig_batch = true;
                tracing::debug!(
                    "Padded user key in column family {} with a min timestamp of size {}",
                    cf_id,
                    running_ts_sz
                );
                Ok(buf.freeze())
            }
            KeyAdjustment::Strip { recorded_ts_sz } => {
                if key.len() < recorded_ts_sz {
                    return Err(RecoveryError::KeyTooShort {
                        cf_id,
                        key_len: key.len(),
                        ts_sz: recorded_ts_sz,
                    });
                }
                self.new_batch_diff_from_orig_batch = true;
                tracing::debug!(
                    "Stripped timestamp of size {} from user key in column family {}",
                    recorded_ts_sz,
                    cf_id
                );
                Ok(key.slice(..key.len() - recorded_ts_sz))
            }
        }
    }
}

impl BatchHandler for TimestampRecoveryHandler<'_> {
    type Error = RecoveryError;

    fn put(&mut self, cf_id: ColumnFamilyId, key: &Bytes, value: &Bytes) -> Result<(), RecoveryError> {
        let new_key = self.reconcile_key(cf_id, key)?;
        self.new_batch.put(cf_id, new_key, value.clone());
        Ok(())
    }

    fn delete(&mut self, cf_id: ColumnFamilyId, key: &Bytes) -> Result<(), RecoveryError> {
        let new_key = self.reconcile_key(cf_id, key)?;
        self.new_batch.delete(cf_id, new_key);
        Ok(())
    }

    fn single_delete(&mut self, cf_id: ColumnFamilyId, key: &Bytes) -> Result<(), RecoveryError> {
        let new_key = self.reconcile_key(cf_id, key)?;
        self.new_batch.single_delete(cf_id, new_key);
        Ok(())
    }

    fn delete_range(
        &mut self,
        cf_id: ColumnFamilyId,
        begin_key: &Bytes,
        end_key: &Bytes,
    ) -> Result<(), RecoveryError> {
        // Both range ends are reconciled independently against the same
        // column family's sizes.
        let new_begin = self.reconcile_key(cf_id, begin_key)?;
        let new_end = self.reconcile_key(cf_id, end_key)?;
        self.new_batch.delete_range(cf_id, new_begin, new_end);
        Ok(())
    }

    fn merge(
        &mut self,
        cf_id: ColumnFamilyId,
        key: &Bytes,
        operand: &Bytes,
    ) -> Result<(), RecoveryError> {
        let new_key = self.reconcile_key(cf_id, key)?;
        self.new_batch.merge(cf_id, new_key, operand.clone());
        Ok(())
    }

    fn put_blob_index(
        &mut self,
        cf_id: ColumnFamilyId,
        key: &Bytes,
        blob_index: &Bytes,
    ) -> Result<(), RecoveryError> {
        let new_key = self.reconcile_key(cf_id, key)?;
        self.new_batch.put_blob_index(cf_id, new_key, blob_index.clone());
        Ok(())
    }
}
