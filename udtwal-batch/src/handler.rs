//! Visitor contract for replaying a write batch.

use crate::ColumnFamilyId;
use bytes::Bytes;

/// Receives one callback per batch entry during [`WriteBatch::iterate`].
///
/// Mutation callbacks must be implemented; transaction marker callbacks
/// default to no-ops since most handlers only care about user keys.
///
/// [`WriteBatch::iterate`]: crate::WriteBatch::iterate
pub trait BatchHandler {
    type Error;

    fn put(&mut self, cf_id: ColumnFamilyId, key: &Bytes, value: &Bytes)
        -> Result<(), Self::Error>;

    fn delete(&mut self, cf_id: ColumnFamilyId, key: &Bytes) -> Result<(), Self::Error>;

    fn single_delete(&mut self, cf_id: ColumnFamilyId, key: &Bytes) -> Result<(), Self::Error>;

    fn delete_range(
        &mut self,
        cf_id: ColumnFamilyId,
        begin_key: &Bytes,
        end_key: &Bytes,
    ) -> Result<(), Self::Error>;

    fn merge(
        &mut self,
        cf_id: ColumnFamilyId,
        key: &Bytes,
        operand: &Bytes,
    ) -> Result<(), Self::Error>;

    fn put_blob_index(
        &mut self,
        cf_id: ColumnFamilyId,
        key: &Bytes,
        blob_index: &Bytes,
    ) -> Result<(), Self::Error>;

    fn mark_begin_prepare(&mut self, _unprepared: bool) -> Result<(), Self::Error> {
        Ok(())
    }

    fn mark_end_prepare(&mut self, _xid: &Bytes) -> Result<(), Self::Error> {
        Ok(())
    }

    fn mark_commit(&mut self, _xid: &Bytes) -> Result<(), Self::Error> {
        Ok(())
    }

    fn mark_commit_with_timestamp(
        &mut self,
        _xid: &Bytes,
        _commit_ts: &Bytes,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    fn mark_rollback(&mut self, _xid: &Bytes) -> Result<(), Self::Error> {
        Ok(())
    }

    fn mark_noop(&mut self, _empty_batch: bool) -> Result<(), Self::Error> {
        Ok(())
    }
}
