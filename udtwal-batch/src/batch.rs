//! Write batch entries and the batch container.

use crate::handler::BatchHandler;
use crate::ColumnFamilyId;
use bytes::Bytes;
use std::collections::BTreeSet;

/// A single entry in a write batch.
///
/// Mutation entries carry a column family id and one or two user keys;
/// transaction markers carry no user keys and are ignored by key-level
/// processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEntry {
    /// Key/value insert or overwrite.
    Put {
        cf_id: ColumnFamilyId,
        key: Bytes,
        value: Bytes,
    },
    /// Point delete.
    Delete { cf_id: ColumnFamilyId, key: Bytes },
    /// Delete of a key written at most once.
    SingleDelete { cf_id: ColumnFamilyId, key: Bytes },
    /// Delete of the range `[begin_key, end_key)`.
    DeleteRange {
        cf_id: ColumnFamilyId,
        begin_key: Bytes,
        end_key: Bytes,
    },
    /// Merge operand for a key.
    Merge {
        cf_id: ColumnFamilyId,
        key: Bytes,
        operand: Bytes,
    },
    /// Put whose value is an index into separately stored blob data.
    PutBlobIndex {
        cf_id: ColumnFamilyId,
        key: Bytes,
        blob_index: Bytes,
    },
    /// Start of a two-phase-commit prepare section.
    BeginPrepare { unprepared: bool },
    /// End of a prepare section, naming the transaction.
    EndPrepare { xid: Bytes },
    /// Commit marker for a prepared transaction.
    Commit { xid: Bytes },
    /// Commit marker carrying an explicit commit timestamp.
    CommitWithTimestamp { xid: Bytes, commit_ts: Bytes },
    /// Rollback marker for a prepared transaction.
    Rollback { xid: Bytes },
    /// Padding entry for an otherwise empty batch.
    Noop { empty_batch: bool },
}

impl BatchEntry {
    /// Returns the column family this entry mutates, if it is a mutation.
    pub fn column_family_id(&self) -> Option<ColumnFamilyId> {
        match self {
            BatchEntry::Put { cf_id, .. }
            | BatchEntry::Delete { cf_id, .. }
            | BatchEntry::SingleDelete { cf_id, .. }
            | BatchEntry::DeleteRange { cf_id, .. }
            | BatchEntry::Merge { cf_id, .. }
            | BatchEntry::PutBlobIndex { cf_id, .. } => Some(*cf_id),
            BatchEntry::BeginPrepare { .. }
            | BatchEntry::EndPrepare { .. }
            | BatchEntry::Commit { .. }
            | BatchEntry::CommitWithTimestamp { .. }
            | BatchEntry::Rollback { .. }
            | BatchEntry::Noop { .. } => None,
        }
    }
}

/// An ordered group of mutations applied atomically.
///
/// Entries keep their append order; `iterate` replays them in that order
/// against a [`BatchHandler`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    entries: Vec<BatchEntry>,
}

impl WriteBatch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a put entry.
    pub fn put(
        &mut self,
        cf_id: ColumnFamilyId,
        key: impl Into<Bytes>,
        value: impl Into<Bytes>,
    ) {
        self.entries.push(BatchEntry::Put {
            cf_id,
            key: key.into(),
            value: value.into(),
        });
    }

    /// Appends a point delete entry.
    pub fn delete(&mut self, cf_id: ColumnFamilyId, key: impl Into<Bytes>) {
        self.entries.push(BatchEntry::Delete {
            cf_id,
            key: key.into(),
        });
    }

    /// Appends a single-delete entry.
    pub fn single_delete(&mut self, cf_id: ColumnFamilyId, key: impl Into<Bytes>) {
        self.entries.push(BatchEntry::SingleDelete {
            cf_id,
            key: key.into(),
        });
    }

    /// Appends a range delete entry.
    pub fn delete_range(
        &mut self,
        cf_id: ColumnFamilyId,
        begin_key: impl Into<Bytes>,
        end_key: impl Into<Bytes>,
    ) {
        self.entries.push(BatchEntry::DeleteRange {
            cf_id,
            begin_key: begin_key.into(),
            end_key: end_key.into(),
        });
    }

    /// Appends a merge entry.
    pub fn merge(
        &mut self,
        cf_id: ColumnFamilyId,
        key: impl Into<Bytes>,
        operand: impl Into<Bytes>,
    ) {
        self.entries.push(BatchEntry::Merge {
            cf_id,
            key: key.into(),
            operand: operand.into(),
        });
    }

    /// Appends a blob index put entry.
    pub fn put_blob_index(
        &mut self,
        cf_id: ColumnFamilyId,
        key: impl Into<Bytes>,
        blob_index: impl Into<Bytes>,
    ) {
        self.entries.push(BatchEntry::PutBlobIndex {
            cf_id,
            key: key.into(),
            blob_index: blob_index.into(),
        });
    }

    /// Appends a raw entry, including transaction markers.
    pub fn push(&mut self, entry: BatchEntry) {
        self.entries.push(entry);
    }

    /// Returns the entries in append order.
    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    /// Returns the number of entries in the batch.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the batch has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the set of column families referenced by any mutation entry.
    pub fn column_family_ids(&self) -> BTreeSet<ColumnFamilyId> {
        self.entries
            .iter()
            .filter_map(BatchEntry::column_family_id)
            .collect()
    }

    /// Replays every entry, in order, against `handler`.
    ///
    /// Stops at the first callback error and returns it.
    pub fn iterate<H: BatchHandler>(&self, handler: &mut H) -> Result<(), H::Error> {
        for entry in &self.entries {
            match entry {
                BatchEntry::Put { cf_id, key, value } => handler.put(*cf_id, key, value)?,
                BatchEntry::Delete { cf_id, key } => handler.delete(*cf_id, key)?,
                BatchEntry::SingleDelete { cf_id, key } => handler.single_delete(*cf_id, key)?,
                BatchEntry::DeleteRange {
                    cf_id,
                    begin_key,
                    end_key,
                } => handler.delete_range(*cf_id, begin_key, end_key)?,
                BatchEntry::Merge {
                    cf_id,
                    key,
                    operand,
                } => handler.merge(*cf_id, key, operand)?,
                BatchEntry::PutBlobIndex {
                    cf_id,
                    key,
                    blob_index,
                } => handler.put_blob_index(*cf_id, key, blob_index)?,
                BatchEntry::BeginPrepare { unprepared } => {
                    handler.mark_begin_prepare(*unprepared)?
                }
                BatchEntry::EndPrepare { xid } => handler.mark_end_prepare(xid)?,
                BatchEntry::Commit { xid } => handler.mark_commit(xid)?,
                BatchEntry::CommitWithTimestamp { xid, commit_ts } => {
                    handler.mark_commit_with_timestamp(xid, commit_ts)?
                }
                BatchEntry::Rollback { xid } => handler.mark_rollback(xid)?,
                BatchEntry::Noop { empty_batch } => handler.mark_noop(*empty_batch)?,
            }
        }
        Ok(())
    }
}
