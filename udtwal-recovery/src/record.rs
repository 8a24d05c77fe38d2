//! Sidecar WAL record carrying per-column-family timestamp sizes.
//!
//! On-disk format, repeated once per column family with no header or count
//! prefix (the byte length alone determines the entry count):
//!
//! ```text
//! +---------------------+----------------+
//! | column family id    | timestamp size |
//! | 4 bytes             | 2 bytes        |
//! +---------------------+----------------+
//! ```

use crate::error::RecoveryError;
use crate::SIZE_PER_COLUMN_FAMILY;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fmt;
use udtwal_batch::ColumnFamilyId;

/// A decoded (or to-be-encoded) timestamp size record.
///
/// Entries keep the order they were constructed in; a column family with a
/// zero timestamp size is never recorded, by writer-side convention. The
/// record places no uniqueness constraint on column family ids — duplicates
/// are preserved and the reader decides last-writer semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimestampSizeRecord {
    cf_to_ts_sz: Vec<(ColumnFamilyId, u16)>,
}

impl TimestampSizeRecord {
    /// Creates a record from (column family id, timestamp size) pairs.
    ///
    /// Every timestamp size must be nonzero; violating that is a caller bug.
    pub fn new(cf_to_ts_sz: Vec<(ColumnFamilyId, u16)>) -> Self {
        debug_assert!(cf_to_ts_sz.iter().all(|(_, ts_sz)| *ts_sz != 0));
        Self { cf_to_ts_sz }
    }

    /// Returns the recorded pairs in construction order.
    pub fn entries(&self) -> &[(ColumnFamilyId, u16)] {
        &self.cf_to_ts_sz
    }

    /// Returns the number of recorded pairs.
    pub fn len(&self) -> usize {
        self.cf_to_ts_sz.len()
    }

    /// Returns whether the record holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.cf_to_ts_sz.is_empty()
    }

    /// Appends the encoded record to `buf`.
    pub fn encode_to(&self, buf: &mut BytesMut) {
        buf.reserve(self.cf_to_ts_sz.len() * SIZE_PER_COLUMN_FAMILY);
        for (cf_id, ts_sz) in &self.cf_to_ts_sz {
            debug_assert!(*ts_sz != 0);
            buf.put_u32(*cf_id);
            buf.put_u16(*ts_sz);
        }
    }

    /// Encodes the record into a fresh buffer.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::new();
        self.encode_to(&mut buf);
        buf.freeze()
    }

    /// Decodes a record from the payload of one sidecar log record.
    pub fn decode(src: &[u8]) -> Result<Self, RecoveryError> {
        if src.len() % SIZE_PER_COLUMN_FAMILY != 0 {
            return Err(RecoveryError::MalformedSizeRecord { len: src.len() });
        }

        let mut src = src;
        let mut cf_to_ts_sz = Vec::with_capacity(src.len() / SIZE_PER_COLUMN_FAMILY);
        while src.has_remaining() {
            let cf_id = src.get_u32();
            let ts_sz = src.get_u16();
            cf_to_ts_sz.push((cf_id, ts_sz));
        }

        Ok(Self { cf_to_ts_sz })
    }
}

impl fmt::Display for TimestampSizeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (cf_id, ts_sz) in &self.cf_to_ts_sz {
            writeln!(
                f,
                "Column family: {}, user-defined timestamp size: {}",
                cf_id, ts_sz
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_record_roundtrip() {
        let record = TimestampSizeRecord::new(vec![(1, 8), (2, 16), (42, 1)]);

        let encoded = record.encode();
        assert_eq!(encoded.len(), 3 * SIZE_PER_COLUMN_FAMILY);

        let decoded = TimestampSizeRecord::decode(&encoded).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_empty_record_roundtrip() {
        let record = TimestampSizeRecord::default();
        let encoded = record.encode();
        assert!(encoded.is_empty());

        let decoded = TimestampSizeRecord::decode(&encoded).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_decode_rejects_bad_length() {
        let err = TimestampSizeRecord::decode(&[0u8; 7]).unwrap_err();
        match err {
            RecoveryError::MalformedSizeRecord { len } => assert_eq!(len, 7),
            other => panic!("unexpected error: {other:?}"),
        }
        // The actual length must show up in the message for diagnosis.
        assert!(err.to_string().contains('7'));
        assert!(err.to_string().contains('6'));
    }

    #[test]
    fn test_decode_rejects_truncated_entry() {
        let record = TimestampSizeRecord::new(vec![(1, 8), (2, 16)]);
        let encoded = record.encode();

        let truncated = &encoded[..encoded.len() - 1];
        assert!(matches!(
            TimestampSizeRecord::decode(truncated),
            Err(RecoveryError::MalformedSizeRecord { len: 11 })
        ));
    }

    #[test]
    fn test_duplicates_preserved_in_order() {
        let record = TimestampSizeRecord::new(vec![(5, 8), (5, 4), (5, 8)]);
        let decoded = TimestampSizeRecord::decode(&record.encode()).unwrap();
        assert_eq!(decoded.entries(), &[(5, 8), (5, 4), (5, 8)]);
    }

    #[test]
    fn test_display_one_line_per_entry() {
        let record = TimestampSizeRecord::new(vec![(1, 8), (9, 16)]);
        let text = record.to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Column family: 1, user-defined timestamp size: 8");
        assert_eq!(lines[1], "Column family: 9, user-defined timestamp size: 16");
    }

    proptest! {
        #[test]
        fn prop_roundtrip(entries in prop::collection::vec((any::<u32>(), 1u16..=u16::MAX), 0..64)) {
            let record = TimestampSizeRecord::new(entries);
            let decoded = TimestampSizeRecord::decode(&record.encode()).unwrap();
            prop_assert_eq!(decoded, record);
        }
    }
}
