//! # udtwal-recovery
//!
//! User-defined timestamp size reconciliation for write batches read back
//! from the WAL during crash recovery.
//!
//! A column family with user-defined timestamps carries a fixed-width
//! timestamp suffix on every user key. If that width changes between the
//! time a batch was logged and the time it is replayed, naive replay
//! misaligns or drops the suffix. This crate provides:
//! - The sidecar log record that captures per-column-family timestamp
//!   sizes at write time
//! - A pure rule deciding, per column family, whether a logged key can be
//!   kept, padded, stripped, or cannot be reconciled at all
//! - A replay handler that rebuilds a batch with reconciled user keys
//! - A top-level check that either verifies consistency or performs the
//!   best-effort reconciliation

pub mod check;
pub mod error;
pub mod handler;
pub mod reconcile;
pub mod record;

pub use check::{handle_write_batch_timestamp_size_difference, TimestampSizeConsistencyMode};
pub use error::RecoveryError;
pub use handler::TimestampRecoveryHandler;
pub use reconcile::{key_adjustment, KeyAdjustment, RecordedTimestampSizes, RunningTimestampSizes};
pub use record::TimestampSizeRecord;

/// Encoded width of one sidecar record entry: 4 bytes of column family id
/// followed by 2 bytes of timestamp size.
pub const SIZE_PER_COLUMN_FAMILY: usize = 4 + 2;
