//! # udtwal-batch
//!
//! Write batch container for udtwal.
//!
//! This crate provides:
//! - A tagged entry type covering every mutation kind and transaction marker
//! - An ordered, atomically-applied batch of entries
//! - A visitor-style traversal contract for replaying a batch entry by entry

pub mod batch;
pub mod handler;

pub use batch::{BatchEntry, WriteBatch};
pub use handler::BatchHandler;

/// Identifier of a column family within one storage engine instance.
pub type ColumnFamilyId = u32;
