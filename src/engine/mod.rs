//! Pure computation: position lifecycle, the working set, and record
//! reconciliation. Nothing here performs I/O.

pub mod book;
pub mod lifecycle;
pub mod reconcile;

pub use book::PositionBook;
pub use reconcile::{reconcile, ReconcileReport, RecordIssue};
