//! Report store port (driven/secondary port)
//!
//! The native crash monitor owns the on-disk form of crash records. This
//! port is the narrow view of it the delivery pipeline needs: enumerate,
//! read and erase records by their numeric id.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because storage errors are adapter-specific
//!   and don't need domain-level classification. Callers treat any error
//!   as fatal to the current operation.
//! - `read_report` distinguishes "gone" (`Ok(None)`) from "unreadable"
//!   (`Err`): a record deleted between `report_ids` and `read_report` is
//!   simply skipped.
//! - Implementations provide their own consistency for concurrent calls;
//!   the use cases add no locking around the store.

use std::path::Path;

/// Port trait for the crash monitor's report store
#[async_trait::async_trait]
pub trait IReportStore: Send + Sync {
    /// Prepares the store for `bundle_id` under `base_path`
    async fn install(&self, bundle_id: &str, base_path: &Path) -> anyhow::Result<()>;

    /// Number of pending reports
    async fn report_count(&self) -> anyhow::Result<usize>;

    /// Ids of every pending report
    async fn report_ids(&self) -> anyhow::Result<Vec<i64>>;

    /// Raw bytes of a report, or `None` if it no longer exists
    async fn read_report(&self, id: i64) -> anyhow::Result<Option<Vec<u8>>>;

    /// Erases a single report. Erasing a missing report is not an error.
    async fn delete_report(&self, id: i64) -> anyhow::Result<()>;

    /// Erases every report
    async fn delete_all_reports(&self) -> anyhow::Result<()>;
}
