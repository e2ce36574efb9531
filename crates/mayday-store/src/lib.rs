//! Mayday Store - on-disk crash report store
//!
//! The native crash monitor writes one JSON file per crash under
//! `<base_path>/Reports/`. [`FileReportStore`] exposes that directory
//! through the [`IReportStore`](mayday_core::ports::IReportStore) port.

pub mod file_store;

pub use file_store::FileReportStore;
