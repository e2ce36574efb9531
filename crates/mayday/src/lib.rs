//! Mayday - post-capture crash reporting
//!
//! Once a native crash monitor has written crash records to disk, Mayday
//! decodes them, attaches a one-line diagnosis of the probable cause, and
//! uploads the pending batch to a collector. Reports are erased only after
//! the collector accepts them.
//!
//! ## Crates
//!
//! - `mayday-core` - report model, diagnosis, ports and use cases
//! - `mayday-http` - collector transport and the default report handler
//! - `mayday-store` - the on-disk report store
//!
//! This crate ties them together behind [`Mayday`].

pub mod logging;
pub mod reporter;

pub use logging::init_tracing;
pub use reporter::{Mayday, SetupType};

pub use mayday_core::config::{CollectorConfig, Config, HttpMethod, LoggingConfig, StoreConfig};
pub use mayday_core::domain::{CrashDoctor, CrashReport, HeuristicDoctor};
pub use mayday_core::ports::{HandlerError, HandlerFailure, IReportHandler, IReportStore, ReportsCompletion};
pub use mayday_core::usecases::ReporterError;
