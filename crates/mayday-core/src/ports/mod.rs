//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the domain core
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IReportStore`] - The crash monitor's durable report store
//! - [`IReportHandler`] - Delivery of a batch of reports to a collector

pub mod report_handler;
pub mod report_store;

pub use report_handler::{HandlerError, HandlerFailure, IReportHandler, ReportsCompletion};
pub use report_store::IReportStore;
