//! Mayday Core - Crash report model, diagnosis and delivery orchestration
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `CrashReport` and its nested thread, backtrace and error types
//! - **Diagnosis** - `HeuristicDoctor`, a one-line explanation of the probable crash cause
//! - **Port definitions** - Traits for adapters: `IReportStore`, `IReportHandler`
//! - **Use cases** - `SendReportsUseCase`, `DeleteReportsUseCase`
//!
//! # Architecture
//!
//! The domain module holds the decoded report and the pure diagnosis rules.
//! Ports define the trait interfaces that adapter crates implement
//! (`mayday-store` for the on-disk report store, `mayday-http` for the
//! collector). Use cases drive domain values through those ports.

pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;
