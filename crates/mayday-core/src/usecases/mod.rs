//! Use cases (interactors) for Mayday
//!
//! Use cases are thin coordinators: the report model and the doctor hold
//! the rules, the ports do the I/O.
//!
//! ## Use Cases
//!
//! - [`SendReportsUseCase`] - Decode, diagnose and deliver every pending report
//! - [`DeleteReportsUseCase`] - Discard every pending report without sending it

pub mod delete_reports;
pub mod send_reports;

pub use delete_reports::DeleteReportsUseCase;
pub use send_reports::{ReporterError, SendReportsUseCase};
