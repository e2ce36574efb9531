//! Domain entities and business logic
//!
//! This module contains the core domain types for Mayday:
//! - The decoded crash report and its nested structures
//! - The heuristic crash doctor
//! - Domain-specific error types

pub mod doctor;
pub mod errors;
pub mod report;

// Re-export commonly used types
pub use doctor::{diagnose, CrashDoctor, HeuristicDoctor, UNKNOWN_SYMBOL};
pub use errors::{DecodeError, EncodeError};
pub use report::{
    ApplicationStats, Backtrace, BacktraceContent, BinaryImage, Crash, CrashReport, CrashThread,
    CpuException, ErrorCrash, Mach, Memory, Registers, ReportInfo, Signal, Stack, System,
};
