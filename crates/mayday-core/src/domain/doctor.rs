//! Heuristic crash diagnosis
//!
//! Looks at a decoded [`CrashReport`] and produces a one-line, best-effort
//! explanation of the probable cause, e.g.
//! `"Attempted to reference null pointer at crashNow"`.
//!
//! Rules are evaluated in a fixed order and the first match wins:
//!
//! | # | Condition | Diagnosis |
//! |---|-----------|-----------|
//! | 1 | error type is `deadlock` | Main thread is deadlocked at *symbol* |
//! | 2 | crashed thread's stack overflowed | Stack overflow at *symbol* |
//! | 3 | `EXC_ARITHMETIC` (or `SIGFPE` without mach) | Math error ... at *symbol* |
//! | 4 | `EXC_BAD_ACCESS` (or `SIGSEGV` without mach) | null / garbage pointer at *symbol* |
//!
//! When a named mach exception is present it alone decides rules 3 and 4.
//! The POSIX signal is consulted otherwise, including when the mach block
//! carries no exception name (signal-captured crashes write one with every
//! field zeroed).

use super::report::{BacktraceContent, CrashReport, ErrorCrash};

/// Symbol used when no application frame can be found
pub const UNKNOWN_SYMBOL: &str = "Unknown";

const DEADLOCK_TYPE: &str = "deadlock";
const EXC_ARITHMETIC: &str = "EXC_ARITHMETIC";
const EXC_BAD_ACCESS: &str = "EXC_BAD_ACCESS";
const SIGFPE: &str = "SIGFPE";
const SIGSEGV: &str = "SIGSEGV";

/// Produces a human-readable diagnosis for a crash report
pub trait CrashDoctor: Send + Sync {
    /// Returns the diagnosis, or `None` when no rule applies
    fn diagnose(&self, report: &CrashReport) -> Option<String>;
}

/// Default rule-based [`CrashDoctor`]
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicDoctor;

impl CrashDoctor for HeuristicDoctor {
    fn diagnose(&self, report: &CrashReport) -> Option<String> {
        diagnose(report)
    }
}

/// Applies the heuristic rules to `report`. Never fails.
pub fn diagnose(report: &CrashReport) -> Option<String> {
    let symbol = first_app_frame(report)
        .and_then(|frame| frame.symbol_name.as_deref())
        .unwrap_or(UNKNOWN_SYMBOL);
    let error = &report.crash.error;

    if error.error_type == DEADLOCK_TYPE {
        return Some(format!("Main thread is deadlocked at {symbol}"));
    }

    if report
        .crashed_thread()
        .is_some_and(|thread| thread.is_stack_overflow())
    {
        return Some(format!("Stack overflow at {symbol}"));
    }

    if is_math_error(error) {
        return Some(format!(
            "Math error usually caused by division by 0, at {symbol}"
        ));
    }

    if is_invalid_address(error) {
        if error.address == 0 {
            return Some(format!("Attempted to reference null pointer at {symbol}"));
        }
        return Some(format!(
            "Attempted to reference garbage pointer {} at {symbol}",
            error.address
        ));
    }

    None
}

/// First frame of the crashed thread that belongs to the crashed process
fn first_app_frame(report: &CrashReport) -> Option<&BacktraceContent> {
    let process_name = report.process_name();
    report
        .crashed_thread()?
        .backtrace
        .contents
        .iter()
        .find(|frame| frame.object_name.as_deref() == Some(process_name))
}

fn is_math_error(error: &ErrorCrash) -> bool {
    match error.mach_exception_name() {
        Some(name) => name == EXC_ARITHMETIC,
        None => error.signal_name() == Some(SIGFPE),
    }
}

fn is_invalid_address(error: &ErrorCrash) -> bool {
    match error.mach_exception_name() {
        Some(name) => name == EXC_BAD_ACCESS,
        None => error.signal_name() == Some(SIGSEGV),
    }
}

impl CrashReport {
    /// Returns this report with the diagnosis produced by `doctor` attached
    pub fn diagnosed(self, doctor: &dyn CrashDoctor) -> Self {
        let diagnosis = doctor.diagnose(&self);
        self.with_diagnosis(diagnosis)
    }
}
