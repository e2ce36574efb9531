//! Crash report domain types
//!
//! A [`CrashReport`] is the decoded form of one raw crash record written by
//! the native crash monitor. The wire format is the monitor's JSON document;
//! keys are snake_case except for the `CFBundle*` system keys.
//!
//! ## Design Notes
//!
//! - Every struct keeps the members it does not model in an `extra` map, so
//!   `decode` followed by `encode` preserves the whole original document.
//! - Optional members are skipped on encode when absent, so a report that
//!   never carried a `stack` or `diagnosis` does not gain `null` entries.
//! - Addresses are unsigned 64-bit values; signal codes stay signed since
//!   `si_code` can be negative.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::{DecodeError, EncodeError};

/// Members of a JSON object that the model does not name
type Extra = Map<String, Value>;

// ============================================================================
// CrashReport
// ============================================================================

/// One decoded crash record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrashReport {
    /// Images loaded in the process at crash time
    pub binary_images: Vec<BinaryImage>,
    /// The fault, the threads and the diagnosis
    pub crash: Crash,
    /// Free-form debug section
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<Extra>,
    /// Free-form process state section
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process: Option<Extra>,
    /// Report identity and format version
    pub report: ReportInfo,
    /// Device and application snapshot
    pub system: System,
    /// User-supplied fields written at crash time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Extra>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl CrashReport {
    /// Decodes a raw crash record
    ///
    /// Unknown members are kept; absent optional members decode as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when `bytes` is not well-formed JSON or a
    /// required member is missing or has the wrong type.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Encodes the report back to its JSON wire form
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Name of the crashed process, used to tell app frames from system frames
    pub fn process_name(&self) -> &str {
        &self.report.process_name
    }

    /// The thread flagged as the origin of the fault, if any
    pub fn crashed_thread(&self) -> Option<&CrashThread> {
        self.crash.threads.iter().find(|thread| thread.crashed)
    }

    /// The attached diagnosis, if the report has been diagnosed
    pub fn diagnosis(&self) -> Option<&str> {
        self.crash.diagnosis.as_deref()
    }

    /// Returns a copy of this report carrying `diagnosis`
    pub fn with_diagnosis(mut self, diagnosis: Option<String>) -> Self {
        self.crash.diagnosis = diagnosis;
        self
    }
}

/// Report identity section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportInfo {
    /// Report UUID assigned by the monitor
    pub id: String,
    /// Name of the crashed process
    pub process_name: String,
    /// Report flavour (`standard`, `minimal`, `custom`)
    #[serde(rename = "type")]
    pub report_type: String,
    /// Report format version
    pub version: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A binary image (executable or library) mapped into the process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryImage {
    pub cpu_subtype: i64,
    pub cpu_type: i64,
    pub image_addr: u64,
    pub image_size: u64,
    pub image_vmaddr: u64,
    pub major_version: u64,
    pub minor_version: u64,
    /// Path of the image on the device
    pub name: String,
    pub revision_version: u64,
    pub uuid: String,
    #[serde(flatten)]
    pub extra: Extra,
}

// ============================================================================
// Crash section
// ============================================================================

/// The fault descriptor, every thread, and the diagnosis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crash {
    pub error: ErrorCrash,
    pub threads: Vec<CrashThread>,
    /// One-line explanation attached by a [`CrashDoctor`](super::CrashDoctor)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// What went wrong
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorCrash {
    /// Faulting address
    pub address: u64,
    /// Mach exception, when the fault was caught at the kernel level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mach: Option<Mach>,
    /// POSIX signal equivalent of the fault
    pub signal: Signal,
    /// Kind of crash (`mach`, `signal`, `nsexception`, `deadlock`, ...)
    #[serde(rename = "type")]
    pub error_type: String,
    /// CPU exception registers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<CpuException>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl ErrorCrash {
    /// Name of the mach exception, when one was recorded with a name
    pub fn mach_exception_name(&self) -> Option<&str> {
        self.mach
            .as_ref()
            .and_then(|mach| mach.exception_name.as_deref())
    }

    /// Name of the POSIX signal, when known
    pub fn signal_name(&self) -> Option<&str> {
        self.signal.name.as_deref()
    }
}

/// Mach exception details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mach {
    pub code: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_name: Option<String>,
    pub exception: i64,
    /// e.g. `EXC_BAD_ACCESS`. Absent for signal-captured crashes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception_name: Option<String>,
    pub subcode: u64,
    #[serde(flatten)]
    pub extra: Extra,
}

/// POSIX signal details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub code: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_name: Option<String>,
    /// e.g. `SIGSEGV`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub signal: i64,
    #[serde(flatten)]
    pub extra: Extra,
}

/// ARM exception syndrome registers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuException {
    pub esr: u64,
    pub exception: u64,
    pub far: u64,
    #[serde(flatten)]
    pub extra: Extra,
}

// ============================================================================
// Threads
// ============================================================================

/// One thread of the crashed process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrashThread {
    pub backtrace: Backtrace,
    /// True for the thread that faulted
    pub crashed: bool,
    /// True for the thread that wrote the report
    pub current_thread: bool,
    pub index: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registers: Option<Registers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<Stack>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl CrashThread {
    /// True when the monitor saw the stack pointer run past the guard page
    pub fn is_stack_overflow(&self) -> bool {
        self.stack.as_ref().is_some_and(|stack| stack.overflow)
    }
}

/// Ordered call stack of a thread, innermost frame first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backtrace {
    pub contents: Vec<BacktraceContent>,
    /// Frames the monitor dropped from the middle of a deep stack
    pub skipped: u64,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Backtrace {
    /// Replaces the frames, e.g. after address-to-symbol enrichment.
    ///
    /// `skipped` is left untouched.
    pub fn replace(&mut self, contents: Vec<BacktraceContent>) {
        self.contents = contents;
    }
}

/// One stack frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktraceContent {
    pub instruction_addr: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_addr: Option<u64>,
    /// Module owning the instruction (e.g. `MyApp`, `libsystem_kernel.dylib`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol_addr: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol_name: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl BacktraceContent {
    /// True when the frame could not be attributed to a module
    pub fn is_empty(&self) -> bool {
        self.object_addr.is_none() || self.object_name.is_none()
    }
}

/// Register snapshot of a thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registers {
    /// General purpose registers by name
    pub basic: BTreeMap<String, u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<CpuException>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Raw dump of the memory around the stack pointer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stack {
    /// Hex-encoded stack bytes
    pub contents: String,
    pub dump_end: u64,
    pub dump_start: u64,
    /// `-` when the stack grows downward
    pub grow_direction: String,
    pub overflow: bool,
    pub stack_pointer: u64,
    #[serde(flatten)]
    pub extra: Extra,
}

// ============================================================================
// System section
// ============================================================================

/// Device and application snapshot taken at crash time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct System {
    #[serde(rename = "CFBundleExecutable")]
    pub bundle_executable: String,
    #[serde(rename = "CFBundleExecutablePath")]
    pub bundle_executable_path: String,
    #[serde(rename = "CFBundleIdentifier")]
    pub bundle_identifier: String,
    #[serde(rename = "CFBundleName")]
    pub bundle_name: String,
    #[serde(rename = "CFBundleShortVersionString")]
    pub bundle_short_version: String,
    #[serde(rename = "CFBundleVersion")]
    pub bundle_version: String,
    pub app_uuid: String,
    pub application_stats: ApplicationStats,
    pub binary_cpu_subtype: i64,
    pub binary_cpu_type: i64,
    /// `debug`, `test`, `app store`, ...
    pub build_type: String,
    pub cpu_arch: String,
    pub cpu_subtype: i64,
    pub cpu_type: i64,
    pub device_app_hash: String,
    pub jailbroken: bool,
    pub kernel_version: String,
    pub machine: String,
    pub memory: Memory,
    pub model: String,
    pub os_version: String,
    pub parent_process_id: i64,
    pub process_id: i64,
    pub process_name: String,
    /// Total storage in bytes
    pub storage: u64,
    pub system_name: String,
    pub system_version: String,
    pub time_zone: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Application usage counters kept by the monitor between launches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationStats {
    pub active_time_since_last_crash: f64,
    pub active_time_since_launch: f64,
    pub application_active: bool,
    pub application_in_foreground: bool,
    pub background_time_since_last_crash: f64,
    pub background_time_since_launch: f64,
    pub launches_since_last_crash: u64,
    pub sessions_since_last_crash: u64,
    pub sessions_since_launch: u64,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Device memory in bytes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub free: u64,
    pub size: u64,
    pub usable: u64,
    #[serde(flatten)]
    pub extra: Extra,
}
