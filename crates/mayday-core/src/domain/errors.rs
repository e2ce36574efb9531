//! Domain error types
//!
//! Decoding and encoding of crash reports are the only fallible domain
//! operations. Both are recovered per report by the use cases: a report
//! that fails either step is dropped from its batch.

use thiserror::Error;

/// A raw crash record could not be turned into a [`CrashReport`](super::CrashReport)
#[derive(Debug, Error)]
#[error("Failed to decode crash report: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// A crash report could not be serialized for upload
#[derive(Debug, Error)]
#[error("Failed to encode crash report: {0}")]
pub struct EncodeError(#[from] serde_json::Error);
