//! Report handler port (driven/secondary port)
//!
//! A report handler takes a batch of diagnosed reports and delivers it to a
//! collector in a single exchange. It is the customization point exposed to
//! integrators: the default HTTP collector lives in `mayday-http`, and any
//! other backend can be plugged in by implementing [`IReportHandler`].
//!
//! ## Completion contract
//!
//! Delivery is all-or-nothing per batch. The handler reports whether the
//! exchange succeeded; it does not report per-report outcomes. Both the
//! success and the failure carry the batch exactly as it was submitted.

use thiserror::Error;

use crate::domain::CrashReport;

/// Outcome of [`IReportHandler::handle`]
pub type ReportsCompletion = Result<Vec<CrashReport>, HandlerFailure>;

/// A failed delivery, carrying the batch that was not delivered
#[derive(Debug, Error)]
#[error("{error}")]
pub struct HandlerFailure {
    /// The reports as submitted to the handler
    pub reports: Vec<CrashReport>,
    /// Why delivery failed
    #[source]
    pub error: HandlerError,
}

impl HandlerFailure {
    /// Creates a failure for `reports`
    pub fn new(reports: Vec<CrashReport>, error: impl Into<HandlerError>) -> Self {
        Self {
            reports,
            error: error.into(),
        }
    }
}

/// Errors a report handler can report for a whole batch
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The collector rejected the batch, or could not be reached (`code` 0)
    #[error("{description}")]
    Transport {
        /// HTTP status, or 0 when no response was received
        code: u16,
        /// Message extracted from the collector's response
        description: String,
    },

    /// The collector answered with a status that is neither success nor error
    #[error("Collector answered with unclassified status {status}")]
    Unacknowledged {
        /// The HTTP status received
        status: u16,
    },

    /// Failure inside a custom handler
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Port trait for delivering report batches to a collector
#[async_trait::async_trait]
pub trait IReportHandler: Send + Sync {
    /// Delivers `reports` in one exchange
    ///
    /// Resolves exactly once, after the exchange has completed. Only the
    /// reports returned in `Ok` are treated as delivered and erased.
    async fn handle(&self, reports: Vec<CrashReport>) -> ReportsCompletion;
}
