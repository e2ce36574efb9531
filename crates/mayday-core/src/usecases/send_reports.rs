//! Report delivery use case
//!
//! Drives one delivery pass over the pending crash reports:
//!
//! ```text
//! Idle → Fetching → Diagnosing → Sending → Reconciling → Idle
//! ```
//!
//! - **Fetching**: list ids from the store and decode each record. A record
//!   that vanished or does not decode is logged and left out of the batch.
//! - **Diagnosing**: attach the doctor's diagnosis to every report.
//! - **Sending**: an empty batch completes immediately without contacting
//!   the collector; otherwise the batch goes to the report handler.
//! - **Reconciling**: only after the handler confirms delivery are records
//!   erased from the store, and only those whose report the handler
//!   returned as sent (matched by report id). On failure nothing is erased,
//!   so the same reports are retried by the next pass.
//!
//! Two passes running at the same time are not coordinated and may upload
//! the same reports twice.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{CrashDoctor, CrashReport};
use crate::ports::{HandlerError, IReportHandler, IReportStore};

/// Errors surfaced by a delivery pass
#[derive(Debug, Error)]
pub enum ReporterError {
    /// The report store could not be reached
    #[error("Report store failed to {operation}: {source}")]
    Store {
        /// What the pass was doing when the store failed
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// The handler could not deliver the batch
    #[error(transparent)]
    Delivery(#[from] HandlerError),
}

impl ReporterError {
    fn store(operation: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| Self::Store { operation, source }
    }
}

/// Use case for delivering every pending crash report
///
/// Holds no state between passes; every call re-reads the store.
pub struct SendReportsUseCase {
    store: Arc<dyn IReportStore>,
    handler: Arc<dyn IReportHandler>,
    doctor: Arc<dyn CrashDoctor>,
}

impl SendReportsUseCase {
    /// Creates a new SendReportsUseCase with the required dependencies
    ///
    /// # Arguments
    ///
    /// * `store` - The crash monitor's report store
    /// * `handler` - Delivers the batch to a collector
    /// * `doctor` - Produces the diagnosis attached to each report
    pub fn new(
        store: Arc<dyn IReportStore>,
        handler: Arc<dyn IReportHandler>,
        doctor: Arc<dyn CrashDoctor>,
    ) -> Self {
        Self {
            store,
            handler,
            doctor,
        }
    }

    /// Decodes, diagnoses and delivers every pending report
    ///
    /// # Returns
    ///
    /// The diagnosed reports that were delivered, or an empty list when
    /// nothing was pending.
    ///
    /// # Errors
    ///
    /// Returns [`ReporterError::Store`] if the store fails at any stage and
    /// [`ReporterError::Delivery`] if the handler could not deliver the
    /// batch. In the latter case no report is erased.
    pub async fn send_all_reports(&self) -> Result<Vec<CrashReport>, ReporterError> {
        // Fetching
        let pending = self.fetch_pending().await?;

        // Diagnosing
        let (keys, reports): (Vec<(i64, String)>, Vec<CrashReport>) = pending
            .into_iter()
            .map(|(id, report)| {
                let report = report.diagnosed(self.doctor.as_ref());
                ((id, report.report.id.clone()), report)
            })
            .unzip();

        // Sending
        if reports.is_empty() {
            debug!("No pending crash reports, skipping upload");
            return Ok(Vec::new());
        }

        info!(count = reports.len(), "Sending crash reports");
        let sent = match self.handler.handle(reports).await {
            Ok(sent) => sent,
            Err(failure) => {
                warn!(
                    count = failure.reports.len(),
                    error = %failure.error,
                    "Crash report delivery failed, keeping reports for the next attempt"
                );
                return Err(failure.error.into());
            }
        };

        // Reconciling
        let delivered: HashSet<&str> = sent.iter().map(|report| report.report.id.as_str()).collect();
        for (id, report_id) in &keys {
            if !delivered.contains(report_id.as_str()) {
                warn!(id, report_id = %report_id, "Handler did not confirm report, keeping it");
                continue;
            }
            self.store
                .delete_report(*id)
                .await
                .map_err(ReporterError::store("delete a delivered report"))?;
        }

        info!(count = sent.len(), "Crash reports delivered");
        Ok(sent)
    }

    /// Reads and decodes every pending report, paired with its store id
    async fn fetch_pending(&self) -> Result<Vec<(i64, CrashReport)>, ReporterError> {
        let ids = self
            .store
            .report_ids()
            .await
            .map_err(ReporterError::store("list report ids"))?;
        debug!(count = ids.len(), "Found pending crash reports");

        let mut pending = Vec::with_capacity(ids.len());
        for id in ids {
            let bytes = self
                .store
                .read_report(id)
                .await
                .map_err(ReporterError::store("read a report"))?;

            let Some(bytes) = bytes else {
                debug!(id, "Crash report disappeared before it could be read");
                continue;
            };

            match CrashReport::decode(&bytes) {
                Ok(report) => pending.push((id, report)),
                Err(e) => warn!(id, error = %e, "Dropping undecodable crash report"),
            }
        }

        Ok(pending)
    }
}
