//! Collector report handler
//!
//! [`ApiReportHandler`] is the default [`IReportHandler`]: it encodes every
//! report of the batch and uploads them in a single multipart request, one
//! file part per report under the configured attachment key.

use std::time::Duration;

use async_trait::async_trait;
use mayday_core::config::CollectorConfig;
use mayday_core::domain::CrashReport;
use mayday_core::ports::{HandlerError, HandlerFailure, IReportHandler, ReportsCompletion};
use tracing::{debug, info, warn};

use crate::transport::{HttpTransport, Outcome, TransportRequest};

/// Uploads report batches to an HTTP collector
pub struct ApiReportHandler {
    transport: HttpTransport,
    config: CollectorConfig,
}

impl ApiReportHandler {
    /// Creates a handler for the collector described by `config`
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(config: CollectorConfig) -> anyhow::Result<Self> {
        let transport = HttpTransport::new(Duration::from_secs(config.timeout_secs))?;
        Ok(Self::with_transport(transport, config))
    }

    /// Creates a handler sharing an existing transport
    pub fn with_transport(transport: HttpTransport, config: CollectorConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Encodes each report, dropping the ones that fail
    fn encode_all(reports: &[CrashReport]) -> Vec<Vec<u8>> {
        reports
            .iter()
            .filter_map(|report| match report.encode() {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    warn!(id = %report.report.id, error = %e, "Dropping report that failed to encode");
                    None
                }
            })
            .collect()
    }
}

#[async_trait]
impl IReportHandler for ApiReportHandler {
    async fn handle(&self, reports: Vec<CrashReport>) -> ReportsCompletion {
        let files = Self::encode_all(&reports);
        debug!(
            reports = reports.len(),
            files = files.len(),
            url = %self.config.url,
            "Uploading crash reports"
        );

        let request = TransportRequest::new(self.config.method, self.config.url.clone())
            .headers(self.config.headers.clone())
            .attachments(self.config.attachment_key.clone(), files);

        match self.transport.send(request).await {
            Ok(Outcome::Delivered(_)) => {
                info!(count = reports.len(), "Collector accepted crash reports");
                Ok(reports)
            }
            Ok(Outcome::Ignored(status)) => {
                Err(HandlerFailure::new(reports, HandlerError::Unacknowledged { status }))
            }
            Err(e) => {
                warn!(code = e.code, error = %e, "Collector rejected crash reports");
                Err(HandlerFailure::new(reports, e))
            }
        }
    }
}
