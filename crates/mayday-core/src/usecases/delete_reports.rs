//! Report discard use case

use std::sync::Arc;

use tracing::info;

use super::send_reports::ReporterError;
use crate::ports::IReportStore;

/// Use case for erasing every pending report without delivering it
pub struct DeleteReportsUseCase {
    store: Arc<dyn IReportStore>,
}

impl DeleteReportsUseCase {
    pub fn new(store: Arc<dyn IReportStore>) -> Self {
        Self { store }
    }

    /// Erases every report in the store
    ///
    /// # Errors
    ///
    /// Returns [`ReporterError::Store`] if the store could not erase them.
    pub async fn delete_all_reports(&self) -> Result<(), ReporterError> {
        self.store
            .delete_all_reports()
            .await
            .map_err(|source| ReporterError::Store {
                operation: "delete all reports",
                source,
            })?;
        info!("Deleted all pending crash reports");
        Ok(())
    }
}
