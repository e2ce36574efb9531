//! Delivery through an integrator-supplied handler

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use mayday::{
    CrashReport, HandlerFailure, IReportHandler, IReportStore, ReporterError, ReportsCompletion,
    SetupType,
};

use crate::common::{reporter, write_sample, SAMPLE_DIAGNOSIS};

/// Records every batch; fails when `reject` is set
#[derive(Default)]
struct RecordingHandler {
    batches: Mutex<Vec<Vec<CrashReport>>>,
    reject: bool,
}

#[async_trait]
impl IReportHandler for RecordingHandler {
    async fn handle(&self, reports: Vec<CrashReport>) -> ReportsCompletion {
        self.batches.lock().unwrap().push(reports.clone());
        if self.reject {
            return Err(HandlerFailure::new(reports, anyhow::anyhow!("queue full")));
        }
        Ok(reports)
    }
}

#[tokio::test]
async fn test_custom_handler_receives_diagnosed_batch() {
    let handler = Arc::new(RecordingHandler::default());
    let (dir, store, mayday) =
        reporter(SetupType::Custom(Arc::clone(&handler) as Arc<dyn IReportHandler>)).await;
    write_sample(dir.path(), 1);

    mayday.send_all_reports().await.unwrap();

    assert_eq!(store.report_count().await.unwrap(), 0);
    let batches = handler.batches.lock().unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0][0].diagnosis(), Some(SAMPLE_DIAGNOSIS));
}

#[tokio::test]
async fn test_custom_handler_failure_surfaces() {
    let handler = Arc::new(RecordingHandler {
        reject: true,
        ..Default::default()
    });
    let (dir, store, mayday) = reporter(SetupType::Custom(handler)).await;
    write_sample(dir.path(), 1);

    let err = mayday.send_all_reports().await.unwrap_err();

    assert_eq!(err.to_string(), "queue full");
    assert!(matches!(err, ReporterError::Delivery(_)));
    assert_eq!(store.report_count().await.unwrap(), 1);
}
