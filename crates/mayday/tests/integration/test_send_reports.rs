//! Delivery through the HTTP collector

use wiremock::ResponseTemplate;

use mayday::{Config, HandlerError, IReportStore, Mayday, ReporterError, SetupType};

use crate::common::{
    collector, collector_config, reporter, write_raw, write_sample, BUNDLE_ID, SAMPLE_DIAGNOSIS,
};

#[tokio::test]
async fn test_pending_reports_are_delivered_and_erased() {
    let server = collector(ResponseTemplate::new(200), 1).await;
    let (dir, store, mayday) = reporter(SetupType::Api(collector_config(&server))).await;
    write_sample(dir.path(), 1);
    write_sample(dir.path(), 2);

    let delivered = mayday.send_all_reports().await.unwrap();

    assert_eq!(delivered.len(), 2);
    assert!(delivered
        .iter()
        .all(|report| report.diagnosis() == Some(SAMPLE_DIAGNOSIS)));
    assert_eq!(store.report_count().await.unwrap(), 0);

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("filename=\"report1.json\""));
    assert!(body.contains("filename=\"report2.json\""));
    assert!(body.contains(SAMPLE_DIAGNOSIS));
}

#[tokio::test]
async fn test_second_send_makes_no_request() {
    let server = collector(ResponseTemplate::new(201), 1).await;
    let (dir, _store, mayday) = reporter(SetupType::Api(collector_config(&server))).await;
    write_sample(dir.path(), 1);

    assert_eq!(mayday.send_all_reports().await.unwrap().len(), 1);
    assert!(mayday.send_all_reports().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_store_never_contacts_collector() {
    let server = collector(ResponseTemplate::new(200), 0).await;
    let (_dir, _store, mayday) = reporter(SetupType::Api(collector_config(&server))).await;

    assert!(mayday.send_all_reports().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_server_error_keeps_reports() {
    let server = collector(
        ResponseTemplate::new(500).set_body_json(serde_json::json!({"reason": "server error"})),
        1,
    )
    .await;
    let (dir, store, mayday) = reporter(SetupType::Api(collector_config(&server))).await;
    write_sample(dir.path(), 1);

    let err = mayday.send_all_reports().await.unwrap_err();

    assert_eq!(err.to_string(), "server error");
    assert!(matches!(
        err,
        ReporterError::Delivery(HandlerError::Transport { code: 500, .. })
    ));
    assert_eq!(store.report_ids().await.unwrap(), vec![1]);
}

#[tokio::test]
async fn test_malformed_report_is_skipped_and_kept() {
    let server = collector(ResponseTemplate::new(200), 1).await;
    let (dir, store, mayday) = reporter(SetupType::Api(collector_config(&server))).await;
    write_raw(dir.path(), 1, b"{\"truncated\":");
    write_sample(dir.path(), 2);

    let delivered = mayday.send_all_reports().await.unwrap();

    assert_eq!(delivered.len(), 1);
    assert_eq!(store.report_ids().await.unwrap(), vec![1]);
}

#[tokio::test]
async fn test_delete_all_reports() {
    let server = collector(ResponseTemplate::new(200), 0).await;
    let (dir, _store, mayday) = reporter(SetupType::Api(collector_config(&server))).await;
    write_sample(dir.path(), 1);
    write_sample(dir.path(), 2);
    assert_eq!(mayday.report_count().await.unwrap(), 2);

    mayday.delete_all_reports().await.unwrap();

    assert_eq!(mayday.report_count().await.unwrap(), 0);
    assert!(mayday.send_all_reports().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_from_config() {
    let server = collector(ResponseTemplate::new(200), 1).await;
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.collector = collector_config(&server);
    config.store.bundle_id = BUNDLE_ID.to_string();
    config.store.base_path = dir.path().to_path_buf();

    let mayday = Mayday::from_config(&config).await.unwrap();
    write_sample(dir.path(), 5);

    assert_eq!(mayday.send_all_reports().await.unwrap().len(), 1);
    assert_eq!(mayday.report_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_from_config_rejects_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.collector.timeout_secs = 0;
    config.store.base_path = dir.path().to_path_buf();

    let err = match Mayday::from_config(&config).await {
        Ok(_) => panic!("invalid config was accepted"),
        Err(e) => e,
    };

    assert_eq!(
        err.to_string(),
        "Invalid configuration: collector.timeout_secs: must be greater than 0"
    );
    // Nothing is installed for a rejected config
    assert!(!dir.path().join("Reports").exists());
}
