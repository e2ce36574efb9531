//! ApiReportHandler batch uploads

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mayday_core::ports::{HandlerError, IReportHandler};
use mayday_http::ApiReportHandler;

use crate::common::{
    collector_config, sample_batch, setup_collector_mock, single_request_body, REPORTS_PATH,
};

#[tokio::test]
async fn test_batch_is_uploaded_as_one_multipart_request() {
    let (server, handler) = setup_collector_mock(ResponseTemplate::new(200)).await;
    let batch = sample_batch();

    let delivered = handler.handle(batch.clone()).await.unwrap();

    assert_eq!(delivered, batch);
    let body = single_request_body(&server).await;
    assert!(body.contains("name=\"reports[]\"; filename=\"report1.json\""));
    assert!(body.contains("name=\"reports[]\"; filename=\"report2.json\""));
    assert!(!body.contains("report3.json"));
    assert!(body.contains("Content-Type: json\r\n"));
    assert!(body.contains("\"second-report\""));
}

#[tokio::test]
async fn test_configured_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(REPORTS_PATH))
        .and(header("x-mayday-token", "test-token"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let handler = ApiReportHandler::new(collector_config(&server)).unwrap();

    assert!(handler.handle(sample_batch()).await.is_ok());
}

#[tokio::test]
async fn test_server_error_returns_batch_with_message() {
    let (_server, handler) = setup_collector_mock(
        ResponseTemplate::new(500).set_body_json(serde_json::json!({"reason": "server error"})),
    )
    .await;
    let batch = sample_batch();

    let failure = handler.handle(batch.clone()).await.unwrap_err();

    assert_eq!(failure.to_string(), "server error");
    assert_eq!(failure.reports, batch);
    assert!(matches!(
        failure.error,
        HandlerError::Transport { code: 500, .. }
    ));
}

#[tokio::test]
async fn test_unclassified_status_is_unacknowledged() {
    let (_server, handler) = setup_collector_mock(ResponseTemplate::new(304)).await;

    let failure = handler.handle(sample_batch()).await.unwrap_err();

    assert!(matches!(
        failure.error,
        HandlerError::Unacknowledged { status: 304 }
    ));
}
