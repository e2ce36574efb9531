//! HttpTransport request shapes and status classification

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mayday_core::config::HttpMethod;
use mayday_http::transport::DEFAULT_TIMEOUT;
use mayday_http::{HttpTransport, Outcome, TransportRequest};

fn transport() -> HttpTransport {
    HttpTransport::new(DEFAULT_TIMEOUT).unwrap()
}

async fn server_answering(status: u16, body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(path("/endpoint"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_json_post_sends_parameters_and_content_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/endpoint"))
        .and(header("content-type", "application/json"))
        .and(header("accept", "application/json"))
        .and(header("x-custom", "yes"))
        .and(body_json(json!({"app": "MyApp", "count": 2})))
        .respond_with(ResponseTemplate::new(201).set_body_string("created"))
        .expect(1)
        .mount(&server)
        .await;

    let mut params = serde_json::Map::new();
    params.insert("app".into(), json!("MyApp"));
    params.insert("count".into(), json!(2));
    let request = TransportRequest::new(HttpMethod::Post, format!("{}/endpoint", server.uri()))
        .headers([("X-Custom".to_string(), "yes".to_string())].into())
        .parameters(params);

    let body = transport().execute(request).await.unwrap();

    assert_eq!(body.as_deref(), Some(&b"created"[..]));
}

#[tokio::test]
async fn test_get_sends_no_body() {
    let server = server_answering(200, "{}").await;
    let mut params = serde_json::Map::new();
    params.insert("ignored".into(), json!(true));

    let request = TransportRequest::new(HttpMethod::Get, format!("{}/endpoint", server.uri()))
        .parameters(params)
        .attachments("reports[]", vec![b"{}".to_vec()]);
    transport().execute(request).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].method.as_str(), "GET");
    assert!(requests[0].body.is_empty());
    assert!(requests[0].headers.get("content-type").is_none());
}

#[tokio::test]
async fn test_put_with_attachments_is_multipart() {
    let server = server_answering(200, "").await;

    let request = TransportRequest::new(HttpMethod::Put, format!("{}/endpoint", server.uri()))
        .attachments("files[]", vec![b"{\"n\":1}".to_vec()]);
    transport().execute(request).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let content_type = requests[0]
        .headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("multipart/form-data; boundary=Boundary-"));
    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    assert!(body.contains("name=\"files[]\"; filename=\"report1.json\""));
    assert!(body.contains("{\"n\":1}"));
}

#[tokio::test]
async fn test_server_error_reason_is_the_description() {
    let server = server_answering(500, r#"{"reason":"server error"}"#).await;

    let err = transport()
        .execute(TransportRequest::new(
            HttpMethod::Post,
            format!("{}/endpoint", server.uri()),
        ))
        .await
        .unwrap_err();

    assert_eq!(err.code, 500);
    assert_eq!(err.to_string(), "server error");
}

#[tokio::test]
async fn test_client_error_uses_first_array_message() {
    let server = server_answering(422, r#"{"reports":["report1.json is not valid"]}"#).await;

    let err = transport()
        .execute(TransportRequest::new(
            HttpMethod::Post,
            format!("{}/endpoint", server.uri()),
        ))
        .await
        .unwrap_err();

    assert_eq!(err.code, 422);
    assert_eq!(err.description, "report1.json is not valid");
}

#[tokio::test]
async fn test_error_with_empty_body() {
    let server = server_answering(503, "").await;

    let err = transport()
        .execute(TransportRequest::new(
            HttpMethod::Delete,
            format!("{}/endpoint", server.uri()),
        ))
        .await
        .unwrap_err();

    assert_eq!(err.code, 503);
    assert_eq!(err.description, "Expecting JSON as result");
}

#[tokio::test]
async fn test_unclassified_status_is_ignored() {
    let server = server_answering(304, "").await;

    let transport = transport();
    let url = format!("{}/endpoint", server.uri());
    let outcome = transport
        .send(TransportRequest::new(HttpMethod::Get, url.clone()))
        .await
        .unwrap();
    let body = transport
        .execute(TransportRequest::new(HttpMethod::Get, url))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Ignored(304));
    assert!(body.is_none());
}

#[tokio::test]
async fn test_connection_refused_has_code_zero() {
    // Bind and release a port so nothing is listening on it
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = transport()
        .execute(TransportRequest::new(
            HttpMethod::Post,
            format!("http://{addr}/endpoint"),
        ))
        .await
        .unwrap_err();

    assert_eq!(err.code, 0);
    assert!(!err.description.is_empty());
}

#[tokio::test]
async fn test_timeout_has_code_zero() {
    let server = MockServer::start().await;
    Mock::given(path("/endpoint"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let err = HttpTransport::new(Duration::from_millis(100))
        .unwrap()
        .execute(TransportRequest::new(
            HttpMethod::Post,
            format!("{}/endpoint", server.uri()),
        ))
        .await
        .unwrap_err();

    assert_eq!(err.code, 0);
}
