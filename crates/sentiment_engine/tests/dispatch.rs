use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use sentiment_core::{validate, AnalysisError, AnalysisKind, AnalysisRequest, Sentiment, WordCount};
use sentiment_engine::{
    Dispatcher, EngineEvent, ProgressSink, ReqwestTransport, RetryPolicy, ServiceConfig,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn fast_config(server: &MockServer) -> ServiceConfig {
    ServiceConfig::new(&server.uri())
        .unwrap()
        .with_retry(RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(10),
        })
}

fn dispatcher(config: ServiceConfig) -> Dispatcher {
    let transport = ReqwestTransport::new(&config).expect("client");
    Dispatcher::new(Arc::new(transport), config)
}

fn request(kind: AnalysisKind, raw: &str) -> AnalysisRequest {
    AnalysisRequest::new(kind, validate(kind, raw).expect("valid input"), 1)
}

fn ok_body() -> serde_json::Value {
    json!({"sentiment": "positive", "score": 0.85, "confidence": 0.92})
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map_or(0, |r| r.len())
}

#[tokio::test]
async fn posts_json_payload_to_kind_endpoint() {
    engine_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze/hashtag"))
        .and(header("content-type", "application/json"))
        .and(header("accept", "application/json"))
        .and(body_json(json!({"hashtag": "rustlang"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&server)
        .await;

    let sink = TestSink::default();
    let result = dispatcher(fast_config(&server))
        .dispatch(&request(AnalysisKind::Hashtag, "#rustlang"), &sink)
        .await
        .expect("dispatch ok");

    assert_eq!(result.sentiment, Sentiment::Positive);
    assert!(sink.take().is_empty());
}

#[tokio::test]
async fn transient_503s_are_retried_until_success() {
    engine_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze/text"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/analyze/text"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&server)
        .await;

    let sink = TestSink::default();
    let outcome = dispatcher(fast_config(&server))
        .dispatch(&request(AnalysisKind::Text, "great"), &sink)
        .await;

    assert!(outcome.is_ok(), "{outcome:?}");
    assert_eq!(request_count(&server).await, 3);
    let retries: Vec<_> = sink
        .take()
        .into_iter()
        .map(|event| match event {
            EngineEvent::RetryScheduled { attempt, delay, .. } => (attempt, delay),
            other => panic!("unexpected event {other:?}"),
        })
        .collect();
    assert_eq!(
        retries,
        vec![
            (2, Duration::from_millis(10)),
            (3, Duration::from_millis(20))
        ]
    );
}

#[tokio::test]
async fn exhausted_retries_report_server_unavailable() {
    engine_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze/url"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let sink = TestSink::default();
    let err = dispatcher(fast_config(&server))
        .dispatch(&request(AnalysisKind::Url, "example.com"), &sink)
        .await
        .unwrap_err();

    assert_eq!(err, AnalysisError::ServerUnavailable { attempts: 3 });
    assert_eq!(request_count(&server).await, 3);
    assert_eq!(sink.take().len(), 2);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    engine_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze/url"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"error": "No text content found in the URL"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let sink = TestSink::default();
    let err = dispatcher(fast_config(&server))
        .dispatch(&request(AnalysisKind::Url, "example.com"), &sink)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        AnalysisError::HttpError {
            status: 400,
            message: "No text content found in the URL".to_string()
        }
    );
    assert_eq!(request_count(&server).await, 1);
    assert!(sink.take().is_empty());
}

#[tokio::test]
async fn internal_server_error_is_fatal() {
    engine_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let err = dispatcher(fast_config(&server))
        .dispatch(&request(AnalysisKind::Text, "x"), &TestSink::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), sentiment_core::ErrorKind::HttpError(500));
}

#[tokio::test]
async fn malformed_success_body_is_not_retried() {
    engine_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"score": 0.3})))
        .expect(1)
        .mount(&server)
        .await;

    let err = dispatcher(fast_config(&server))
        .dispatch(&request(AnalysisKind::Text, "x"), &TestSink::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::MalformedResponse { .. }), "{err}");
}

#[tokio::test]
async fn slow_responses_count_as_transient() {
    engine_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(ok_body()),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .mount(&server)
        .await;

    let mut config = fast_config(&server);
    config.request_timeout = Duration::from_millis(50);

    let sink = TestSink::default();
    let result = dispatcher(config)
        .dispatch(&request(AnalysisKind::Text, "x"), &sink)
        .await;
    assert!(result.is_ok(), "{result:?}");
    assert_eq!(sink.take().len(), 1);
}

#[tokio::test]
async fn unreachable_service_ends_unavailable() {
    engine_logging::initialize_for_tests();
    // Bind and drop a listener so the port is very likely closed.
    let uri = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };
    let config = ServiceConfig::new(&uri).unwrap().with_retry(RetryPolicy {
        max_attempts: 2,
        base_delay: Duration::from_millis(5),
    });

    let err = dispatcher(config)
        .dispatch(&request(AnalysisKind::Text, "x"), &TestSink::default())
        .await
        .unwrap_err();
    assert_eq!(err, AnalysisError::ServerUnavailable { attempts: 2 });
}

#[tokio::test]
async fn oversized_body_is_malformed() {
    engine_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(64)))
        .mount(&server)
        .await;

    let mut config = fast_config(&server);
    config.max_response_bytes = 16;

    let err = dispatcher(config)
        .dispatch(&request(AnalysisKind::Text, "x"), &TestSink::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::MalformedResponse { .. }), "{err}");
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn oversized_unavailable_page_is_still_retried() {
    engine_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("<".repeat(64)))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = fast_config(&server);
    config.max_response_bytes = 60;

    let sink = TestSink::default();
    let result = dispatcher(config)
        .dispatch(&request(AnalysisKind::Text, "x"), &sink)
        .await;
    assert!(result.is_ok(), "{result:?}");
    assert_eq!(request_count(&server).await, 3);
    assert_eq!(sink.take().len(), 2);
}

#[tokio::test]
async fn oversized_error_body_keeps_its_status() {
    engine_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_string("x".repeat(4096)))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = fast_config(&server);
    config.max_response_bytes = 16;

    let err = dispatcher(config)
        .dispatch(&request(AnalysisKind::Text, "x"), &TestSink::default())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        AnalysisError::HttpError {
            status: 404,
            message: "Not Found".to_string()
        }
    );
}

#[tokio::test]
async fn url_response_word_map_is_normalized() {
    engine_logging::initialize_for_tests();
    let server = MockServer::start().await;
    let body = r#"{"sentiment":"neutral","score":0.5,"confidence":0.4,
        "wordFrequency":{"the":5,"cat":2}}"#;
    Mock::given(method("POST"))
        .and(path("/analyze/url"))
        .and(body_json(json!({"url": "https://example.com"})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .mount(&server)
        .await;

    let result = dispatcher(fast_config(&server))
        .dispatch(&request(AnalysisKind::Url, "example.com"), &TestSink::default())
        .await
        .expect("dispatch ok");
    assert_eq!(
        result.word_frequency,
        vec![WordCount::new("the", 5), WordCount::new("cat", 2)]
    );
}
