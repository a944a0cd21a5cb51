//! Webhook dispatcher tests against local mock endpoints.

use chrono::Utc;
use serde_json::Value;
use signals_core::{
    DeliveryResult, DispatchRecord, Signal, StoreError, Subscriber, SubscriberStore, TypeFilter,
};
use signals_webhooks::{
    verify_signature, DispatchConfig, MemoryOutcomeLog, WebhookDispatcher,
};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn dispatcher(config: DispatchConfig) -> (WebhookDispatcher, Arc<MemoryOutcomeLog>) {
    let log = Arc::new(MemoryOutcomeLog::new());
    let dispatcher = WebhookDispatcher::new(config, log.clone()).unwrap();
    (dispatcher, log)
}

fn signal() -> Signal {
    Signal::new("NEW_BUY", Some("ELSA"), Utc::now()).with_field("price", serde_json::json!(0.0123))
}

async fn mock_endpoint(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_delivers_signed_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (dispatcher, log) = dispatcher(DispatchConfig::default());
    let subscriber = Subscriber::new(format!("{}/hook", server.uri()), "sub-secret");
    let sig = signal();

    let report = dispatcher.dispatch(&sig, &[subscriber]).await;
    assert_eq!(report.attempted, 1);
    assert_eq!(report.delivered, 1);
    assert_eq!(report.failed, 0);

    let requests = server.received_requests().await.unwrap();
    let request = &requests[0];
    let signature = request
        .headers
        .get("x-msb-signature")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(verify_signature(signature, "sub-secret", &request.body));

    let body: Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body["event"], "signal");
    assert_eq!(body["source"], "msb-signals");
    assert_eq!(body["signal"]["type"], "NEW_BUY");
    assert_eq!(body["signal"]["symbol"], "ELSA");
    assert_eq!(body["signal"]["price"], 0.0123);

    let records = log.records();
    assert_eq!(records.len(), 1);
    match &records[0] {
        DispatchRecord::Delivery(outcome) => {
            assert_eq!(outcome.result, DeliveryResult::Status { status: 200 });
            assert_eq!(outcome.signal_symbol.as_deref(), Some("ELSA"));
            assert_eq!(outcome.dispatch_id, report.dispatch_id);
        }
        other => panic!("unexpected record {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_subscriber_does_not_block_others() {
    let server = MockServer::start().await;
    mock_endpoint(&server, "/fast-a", ResponseTemplate::new(200)).await;
    mock_endpoint(&server, "/fast-b", ResponseTemplate::new(204)).await;
    mock_endpoint(
        &server,
        "/slow",
        ResponseTemplate::new(200).set_delay(Duration::from_secs(5)),
    )
    .await;

    let config = DispatchConfig {
        timeout: Duration::from_millis(300),
        ..DispatchConfig::default()
    };
    let (dispatcher, log) = dispatcher(config);
    let subscribers = vec![
        Subscriber::new(format!("{}/fast-a", server.uri()), "a"),
        Subscriber::new(format!("{}/slow", server.uri()), "b"),
        Subscriber::new(format!("{}/fast-b", server.uri()), "c"),
    ];

    let started = std::time::Instant::now();
    let report = dispatcher.dispatch(&signal(), &subscribers).await;
    assert!(started.elapsed() < Duration::from_secs(3));

    assert_eq!(report.attempted, 3);
    assert_eq!(report.delivered, 2);
    assert_eq!(report.failed, 1);

    let slow = report
        .outcomes
        .iter()
        .find(|o| o.subscriber_url.ends_with("/slow"))
        .unwrap();
    assert!(matches!(slow.result, DeliveryResult::Error { .. }));
    assert_eq!(log.records().len(), 3);
}

#[tokio::test]
async fn test_non_2xx_recorded_as_failure() {
    let server = MockServer::start().await;
    mock_endpoint(&server, "/hook", ResponseTemplate::new(500)).await;

    let (dispatcher, _log) = dispatcher(DispatchConfig::default());
    let subscriber = Subscriber::new(format!("{}/hook", server.uri()), "s");
    let report = dispatcher.dispatch(&signal(), &[subscriber]).await;

    assert_eq!(report.delivered, 0);
    assert_eq!(report.failed, 1);
    assert_eq!(report.outcomes[0].result, DeliveryResult::Status { status: 500 });
}

#[tokio::test]
async fn test_unreachable_subscriber_recorded() {
    let (dispatcher, log) = dispatcher(DispatchConfig::default());
    // Port 9 on loopback is the discard port and is closed in test environments.
    let subscriber = Subscriber::new("http://127.0.0.1:9/hook", "s");
    let report = dispatcher.dispatch(&signal(), &[subscriber]).await;

    assert_eq!(report.failed, 1);
    assert!(matches!(
        log.records()[0],
        DispatchRecord::Delivery(ref o) if matches!(o.result, DeliveryResult::Error { .. })
    ));
}

#[tokio::test]
async fn test_filters_inactive_and_unwanted() {
    let server = MockServer::start().await;
    mock_endpoint(&server, "/wanted", ResponseTemplate::new(200)).await;
    mock_endpoint(&server, "/other", ResponseTemplate::new(200)).await;

    let (dispatcher, _log) = dispatcher(DispatchConfig::default());
    let subscribers = vec![
        Subscriber::new(format!("{}/wanted", server.uri()), "a")
            .with_types(TypeFilter::from_types(["NEW_BUY", "STOP_LOSS"])),
        Subscriber::new(format!("{}/other", server.uri()), "b")
            .with_types(TypeFilter::from_types(["STOP_LOSS"])),
        Subscriber::new(format!("{}/wanted", server.uri()), "c").inactive(),
        Subscriber {
            url: None,
            ..Subscriber::new("", "d")
        },
    ];

    let report = dispatcher.dispatch(&signal(), &subscribers).await;
    assert_eq!(report.attempted, 1);
    assert_eq!(report.skipped, 3);
    assert_eq!(report.delivered, 1);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), "/wanted");
}

#[tokio::test]
async fn test_no_subscribers_writes_skip_record() {
    let (dispatcher, log) = dispatcher(DispatchConfig::default());
    let report = dispatcher.dispatch(&signal(), &[]).await;

    assert_eq!(report.attempted, 0);
    let records = log.records();
    assert_eq!(records.len(), 1);
    assert!(matches!(&records[0], DispatchRecord::Skipped(skip) if skip.signal_type == "NEW_BUY"));
}

#[tokio::test]
async fn test_no_eligible_subscribers_writes_skip_record() {
    let (dispatcher, log) = dispatcher(DispatchConfig::default());
    let subscribers = vec![Subscriber::new("https://a.test/h", "s").inactive()];
    let report = dispatcher.dispatch(&signal(), &subscribers).await;

    assert_eq!(report.skipped, 1);
    assert!(matches!(log.records()[0], DispatchRecord::Skipped(_)));
}

#[tokio::test]
async fn test_fallback_secret_used_when_missing() {
    let server = MockServer::start().await;
    mock_endpoint(&server, "/hook", ResponseTemplate::new(200)).await;

    let (dispatcher, _log) = dispatcher(DispatchConfig::default());
    let subscriber = Subscriber {
        secret: None,
        ..Subscriber::new(format!("{}/hook", server.uri()), "")
    };
    let report = dispatcher.dispatch(&signal(), &[subscriber]).await;
    assert_eq!(report.delivered, 1);

    let requests = server.received_requests().await.unwrap();
    let signature = requests[0]
        .headers
        .get("x-msb-signature")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(verify_signature(signature, "msb-default", &requests[0].body));
}

#[tokio::test]
async fn test_missing_secret_without_fallback_fails() {
    let server = MockServer::start().await;
    mock_endpoint(&server, "/hook", ResponseTemplate::new(200)).await;

    let config = DispatchConfig {
        fallback_secret: None,
        ..DispatchConfig::default()
    };
    let (dispatcher, _log) = dispatcher(config);
    let subscriber = Subscriber {
        secret: None,
        ..Subscriber::new(format!("{}/hook", server.uri()), "")
    };
    let report = dispatcher.dispatch(&signal(), &[subscriber]).await;

    assert_eq!(report.failed, 1);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_custom_signature_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(wiremock::matchers::header_exists("x-custom-sig"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let config = DispatchConfig {
        signature_header: "X-Custom-Sig".to_string(),
        ..DispatchConfig::default()
    };
    let (dispatcher, _log) = dispatcher(config);
    let subscriber = Subscriber::new(format!("{}/hook", server.uri()), "s");
    let report = dispatcher.dispatch(&signal(), &[subscriber]).await;
    assert_eq!(report.delivered, 1);
}

struct BrokenRegistry;

#[async_trait::async_trait]
impl SubscriberStore for BrokenRegistry {
    async fn load_subscribers(&self) -> Result<Vec<Subscriber>, StoreError> {
        Err(StoreError::Unavailable("disk gone".into()))
    }
}

#[tokio::test]
async fn test_registry_failure_is_skip() {
    let (dispatcher, log) = dispatcher(DispatchConfig::default());
    let report = dispatcher.dispatch_from(&signal(), &BrokenRegistry).await;

    assert_eq!(report.attempted, 0);
    assert!(matches!(log.records()[0], DispatchRecord::Skipped(_)));
}
