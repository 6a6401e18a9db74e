//! Dispatcher tests against an in-memory transport.

use async_trait::async_trait;
use bookie_client::{
    dispatch, ApiClient, ApiEvent, CallArgs, CallbackSet, Error, EventBus, OutgoingRequest,
    RawResponse, RequestBody, RequestConfig, Route, Transport,
};
use http::{HeaderMap, Method, StatusCode};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

enum Reply {
    Status(StatusCode, &'static str),
    Fail(&'static str),
}

struct RecordingTransport {
    reply: Reply,
    sent: Mutex<Vec<OutgoingRequest>>,
}

impl RecordingTransport {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            sent: Mutex::new(Vec::new()),
        })
    }

    fn sent(&self) -> Vec<OutgoingRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: OutgoingRequest) -> bookie_client::Result<RawResponse> {
        self.sent.lock().unwrap().push(request);
        match self.reply {
            Reply::Status(status, body) => Ok(RawResponse::new(
                Some(status),
                body.to_string(),
                HeaderMap::new(),
                Duration::from_millis(1),
            )),
            Reply::Fail(message) => Err(Error::ConfigurationError(message.to_string())),
        }
    }
}

fn log_callbacks(log: &Arc<Mutex<Vec<String>>>) -> CallbackSet {
    let complete = Arc::clone(log);
    let success = Arc::clone(log);
    let error = Arc::clone(log);

    CallbackSet::new()
        .on_complete(move |_data, _raw, _ctx| complete.lock().unwrap().push("complete".into()))
        .on_success(move |_data, _raw, _ctx| success.lock().unwrap().push("success".into()))
        .on_error(move |_data, status_text, _raw, _ctx| {
            error.lock().unwrap().push(format!("error:{}", status_text))
        })
}

fn client(route: Route, transport: Arc<RecordingTransport>, events: EventBus) -> ApiClient {
    ApiClient::builder()
        .base_url("https://api.example.com")
        .username("alice")
        .api_key("a1b2c3")
        .route(route)
        .transport(transport)
        .events(events)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_complete_fires_before_success() {
    let transport = RecordingTransport::new(Reply::Status(StatusCode::OK, "{}"));
    let log = Arc::new(Mutex::new(Vec::new()));

    client(Route::ping(), transport, EventBus::new(4))
        .call(log_callbacks(&log))
        .await
        .unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["complete", "success"]);
}

#[tokio::test]
async fn test_complete_fires_before_error() {
    let transport = RecordingTransport::new(Reply::Status(StatusCode::FORBIDDEN, "denied"));
    let log = Arc::new(Mutex::new(Vec::new()));

    client(Route::ping(), transport, EventBus::new(4))
        .call(log_callbacks(&log))
        .await
        .unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["complete", "error:Forbidden"]);
}

#[tokio::test]
async fn test_transport_failure_lands_on_error() {
    let transport = RecordingTransport::new(Reply::Fail("connection reset"));
    let log = Arc::new(Mutex::new(Vec::new()));

    client(Route::ping(), transport, EventBus::new(4))
        .call(log_callbacks(&log))
        .await
        .unwrap();

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0], "complete");
    assert!(log[1].starts_with("error:"));
    assert!(log[1].contains("connection reset"));
}

#[tokio::test]
async fn test_missing_callbacks_are_skipped() {
    for reply in [
        Reply::Status(StatusCode::OK, "ok"),
        Reply::Status(StatusCode::NOT_FOUND, ""),
        Reply::Fail("down"),
    ] {
        let transport = RecordingTransport::new(reply);
        client(Route::ping(), transport, EventBus::new(4))
            .call(CallbackSet::new())
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_get_sends_structured_params() {
    let transport = RecordingTransport::new(Reply::Status(StatusCode::OK, "{}"));

    client(Route::user_bmark_delete("abc123"), Arc::clone(&transport), EventBus::new(4))
        .call(CallbackSet::new())
        .await
        .unwrap();

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].method, Method::DELETE);
    assert_eq!(sent[0].url, "https://api.example.com/alice/bmark/abc123");
    match &sent[0].body {
        RequestBody::Params(params) => assert_eq!(
            Value::Object(params.clone()),
            json!({"hash_id": "abc123", "username": "alice", "api_key": "a1b2c3"})
        ),
        other => panic!("Expected structured params, got {:?}", other),
    }
}

#[tokio::test]
async fn test_post_sends_json_string() {
    let transport = RecordingTransport::new(Reply::Status(StatusCode::OK, "{}"));
    let model = json!({"url": "http://x.com", "description": "X"});

    client(
        Route::user_bmark_save(&model).unwrap(),
        Arc::clone(&transport),
        EventBus::new(4),
    )
    .call(CallbackSet::new())
    .await
    .unwrap();

    let sent = transport.sent();
    assert_eq!(sent[0].method, Method::POST);
    assert_eq!(sent[0].url, "https://api.example.com/alice/bmark");
    match &sent[0].body {
        RequestBody::Json(text) => {
            let parsed: Value = serde_json::from_str(text).unwrap();
            assert_eq!(
                parsed,
                json!({
                    "url": "http://x.com",
                    "description": "X",
                    "username": "alice",
                    "api_key": "a1b2c3",
                })
            );
        }
        other => panic!("Expected JSON body, got {:?}", other),
    }
}

#[tokio::test]
async fn test_context_reaches_callbacks() {
    let transport = RecordingTransport::new(Reply::Status(StatusCode::OK, "{}"));
    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);

    client(Route::sync(), transport, EventBus::new(4))
        .call(CallbackSet::new().on_success(move |_data, raw, ctx| {
            *sink.lock().unwrap() = Some((ctx.route, ctx.method.clone(), ctx.url.clone(), raw.status));
        }))
        .await
        .unwrap();

    assert_eq!(
        seen.lock().unwrap().clone(),
        Some((
            "Sync",
            Method::GET,
            "https://api.example.com/alice/extension/sync".to_string(),
            Some(StatusCode::OK),
        ))
    );
}

#[tokio::test]
async fn test_loaded_event_only_on_success() {
    let events = EventBus::new(4);
    let mut rx = events.subscribe();

    let ok = RecordingTransport::new(Reply::Status(StatusCode::OK, "{}"));
    client(Route::ping(), ok, events.clone())
        .call(CallbackSet::new())
        .await
        .unwrap();

    let failed = RecordingTransport::new(Reply::Status(StatusCode::BAD_REQUEST, "{}"));
    client(Route::ping(), failed, events.clone())
        .call(CallbackSet::new())
        .await
        .unwrap();

    match rx.try_recv().unwrap() {
        ApiEvent::Loaded { url, .. } => assert_eq!(url, "https://api.example.com/alice/ping"),
    }
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_dispatch_directly() {
    let transport = RecordingTransport::new(Reply::Status(StatusCode::CREATED, "created"));
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut config = RequestConfig {
        method: Method::POST,
        ..RequestConfig::default()
    };
    config.data.insert("title".to_string(), json!("hello"));

    dispatch(
        transport.as_ref(),
        &EventBus::new(4),
        "https://api.example.com/alice/bmark".to_string(),
        config,
        CallArgs {
            route: "Custom",
            timeout: Some(Duration::from_secs(5)),
            callbacks: log_callbacks(&log),
        },
    )
    .await
    .unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["complete", "success"]);
    let sent = transport.sent();
    assert_eq!(sent[0].timeout, Some(Duration::from_secs(5)));
    assert_eq!(sent[0].body, RequestBody::Json(r#"{"title":"hello"}"#.to_string()));
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_every_received_response_is_logged_with_latency() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    for status in [StatusCode::OK, StatusCode::NOT_FOUND] {
        let transport = RecordingTransport::new(Reply::Status(status, "{}"));
        client(Route::ping(), transport, EventBus::new(4))
            .call(CallbackSet::new())
            .await
            .unwrap();
    }

    let text = logs.text();
    let received: Vec<&str> = text
        .lines()
        .filter(|line| line.contains("Received API response"))
        .collect();
    assert_eq!(received.len(), 2, "logs were: {}", text);
    assert!(received[0].contains("status=200"));
    assert!(received[1].contains("status=404"));
    assert!(received.iter().all(|line| line.contains("latency_ms=")));
    assert!(text.contains("API request failed"));
}
