// SPDX-License-Identifier: PMPL-1.0-or-later
//! Client integration tests.
//!
//! Exercises the full client surface against in-memory collaborators: a
//! recording document transport and a recording HTTP requester. Nothing in
//! here touches the network.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use sanity_client::{
    create_client, DataEndpoint, DataTransport, EventHandler, EventKind, HttpRequest,
    HttpRequester, Method, Operation, PartialConfig, RequestEvent, RequestOptions, SanityClient,
    SanityError,
};

// ===========================================================================
// Test collaborators
// ===========================================================================

/// Shared timeline written to by listeners and the transport.
type Log = Arc<Mutex<Vec<String>>>;

#[derive(Debug, Clone, PartialEq)]
struct TransportCall {
    operation: Operation,
    args: Vec<Value>,
    options: RequestOptions,
}

#[derive(Debug, thiserror::Error)]
#[error("transport unavailable")]
struct TransportDown;

struct RecordingTransport {
    endpoint: Mutex<DataEndpoint>,
    calls: Mutex<Vec<TransportCall>>,
    log: Log,
    reject_config: AtomicBool,
    fail_calls: AtomicBool,
}

impl RecordingTransport {
    fn endpoint(&self) -> DataEndpoint {
        self.endpoint.lock().unwrap().clone()
    }

    fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, operation: Operation, args: Vec<Value>, options: RequestOptions) -> sanity_client::Result<Value> {
        self.log.lock().unwrap().push(format!("transport:{operation}"));
        if self.fail_calls.load(Ordering::SeqCst) {
            return Err(SanityError::external(TransportDown));
        }
        self.calls.lock().unwrap().push(TransportCall {
            operation,
            args: args.clone(),
            options,
        });
        Ok(json!({ "operation": operation.as_str(), "args": args }))
    }
}

#[async_trait]
impl DataTransport for RecordingTransport {
    fn connect(endpoint: DataEndpoint) -> sanity_client::Result<Self> {
        Ok(Self {
            endpoint: Mutex::new(endpoint),
            calls: Mutex::new(Vec::new()),
            log: Arc::new(Mutex::new(Vec::new())),
            reject_config: AtomicBool::new(false),
            fail_calls: AtomicBool::new(false),
        })
    }

    fn set_config(&self, endpoint: DataEndpoint) -> sanity_client::Result<()> {
        if self.reject_config.load(Ordering::SeqCst) {
            return Err(SanityError::external(TransportDown));
        }
        *self.endpoint.lock().unwrap() = endpoint;
        Ok(())
    }

    async fn fetch(&self, query: &str, params: &Value, options: RequestOptions) -> sanity_client::Result<Value> {
        self.record(Operation::Fetch, vec![json!(query), params.clone()], options)
    }

    async fn update(&self, id: &str, patch: &Value, options: RequestOptions) -> sanity_client::Result<Value> {
        self.record(Operation::Update, vec![json!(id), patch.clone()], options)
    }

    async fn create(&self, document: &Value, options: RequestOptions) -> sanity_client::Result<Value> {
        self.record(Operation::Create, vec![document.clone()], options)
    }

    async fn delete(&self, id: &str, options: RequestOptions) -> sanity_client::Result<Value> {
        self.record(Operation::Delete, vec![json!(id)], options)
    }
}

#[derive(Default)]
struct RecordingRequester {
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingRequester {
    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn last(&self) -> HttpRequest {
        self.requests().pop().expect("no request was sent")
    }
}

#[async_trait]
impl HttpRequester for RecordingRequester {
    async fn request(&self, request: HttpRequest) -> sanity_client::Result<Value> {
        let uri = request.uri.clone();
        self.requests.lock().unwrap().push(request);
        Ok(json!({ "uri": uri }))
    }
}

type TestClient = SanityClient<RecordingTransport, RecordingRequester>;

fn client_with(config: PartialConfig) -> TestClient {
    SanityClient::with_requester(config, RecordingRequester::default()).unwrap()
}

fn test_client() -> TestClient {
    client_with(PartialConfig::new("abc123").with_dataset("production"))
}

fn logging_handler(log: Log, label: &'static str) -> EventHandler {
    EventHandler::new(move |event| {
        log.lock()
            .unwrap()
            .push(format!("{label}:{}", event.operation()));
        async { Ok(()) }
    })
}

// ===========================================================================
// Construction and configuration
// ===========================================================================

#[test]
fn test_construction_derives_data_endpoint() {
    let client = test_client();
    assert_eq!(client.config().url(), "https://abc123.api.sanity.io/v1");

    let endpoint = client.transport().endpoint();
    assert_eq!(endpoint.url, "https://abc123.api.sanity.io/v1/data");
    assert_eq!(endpoint.dataset.as_deref(), Some("production"));
    assert_eq!(client.listener_count(EventKind::Request), 0);
}

#[test]
fn test_construction_rejects_invalid_project() {
    let result = SanityClient::<RecordingTransport, _>::with_requester(
        PartialConfig::new("NotHex"),
        RecordingRequester::default(),
    );
    assert!(matches!(result, Err(SanityError::Config(_))));
}

#[test]
fn test_create_client_with_defaults_requires_project() {
    let result = create_client::<RecordingTransport>(None);
    assert!(matches!(result, Err(SanityError::Config(msg)) if msg.contains("projectId")));
}

#[test]
fn test_create_client_with_config() {
    let client = create_client::<RecordingTransport>(Some(PartialConfig::new("abc123"))).unwrap();
    assert_eq!(client.config().project_id(), "abc123");
}

#[test]
fn test_configure_merges_and_pushes_endpoint() {
    let mut client = test_client();
    client
        .configure(PartialConfig::default().with_dataset("staging"))
        .unwrap()
        .configure(PartialConfig::default().with_token("secret"))
        .unwrap();

    let config = client.config();
    assert_eq!(config.project_id(), "abc123");
    assert_eq!(config.dataset(), Some("staging"));
    assert_eq!(config.token(), Some("secret"));

    let endpoint = client.transport().endpoint();
    assert_eq!(endpoint.dataset.as_deref(), Some("staging"));
    assert_eq!(endpoint.url, "https://abc123.api.sanity.io/v1/data");
}

#[tokio::test]
async fn test_configure_clears_token_and_dataset() {
    let mut client = client_with(
        PartialConfig::new("abc123")
            .with_dataset("production")
            .with_token("secret"),
    );
    client
        .configure(PartialConfig::default().without_token().without_dataset())
        .unwrap();

    assert_eq!(client.config().token(), None);
    assert_eq!(client.transport().endpoint().dataset, None);

    client.fetch("*", json!({})).await.unwrap();
    client.get_projects().await.unwrap();
    assert!(!client.transport().calls()[0].options.headers.contains_key("Sanity-Token"));
    assert!(!client.requester().last().headers.contains_key("Sanity-Token"));
}

#[test]
fn test_configure_recomputes_url() {
    let mut client = test_client();
    client
        .configure(PartialConfig::default().with_project_hostname(false))
        .unwrap();
    assert_eq!(client.config().url(), "https://api.sanity.io/v1");
    assert_eq!(
        client.transport().endpoint().url,
        "https://api.sanity.io/v1/data"
    );
}

#[test]
fn test_configure_invalid_keeps_previous() {
    let mut client = test_client();
    let before = client.config().clone();

    let err = client.configure(PartialConfig::new("Bad_Id")).err().unwrap();
    assert!(matches!(err, SanityError::Config(_)));
    assert_eq!(client.config(), &before);
    assert_eq!(client.transport().endpoint().dataset.as_deref(), Some("production"));
}

#[test]
fn test_configure_surfaces_transport_rejection() {
    let mut client = test_client();
    client.transport().reject_config.store(true, Ordering::SeqCst);

    let err = client
        .configure(PartialConfig::default().with_dataset("staging"))
        .err()
        .unwrap();
    assert!(err.downcast_external::<TransportDown>().is_some());
    assert_eq!(client.config().dataset(), Some("production"));
}

// ===========================================================================
// Listener registration
// ===========================================================================

#[tokio::test]
async fn test_on_then_remove_listener() {
    let count = Arc::new(AtomicUsize::new(0));
    let handler = {
        let count = count.clone();
        EventHandler::new(move |_| {
            count.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
    };

    let mut client = test_client();
    client
        .on("request", handler.clone())
        .unwrap()
        .remove_listener("request", &handler)
        .unwrap();

    client.fetch("*", json!({})).await.unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert_eq!(client.transport().calls().len(), 1);
}

#[test]
fn test_listener_registry_errors() {
    let mut client = test_client();
    let handler = EventHandler::new(|_| async { Ok(()) });

    assert!(matches!(
        client.on("response", handler.clone()),
        Err(SanityError::UnknownEvent(name)) if name == "response"
    ));
    assert!(matches!(
        client.remove_listener("request", &handler),
        Err(SanityError::HandlerNotRegistered)
    ));
}

#[tokio::test]
async fn test_emit_unknown_event() {
    let client = test_client();
    let result = client
        .emit("response", RequestEvent::Delete { id: "x".into() })
        .await;
    assert!(matches!(result, Err(SanityError::UnknownEvent(_))));
}

#[tokio::test]
async fn test_emit_delivers_identical_payload_to_all() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut client = test_client();
    for _ in 0..3 {
        let seen = seen.clone();
        client
            .on(
                "request",
                EventHandler::new(move |event| {
                    seen.lock().unwrap().push(event);
                    async { Ok(()) }
                }),
            )
            .unwrap();
    }

    let payload = RequestEvent::Update {
        id: "movie_1".into(),
        patch: json!({"set": {"title": "Alien"}}),
    };
    client.emit("request", payload.clone()).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert!(seen.iter().all(|event| event == &payload));
}

// ===========================================================================
// Document operations
// ===========================================================================

#[tokio::test]
async fn test_fetch_emits_before_transport() {
    let mut client = test_client();
    let log = client.transport().log.clone();
    let args = Arc::new(Mutex::new(Vec::new()));
    {
        let args = args.clone();
        client
            .on(
                "request",
                EventHandler::new(move |event| {
                    args.lock().unwrap().push((event.operation(), event.args()));
                    async { Ok(()) }
                }),
            )
            .unwrap();
    }
    client.on("request", logging_handler(log.clone(), "event")).unwrap();

    let params = json!({"type": "movie"});
    let result = client
        .fetch("*[_type == $type]", params.clone())
        .await
        .unwrap();

    assert_eq!(
        *args.lock().unwrap(),
        vec![(Operation::Fetch, vec![json!("*[_type == $type]"), params.clone()])]
    );
    assert_eq!(*log.lock().unwrap(), vec!["event:fetch", "transport:fetch"]);
    assert_eq!(
        result,
        json!({"operation": "fetch", "args": ["*[_type == $type]", params]})
    );
}

#[tokio::test]
async fn test_slow_listener_completes_before_transport() {
    let mut client = test_client();
    let log = client.transport().log.clone();
    {
        let log = log.clone();
        client
            .on(
                "request",
                EventHandler::new(move |_| {
                    let log = log.clone();
                    async move {
                        tokio::task::yield_now().await;
                        log.lock().unwrap().push("listener:done".to_owned());
                        Ok(())
                    }
                }),
            )
            .unwrap();
    }

    client.delete("movie_1").await.unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["listener:done", "transport:delete"]);
}

#[tokio::test]
async fn test_every_operation_reaches_transport() {
    let mut client = test_client();
    let log = client.transport().log.clone();
    client.on("request", logging_handler(log.clone(), "event")).unwrap();

    client.fetch("*", json!({})).await.unwrap();
    client.update("movie_1", json!({"set": {"year": 1979}})).await.unwrap();
    client.create(json!({"_type": "movie"})).await.unwrap();
    client.delete("movie_1").await.unwrap();

    let operations: Vec<Operation> = client
        .transport()
        .calls()
        .iter()
        .map(|call| call.operation)
        .collect();
    assert_eq!(
        operations,
        vec![Operation::Fetch, Operation::Update, Operation::Create, Operation::Delete]
    );
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "event:fetch",
            "transport:fetch",
            "event:update",
            "transport:update",
            "event:create",
            "transport:create",
            "event:delete",
            "transport:delete",
        ]
    );

    let update = &client.transport().calls()[1];
    assert_eq!(update.args, vec![json!("movie_1"), json!({"set": {"year": 1979}})]);
}

#[tokio::test]
async fn test_failing_listener_skips_transport() {
    let mut client = test_client();
    client
        .on(
            "request",
            EventHandler::new(|_| async { Err(SanityError::Validation("read-only mode".into())) }),
        )
        .unwrap();

    let err = client.create(json!({"_type": "movie"})).await.unwrap_err();
    assert!(matches!(err, SanityError::Validation(msg) if msg == "read-only mode"));
    assert!(client.transport().calls().is_empty());
    assert!(client.transport().log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_transport_error_passes_through() {
    let client = test_client();
    client.transport().fail_calls.store(true, Ordering::SeqCst);

    let err = client.fetch("*", json!({})).await.unwrap_err();
    assert!(err.downcast_external::<TransportDown>().is_some());
    assert_eq!(err.to_string(), "transport unavailable");
}

#[tokio::test]
async fn test_transport_receives_fresh_options() {
    let mut client = test_client();
    client.fetch("*", json!({})).await.unwrap();

    client
        .configure(
            PartialConfig::default()
                .with_token("secret")
                .with_project_hostname(false),
        )
        .unwrap();
    client.fetch("*", json!({})).await.unwrap();

    let calls = client.transport().calls();
    assert!(calls[0].options.headers.is_empty());
    assert!(calls[0].options.json);
    assert_eq!(
        calls[1].options.headers.get("Sanity-Token").map(String::as_str),
        Some("secret")
    );
    assert_eq!(
        calls[1].options.headers.get("Sanity-Project-ID").map(String::as_str),
        Some("abc123")
    );
}

// ===========================================================================
// Raw requests, datasets, projects
// ===========================================================================

#[tokio::test]
async fn test_request_strips_single_leading_slash() {
    let client = test_client();
    client.request(HttpRequest::get("foo")).await.unwrap();
    client.request(HttpRequest::get("/foo")).await.unwrap();
    client.request(HttpRequest::get("//foo")).await.unwrap();

    let uris: Vec<String> = client
        .requester()
        .requests()
        .into_iter()
        .map(|request| request.uri)
        .collect();
    assert_eq!(
        uris,
        vec![
            "https://abc123.api.sanity.io/v1/foo",
            "https://abc123.api.sanity.io/v1/foo",
            "https://abc123.api.sanity.io/v1//foo",
        ]
    );
}

#[tokio::test]
async fn test_request_merges_options_caller_wins() {
    let client = client_with(
        PartialConfig::new("abc123")
            .with_token("default-token")
            .with_project_hostname(false),
    );

    client
        .request(
            HttpRequest::get("/projects")
                .with_header("sanity-token", "override")
                .with_header("X-Trace", "1")
                .with_json(false),
        )
        .await
        .unwrap();

    let sent = client.requester().last();
    assert_eq!(sent.uri, "https://api.sanity.io/v1/projects");
    assert_eq!(sent.json, Some(false));
    assert_eq!(sent.headers.get("sanity-token").map(String::as_str), Some("override"));
    assert!(!sent.headers.contains_key("Sanity-Token"));
    assert_eq!(sent.headers.get("Sanity-Project-ID").map(String::as_str), Some("abc123"));
    assert_eq!(sent.headers.get("X-Trace").map(String::as_str), Some("1"));
}

#[tokio::test]
async fn test_request_returns_requester_result() {
    let client = test_client();
    let response = client.get_projects().await.unwrap();
    assert_eq!(response, json!({"uri": "https://abc123.api.sanity.io/v1/projects"}));

    let sent = client.requester().last();
    assert_eq!(sent.method, Method::GET);
    assert_eq!(sent.json, Some(true));
}

#[tokio::test]
async fn test_request_does_not_emit_events() {
    let mut client = test_client();
    let log = client.transport().log.clone();
    client.on("request", logging_handler(log.clone(), "event")).unwrap();

    client.list_datasets().await.unwrap();
    assert!(log.lock().unwrap().is_empty());
    assert_eq!(
        client.requester().last().uri,
        "https://abc123.api.sanity.io/v1/datasets"
    );
}

#[tokio::test]
async fn test_create_and_delete_dataset() {
    let client = test_client();
    client.create_dataset("staging").await.unwrap();
    client.delete_dataset("staging").await.unwrap();

    let sent = client.requester().requests();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].method, Method::PUT);
    assert_eq!(sent[0].uri, "https://abc123.api.sanity.io/v1/datasets/staging");
    assert_eq!(sent[1].method, Method::DELETE);
    assert_eq!(sent[1].uri, "https://abc123.api.sanity.io/v1/datasets/staging");
}

#[tokio::test]
async fn test_invalid_dataset_name_sends_nothing() {
    let client = test_client();
    let err = client.create_dataset("no spaces allowed").await.unwrap_err();
    assert!(matches!(err, SanityError::Validation(_)));
    assert!(client.requester().requests().is_empty());
}

#[tokio::test]
async fn test_shared_hostname_example() {
    let client = client_with(PartialConfig::new("abc123").with_project_hostname(false));
    assert_eq!(client.config().url(), "https://api.sanity.io/v1");

    client.fetch("*", json!({})).await.unwrap();
    client.get_projects().await.unwrap();

    let call = &client.transport().calls()[0];
    assert_eq!(
        call.options.headers.get("Sanity-Project-ID").map(String::as_str),
        Some("abc123")
    );
    assert_eq!(
        client
            .requester()
            .last()
            .headers
            .get("Sanity-Project-ID")
            .map(String::as_str),
        Some("abc123")
    );
}

#[test]
fn test_operation_futures_are_send() {
    fn assert_send<F: std::future::Future + Send>(_: F) {}

    let client = test_client();
    assert_send(client.fetch("*", json!({})));
    assert_send(client.update("movie_1", json!({})));
    assert_send(client.create(json!({})));
    assert_send(client.delete("movie_1"));
    assert_send(client.get_projects());
}
