use super::*;
use crate::store::MemoryTokenStore;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

type Outcome = Result<RawResponse, TransportError>;

/// Transport that replays scripted outcomes and records what it was sent.
#[derive(Default)]
struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Outcome>>,
    sent: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    fn new(outcomes: Vec<Outcome>) -> Arc<Self> {
        Arc::new(Self { outcomes: Mutex::new(outcomes.into()), sent: Mutex::default() })
    }

    fn sent(&self) -> Vec<ApiRequest> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, _url: &str, request: &ApiRequest) -> Result<RawResponse, TransportError> {
        self.sent.lock().push(request.clone());
        tokio::task::yield_now().await;
        self.outcomes
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(RawResponse::new(StatusCode::OK, "{}")))
    }
}

#[derive(Default)]
struct RecordingEvents {
    notices: Mutex<Vec<String>>,
    logins: Mutex<usize>,
}

impl SessionEvents for RecordingEvents {
    fn error_notice(&self, message: &str) {
        self.notices.lock().push(message.to_string());
    }

    fn login_required(&self) {
        *self.logins.lock() += 1;
    }
}

fn status(code: u16, body: &str) -> Outcome {
    Ok(RawResponse::new(StatusCode::from_u16(code).unwrap(), body.to_string()))
}

struct Harness {
    dispatcher: Dispatcher,
    transport: Arc<ScriptedTransport>,
    events: Arc<RecordingEvents>,
    session: Arc<Session>,
    store: Arc<MemoryTokenStore>,
}

fn harness(token: Option<&str>, outcomes: Vec<Outcome>) -> Harness {
    let store = Arc::new(match token {
        Some(t) => MemoryTokenStore::with_token(t),
        None => MemoryTokenStore::new(),
    });
    let session = Arc::new(Session::hydrate(store.clone()));
    let transport = ScriptedTransport::new(outcomes);
    let events = Arc::new(RecordingEvents::default());
    let dispatcher = Dispatcher::new(
        Url::parse("http://backend.test/api").unwrap(),
        transport.clone(),
        session.clone(),
        events.clone(),
    );
    Harness { dispatcher, transport, events, session, store }
}

#[test]
fn url_for_keeps_api_prefix() {
    let h = harness(None, vec![]);
    assert_eq!(h.dispatcher.url_for("/login"), "http://backend.test/api/login");
    assert_eq!(h.dispatcher.url_for("datasets/3/preview"), "http://backend.test/api/datasets/3/preview");
}

#[tokio::test]
async fn attaches_bearer_token_when_present() {
    let h = harness(Some("aaa.bbb.ccc"), vec![status(200, "[]")]);
    h.dispatcher.dispatch(ApiRequest::get("/datasets")).await.unwrap();

    let sent = h.transport.sent();
    assert_eq!(sent[0].headers.get(AUTHORIZATION).unwrap(), "Bearer aaa.bbb.ccc");
}

#[tokio::test]
async fn sends_without_token_when_logged_out() {
    let h = harness(None, vec![status(200, "[]")]);
    h.dispatcher.dispatch(ApiRequest::get("/datasets")).await.unwrap();
    assert!(h.transport.sent()[0].headers.get(AUTHORIZATION).is_none());
}

#[tokio::test]
async fn transient_status_is_retried_once() {
    let h = harness(Some("a.b.c"), vec![status(503, ""), status(200, r#"{"ok":true}"#)]);
    let resp = h.dispatcher.dispatch(ApiRequest::get("/history")).await.unwrap();

    assert_eq!(resp.status, StatusCode::OK);
    let sent = h.transport.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].path, sent[1].path);
    assert_eq!(sent[0].meta.retry_count, 0);
    assert_eq!(sent[1].meta.retry_count, 1);
    assert!(h.events.notices.lock().is_empty());
}

#[tokio::test]
async fn second_transient_failure_is_surfaced() {
    let h = harness(Some("a.b.c"), vec![status(502, ""), status(504, r#"{"detail":"upstream down"}"#)]);
    let err = h.dispatcher.dispatch(ApiRequest::post("/train")).await.unwrap_err();

    assert_eq!(h.transport.sent().len(), 2);
    assert!(matches!(err, ClientError::Api { status: 504, .. }));
    assert_eq!(*h.events.notices.lock(), vec!["upstream down".to_string()]);
}

#[tokio::test]
async fn client_errors_and_500_are_not_retried() {
    for code in [400, 404, 422, 429, 500] {
        let h = harness(Some("a.b.c"), vec![status(code, "")]);
        let err = h.dispatcher.dispatch(ApiRequest::get("/datasets")).await.unwrap_err();
        assert_eq!(h.transport.sent().len(), 1, "status {code}");
        assert_eq!(err.status(), Some(code));
    }
}

#[tokio::test]
async fn network_errors_are_not_retried() {
    let h = harness(
        Some("a.b.c"),
        vec![Err(TransportError::new(TransportErrorKind::Connect, "connection refused"))],
    );
    let err = h.dispatcher.dispatch(ApiRequest::get("/datasets")).await.unwrap_err();

    assert!(matches!(err, ClientError::Network { .. }));
    assert_eq!(h.transport.sent().len(), 1);
    assert_eq!(h.events.notices.lock().len(), 1);
    assert_eq!(h.session.pending_requests(), 0);
}

#[tokio::test]
async fn unauthorized_logs_out_without_notice() {
    let h = harness(Some("a.b.c"), vec![status(401, r#"{"detail":"Token expired"}"#)]);
    let err = h.dispatcher.dispatch(ApiRequest::get("/account")).await.unwrap_err();

    assert!(matches!(err, ClientError::Unauthorized));
    assert!(!h.session.is_authenticated());
    assert_eq!(h.store.peek(), None);
    assert_eq!(*h.events.logins.lock(), 1);
    assert!(h.events.notices.lock().is_empty());
}

#[tokio::test]
async fn unauthorized_for_replaced_token_still_logs_out() {
    let h = harness(Some("old.tok.en"), vec![status(401, ""), status(401, "")]);
    h.session.set_token("new.tok.en").unwrap();

    let err = h.dispatcher.dispatch(ApiRequest::get("/account")).await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));
    assert!(!h.session.is_authenticated());
    assert_eq!(h.store.peek(), None);
    assert_eq!(*h.events.logins.lock(), 1);

    // Nothing left to remove: no second login prompt.
    h.dispatcher.dispatch(ApiRequest::get("/history")).await.unwrap_err();
    assert_eq!(*h.events.logins.lock(), 1);
    assert!(h.events.notices.lock().is_empty());
}

#[tokio::test]
async fn suppressed_status_emits_no_notice() {
    let h = harness(Some("a.b.c"), vec![status(400, r#"{"detail":"bad input"}"#)]);
    let request = ApiRequest::post("/predict/3").suppress_notice_for(StatusCode::BAD_REQUEST);
    let err = h.dispatcher.dispatch(request).await.unwrap_err();

    assert_eq!(err.to_string(), "bad input");
    assert!(h.events.notices.lock().is_empty());
}

#[tokio::test]
async fn suppression_is_status_specific() {
    let h = harness(Some("a.b.c"), vec![status(500, r#"{"detail":"boom"}"#)]);
    let request = ApiRequest::post("/predict/3").suppress_notice_for(StatusCode::BAD_REQUEST);
    h.dispatcher.dispatch(request).await.unwrap_err();
    assert_eq!(*h.events.notices.lock(), vec!["boom".to_string()]);
}

#[tokio::test]
async fn bare_requests_skip_policy() {
    let h = harness(Some("a.b.c"), vec![status(401, r#"{"detail":"Incorrect username or password"}"#)]);
    let err = h.dispatcher.dispatch(ApiRequest::post("/login").bare()).await.unwrap_err();

    assert!(matches!(err, ClientError::Api { status: 401, .. }));
    assert!(h.session.is_authenticated());
    assert!(h.transport.sent()[0].headers.get(AUTHORIZATION).is_none());
    assert!(h.events.notices.lock().is_empty());
    assert_eq!(*h.events.logins.lock(), 0);
}

#[tokio::test]
async fn retry_counter_does_not_leak_between_calls() {
    let h = harness(
        Some("a.b.c"),
        vec![status(503, ""), status(200, "{}"), status(503, ""), status(200, "{}")],
    );
    let request = ApiRequest::get("/history");
    h.dispatcher.dispatch(request.clone()).await.unwrap();
    h.dispatcher.dispatch(request.clone()).await.unwrap();

    assert_eq!(request.meta.retry_count, 0);
    let counts: Vec<u8> = h.transport.sent().iter().map(|r| r.meta.retry_count).collect();
    assert_eq!(counts, vec![0, 1, 0, 1]);
}

#[tokio::test]
async fn pending_count_returns_to_zero_across_concurrent_requests() {
    let outcomes = vec![
        status(200, "{}"),
        status(503, ""),
        status(404, ""),
        Err(TransportError::new(TransportErrorKind::Timeout, "timed out")),
        status(200, "{}"),
        status(401, ""),
    ];
    let h = harness(Some("a.b.c"), outcomes);
    let mut rx = h.session.subscribe_busy();

    let calls = (0..5).map(|i| h.dispatcher.dispatch(ApiRequest::get(format!("/datasets/{i}/preview"))));
    let results = futures::future::join_all(calls).await;

    assert_eq!(results.len(), 5);
    assert_eq!(h.session.pending_requests(), 0);
    assert!(!h.session.is_busy());
    assert_eq!(*rx.borrow_and_update(), 0);
}
