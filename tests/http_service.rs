use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::post;
use axum::{Json, Router};
use carechat::auth::{AuthContext, Identity};
use carechat::config::ServiceConfig;
use carechat::http_service::HttpConversationService;
use carechat::portal::PortalService;
use carechat::transcript;
use carechat::{
    ChatController, ChatSettings, ConversationService, Phase, SendOutcome, ServiceError,
    TranscriptError,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct Recorded {
    calls: Arc<Mutex<Vec<(&'static str, Value)>>>,
    authorization: Arc<Mutex<Vec<Option<String>>>>,
}

impl Recorded {
    fn push(&self, endpoint: &'static str, body: Value) {
        self.calls.lock().unwrap().push((endpoint, body));
    }

    fn body(&self, endpoint: &str) -> Value {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(name, _)| *name == endpoint)
            .map(|(_, body)| body.clone())
            .unwrap_or(Value::Null)
    }
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn service_config(base_url: &str) -> ServiceConfig {
    ServiceConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
    }
}

async fn start(
    State(rec): State<Recorded>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    rec.push("start", json!(query));
    Json(json!({
        "session_id": "s1",
        "agent_name": "Ava",
        "message": "Hi",
        "suggestions": [{"label": "Pricing", "value": "What are your plans?"}]
    }))
}

async fn message(State(rec): State<Recorded>, Json(body): Json<Value>) -> Json<Value> {
    rec.push("message", body);
    Json(json!({
        "session_id": "s1",
        "agent_name": "Ava",
        "message": "Shall I create your account?",
        "suggestions": null,
        "requires_registration": true,
        "registration_data": {"company": "Acme", "seats": 12}
    }))
}

async fn register(State(rec): State<Recorded>, Json(body): Json<Value>) -> Json<Value> {
    rec.push("register", body);
    Json(json!({"success": true, "message": "Account created for Acme"}))
}

async fn transcript(State(rec): State<Recorded>, Json(body): Json<Value>) -> StatusCode {
    rec.push("transcript", body);
    StatusCode::ACCEPTED
}

fn widget_router(rec: Recorded) -> Router {
    Router::new()
        .route("/api/v1/chat/start", post(start))
        .route("/api/v1/chat/message", post(message))
        .route("/api/v1/registration/register", post(register))
        .route("/api/v1/chat/transcript/email", post(transcript))
        .with_state(rec)
}

#[tokio::test]
async fn widget_flow_speaks_the_wire_format() {
    let rec = Recorded::default();
    let base_url = serve(widget_router(rec.clone())).await;
    let service = HttpConversationService::new(&service_config(&base_url)).unwrap();
    let chat = ChatController::new(service, ChatSettings::default());

    let start = chat.start_session("en").await.unwrap();
    assert_eq!(start.session.id, "s1");
    assert_eq!(start.greeting.content, "Hi");
    assert_eq!(rec.body("start"), json!({"language": "en"}));

    let outcome = chat.send_message("  sign us up ").await;
    let SendOutcome::Replied(turn) = outcome else {
        panic!("expected a reply, got {outcome:?}");
    };
    assert!(turn.suggestions.is_empty());
    assert!(turn.registration.is_some());
    assert_eq!(
        rec.body("message"),
        json!({"session_id": "s1", "message": "sign us up", "language": "en"})
    );
    assert_eq!(chat.phase().await, Phase::RegistrationPending);

    let confirmation = chat.confirm_registration().await.unwrap();
    assert_eq!(confirmation.content, "Account created for Acme");
    assert_eq!(rec.body("register"), json!({"company": "Acme", "seats": 12}));

    chat.email_transcript("ops@acme.test", None).await.unwrap();
    assert_eq!(
        rec.body("transcript"),
        json!({"session_id": "s1", "email": "ops@acme.test", "name": "Valued Customer"})
    );

    assert_eq!(chat.snapshot().await.messages.len(), 4);
}

#[tokio::test]
async fn non_success_status_is_reported_with_body() {
    let router = Router::new().route(
        "/api/v1/chat/start",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let base_url = serve(router).await;
    let service = HttpConversationService::new(&service_config(&base_url)).unwrap();

    match service.start("en").await {
        Err(ServiceError::Status { status, body }) => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn missing_fields_are_malformed() {
    let router = Router::new().route(
        "/api/v1/chat/message",
        post(|| async { Json(json!({"agent_name": "Ava"})) }),
    );
    let base_url = serve(router).await;
    let service = HttpConversationService::new(&service_config(&base_url)).unwrap();

    let err = service.send("s1", "hello", "en").await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Malformed {
            endpoint: "chat message",
            ..
        }
    ));
}

#[tokio::test]
async fn unreachable_service_falls_back_and_transcript_error_surfaces() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let service = HttpConversationService::new(&service_config(&format!("http://{addr}"))).unwrap();
    let chat = ChatController::new(service, ChatSettings::default());

    let start = chat.start_session("en").await.unwrap();
    assert!(start.session.is_offline());
    assert_eq!(chat.phase().await, Phase::Active);

    let outcome = chat.send_message("hello").await;
    assert!(matches!(outcome, SendOutcome::Failed(_)));
    let before = chat.snapshot().await;
    assert_eq!(before.messages.len(), 3);
    assert!(before.suggestions.is_empty());

    let err = chat
        .email_transcript("ops@acme.test", Some("Ops"))
        .await
        .unwrap_err();
    assert!(matches!(err, TranscriptError::Service(ServiceError::Transport(_))));
    assert_eq!(chat.snapshot().await, before);
}

async fn portal_chat(
    State(rec): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    rec.authorization.lock().unwrap().push(authorization);
    rec.push("portal", body);
    Json(json!({"response": "A technician will call you today."}))
}

#[tokio::test]
async fn portal_requests_carry_identity_and_token() {
    let rec = Recorded::default();
    let router = Router::new()
        .route("/api/v1/chat", post(portal_chat))
        .with_state(rec.clone());
    let base_url = serve(router).await;

    let auth = AuthContext::authenticated(
        "default",
        "tok-123",
        Identity {
            user_id: "cust-7".to_string(),
            display_name: Some("Dana".to_string()),
        },
    );
    let service = PortalService::with_client(reqwest::Client::new(), &base_url, auth);
    let chat = ChatController::new(service, ChatSettings::default());

    let snapshot = chat.open().await;
    assert_eq!(snapshot.session.unwrap().id, "portal-cust-7");
    assert_eq!(snapshot.suggestions.len(), 4);

    let outcome = chat.choose_suggestion(1).await;
    let SendOutcome::Replied(turn) = outcome else {
        panic!("expected a reply, got {outcome:?}");
    };
    assert_eq!(turn.reply.content, "A technician will call you today.");
    assert_eq!(
        rec.body("portal"),
        json!({
            "message": "What is the status of my service requests?",
            "conversation_id": "portal-cust-7",
            "tenant_id": "default",
            "customer_id": "cust-7"
        })
    );
    assert_eq!(
        rec.authorization.lock().unwrap().as_slice(),
        &[Some("Bearer tok-123".to_string())]
    );
}

#[tokio::test]
async fn anonymous_portal_requests_omit_the_token() {
    let rec = Recorded::default();
    let router = Router::new()
        .route("/api/v1/chat", post(portal_chat))
        .with_state(rec.clone());
    let base_url = serve(router).await;

    let service = PortalService::with_client(
        reqwest::Client::new(),
        &base_url,
        AuthContext::anonymous("default"),
    );
    service
        .send("portal-anonymous", "My AC is not cooling properly", "en")
        .await
        .unwrap();

    assert_eq!(rec.body("portal")["customer_id"], json!("anonymous"));
    assert_eq!(rec.authorization.lock().unwrap().as_slice(), &[None]);
}

#[tokio::test]
async fn standalone_transcript_refuses_bad_addresses_before_any_request() {
    let rec = Recorded::default();
    let base_url = serve(widget_router(rec.clone())).await;
    let service = HttpConversationService::new(&service_config(&base_url)).unwrap();

    let err = transcript::send_transcript(&service, "s1", "  ", None, "Valued Customer")
        .await
        .unwrap_err();
    assert!(matches!(err, TranscriptError::MissingEmail));
    let err = transcript::send_transcript(&service, "s1", "ops.acme.test", None, "Valued Customer")
        .await
        .unwrap_err();
    assert!(matches!(err, TranscriptError::InvalidEmail(_)));
    assert!(rec.calls.lock().unwrap().is_empty());

    let sent_to = transcript::send_transcript(
        &service,
        "s1",
        " ops@acme.test ",
        Some("Ops"),
        "Valued Customer",
    )
    .await
    .unwrap();
    assert_eq!(sent_to, "ops@acme.test");
    assert_eq!(
        rec.body("transcript"),
        json!({"session_id": "s1", "email": "ops@acme.test", "name": "Ops"})
    );
}
