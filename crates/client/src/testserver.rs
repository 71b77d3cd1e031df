//! In-process fake of the analysis service, shared by the gateway,
//! session, and analysis tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

/// Behavior knobs and call counters for the fake API.
pub(crate) struct ScamApi {
    /// Bearer token currently accepted by authenticated routes.
    pub valid_access: Mutex<String>,
    /// Token pair issued by the next login/refresh.
    pub next_access: Mutex<String>,
    pub next_refresh: Mutex<String>,

    pub refresh_succeeds: AtomicBool,
    pub refresh_delay_ms: AtomicU64,
    /// Reject every profile request regardless of the bearer token.
    pub force_unauthorized: AtomicBool,
    /// Make the login endpoint answer 401 instead of an envelope.
    pub login_unauthorized: AtomicBool,
    pub logout_fails: AtomicBool,

    pub login_calls: AtomicUsize,
    pub profile_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub document_calls: AtomicUsize,
}

impl ScamApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            valid_access: Mutex::new("access-0".to_string()),
            next_access: Mutex::new("access-1".to_string()),
            next_refresh: Mutex::new("refresh-1".to_string()),
            refresh_succeeds: AtomicBool::new(true),
            refresh_delay_ms: AtomicU64::new(0),
            force_unauthorized: AtomicBool::new(false),
            login_unauthorized: AtomicBool::new(false),
            logout_fails: AtomicBool::new(false),
            login_calls: AtomicUsize::new(0),
            profile_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            document_calls: AtomicUsize::new(0),
        })
    }

    fn bearer_ok(&self, headers: &HeaderMap) -> bool {
        let expected = format!("Bearer {}", self.valid_access.lock().unwrap());
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(|v| v == expected)
            .unwrap_or(false)
    }
}

pub(crate) fn success(data: Value) -> Json<Value> {
    Json(json!({
        "status": "success",
        "data": data,
        "errorCode": null,
        "errorMessage": null,
        "fieldErrors": null
    }))
}

pub(crate) fn fail(code: &str, message: &str) -> Json<Value> {
    Json(json!({
        "status": "fail",
        "data": null,
        "errorCode": code,
        "errorMessage": message,
        "fieldErrors": null
    }))
}

fn analysis_details(model: &str) -> Value {
    json!({
        "model": model,
        "analysisTime": "2025-11-02T12:00:00",
        "totalProcessingTimeMs": 1234
    })
}

fn analysis_result() -> Value {
    json!({
        "analysisSummary": "The message matches known investment fraud patterns.",
        "riskAssessment": {"riskLevel": "HIGH", "riskScore": 82, "confidenceLevel": 90},
        "scamClassification": {
            "scamType": "INVESTMENT_FRAUD",
            "scamSubType": "Ponzi scheme",
            "classificationReason": "Guaranteed fixed returns combined with recruitment pressure"
        },
        "detectedSignals": [{
            "signalName": "Guaranteed returns",
            "severity": "HIGH",
            "evidenceQuote": "guaranteed 10% every month",
            "explanation": "No legitimate investment guarantees fixed returns"
        }],
        "psychologicalTactics": [{
            "tacticName": "Urgency",
            "evidenceQuote": "the offer closes tonight",
            "explanation": "Pressure to act before verifying"
        }],
        "similarCases": [{
            "caseTitle": "Freight truck investment fraud",
            "similarityScore": 77,
            "matchedPatterns": ["fixed monthly returns"],
            "caseSource": "https://example.com/cases/1"
        }],
        "recommendation": {
            "immediateActions": ["Stop all transfers immediately"],
            "reportingGuidance": "Report to the national fraud hotline",
            "preventionTips": ["Verify the firm's registration before investing"]
        }
    })
}

async fn login(State(api): State<Arc<ScamApi>>, Json(body): Json<Value>) -> Response {
    api.login_calls.fetch_add(1, Ordering::SeqCst);
    if api.login_unauthorized.load(Ordering::SeqCst) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if body["loginId"] != "alice" || body["loginPw"] != "secret" {
        return fail("AUTH-001", "Invalid credentials").into_response();
    }

    let access = api.next_access.lock().unwrap().clone();
    let refresh = api.next_refresh.lock().unwrap().clone();
    *api.valid_access.lock().unwrap() = access.clone();
    success(json!({"userId": 1, "accessToken": access, "refreshToken": refresh})).into_response()
}

async fn join(State(api): State<Arc<ScamApi>>, Json(body): Json<Value>) -> Response {
    if body["email"].as_str().unwrap_or_default().is_empty() {
        return fail("AUTH-002", "email is required").into_response();
    }
    login(State(api), Json(body.clone())).await
}

async fn logout(State(api): State<Arc<ScamApi>>) -> Response {
    api.logout_calls.fetch_add(1, Ordering::SeqCst);
    if api.logout_fails.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    success(Value::Null).into_response()
}

async fn profile(State(api): State<Arc<ScamApi>>, headers: HeaderMap) -> Response {
    api.profile_calls.fetch_add(1, Ordering::SeqCst);
    if api.force_unauthorized.load(Ordering::SeqCst) || !api.bearer_ok(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    success(json!({
        "userId": 1,
        "userEmail": "alice@example.com",
        "name": "Alice",
        "role": "USER"
    }))
    .into_response()
}

async fn refresh(
    State(api): State<Arc<ScamApi>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    api.refresh_calls.fetch_add(1, Ordering::SeqCst);

    let delay = api.refresh_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    if params.get("refreshToken").map(String::is_empty).unwrap_or(true) {
        return fail("AUTH-003", "missing refresh token").into_response();
    }
    if !api.refresh_succeeds.load(Ordering::SeqCst) {
        return fail("AUTH-004", "refresh token revoked").into_response();
    }

    let access = api.next_access.lock().unwrap().clone();
    let refresh = api.next_refresh.lock().unwrap().clone();
    *api.valid_access.lock().unwrap() = access.clone();
    success(json!({"accessToken": access, "refreshToken": refresh})).into_response()
}

async fn models() -> Response {
    success(json!({"models": ["MODEL_X", "MODEL_Y"]})).into_response()
}

async fn analyze(
    State(api): State<Arc<ScamApi>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    if !api.bearer_ok(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let model = params.get("model").cloned().unwrap_or_default();
    let prompt = body["prompt"].as_str().unwrap_or_default();

    if prompt.len() < 10 {
        return success(json!({
            "isValidAnalysis": false,
            "analysisResult": null,
            "analysisDetails": analysis_details(&model),
            "invalidReason": "input is too short to analyze"
        }))
        .into_response();
    }

    success(json!({
        "isValidAnalysis": true,
        "analysisResult": analysis_result(),
        "analysisDetails": analysis_details(&model),
        "invalidReason": null
    }))
    .into_response()
}

async fn history(
    State(api): State<Arc<ScamApi>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !api.bearer_ok(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let page: u32 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let limit: u32 = params.get("limit").and_then(|l| l.parse().ok()).unwrap_or(10);

    success(json!({
        "contents": [{
            "documentId": "doc-1",
            "scamType": "INVESTMENT_FRAUD",
            "createdAt": "2025-11-02T12:00:00"
        }],
        "page": page,
        "size": limit,
        "totalElements": 1,
        "totalPages": 1,
        "last": true
    }))
    .into_response()
}

async fn detail(
    State(api): State<Arc<ScamApi>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !api.bearer_ok(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let mut record = analysis_result();
    let extra = json!({
        "documentId": id,
        "userId": 1,
        "prompt": "They promised me guaranteed 10% every month",
        "analysisDetails": analysis_details("MODEL_X"),
        "createdAt": "2025-11-02T12:00:00"
    });
    for (k, v) in extra.as_object().unwrap() {
        record[k] = v.clone();
    }
    success(record).into_response()
}

async fn documents(
    State(api): State<Arc<ScamApi>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !api.bearer_ok(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    api.document_calls.fetch_add(1, Ordering::SeqCst);
    if body["scamTitle"].as_str().unwrap_or_default().is_empty() {
        return fail("DOC-001", "scamTitle is required").into_response();
    }
    success(Value::Null).into_response()
}

/// Bind the fake API on a loopback port and return its base URL.
pub(crate) async fn spawn(api: Arc<ScamApi>) -> String {
    let app = Router::new()
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/join", post(join))
        .route("/api/v1/auth/logout", post(logout))
        .route("/api/v1/auth/profile", get(profile))
        .route("/api/v1/auth/refresh", post(refresh))
        .route("/api/v1/scam/model/available", get(models))
        .route("/api/v2/scam/analyze", post(analyze))
        .route("/api/v2/scam/analyze/results", get(history))
        .route("/api/v2/scam/analyze/result/{id}", get(detail))
        .route("/api/v2/scam/documents", post(documents))
        .with_state(api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });

    format!("http://{addr}")
}
