//! Shared test fixtures: an in-memory `IntelApi` fake and an axum mock of
//! the HTTP service.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use email_intel::client::{AcademicQuery, BulkUpload};
use email_intel::error::ApiError;
use email_intel::models::*;
use email_intel::traits::IntelApi;

pub const KNOWN_EMAIL: &str = "ada@example.com";

/// The profile body the fakes return for [`KNOWN_EMAIL`]: name, no
/// location, two social profiles, one website.
pub fn profile_json(email: &str) -> Value {
    json!({
        "email": email,
        "person_info": {"name": "Ada Lovelace", "location": "", "occupation": "Analyst"},
        "social_profiles": [
            {"platform": "github", "url": "https://github.com/ada", "username": "ada"},
            {"platform": "linkedin", "url": "https://linkedin.com/in/ada"}
        ],
        "websites": ["https://ada.dev"],
        "phone_numbers": [],
        "search_results": [],
        "sources": ["google", "linkedin"],
        "confidence_score": 0.8
    })
}

pub fn twin_json(email: &str) -> Value {
    json!({
        "email": email,
        "name": "Ada Lovelace",
        "affiliation": "Analytical Engine Society",
        "impact_metrics": {
            "citation_impact": {"publication_count": 14, "estimated_citations": 230, "h_index_estimate": 7},
            "overall_impact_score": 0.82
        },
        "network_analysis": {"nodes": 3}
    })
}

fn not_found(detail: &str) -> ApiError {
    ApiError::Transport {
        status: Some(404),
        detail: detail.to_string(),
    }
}

fn offline() -> ApiError {
    ApiError::Transport {
        status: None,
        detail: "connection refused".to_string(),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// In-memory fake
// ═══════════════════════════════════════════════════════════════════════

/// Scriptable [`IntelApi`] that records every call by method name.
#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<String>>,
    /// `(delay_ms, total_profiles)` popped per `stats()` call.
    pub stats_queue: Mutex<VecDeque<(u64, u64)>>,
    pub search_delay_ms: u64,
    pub fail_search: bool,
    /// `None` answers `profile()` with a 404.
    pub profile: Option<StoredProfile>,
    /// `None` answers `digital_twin()` with a 404.
    pub twin: Option<Value>,
    pub fail_academic: bool,
    pub failing_insights: Vec<InsightKind>,
    /// `None` makes `search_suggestions()` fail.
    pub suggestions: Option<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_known_profile(mut self) -> Self {
        self.profile = Some(StoredProfile {
            email: KNOWN_EMAIL.to_string(),
            data: serde_json::from_value(profile_json(KNOWN_EMAIL)).unwrap(),
            source_count: 3,
            confidence_score: Some(0.8),
            ..StoredProfile::default()
        });
        self
    }

    pub fn with_search_delay(mut self, ms: u64) -> Self {
        self.search_delay_ms = ms;
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub fn with_twin(mut self, twin: Value) -> Self {
        self.twin = Some(twin);
        self
    }

    pub fn failing_academic(mut self) -> Self {
        self.fail_academic = true;
        self
    }

    pub fn failing_insight(mut self, kind: InsightKind) -> Self {
        self.failing_insights.push(kind);
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = Some(suggestions);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls.lock().iter().filter(|c| *c == name).count()
    }

    fn record(&self, name: &str) {
        self.calls.lock().push(name.to_string());
    }
}

#[async_trait]
impl IntelApi for FakeApi {
    async fn search(&self, email: &str, force_refresh: bool) -> Result<SearchResult, ApiError> {
        self.record("search");
        if self.search_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.search_delay_ms)).await;
        }
        if self.fail_search {
            return Err(offline());
        }
        Ok(SearchResult {
            status: ResponseStatus::Success,
            source: if force_refresh {
                DataSource::Fresh
            } else {
                DataSource::Cache
            },
            data: Some(serde_json::from_value(profile_json(email)).unwrap()),
            message: None,
        })
    }

    async fn bulk_search(&self, upload: BulkUpload) -> Result<BulkResult, ApiError> {
        self.record("bulk_search");
        let text = String::from_utf8_lossy(&upload.bytes);
        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        let valid = lines.iter().filter(|l| l.contains('@')).count() as u64;
        Ok(BulkResult {
            total: lines.len() as u64,
            processed: valid,
            new: valid,
            invalid: lines.len() as u64 - valid,
            ..BulkResult::default()
        })
    }

    async fn stats(&self) -> Result<StatsSnapshot, ApiError> {
        self.record("stats");
        let next = self.stats_queue.lock().pop_front();
        let (delay, total) = next.unwrap_or((0, 1));
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        Ok(StatsSnapshot {
            total_profiles: total,
            ..StatsSnapshot::default()
        })
    }

    async fn profile(&self, _email: &str) -> Result<StoredProfile, ApiError> {
        self.record("profile");
        self.profile
            .clone()
            .ok_or_else(|| not_found("Profile not found"))
    }

    async fn create_digital_twin(&self, email: &str) -> Result<RemoteTwin, ApiError> {
        self.record("create_digital_twin");
        Ok(RemoteTwin {
            data: twin_json(email),
        })
    }

    async fn digital_twin(&self, _email: &str) -> Result<RemoteTwin, ApiError> {
        self.record("digital_twin");
        self.twin
            .clone()
            .map(|data| RemoteTwin { data })
            .ok_or_else(|| not_found("Digital twin not found"))
    }

    async fn academic_search(&self, _query: &AcademicQuery) -> Result<Value, ApiError> {
        self.record("academic_search");
        if self.fail_academic {
            return Err(ApiError::Transport {
                status: Some(503),
                detail: "academic sources unavailable".to_string(),
            });
        }
        Ok(json!({"status": "success", "data": {"publications": []}}))
    }

    async fn insight(&self, kind: InsightKind, email: &str) -> Result<Value, ApiError> {
        self.record(kind.path());
        if self.failing_insights.contains(&kind) {
            return Err(offline());
        }
        Ok(json!({"view": kind.path(), "email": email}))
    }

    async fn pdf_analysis(&self, _email: &str, _force: bool) -> Result<PdfAnalysis, ApiError> {
        self.record("pdf_analysis");
        Ok(PdfAnalysis::default())
    }

    async fn export_profile(
        &self,
        email: &str,
        format: ExportFormat,
    ) -> Result<ExportPayload, ApiError> {
        self.record("export_profile");
        Ok(match format {
            ExportFormat::Json => ExportPayload::Json(profile_json(email)),
            ExportFormat::Pdf => ExportPayload::Pdf(b"%PDF-1.4".to_vec()),
        })
    }

    async fn search_suggestions(&self, _query: &str) -> Result<Vec<String>, ApiError> {
        self.record("search_suggestions");
        self.suggestions.clone().ok_or_else(offline)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// HTTP mock
// ═══════════════════════════════════════════════════════════════════════

/// Requests seen by the mock server, as `"<route>:<detail>"` strings.
#[derive(Clone, Default)]
pub struct Seen(Arc<Mutex<Vec<String>>>);

impl Seen {
    fn push(&self, entry: String) {
        self.0.lock().push(entry);
    }

    pub fn all(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn any(&self, prefix: &str) -> bool {
        self.0.lock().iter().any(|e| e.starts_with(prefix))
    }
}

fn error_body(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

async fn search(State(seen): State<Seen>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let force = body["force_refresh"].as_bool().unwrap_or(false);
    seen.push(format!("search:{}:{}", email, force));
    match email.as_str() {
        "boom@example.com" => error_body(StatusCode::INTERNAL_SERVER_ERROR, "engine exploded"),
        "garbled@example.com" => (
            [(header::CONTENT_TYPE, "application/json")],
            "{not json",
        )
            .into_response(),
        "rejected@example.com" => {
            Json(json!({"status": "error", "message": "Invalid email format"})).into_response()
        }
        _ => Json(json!({
            "status": "success",
            "source": if force { "fresh" } else { "cache" },
            "data": profile_json(&email)
        }))
        .into_response(),
    }
}

async fn bulk_search(State(seen): State<Seen>, mut multipart: Multipart) -> Response {
    let mut file_name = String::new();
    let mut text = String::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            file_name = field.file_name().unwrap_or_default().to_string();
            text = field.text().await.unwrap_or_default();
        }
    }
    seen.push(format!("bulk:{}", file_name));
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let details: Vec<Value> = lines
        .iter()
        .filter(|l| l.contains('@'))
        .map(|l| json!({"email": l, "status": "new", "sources_found": 2}))
        .collect();
    Json(json!({
        "status": "success",
        "total": lines.len(),
        "processed": details.len(),
        "existing": 0,
        "new": details.len(),
        "invalid": lines.len() - details.len(),
        "details": details
    }))
    .into_response()
}

async fn stats(State(seen): State<Seen>) -> Json<Value> {
    seen.push("stats".to_string());
    Json(json!({
        "total_profiles": 12,
        "total_searches": 30,
        "search_engine_results": 140,
        "recent_searches": [
            {"email": KNOWN_EMAIL, "search_type": "single", "results_found": 4, "created_at": "2024-01-01T10:00:00"}
        ],
        "search_engine_stats": {
            "google": {"total_results": 90, "usage_count": 9, "success_rate": 0.9, "is_active": true},
            "bing": {"total_results": 50, "usage_count": 10, "success_rate": 0.5, "is_active": true}
        }
    }))
}

async fn profile(State(seen): State<Seen>, Path(email): Path<String>) -> Response {
    seen.push(format!("profile:{}", email));
    if email != KNOWN_EMAIL {
        return error_body(StatusCode::NOT_FOUND, "Profile not found");
    }
    Json(json!({
        "status": "success",
        "data": {
            "email": email,
            "data": profile_json(&email),
            "source_count": 3,
            "confidence_score": 0.8,
            "is_verified": false,
            "created_at": "2023-12-01T09:00:00",
            "updated_at": "2024-01-01T10:00:00"
        }
    }))
    .into_response()
}

async fn create_twin(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    seen.push(format!("create-twin:{}", email));
    Json(json!({"status": "success", "data": twin_json(&email)}))
}

async fn get_twin(State(seen): State<Seen>, Path(email): Path<String>) -> Response {
    seen.push(format!("twin:{}", email));
    if email != KNOWN_EMAIL {
        return error_body(StatusCode::NOT_FOUND, "Digital twin not found");
    }
    Json(json!({"status": "success", "data": twin_json(&email)})).into_response()
}

async fn academic(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    seen.push(format!(
        "academic:{}:{}",
        body["email"].as_str().unwrap_or_default(),
        body["name"].as_str().unwrap_or("-")
    ));
    Json(json!({"status": "success", "data": {"publications": [{"title": "Notes on the Engine"}]}}))
}

async fn pdf_analysis(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    seen.push(format!("pdf:{}", body["email"].as_str().unwrap_or_default()));
    Json(json!({
        "status": "success",
        "source": "fresh",
        "data": {
            "pdf_documents": [{"title": "Sketch of the Analytical Engine", "email_found": true, "confidence_score": 0.9, "pages": 12}],
            "pdf_summary": {"total_documents": 1, "documents_with_email": 1, "average_confidence": 0.9, "unique_sources": ["arxiv"]}
        }
    }))
}

async fn export_profile(
    State(seen): State<Seen>,
    Path(email): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let format = params.get("format").cloned().unwrap_or_default();
    seen.push(format!("export:{}:{}", email, format));
    if email != KNOWN_EMAIL {
        return error_body(StatusCode::NOT_FOUND, "Profile not found");
    }
    match format.as_str() {
        "pdf" => (
            [(header::CONTENT_TYPE, "application/pdf")],
            b"%PDF-1.4 mock".to_vec(),
        )
            .into_response(),
        _ => Json(profile_json(&email)).into_response(),
    }
}

async fn suggestions(
    State(seen): State<Seen>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let q = params.get("q").cloned().unwrap_or_default();
    seen.push(format!("suggest:{}", q));
    match q.as_str() {
        "err" => error_body(StatusCode::INTERNAL_SERVER_ERROR, "suggester down"),
        "zz" => Json(json!({"suggestions": []})).into_response(),
        _ => Json(json!({"suggestions": [format!("{}a@example.com", q), format!("{}m@example.com", q)]}))
            .into_response(),
    }
}

fn insight(kind: &'static str, email: String) -> Response {
    if kind == "research-timeline" {
        return error_body(StatusCode::INTERNAL_SERVER_ERROR, "timeline unavailable");
    }
    Json(json!({"view": kind, "email": email})).into_response()
}

const INSIGHT_PATHS: [&str; 12] = [
    "visualization",
    "academic-profile",
    "network-analysis",
    "collaboration-graph",
    "research-metrics",
    "citation-analysis",
    "research-timeline",
    "activity-timeline",
    "trending-topics",
    "research-predictions",
    "realtime-metrics",
    "digital-twin-aggregate",
];

fn router(seen: Seen) -> Router {
    let api = Router::new()
        .route("/search", post(search))
        .route("/bulk_search", post(bulk_search))
        .route("/stats", get(stats))
        .route("/profile/{email}", get(profile))
        .route("/digital-twin", post(create_twin))
        .route("/digital-twin/{email}", get(get_twin))
        .route("/academic-search", post(academic))
        .route("/pdf-analysis", post(pdf_analysis))
        .route("/export-profile/{email}", get(export_profile))
        .route("/search-suggestions", get(suggestions))
        .route(
            "/comprehensive-analysis",
            post(|Json(body): Json<Value>| async move {
                Json(json!({"status": "success", "email": body["email"], "force_refresh": body["force_refresh"]}))
            }),
        )
        .route(
            "/batch-analysis",
            post(|Json(body): Json<Value>| async move {
                Json(json!({"status": "success", "count": body["emails"].as_array().map(Vec::len)}))
            }),
        );
    let api = INSIGHT_PATHS.into_iter().fold(api, |api, kind| {
        api.route(
            &format!("/{}/{{email}}", kind),
            get(move |Path(email): Path<String>| async move { insight(kind, email) }),
        )
    });
    Router::new().nest("/api", api).with_state(seen)
}

/// Start the mock on an ephemeral port. Returns the API base URL
/// (`http://127.0.0.1:<port>/api`) and the request log.
pub async fn spawn_mock() -> (String, Seen) {
    let seen = Seen::default();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(seen.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/api", addr), seen)
}

/// Like [`spawn_mock`], for synchronous tests: the server runs on its own
/// runtime in a background thread for the life of the test process.
pub fn spawn_mock_blocking() -> (String, Seen) {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async move {
            tx.send(spawn_mock().await).unwrap();
            std::future::pending::<()>().await;
        });
    });
    rx.recv().unwrap()
}
