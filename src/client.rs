//! HTTP request client for the Email Intelligence Collector API.
//!
//! Every outbound call goes through [`ApiClient::request`], which builds the
//! URL, attaches the body, checks the status, and decodes the response. The
//! per-endpoint wrappers are thin, fixed-shape calls on top of it.
//!
//! # Endpoints
//!
//! | Method | Path | Wrapper |
//! |--------|------|---------|
//! | `POST` | `/search` | [`IntelApi::search`] |
//! | `POST` | `/bulk_search` | [`IntelApi::bulk_search`] |
//! | `GET`  | `/stats` | [`IntelApi::stats`] |
//! | `GET`  | `/profile/{email}` | [`IntelApi::profile`] |
//! | `POST` | `/digital-twin` | [`IntelApi::create_digital_twin`] |
//! | `GET`  | `/digital-twin/{email}` | [`IntelApi::digital_twin`] |
//! | `POST` | `/academic-search` | [`IntelApi::academic_search`] |
//! | `GET`  | `/{kind}/{email}` | [`IntelApi::insight`] |
//! | `POST` | `/pdf-analysis` | [`IntelApi::pdf_analysis`] |
//! | `GET`  | `/export-profile/{email}?format=` | [`IntelApi::export_profile`] |
//! | `GET`  | `/search-suggestions?q=` | [`IntelApi::search_suggestions`] |
//! | `POST` | `/comprehensive-analysis` | [`ApiClient::comprehensive_analysis`] |
//! | `POST` | `/batch-analysis` | [`ApiClient::batch_analysis`] |
//!
//! # Failure handling
//!
//! A non-2xx status becomes [`ApiError::Transport`] with the status code; a
//! connection failure becomes the same variant without one; a body that does
//! not decode becomes [`ApiError::Payload`]. Nothing is retried.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{multipart, Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::models::{
    BulkResult, ExportFormat, ExportPayload, InsightKind, PdfAnalysis, ProfileEnvelope,
    RemoteTwin, SearchResult, StatsSnapshot, StoredProfile, Suggestions,
};
use crate::traits::IntelApi;

/// File extensions the bulk endpoint accepts.
const BULK_EXTENSIONS: [&str; 2] = ["csv", "txt"];

// ═══════════════════════════════════════════════════════════════════════
// Request building blocks
// ═══════════════════════════════════════════════════════════════════════

/// A path relative to the API base URL, plus query parameters.
///
/// Segments are percent-encoded when resolved, so an email address can be
/// pushed as a single segment without escaping it first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Endpoint {
    segments: Vec<String>,
    query: Vec<(String, String)>,
}

impl Endpoint {
    /// Parse a slash-separated relative path such as `"/digital-twin"`.
    pub fn path(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            query: Vec::new(),
        }
    }

    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Join this endpoint onto `base`.
    pub fn resolve(&self, base: &Url) -> Result<Url, ApiError> {
        let mut url = base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ApiError::InvalidEndpoint(format!("base URL cannot take a path: {}", base))
            })?;
            segments.pop_if_empty();
            segments.extend(&self.segments);
        }
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(url)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

/// Body attached to a request.
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(multipart::Form),
}

/// How the response body should be handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Json,
    Binary,
}

/// Options bag for [`ApiClient::request`].
pub struct RequestOptions {
    pub method: Method,
    pub body: RequestBody,
    /// Send `Content-Type: application/json`. Ignored for multipart bodies,
    /// which carry their own boundary header.
    pub json_content_type: bool,
    pub accept: Option<&'static str>,
    pub expect: ResponseKind,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            body: RequestBody::Empty,
            json_content_type: true,
            accept: None,
            expect: ResponseKind::Json,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post_json(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: RequestBody::Json(body),
            ..Self::default()
        }
    }

    pub fn post_multipart(form: multipart::Form) -> Self {
        Self {
            method: Method::POST,
            body: RequestBody::Multipart(form),
            json_content_type: false,
            ..Self::default()
        }
    }
}

/// Decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Json(Value),
    Binary(Vec<u8>),
}

impl ApiResponse {
    /// Deserialize a JSON body into `T`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        match self {
            ApiResponse::Json(value) => Ok(serde_json::from_value(value)?),
            ApiResponse::Binary(_) => Err(ApiError::Payload(
                "expected a JSON body, got binary".to_string(),
            )),
        }
    }
}

/// A file selected for bulk search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl BulkUpload {
    /// Read a `.csv` or `.txt` file from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the extension is not accepted or the file cannot
    /// be read.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !BULK_EXTENSIONS.contains(&ext.as_str()) {
            bail!(
                "Unsupported file type for bulk search: {} (expected .csv or .txt)",
                path.display()
            );
        }
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("upload.{}", ext));
        Ok(Self { file_name, bytes })
    }

    fn into_form(self) -> multipart::Form {
        let part = multipart::Part::bytes(self.bytes).file_name(self.file_name);
        multipart::Form::new().part("file", part)
    }
}

/// Parameters of `POST /academic-search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct AcademicQuery {
    pub email: String,
    pub name: Option<String>,
    pub affiliation: Option<String>,
}

impl AcademicQuery {
    pub fn for_email(email: &str) -> Self {
        Self {
            email: email.to_string(),
            ..Self::default()
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Client
// ═══════════════════════════════════════════════════════════════════════

/// The request client. Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Build a client from the `[api]` config section.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` does not parse or the HTTP client
    /// cannot be constructed.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim())
            .with_context(|| format!("Invalid API base URL: {}", config.base_url))?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Issue a single call and decode its body.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Transport`] on connection failure or non-2xx status.
    /// - [`ApiError::Payload`] when a JSON body does not parse.
    pub async fn request(
        &self,
        endpoint: &Endpoint,
        options: RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        let url = endpoint.resolve(&self.base_url)?;
        tracing::debug!(method = %options.method, url = url.as_str(), "api request");

        let mut builder = self.http.request(options.method.clone(), url);
        if options.json_content_type && !matches!(options.body, RequestBody::Multipart(_)) {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }
        if let Some(accept) = options.accept {
            builder = builder.header(ACCEPT, accept);
        }
        builder = match options.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.body(serde_json::to_vec(&value)?),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(%endpoint, error = %e, "api request failed");
            ApiError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = server_detail(&body)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "request failed".to_string());
            tracing::warn!(%endpoint, status = status.as_u16(), %detail, "api request rejected");
            return Err(ApiError::Transport {
                status: Some(status.as_u16()),
                detail,
            });
        }

        let bytes = response.bytes().await?;
        match options.expect {
            ResponseKind::Json => {
                let value: Value = serde_json::from_slice(&bytes).map_err(|e| {
                    tracing::warn!(%endpoint, error = %e, "response is not valid JSON");
                    ApiError::from(e)
                })?;
                Ok(ApiResponse::Json(value))
            }
            ResponseKind::Binary => Ok(ApiResponse::Binary(bytes.to_vec())),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, ApiError> {
        self.request(&endpoint, RequestOptions::get())
            .await?
            .decode()
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        body: Value,
    ) -> Result<T, ApiError> {
        self.request(&endpoint, RequestOptions::post_json(body))
            .await?
            .decode()
    }

    /// `POST /comprehensive-analysis`.
    pub async fn comprehensive_analysis(
        &self,
        email: &str,
        force_refresh: bool,
    ) -> Result<Value, ApiError> {
        self.post_json(
            Endpoint::path("/comprehensive-analysis"),
            json!({ "email": email, "force_refresh": force_refresh }),
        )
        .await
    }

    /// `POST /batch-analysis`.
    pub async fn batch_analysis(&self, emails: &[String]) -> Result<Value, ApiError> {
        self.post_json(Endpoint::path("/batch-analysis"), json!({ "emails": emails }))
            .await
    }
}

/// Extract FastAPI's `{"detail": "..."}` message from an error body.
fn server_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl IntelApi for ApiClient {
    async fn search(&self, email: &str, force_refresh: bool) -> Result<SearchResult, ApiError> {
        self.post_json(
            Endpoint::path("/search"),
            json!({ "email": email, "force_refresh": force_refresh }),
        )
        .await
    }

    async fn bulk_search(&self, upload: BulkUpload) -> Result<BulkResult, ApiError> {
        let options = RequestOptions::post_multipart(upload.into_form());
        self.request(&Endpoint::path("/bulk_search"), options)
            .await?
            .decode()
    }

    async fn stats(&self) -> Result<StatsSnapshot, ApiError> {
        self.get_json(Endpoint::path("/stats")).await
    }

    async fn profile(&self, email: &str) -> Result<StoredProfile, ApiError> {
        let envelope: ProfileEnvelope = self
            .get_json(Endpoint::path("/profile").segment(email))
            .await?;
        Ok(envelope.data)
    }

    async fn create_digital_twin(&self, email: &str) -> Result<RemoteTwin, ApiError> {
        self.post_json(Endpoint::path("/digital-twin"), json!({ "email": email }))
            .await
    }

    async fn digital_twin(&self, email: &str) -> Result<RemoteTwin, ApiError> {
        self.get_json(Endpoint::path("/digital-twin").segment(email))
            .await
    }

    async fn academic_search(&self, query: &AcademicQuery) -> Result<Value, ApiError> {
        self.post_json(
            Endpoint::path("/academic-search"),
            serde_json::to_value(query)?,
        )
        .await
    }

    async fn insight(&self, kind: InsightKind, email: &str) -> Result<Value, ApiError> {
        self.get_json(Endpoint::path(kind.path()).segment(email))
            .await
    }

    async fn pdf_analysis(&self, email: &str, force_refresh: bool) -> Result<PdfAnalysis, ApiError> {
        self.post_json(
            Endpoint::path("/pdf-analysis"),
            json!({ "email": email, "force_refresh": force_refresh }),
        )
        .await
    }

    async fn export_profile(
        &self,
        email: &str,
        format: ExportFormat,
    ) -> Result<ExportPayload, ApiError> {
        let endpoint = Endpoint::path("/export-profile")
            .segment(email)
            .query("format", format.as_str());
        let options = RequestOptions {
            json_content_type: false,
            accept: Some(format.accept_header()),
            expect: match format {
                ExportFormat::Json => ResponseKind::Json,
                ExportFormat::Pdf => ResponseKind::Binary,
            },
            ..RequestOptions::get()
        };
        match self.request(&endpoint, options).await? {
            ApiResponse::Json(value) => Ok(ExportPayload::Json(value)),
            ApiResponse::Binary(bytes) => Ok(ExportPayload::Pdf(bytes)),
        }
    }

    async fn search_suggestions(&self, query: &str) -> Result<Vec<String>, ApiError> {
        let suggestions: Suggestions = self
            .get_json(Endpoint::path("/search-suggestions").query("q", query))
            .await?;
        Ok(suggestions.suggestions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn base() -> Url {
        Url::parse("http://localhost:8001/api").unwrap()
    }

    #[test]
    fn test_endpoint_joins_onto_base_path() {
        let url = Endpoint::path("/search").resolve(&base()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8001/api/search");
    }

    #[test]
    fn test_endpoint_with_trailing_slash_base() {
        let base = Url::parse("http://localhost:8001/api/").unwrap();
        let url = Endpoint::path("stats").resolve(&base).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8001/api/stats");
    }

    #[test]
    fn test_email_segment_is_escaped() {
        let url = Endpoint::path("/digital-twin")
            .segment("a/b c@example.com")
            .resolve(&base())
            .unwrap();
        assert_eq!(
            url.path(),
            "/api/digital-twin/a%2Fb%20c@example.com"
        );
    }

    #[test]
    fn test_query_is_encoded() {
        let url = Endpoint::path("/search-suggestions")
            .query("q", "ada lovelace&co")
            .resolve(&base())
            .unwrap();
        assert_eq!(url.query(), Some("q=ada+lovelace%26co"));
    }

    #[test]
    fn test_endpoint_display() {
        let ep = Endpoint::path("/export-profile").segment("a@b.io");
        assert_eq!(ep.to_string(), "/export-profile/a@b.io");
    }

    #[test]
    fn test_binary_response_does_not_decode_as_json() {
        let err = ApiResponse::Binary(vec![1, 2, 3])
            .decode::<Value>()
            .unwrap_err();
        assert!(matches!(err, ApiError::Payload(_)));
    }

    #[test]
    fn test_server_detail_extraction() {
        assert_eq!(
            server_detail(r#"{"detail": "Profile not found"}"#),
            Some("Profile not found".to_string())
        );
        assert_eq!(server_detail("<html>"), None);
    }

    #[test]
    fn test_bulk_upload_accepts_csv_and_txt() {
        let tmp = TempDir::new().unwrap();
        let csv = tmp.path().join("emails.CSV");
        fs::write(&csv, "a@b.io\n").unwrap();
        let upload = BulkUpload::from_path(&csv).unwrap();
        assert_eq!(upload.file_name, "emails.CSV");
        assert_eq!(upload.bytes, b"a@b.io\n");

        let xlsx = tmp.path().join("emails.xlsx");
        fs::write(&xlsx, "x").unwrap();
        assert!(BulkUpload::from_path(&xlsx).is_err());
    }

    #[test]
    fn test_client_rejects_bad_base_url() {
        let cfg = ApiConfig {
            base_url: "not a url".into(),
            timeout_secs: None,
        };
        assert!(ApiClient::new(&cfg).is_err());
    }
}
