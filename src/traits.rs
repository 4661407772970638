//! The seam between screen controllers and the remote API.
//!
//! Controllers are generic over [`IntelApi`] so they can be driven by the
//! real [`ApiClient`](crate::client::ApiClient) or by an in-memory fake.
//!
//! ```text
//! ┌──────────────┐    IntelApi    ┌────────────┐   HTTP   ┌────────────┐
//! │  Controllers │ ─────────────▶ │ ApiClient  │ ───────▶ │ remote API │
//! └──────────────┘                └────────────┘          └────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use email_intel::client::{AcademicQuery, BulkUpload};
//! use email_intel::error::ApiError;
//! use email_intel::models::*;
//! use email_intel::traits::IntelApi;
//! use serde_json::Value;
//!
//! struct Offline;
//!
//! fn offline() -> ApiError {
//!     ApiError::Transport { status: None, detail: "offline".into() }
//! }
//!
//! #[async_trait]
//! impl IntelApi for Offline {
//!     async fn search(&self, _: &str, _: bool) -> Result<SearchResult, ApiError> { Err(offline()) }
//!     async fn bulk_search(&self, _: BulkUpload) -> Result<BulkResult, ApiError> { Err(offline()) }
//!     async fn stats(&self) -> Result<StatsSnapshot, ApiError> { Err(offline()) }
//!     async fn profile(&self, _: &str) -> Result<StoredProfile, ApiError> { Err(offline()) }
//!     async fn create_digital_twin(&self, _: &str) -> Result<RemoteTwin, ApiError> { Err(offline()) }
//!     async fn digital_twin(&self, _: &str) -> Result<RemoteTwin, ApiError> { Err(offline()) }
//!     async fn academic_search(&self, _: &AcademicQuery) -> Result<Value, ApiError> { Err(offline()) }
//!     async fn insight(&self, _: InsightKind, _: &str) -> Result<Value, ApiError> { Err(offline()) }
//!     async fn pdf_analysis(&self, _: &str, _: bool) -> Result<PdfAnalysis, ApiError> { Err(offline()) }
//!     async fn export_profile(&self, _: &str, _: ExportFormat) -> Result<ExportPayload, ApiError> { Err(offline()) }
//!     async fn search_suggestions(&self, _: &str) -> Result<Vec<String>, ApiError> { Err(offline()) }
//! }
//! ```

use async_trait::async_trait;
use serde_json::Value;

use crate::client::{AcademicQuery, BulkUpload};
use crate::error::ApiError;
use crate::models::{
    BulkResult, ExportFormat, ExportPayload, InsightKind, PdfAnalysis, RemoteTwin, SearchResult,
    StatsSnapshot, StoredProfile,
};

/// The calls screen controllers make against the remote API.
#[async_trait]
pub trait IntelApi: Send + Sync {
    /// Look up a single address. `force_refresh` bypasses the server cache.
    async fn search(&self, email: &str, force_refresh: bool) -> Result<SearchResult, ApiError>;

    /// Upload a CSV/TXT file of addresses.
    async fn bulk_search(&self, upload: BulkUpload) -> Result<BulkResult, ApiError>;

    async fn stats(&self) -> Result<StatsSnapshot, ApiError>;

    /// Fetch a previously collected profile. Returns a 404 transport error
    /// when the address has never been searched.
    async fn profile(&self, email: &str) -> Result<StoredProfile, ApiError>;

    async fn create_digital_twin(&self, email: &str) -> Result<RemoteTwin, ApiError>;

    async fn digital_twin(&self, email: &str) -> Result<RemoteTwin, ApiError>;

    async fn academic_search(&self, query: &AcademicQuery) -> Result<Value, ApiError>;

    /// One of the per-email analytics endpoints.
    async fn insight(&self, kind: InsightKind, email: &str) -> Result<Value, ApiError>;

    async fn pdf_analysis(&self, email: &str, force_refresh: bool)
        -> Result<PdfAnalysis, ApiError>;

    async fn export_profile(
        &self,
        email: &str,
        format: ExportFormat,
    ) -> Result<ExportPayload, ApiError>;

    async fn search_suggestions(&self, query: &str) -> Result<Vec<String>, ApiError>;
}
