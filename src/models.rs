//! Response shapes returned by the Email Intelligence Collector API.
//!
//! The server is trusted loosely: every field is optional or defaulted here,
//! once, so that screens and renderers never need to guard against a missing
//! key. Unknown fields on a [`Profile`] are preserved verbatim.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Parse a server timestamp. The server emits ISO-8601 with or without an
/// offset; naive values are taken as UTC.
pub fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f").map(|n| n.and_utc()))
        .ok()
}

/// Outcome tag carried by most responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    #[default]
    Success,
    Error,
    #[serde(other)]
    Unknown,
}

/// Where a profile came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Cache,
    #[default]
    Fresh,
    #[serde(other)]
    Unknown,
}

/// Response of `POST /search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SearchResult {
    pub status: ResponseStatus,
    pub source: DataSource,
    pub data: Option<Profile>,
    pub message: Option<String>,
}

/// Everything collected about one address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Profile {
    pub email: String,
    pub person_info: Option<PersonInfo>,
    pub social_profiles: Vec<SocialProfile>,
    pub websites: Vec<String>,
    pub phone_numbers: Vec<String>,
    pub addresses: Vec<String>,
    pub sources: Vec<String>,
    pub confidence_score: Option<f64>,
    pub search_results: Vec<SearchHit>,
    pub search_statistics: Option<SearchStatistics>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Profile {
    pub fn name(&self) -> Option<&str> {
        self.person_info
            .as_ref()
            .and_then(|p| p.name.as_deref())
            .filter(|s| !s.is_empty())
    }

    pub fn location(&self) -> Option<&str> {
        self.person_info
            .as_ref()
            .and_then(|p| p.location.as_deref())
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PersonInfo {
    pub name: Option<String>,
    pub location: Option<String>,
    pub occupation: Option<String>,
    pub company: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SocialProfile {
    pub platform: String,
    pub url: String,
    pub username: Option<String>,
    pub followers: Option<u64>,
    pub verified: Option<bool>,
}

/// One search-engine hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SearchHit {
    pub title: Option<String>,
    pub url: Option<String>,
    pub snippet: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SearchStatistics {
    pub search_engines_used: Vec<String>,
    pub processing_time: f64,
    pub total_results: u64,
}

/// A profile as stored server-side (`GET /profile/{email}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StoredProfile {
    pub email: String,
    pub data: Profile,
    pub source_count: u64,
    pub confidence_score: Option<f64>,
    pub is_verified: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub(crate) struct ProfileEnvelope {
    pub status: ResponseStatus,
    pub data: StoredProfile,
}

/// Response of `POST /bulk_search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BulkResult {
    pub status: ResponseStatus,
    pub message: Option<String>,
    pub total: u64,
    pub processed: u64,
    pub existing: u64,
    pub new: u64,
    pub invalid: u64,
    #[serde(alias = "results")]
    pub details: Vec<BulkDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BulkDetail {
    pub email: String,
    pub status: String,
    pub sources_found: Option<u64>,
}

/// Response of `GET /stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StatsSnapshot {
    pub total_profiles: u64,
    pub total_searches: u64,
    pub search_engine_results: u64,
    pub recent_searches: Vec<SearchHistoryEntry>,
    pub search_engine_stats: Option<BTreeMap<String, EngineStats>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SearchHistoryEntry {
    pub email: String,
    pub search_type: String,
    pub results_found: u64,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineStats {
    pub name: Option<String>,
    pub total_results: u64,
    pub usage_count: u64,
    pub success_rate: f64,
    pub avg_response_time: f64,
    pub is_active: bool,
    pub last_used: Option<String>,
    pub rate_limit: Option<u64>,
}

impl Default for EngineStats {
    fn default() -> Self {
        Self {
            name: None,
            total_results: 0,
            usage_count: 0,
            success_rate: 0.0,
            avg_response_time: 0.0,
            is_active: true,
            last_used: None,
            rate_limit: None,
        }
    }
}

/// Response of `POST /pdf-analysis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PdfAnalysis {
    pub status: ResponseStatus,
    pub source: DataSource,
    pub data: PdfAnalysisData,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PdfAnalysisData {
    pub pdf_documents: Vec<PdfDocument>,
    pub pdf_summary: PdfSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PdfDocument {
    pub title: Option<String>,
    pub url: Option<String>,
    pub source: Option<String>,
    pub email_found: bool,
    pub confidence_score: f64,
    pub authors: Vec<String>,
    pub institutions: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PdfSummary {
    pub total_documents: u64,
    pub documents_with_email: u64,
    pub unique_sources: Vec<String>,
    pub average_confidence: f64,
    pub total_authors: u64,
    pub total_institutions: u64,
}

/// Server-side digital twin (`/digital-twin` endpoints). Pass-through JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RemoteTwin {
    pub data: Value,
}

/// Headline research numbers shown next to a server-side twin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ResearchMetrics {
    pub total_publications: u64,
    pub total_citations: u64,
    pub h_index: u64,
    pub collaboration_score: f64,
}

impl ResearchMetrics {
    /// Pull metrics out of a twin's `impact_metrics` block, if it has one.
    pub fn from_twin(twin: &Value) -> Option<Self> {
        let impact = twin.get("impact_metrics")?;
        let citation = impact.get("citation_impact");
        let count = |key: &str| {
            citation
                .and_then(|c| c.get(key))
                .and_then(Value::as_f64)
                .map(|v| v.max(0.0) as u64)
                .unwrap_or(0)
        };
        Some(Self {
            total_publications: count("publication_count"),
            total_citations: count("estimated_citations"),
            h_index: count("h_index_estimate"),
            collaboration_score: impact
                .get("overall_impact_score")
                .and_then(Value::as_f64)
                .unwrap_or(0.0),
        })
    }
}

/// Response of `GET /search-suggestions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Suggestions {
    pub suggestions: Vec<String>,
}

/// Export formats accepted by `GET /export-profile/{email}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Pdf,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn accept_header(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    /// Download name used when no output path is given.
    pub fn default_file_name(&self, email: &str) -> String {
        format!("profile_{}.{}", email, self.as_str())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(format!("unknown export format '{}': expected json or pdf", other)),
        }
    }
}

/// Body of an export response.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportPayload {
    Json(Value),
    Pdf(Vec<u8>),
}

/// Per-email analytics endpoints (`GET /{kind}/{email}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum InsightKind {
    Visualization,
    AcademicProfile,
    NetworkAnalysis,
    CollaborationGraph,
    ResearchMetrics,
    CitationAnalysis,
    ResearchTimeline,
    ActivityTimeline,
    TrendingTopics,
    ResearchPredictions,
    RealtimeMetrics,
    DigitalTwinAggregate,
}

impl InsightKind {
    pub fn path(&self) -> &'static str {
        match self {
            InsightKind::Visualization => "visualization",
            InsightKind::AcademicProfile => "academic-profile",
            InsightKind::NetworkAnalysis => "network-analysis",
            InsightKind::CollaborationGraph => "collaboration-graph",
            InsightKind::ResearchMetrics => "research-metrics",
            InsightKind::CitationAnalysis => "citation-analysis",
            InsightKind::ResearchTimeline => "research-timeline",
            InsightKind::ActivityTimeline => "activity-timeline",
            InsightKind::TrendingTopics => "trending-topics",
            InsightKind::ResearchPredictions => "research-predictions",
            InsightKind::RealtimeMetrics => "realtime-metrics",
            InsightKind::DigitalTwinAggregate => "digital-twin-aggregate",
        }
    }
}
