//! Screen controllers.
//!
//! One controller per dashboard screen. Each owns a [`Screen`] and turns a
//! user action into exactly one request through [`IntelApi`], folding any
//! client error into a screen-specific [`Failure`].
//!
//! | Controller | Screen state | Endpoint(s) |
//! |------------|--------------|-------------|
//! | [`SearchController`] | [`SearchResult`] | `POST /search` |
//! | [`BulkController`] | [`BulkResult`] | `POST /bulk_search` |
//! | [`StatsController`] | [`StatsSnapshot`] | `GET /stats` |
//! | [`DigitalTwinController`] | [`DigitalTwin`] / [`RemoteTwinView`] | `GET /profile/{email}`, `/digital-twin`, insights |
//! | [`PdfController`] | [`PdfAnalysis`] | `POST /pdf-analysis` |

use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::client::{AcademicQuery, BulkUpload};
use crate::error::Failure;
use crate::models::{
    BulkResult, InsightKind, PdfAnalysis, ResearchMetrics, SearchResult, StatsSnapshot,
};
use crate::screen::{Outcome, Screen};
use crate::traits::IntelApi;
use crate::twin::{derive_digital_twin, DigitalTwin};

pub const SEARCH_FAILED: &str = "Search failed. Check your connection to the server.";
pub const BULK_FAILED: &str = "Bulk search failed. Check your connection to the server.";
pub const STATS_FAILED: &str = "Failed to load statistics.";
pub const PDF_FAILED: &str = "PDF analysis failed. Check your connection to the server.";
pub const TWIN_FAILED: &str =
    "Failed to build the digital twin. Check your connection to the server.";

fn is_blank(input: &str) -> bool {
    input.trim().is_empty()
}

// ═══════════════════════════════════════════════════════════════════════
// Single search
// ═══════════════════════════════════════════════════════════════════════

pub struct SearchController<A> {
    api: Arc<A>,
    screen: Screen<SearchResult>,
}

impl<A: IntelApi> SearchController<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            screen: Screen::new("search"),
        }
    }

    pub fn screen(&self) -> &Screen<SearchResult> {
        &self.screen
    }

    /// Search one address. The response is stored as-is, including a
    /// server-reported `status: "error"` body.
    pub async fn submit(&self, email: &str, force_refresh: bool) -> Outcome<SearchResult> {
        self.submit_with(email, force_refresh, |_| {}).await
    }

    /// Like [`submit`](Self::submit), but calls `on_issued` with the trimmed
    /// address once the request is actually going out. Rejected and busy
    /// submissions never reach it.
    pub async fn submit_with(
        &self,
        email: &str,
        force_refresh: bool,
        on_issued: impl FnOnce(&str),
    ) -> Outcome<SearchResult> {
        if is_blank(email) {
            return Outcome::Rejected;
        }
        let Some(ticket) = self.screen.try_begin() else {
            return Outcome::Busy;
        };
        on_issued(email.trim());
        let result = self
            .api
            .search(email.trim(), force_refresh)
            .await
            .map_err(|e| Failure::from_api(&e, SEARCH_FAILED));
        self.screen.settle(ticket, result)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Bulk search
// ═══════════════════════════════════════════════════════════════════════

pub struct BulkController<A> {
    api: Arc<A>,
    screen: Screen<BulkResult>,
}

impl<A: IntelApi> BulkController<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            screen: Screen::new("bulk"),
        }
    }

    pub fn screen(&self) -> &Screen<BulkResult> {
        &self.screen
    }

    /// Upload the selected file. `None` means no file was selected.
    pub async fn submit(&self, upload: Option<BulkUpload>) -> Outcome<BulkResult> {
        let Some(upload) = upload else {
            return Outcome::Rejected;
        };
        let Some(ticket) = self.screen.try_begin() else {
            return Outcome::Busy;
        };
        tracing::info!(file = %upload.file_name, bytes = upload.bytes.len(), "bulk upload");
        let result = self
            .api
            .bulk_search(upload)
            .await
            .map_err(|e| Failure::from_api(&e, BULK_FAILED));
        self.screen.settle(ticket, result)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Statistics
// ═══════════════════════════════════════════════════════════════════════

pub struct StatsController<A> {
    api: Arc<A>,
    screen: Screen<StatsSnapshot>,
}

impl<A: IntelApi> StatsController<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            screen: Screen::new("stats"),
        }
    }

    pub fn screen(&self) -> &Screen<StatsSnapshot> {
        &self.screen
    }

    /// Re-fetch the snapshot, replacing the previous one wholesale.
    ///
    /// Refreshes are not refused while one is in flight (they are also
    /// triggered automatically after searches); the latest one wins.
    pub async fn refresh(&self) -> Outcome<StatsSnapshot> {
        let ticket = self.screen.begin();
        let result = self
            .api
            .stats()
            .await
            .map_err(|e| Failure::from_api(&e, STATS_FAILED));
        self.screen.settle(ticket, result)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Digital twin
// ═══════════════════════════════════════════════════════════════════════

/// Progress of the server-side creation workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CreationStage {
    Idle,
    AcademicSearch,
    CreatingTwin,
    Completed,
}

impl CreationStage {
    /// Rough completion percentage shown while the workflow runs.
    pub fn progress(&self) -> u8 {
        match self {
            CreationStage::Idle => 0,
            CreationStage::AcademicSearch => 30,
            CreationStage::CreatingTwin => 70,
            CreationStage::Completed => 100,
        }
    }
}

/// A server-side twin plus whatever supporting analytics could be loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct RemoteTwinView {
    pub twin: Value,
    pub metrics: Option<ResearchMetrics>,
    pub visualization: Option<Value>,
    pub academic_profile: Option<Value>,
    pub network_analysis: Option<Value>,
    pub research_metrics: Option<Value>,
    pub timeline: Option<Value>,
}

impl RemoteTwinView {
    /// Split a freshly created twin into its embedded sections.
    fn from_created(twin: Value) -> Self {
        let section = |key: &str| twin.get(key).filter(|v| !v.is_null()).cloned();
        Self {
            metrics: ResearchMetrics::from_twin(&twin),
            visualization: section("visualization_data"),
            academic_profile: section("academic_profile"),
            network_analysis: section("network_analysis"),
            research_metrics: None,
            timeline: None,
            twin,
        }
    }
}

pub struct DigitalTwinController<A> {
    api: Arc<A>,
    derived: Screen<DigitalTwin>,
    remote: Screen<RemoteTwinView>,
    stage: Mutex<CreationStage>,
}

impl<A: IntelApi> DigitalTwinController<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            derived: Screen::new("digital-twin"),
            remote: Screen::new("digital-twin-remote"),
            stage: Mutex::new(CreationStage::Idle),
        }
    }

    pub fn derived(&self) -> &Screen<DigitalTwin> {
        &self.derived
    }

    pub fn remote(&self) -> &Screen<RemoteTwinView> {
        &self.remote
    }

    pub fn stage(&self) -> CreationStage {
        *self.stage.lock()
    }

    fn set_stage(&self, stage: CreationStage) {
        tracing::debug!(?stage, "digital twin stage");
        *self.stage.lock() = stage;
    }

    /// Fetch the stored profile and derive a twin from it client-side.
    ///
    /// A 404 on the profile fetch settles with a remediation message; this
    /// method never asks the server to create anything.
    pub async fn derive(&self, email: &str) -> Outcome<DigitalTwin> {
        if is_blank(email) {
            return Outcome::Rejected;
        }
        let email = email.trim();
        let Some(ticket) = self.derived.try_begin() else {
            return Outcome::Busy;
        };
        let result = match self.api.profile(email).await {
            Ok(stored) => Ok(derive_digital_twin(&stored, Utc::now())),
            Err(e) if e.is_not_found() => Err(Failure::not_found_for_derivation(email)),
            Err(e) => Err(Failure::from_api(&e, TWIN_FAILED)),
        };
        self.derived.settle(ticket, result)
    }

    /// Run the server-side workflow: academic search, then twin creation.
    pub async fn create(&self, email: &str) -> Outcome<RemoteTwinView> {
        if is_blank(email) {
            return Outcome::Rejected;
        }
        let email = email.trim();
        let Some(ticket) = self.remote.try_begin() else {
            return Outcome::Busy;
        };

        self.set_stage(CreationStage::AcademicSearch);
        let result = match self.api.academic_search(&AcademicQuery::for_email(email)).await {
            Ok(_) => {
                self.set_stage(CreationStage::CreatingTwin);
                self.api.create_digital_twin(email).await
            }
            Err(e) => Err(e),
        };

        let result = match result {
            Ok(created) => {
                self.set_stage(CreationStage::Completed);
                Ok(RemoteTwinView::from_created(created.data))
            }
            Err(e) => {
                self.set_stage(CreationStage::Idle);
                Err(Failure::from_api(
                    &e,
                    format!("Digital twin creation failed: {}", e),
                ))
            }
        };
        self.remote.settle(ticket, result)
    }

    /// Load an existing server-side twin and its supporting analytics.
    ///
    /// The supporting calls run concurrently; each one that fails is simply
    /// left empty.
    pub async fn load(&self, email: &str) -> Outcome<RemoteTwinView> {
        if is_blank(email) {
            return Outcome::Rejected;
        }
        let email = email.trim();
        let Some(ticket) = self.remote.try_begin() else {
            return Outcome::Busy;
        };

        let twin = match self.api.digital_twin(email).await {
            Ok(twin) => twin,
            Err(e) => {
                tracing::info!(email, error = %e, "no existing digital twin");
                self.set_stage(CreationStage::Idle);
                let message = if e.is_not_found() {
                    format!("No digital twin exists for {} yet. Create one first.", email)
                } else {
                    TWIN_FAILED.to_string()
                };
                return self.remote.settle(ticket, Err(Failure::from_api(&e, message)));
            }
        };
        self.set_stage(CreationStage::Completed);

        let api = &self.api;
        let (visualization, academic, network, metrics, timeline) = tokio::join!(
            api.insight(InsightKind::Visualization, email),
            api.insight(InsightKind::AcademicProfile, email),
            api.insight(InsightKind::NetworkAnalysis, email),
            api.insight(InsightKind::ResearchMetrics, email),
            api.insight(InsightKind::ResearchTimeline, email),
        );

        let view = RemoteTwinView {
            metrics: ResearchMetrics::from_twin(&twin.data),
            twin: twin.data,
            visualization: visualization.ok(),
            academic_profile: academic.ok(),
            network_analysis: network.ok(),
            research_metrics: metrics.ok(),
            timeline: timeline.ok(),
        };
        self.remote.settle(ticket, Ok(view))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PDF analysis
// ═══════════════════════════════════════════════════════════════════════

pub struct PdfController<A> {
    api: Arc<A>,
    screen: Screen<PdfAnalysis>,
}

impl<A: IntelApi> PdfController<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            screen: Screen::new("pdf"),
        }
    }

    pub fn screen(&self) -> &Screen<PdfAnalysis> {
        &self.screen
    }

    pub async fn submit(&self, email: &str, force_refresh: bool) -> Outcome<PdfAnalysis> {
        if is_blank(email) {
            return Outcome::Rejected;
        }
        let Some(ticket) = self.screen.try_begin() else {
            return Outcome::Busy;
        };
        let result = self
            .api
            .pdf_analysis(email.trim(), force_refresh)
            .await
            .map_err(|e| Failure::from_api(&e, PDF_FAILED));
        self.screen.settle(ticket, result)
    }
}
