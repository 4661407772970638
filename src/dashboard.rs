//! The dashboard: one controller per screen plus the cross-screen wiring.
//!
//! Side effects that span screens live here rather than in the controllers:
//!
//! - a successful single or bulk search re-fetches statistics;
//! - every issued single search records the address in the recall list;
//! - suggestions fall back to the recall list when the server has nothing.

use serde_json::Value;
use std::sync::Arc;

use crate::client::{AcademicQuery, BulkUpload};
use crate::controller::{
    BulkController, DigitalTwinController, PdfController, SearchController, StatsController,
};
use crate::error::Failure;
use crate::models::{
    BulkResult, ExportFormat, ExportPayload, InsightKind, PdfAnalysis, SearchResult,
    StatsSnapshot,
};
use crate::recall::{wants_remote_suggestions, RecallStore};
use crate::screen::Outcome;
use crate::traits::IntelApi;
use crate::twin::DigitalTwin;

pub const EXPORT_FAILED: &str = "Export failed. Check your connection to the server.";
pub const ACADEMIC_FAILED: &str = "Academic search failed. Check your connection to the server.";
pub const INSIGHT_FAILED: &str = "Failed to load analytics. Check your connection to the server.";

pub struct Dashboard<A> {
    api: Arc<A>,
    recall: RecallStore,
    pub search: SearchController<A>,
    pub bulk: BulkController<A>,
    pub stats: StatsController<A>,
    pub twin: DigitalTwinController<A>,
    pub pdf: PdfController<A>,
}

impl<A: IntelApi> Dashboard<A> {
    pub fn new(api: Arc<A>, recall: RecallStore) -> Self {
        Self {
            search: SearchController::new(api.clone()),
            bulk: BulkController::new(api.clone()),
            stats: StatsController::new(api.clone()),
            twin: DigitalTwinController::new(api.clone()),
            pdf: PdfController::new(api.clone()),
            recall,
            api,
        }
    }

    pub fn recall(&self) -> &RecallStore {
        &self.recall
    }

    /// Single search. The address goes into the recall list as soon as the
    /// request is issued, whatever the outcome; statistics are refreshed
    /// only on success.
    pub async fn search(&self, email: &str, force_refresh: bool) -> Outcome<SearchResult> {
        let outcome = self
            .search
            .submit_with(email, force_refresh, |issued| {
                if let Err(e) = self.recall.record(issued) {
                    tracing::warn!(error = %e, "failed to update recall list");
                }
            })
            .await;
        if outcome.is_success() {
            self.stats.refresh().await;
        }
        outcome
    }

    /// Bulk search, then refresh statistics.
    pub async fn bulk_search(&self, upload: Option<BulkUpload>) -> Outcome<BulkResult> {
        let outcome = self.bulk.submit(upload).await;
        if outcome.is_success() {
            self.stats.refresh().await;
        }
        outcome
    }

    pub async fn refresh_stats(&self) -> Outcome<StatsSnapshot> {
        self.stats.refresh().await
    }

    pub async fn derive_twin(&self, email: &str) -> Outcome<DigitalTwin> {
        self.twin.derive(email).await
    }

    pub async fn pdf_analysis(&self, email: &str, force_refresh: bool) -> Outcome<PdfAnalysis> {
        self.pdf.submit(email, force_refresh).await
    }

    /// Suggestions for the current input.
    ///
    /// Short input, a failed call, or an empty answer all yield the recall
    /// list instead.
    pub async fn suggestions(&self, input: &str) -> Vec<String> {
        if !wants_remote_suggestions(input) {
            return self.recall.list();
        }
        match self.api.search_suggestions(input).await {
            Ok(suggestions) if !suggestions.is_empty() => suggestions,
            Ok(_) => self.recall.list(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch suggestions");
                self.recall.list()
            }
        }
    }

    pub async fn export(&self, email: &str, format: ExportFormat) -> Result<ExportPayload, Failure> {
        self.api
            .export_profile(email.trim(), format)
            .await
            .map_err(|e| Failure::from_api(&e, EXPORT_FAILED))
    }

    pub async fn academic_search(&self, query: &AcademicQuery) -> Result<Value, Failure> {
        self.api
            .academic_search(query)
            .await
            .map_err(|e| Failure::from_api(&e, ACADEMIC_FAILED))
    }

    pub async fn insight(&self, kind: InsightKind, email: &str) -> Result<Value, Failure> {
        self.api
            .insight(kind, email.trim())
            .await
            .map_err(|e| Failure::from_api(&e, INSIGHT_FAILED))
    }
}
