//! Percentages and summaries derived from bulk and statistics responses.

use serde::Serialize;

use crate::models::{BulkResult, EngineStats, StatsSnapshot};

/// Whole-number percentages of a bulk run, relative to `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BulkRates {
    pub success: u64,
    pub cache: u64,
    pub new: u64,
    pub invalid: u64,
}

/// `part / total` as a percentage rounded half away from zero; 0 when
/// `total` is 0.
pub fn percent(part: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u64
}

impl BulkRates {
    pub fn of(result: &BulkResult) -> Self {
        Self {
            success: percent(result.processed, result.total),
            cache: percent(result.existing, result.total),
            new: percent(result.new, result.total),
            invalid: percent(result.invalid, result.total),
        }
    }
}

/// One engine's row in the engine summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineRow {
    pub engine: String,
    pub total_results: u64,
    pub usage_count: u64,
    /// Success rate as a percentage (0 to 100).
    pub success_pct: f64,
    /// Share of all engine invocations, as a percentage.
    pub usage_share_pct: f64,
    /// `None` when the engine was never used.
    pub results_per_use: Option<f64>,
    pub avg_response_time: f64,
    pub is_active: bool,
    pub rate_limit: Option<u64>,
}

/// Aggregate view over `search_engine_stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineSummary {
    pub total_results: u64,
    pub total_usage: u64,
    pub active_engines: usize,
    /// Mean success rate across engines, as a percentage.
    pub avg_success_pct: f64,
    /// Engines ordered by success rate, best first.
    pub ranked: Vec<EngineRow>,
}

impl EngineSummary {
    /// Summarize a snapshot's engine stats, or `None` if it has none.
    pub fn of(stats: &StatsSnapshot) -> Option<Self> {
        let engines = stats.search_engine_stats.as_ref()?;
        if engines.is_empty() {
            return None;
        }

        let total_results: u64 = engines.values().map(|e| e.total_results).sum();
        let total_usage: u64 = engines.values().map(|e| e.usage_count).sum();
        let avg_success =
            engines.values().map(|e| e.success_rate).sum::<f64>() / engines.len() as f64;

        let mut ranked: Vec<EngineRow> = engines
            .iter()
            .map(|(name, e)| engine_row(name, e, total_usage))
            .collect();
        ranked.sort_by(|a, b| {
            b.success_pct
                .partial_cmp(&a.success_pct)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.engine.cmp(&b.engine))
        });

        Some(Self {
            total_results,
            total_usage,
            active_engines: engines.values().filter(|e| e.is_active).count(),
            avg_success_pct: avg_success * 100.0,
            ranked,
        })
    }
}

fn engine_row(key: &str, stats: &EngineStats, total_usage: u64) -> EngineRow {
    let usage_share_pct = if total_usage > 0 {
        stats.usage_count as f64 / total_usage as f64 * 100.0
    } else {
        0.0
    };
    let results_per_use = if stats.usage_count > 0 {
        Some(stats.total_results as f64 / stats.usage_count as f64)
    } else {
        None
    };
    EngineRow {
        engine: stats.name.clone().unwrap_or_else(|| key.to_string()),
        total_results: stats.total_results,
        usage_count: stats.usage_count,
        success_pct: stats.success_rate * 100.0,
        usage_share_pct,
        results_per_use,
        avg_response_time: stats.avg_response_time,
        is_active: stats.is_active,
        rate_limit: stats.rate_limit,
    }
}
