//! Terminal rendering of screen results.
//!
//! Every function returns a `String` so the CLI can print it and tests can
//! inspect it. JSON output is produced directly from the models with
//! `serde_json` and does not go through this module.

use chrono::{DateTime, Duration, Utc};
use std::fmt::Write as _;

use crate::controller::{CreationStage, RemoteTwinView};
use crate::metrics::{BulkRates, EngineSummary};
use crate::models::{
    parse_timestamp, BulkResult, DataSource, PdfAnalysis, ResponseStatus, SearchResult,
    StatsSnapshot,
};
use crate::twin::DigitalTwin;

pub fn format_search(result: &SearchResult) -> String {
    let mut out = String::new();
    if result.status == ResponseStatus::Error {
        let _ = writeln!(
            out,
            "Error: {}",
            result.message.as_deref().unwrap_or("search failed")
        );
        return out;
    }
    let Some(profile) = &result.data else {
        let _ = writeln!(out, "No profile data returned.");
        return out;
    };

    let origin = match result.source {
        DataSource::Cache => "cached",
        DataSource::Fresh => "fresh",
        DataSource::Unknown => "unknown source",
    };
    let _ = writeln!(out, "Profile: {} ({})", profile.email, origin);
    let _ = writeln!(out, "{}", "=".repeat(40));

    if let Some(info) = &profile.person_info {
        let fields = [
            ("Name", &info.name),
            ("Location", &info.location),
            ("Occupation", &info.occupation),
            ("Company", &info.company),
        ];
        for (label, value) in fields {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                let _ = writeln!(out, "  {:<12} {}", format!("{}:", label), v);
            }
        }
    }
    if let Some(score) = profile.confidence_score {
        let _ = writeln!(out, "  {:<12} {}%", "Confidence:", (score * 100.0).round());
    }

    if !profile.social_profiles.is_empty() {
        let _ = writeln!(out, "\n  Social profiles:");
        for social in &profile.social_profiles {
            let handle = social.username.as_deref().unwrap_or(social.url.as_str());
            let _ = writeln!(out, "    {:<12} {}", social.platform, handle);
        }
    }
    if !profile.phone_numbers.is_empty() {
        let _ = writeln!(out, "\n  Phone numbers: {}", profile.phone_numbers.join(", "));
    }
    if !profile.websites.is_empty() {
        let _ = writeln!(out, "\n  Websites:");
        for site in &profile.websites {
            let _ = writeln!(out, "    {}", site);
        }
    }
    if !profile.search_results.is_empty() {
        let _ = writeln!(
            out,
            "\n  Search results: {} found",
            profile.search_results.len()
        );
        for hit in profile.search_results.iter().take(5) {
            let title = hit.title.as_deref().unwrap_or("(untitled)");
            let _ = writeln!(out, "    - {}", title);
            if let Some(url) = &hit.url {
                let _ = writeln!(out, "      {}", url);
            }
        }
    }
    if !profile.sources.is_empty() {
        let _ = writeln!(out, "\n  Sources: {}", profile.sources.join(", "));
    }
    out
}

pub fn format_bulk(result: &BulkResult) -> String {
    let mut out = String::new();
    if result.status == ResponseStatus::Error {
        let _ = writeln!(
            out,
            "Error: {}",
            result.message.as_deref().unwrap_or("bulk search failed")
        );
        return out;
    }
    let rates = BulkRates::of(result);
    let _ = writeln!(out, "Bulk search");
    let _ = writeln!(out, "===========");
    let _ = writeln!(out, "  Total:      {}", result.total);
    let _ = writeln!(out, "  Processed:  {} ({}%)", result.processed, rates.success);
    let _ = writeln!(out, "  From cache: {} ({}%)", result.existing, rates.cache);
    let _ = writeln!(out, "  New:        {} ({}%)", result.new, rates.new);
    let _ = writeln!(out, "  Invalid:    {} ({}%)", result.invalid, rates.invalid);

    if !result.details.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "  {:<36} {:<10} {:>7}", "EMAIL", "STATUS", "SOURCES");
        let _ = writeln!(out, "  {}", "-".repeat(55));
        for d in &result.details {
            let sources = d
                .sources_found
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(out, "  {:<36} {:<10} {:>7}", d.email, d.status, sources);
        }
    }
    out
}

pub fn format_stats(stats: &StatsSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Email Intelligence Collector Stats");
    let _ = writeln!(out, "==================================");
    let _ = writeln!(out);
    let _ = writeln!(out, "  Profiles:        {}", stats.total_profiles);
    let _ = writeln!(out, "  Searches:        {}", stats.total_searches);
    let _ = writeln!(out, "  Engine results:  {}", stats.search_engine_results);
    let _ = writeln!(out, "  Recent searches: {}", stats.recent_searches.len());

    if !stats.recent_searches.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "  {:<32} {:<8} {:>7}   {}", "EMAIL", "TYPE", "FOUND", "WHEN");
        let _ = writeln!(out, "  {}", "-".repeat(66));
        for s in &stats.recent_searches {
            let when = s
                .created_at
                .as_deref()
                .map(format_iso_relative)
                .unwrap_or_else(|| "unknown".to_string());
            let _ = writeln!(
                out,
                "  {:<32} {:<8} {:>7}   {}",
                s.email, s.search_type, s.results_found, when
            );
        }
    }

    if let Some(summary) = EngineSummary::of(stats) {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "  Engines: {} active, {} results over {} uses, {:.0}% avg success",
            summary.active_engines,
            summary.total_results,
            summary.total_usage,
            summary.avg_success_pct
        );
        let _ = writeln!(
            out,
            "  {:<16} {:>8} {:>6} {:>9} {:>8} {:>9}",
            "ENGINE", "RESULTS", "USES", "SUCCESS", "SHARE", "PER USE"
        );
        let _ = writeln!(out, "  {}", "-".repeat(61));
        for row in &summary.ranked {
            let per_use = row
                .results_per_use
                .map(|v| format!("{:.1}", v))
                .unwrap_or_else(|| "N/A".to_string());
            let _ = writeln!(
                out,
                "  {:<16} {:>8} {:>6} {:>8.1}% {:>7.1}% {:>9}",
                row.engine,
                row.total_results,
                row.usage_count,
                row.success_pct,
                row.usage_share_pct,
                per_use
            );
        }
    }
    out
}

pub fn format_twin(twin: &DigitalTwin) -> String {
    let mut out = String::new();
    let a = &twin.analysis;
    let _ = writeln!(out, "Digital twin: {}", twin.email);
    let _ = writeln!(out, "{}", "=".repeat(40));
    let _ = writeln!(
        out,
        "  Completeness: {:.0}%",
        a.completeness_score * 100.0
    );
    let _ = writeln!(
        out,
        "  Confidence:   {} ({:.0}%)",
        a.confidence_level.as_str(),
        twin.summary.confidence_score * 100.0
    );
    let _ = writeln!(out, "  Sources:      {}", twin.summary.total_sources);
    let _ = writeln!(
        out,
        "  Social:       {} accounts, {} websites",
        twin.social_presence.total_social_accounts,
        twin.social_presence.websites.len()
    );
    let _ = writeln!(
        out,
        "  Footprint:    {} web mentions across {} engines",
        twin.digital_footprint.web_mentions, twin.digital_footprint.search_engines_coverage
    );
    if let Some(updated) = twin.timeline.last_updated.as_deref() {
        let _ = writeln!(out, "  Updated:      {}", format_iso_relative(updated));
    }

    let f = &a.factors;
    let _ = writeln!(out, "\n  Factors:");
    for (label, present) in [
        ("name", f.name),
        ("location", f.location),
        ("social profiles", f.social_profiles),
        ("phone numbers", f.phone_numbers),
        ("websites", f.websites),
        ("search results", f.search_results),
    ] {
        let _ = writeln!(out, "    [{}] {}", if present { "x" } else { " " }, label);
    }

    if !a.recommendations.is_empty() {
        let _ = writeln!(out, "\n  Recommendations:");
        for r in &a.recommendations {
            let _ = writeln!(out, "    - {}", r);
        }
    }
    out
}

pub fn format_remote_twin(email: &str, view: &RemoteTwinView, stage: CreationStage) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Digital twin (server): {}", email);
    let _ = writeln!(out, "  Stage: {:?} ({}%)", stage, stage.progress());
    for key in ["name", "affiliation"] {
        if let Some(v) = view.twin.get(key).and_then(|v| v.as_str()) {
            let _ = writeln!(out, "  {:<12} {}", format!("{}:", key), v);
        }
    }
    if let Some(m) = &view.metrics {
        let _ = writeln!(
            out,
            "  Publications: {}  Citations: {}  h-index: {}  Collaboration: {:.2}",
            m.total_publications, m.total_citations, m.h_index, m.collaboration_score
        );
    }
    let sections = [
        ("visualization", view.visualization.is_some()),
        ("academic profile", view.academic_profile.is_some()),
        ("network analysis", view.network_analysis.is_some()),
        ("research metrics", view.research_metrics.is_some()),
        ("timeline", view.timeline.is_some()),
    ];
    let loaded: Vec<&str> = sections
        .iter()
        .filter(|(_, present)| *present)
        .map(|(name, _)| *name)
        .collect();
    if !loaded.is_empty() {
        let _ = writeln!(out, "  Loaded: {}", loaded.join(", "));
    }
    out
}

pub fn format_pdf(analysis: &PdfAnalysis) -> String {
    let mut out = String::new();
    if analysis.status == ResponseStatus::Error {
        let _ = writeln!(
            out,
            "Error: {}",
            analysis.message.as_deref().unwrap_or("PDF analysis failed")
        );
        return out;
    }
    let s = &analysis.data.pdf_summary;
    let _ = writeln!(out, "PDF analysis");
    let _ = writeln!(out, "============");
    let _ = writeln!(out, "  Documents:          {}", s.total_documents);
    let _ = writeln!(out, "  Mentioning email:   {}", s.documents_with_email);
    let _ = writeln!(out, "  Average confidence: {:.0}%", s.average_confidence * 100.0);
    let _ = writeln!(out, "  Authors:            {}", s.total_authors);
    let _ = writeln!(out, "  Institutions:       {}", s.total_institutions);
    if !s.unique_sources.is_empty() {
        let _ = writeln!(out, "  Sources:            {}", s.unique_sources.join(", "));
    }
    for doc in &analysis.data.pdf_documents {
        let title = doc.title.as_deref().unwrap_or("(untitled)");
        let marker = if doc.email_found { "*" } else { " " };
        let _ = writeln!(out, "  {} {}", marker, title);
    }
    out
}

/// Render a server timestamp relative to now (e.g. "3 hours ago").
pub fn format_iso_relative(ts: &str) -> String {
    format_relative(ts, Utc::now())
}

/// Render `ts` relative to `now`. Anything older than 30 days or in the
/// future falls back to `YYYY-MM-DD HH:MM`; unparseable input is returned
/// unchanged.
pub fn format_relative(ts: &str, now: DateTime<Utc>) -> String {
    let Some(at) = parse_timestamp(ts) else {
        return ts.to_string();
    };
    let age = now.signed_duration_since(at);
    let (count, unit) = match age {
        a if a < Duration::zero() || a >= Duration::days(30) => {
            return at.format("%Y-%m-%d %H:%M").to_string();
        }
        a if a < Duration::minutes(1) => return "just now".to_string(),
        a if a < Duration::hours(1) => (a.num_minutes(), "min"),
        a if a < Duration::days(1) => (a.num_hours(), "hour"),
        a => (a.num_days(), "day"),
    };
    let plural = if count == 1 { "" } else { "s" };
    format!("{} {}{} ago", count, unit, plural)
}
