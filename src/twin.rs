//! Client-side digital twin derivation.
//!
//! [`derive_digital_twin`] turns a stored profile into a summary of how
//! complete and trustworthy it is. It is a pure function: no I/O, no
//! caching, and the same input and `now` always yield the same output.
//!
//! # Completeness rubric
//!
//! Six equally weighted factors; the score is `present / 6`.
//!
//! | Factor | Present when |
//! |--------|--------------|
//! | name | `person_info.name` is non-empty |
//! | location | `person_info.location` is non-empty |
//! | social | `social_profiles` is non-empty |
//! | phones | `phone_numbers` is non-empty |
//! | websites | `websites` is non-empty |
//! | search | `search_results` is non-empty |
//!
//! # Confidence label
//!
//! `high` above 0.7, `medium` above 0.4, `low` otherwise.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{
    parse_timestamp, PersonInfo, Profile, SearchStatistics, SocialProfile, StoredProfile,
};

const SEARCH_ENGINES: [&str; 4] = ["google", "bing", "yandex", "duckduckgo"];
const SOCIAL_PLATFORMS: [&str; 4] = ["facebook", "linkedin", "twitter", "instagram"];

pub const RECOMMEND_NAME: &str = "Name not found: run an additional search";
pub const RECOMMEND_SOCIAL: &str = "No social profiles found: widen the social network search";
pub const RECOMMEND_VERIFY: &str = "Low confidence: the collected data needs verification";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_score(score: f64) -> Self {
        if score > 0.7 {
            ConfidenceLevel::High
        } else if score > 0.4 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
        }
    }
}

/// Presence of each rubric factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompletenessFactors {
    pub name: bool,
    pub location: bool,
    pub social_profiles: bool,
    pub phone_numbers: bool,
    pub websites: bool,
    pub search_results: bool,
}

impl CompletenessFactors {
    pub fn of(profile: &Profile) -> Self {
        Self {
            name: profile.name().is_some(),
            location: profile.location().is_some(),
            social_profiles: !profile.social_profiles.is_empty(),
            phone_numbers: !profile.phone_numbers.is_empty(),
            websites: !profile.websites.is_empty(),
            search_results: !profile.search_results.is_empty(),
        }
    }

    fn as_array(&self) -> [bool; 6] {
        [
            self.name,
            self.location,
            self.social_profiles,
            self.phone_numbers,
            self.websites,
            self.search_results,
        ]
    }

    pub fn score(&self) -> f64 {
        let factors = self.as_array();
        let present = factors.iter().filter(|f| **f).count();
        present as f64 / factors.len() as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DigitalTwin {
    pub email: String,
    pub summary: TwinSummary,
    pub personal_information: PersonInfo,
    pub social_presence: SocialPresence,
    pub contact_information: ContactInformation,
    pub digital_footprint: DigitalFootprint,
    /// The profile's `academic_profile` block, passed through untouched.
    pub academic_profile: Option<Value>,
    pub data_sources: DataSources,
    pub timeline: TwinTimeline,
    pub analysis: TwinAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TwinSummary {
    pub total_sources: u64,
    pub confidence_score: f64,
    pub last_updated: Option<String>,
    pub is_verified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SocialPresence {
    pub social_profiles: Vec<SocialProfile>,
    pub websites: Vec<String>,
    pub total_social_accounts: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactInformation {
    pub phone_numbers: Vec<String>,
    pub addresses: Vec<String>,
    pub verified_contacts: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DigitalFootprint {
    /// Number of distinct engines that returned at least one hit.
    pub search_engines_coverage: usize,
    pub web_mentions: usize,
    pub search_statistics: Option<SearchStatistics>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TwinTimeline {
    pub first_seen: Option<String>,
    pub last_updated: Option<String>,
    /// Whole days since `last_updated`; `None` when it is missing or
    /// unparseable.
    pub data_age_days: Option<i64>,
}

impl TwinTimeline {
    fn of(stored: &StoredProfile, now: DateTime<Utc>) -> Self {
        let data_age_days = stored
            .updated_at
            .as_deref()
            .and_then(parse_timestamp)
            .map(|updated| now.signed_duration_since(updated).num_seconds().div_euclid(86_400));
        Self {
            first_seen: stored.created_at.clone(),
            last_updated: stored.updated_at.clone(),
            data_age_days,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSources {
    pub sources: Vec<String>,
    /// Counts keyed by `search_engine`, `social_platform`, or `other`.
    pub source_breakdown: BTreeMap<String, usize>,
    pub reliability_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TwinAnalysis {
    pub completeness_score: f64,
    pub factors: CompletenessFactors,
    pub confidence_level: ConfidenceLevel,
    pub recommendations: Vec<String>,
}

/// Classify a source label by substring.
pub fn source_type(source: &str) -> &'static str {
    let lower = source.to_lowercase();
    if SEARCH_ENGINES.iter().any(|e| lower.contains(e)) {
        "search_engine"
    } else if SOCIAL_PLATFORMS.iter().any(|p| lower.contains(p)) {
        "social_platform"
    } else {
        "other"
    }
}

/// Build a [`DigitalTwin`] from a stored profile as of `now`.
pub fn derive_digital_twin(stored: &StoredProfile, now: DateTime<Utc>) -> DigitalTwin {
    let profile = &stored.data;
    let confidence = stored
        .confidence_score
        .or(profile.confidence_score)
        .unwrap_or(0.0);

    let email = if stored.email.is_empty() {
        profile.email.clone()
    } else {
        stored.email.clone()
    };

    let factors = CompletenessFactors::of(profile);

    let mut recommendations = Vec::new();
    if !factors.name {
        recommendations.push(RECOMMEND_NAME.to_string());
    }
    if !factors.social_profiles {
        recommendations.push(RECOMMEND_SOCIAL.to_string());
    }
    if confidence < 0.5 {
        recommendations.push(RECOMMEND_VERIFY.to_string());
    }

    let mut source_breakdown = BTreeMap::new();
    for source in &profile.sources {
        *source_breakdown
            .entry(source_type(source).to_string())
            .or_insert(0) += 1;
    }

    let engines: BTreeSet<&str> = profile
        .search_results
        .iter()
        .filter_map(|hit| hit.source.as_deref())
        .filter(|s| !s.is_empty())
        .collect();

    DigitalTwin {
        email,
        summary: TwinSummary {
            total_sources: stored.source_count,
            confidence_score: confidence,
            last_updated: stored.updated_at.clone(),
            is_verified: stored.is_verified,
        },
        personal_information: profile.person_info.clone().unwrap_or_default(),
        social_presence: SocialPresence {
            social_profiles: profile.social_profiles.clone(),
            websites: profile.websites.clone(),
            total_social_accounts: profile.social_profiles.len(),
        },
        contact_information: ContactInformation {
            phone_numbers: profile.phone_numbers.clone(),
            addresses: profile.addresses.clone(),
            verified_contacts: profile
                .phone_numbers
                .iter()
                .filter(|p| !p.is_empty())
                .count(),
        },
        digital_footprint: DigitalFootprint {
            search_engines_coverage: engines.len(),
            web_mentions: profile.search_results.len(),
            search_statistics: profile.search_statistics.clone(),
        },
        academic_profile: profile.extra.get("academic_profile").cloned(),
        data_sources: DataSources {
            sources: profile.sources.clone(),
            source_breakdown,
            reliability_score: confidence,
        },
        timeline: TwinTimeline::of(stored, now),
        analysis: TwinAnalysis {
            completeness_score: factors.score(),
            factors,
            confidence_level: ConfidenceLevel::from_score(confidence),
            recommendations,
        },
    }
}
