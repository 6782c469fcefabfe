//! Risk aggregation: turns a change list into a score, a level and a
//! semantic-versioning recommendation.

use crate::compat::types::{Change, ChangeType, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Points each change contributes to the overall score, by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskWeights {
    pub breaking: u32,
    pub dangerous: u32,
    pub warning: u32,
    pub info: u32,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            breaking: 25,
            dangerous: 10,
            warning: 4,
            info: 1,
        }
    }
}

impl RiskWeights {
    pub fn weight(&self, severity: Severity) -> u32 {
        match severity {
            Severity::Breaking => self.breaking,
            Severity::Dangerous => self.dangerous,
            Severity::Warning => self.warning,
            Severity::Info => self.info,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// 0-39 LOW, 40-59 MEDIUM, 60-84 HIGH, 85 and above CRITICAL.
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=39 => RiskLevel::Low,
            40..=59 => RiskLevel::Medium,
            60..=84 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Minimum version bump a release carrying the changes needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SemverRecommendation {
    Major,
    Minor,
    Patch,
}

impl SemverRecommendation {
    pub fn id(&self) -> &'static str {
        match self {
            SemverRecommendation::Major => "MAJOR",
            SemverRecommendation::Minor => "MINOR",
            SemverRecommendation::Patch => "PATCH",
        }
    }
}

impl std::fmt::Display for SemverRecommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub overall_score: u8,
    pub level: RiskLevel,
    pub breaking_changes_count: usize,
    pub total_changes_count: usize,
    /// Always carries all four severities, zero counts included.
    pub changes_by_severity: BTreeMap<Severity, usize>,
    pub recommendation: String,
    pub semver_recommendation: SemverRecommendation,
}

impl RiskAssessment {
    pub fn count(&self, severity: Severity) -> usize {
        self.changes_by_severity.get(&severity).copied().unwrap_or(0)
    }
}

/// Assesses `changes` with the default weights.
pub fn assess(changes: &[Change]) -> RiskAssessment {
    assess_with(changes, &RiskWeights::default())
}

/// Assesses `changes`. Total and deterministic; a breaking change forces
/// MAJOR whatever the weights are.
pub fn assess_with(changes: &[Change], weights: &RiskWeights) -> RiskAssessment {
    let mut changes_by_severity: BTreeMap<Severity, usize> =
        Severity::all().into_iter().map(|s| (s, 0)).collect();
    for change in changes {
        *changes_by_severity.entry(change.severity()).or_insert(0) += 1;
    }

    let raw: u64 = changes_by_severity
        .iter()
        .map(|(severity, count)| u64::from(weights.weight(*severity)) * *count as u64)
        .sum();
    let overall_score = raw.min(100) as u8;

    let breaking_changes_count = changes_by_severity[&Severity::Breaking];
    let semver_recommendation = if breaking_changes_count > 0 {
        SemverRecommendation::Major
    } else if changes.iter().any(|c| {
        matches!(
            c.change_type(),
            ChangeType::Added | ChangeType::Modified | ChangeType::Deprecated
        )
    }) {
        SemverRecommendation::Minor
    } else {
        SemverRecommendation::Patch
    };

    RiskAssessment {
        overall_score,
        level: RiskLevel::from_score(overall_score),
        breaking_changes_count,
        total_changes_count: changes.len(),
        recommendation: recommendation(&changes_by_severity),
        changes_by_severity,
        semver_recommendation,
    }
}

fn recommendation(counts: &BTreeMap<Severity, usize>) -> String {
    // BTreeMap iterates worst severity first.
    let worst = counts.iter().find(|(_, count)| **count > 0);
    match worst {
        Some((Severity::Breaking, n)) => format!(
            "{n} breaking change(s) detected. \
             Release as a new major version and publish migration notes."
        ),
        Some((Severity::Dangerous, n)) => format!(
            "{n} potentially breaking change(s) detected. \
             Review how clients use the affected elements before release."
        ),
        Some((Severity::Warning, n)) => format!(
            "{n} change(s) need attention, such as deprecations. Announce them to consumers."
        ),
        Some((Severity::Info, n)) => format!("{n} additive change(s) only. Safe to release."),
        None => "No changes detected.".to_string(),
    }
}
