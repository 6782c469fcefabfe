//! The changelog: the change list plus everything derived from it.

use crate::compat::risk::{
    RiskAssessment, RiskLevel, RiskWeights, SemverRecommendation, assess_with,
};
use crate::compat::types::{BreakingChange, Change};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

/// Headline numbers of a changelog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogSummary {
    pub total_changes: usize,
    pub breaking_changes: usize,
    pub risk_level: RiskLevel,
    pub semver_recommendation: SemverRecommendation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Changelog {
    pub id: String,
    pub api_name: String,
    pub from_version: String,
    pub to_version: String,
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
    pub summary: ChangelogSummary,
    pub changes: Vec<Change>,
    pub breaking_changes: Vec<BreakingChange>,
    pub risk_assessment: RiskAssessment,
}

impl Changelog {
    /// Assembles a changelog from an already filtered change list.
    pub fn assemble(
        api_name: impl Into<String>,
        from_version: impl Into<String>,
        to_version: impl Into<String>,
        changes: Vec<Change>,
        weights: &RiskWeights,
    ) -> Self {
        let api_name = api_name.into();
        let from_version = from_version.into();
        let to_version = to_version.into();

        let risk_assessment = assess_with(&changes, weights);
        let breaking_changes: Vec<BreakingChange> = changes
            .iter()
            .filter(|c| c.is_breaking())
            .cloned()
            .map(BreakingChange::from_change)
            .collect();
        let summary = ChangelogSummary {
            total_changes: risk_assessment.total_changes_count,
            breaking_changes: risk_assessment.breaking_changes_count,
            risk_level: risk_assessment.level,
            semver_recommendation: risk_assessment.semver_recommendation,
        };

        Self {
            id: changelog_id(&api_name, &from_version, &to_version, &changes),
            api_name,
            from_version,
            to_version,
            generated_at: OffsetDateTime::now_utc(),
            summary,
            changes,
            breaking_changes,
            risk_assessment,
        }
    }

    pub fn has_breaking_changes(&self) -> bool {
        !self.breaking_changes.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

fn changelog_id(
    api_name: &str,
    from_version: &str,
    to_version: &str,
    changes: &[Change],
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_name.as_bytes());
    hasher.update(b"|");
    hasher.update(from_version.as_bytes());
    hasher.update(b"|");
    hasher.update(to_version.as_bytes());
    for change in changes {
        hasher.update(b"|");
        hasher.update(change.id().as_bytes());
    }
    format!("{:x}", hasher.finalize())
}
