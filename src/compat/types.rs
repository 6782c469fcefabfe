//! Core types for change detection

use crate::compat::categories::ChangeCategory;
use crate::error::{ApiSignError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

/// Severity of a change. Lower ordinal means worse: sorting a change list
/// ascending puts breaking changes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Existing clients or payloads will fail against the new contract
    Breaking,
    /// Likely to break some clients depending on how they use the API
    Dangerous,
    /// Compatible, but worth a look (deprecations, format tweaks)
    Warning,
    /// Purely additive
    Info,
}

impl Severity {
    pub fn id(&self) -> &'static str {
        match self {
            Severity::Breaking => "BREAKING",
            Severity::Dangerous => "DANGEROUS",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
        }
    }

    /// All severities from worst to mildest
    pub fn all() -> [Severity; 4] {
        [
            Severity::Breaking,
            Severity::Dangerous,
            Severity::Warning,
            Severity::Info,
        ]
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|sev| sev.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown severity: {s}"))
    }
}

/// What happened to an element between the two versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    Added,
    Removed,
    Modified,
    Deprecated,
}

impl ChangeType {
    pub fn id(&self) -> &'static str {
        match self {
            ChangeType::Added => "ADDED",
            ChangeType::Removed => "REMOVED",
            ChangeType::Modified => "MODIFIED",
            ChangeType::Deprecated => "DEPRECATED",
        }
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// A single detected change between two versions of an API description.
///
/// Severity and category are mandatory constructor arguments, so a change
/// cannot exist without a classification. Fields are read through accessors;
/// the id is a content hash and must stay consistent with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    id: String,
    #[serde(rename = "type")]
    change_type: ChangeType,
    category: ChangeCategory,
    severity: Severity,
    path: String,
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    old_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    new_value: Option<Value>,
    #[serde(with = "time::serde::rfc3339")]
    detected_at: OffsetDateTime,
}

impl Change {
    pub fn new(
        change_type: ChangeType,
        category: ChangeCategory,
        severity: Severity,
        path: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let path = path.into();
        let description = description.into();
        let id = change_id(change_type, category, severity, &path, &description);
        Self {
            id,
            change_type,
            category,
            severity,
            path,
            description,
            old_value: None,
            new_value: None,
            detected_at: OffsetDateTime::now_utc(),
        }
    }

    /// Attaches the before/after values of the changed element.
    pub fn with_values(mut self, old: Option<Value>, new: Option<Value>) -> Self {
        self.old_value = old;
        self.new_value = new;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn change_type(&self) -> ChangeType {
        self.change_type
    }

    pub fn category(&self) -> ChangeCategory {
        self.category
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn old_value(&self) -> Option<&Value> {
        self.old_value.as_ref()
    }

    pub fn new_value(&self) -> Option<&Value> {
        self.new_value.as_ref()
    }

    pub fn detected_at(&self) -> OffsetDateTime {
        self.detected_at
    }

    pub fn is_breaking(&self) -> bool {
        self.severity == Severity::Breaking
    }
}

/// Deterministic id: the first 16 hex chars of a SHA-256 over the change's
/// classifying fields.
fn change_id(
    change_type: ChangeType,
    category: ChangeCategory,
    severity: Severity,
    path: &str,
    description: &str,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(change_type.id().as_bytes());
    hasher.update(b"|");
    hasher.update(category.id().as_bytes());
    hasher.update(b"|");
    hasher.update(severity.id().as_bytes());
    hasher.update(b"|");
    hasher.update(path.as_bytes());
    hasher.update(b"|");
    hasher.update(description.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}

/// A change surfaced prominently, with an impact estimate and migration hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakingChange {
    #[serde(flatten)]
    change: Change,
    impact_score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    migration_suggestion: Option<String>,
}

impl BreakingChange {
    /// Wraps a change with an explicit impact score in `0..=100`.
    pub fn new(
        change: Change,
        impact_score: u32,
        migration_suggestion: Option<String>,
    ) -> Result<Self> {
        let impact_score = u8::try_from(impact_score)
            .ok()
            .filter(|s| *s <= 100)
            .ok_or(ApiSignError::InvalidImpactScore(impact_score))?;
        Ok(Self {
            change,
            impact_score,
            migration_suggestion,
        })
    }

    /// Wraps a change, deriving impact and migration hint from its category.
    pub fn from_change(change: Change) -> Self {
        let impact_score = impact_score(&change);
        let migration_suggestion = migration_suggestion(&change);
        Self {
            change,
            impact_score,
            migration_suggestion,
        }
    }

    pub fn change(&self) -> &Change {
        &self.change
    }

    pub fn impact_score(&self) -> u8 {
        self.impact_score
    }

    pub fn migration_suggestion(&self) -> Option<&str> {
        self.migration_suggestion.as_deref()
    }
}

/// Wire- and path-level breaks hurt every client; parameter-level ones only
/// the callers that touch them.
fn impact_score(change: &Change) -> u8 {
    let base: u8 = match change.category() {
        ChangeCategory::Package | ChangeCategory::Service | ChangeCategory::FieldNumber => 100,
        ChangeCategory::Endpoint | ChangeCategory::RpcMethod | ChangeCategory::StreamingType => 90,
        ChangeCategory::Message | ChangeCategory::Type | ChangeCategory::Schema => 80,
        ChangeCategory::Field | ChangeCategory::RequestBody | ChangeCategory::Response => 70,
        ChangeCategory::Parameter => 60,
        ChangeCategory::EnumValue | ChangeCategory::UnionMember | ChangeCategory::Interface => 50,
    };
    match change.severity() {
        Severity::Breaking => base,
        Severity::Dangerous => base / 2,
        Severity::Warning => base / 4,
        Severity::Info => 0,
    }
}

fn migration_suggestion(change: &Change) -> Option<String> {
    let path = change.path();
    let hint = match (change.change_type(), change.category()) {
        (ChangeType::Removed, ChangeCategory::Endpoint) => {
            format!("Restore {path} or deprecate it for one release before removing it.")
        }
        (ChangeType::Removed, ChangeCategory::Service | ChangeCategory::RpcMethod) => {
            format!("Keep {path} serving and mark it deprecated until clients have migrated.")
        }
        (ChangeType::Removed, ChangeCategory::Field | ChangeCategory::Message) => {
            format!(
                "Mark {path} deprecated instead of deleting it; \
                 reserve its name and number when it goes."
            )
        }
        (ChangeType::Removed, ChangeCategory::EnumValue) => {
            format!(
                "Keep {path} and reject it at runtime rather than removing it from the contract."
            )
        }
        (ChangeType::Added, ChangeCategory::Parameter | ChangeCategory::RequestBody) => {
            format!("Make {path} optional or give it a default so existing calls stay valid.")
        }
        (_, ChangeCategory::FieldNumber) => {
            format!("Revert the number of {path}; add a new field instead of renumbering.")
        }
        (_, ChangeCategory::StreamingType) => {
            format!("Expose the new streaming mode of {path} as a separate RPC.")
        }
        (_, ChangeCategory::Package) => {
            "Keep the old package alive next to the new one while clients move over.".to_string()
        }
        (ChangeType::Modified, _) => {
            format!("Introduce the new shape of {path} under a new name and deprecate the old one.")
        }
        _ => return None,
    };
    Some(hint)
}
