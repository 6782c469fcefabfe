//! Change detection and classification
//!
//! Structural comparators walk two versions of a canonical model and emit a
//! flat, ordered list of severity-tagged changes. The risk aggregator and the
//! changelog engine build on that list.

pub mod asyncapi_rules;
pub mod categories;
pub mod changelog;
pub mod endpoint_rules;
pub mod engine;
pub mod field_rules;
pub mod graphql_rules;
pub mod handlers;
pub mod proto_rules;
pub mod risk;
pub mod schema_rules;
pub mod types;

pub use categories::ChangeCategory;
pub use changelog::{Changelog, ChangelogSummary};
pub use engine::{ChangelogConfig, ChangelogEngine};
pub use risk::{RiskAssessment, RiskLevel, RiskWeights, SemverRecommendation, assess, assess_with};
pub use types::{BreakingChange, Change, ChangeType, Severity};
