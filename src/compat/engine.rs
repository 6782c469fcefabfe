//! Changelog engine
//!
//! Runs the structural comparator for a protocol, drops the changes the
//! configuration filters out, and assembles the changelog.

use crate::canonical::{ApiDocument, ApiSpec, GraphqlSchema, ProtoFile};
use crate::compat::asyncapi_rules::compare_async_specs;
use crate::compat::categories::ChangeCategory;
use crate::compat::changelog::Changelog;
use crate::compat::endpoint_rules::compare_api_specs;
use crate::compat::graphql_rules::compare_graphql_schemas;
use crate::compat::proto_rules::compare_proto_files;
use crate::compat::risk::RiskWeights;
use crate::compat::types::Change;
use crate::error::{ApiSignError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Configuration for changelog generation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogConfig {
    /// Whether the CLI exits non-zero when breaking changes are found
    #[serde(default)]
    pub fail_on_breaking: bool,
    /// Category ids (e.g. `ENUM_VALUE`) whose changes are dropped
    #[serde(default)]
    pub except_categories: Vec<String>,
    /// Path prefixes whose changes are dropped
    #[serde(default)]
    pub ignore: Vec<String>,
    /// Risk score weights per severity
    #[serde(default)]
    pub weights: RiskWeights,
}

impl ChangelogConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from YAML string. A document without a
    /// `changelog` key yields the defaults.
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        #[derive(serde::Deserialize)]
        struct ConfigFile {
            changelog: Option<ChangelogConfig>,
        }

        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config_file: ConfigFile =
            serde_yaml::from_str(yaml).context("Failed to parse changelog configuration")?;
        Ok(config_file.changelog.unwrap_or_default())
    }

    /// Resolves `except_categories` to categories. Unknown ids are logged
    /// and skipped.
    pub fn excluded_categories(&self) -> Vec<ChangeCategory> {
        self.except_categories
            .iter()
            .filter_map(|id| match ChangeCategory::from_id(id) {
                Some(category) => Some(category),
                None => {
                    warn!(category = %id, "ignoring unknown change category in configuration");
                    None
                }
            })
            .collect()
    }
}

/// Main engine for changelog generation
#[derive(Debug, Clone, Default)]
pub struct ChangelogEngine {
    config: ChangelogConfig,
}

impl ChangelogEngine {
    pub fn new(config: ChangelogConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChangelogConfig {
        &self.config
    }

    /// Compares two endpoint views (REST or gRPC-as-endpoints).
    pub fn compare_rest(&self, old: Option<&ApiSpec>, new: Option<&ApiSpec>) -> Changelog {
        let (name, from, to) = identity(old.map(spec_identity), new.map(spec_identity));
        self.assemble(name, from, to, compare_api_specs(old, new))
    }

    /// Compares two AsyncAPI channel views.
    pub fn compare_async(&self, old: Option<&ApiSpec>, new: Option<&ApiSpec>) -> Changelog {
        let (name, from, to) = identity(old.map(spec_identity), new.map(spec_identity));
        self.assemble(name, from, to, compare_async_specs(old, new))
    }

    pub fn compare_graphql(
        &self,
        old: Option<&GraphqlSchema>,
        new: Option<&GraphqlSchema>,
    ) -> Changelog {
        let (name, from, to) = identity(old.map(schema_identity), new.map(schema_identity));
        self.assemble(name, from, to, compare_graphql_schemas(old, new))
    }

    pub fn compare_protobuf(&self, old: Option<&ProtoFile>, new: Option<&ProtoFile>) -> Changelog {
        let (name, from, to) = identity(old.map(file_identity), new.map(file_identity));
        self.assemble(name, from, to, compare_proto_files(old, new))
    }

    /// Compares two documents of any protocol. Both must be the same kind
    /// of document.
    pub fn compare_documents(&self, old: &ApiDocument, new: &ApiDocument) -> Result<Changelog> {
        match (old, new) {
            (ApiDocument::Rest(old), ApiDocument::Rest(new)) if old.protocol == new.protocol => {
                Ok(self.compare_rest(Some(old), Some(new)))
            }
            (ApiDocument::Async(old), ApiDocument::Async(new)) => {
                Ok(self.compare_async(Some(old), Some(new)))
            }
            (ApiDocument::Graphql(old), ApiDocument::Graphql(new)) => {
                Ok(self.compare_graphql(Some(old), Some(new)))
            }
            (ApiDocument::Protobuf(old), ApiDocument::Protobuf(new)) => {
                Ok(self.compare_protobuf(Some(old), Some(new)))
            }
            _ => Err(ApiSignError::ProtocolMismatch {
                old: old.protocol(),
                new: new.protocol(),
            }),
        }
    }

    /// Applies the configured filters and assembles the changelog.
    pub fn assemble(
        &self,
        api_name: &str,
        from_version: &str,
        to_version: &str,
        changes: Vec<Change>,
    ) -> Changelog {
        let detected = changes.len();
        let changes = self.filter(changes);
        if changes.len() < detected {
            debug!(
                dropped = detected - changes.len(),
                kept = changes.len(),
                "filtered changes by configuration"
            );
        }

        let changelog = Changelog::assemble(
            api_name,
            from_version,
            to_version,
            changes,
            &self.config.weights,
        );
        info!(
            api = %changelog.api_name,
            from = %changelog.from_version,
            to = %changelog.to_version,
            total = changelog.summary.total_changes,
            breaking = changelog.summary.breaking_changes,
            risk = %changelog.summary.risk_level,
            semver = %changelog.summary.semver_recommendation,
            "assembled changelog"
        );
        changelog
    }

    fn filter(&self, changes: Vec<Change>) -> Vec<Change> {
        let excluded = self.config.excluded_categories();
        changes
            .into_iter()
            .filter(|c| !excluded.contains(&c.category()))
            .filter(|c| {
                !self
                    .config
                    .ignore
                    .iter()
                    .any(|prefix| c.path().starts_with(prefix.as_str()))
            })
            .collect()
    }
}

fn spec_identity(spec: &ApiSpec) -> (&str, &str) {
    (&spec.name, &spec.version)
}

fn schema_identity(schema: &GraphqlSchema) -> (&str, &str) {
    (&schema.name, &schema.version)
}

fn file_identity(file: &ProtoFile) -> (&str, &str) {
    (file.label(), &file.version)
}

/// Name and versions for a changelog; the name comes from the newer side
/// when both exist.
fn identity<'a>(
    old: Option<(&'a str, &'a str)>,
    new: Option<(&'a str, &'a str)>,
) -> (&'a str, &'a str, &'a str) {
    let name = new.or(old).map(|(name, _)| name).unwrap_or_default();
    let from = old.map(|(_, version)| version).unwrap_or_default();
    let to = new.map(|(_, version)| version).unwrap_or_default();
    (name, from, to)
}
