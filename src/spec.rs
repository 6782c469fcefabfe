//! Provides the high-level Spec API for comparing API descriptions.

use crate::canonical::ApiDocument;
use crate::compat::{Changelog, ChangelogEngine};
use crate::error::ApiSignError;
use crate::generate_fingerprint;
use crate::normalize::parse_proto;
use anyhow::Context;
use std::path::Path;

/// The result of a compatibility comparison between two API descriptions.
#[derive(Debug, PartialEq, Eq)]
pub enum Compatibility {
    /// No structural change between the two descriptions.
    Green,
    /// The new description is backward-compatible with the old one (e.g., an endpoint was added).
    Yellow,
    /// The new description breaks existing clients, or the two cannot be compared.
    Red,
}

impl Compatibility {
    /// Classifies an already assembled changelog: no changes is Green, any
    /// breaking change is Red, anything else is Yellow.
    pub fn of(changelog: &Changelog) -> Self {
        if changelog.is_empty() {
            Compatibility::Green
        } else if changelog.has_breaking_changes() {
            Compatibility::Red
        } else {
            Compatibility::Yellow
        }
    }
}

/// A single API description, holding its canonical model and fingerprint.
#[derive(Debug, Clone)]
pub struct Spec {
    /// The canonical model.
    pub document: ApiDocument,
    /// The exact semantic fingerprint.
    pub fingerprint: String,
}

impl Spec {
    /// Wraps an already built canonical model.
    pub fn from_document(document: ApiDocument) -> anyhow::Result<Self> {
        let fingerprint = generate_fingerprint(&document)?;
        Ok(Spec {
            document,
            fingerprint,
        })
    }

    /// Reads a canonical model serialized as JSON.
    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let document: ApiDocument =
            serde_json::from_str(content).map_err(|e| ApiSignError::Parse {
                what: "canonical JSON model".to_string(),
                message: e.to_string(),
            })?;
        Self::from_document(document)
    }

    /// Reads a canonical model serialized as YAML.
    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let document: ApiDocument =
            serde_yaml::from_str(content).map_err(|e| ApiSignError::Parse {
                what: "canonical YAML model".to_string(),
                message: e.to_string(),
            })?;
        Self::from_document(document)
    }

    /// Parses a `.proto` source file.
    pub fn from_proto(content: &str) -> anyhow::Result<Self> {
        Self::from_document(ApiDocument::Protobuf(parse_proto(content)?))
    }

    /// Loads a description from disk, picking the reader by file extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(ApiSignError::from)
            .with_context(|| format!("Failed to read file '{}'", path.display()))?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let spec = match extension.as_str() {
            "proto" => {
                let mut file = parse_proto(&content)
                    .with_context(|| format!("Failed to parse '{}'", path.display()))?;
                if file.name.is_empty() {
                    file.name = path
                        .file_stem()
                        .map(|stem| stem.to_string_lossy().into_owned())
                        .unwrap_or_default();
                }
                Self::from_document(ApiDocument::Protobuf(file))?
            }
            "json" => Self::from_json(&content)
                .with_context(|| format!("Failed to load '{}'", path.display()))?,
            "yaml" | "yml" => Self::from_yaml(&content)
                .with_context(|| format!("Failed to load '{}'", path.display()))?,
            _ => return Err(ApiSignError::UnsupportedFormat(path.display().to_string()).into()),
        };
        Ok(spec)
    }

    /// Produces the changelog from this `Spec` (the "old" version) to
    /// `new_spec`. Identical fingerprints short-circuit to an empty change
    /// list.
    pub fn changelog(
        &self,
        new_spec: &Spec,
        engine: &ChangelogEngine,
    ) -> Result<Changelog, ApiSignError> {
        if self.fingerprint == new_spec.fingerprint {
            return Ok(engine.assemble(
                new_spec.document.name(),
                self.document.version(),
                new_spec.document.version(),
                Vec::new(),
            ));
        }
        engine.compare_documents(&self.document, &new_spec.document)
    }

    /// Compares this `Spec` (the "old" version) with another `Spec` (the "new" version)
    /// to determine their compatibility level.
    pub fn compare_with(&self, new_spec: &Spec) -> Compatibility {
        // If the exact fingerprints are identical, the descriptions are semantically identical.
        if self.fingerprint == new_spec.fingerprint {
            return Compatibility::Green;
        }

        match ChangelogEngine::default().compare_documents(&self.document, &new_spec.document) {
            Ok(changelog) => Compatibility::of(&changelog),
            Err(_) => Compatibility::Red,
        }
    }
}
