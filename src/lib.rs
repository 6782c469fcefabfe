pub mod canonical;
pub mod compat;
pub mod compatibility;
pub mod error;
pub mod normalize;
pub mod spec;

pub use canonical::ApiDocument;
pub use compat::{
    Change, ChangeCategory, ChangeType, Changelog, ChangelogConfig, ChangelogEngine, Severity,
};
pub use error::ApiSignError;
pub use spec::{Compatibility, Spec};

use anyhow::Context;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Generates a semantic fingerprint for a canonical API description.
///
/// The fingerprint is a SHA-256 hash of the document's canonical JSON form.
/// Object keys are sorted and every list is ordered by content, so the
/// fingerprint is insensitive to the declaration order of endpoints,
/// fields, enum values and the like.
///
/// # Arguments
///
/// * `document` - The canonical model to fingerprint.
///
/// # Returns
///
/// A `Result` containing the hex-encoded SHA-256 fingerprint string,
/// or an error if serialization fails.
pub fn generate_fingerprint(document: &ApiDocument) -> anyhow::Result<String> {
    let mut canonical =
        serde_json::to_value(document).context("Failed to convert document to JSON")?;
    canonicalize(&mut canonical);

    let json_string = serde_json::to_string(&canonical)
        .context("Failed to serialize canonical representation to JSON")?;

    let mut hasher = Sha256::new();
    hasher.update(json_string.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Generates the fingerprint of a `.proto` source file.
pub fn generate_proto_fingerprint(proto_content: &str) -> anyhow::Result<String> {
    let file = normalize::parse_proto(proto_content)?;
    generate_fingerprint(&ApiDocument::Protobuf(file))
}

fn canonicalize(value: &mut Value) {
    match value {
        Value::Array(items) => {
            items.iter_mut().for_each(canonicalize);
            items.sort_by_cached_key(|item| item.to_string());
        }
        Value::Object(map) => map.values_mut().for_each(canonicalize),
        _ => {}
    }
}
