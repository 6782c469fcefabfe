//! Library error type.

use crate::canonical::Protocol;

/// Errors surfaced by the library's fallible entry points.
///
/// The comparators themselves never fail; these cover caller misuse and the
/// boundary adapters that read documents from disk.
#[derive(Debug, thiserror::Error)]
pub enum ApiSignError {
    #[error("Cannot compare a {old} description with a {new} description")]
    ProtocolMismatch { old: Protocol, new: Protocol },

    #[error("Impact score {0} is out of range (expected 0-100)")]
    InvalidImpactScore(u32),

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ApiSignError>;
