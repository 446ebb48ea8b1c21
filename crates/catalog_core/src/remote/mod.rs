//! Remote catalog collaborator.
//!
//! # Responsibility
//! - Define the read-by-identifier contract against the catalog service.
//! - Classify remote failures into one observable `FetchFailure` type.
//!
//! # Invariants
//! - Implementations issue at most one request per `fetch_item` call.
//! - Transport retries, if any, live inside implementations.

use crate::model::item::ItemRecord;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod http;

pub use http::HttpCatalogClient;

static ITEM_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid item key regex"));

/// Failure to obtain a usable item record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// Identifier does not match the service addressing scheme.
    InvalidId(String),
    /// Service could not be reached (DNS, connect, timeout, TLS).
    Unreachable(String),
    /// Service answered but has no item under the identifier.
    NotFound(String),
    /// Service answered with an unexpected HTTP status.
    Status(u16),
    /// Response body could not be decoded into a valid record.
    Malformed(String),
}

impl FetchFailure {
    /// Stable machine-readable code for logs and FFI envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidId(_) => "invalid_id",
            Self::Unreachable(_) => "unreachable",
            Self::NotFound(_) => "not_found",
            Self::Status(_) => "unexpected_status",
            Self::Malformed(_) => "malformed_response",
        }
    }
}

impl Display for FetchFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(value) => write!(f, "invalid item identifier `{value}`"),
            Self::Unreachable(message) => write!(f, "catalog service unreachable: {message}"),
            Self::NotFound(id) => write!(f, "item not found: {id}"),
            Self::Status(status) => write!(f, "catalog service returned status {status}"),
            Self::Malformed(message) => write!(f, "malformed catalog response: {message}"),
        }
    }
}

impl Error for FetchFailure {}

/// Validates and normalizes an item identifier for addressing.
///
/// # Errors
/// - `InvalidId` when the trimmed value is empty or holds characters outside
///   `[A-Za-z0-9_-]`.
pub fn normalize_item_key(raw: &str) -> Result<String, FetchFailure> {
    let trimmed = raw.trim();
    if !ITEM_KEY_RE.is_match(trimmed) {
        return Err(FetchFailure::InvalidId(raw.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Read access to the remote catalog.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetches one item detail record by identifier.
    ///
    /// `item_key` has already passed `normalize_item_key`.
    async fn fetch_item(&self, item_key: &str) -> Result<ItemRecord, FetchFailure>;
}

#[cfg(test)]
mod tests {
    use super::{normalize_item_key, FetchFailure};

    #[test]
    fn normalize_item_key_trims_and_accepts_numeric_ids() {
        assert_eq!(normalize_item_key(" 42 ").unwrap(), "42");
        assert_eq!(normalize_item_key("tt-0042_b").unwrap(), "tt-0042_b");
    }

    #[test]
    fn normalize_item_key_rejects_empty_and_path_characters() {
        for raw in ["", "   ", "42/credits", "../etc", "4 2"] {
            let err = normalize_item_key(raw).unwrap_err();
            assert!(matches!(err, FetchFailure::InvalidId(_)), "{raw}");
        }
    }
}
