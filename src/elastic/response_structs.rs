//! Response structures for the Elasticsearch `_search` endpoint.
//!
//! This module contains structures for deserializing JSON responses from
//! the search backend, both successful and failed ones.

use serde::Deserialize;
use std::fmt;

use crate::elastic::document::AlertDocument;

/// Body of a successful `_search` response.
///
/// Only the fields used by the bridge are decoded:
/// ```text
/// { "took": 3, "hits": { "total": { "value": 1 }, "hits": [ { "_id": "...", "_source": { ... } } ] } }
/// ```
#[derive(Deserialize, Debug)]
pub struct SearchResponse {
    /// Time spent by the backend on the query, in milliseconds.
    pub took: u64,
    /// Matching documents.
    pub hits: Hits,
}

/// The `hits` object of a search response.
#[derive(Deserialize, Debug)]
pub struct Hits {
    pub total: TotalHits,
    pub hits: Vec<Hit>,
}

/// Total number of matching documents.
///
/// Elasticsearch 7+ returns `{ "value": N, "relation": "eq" }`, older versions
/// return a bare integer.
#[derive(Deserialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum TotalHits {
    Object { value: u64 },
    Legacy(u64),
}

impl TotalHits {
    pub fn value(&self) -> u64 {
        match self {
            TotalHits::Object { value } => *value,
            TotalHits::Legacy(value) => *value,
        }
    }
}

/// A single search hit.
#[derive(Deserialize, Debug, Clone)]
pub struct Hit {
    /// Document identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// The alert document itself.
    #[serde(rename = "_source", default)]
    pub source: AlertDocument,
}

impl fmt::Display for Hit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ID={}, {}", self.id, self.source)
    }
}

/// Body of a failed request: `{ "error": { "type": "...", "reason": "..." }, "status": 400 }`.
#[derive(Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error type and reason reported by the backend.
#[derive(Deserialize, Debug)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub reason: String,
}
