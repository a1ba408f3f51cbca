//! Elasticsearch integration: querying recent alert documents.
//!
//! # Modules
//!
//! - `document` - Dynamically shaped alert documents
//! - `requester` - HTTP client issuing the time range search
//! - `response_structs` - Data structures for `_search` responses
//!
//! # Examples
//!
//! ```no_run
//! let requester = ElasticRequester::new(&Config::default())?;
//! let result = requester.search().await?;
//! println!("{} hits", result.total);
//! ```

mod document;
mod requester;
mod response_structs;

pub use crate::elastic::document::AlertDocument;
#[cfg(test)]
pub use crate::elastic::requester::MockSearcher;
pub use crate::elastic::requester::{ElasticRequester, Searcher};
pub use crate::elastic::response_structs::Hit;

use thiserror::Error;

/// Outcome of one search request.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// HTTP status code returned by the backend.
    pub status: u16,
    /// Total number of matching documents reported by the backend.
    pub total: u64,
    /// Backend processing time in milliseconds.
    pub took: u64,
    /// Matching documents, in backend order.
    pub hits: Vec<Hit>,
}

/// Errors that can occur while querying the search backend.
///
/// All of them are fatal for the bridge.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The request could not be sent or the response could not be read.
    #[error("error getting response: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("[{status}] {kind}: {reason}")]
    Backend {
        status: u16,
        kind: String,
        reason: String,
    },

    /// The response body is not the expected JSON.
    #[error("error parsing the response body: {0}")]
    Decode(#[from] serde_json::Error),
}
