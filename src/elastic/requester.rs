//! HTTP client for the Elasticsearch `_search` API.
//!
//! This module provides the [`ElasticRequester`] struct which issues the time
//! range query of a poll cycle and decodes the returned hits.

use std::time::Duration;

use log::{debug, error, info};
use mockall::automock;
use reqwest::Client;
use serde_json::{Value, json};

use crate::config::Config;
use crate::elastic::response_structs::{ErrorResponse, SearchResponse};
use crate::elastic::{SearchError, SearchResult};

/// Builds the range query selecting documents newer than `now - interval`.
///
/// ```text
/// {"query":{"range":{"@timestamp":{"gte":"now-300s"}}}}
/// ```
pub fn range_query(timestamp_field: &str, interval: u64) -> Value {
    json!({
        "query": {
            "range": {
                (timestamp_field): {
                    "gte": format!("now-{}s", interval)
                }
            }
        }
    })
}

/// HTTP client querying one index of the search backend.
pub struct ElasticRequester {
    /// Base URL of the backend, without trailing slash
    host: String,
    /// Queried index
    index: String,
    /// Basic auth user name
    username: String,
    /// Basic auth password
    password: String,
    /// Field used for the range filter
    timestamp_field: String,
    /// Size of the query window in seconds
    interval: u64,
    /// HTTP client
    client: Client,
}

/// Trait for querying the search backend.
///
/// This trait abstracts the HTTP operations for easier testing with mocks.
#[automock]
pub trait Searcher {
    /// Fetches the alert documents of the current window.
    async fn search(&self) -> Result<SearchResult, SearchError>;
}

impl ElasticRequester {
    /// Create a new [ElasticRequester] from the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, SearchError> {
        let client = Client::builder()
            .danger_accept_invalid_certs(config.elastic_insecure_skip_verify)
            .timeout(Duration::from_secs(config.http_timeout))
            .build()?;

        Ok(ElasticRequester {
            host: config.elastic_host.to_owned(),
            index: config.elastic_index.to_owned(),
            username: config.elastic_username.to_owned(),
            password: config.elastic_password.to_owned(),
            timestamp_field: config.elastic_timestamp_field.to_owned(),
            interval: config.alert_interval,
            client,
        })
    }
}

impl Searcher for ElasticRequester {
    /// Request `/{index}/_search` with the range query of the current window.
    ///
    /// A non-success status is returned as [`SearchError::Backend`], with the
    /// type and reason of an `{"error": {"type", "reason"}}` body, or kind
    /// `unknown` and the raw body as reason for any other body.
    async fn search(&self) -> Result<SearchResult, SearchError> {
        let url = format!("{}/{}/_search", &self.host, &self.index);
        let query = range_query(&self.timestamp_field, self.interval);
        info!(
            "query elasticsearch on {} index each {} seconds",
            &self.index, self.interval
        );
        debug!("request {} -> {}", &url, &query);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Proxies in front of the backend may answer with HTML or plain text
            let (kind, reason) = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(error_response) => (error_response.error.kind, error_response.error.reason),
                Err(_) => ("unknown".to_owned(), body),
            };
            error!("[{}] {}: {}", status, kind, reason);
            return Err(SearchError::Backend {
                status: status.as_u16(),
                kind,
                reason,
            });
        }

        let search_response: SearchResponse = serde_json::from_str(&body)?;
        let total = search_response.hits.total.value();
        info!(
            "[{}] {} hits; took: {}ms",
            status, total, search_response.took
        );

        for hit in &search_response.hits.hits {
            debug!(" → {}", hit);
        }

        Ok(SearchResult {
            status: status.as_u16(),
            total,
            took: search_response.took,
            hits: search_response.hits.hits,
        })
    }
}
