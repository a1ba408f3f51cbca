//! Poll loop forwarding recent alert documents to the webhook.
//!
//! This module provides the [`Poller`] which ties the search backend to the
//! notifier. Each poll cycle:
//!
//! ```text
//! search(now - interval) → for each hit: compose card → send (or log in dry run)
//! ```
//!
//! Cycles run one after the other with a sleep of the polling interval in
//! between. There are no retries: the first error ends the loop and is handed
//! back to the caller, which is expected to exit.

use std::time::Duration;

use log::{debug, info};
use thiserror::Error;
use tokio::time;

use crate::{
    config::Config,
    elastic::{ElasticRequester, SearchError, Searcher},
    notifier::{AlertNotifier, DeliveryError, FieldMapping, TeamsWebhook, Webhook},
};

/// Errors ending a poll cycle.
#[derive(Debug, Error)]
pub enum PollError {
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Delivery of the alert with document id `id` failed.
    #[error("failed to deliver alert {id}: {source}")]
    Delivery {
        id: String,
        #[source]
        source: DeliveryError,
    },
}

/// Summary of one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Number of documents returned by the search.
    pub hits: usize,
    /// Number of documents delivered, or logged in dry run.
    pub delivered: usize,
}

/// Periodically forwards alert documents from a [`Searcher`] to a [`Webhook`].
pub struct Poller<S: Searcher, W: Webhook> {
    /// Source of the alert documents
    searcher: S,
    /// Card builder and delivery
    notifier: AlertNotifier<W>,
    /// Seconds between two cycles
    interval: u64,
}

impl Poller<ElasticRequester, TeamsWebhook> {
    /// Creates a poller querying Elasticsearch and posting to Teams.
    ///
    /// # Errors
    ///
    /// Returns an error if one of the HTTP clients cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, anyhow::Error> {
        let searcher = ElasticRequester::new(config)?;
        let webhook = TeamsWebhook::new(
            &config.notify_msteams_webhook,
            Duration::from_secs(config.http_timeout),
        )?;
        let notifier = AlertNotifier::new(
            webhook,
            FieldMapping::from_config(config),
            config.dryrun,
        );

        Ok(Poller::new(searcher, notifier, config.alert_interval))
    }
}

impl<S: Searcher, W: Webhook> Poller<S, W> {
    pub fn new(searcher: S, notifier: AlertNotifier<W>, interval: u64) -> Self {
        Poller {
            searcher,
            notifier,
            interval,
        }
    }

    /// Runs one poll cycle: one search, then one notification per hit.
    ///
    /// Hits are notified in search order. The first delivery failure aborts the
    /// cycle, the remaining hits are not attempted.
    pub async fn run_cycle(&self) -> Result<CycleReport, PollError> {
        let result = self.searcher.search().await?;
        debug!(
            "search answered {} in {}ms with {} of {} documents",
            result.status,
            result.took,
            result.hits.len(),
            result.total
        );
        let mut delivered = 0;

        for hit in &result.hits {
            info!(" → ID={}", hit.id);
            debug!("alert document {}", hit.source);

            self.notifier
                .notify(&hit.source)
                .await
                .map_err(|source| PollError::Delivery {
                    id: hit.id.to_owned(),
                    source,
                })?;
            delivered += 1;
        }

        let report = CycleReport {
            hits: result.hits.len(),
            delivered,
        };
        info!(
            "poll cycle done: {} hits, {} notified",
            report.hits, report.delivered
        );
        Ok(report)
    }

    /// Runs poll cycles forever, sleeping the interval after each one.
    ///
    /// Only returns on the first error.
    pub async fn run(&self) -> PollError {
        info!("polling alerts every {} seconds", self.interval);
        let interval = Duration::from_secs(self.interval);

        loop {
            if let Err(e) = self.run_cycle().await {
                return e;
            }
            time::sleep(interval).await;
        }
    }
}
