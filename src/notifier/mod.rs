//! Notification of alerts to Microsoft Teams.
//!
//! # Modules
//!
//! - `alert_notifier` - Maps alert documents to message cards and delivers them
//! - `message_card` - The Teams MessageCard payload
//! - `severity` - Icon and color derived from the event type
//! - `webhook` - HTTP client for Teams incoming webhooks

mod alert_notifier;
mod message_card;
mod severity;
mod webhook;

pub use crate::notifier::alert_notifier::{AlertNotifier, FieldMapping};
#[cfg(test)]
pub use crate::notifier::webhook::MockWebhook;
pub use crate::notifier::webhook::{TeamsWebhook, Webhook};

use thiserror::Error;

/// Errors that can occur while delivering a message card.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The webhook could not be reached.
    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The webhook answered with a non-success status.
    #[error("webhook rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The card could not be serialized.
    #[error("failed to encode the message: {0}")]
    Encode(#[from] serde_json::Error),
}
