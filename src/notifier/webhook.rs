//! HTTP client posting message cards to a Teams incoming webhook.

use std::time::Duration;

use log::{debug, info};
use mockall::automock;
use reqwest::Client;

use crate::notifier::DeliveryError;
use crate::notifier::message_card::MessageCard;

/// Trait for delivering message cards.
///
/// This trait abstracts the HTTP operations for easier testing with mocks.
#[automock]
pub trait Webhook {
    /// Delivers one card.
    async fn send(&self, card: &MessageCard) -> Result<(), DeliveryError>;
}

/// Teams incoming webhook client.
pub struct TeamsWebhook {
    /// Incoming webhook URL
    url: String,
    /// HTTP client
    client: Client,
}

impl TeamsWebhook {
    /// Create a new [TeamsWebhook].
    ///
    /// # Arguments
    ///
    /// * `url` - The incoming webhook URL of the channel.
    /// * `timeout` - Timeout of each delivery request.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Transport`] if the HTTP client cannot be built.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, DeliveryError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(TeamsWebhook {
            url: url.to_owned(),
            client,
        })
    }
}

impl Webhook for TeamsWebhook {
    /// POST the card as JSON to the webhook URL.
    ///
    /// Any non-success status is returned as [`DeliveryError::Rejected`] along
    /// with the response body.
    async fn send(&self, card: &MessageCard) -> Result<(), DeliveryError> {
        info!("send message card \"{}\"", card.title);
        debug!("request {} -> {:?}", &self.url, card);

        let response = self.client.post(&self.url).json(card).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!("response from {} -> {}", &self.url, status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_send() {
        let mut server = mockito::Server::new_async().await;
        let url = format!("{}/webhookb2/abc", server.url());

        let mock = server
            .mock("POST", "/webhookb2/abc")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::PartialJson(json!({
                "@type": "MessageCard",
                "title": "title",
                "themeColor": "#f54242"
            })))
            .with_status(200)
            .with_body("1")
            .create_async()
            .await;

        let webhook = TeamsWebhook::new(&url, TIMEOUT).unwrap();
        let card = MessageCard::new("title".to_owned(), "body".to_owned(), "#f54242");
        webhook.send(&card).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_rejected() {
        let mut server = mockito::Server::new_async().await;
        let url = format!("{}/webhookb2/abc", server.url());

        server
            .mock("POST", "/webhookb2/abc")
            .with_status(400)
            .with_body("Summary or Text is required.")
            .create_async()
            .await;

        let webhook = TeamsWebhook::new(&url, TIMEOUT).unwrap();
        let card = MessageCard::new("title".to_owned(), "body".to_owned(), "#ffffff");
        let err = webhook.send(&card).await.unwrap_err();

        match err {
            DeliveryError::Rejected { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "Summary or Text is required.");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_unreachable() {
        let webhook = TeamsWebhook::new("http://127.0.0.1:9/webhook", TIMEOUT).unwrap();
        let card = MessageCard::new("title".to_owned(), "body".to_owned(), "#ffffff");
        let err = webhook.send(&card).await.unwrap_err();
        assert!(matches!(err, DeliveryError::Transport(_)));
    }
}
