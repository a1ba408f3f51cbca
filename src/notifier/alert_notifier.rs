//! Conversion of alert documents into message cards and their delivery.

use log::{error, info};

use crate::config::Config;
use crate::elastic::AlertDocument;
use crate::notifier::DeliveryError;
use crate::notifier::message_card::{Fact, MessageCard, Section};
use crate::notifier::severity::Severity;
use crate::notifier::webhook::Webhook;

/// Names of the document fields read when composing a message.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping {
    pub event: String,
    pub timestamp: String,
    pub tags: String,
    pub rule: String,
    pub count: String,
}

impl FieldMapping {
    pub fn from_config(config: &Config) -> Self {
        FieldMapping {
            event: config.elastic_event_field.to_owned(),
            timestamp: config.elastic_timestamp_field.to_owned(),
            tags: config.elastic_tags_field.to_owned(),
            rule: config.elastic_rule_field.to_owned(),
            count: config.elastic_count_field.to_owned(),
        }
    }
}

impl Default for FieldMapping {
    fn default() -> Self {
        FieldMapping::from_config(&Config::default())
    }
}

/// What [`AlertNotifier::notify`] did with a message.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// The card was accepted by the webhook.
    Sent,
    /// Dry run: the card was only logged, as the contained JSON.
    Logged(String),
}

/// Turns alert documents into message cards and delivers them.
///
/// # Examples
///
/// ```no_run
/// let webhook = TeamsWebhook::new(
///     "https://example.webhook.office.com/webhookb2/...",
///     Duration::from_secs(30),
/// )?;
/// let notifier = AlertNotifier::new(webhook, FieldMapping::default(), false);
/// notifier.notify(&doc).await?;
/// ```
pub struct AlertNotifier<W: Webhook> {
    /// Delivery target
    webhook: W,
    /// Document fields to read
    fields: FieldMapping,
    /// Log cards instead of delivering them
    dry_run: bool,
}

impl<W: Webhook> AlertNotifier<W> {
    /// Create a new [AlertNotifier].
    ///
    /// # Arguments
    ///
    /// * `webhook` - Delivery target of the cards.
    /// * `fields` - Names of the document fields to read.
    /// * `dry_run` - When `true`, cards are logged and never delivered.
    pub fn new(webhook: W, fields: FieldMapping, dry_run: bool) -> Self {
        AlertNotifier {
            webhook,
            fields,
            dry_run,
        }
    }

    /// Builds the message card of an alert document.
    ///
    /// The card holds:
    /// - a title with the severity icon, event type and rule name
    /// - a body with the date, matching document count and rule name
    /// - a `Details` section with one fact per non-empty field
    /// - a `Tags` section when the tags field holds at least one tag
    pub fn compose(&self, doc: &AlertDocument) -> MessageCard {
        let event = doc.text(&self.fields.event);
        let rule_name = doc.text(&self.fields.rule);
        let severity = Severity::classify(&event);

        let title = format!("{} Alert {}: {} ", severity.icon(), event, rule_name);
        let text = format!(
            "On date {} {} events trigger rule {}",
            doc.text(&self.fields.timestamp),
            doc.text(&self.fields.count),
            rule_name
        );

        let mut card = MessageCard::new(title, text, severity.color());

        let facts: Vec<Fact> = doc
            .fields()
            .filter(|(_, value)| !value.is_empty())
            .map(|(name, value)| Fact {
                name: name.to_owned(),
                value,
            })
            .collect();
        if !facts.is_empty() {
            card.sections.push(Section {
                title: Some("Details".to_owned()),
                text: None,
                facts,
            });
        }

        let tags = split_tags(&doc.text(&self.fields.tags));
        if !tags.is_empty() {
            card.sections.push(Section {
                title: Some("Tags".to_owned()),
                text: Some(format_tags(&tags)),
                facts: Vec::new(),
            });
        }

        card
    }

    /// Composes the card of `doc` and delivers it, or logs it in dry run.
    ///
    /// # Errors
    ///
    /// Returns the [`DeliveryError`] of the webhook. The error is logged here,
    /// callers are expected to stop.
    pub async fn notify(&self, doc: &AlertDocument) -> Result<Outcome, DeliveryError> {
        let card = self.compose(doc);

        if self.dry_run {
            // The returned JSON is exactly the logged message
            let json = serde_json::to_string(&card)?;
            info!("dry run, message not sent: {}", json);
            return Ok(Outcome::Logged(json));
        }

        match self.webhook.send(&card).await {
            Ok(()) => Ok(Outcome::Sent),
            Err(e) => {
                error!("failed to send message: {}", e);
                Err(e)
            }
        }
    }
}

/// Splits a comma separated tag list. Tags are trimmed and empty ones dropped.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Renders tags as backtick quoted, comma joined text: `` `a`,`b` ``.
pub fn format_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| format!("`{}`", tag))
        .collect::<Vec<String>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::webhook::MockWebhook;

    fn parse(json: &str) -> AlertDocument {
        serde_json::from_str(json).unwrap()
    }

    fn disk_full_doc() -> AlertDocument {
        parse(
            r#"{"event": "fired", "@timestamp": "2024-01-01T00:00:00Z", "ruleName": "disk-full",
                "contextMatchingDocuments": 5, "tags": "infra,prod"}"#,
        )
    }

    fn notifier(webhook: MockWebhook, dry_run: bool) -> AlertNotifier<MockWebhook> {
        AlertNotifier::new(webhook, FieldMapping::default(), dry_run)
    }

    #[test]
    fn test_compose_fired_alert() {
        let card = notifier(MockWebhook::new(), false).compose(&disk_full_doc());

        assert_eq!(card.title, "☢️ Alert fired: disk-full ");
        assert_eq!(
            card.text,
            "On date 2024-01-01T00:00:00Z 5 events trigger rule disk-full"
        );
        assert_eq!(card.summary, card.text);
        assert_eq!(card.theme_color, "#f54242");

        let tags = card.section("Tags").unwrap();
        assert_eq!(tags.text.as_deref(), Some("`infra`,`prod`"));

        let details = card.section("Details").unwrap();
        assert_eq!(details.facts.len(), 5);
        assert!(details.facts.contains(&Fact {
            name: "contextMatchingDocuments".to_owned(),
            value: "5".to_owned(),
        }));
    }

    #[test]
    fn test_compose_severity_variants() {
        let notifier = notifier(MockWebhook::new(), false);

        let recovered = notifier.compose(&parse(r#"{"event": "recovered", "ruleName": "cpu"}"#));
        assert_eq!(recovered.title, "✅ Alert recovered: cpu ");
        assert_eq!(recovered.theme_color, "#42f56f");

        let other = notifier.compose(&parse(r#"{"event": "active", "ruleName": "cpu"}"#));
        assert_eq!(other.title, "ℹ️ Alert active: cpu ");
        assert_eq!(other.theme_color, "#ffffff");

        let absent = notifier.compose(&parse(r#"{"ruleName": "cpu"}"#));
        assert_eq!(absent.title, "ℹ️ Alert : cpu ");
        assert_eq!(absent.theme_color, "#ffffff");
    }

    #[test]
    fn test_compose_skips_empty_facts() {
        let doc = parse(r#"{"event": "fired", "empty": "", "none": null, "list": [], "host": "web-1"}"#);
        let card = notifier(MockWebhook::new(), false).compose(&doc);

        let names: Vec<&str> = card
            .section("Details")
            .unwrap()
            .facts
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["event", "host"]);
    }

    #[test]
    fn test_compose_without_tags() {
        let card = notifier(MockWebhook::new(), false).compose(&parse(r#"{"event": "fired"}"#));
        assert!(card.section("Tags").is_none());

        let card = notifier(MockWebhook::new(), false).compose(&parse(r#"{"tags": ""}"#));
        assert!(card.section("Tags").is_none());
    }

    #[test]
    fn test_compose_tag_list_value() {
        let card = notifier(MockWebhook::new(), false)
            .compose(&parse(r#"{"tags": ["infra", "prod"]}"#));
        assert_eq!(
            card.section("Tags").unwrap().text.as_deref(),
            Some("`infra`,`prod`")
        );
    }

    #[test]
    fn test_compose_custom_fields() {
        let fields = FieldMapping {
            event: "kibana.alert.action_group".to_owned(),
            timestamp: "date".to_owned(),
            tags: "labels".to_owned(),
            rule: "rule".to_owned(),
            count: "n".to_owned(),
        };
        let notifier = AlertNotifier::new(MockWebhook::new(), fields, false);
        let doc = parse(
            r#"{"kibana.alert.action_group": "recovered", "date": "yesterday", "labels": "a",
                "rule": "latency", "n": 3}"#,
        );

        let card = notifier.compose(&doc);
        assert_eq!(card.title, "✅ Alert recovered: latency ");
        assert_eq!(card.text, "On date yesterday 3 events trigger rule latency");
        assert_eq!(card.section("Tags").unwrap().text.as_deref(), Some("`a`"));
    }

    #[test]
    fn test_split_and_format_tags() {
        let tags = split_tags("a,b,c");
        assert_eq!(tags, vec!["a", "b", "c"]);
        assert_eq!(format_tags(&tags), "`a`,`b`,`c`");
        assert_eq!(split_tags(&tags.join(",")), tags);

        assert_eq!(split_tags(" a , ,b,"), vec!["a", "b"]);
        assert!(split_tags("").is_empty());
    }

    #[tokio::test]
    async fn test_notify_sends_card() {
        let mut webhook = MockWebhook::new();
        webhook
            .expect_send()
            .withf(|card| card.title == "☢️ Alert fired: disk-full ")
            .times(1)
            .returning(|_| Ok(()));

        let outcome = notifier(webhook, false).notify(&disk_full_doc()).await.unwrap();
        assert_eq!(outcome, Outcome::Sent);
    }

    #[tokio::test]
    async fn test_notify_dry_run_never_sends() {
        let mut webhook = MockWebhook::new();
        webhook.expect_send().times(0);

        // Outcome::Logged carries the line written with info!
        let outcome = notifier(webhook, true).notify(&disk_full_doc()).await.unwrap();
        match outcome {
            Outcome::Logged(json) => {
                assert!(json.contains("Alert fired: disk-full"));
                assert!(json.contains("#f54242"));
            }
            Outcome::Sent => panic!("dry run must not send"),
        }
    }

    #[tokio::test]
    async fn test_notify_failure() {
        let mut webhook = MockWebhook::new();
        webhook.expect_send().times(1).returning(|_| {
            Err(DeliveryError::Rejected {
                status: 500,
                body: "boom".to_owned(),
            })
        });

        let err = notifier(webhook, false)
            .notify(&disk_full_doc())
            .await
            .unwrap_err();
        assert!(matches!(err, DeliveryError::Rejected { status: 500, .. }));
    }
}
