//! Microsoft Teams "MessageCard" payload.
//!
//! The legacy actionable message format accepted by Teams incoming webhooks:
//!
//! ```json
//! {
//!   "@type": "MessageCard",
//!   "@context": "https://schema.org/extensions",
//!   "summary": "...",
//!   "themeColor": "#f54242",
//!   "title": "...",
//!   "text": "...",
//!   "sections": [
//!     { "title": "Details", "facts": [ { "name": "event", "value": "fired" } ] },
//!     { "title": "Tags", "text": "`infra`,`prod`" }
//!   ]
//! }
//! ```

use serde::Serialize;

/// A message card posted to a Teams webhook.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageCard {
    #[serde(rename = "@type")]
    pub card_type: &'static str,
    #[serde(rename = "@context")]
    pub context: &'static str,
    /// Shown in notifications, required by Teams when `text` is empty.
    pub summary: String,
    pub theme_color: String,
    pub title: String,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<Section>,
}

impl MessageCard {
    pub fn new(title: String, text: String, theme_color: &str) -> Self {
        MessageCard {
            card_type: "MessageCard",
            context: "https://schema.org/extensions",
            summary: text.clone(),
            theme_color: theme_color.to_owned(),
            title,
            text,
            sections: Vec::new(),
        }
    }

    /// Returns the section named `title`, if any.
    #[cfg(test)]
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.title.as_deref() == Some(title))
    }
}

/// A titled block of a message card.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct Section {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub facts: Vec<Fact>,
}

/// A name/value pair rendered as a two column row.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Fact {
    pub name: String,
    pub value: String,
}
