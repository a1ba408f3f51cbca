//! Configuration of the alert bridge.
//!
//! The configuration is flat and every key is optional. Values are layered with
//! [`figment`], each layer overriding the previous one:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. An optional YAML file given with `--config`
//! 3. Environment variables (`ELASTIC_HOST`, `ALERT_INTERVAL`, ...)
//!
//! # Configuration File Format
//!
//! ```yaml
//! # Search backend
//! elastic_host: "https://elastic.example.com:9200"
//! elastic_username: "elastic"
//! elastic_password: "secret"
//! elastic_index: "alerts"
//! elastic_timestamp_field: "@timestamp"
//!
//! # Delivery
//! notify_channel: "msteams"
//! notify_msteams_webhook: "https://example.webhook.office.com/webhookb2/..."
//!
//! # Polling interval in seconds, also the size of the query window
//! alert_interval: 300
//! # Timeout of each HTTP request in seconds
//! http_timeout: 30
//! dryrun: false
//! ```
//!
//! # Environment Variables
//!
//! Each key can be overridden by the environment variable of the same name in
//! upper case, e.g. `ELASTIC_PASSWORD` or `NOTIFY_MSTEAMS_WEBHOOK`.

use std::env;
use std::fmt;
use std::path::Path;

use anyhow::{anyhow, bail};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use serde::{Deserialize, Serialize};

/// Environment variables holding text, taken verbatim.
const STRING_ENV_KEYS: [&str; 11] = [
    "ELASTIC_HOST",
    "ELASTIC_USERNAME",
    "ELASTIC_PASSWORD",
    "ELASTIC_INDEX",
    "ELASTIC_TIMESTAMP_FIELD",
    "ELASTIC_EVENT_FIELD",
    "ELASTIC_TAGS_FIELD",
    "ELASTIC_RULE_FIELD",
    "ELASTIC_COUNT_FIELD",
    "NOTIFY_CHANNEL",
    "NOTIFY_MSTEAMS_WEBHOOK",
];

/// Environment variables holding numbers or booleans.
const TYPED_ENV_KEYS: [&str; 4] = [
    "ELASTIC_INSECURE_SKIP_VERIFY",
    "ALERT_INTERVAL",
    "HTTP_TIMEOUT",
    "DRYRUN",
];

/// The only supported delivery channel.
pub const MSTEAMS_CHANNEL: &str = "msteams";

/// Root configuration structure.
///
/// Built once at startup and then only read. See the module documentation for
/// the file format and environment variables.
#[derive(Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Base URL of the search backend, without trailing slash.
    pub elastic_host: String,
    /// Basic auth user name.
    pub elastic_username: String,
    /// Basic auth password.
    pub elastic_password: String,
    /// Index holding the alert documents.
    pub elastic_index: String,
    /// Field used for the time range filter and rendered as the alert date.
    pub elastic_timestamp_field: String,
    /// Field holding the event type (`fired`, `recovered`, ...).
    pub elastic_event_field: String,
    /// Field holding the comma separated tags.
    pub elastic_tags_field: String,
    /// Field holding the rule name.
    pub elastic_rule_field: String,
    /// Field holding the number of documents matched by the rule.
    pub elastic_count_field: String,
    /// Skip TLS certificate verification towards the search backend.
    pub elastic_insecure_skip_verify: bool,
    /// Delivery channel, only `msteams` is supported.
    pub notify_channel: String,
    /// Incoming webhook URL of the Teams channel.
    pub notify_msteams_webhook: String,
    /// Polling interval in seconds.
    ///
    /// Also the size of the query window: each poll reads documents newer than
    /// `now - alert_interval`.
    pub alert_interval: u64,
    /// Timeout in seconds of every HTTP request, search and webhook alike.
    pub http_timeout: u64,
    /// Log the messages instead of delivering them.
    pub dryrun: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            elastic_host: "https://localhost:9200".to_owned(),
            elastic_username: "elastic".to_owned(),
            elastic_password: "s3cr3t".to_owned(),
            elastic_index: "alerts".to_owned(),
            elastic_timestamp_field: "@timestamp".to_owned(),
            elastic_event_field: "event".to_owned(),
            elastic_tags_field: "tags".to_owned(),
            elastic_rule_field: "ruleName".to_owned(),
            elastic_count_field: "contextMatchingDocuments".to_owned(),
            elastic_insecure_skip_verify: false,
            notify_channel: MSTEAMS_CHANNEL.to_owned(),
            notify_msteams_webhook: "http://unusable".to_owned(),
            alert_interval: 300,
            http_timeout: 30,
            dryrun: false,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Config")
            .field("elastic_host", &self.elastic_host)
            .field("elastic_username", &self.elastic_username)
            .field("elastic_password", &"***")
            .field("elastic_index", &self.elastic_index)
            .field("elastic_timestamp_field", &self.elastic_timestamp_field)
            .field("elastic_event_field", &self.elastic_event_field)
            .field("elastic_tags_field", &self.elastic_tags_field)
            .field("elastic_rule_field", &self.elastic_rule_field)
            .field("elastic_count_field", &self.elastic_count_field)
            .field(
                "elastic_insecure_skip_verify",
                &self.elastic_insecure_skip_verify,
            )
            .field("notify_channel", &self.notify_channel)
            .field("notify_msteams_webhook", &self.notify_msteams_webhook)
            .field("alert_interval", &self.alert_interval)
            .field("http_timeout", &self.http_timeout)
            .field("dryrun", &self.dryrun)
            .finish()
    }
}

impl Config {
    /// Builds the layered [`Figment`]: defaults, then the YAML file if any,
    /// then the environment.
    ///
    /// Text variables are merged as plain strings so that values such as
    /// `123456`, `007` or `[x]` are kept as written instead of being parsed.
    pub fn figment(path: Option<&str>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Env::raw().only(&TYPED_ENV_KEYS));

        for key in STRING_ENV_KEYS {
            if let Ok(value) = env::var(key) {
                figment = figment.merge(Serialized::default(&key.to_ascii_lowercase(), value));
            }
        }
        figment
    }

    /// Loads, normalizes and validates the configuration.
    ///
    /// # Arguments
    ///
    /// * `path` - Optional path to a YAML configuration file. The file must exist
    ///   when given.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, a value cannot be parsed, or
    /// the configuration is invalid (see [`Config::validate`]).
    pub fn load(path: Option<&str>) -> Result<Self, anyhow::Error> {
        if let Some(path) = path
            && !Path::new(path).is_file()
        {
            bail!("configuration file {} not found", path);
        }

        let mut config: Config = Self::figment(path)
            .extract()
            .map_err(|e| anyhow!("invalid configuration: {}", e))?;

        // Normalize host URL by removing trailing slashes
        while config.elastic_host.ends_with('/') {
            config.elastic_host.pop();
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks the values that would make the bridge unable to run.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.alert_interval == 0 {
            bail!("alert_interval must be greater than 0");
        }
        if self.http_timeout == 0 {
            bail!("http_timeout must be greater than 0");
        }
        if self.notify_channel != MSTEAMS_CHANNEL {
            bail!(
                "unsupported notify_channel {}, only {} is available",
                self.notify_channel,
                MSTEAMS_CHANNEL
            );
        }
        if self.elastic_index.is_empty() || self.elastic_timestamp_field.is_empty() {
            bail!("elastic_index and elastic_timestamp_field must not be empty");
        }
        Ok(())
    }
}
