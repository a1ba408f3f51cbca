//! Severity derived from the event type of an alert.

/// Severity of an alert, derived from its event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The rule fired.
    Fired,
    /// The rule recovered.
    Recovered,
    /// Any other or missing event type.
    Info,
}

impl Severity {
    /// Classifies an event type. Matching is exact and case sensitive.
    pub fn classify(event: &str) -> Self {
        match event {
            "fired" => Severity::Fired,
            "recovered" => Severity::Recovered,
            _ => Severity::Info,
        }
    }

    /// Icon shown at the start of the message title.
    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Fired => "☢️",
            Severity::Recovered => "✅",
            Severity::Info => "ℹ️",
        }
    }

    /// Theme color of the message card.
    pub fn color(&self) -> &'static str {
        match self {
            Severity::Fired => "#f54242",
            Severity::Recovered => "#42f56f",
            Severity::Info => "#ffffff",
        }
    }
}
