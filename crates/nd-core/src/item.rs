use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::DEFAULT_STRENGTH;
use crate::time::parse_timestamp;

/// Platform or feed an item came from.
///
/// Known platforms get their own variant; anything else is kept verbatim so
/// that source breakdowns never lose information.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Source {
    Twitter,
    Youtube,
    Podcast,
    Event,
    Github,
    Social,
    Report,
    Web,
    Other(String),
}

impl Source {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Twitter => "twitter",
            Self::Youtube => "youtube",
            Self::Podcast => "podcast",
            Self::Event => "event",
            Self::Github => "github",
            Self::Social => "social",
            Self::Report => "report",
            Self::Web => "web",
            Self::Other(name) => name,
        }
    }

    pub fn from_str_lossy(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "twitter" | "x" => Self::Twitter,
            "youtube" => Self::Youtube,
            "podcast" => Self::Podcast,
            "event" => Self::Event,
            "github" => Self::Github,
            "social" => Self::Social,
            "report" | "reports" => Self::Report,
            "web" | "search" => Self::Web,
            _ => Self::Other(s.trim().to_string()),
        }
    }
}

impl From<String> for Source {
    fn from(s: String) -> Self {
        Self::from_str_lossy(&s)
    }
}

impl From<&str> for Source {
    fn from(s: &str) -> Self {
        Self::from_str_lossy(s)
    }
}

impl From<Source> for String {
    fn from(s: Source) -> Self {
        s.as_str().to_string()
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The atomic input unit: one timestamped piece of text from one source.
///
/// A "signal" is the same record with `strength` attached upstream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    #[serde(alias = "content", alias = "signal")]
    pub text: String,
    /// ISO-8601, kept raw so malformed values can be handled per use site.
    pub timestamp: String,
    #[serde(alias = "source_type")]
    pub source: Source,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl ContentItem {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        timestamp: impl Into<String>,
        source: impl Into<Source>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            timestamp: timestamp.into(),
            source: source.into(),
            source_handle: None,
            kind: None,
            strength: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = Some(strength);
        self
    }

    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.source_handle = Some(handle.into());
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Parsed timestamp, or `None` when it is malformed.
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }

    /// Strength in [0,1]: the explicit value clamped, else derived from
    /// engagement counters in the metadata.
    pub fn effective_strength(&self) -> f64 {
        match self.strength {
            Some(s) if s.is_finite() => s.clamp(0.0, 1.0),
            Some(_) => DEFAULT_STRENGTH,
            None => engagement_strength(&self.metadata),
        }
    }

    /// Handle if present, else the source name.
    pub fn contributor(&self) -> &str {
        self.source_handle
            .as_deref()
            .unwrap_or_else(|| self.source.as_str())
    }

    /// First `max_chars` characters of the text with an ellipsis.
    pub fn excerpt(&self, max_chars: usize) -> String {
        let mut out: String = self.text.chars().take(max_chars).collect();
        out.push_str("...");
        out
    }
}

/// `base * (1 + min(engagement, 2))`, capped at 1, where engagement weighs
/// reposts 3x and replies 2x per thousand.
fn engagement_strength(metadata: &BTreeMap<String, Value>) -> f64 {
    let nested = metadata.get("public_metrics").and_then(Value::as_object);
    let counter = |key: &str| -> Option<f64> {
        metadata
            .get(key)
            .and_then(Value::as_f64)
            .or_else(|| nested.and_then(|m| m.get(key)).and_then(Value::as_f64))
    };

    let likes = counter("like_count");
    let reposts = counter("retweet_count");
    let replies = counter("reply_count");
    if likes.is_none() && reposts.is_none() && replies.is_none() {
        return DEFAULT_STRENGTH;
    }

    let engagement = (likes.unwrap_or(0.0) + reposts.unwrap_or(0.0) * 3.0
        + replies.unwrap_or(0.0) * 2.0)
        / 1000.0;
    let multiplier = engagement.clamp(0.0, 2.0);
    (DEFAULT_STRENGTH * (1.0 + multiplier)).min(1.0)
}
