use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::stopwords::DOMAIN_NOISE;

/// Which detection strategy a run uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMode {
    /// Signal strategy when every item carries an explicit strength, content otherwise.
    #[default]
    Auto,
    /// Vector clustering with keyword fallback.
    Content,
    /// Keyword-substring matching with emerging-term discovery.
    Signal,
}

impl DetectionMode {
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "content" => Self::Content,
            "signal" | "signals" => Self::Signal,
            _ => Self::Auto,
        }
    }
}

/// Every tunable of a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub detection_mode: DetectionMode,
    pub min_tokens: usize,
    pub min_documents: usize,
    pub max_features: usize,
    pub min_df: usize,
    pub max_df: f64,
    pub eps: f64,
    pub min_samples: usize,
    pub min_cluster_size: usize,
    pub cluster_keywords: usize,
    pub keyword_weight_floor: f64,
    pub match_threshold: f64,
    pub fallback_min_mentions: usize,
    pub fallback_confidence_divisor: f64,
    pub bucket_count: usize,
    pub recent_buckets: usize,
    pub recency_window_hours: f64,
    pub min_signals: usize,
    pub min_unmatched: usize,
    pub rising_limit: usize,
    pub sample_limit: usize,
    pub sample_chars: usize,
    /// Domain noise terms added to the English stop-word list.
    pub extra_stop_words: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            detection_mode: DetectionMode::Auto,
            min_tokens: MIN_TOKENS,
            min_documents: MIN_DOCUMENTS,
            max_features: MAX_FEATURES,
            min_df: MIN_DF,
            max_df: MAX_DF,
            eps: EPS,
            min_samples: MIN_SAMPLES,
            min_cluster_size: MIN_CLUSTER_SIZE,
            cluster_keywords: CLUSTER_KEYWORDS,
            keyword_weight_floor: KEYWORD_WEIGHT_FLOOR,
            match_threshold: MATCH_THRESHOLD,
            fallback_min_mentions: FALLBACK_MIN_MENTIONS,
            fallback_confidence_divisor: FALLBACK_CONFIDENCE_DIVISOR,
            bucket_count: BUCKET_COUNT,
            recent_buckets: RECENT_BUCKETS,
            recency_window_hours: RECENCY_WINDOW_HOURS,
            min_signals: MIN_SIGNALS,
            min_unmatched: MIN_UNMATCHED,
            rising_limit: RISING_LIMIT,
            sample_limit: 3,
            sample_chars: 100,
            extra_stop_words: DOMAIN_NOISE.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl EngineConfig {
    /// Reject values that would make the pipeline meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.eps) || !self.eps.is_finite() {
            return Err(ConfigError::OutOfRange {
                field: "eps",
                value: self.eps.to_string(),
            });
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "max_df",
                value: self.max_df.to_string(),
            });
        }
        if !(0.0..1.0).contains(&self.match_threshold) {
            return Err(ConfigError::OutOfRange {
                field: "match_threshold",
                value: self.match_threshold.to_string(),
            });
        }
        if !(0.0..1.0).contains(&self.keyword_weight_floor) {
            return Err(ConfigError::OutOfRange {
                field: "keyword_weight_floor",
                value: self.keyword_weight_floor.to_string(),
            });
        }
        positive_finite("fallback_confidence_divisor", self.fallback_confidence_divisor)?;
        positive_finite("recency_window_hours", self.recency_window_hours)?;
        if self.max_features == 0 {
            return Err(ConfigError::OutOfRange {
                field: "max_features",
                value: "0".into(),
            });
        }
        if self.bucket_count == 0 || self.recent_buckets > self.bucket_count {
            return Err(ConfigError::OutOfRange {
                field: "recent_buckets",
                value: format!("{} of {}", self.recent_buckets, self.bucket_count),
            });
        }
        Ok(())
    }
}

fn positive_finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value: value.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    OutOfRange { field: &'static str, value: String },
    EmptyTaxonomyEntry(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::OutOfRange { field, value } => {
                write!(f, "config value out of range: {field} = {value}")
            }
            ConfigError::EmptyTaxonomyEntry(name) => {
                write!(f, "taxonomy entry '{name}' has no keywords")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
