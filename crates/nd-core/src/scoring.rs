//! Confidence, momentum and trend for a narrative's supporting items.
//!
//! Two scoring families exist and are never mixed: the signal family works
//! from item strengths and recency, the bucket family from the narrative's
//! daily time series.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_RECENCY, EMERGING_BELOW};
use crate::item::ContentItem;
use crate::time::hours_between;
use crate::timeseries::SeriesPoint;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MomentumTrend {
    Accelerating,
    #[serde(alias = "stable")]
    Steady,
    Declining,
    Emerging,
}

impl MomentumTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accelerating => "accelerating",
            Self::Steady => "steady",
            Self::Declining => "declining",
            Self::Emerging => "emerging",
        }
    }
}

impl fmt::Display for MomentumTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

pub fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

/// Distinct source categories among `items`, saturating at three.
pub fn source_diversity(items: &[&ContentItem]) -> f64 {
    let distinct: HashSet<&str> = items.iter().map(|i| i.source.as_str()).collect();
    (distinct.len() as f64 / 3.0).min(1.0)
}

pub fn mean_strength(items: &[&ContentItem]) -> f64 {
    mean(items.iter().map(|i| i.effective_strength()))
}

/// `max(0, 1 - hours/window)`, or the default when the timestamp is malformed.
pub fn recency(item: &ContentItem, now: DateTime<Utc>, window_hours: f64) -> f64 {
    match item.parsed_timestamp() {
        Some(t) => (1.0 - hours_between(t, now) / window_hours).max(0.0),
        None => DEFAULT_RECENCY,
    }
}

// ---------------------------------------------------------------------------
// Signal family
// ---------------------------------------------------------------------------

/// `0.4·count + 0.4·strength + 0.2·diversity`, in [0,1] to three decimals.
pub fn signal_confidence(items: &[&ContentItem]) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    let count = (items.len() as f64 / 5.0).min(1.0);
    let raw = 0.4 * count + 0.4 * mean_strength(items) + 0.2 * source_diversity(items);
    round3(raw.clamp(0.0, 1.0))
}

/// `0.3·count + 0.4·strength + 0.2·recency + 0.1·diversity`, to three decimals.
pub fn signal_momentum(items: &[&ContentItem], now: DateTime<Utc>, window_hours: f64) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    let count = (items.len() as f64 / 10.0).min(1.0);
    let recent = mean(items.iter().map(|i| recency(i, now, window_hours)));
    let raw = 0.3 * count + 0.4 * mean_strength(items) + 0.2 * recent + 0.1 * source_diversity(items);
    round3(raw.max(0.0))
}

/// Later-half mean strength against earlier-half mean strength.
///
/// Items with malformed timestamps cannot be ordered and are left out; with
/// fewer than two ordered items the trend is steady.
pub fn strength_trend(items: &[&ContentItem]) -> MomentumTrend {
    if items.len() < EMERGING_BELOW {
        return MomentumTrend::Emerging;
    }
    let mut ordered: Vec<(DateTime<Utc>, f64)> = items
        .iter()
        .filter_map(|i| i.parsed_timestamp().map(|t| (t, i.effective_strength())))
        .collect();
    if ordered.len() < 2 {
        return MomentumTrend::Steady;
    }
    ordered.sort_by_key(|(t, _)| *t);

    let mid = ordered.len() / 2;
    let earlier = mean(ordered[..mid].iter().map(|(_, s)| *s));
    let later = mean(ordered[mid..].iter().map(|(_, s)| *s));
    let ratio = if earlier > 0.0 { later / earlier } else { 1.0 };

    if ratio > 1.2 {
        MomentumTrend::Accelerating
    } else if ratio < 0.8 {
        MomentumTrend::Declining
    } else {
        MomentumTrend::Steady
    }
}

// ---------------------------------------------------------------------------
// Bucket family
// ---------------------------------------------------------------------------

fn split_series(series: &[SeriesPoint], recent: usize) -> (&[SeriesPoint], &[SeriesPoint]) {
    series.split_at(recent.min(series.len()))
}

/// Sum of the `recent` most recent buckets against the sum of the rest.
pub fn bucket_trend(series: &[SeriesPoint], recent: usize) -> MomentumTrend {
    let (newer, older) = split_series(series, recent);
    let newer: usize = newer.iter().map(|p| p.count).sum();
    let older: usize = older.iter().map(|p| p.count).sum();
    let (newer, older) = (newer as f64, older as f64);

    if newer > 1.5 * older {
        MomentumTrend::Accelerating
    } else if newer < 0.5 * older {
        MomentumTrend::Declining
    } else {
        MomentumTrend::Steady
    }
}

/// `(recent mean / max(older mean, 1)) × confidence`, to three decimals.
pub fn rising_score(series: &[SeriesPoint], recent: usize, confidence: f64) -> f64 {
    let (newer, older) = split_series(series, recent);
    if newer.is_empty() {
        return 0.0;
    }
    let newer = mean(newer.iter().map(|p| p.count as f64));
    let older = if older.is_empty() {
        1.0
    } else {
        mean(older.iter().map(|p| p.count as f64)).max(1.0)
    };
    round3((newer / older * confidence).max(0.0))
}

// ---------------------------------------------------------------------------
// Explanation
// ---------------------------------------------------------------------------

pub fn intensity_band(score: f64) -> &'static str {
    if score > 0.8 {
        "Very strong"
    } else if score > 0.6 {
        "Strong"
    } else if score > 0.4 {
        "Moderate"
    } else {
        "Weak"
    }
}

/// One-paragraph reading of a narrative's momentum.
pub fn momentum_explanation(score: f64, frequency: usize, trend: MomentumTrend) -> String {
    let trend_sentence = match trend {
        MomentumTrend::Accelerating => "Activity is accelerating.",
        MomentumTrend::Steady => "Activity is holding steady.",
        MomentumTrend::Declining => "Activity is declining.",
        MomentumTrend::Emerging => "Too few signals to establish a trend yet.",
    };
    format!(
        "{} momentum ({score:.3}) based on {frequency} supporting signals. {trend_sentence}",
        intensity_band(score)
    )
}
