//! Trailing daily buckets and per-narrative keyword counts.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::item::ContentItem;
use crate::time::day_label;

/// A day-long window `[start, end)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeBucket {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub label: String,
}

impl TimeBucket {
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }
}

/// One point of a narrative's time series.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    #[serde(alias = "date")]
    pub label: String,
    pub count: usize,
}

/// `count` contiguous day buckets ending at `now`, most recent first.
///
/// Bucket `i` covers `[now - (i+1)d, now - i·d)` and is labelled with the
/// calendar date of its end.
pub fn trailing_buckets(now: DateTime<Utc>, count: usize) -> Vec<TimeBucket> {
    (0..count)
        .map(|i| {
            let end = now - Duration::days(i as i64);
            let start = end - Duration::days(1);
            TimeBucket {
                start,
                end,
                label: day_label(end),
            }
        })
        .collect()
}

/// Counts items per bucket whose text mentions any of `keywords`.
pub struct TimeSeriesAggregator {
    buckets: Vec<TimeBucket>,
    /// Parsed timestamp and lowercased text per item; `None` when unparseable.
    placed: Vec<(Option<DateTime<Utc>>, String)>,
}

impl TimeSeriesAggregator {
    pub fn new(items: &[ContentItem], now: DateTime<Utc>, bucket_count: usize) -> Self {
        let placed: Vec<(Option<DateTime<Utc>>, String)> = items
            .iter()
            .map(|item| (item.parsed_timestamp(), item.text.to_lowercase()))
            .collect();
        let malformed = placed.iter().filter(|(t, _)| t.is_none()).count();
        if malformed > 0 {
            tracing::debug!("{malformed} items with malformed timestamps excluded from buckets");
        }
        Self {
            buckets: trailing_buckets(now, bucket_count),
            placed,
        }
    }

    /// Series for a narrative's keyword list (case-insensitive substring match).
    pub fn series(&self, keywords: &[String]) -> Vec<SeriesPoint> {
        let needles: Vec<String> = keywords
            .iter()
            .map(|k| k.to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        self.buckets
            .iter()
            .map(|bucket| {
                let count = self
                    .placed
                    .iter()
                    .filter(|(t, text)| {
                        t.is_some_and(|t| bucket.contains(t))
                            && needles.iter().any(|k| text.contains(k.as_str()))
                    })
                    .count();
                SeriesPoint {
                    label: bucket.label.clone(),
                    count,
                }
            })
            .collect()
    }
}
