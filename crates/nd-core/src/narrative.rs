use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::item::ContentItem;
use crate::normalize::{most_common, raw_terms};
use crate::scoring::MomentumTrend;
use crate::time::to_iso8601;
use crate::timeseries::SeriesPoint;

/// Strongest supporting texts kept on a narrative.
const TOP_SIGNALS: usize = 5;

/// Items sampled for the description's key themes.
const THEME_SAMPLE: usize = 5;

const THEMES: usize = 3;

/// A detected narrative, scored and finalized. Never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    pub name: String,
    pub keywords: Vec<String>,
    pub confidence: f64,
    /// Number of supporting items.
    pub frequency: usize,
    pub momentum_trend: MomentumTrend,
    pub momentum_score: f64,
    pub source_breakdown: BTreeMap<String, usize>,
    pub sample_content: Vec<String>,
    pub time_series: Vec<SeriesPoint>,
    pub description: String,
    pub top_signals: Vec<String>,
    pub signal_types: BTreeMap<String, usize>,
    pub average_strength: f64,
    pub time_span: TimeSpan,
    pub momentum_explanation: String,
}

/// Earliest and latest parseable timestamps among supporting items.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub earliest: Option<String>,
    pub latest: Option<String>,
    pub span_hours: f64,
}

impl TimeSpan {
    pub fn of(items: &[&ContentItem]) -> Self {
        let mut stamps = items.iter().filter_map(|i| i.parsed_timestamp());
        let Some(first) = stamps.next() else {
            return Self::default();
        };
        let (earliest, latest) = stamps.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
        let hours = (latest - earliest).num_seconds() as f64 / 3600.0;
        Self {
            earliest: Some(to_iso8601(earliest)),
            latest: Some(to_iso8601(latest)),
            span_hours: (hours * 10.0).round() / 10.0,
        }
    }
}

pub fn source_breakdown(items: &[&ContentItem]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(item.source.to_string()).or_default() += 1;
    }
    counts
}

pub fn signal_types(items: &[&ContentItem]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for kind in items.iter().filter_map(|i| i.kind.as_deref()) {
        *counts.entry(kind.to_string()).or_default() += 1;
    }
    counts
}

/// Texts of the strongest items; equal strengths keep input order.
pub fn top_signals(items: &[&ContentItem]) -> Vec<String> {
    let mut ranked: Vec<&ContentItem> = items.to_vec();
    ranked.sort_by(|a, b| b.effective_strength().total_cmp(&a.effective_strength()));
    ranked
        .into_iter()
        .take(TOP_SIGNALS)
        .map(|i| i.text.clone())
        .collect()
}

/// "Narrative detected from N signals across M sources. Key themes include: ..."
pub fn describe(items: &[&ContentItem]) -> String {
    let sources = source_breakdown(items).len();
    let terms = items
        .iter()
        .take(THEME_SAMPLE)
        .flat_map(|i| raw_terms(&i.text));
    let themes: Vec<String> = most_common(terms, THEMES)
        .into_iter()
        .map(|(t, _)| t)
        .collect();
    let themes = if themes.is_empty() {
        "various topics".to_string()
    } else {
        themes.join(", ")
    };
    format!(
        "Narrative detected from {} signals across {sources} sources. Key themes include: {themes}.",
        items.len()
    )
}
