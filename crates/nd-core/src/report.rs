//! The serializable result of one analysis run.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::detector::Strategy;
use crate::item::ContentItem;
use crate::narrative::Narrative;
use crate::normalize::most_common;
use crate::scoring::{MomentumTrend, round3};

const TOP_SOURCES: usize = 5;

/// Narratives above this confidence count as high-confidence observations.
const HIGH_CONFIDENCE: f64 = 0.8;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub analysis_timestamp: String,
    pub total_items_analyzed: usize,
    pub narrative_count: usize,
    pub strategy: Strategy,
    /// True when the content strategy skipped clustering for keyword counting.
    #[serde(default)]
    pub fallback_used: bool,
    pub narratives: Vec<Narrative>,
    pub source_summary: SourceSummary,
    pub rising: Vec<RisingNarrative>,
    pub summary: RunSummary,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceSummary {
    /// Distinct contributors (handle, or source name when no handle).
    pub total_sources: usize,
    pub source_breakdown: BTreeMap<String, usize>,
    /// Most frequent contributors, highest first.
    pub top_sources: Vec<(String, usize)>,
}

impl SourceSummary {
    pub fn of(items: &[ContentItem]) -> Self {
        let mut source_breakdown = BTreeMap::new();
        for item in items {
            *source_breakdown.entry(item.source.to_string()).or_default() += 1;
        }
        let contributors: Vec<&str> = items.iter().map(ContentItem::contributor).collect();
        let total_sources = contributors.iter().collect::<BTreeSet<_>>().len();
        Self {
            total_sources,
            source_breakdown,
            top_sources: most_common(contributors, TOP_SOURCES),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RisingNarrative {
    pub name: String,
    pub momentum_score: f64,
    pub confidence: f64,
    pub frequency: usize,
}

/// Accelerating narratives by momentum score, highest first.
pub fn rising(narratives: &[Narrative], limit: usize) -> Vec<RisingNarrative> {
    let mut accelerating: Vec<&Narrative> = narratives
        .iter()
        .filter(|n| n.momentum_trend == MomentumTrend::Accelerating)
        .collect();
    accelerating.sort_by(|a, b| b.momentum_score.total_cmp(&a.momentum_score));
    accelerating
        .into_iter()
        .take(limit)
        .map(|n| RisingNarrative {
            name: n.name.clone(),
            momentum_score: n.momentum_score,
            confidence: n.confidence,
            frequency: n.frequency,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Run summary
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub status: String,
    pub top_trend: Option<TopTrend>,
    pub momentum_distribution: BTreeMap<String, usize>,
    pub average_confidence: f64,
    pub signal_sources: Vec<String>,
    pub insights: Insights,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopTrend {
    pub name: String,
    pub momentum_score: f64,
    pub confidence: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub key_observations: Vec<String>,
    pub recommendations: Vec<String>,
    pub risk_factors: Vec<String>,
}

impl RunSummary {
    /// Summarize narratives already in output order.
    pub fn of(narratives: &[Narrative]) -> Self {
        if narratives.is_empty() {
            return Self {
                status: "No narratives detected".to_string(),
                ..Self::default()
            };
        }

        let top_trend = narratives
            .iter()
            .fold(None::<&Narrative>, |best, n| match best {
                Some(b) if b.momentum_score >= n.momentum_score => Some(b),
                _ => Some(n),
            })
            .map(|n| TopTrend {
                name: n.name.clone(),
                momentum_score: n.momentum_score,
                confidence: n.confidence,
            });

        let mut momentum_distribution = BTreeMap::new();
        for n in narratives {
            *momentum_distribution
                .entry(n.momentum_trend.to_string())
                .or_default() += 1;
        }

        let average_confidence =
            round3(narratives.iter().map(|n| n.confidence).sum::<f64>() / narratives.len() as f64);

        let signal_sources: Vec<String> = narratives
            .iter()
            .flat_map(|n| n.source_breakdown.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Self {
            status: format!("{} narratives detected", narratives.len()),
            top_trend,
            momentum_distribution,
            average_confidence,
            signal_sources,
            insights: Insights::of(narratives),
        }
    }
}

impl Insights {
    pub fn of(narratives: &[Narrative]) -> Self {
        let mut insights = Self::default();
        let count = |trend: MomentumTrend| {
            narratives
                .iter()
                .filter(|n| n.momentum_trend == trend)
                .count()
        };

        let accelerating = count(MomentumTrend::Accelerating);
        if accelerating > 0 {
            insights
                .key_observations
                .push(format!("{accelerating} narratives showing strong acceleration"));
        }
        let confident = narratives
            .iter()
            .filter(|n| n.confidence > HIGH_CONFIDENCE)
            .count();
        if confident > 0 {
            insights
                .key_observations
                .push(format!("{confident} narratives with high confidence (>{HIGH_CONFIDENCE})"));
        }

        if let Some(top) = narratives
            .iter()
            .filter(|n| n.momentum_trend == MomentumTrend::Accelerating)
            .max_by(|a, b| a.momentum_score.total_cmp(&b.momentum_score))
        {
            insights.recommendations.push(format!(
                "Prioritize development in '{}' - showing strongest momentum",
                top.name
            ));
        }
        if narratives.len() > 3 {
            insights
                .recommendations
                .push("Multiple narratives detected - consider cross-narrative opportunities".to_string());
        }

        let declining = count(MomentumTrend::Declining);
        if declining > 0 {
            insights
                .risk_factors
                .push(format!("{declining} narratives showing declining momentum"));
        }
        let thin = narratives
            .iter()
            .filter(|n| n.source_breakdown.len() < 2)
            .count();
        if thin > 0 {
            insights
                .risk_factors
                .push(format!("{thin} narratives based on limited signal sources"));
        }

        insights
    }
}
