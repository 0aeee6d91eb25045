//! The analysis pipeline: detect, score, order, summarize.

use chrono::{DateTime, Utc};

use crate::config::{ConfigError, DetectionMode, EngineConfig};
use crate::constants::EMERGING_BELOW;
use crate::content::ContentDetector;
use crate::detector::{Detector, DraftOrigin, NarrativeDraft, Strategy};
use crate::item::ContentItem;
use crate::narrative::{self, Narrative, TimeSpan};
use crate::normalize::Normalizer;
use crate::report::{AnalysisReport, RunSummary, SourceSummary, rising};
use crate::scoring::{
    MomentumTrend, bucket_trend, mean_strength, momentum_explanation, rising_score, round3,
    signal_confidence, signal_momentum, strength_trend,
};
use crate::signal::SignalDetector;
use crate::taxonomy::Taxonomy;
use crate::time::{now_utc, to_iso8601};
use crate::timeseries::TimeSeriesAggregator;

/// Turns a batch of items into an ordered, scored narrative report.
///
/// The engine owns its configuration and catalog and holds no state between
/// runs: the same items, catalog, configuration and `now` always produce the
/// same report.
#[derive(Clone, Debug)]
pub struct NarrativeEngine {
    config: EngineConfig,
    taxonomy: Taxonomy,
    normalizer: Normalizer,
}

impl Default for NarrativeEngine {
    fn default() -> Self {
        let config = EngineConfig::default();
        let normalizer = Normalizer::new(&config.extra_stop_words);
        Self {
            config,
            taxonomy: Taxonomy::builtin(),
            normalizer,
        }
    }
}

impl NarrativeEngine {
    pub fn new(config: EngineConfig, taxonomy: Taxonomy) -> Result<Self, ConfigError> {
        config.validate()?;
        let normalizer = Normalizer::new(&config.extra_stop_words);
        Ok(Self {
            config,
            taxonomy,
            normalizer,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// The strategy a run over `items` would use.
    pub fn select_strategy(&self, items: &[ContentItem]) -> Strategy {
        match self.config.detection_mode {
            DetectionMode::Content => Strategy::Content,
            DetectionMode::Signal => Strategy::Signal,
            DetectionMode::Auto => {
                if !items.is_empty() && items.iter().all(|i| i.strength.is_some()) {
                    Strategy::Signal
                } else {
                    Strategy::Content
                }
            }
        }
    }

    pub fn analyze_now(&self, items: &[ContentItem]) -> AnalysisReport {
        self.analyze(items, now_utc())
    }

    /// Full analysis as of `now`.
    pub fn analyze(&self, items: &[ContentItem], now: DateTime<Utc>) -> AnalysisReport {
        let strategy = self.select_strategy(items);
        let content;
        let signal;
        let detector: &dyn Detector = match strategy {
            Strategy::Content => {
                content = ContentDetector::new(&self.config, &self.normalizer, &self.taxonomy);
                &content
            }
            Strategy::Signal => {
                signal = SignalDetector::new(&self.config, &self.taxonomy);
                &signal
            }
        };

        let detection = detector.detect(items);
        let aggregator = TimeSeriesAggregator::new(items, now, self.config.bucket_count);

        let mut narratives: Vec<Narrative> = detection
            .drafts
            .iter()
            .map(|draft| self.finalize(draft, items, &aggregator, strategy, now))
            .collect();
        narratives.sort_by(|a, b| {
            b.momentum_score
                .total_cmp(&a.momentum_score)
                .then_with(|| b.frequency.cmp(&a.frequency))
                .then_with(|| a.name.cmp(&b.name))
        });

        tracing::info!(
            "{} narratives from {} items ({strategy} strategy)",
            narratives.len(),
            items.len()
        );

        AnalysisReport {
            analysis_timestamp: to_iso8601(now),
            total_items_analyzed: items.len(),
            narrative_count: narratives.len(),
            strategy,
            fallback_used: detection.fallback_used,
            source_summary: SourceSummary::of(items),
            rising: rising(&narratives, self.config.rising_limit),
            summary: RunSummary::of(&narratives),
            narratives,
        }
    }

    fn finalize(
        &self,
        draft: &NarrativeDraft,
        items: &[ContentItem],
        aggregator: &TimeSeriesAggregator,
        strategy: Strategy,
        now: DateTime<Utc>,
    ) -> Narrative {
        let members: Vec<&ContentItem> = draft.members.iter().map(|&i| &items[i]).collect();
        let frequency = members.len();
        let time_series = aggregator.series(&draft.keywords);

        let (confidence, momentum_trend, momentum_score) = match strategy {
            Strategy::Content => {
                let confidence = match draft.origin {
                    DraftOrigin::KeywordCount { mentions } => {
                        (mentions as f64 / self.config.fallback_confidence_divisor).min(1.0)
                    }
                    _ => (frequency as f64 / 10.0).min(1.0),
                };
                let confidence = round3(confidence);
                let trend = if frequency < EMERGING_BELOW {
                    MomentumTrend::Emerging
                } else {
                    bucket_trend(&time_series, self.config.recent_buckets)
                };
                let score = rising_score(&time_series, self.config.recent_buckets, confidence);
                (confidence, trend, score)
            }
            Strategy::Signal => (
                signal_confidence(&members),
                strength_trend(&members),
                signal_momentum(&members, now, self.config.recency_window_hours),
            ),
        };

        Narrative {
            name: draft.name.clone(),
            keywords: draft.keywords.clone(),
            confidence,
            frequency,
            momentum_trend,
            momentum_score,
            source_breakdown: narrative::source_breakdown(&members),
            sample_content: members
                .iter()
                .take(self.config.sample_limit)
                .map(|i| i.excerpt(self.config.sample_chars))
                .collect(),
            time_series,
            description: narrative::describe(&members),
            top_signals: narrative::top_signals(&members),
            signal_types: narrative::signal_types(&members),
            average_strength: round3(mean_strength(&members)),
            time_span: TimeSpan::of(&members),
            momentum_explanation: momentum_explanation(momentum_score, frequency, momentum_trend),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::TaxonomyEntry;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = EngineConfig {
            max_df: 0.0,
            ..Default::default()
        };
        assert!(NarrativeEngine::new(config, Taxonomy::builtin()).is_err());
    }

    #[test]
    fn test_auto_mode_selection() {
        let engine = NarrativeEngine::default();
        let plain = vec![ContentItem::new("1", "t", "2026-03-10", "web")];
        let scored = vec![ContentItem::new("1", "t", "2026-03-10", "web").with_strength(0.4)];
        assert_eq!(engine.select_strategy(&plain), Strategy::Content);
        assert_eq!(engine.select_strategy(&scored), Strategy::Signal);
        assert_eq!(engine.select_strategy(&[]), Strategy::Content);

        let forced = NarrativeEngine::new(
            EngineConfig {
                detection_mode: DetectionMode::Signal,
                ..Default::default()
            },
            Taxonomy::builtin(),
        )
        .unwrap();
        assert_eq!(forced.select_strategy(&plain), Strategy::Signal);
    }

    #[test]
    fn test_empty_run() {
        let report = NarrativeEngine::default().analyze(&[], now());
        assert_eq!(report.narrative_count, 0);
        assert!(report.narratives.is_empty());
        assert!(report.rising.is_empty());
        assert_eq!(report.analysis_timestamp, "2026-03-10T12:00:00Z");
    }

    #[test]
    fn test_signal_run_scores_and_orders() {
        let tax = Taxonomy::new(vec![
            TaxonomyEntry::new("Payments", &["payment", "merchant"]),
            TaxonomyEntry::new("Games", &["game"]),
        ])
        .unwrap();
        let engine = NarrativeEngine::new(EngineConfig::default(), tax).unwrap();
        let items = vec![
            ContentItem::new("1", "merchant payment rails", "2026-03-10T10:00:00Z", "github")
                .with_strength(0.9),
            ContentItem::new("2", "payment links ship", "2026-03-10T11:00:00Z", "twitter")
                .with_strength(0.8),
            ContentItem::new("3", "game jam", "2026-03-01T00:00:00Z", "web").with_strength(0.2),
            ContentItem::new("4", "game engine", "2026-03-02T00:00:00Z", "web").with_strength(0.2),
        ];
        let report = engine.analyze(&items, now());
        assert_eq!(report.strategy, Strategy::Signal);
        assert_eq!(report.narrative_count, 2);
        assert_eq!(report.narratives[0].name, "Payments");
        assert_eq!(report.narratives[0].momentum_trend, MomentumTrend::Emerging);
        assert!(report.narratives[0].momentum_score > report.narratives[1].momentum_score);
        assert_eq!(report.narratives[0].top_signals[0], "merchant payment rails");
        assert_eq!(report.source_summary.total_sources, 3);
    }
}
