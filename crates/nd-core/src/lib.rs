//! Narrative detection and momentum scoring engine.
//!
//! Groups timestamped text items into named narratives, either by density
//! clustering of TF-IDF vectors or by keyword matching of strength-scored
//! signals, then scores each narrative's confidence, momentum and trend over
//! a trailing window of daily buckets.
//!
//! Zero I/O: items in, report out. Persistence and transport live elsewhere.

pub mod cluster;
pub mod config;
pub mod constants;
pub mod content;
pub mod detector;
pub mod engine;
pub mod fallback;
pub mod item;
pub mod narrative;
pub mod normalize;
pub mod report;
pub mod scoring;
pub mod signal;
pub mod stem;
pub mod stopwords;
pub mod taxonomy;
pub mod time;
pub mod timeseries;
pub mod vectorize;

pub use cluster::{Cluster, DensityClusterer, cosine_similarity};
pub use config::{ConfigError, DetectionMode, EngineConfig};
pub use content::ContentDetector;
pub use detector::{Detection, Detector, DraftOrigin, NarrativeDraft, Strategy};
pub use engine::NarrativeEngine;
pub use fallback::KeywordFallback;
pub use item::{ContentItem, Source};
pub use narrative::{Narrative, TimeSpan};
pub use normalize::Normalizer;
pub use report::{
    AnalysisReport, Insights, RisingNarrative, RunSummary, SourceSummary, TopTrend,
};
pub use scoring::MomentumTrend;
pub use signal::SignalDetector;
pub use taxonomy::{Taxonomy, TaxonomyEntry, TaxonomyMatch, TaxonomyMatcher};
pub use timeseries::{SeriesPoint, TimeBucket, TimeSeriesAggregator};
pub use vectorize::{TermVectors, VectorSpaceBuilder};
