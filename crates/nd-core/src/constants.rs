/// Documents with fewer normalized tokens than this are left out of clustering.
pub const MIN_TOKENS: usize = 3;

/// Below this many eligible documents the vector path is skipped entirely.
pub const MIN_DOCUMENTS: usize = 5;

/// Vocabulary cap for the TF-IDF builder.
pub const MAX_FEATURES: usize = 500;

/// A term must appear in at least this many documents to be kept.
pub const MIN_DF: usize = 2;

/// A term appearing in more than this fraction of documents is dropped.
pub const MAX_DF: f64 = 0.8;

/// Neighborhood radius in cosine-distance terms.
pub const EPS: f64 = 0.3;

/// Neighbors (excluding the document itself) needed to be a core document.
pub const MIN_SAMPLES: usize = 3;

/// Clusters smaller than this are discarded after the density pass.
pub const MIN_CLUSTER_SIZE: usize = 3;

/// Candidate keywords taken from a cluster centroid.
pub const CLUSTER_KEYWORDS: usize = 10;

/// Centroid weights at or below this are not keywords.
pub const KEYWORD_WEIGHT_FLOOR: f64 = 0.01;

/// Overlap fraction a catalog entry must exceed to name a candidate.
pub const MATCH_THRESHOLD: f64 = 0.3;

/// Keyword occurrences needed before the fallback detector emits a narrative.
pub const FALLBACK_MIN_MENTIONS: usize = 3;

/// Fallback confidence saturates at this many occurrences.
pub const FALLBACK_CONFIDENCE_DIVISOR: f64 = 20.0;

/// Trailing daily buckets in a narrative's time series.
pub const BUCKET_COUNT: usize = 7;

/// Buckets counted as "recent" by the bucket trend classifier.
pub const RECENT_BUCKETS: usize = 3;

/// Recency decays linearly to zero over this many hours (one week).
pub const RECENCY_WINDOW_HOURS: f64 = 168.0;

/// Recency assumed for a signal whose timestamp does not parse.
pub const DEFAULT_RECENCY: f64 = 0.5;

/// Narratives need at least this many signals in the signal strategy.
pub const MIN_SIGNALS: usize = 2;

/// Emerging-term discovery needs at least this many unmatched signals.
pub const MIN_UNMATCHED: usize = 3;

/// Narratives with fewer signals than this are classified as emerging.
pub const EMERGING_BELOW: usize = 3;

/// Rising narratives reported per run.
pub const RISING_LIMIT: usize = 5;

/// Strength assumed when an item carries neither a strength nor engagement counters.
pub const DEFAULT_STRENGTH: f64 = 0.5;

/// Numerical epsilon for near-zero comparisons
pub const EPSILON: f64 = 1e-10;
