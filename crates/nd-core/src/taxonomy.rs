//! The fixed catalog of known narrative themes and matching against it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::normalize::Normalizer;

/// One catalog theme: a display name and its defining keywords.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyEntry {
    pub name: String,
    pub keywords: Vec<String>,
}

impl TaxonomyEntry {
    pub fn new(name: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            name: name.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Whether `text_lower` contains any keyword as a substring.
    pub fn mentioned_in(&self, text_lower: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| text_lower.contains(k.to_lowercase().as_str()))
    }

    /// Total keyword occurrences in `text_lower`, summed across keywords.
    pub fn occurrences_in(&self, text_lower: &str) -> usize {
        self.keywords
            .iter()
            .map(|k| k.to_lowercase())
            .filter(|k| !k.is_empty())
            .map(|k| text_lower.matches(k.as_str()).count())
            .sum()
    }
}

/// Ordered, immutable catalog. Order matters: earlier entries win ties.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Taxonomy {
    entries: Vec<TaxonomyEntry>,
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Taxonomy {
    pub fn new(entries: Vec<TaxonomyEntry>) -> Result<Self, ConfigError> {
        if let Some(empty) = entries
            .iter()
            .find(|e| e.keywords.iter().all(|k| k.trim().is_empty()))
        {
            return Err(ConfigError::EmptyTaxonomyEntry(empty.name.clone()));
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[TaxonomyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The built-in ecosystem catalog.
    pub fn builtin() -> Self {
        Self {
            entries: vec![
                TaxonomyEntry::new(
                    "AI & Automation",
                    &[
                        "ai", "artificial intelligence", "agent", "automation", "bot",
                        "machine learning", "neural", "gpt", "llm", "autonomous",
                    ],
                ),
                TaxonomyEntry::new(
                    "DeFi Evolution",
                    &[
                        "defi", "yield", "staking", "liquidity", "amm", "dex", "lending",
                        "borrowing", "derivatives", "perps", "swap",
                    ],
                ),
                TaxonomyEntry::new(
                    "NFT & Digital Assets",
                    &[
                        "nft", "collection", "art", "pfp", "digital asset", "metadata",
                        "royalty", "mint", "drop", "creator",
                    ],
                ),
                TaxonomyEntry::new(
                    "Gaming & Metaverse",
                    &[
                        "gaming", "game", "metaverse", "virtual", "avatar", "item",
                        "play to earn", "p2e", "guild", "tournament",
                    ],
                ),
                TaxonomyEntry::new(
                    "Memecoins & Culture",
                    &[
                        "memecoin", "meme", "pump", "fun", "viral", "community", "shitcoin",
                        "ape", "diamond hands", "moon",
                    ],
                ),
                TaxonomyEntry::new(
                    "Infrastructure",
                    &[
                        "rpc", "node", "validator", "infrastructure", "scaling", "performance",
                        "bandwidth", "latency", "throughput",
                    ],
                ),
                TaxonomyEntry::new(
                    "Mobile & Payments",
                    &[
                        "mobile", "wallet", "payment", "pay", "saga", "phone", "mainstream",
                        "adoption", "commerce", "merchant",
                    ],
                ),
                TaxonomyEntry::new(
                    "Cross-Chain & Bridges",
                    &[
                        "bridge", "cross-chain", "multichain", "interoperability", "ethereum",
                        "polygon", "arbitrum", "wormhole",
                    ],
                ),
            ],
        }
    }
}

/// Result of matching a candidate keyword list against the catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct TaxonomyMatch<'a> {
    pub entry: &'a TaxonomyEntry,
    /// Fraction of the entry's keywords present among the candidates.
    pub overlap: f64,
}

/// Compares normalized candidate terms with normalized catalog keywords.
pub struct TaxonomyMatcher<'a> {
    taxonomy: &'a Taxonomy,
    normalized: Vec<Vec<String>>,
    threshold: f64,
}

impl<'a> TaxonomyMatcher<'a> {
    pub fn new(taxonomy: &'a Taxonomy, normalizer: &Normalizer, threshold: f64) -> Self {
        let normalized = taxonomy
            .entries()
            .iter()
            .map(|e| {
                e.keywords
                    .iter()
                    .map(|k| normalizer.normalize_keyword(k))
                    .collect()
            })
            .collect();
        Self {
            taxonomy,
            normalized,
            threshold,
        }
    }

    /// Overlap fraction of entry `idx` for a candidate set.
    fn overlap(&self, idx: usize, candidates: &HashSet<&str>) -> f64 {
        let keywords = &self.normalized[idx];
        if keywords.is_empty() {
            return 0.0;
        }
        let hits = keywords
            .iter()
            .filter(|k| candidates.contains(k.as_str()))
            .count();
        hits as f64 / keywords.len() as f64
    }

    /// Best-overlapping entry above the threshold; first defined wins ties.
    pub fn best_match(&self, candidates: &[String]) -> Option<TaxonomyMatch<'a>> {
        let set: HashSet<&str> = candidates.iter().map(String::as_str).collect();
        let mut best: Option<(usize, f64)> = None;
        for idx in 0..self.normalized.len() {
            let score = self.overlap(idx, &set);
            if score > self.threshold && best.is_none_or(|(_, s)| score > s) {
                best = Some((idx, score));
            }
        }
        best.map(|(idx, overlap)| TaxonomyMatch {
            entry: &self.taxonomy.entries()[idx],
            overlap,
        })
    }

    /// Catalog name when a match exists, otherwise a name built from the top keywords.
    pub fn name_for(&self, keywords: &[String]) -> String {
        match self.best_match(keywords) {
            Some(m) => m.entry.name.clone(),
            None => derived_name(keywords),
        }
    }
}

/// Title-cased name from the words of the first two keywords, each word once.
pub fn derived_name(keywords: &[String]) -> String {
    let mut words: Vec<&str> = Vec::new();
    for w in keywords.iter().take(2).flat_map(|k| k.split_whitespace()) {
        if !words.contains(&w) {
            words.push(w);
        }
    }
    title_case(&words.join(" "))
}

/// Capitalize the first letter of every word and lowercase the rest.
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    fn synthetic() -> Taxonomy {
        Taxonomy::new(vec![
            TaxonomyEntry::new("First", &["alpha", "beta", "gamma"]),
            TaxonomyEntry::new("Second", &["alpha", "beta", "delta"]),
            TaxonomyEntry::new("Liquidity", &["liquidity", "pools", "market making"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_rejects_empty_entry() {
        let err = Taxonomy::new(vec![TaxonomyEntry::new("Empty", &[])]).unwrap_err();
        assert_eq!(err, ConfigError::EmptyTaxonomyEntry("Empty".into()));
    }

    #[test]
    fn test_builtin_order() {
        let t = Taxonomy::builtin();
        assert_eq!(t.len(), 8);
        assert_eq!(t.entries()[1].name, "DeFi Evolution");
    }

    #[test]
    fn test_best_match_above_threshold() {
        let tax = synthetic();
        let norm = Normalizer::default();
        let matcher = TaxonomyMatcher::new(&tax, &norm, 0.3);
        let m = matcher.best_match(&terms(&["alpha", "delta", "other"])).unwrap();
        assert_eq!(m.entry.name, "Second");
        assert!((m.overlap - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_tie_goes_to_first_defined() {
        let tax = synthetic();
        let norm = Normalizer::default();
        let matcher = TaxonomyMatcher::new(&tax, &norm, 0.3);
        let m = matcher.best_match(&terms(&["alpha", "beta"])).unwrap();
        assert_eq!(m.entry.name, "First");
    }

    #[test]
    fn test_threshold_is_strict() {
        let tax = Taxonomy::new(vec![TaxonomyEntry::new(
            "Ten",
            &["a1", "a2", "a3", "a4", "a5", "a6", "a7", "a8", "a9", "a10"],
        )])
        .unwrap();
        let norm = Normalizer::new(&[]);
        let matcher = TaxonomyMatcher::new(&tax, &norm, 0.3);
        // 3/10 == 0.3 does not clear a strict threshold.
        assert!(matcher.best_match(&terms(&["a1", "a2", "a3"])).is_none());
        assert!(matcher.best_match(&terms(&["a1", "a2", "a3", "a4"])).is_some());
    }

    #[test]
    fn test_stemmed_candidates_match_catalog_keywords() {
        let tax = synthetic();
        let norm = Normalizer::default();
        let matcher = TaxonomyMatcher::new(&tax, &norm, 0.3);
        // "liquidity" → "liquid", "pools" → "pool", "market making" → "market make"
        let m = matcher.best_match(&terms(&["liquid", "pool"])).unwrap();
        assert_eq!(m.entry.name, "Liquidity");
        let m = matcher
            .best_match(&terms(&["market make", "liquid"]))
            .unwrap();
        assert_eq!(m.entry.name, "Liquidity");
    }

    #[test]
    fn test_name_for_falls_back_to_keywords() {
        let tax = synthetic();
        let norm = Normalizer::default();
        let matcher = TaxonomyMatcher::new(&tax, &norm, 0.3);
        assert_eq!(
            matcher.name_for(&terms(&["hackathon", "superteam", "earn"])),
            "Hackathon Superteam"
        );
        assert_eq!(matcher.name_for(&terms(&["alpha", "gamma"])), "First");
    }

    #[test]
    fn test_derived_name_skips_repeated_words() {
        assert_eq!(derived_name(&terms(&["hackathon", "hackathon team"])), "Hackathon Team");
        assert_eq!(derived_name(&[]), "");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("defi yield"), "Defi Yield");
        assert_eq!(title_case("HACKATHON"), "Hackathon");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_substring_mentions() {
        let tax = Taxonomy::builtin();
        let e = &tax.entries()[1];
        assert!(e.mentioned_in("new defi protocol"));
        assert_eq!(e.occurrences_in("defi yield and more defi liquidity"), 4);
        assert!(!tax.entries()[0].mentioned_in("a new dex launched"));
    }
}
