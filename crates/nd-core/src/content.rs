//! The vector path: normalize, vectorize, cluster, name.

use crate::cluster::DensityClusterer;
use crate::config::EngineConfig;
use crate::detector::{Detection, Detector, DraftOrigin, NarrativeDraft, Strategy};
use crate::fallback::KeywordFallback;
use crate::item::ContentItem;
use crate::normalize::Normalizer;
use crate::taxonomy::{Taxonomy, TaxonomyMatcher};
use crate::vectorize::VectorSpaceBuilder;

/// Clusters free text and names clusters against the catalog, degrading to
/// keyword counting when there is too little text to cluster.
pub struct ContentDetector<'a> {
    config: &'a EngineConfig,
    normalizer: &'a Normalizer,
    taxonomy: &'a Taxonomy,
}

impl<'a> ContentDetector<'a> {
    pub fn new(config: &'a EngineConfig, normalizer: &'a Normalizer, taxonomy: &'a Taxonomy) -> Self {
        Self {
            config,
            normalizer,
            taxonomy,
        }
    }

    fn fallback(&self, items: &[ContentItem]) -> Detection {
        let drafts = KeywordFallback::new(self.taxonomy, self.config.fallback_min_mentions).detect(items);
        Detection {
            drafts,
            fallback_used: true,
        }
    }
}

impl Detector for ContentDetector<'_> {
    fn strategy(&self) -> Strategy {
        Strategy::Content
    }

    fn detect(&self, items: &[ContentItem]) -> Detection {
        if items.is_empty() {
            return Detection::default();
        }

        // (item index, tokens) for items with enough surviving terms
        let eligible: Vec<(usize, Vec<String>)> = items
            .iter()
            .enumerate()
            .map(|(i, item)| (i, self.normalizer.tokens(&item.text)))
            .filter(|(_, tokens)| tokens.len() >= self.config.min_tokens)
            .collect();

        if eligible.len() < self.config.min_documents {
            tracing::info!(
                "insufficient data for clustering ({} of {} documents eligible), using keyword fallback",
                eligible.len(),
                items.len()
            );
            return self.fallback(items);
        }

        let docs: Vec<Vec<String>> = eligible.iter().map(|(_, t)| t.clone()).collect();
        let vectors = VectorSpaceBuilder::from_config(self.config).build(&docs);
        if vectors.is_empty() {
            tracing::info!("empty vocabulary after frequency pruning, using keyword fallback");
            return self.fallback(items);
        }

        let clusters = DensityClusterer::from_config(self.config).cluster(&vectors.rows);
        tracing::debug!("{} clusters from {} documents", clusters.len(), vectors.n_docs());

        let matcher = TaxonomyMatcher::new(self.taxonomy, self.normalizer, self.config.match_threshold);
        let drafts = clusters
            .iter()
            .filter_map(|cluster| {
                let keywords = cluster.top_terms(
                    &vectors.vocabulary,
                    self.config.cluster_keywords,
                    self.config.keyword_weight_floor,
                );
                if keywords.is_empty() {
                    tracing::debug!("dropping cluster of {} with no keywords", cluster.len());
                    return None;
                }
                Some(NarrativeDraft {
                    name: matcher.name_for(&keywords),
                    keywords,
                    members: cluster.members.iter().map(|&d| eligible[d].0).collect(),
                    origin: DraftOrigin::Cluster,
                })
            })
            .collect();

        Detection {
            drafts,
            fallback_used: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::TaxonomyEntry;

    fn item(id: usize, text: &str) -> ContentItem {
        ContentItem::new(id.to_string(), text, "2026-03-10T00:00:00Z", "web")
    }

    fn taxonomy() -> Taxonomy {
        Taxonomy::new(vec![TaxonomyEntry::new(
            "Liquidity Markets",
            &["liquidity", "pools", "market making"],
        )])
        .unwrap()
    }

    #[test]
    fn test_small_corpus_uses_fallback() {
        let config = EngineConfig::default();
        let norm = Normalizer::default();
        let tax = taxonomy();
        let items = vec![
            item(0, "liquidity pools everywhere"),
            item(1, "more liquidity"),
            item(2, "ok"),
        ];
        let detection = ContentDetector::new(&config, &norm, &tax).detect(&items);
        assert!(detection.fallback_used);
        assert_eq!(detection.drafts.len(), 1);
        assert_eq!(detection.drafts[0].members, vec![0, 1]);
    }

    #[test]
    fn test_clusters_and_names_against_catalog() {
        let config = EngineConfig::default();
        let norm = Normalizer::default();
        let tax = taxonomy();
        let mut items: Vec<ContentItem> = (0..5)
            .map(|i| item(i, "deep liquidity pools attract market makers"))
            .collect();
        items.extend((5..10).map(|i| item(i, "validators upgrade consensus client software")));
        items.push(item(10, "short"));

        let detection = ContentDetector::new(&config, &norm, &tax).detect(&items);
        assert!(!detection.fallback_used);
        assert_eq!(detection.drafts.len(), 2);

        let liquidity = &detection.drafts[0];
        assert_eq!(liquidity.name, "Liquidity Markets");
        assert_eq!(liquidity.members, vec![0, 1, 2, 3, 4]);
        assert_eq!(liquidity.origin, DraftOrigin::Cluster);

        let validators = &detection.drafts[1];
        assert_eq!(validators.members, vec![5, 6, 7, 8, 9]);
        assert!(!validators.name.is_empty());
    }

    #[test]
    fn test_empty_input_is_empty_detection() {
        let config = EngineConfig::default();
        let norm = Normalizer::default();
        let tax = taxonomy();
        let detection = ContentDetector::new(&config, &norm, &tax).detect(&[]);
        assert!(detection.drafts.is_empty());
        assert!(!detection.fallback_used);
    }
}
