use crate::detector::{DraftOrigin, NarrativeDraft};
use crate::item::ContentItem;
use crate::taxonomy::Taxonomy;

/// Keywords carried over from a catalog entry into a fallback narrative.
const FALLBACK_KEYWORDS: usize = 5;

/// Catalog keyword counting for corpora too small to cluster.
pub struct KeywordFallback<'a> {
    taxonomy: &'a Taxonomy,
    min_mentions: usize,
}

impl<'a> KeywordFallback<'a> {
    pub fn new(taxonomy: &'a Taxonomy, min_mentions: usize) -> Self {
        Self {
            taxonomy,
            min_mentions,
        }
    }

    /// One draft per catalog entry with at least `min_mentions` keyword
    /// occurrences across all items. Members are the items that mention it.
    pub fn detect(&self, items: &[ContentItem]) -> Vec<NarrativeDraft> {
        let lowered: Vec<String> = items.iter().map(|i| i.text.to_lowercase()).collect();

        let mut drafts = Vec::new();
        for entry in self.taxonomy.entries() {
            let mentions: usize = lowered.iter().map(|t| entry.occurrences_in(t)).sum();
            if mentions < self.min_mentions {
                continue;
            }
            let members: Vec<usize> = lowered
                .iter()
                .enumerate()
                .filter(|(_, t)| entry.mentioned_in(t))
                .map(|(i, _)| i)
                .collect();
            tracing::debug!(
                "fallback: '{}' with {mentions} mentions in {} items",
                entry.name,
                members.len()
            );
            drafts.push(NarrativeDraft {
                name: entry.name.clone(),
                keywords: entry.keywords.iter().take(FALLBACK_KEYWORDS).cloned().collect(),
                members,
                origin: DraftOrigin::KeywordCount { mentions },
            });
        }
        drafts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::TaxonomyEntry;

    fn item(id: &str, text: &str) -> ContentItem {
        ContentItem::new(id, text, "2026-03-10T00:00:00Z", "web")
    }

    #[test]
    fn test_emits_entries_at_mention_threshold() {
        let tax = Taxonomy::new(vec![
            TaxonomyEntry::new("DeFi", &["defi", "yield", "liquidity", "swap", "dex", "amm"]),
            TaxonomyEntry::new("Gaming", &["game"]),
        ])
        .unwrap();
        let items = vec![
            item("1", "DeFi yield is back"),
            item("2", "deep liquidity"),
            item("3", "a game"),
            item("4", "unrelated"),
        ];
        let drafts = KeywordFallback::new(&tax, 3).detect(&items);
        assert_eq!(drafts.len(), 1);
        let d = &drafts[0];
        assert_eq!(d.name, "DeFi");
        assert_eq!(d.members, vec![0, 1]);
        assert_eq!(d.keywords, vec!["defi", "yield", "liquidity", "swap", "dex"]);
        assert_eq!(d.origin, DraftOrigin::KeywordCount { mentions: 3 });
    }

    #[test]
    fn test_repeated_mentions_in_one_item_count() {
        let tax = Taxonomy::new(vec![TaxonomyEntry::new("Memes", &["meme"])]).unwrap();
        let items = vec![item("1", "meme meme meme")];
        let drafts = KeywordFallback::new(&tax, 3).detect(&items);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].members, vec![0]);
    }

    #[test]
    fn test_empty_input() {
        let tax = Taxonomy::builtin();
        assert!(KeywordFallback::new(&tax, 3).detect(&[]).is_empty());
    }
}
