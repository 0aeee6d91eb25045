//! The signal path: substring matching against the catalog, then
//! emerging-term discovery over whatever the catalog missed.

use crate::config::EngineConfig;
use crate::detector::{Detection, Detector, DraftOrigin, NarrativeDraft, Strategy};
use crate::item::ContentItem;
use crate::normalize::{most_common, raw_terms};
use crate::taxonomy::{Taxonomy, title_case};

/// Frequent terms considered when naming emerging narratives.
const EMERGING_TERMS: usize = 10;

/// A term must recur at least this often among unmatched signals.
const EMERGING_MIN_COUNT: usize = 2;

pub struct SignalDetector<'a> {
    config: &'a EngineConfig,
    taxonomy: &'a Taxonomy,
}

impl<'a> SignalDetector<'a> {
    pub fn new(config: &'a EngineConfig, taxonomy: &'a Taxonomy) -> Self {
        Self { config, taxonomy }
    }

    /// Groups unmatched signals by the first frequent term each contains.
    fn emerging(&self, items: &[ContentItem], unmatched: &[usize]) -> Vec<NarrativeDraft> {
        if unmatched.len() < self.config.min_unmatched {
            return Vec::new();
        }

        let terms = unmatched.iter().flat_map(|&i| raw_terms(&items[i].text));
        let common: Vec<String> = most_common(terms, EMERGING_TERMS)
            .into_iter()
            .filter(|(_, count)| *count >= EMERGING_MIN_COUNT)
            .map(|(term, _)| term)
            .collect();

        let mut groups: Vec<Vec<usize>> = vec![Vec::new(); common.len()];
        for &i in unmatched {
            let text = items[i].text.to_lowercase();
            if let Some(k) = common.iter().position(|term| text.contains(term.as_str())) {
                groups[k].push(i);
            }
        }

        common
            .into_iter()
            .zip(groups)
            .filter(|(_, members)| !members.is_empty())
            .map(|(term, members)| NarrativeDraft {
                name: format!("Emerging: {}", title_case(&term)),
                keywords: vec![term],
                members,
                origin: DraftOrigin::Emerging,
            })
            .collect()
    }
}

impl Detector for SignalDetector<'_> {
    fn strategy(&self) -> Strategy {
        Strategy::Signal
    }

    fn detect(&self, items: &[ContentItem]) -> Detection {
        let entries = self.taxonomy.entries();
        let mut matched: Vec<Vec<usize>> = vec![Vec::new(); entries.len()];
        let mut unmatched = Vec::new();

        for (i, item) in items.iter().enumerate() {
            let text = item.text.to_lowercase();
            match entries.iter().position(|e| e.mentioned_in(&text)) {
                Some(k) => matched[k].push(i),
                None => unmatched.push(i),
            }
        }

        let mut drafts: Vec<NarrativeDraft> = entries
            .iter()
            .zip(matched)
            .filter(|(_, members)| !members.is_empty())
            .map(|(entry, members)| NarrativeDraft {
                name: entry.name.clone(),
                keywords: entry.keywords.clone(),
                members,
                origin: DraftOrigin::Catalog,
            })
            .collect();
        drafts.extend(self.emerging(items, &unmatched));

        let before = drafts.len();
        drafts.retain(|d| d.members.len() >= self.config.min_signals);
        if drafts.len() < before {
            tracing::debug!(
                "dropped {} signal groups below {} signals",
                before - drafts.len(),
                self.config.min_signals
            );
        }

        Detection {
            drafts,
            fallback_used: false,
        }
    }
}
