use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::stem::stem;
use crate::stopwords::{ENGLISH, FUNCTION_WORDS};

static LINKS_MENTIONS_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"http\S+|www\.\S+|@\w+|#\w+").unwrap());
static NON_ALPHA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z\s]").unwrap());
static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());

/// Unstemmed content words of raw text: lowercase, punctuation to spaces,
/// words longer than 3 characters that are not function words.
///
/// Used where terms must remain readable (emerging names, descriptions).
pub fn raw_terms(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    NON_WORD
        .replace_all(&lowered, " ")
        .split_whitespace()
        .filter(|w| w.chars().count() > 3 && !FUNCTION_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Counts of each value, highest first; ties keep first-seen order.
pub fn most_common<I, S>(values: I, limit: usize) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for v in values {
        let v = v.as_ref();
        match counts.get_mut(v) {
            Some(c) => *c += 1,
            None => {
                counts.insert(v.to_string(), 1);
                order.push(v.to_string());
            }
        }
    }
    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|v| {
            let c = counts[&v];
            (v, c)
        })
        .collect();
    // Stable sort keeps first-seen order among equal counts.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(limit);
    ranked
}

/// Turns raw text into a canonical stemmed term sequence.
///
/// Steps run in a fixed order: lowercase, strip links/mentions/hashtags,
/// replace non-alphabetic characters with whitespace, split, drop short and
/// stop-listed tokens, stem.
#[derive(Clone, Debug)]
pub struct Normalizer {
    stop_words: HashSet<String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        let extra: Vec<String> = crate::stopwords::DOMAIN_NOISE
            .iter()
            .map(|s| s.to_string())
            .collect();
        Self::new(&extra)
    }
}

impl Normalizer {
    /// English stop words unioned with `extra` domain noise terms.
    pub fn new(extra: &[String]) -> Self {
        let mut stop_words: HashSet<String> = ENGLISH.iter().map(|s| s.to_string()).collect();
        stop_words.extend(extra.iter().map(|s| s.trim().to_lowercase()));
        Self { stop_words }
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    /// Stemmed tokens that survive filtering.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let stripped = LINKS_MENTIONS_TAGS.replace_all(&lowered, "");
        let alpha = NON_ALPHA.replace_all(&stripped, " ");
        alpha
            .split_whitespace()
            .filter(|t| t.len() > 2 && !self.is_stop_word(t))
            .map(stem)
            .collect()
    }

    /// Space-joined stemmed tokens, or an empty string.
    pub fn normalize(&self, text: &str) -> String {
        self.tokens(text).join(" ")
    }

    /// Normalized form of a catalog keyword, falling back to the lowercased
    /// keyword when normalization leaves nothing (e.g. "ai").
    pub fn normalize_keyword(&self, keyword: &str) -> String {
        let normalized = self.normalize(keyword);
        if normalized.is_empty() {
            keyword.trim().to_lowercase()
        } else {
            normalized
        }
    }
}
