//! The seam between detection strategies and the shared scorer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::item::ContentItem;

/// The strategy that produced a run's narratives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Content,
    Signal,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Signal => "signal",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a draft's member set was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DraftOrigin {
    /// A density cluster of normalized documents.
    Cluster,
    /// Catalog keyword counting; `mentions` is the summed occurrence count.
    KeywordCount { mentions: usize },
    /// Signals assigned to a catalog entry by substring.
    Catalog,
    /// Unmatched signals grouped by a shared frequent term.
    Emerging,
}

/// A named group of supporting items awaiting scores.
#[derive(Clone, Debug, PartialEq)]
pub struct NarrativeDraft {
    pub name: String,
    pub keywords: Vec<String>,
    /// Indices into the analyzed item slice, ascending.
    pub members: Vec<usize>,
    pub origin: DraftOrigin,
}

/// Output of one detection pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Detection {
    pub drafts: Vec<NarrativeDraft>,
    /// True when the vector path was skipped for keyword counting.
    pub fallback_used: bool,
}

/// Groups items into narrative drafts.
pub trait Detector {
    fn strategy(&self) -> Strategy;

    fn detect(&self, items: &[ContentItem]) -> Detection;
}
