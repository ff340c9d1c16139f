//! Keyword relevance scoring for advisory entries.

use crate::config::FeedConfig;
use crate::models::advisory::Advisory;

/// Keywords from each configured list that occur in an advisory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordMatches {
    /// Matched product keywords, in configured order.
    pub products: Vec<String>,
    /// Matched threat keywords, in configured order.
    pub threats: Vec<String>,
    /// Matched other keywords, in configured order.
    pub others: Vec<String>,
}

impl KeywordMatches {
    /// Collect matches against an already lowercased haystack.
    #[must_use]
    pub fn scan(config: &FeedConfig, haystack_lower: &str) -> Self {
        let pick = |keywords: &[String]| {
            keywords
                .iter()
                .filter(|keyword| haystack_lower.contains(&keyword.to_lowercase()))
                .cloned()
                .collect()
        };
        Self {
            products: pick(&config.product_keywords),
            threats: pick(&config.threat_keywords),
            others: pick(&config.other_keywords),
        }
    }

    /// A threat paired with either a product or an other keyword.
    #[must_use]
    pub fn is_relevant(&self) -> bool {
        !self.threats.is_empty() && (!self.products.is_empty() || !self.others.is_empty())
    }
}

/// Whether the advisory link falls under an excluded section.
#[must_use]
pub fn is_excluded(config: &FeedConfig, advisory: &Advisory) -> bool {
    config
        .excluded_link_fragments
        .iter()
        .any(|fragment| advisory.link.contains(fragment.as_str()))
}

/// Match keywords against the raw title and description.
#[must_use]
pub fn score(config: &FeedConfig, advisory: &Advisory) -> KeywordMatches {
    let haystack = format!("{} {}", advisory.title, advisory.description).to_lowercase();
    KeywordMatches::scan(config, &haystack)
}
