use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::keyword::KeywordProvider;
use super::AiProvider;
use crate::types::Article;
use crate::util::retry_with_backoff;
use crate::TARGET_ENRICHMENT;

/// Upper bound on tags kept per article.
pub const MAX_TAGS: usize = 15;

/// Tags shorter than this carry no signal ("el", "pe").
const MIN_TAG_CHARS: usize = 3;

/// Normalize one raw entity name into a tag: accents stripped, lowercase,
/// punctuation dropped, words joined with underscores.
pub fn normalize_tag(name: &str) -> Option<String> {
    // Enhanced apostrophe handling
    let name = name
        .replace("'s ", " ")
        .replace("'s", "")
        .replace('\'', "")
        .replace('’', "");

    let tag = name
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .replace(|c: char| !c.is_alphanumeric(), " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");

    if tag.chars().count() < MIN_TAG_CHARS {
        None
    } else {
        Some(tag)
    }
}

/// Normalize and deduplicate raw entity names, keeping first occurrences and at
/// most [`MAX_TAGS`] of them.
pub fn normalize_tags<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter_map(|name| normalize_tag(name.as_ref()))
        .filter(|tag| seen.insert(tag.clone()))
        .take(MAX_TAGS)
        .collect()
}

/// Result of extracting tags for one article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagExtraction {
    pub tags: BTreeSet<String>,
    // True when the offline lexicon had to stand in for the provider
    pub used_fallback: bool,
}

/// Turns articles into normalized tag sets, asking the AI provider first and the
/// offline lexicon when the provider is missing or fails.
pub struct TagNormalizer {
    provider: Option<Arc<dyn AiProvider>>,
    fallback: KeywordProvider,
    retries: u32,
    backoff: Duration,
}

impl TagNormalizer {
    pub fn new(provider: Option<Arc<dyn AiProvider>>, retries: u32, backoff: Duration) -> Self {
        Self {
            provider,
            fallback: KeywordProvider::new(),
            retries,
            backoff,
        }
    }

    pub async fn extract_tags(&self, article: &Article) -> TagExtraction {
        let title = article.title.as_str();
        let description = article.description_text().unwrap_or("");

        if let Some(provider) = &self.provider {
            let label = format!("Entity extraction for article {}", article.id);
            match retry_with_backoff(&label, self.retries, self.backoff, move || {
                provider.extract_entities(title, description)
            })
            .await
            {
                Ok(names) => {
                    let tags = normalize_tags(&names);
                    if !tags.is_empty() {
                        debug!(target: TARGET_ENRICHMENT, "Article {}: {} tags from {}", article.id, tags.len(), provider.name());
                        return TagExtraction {
                            tags: tags.into_iter().collect(),
                            used_fallback: false,
                        };
                    }
                    debug!(target: TARGET_ENRICHMENT, "Article {}: {} returned no usable entities", article.id, provider.name());
                }
                Err(e) => {
                    warn!(target: TARGET_ENRICHMENT, "Article {}: entity extraction failed after {} retries: {}", article.id, self.retries, e);
                }
            }
        }

        let names = self.fallback.entities_for(title, description);
        TagExtraction {
            tags: normalize_tags(&names).into_iter().collect(),
            used_fallback: true,
        }
    }
}
