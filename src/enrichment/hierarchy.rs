use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::normalizer::normalize_tag;
use super::AiProvider;
use crate::config::DEFAULT_COUNTRY_SENSITIVE_CATEGORIES;
use crate::prompt::CATEGORY_TREE;
use crate::types::{Hierarchy, DEFAULT_CATEGORY, FALLBACK_LEVEL};
use crate::util::retry_with_backoff;
use crate::TARGET_ENRICHMENT;

/// Result of classifying one article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub hierarchy: Hierarchy,
    pub used_fallback: bool,
}

/// Places articles in the category -> subcategory -> theme -> subtema hierarchy.
///
/// Never fails: when the provider is missing or keeps erroring the
/// deterministic `(base_category, General, General, General)` answer is used.
pub struct HierarchyClassifier {
    provider: Option<Arc<dyn AiProvider>>,
    retries: u32,
    backoff: Duration,
}

impl HierarchyClassifier {
    pub fn new(provider: Option<Arc<dyn AiProvider>>, retries: u32, backoff: Duration) -> Self {
        Self {
            provider,
            retries,
            backoff,
        }
    }

    pub async fn classify(
        &self,
        title: &str,
        description: &str,
        base_category: &str,
    ) -> Classification {
        let Some(provider) = &self.provider else {
            return Classification {
                hierarchy: canonicalize(Hierarchy::fallback(base_category), base_category),
                used_fallback: true,
            };
        };

        let label = format!("Classification of '{}'", title.chars().take(50).collect::<String>());
        match retry_with_backoff(&label, self.retries, self.backoff, move || {
            provider.classify(title, description, base_category)
        })
        .await
        {
            Ok(hierarchy) => {
                let hierarchy = canonicalize(hierarchy, base_category);
                debug!(target: TARGET_ENRICHMENT, "{}: {:?}", label, hierarchy);
                Classification {
                    hierarchy,
                    used_fallback: false,
                }
            }
            Err(e) => {
                warn!(target: TARGET_ENRICHMENT, "{} failed, using fallback: {}", label, e);
                Classification {
                    hierarchy: canonicalize(Hierarchy::fallback(base_category), base_category),
                    used_fallback: true,
                }
            }
        }
    }
}

/// Case, accent and spacing insensitive identity of a label.
fn label_key(label: &str) -> String {
    normalize_tag(label).unwrap_or_else(|| label.trim().to_lowercase())
}

/// Maps `label` onto the first known spelling with the same key. Unknown labels
/// get one fixed casing so that variants of the same answer still coincide.
fn canonical_label<'a, I>(label: &str, known: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let key = label_key(label);
    if let Some(found) = known.into_iter().find(|k| label_key(k) == key) {
        return found.to_string();
    }

    let lowered = label.to_lowercase();
    let mut chars = lowered.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Trims every level, replaces blank ones with their fallback values and puts
/// category and subcategory in the spelling of the category tree. Partition keys
/// are built from these two levels, so "seguridad" and "Seguridad " must agree.
fn canonicalize(hierarchy: Hierarchy, base_category: &str) -> Hierarchy {
    let fallback = Hierarchy::fallback(base_category);
    let pick = |value: String, default: String| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            default
        } else {
            trimmed.to_string()
        }
    };

    let category = pick(hierarchy.category, fallback.category);
    let known_categories = CATEGORY_TREE
        .iter()
        .map(|(name, _)| *name)
        .chain(DEFAULT_COUNTRY_SENSITIVE_CATEGORIES.iter().copied())
        .chain(std::iter::once(DEFAULT_CATEGORY));
    let category = canonical_label(&category, known_categories);

    let subcategory = pick(hierarchy.subcategory, FALLBACK_LEVEL.to_string());
    let known_subcategories = CATEGORY_TREE
        .iter()
        .flat_map(|(_, subcategories)| subcategories.iter().copied())
        .chain(std::iter::once(FALLBACK_LEVEL));
    let subcategory = canonical_label(&subcategory, known_subcategories);

    Hierarchy {
        category,
        subcategory,
        theme: pick(hierarchy.theme, FALLBACK_LEVEL.to_string()),
        subtema: pick(hierarchy.subtema, FALLBACK_LEVEL.to_string()),
    }
}
