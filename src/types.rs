use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Category used when the snapshot does not carry one.
pub const DEFAULT_CATEGORY: &str = "General";

/// Placeholder for the lower hierarchy levels when no classification is available.
pub const FALLBACK_LEVEL: &str = "General";

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// A raw article as collected from one of the sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    // Raw HTML body, when the collector kept it
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    pub source: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl Article {
    /// Description when present and not blank.
    pub fn description_text(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

/// Four level category hierarchy attached to an article or topic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hierarchy {
    pub category: String,
    pub subcategory: String,
    pub theme: String,
    pub subtema: String,
}

impl Hierarchy {
    /// The deterministic answer used whenever no classifier can be consulted.
    pub fn fallback(base_category: &str) -> Self {
        let category = if base_category.trim().is_empty() {
            DEFAULT_CATEGORY
        } else {
            base_category.trim()
        };

        Hierarchy {
            category: category.to_string(),
            subcategory: FALLBACK_LEVEL.to_string(),
            theme: FALLBACK_LEVEL.to_string(),
            subtema: FALLBACK_LEVEL.to_string(),
        }
    }
}

/// An article together with everything the collaborators found out about it.
#[derive(Debug, Clone)]
pub struct EnrichedArticle {
    pub article: Article,
    pub tags: BTreeSet<String>,
    pub country: Option<String>,
    pub event_date: NaiveDate,
    pub hierarchy: Hierarchy,
}

/// Link back to one of the articles that make up a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleLink {
    pub article_id: i64,
    pub url: String,
    pub source: String,
    pub publication_date: Option<DateTime<Utc>>,
}

/// A validated cluster, ready to be handed to persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub title: String,
    pub summary: String,
    pub category: String,
    pub subcategory: String,
    pub theme: String,
    pub subtema: String,
    pub country: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub priority: u8,
    pub tags: BTreeSet<String>,
    pub formatted_tags: String,
    pub article_ids: Vec<i64>,
    pub sources: BTreeSet<String>,
    pub relevance: BTreeMap<i64, f64>,
    pub main_image_url: Option<String>,
    pub article_links: Vec<ArticleLink>,
}
