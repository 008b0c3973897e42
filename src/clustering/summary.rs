use std::collections::BTreeMap;

use super::builder::Cluster;
use crate::types::{ArticleLink, EnrichedArticle, Hierarchy};
use crate::util::{
    extract_main_image_url, shorten_on_word_boundary, truncate_chars, truncate_with_ellipsis,
};

/// Maximum number of articles to consider when generating a topic summary
pub const MAX_SUMMARY_ARTICLES: usize = 3;
pub const MAX_SUMMARY_CHARS: usize = 500;
/// Length of the prefix compared when skipping repeated texts.
const DUPLICATE_PREFIX_CHARS: usize = 100;
const FALLBACK_SUMMARY_CHARS: usize = 300;

pub const MAX_SYNTHESIZED_TITLE_CHARS: usize = 200;
pub const MAX_SEED_TITLE_CHARS: usize = 120;
/// Number of member titles used to ask the classifier for a topic title.
const TITLE_PROBE_ARTICLES: usize = 3;

/// Classifier answers that say nothing about the topic.
const PLACEHOLDER_LEVELS: &[&str] = &["general", "noticias", "sin clasificar"];

/// Members (positions in `articles`) ordered by relevance, best first; equal
/// scores keep member order.
fn ranked_members(cluster: &Cluster, relevance: &BTreeMap<i64, f64>) -> Vec<(usize, i64)> {
    let mut ranked: Vec<(usize, i64)> = cluster
        .members
        .iter()
        .copied()
        .zip(cluster.article_ids.iter().copied())
        .collect();
    let score = |id: &i64| relevance.get(id).copied().unwrap_or(0.0);
    ranked.sort_by(|(_, a), (_, b)| score(b).total_cmp(&score(a)));
    ranked
}

/// Builds the topic summary from the descriptions of its most relevant articles.
pub fn synthesize_summary(
    cluster: &Cluster,
    articles: &[EnrichedArticle],
    relevance: &BTreeMap<i64, f64>,
) -> String {
    let mut summary = String::new();

    for (index, _) in ranked_members(cluster, relevance)
        .into_iter()
        .take(MAX_SUMMARY_ARTICLES)
    {
        let Some(enriched) = articles.get(index) else {
            continue;
        };
        let text = enriched
            .article
            .description_text()
            .unwrap_or_else(|| enriched.article.title.trim());
        if text.is_empty() {
            continue;
        }

        // Outlets often syndicate the same wire copy
        let prefix = truncate_chars(text, DUPLICATE_PREFIX_CHARS).to_lowercase();
        if summary.to_lowercase().contains(&prefix) {
            continue;
        }

        if !summary.is_empty() {
            summary.push(' ');
        }
        summary.push_str(text);
    }

    if summary.is_empty() {
        return truncate_chars(&cluster.seed_title, FALLBACK_SUMMARY_CHARS);
    }
    truncate_with_ellipsis(&summary, MAX_SUMMARY_CHARS)
}

/// Synthetic headline handed to the classifier when naming a topic: the three
/// longest member titles.
pub fn title_probe(cluster: &Cluster, articles: &[EnrichedArticle]) -> String {
    let mut titles: Vec<&str> = cluster
        .members
        .iter()
        .filter_map(|&index| articles.get(index))
        .map(|a| a.article.title.trim())
        .filter(|t| !t.is_empty())
        .collect();
    titles.sort_by_key(|t| std::cmp::Reverse(t.chars().count()));
    titles.truncate(TITLE_PROBE_ARTICLES);
    titles.join(". ")
}

fn is_placeholder(level: &str) -> bool {
    let level = level.trim().to_lowercase();
    level.is_empty() || PLACEHOLDER_LEVELS.contains(&level.as_str())
}

/// Topic title: `"{theme}: {subtema}"` when the classifier named both, the
/// founding article's title otherwise.
pub fn synthesize_title(seed_title: &str, classified: Option<&Hierarchy>) -> String {
    if let Some(hierarchy) = classified {
        if !is_placeholder(&hierarchy.theme) && !is_placeholder(&hierarchy.subtema) {
            let title = format!("{}: {}", hierarchy.theme.trim(), hierarchy.subtema.trim());
            return truncate_chars(&title, MAX_SYNTHESIZED_TITLE_CHARS);
        }
    }
    shorten_on_word_boundary(seed_title, MAX_SEED_TITLE_CHARS)
}

/// First image found in the bodies of the members, most relevant first.
pub fn main_image_url(
    cluster: &Cluster,
    articles: &[EnrichedArticle],
    relevance: &BTreeMap<i64, f64>,
) -> Option<String> {
    ranked_members(cluster, relevance)
        .into_iter()
        .filter_map(|(index, _)| articles.get(index))
        .filter_map(|a| a.article.content.as_deref())
        .find_map(extract_main_image_url)
}

/// Links back to every member that has a URL, in member order.
pub fn article_links(cluster: &Cluster, articles: &[EnrichedArticle]) -> Vec<ArticleLink> {
    cluster
        .members
        .iter()
        .filter_map(|&index| articles.get(index))
        .filter_map(|enriched| {
            let article = &enriched.article;
            article.url.as_ref().map(|url| ArticleLink {
                article_id: article.id,
                url: url.clone(),
                source: article.source.clone(),
                publication_date: article.published_at,
            })
        })
        .collect()
}
