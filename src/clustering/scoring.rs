use std::collections::BTreeMap;

use super::builder::Cluster;
use crate::types::EnrichedArticle;

/// Score given to a member whose article cannot be found.
pub const MISSING_MEMBER_SCORE: f64 = 50.0;

const MAX_TAG_SCORE: f64 = 60.0;
// Neutral tag score when the cluster has no tags to compare against
const EMPTY_CLUSTER_TAG_SCORE: f64 = 30.0;
const MAX_RECENCY_SCORE: f64 = 20.0;
const MAX_COMPLETENESS_SCORE: f64 = 20.0;
/// Title plus description length at which an article counts as complete.
const COMPLETE_TEXT_CHARS: f64 = 500.0;

/// Relevance in [0, 100] of every member of `cluster`, keyed by article id.
///
/// The score mixes how much of the cluster's vocabulary the article carries,
/// how recent it is compared to the other members, and how much text it has.
pub fn score_members(cluster: &Cluster, articles: &[EnrichedArticle]) -> BTreeMap<i64, f64> {
    let ranks = recency_ranks(cluster, articles);
    let count = cluster.members.len();

    cluster
        .members
        .iter()
        .zip(&cluster.article_ids)
        .enumerate()
        .map(|(position, (&index, &id))| {
            let score = match articles.get(index) {
                Some(article) => {
                    let recency = match &ranks {
                        Some(ranks) => {
                            (1.0 - ranks[position] as f64 / count as f64) * MAX_RECENCY_SCORE
                        }
                        None => MAX_RECENCY_SCORE / 2.0,
                    };
                    let total = tag_score(cluster, article) + recency + completeness_score(article);
                    total.clamp(0.0, 100.0)
                }
                None => MISSING_MEMBER_SCORE,
            };
            (id, score)
        })
        .collect()
}

fn tag_score(cluster: &Cluster, article: &EnrichedArticle) -> f64 {
    if cluster.tags.is_empty() {
        return EMPTY_CLUSTER_TAG_SCORE;
    }
    let shared = article.tags.intersection(&cluster.tags).count();
    (shared as f64 / cluster.tags.len() as f64 * 100.0).min(MAX_TAG_SCORE)
}

fn completeness_score(article: &EnrichedArticle) -> f64 {
    let chars = article.article.title.chars().count()
        + article
            .article
            .description
            .as_deref()
            .map_or(0, |d| d.chars().count());
    (chars as f64 / COMPLETE_TEXT_CHARS).min(1.0) * MAX_COMPLETENESS_SCORE
}

/// Rank of each member (by position) when sorted newest first, or `None` when
/// no member has a timestamp. Undated members rank after every dated one, in
/// arrival order.
fn recency_ranks(cluster: &Cluster, articles: &[EnrichedArticle]) -> Option<Vec<usize>> {
    let published: Vec<_> = cluster
        .members
        .iter()
        .map(|&index| articles.get(index).and_then(|a| a.article.published_at))
        .collect();

    if published.iter().all(Option::is_none) {
        return None;
    }

    let mut order: Vec<usize> = (0..published.len()).collect();
    // Stable sort: equal timestamps keep arrival order
    order.sort_by(|&a, &b| match (published[a], published[b]) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let mut ranks = vec![0; published.len()];
    for (rank, position) in order.into_iter().enumerate() {
        ranks[position] = rank;
    }
    Some(ranks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::builder::build_clusters;
    use crate::clustering::partition::PartitionKey;
    use crate::types::{Article, Hierarchy};
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::collections::BTreeSet;

    fn enriched(id: i64, tags: &[&str], hour: Option<u32>, description: &str) -> EnrichedArticle {
        let mut article: Article = serde_json::from_value(serde_json::json!({
            "id": id,
            "title": "T",
            "description": description,
            "source": format!("fuente{}", id),
        }))
        .unwrap();
        article.published_at = hour.map(|h| Utc.with_ymd_and_hms(2025, 5, 2, h, 0, 0).unwrap());

        EnrichedArticle {
            article,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            country: None,
            event_date: NaiveDate::from_ymd_opt(2025, 5, 2).unwrap(),
            hierarchy: Hierarchy::fallback("Economía"),
        }
    }

    fn key() -> PartitionKey {
        PartitionKey {
            category: "Economía".to_string(),
            subcategory: "General".to_string(),
            locality: None,
        }
    }

    #[test]
    fn test_scores_follow_recency_and_overlap() {
        let articles = vec![
            enriched(1, &["a", "b", "c"], Some(8), ""),
            enriched(2, &["a", "b", "d"], Some(12), ""),
        ];
        let clusters = build_clusters(key(), &[0, 1], &articles);
        let scores = score_members(&clusters[0], &articles);

        // Tags: 3/4 of the cluster capped at 60. Completeness: 1 char of 500.
        let completeness = 1.0 / 500.0 * 20.0;
        assert!((scores[&2] - (60.0 + 20.0 + completeness)).abs() < 1e-9);
        assert!((scores[&1] - (60.0 + 10.0 + completeness)).abs() < 1e-9);
    }

    #[test]
    fn test_undated_members_rank_last() {
        let articles = vec![
            enriched(1, &["a", "b"], None, ""),
            enriched(2, &["a", "b"], Some(9), ""),
            enriched(3, &["a", "b"], None, ""),
        ];
        let clusters = build_clusters(key(), &[0, 1, 2], &articles);
        let ranks = recency_ranks(&clusters[0], &articles).unwrap();
        assert_eq!(ranks, vec![1, 0, 2]);
    }

    #[test]
    fn test_equal_timestamps_keep_arrival_order() {
        let articles = vec![
            enriched(1, &["a", "b"], Some(7), ""),
            enriched(2, &["a", "b"], Some(9), ""),
            enriched(3, &["a", "b"], Some(9), ""),
        ];
        let clusters = build_clusters(key(), &[0, 1, 2], &articles);
        let ranks = recency_ranks(&clusters[0], &articles).unwrap();
        assert_eq!(ranks, vec![2, 0, 1]);

        // The earlier of the tied members ranks ahead
        let scores = score_members(&clusters[0], &articles);
        assert!(scores[&2] > scores[&3]);
    }

    #[test]
    fn test_no_timestamps_gives_neutral_recency() {
        let articles = vec![
            enriched(1, &["a", "b"], None, ""),
            enriched(2, &["a", "b"], None, ""),
        ];
        let clusters = build_clusters(key(), &[0, 1], &articles);
        let scores = score_members(&clusters[0], &articles);

        let expected = 60.0 + 10.0 + 1.0 / 500.0 * 20.0;
        assert!((scores[&1] - expected).abs() < 1e-9);
        assert!((scores[&2] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_empty_cluster_tags_and_missing_members() {
        let articles = vec![enriched(1, &[], Some(1), &"x".repeat(1_000))];
        let cluster = Cluster {
            key: key(),
            tags: BTreeSet::new(),
            members: vec![0, 7],
            article_ids: vec![1, 99],
            sources: BTreeSet::from(["fuente1".to_string()]),
            subcategory: "General".to_string(),
            theme: "General".to_string(),
            subtema: "General".to_string(),
            seed_title: "T".to_string(),
        };
        let scores = score_members(&cluster, &articles);

        assert!((scores[&1] - (30.0 + 20.0 + 20.0)).abs() < 1e-9);
        assert_eq!(scores[&99], MISSING_MEMBER_SCORE);
    }

    #[test]
    fn test_scores_stay_in_range() {
        let articles: Vec<_> = (0..6)
            .map(|i| enriched(i, &["a", "b", "c"], Some(i as u32), &"y".repeat(800)))
            .collect();
        let clusters = build_clusters(key(), &[0, 1, 2, 3, 4, 5], &articles);
        for score in score_members(&clusters[0], &articles).values() {
            assert!((0.0..=100.0).contains(score));
        }
    }
}
