use std::collections::BTreeSet;
use tracing::debug;

use super::partition::PartitionKey;
use super::similarity::Overlap;
use crate::types::EnrichedArticle;
use crate::TARGET_ENGINE;

/// A candidate topic before corroboration is checked.
#[derive(Debug, Clone)]
pub struct Cluster {
    pub key: PartitionKey,
    /// Union of the members' tags; only ever grows.
    pub tags: BTreeSet<String>,
    /// Positions of the members in the run's enriched article list, in arrival order.
    pub members: Vec<usize>,
    pub article_ids: Vec<i64>,
    pub sources: BTreeSet<String>,
    // Taken from the founding article and never overwritten
    pub subcategory: String,
    pub theme: String,
    pub subtema: String,
    pub seed_title: String,
}

impl Cluster {
    fn seed(key: PartitionKey, index: usize, article: &EnrichedArticle) -> Self {
        Cluster {
            key,
            tags: article.tags.clone(),
            members: vec![index],
            article_ids: vec![article.article.id],
            sources: BTreeSet::from([article.article.source.clone()]),
            subcategory: article.hierarchy.subcategory.clone(),
            theme: article.hierarchy.theme.clone(),
            subtema: article.hierarchy.subtema.clone(),
            seed_title: article.article.title.clone(),
        }
    }

    fn absorb(&mut self, index: usize, article: &EnrichedArticle) {
        self.tags.extend(article.tags.iter().cloned());
        self.members.push(index);
        self.article_ids.push(article.article.id);
        self.sources.insert(article.article.source.clone());
    }

    pub fn article_count(&self) -> usize {
        self.article_ids.len()
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}

/// Greedy single-pass grouping of the articles of one partition.
///
/// Open clusters live in an arena and are addressed by position, so the order
/// they were opened in is also their tie-break order.
#[derive(Debug)]
pub struct ClusterBuilder {
    key: PartitionKey,
    clusters: Vec<Cluster>,
}

impl ClusterBuilder {
    pub fn new(key: PartitionKey) -> Self {
        Self {
            key,
            clusters: Vec::new(),
        }
    }

    /// Assigns one article to the best admissible open cluster, or opens a new
    /// one. Callers only pass articles that passed the minimum tag check.
    pub fn add(&mut self, index: usize, article: &EnrichedArticle) {
        let mut best: Option<(usize, f64)> = None;
        for (position, cluster) in self.clusters.iter().enumerate() {
            let overlap = Overlap::between(&article.tags, &cluster.tags);
            if !overlap.is_admissible() {
                continue;
            }
            // Strictly greater keeps the earliest cluster on ties
            if best.map_or(true, |(_, ratio)| overlap.ratio > ratio) {
                best = Some((position, overlap.ratio));
            }
        }

        match best {
            Some((position, ratio)) => {
                debug!(target: TARGET_ENGINE, "Article {} joins cluster {} of {} (ratio {:.3})", article.article.id, position, self.key, ratio);
                self.clusters[position].absorb(index, article);
            }
            None => {
                debug!(target: TARGET_ENGINE, "Article {} opens cluster {} of {}", article.article.id, self.clusters.len(), self.key);
                self.clusters
                    .push(Cluster::seed(self.key.clone(), index, article));
            }
        }
    }

    /// Closes the partition, returning its clusters in creation order.
    pub fn finish(self) -> Vec<Cluster> {
        self.clusters
    }
}

/// Clusters the given members of `articles` (positions, in arrival order).
pub fn build_clusters(
    key: PartitionKey,
    members: &[usize],
    articles: &[EnrichedArticle],
) -> Vec<Cluster> {
    let mut builder = ClusterBuilder::new(key);
    for &index in members {
        if let Some(article) = articles.get(index) {
            builder.add(index, article);
        }
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Article, Hierarchy};
    use chrono::NaiveDate;

    fn key() -> PartitionKey {
        PartitionKey {
            category: "Política".to_string(),
            subcategory: "Congreso".to_string(),
            locality: None,
        }
    }

    fn enriched(id: i64, source: &str, tags: &[&str]) -> EnrichedArticle {
        let article: Article = serde_json::from_value(serde_json::json!({
            "id": id,
            "title": format!("Titular {}", id),
            "source": source,
        }))
        .unwrap();

        EnrichedArticle {
            article,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            country: None,
            event_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            hierarchy: Hierarchy {
                category: "Política".to_string(),
                subcategory: "Congreso".to_string(),
                theme: format!("Tema {}", id),
                subtema: "General".to_string(),
            },
        }
    }

    #[test]
    fn test_overlapping_articles_merge() {
        let articles = vec![
            enriched(1, "x", &["a", "b", "c"]),
            enriched(2, "y", &["a", "b", "d"]),
        ];
        let clusters = build_clusters(key(), &[0, 1], &articles);

        assert_eq!(clusters.len(), 1);
        let cluster = &clusters[0];
        assert_eq!(cluster.article_ids, vec![1, 2]);
        assert_eq!(cluster.source_count(), 2);
        assert_eq!(cluster.tags.len(), 4);
        // Founding article's fields survive the merge
        assert_eq!(cluster.theme, "Tema 1");
        assert_eq!(cluster.seed_title, "Titular 1");
    }

    #[test]
    fn test_single_shared_tag_does_not_merge() {
        let articles = vec![
            enriched(1, "x", &["a", "b"]),
            enriched(2, "x", &["a", "c"]),
        ];
        let clusters = build_clusters(key(), &[0, 1], &articles);
        assert_eq!(clusters.len(), 2);
    }

    #[test]
    fn test_best_ratio_wins() {
        let articles = vec![
            enriched(1, "x", &["a", "b", "p", "q", "r", "s", "t", "u"]),
            enriched(2, "y", &["a", "b", "c"]),
            // Admissible for both; ratio 3/9 vs 3/4
            enriched(3, "z", &["a", "b", "c", "p"]),
        ];
        let clusters = build_clusters(key(), &[0, 1, 2], &articles);

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].article_ids, vec![1]);
        assert_eq!(clusters[1].article_ids, vec![2, 3]);
    }

    #[test]
    fn test_ties_go_to_earliest_cluster() {
        let articles = vec![
            enriched(1, "x", &["a", "b", "c"]),
            enriched(2, "y", &["d", "e", "f"]),
            enriched(3, "z", &["a", "b", "d", "e"]),
        ];
        let clusters = build_clusters(key(), &[0, 1, 2], &articles);

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].article_ids, vec![1, 3]);
        assert_eq!(clusters[1].article_ids, vec![2]);
    }

    #[test]
    fn test_cluster_tags_only_grow() {
        let articles = vec![
            enriched(1, "x", &["a", "b", "c"]),
            enriched(2, "x", &["a", "b", "e"]),
            enriched(3, "x", &["a", "b", "f"]),
        ];
        let mut builder = ClusterBuilder::new(key());
        let mut previous = 0;
        for (index, article) in articles.iter().enumerate() {
            builder.add(index, article);
            let size = builder.clusters[0].tags.len();
            assert!(size >= previous);
            previous = size;
        }
        let clusters = builder.finish();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].sources.len(), 1);
    }
}
