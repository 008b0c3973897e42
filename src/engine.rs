use chrono::{NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::clustering::{
    article_links, build_clusters, format_tags, is_corroborated, main_image_url, priority_tier,
    score_members, synthesize_summary, synthesize_title, title_probe, Cluster, PartitionKey,
    MIN_TAGS_PER_ARTICLE,
};
use crate::config::EngineConfig;
use crate::enrichment::{AiProvider, CountryDetector, HierarchyClassifier, TagNormalizer};
use crate::filter::NoiseFilter;
use crate::types::{Article, EnrichedArticle, Topic};
use crate::TARGET_ENGINE;

/// Counters describing one run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub received: usize,
    pub discarded_noise: usize,
    pub discarded_few_tags: usize,
    /// Articles where at least one collaborator fell back to its offline answer.
    pub enrichment_fallbacks: usize,
    pub clusters_formed: usize,
    /// Articles belonging to clusters that failed the corroboration check.
    pub rejected_low_corroboration: usize,
    pub topics_emitted: usize,
}

#[derive(Debug, Default, Clone)]
pub struct EngineOutput {
    pub topics: Vec<Topic>,
    pub stats: RunStats,
}

/// Turns a snapshot of articles into corroborated topics.
pub struct TopicEngine {
    provider: Arc<dyn AiProvider>,
    config: EngineConfig,
    countries: CountryDetector,
    filter: NoiseFilter,
}

impl TopicEngine {
    pub fn new(provider: Arc<dyn AiProvider>, config: EngineConfig) -> Self {
        let filter = NoiseFilter::new(config.noise_filter);
        Self {
            provider,
            config,
            countries: CountryDetector::new(),
            filter,
        }
    }

    pub async fn run(&self, articles: Vec<Article>) -> EngineOutput {
        self.run_at(articles, Utc::now().date_naive()).await
    }

    /// Runs the engine with `today` as the event date of undated articles.
    pub async fn run_at(&self, articles: Vec<Article>, today: NaiveDate) -> EngineOutput {
        let mut stats = RunStats {
            received: articles.len(),
            ..RunStats::default()
        };
        if articles.is_empty() {
            info!(target: TARGET_ENGINE, "No articles to process");
            return EngineOutput {
                topics: Vec::new(),
                stats,
            };
        }

        let (articles, dropped) = self.filter.retain(articles);
        stats.discarded_noise = dropped;
        info!(target: TARGET_ENGINE, "Processing {} articles ({} dropped as noise)", articles.len(), dropped);

        let provider = if self.provider.is_available().await {
            Some(self.provider.clone())
        } else {
            warn!(target: TARGET_ENGINE, "Provider {} is not available, using offline fallbacks", self.provider.name());
            None
        };
        let retries = self.config.enrichment_retries;
        let backoff = self.config.retry_backoff;
        let normalizer = TagNormalizer::new(provider.clone(), retries, backoff);
        let classifier = HierarchyClassifier::new(provider, retries, backoff);

        // Enrich with bounded concurrency; `buffered` keeps arrival order
        let enriched: Vec<(EnrichedArticle, bool)> = stream::iter(articles)
            .map(|article| self.enrich(article, &normalizer, &classifier, today))
            .buffered(self.config.enrichment_concurrency.max(1))
            .collect()
            .await;

        let mut articles = Vec::with_capacity(enriched.len());
        for (article, used_fallback) in enriched {
            if used_fallback {
                stats.enrichment_fallbacks += 1;
            }
            articles.push(article);
        }
        let articles = Arc::new(articles);

        let buckets = self.partition(&articles, &mut stats);
        let clusters = cluster_buckets(buckets, &articles).await;
        stats.clusters_formed = clusters.len();

        let mut topics = Vec::new();
        for cluster in clusters {
            if !is_corroborated(&cluster) {
                debug!(target: TARGET_ENGINE, "Rejecting cluster of {} articles from {} sources in {}", cluster.article_count(), cluster.source_count(), cluster.key);
                stats.rejected_low_corroboration += cluster.article_count();
                continue;
            }
            topics.push(self.synthesize(cluster, &articles, &classifier).await);
        }
        stats.topics_emitted = topics.len();

        info!(target: TARGET_ENGINE, "Run complete: {:?}", stats);
        EngineOutput { topics, stats }
    }

    async fn enrich(
        &self,
        article: Article,
        normalizer: &TagNormalizer,
        classifier: &HierarchyClassifier,
        today: NaiveDate,
    ) -> (EnrichedArticle, bool) {
        let extraction = normalizer.extract_tags(&article).await;
        let classification = classifier
            .classify(
                &article.title,
                article.description_text().unwrap_or(""),
                &article.category,
            )
            .await;
        let country = self.countries.detect_for_article(&article);
        let event_date = article
            .published_at
            .map(|published| published.date_naive())
            .unwrap_or(today);

        let used_fallback = extraction.used_fallback || classification.used_fallback;
        let enriched = EnrichedArticle {
            article,
            tags: extraction.tags,
            country,
            event_date,
            hierarchy: classification.hierarchy,
        };
        (enriched, used_fallback)
    }

    /// Buckets eligible articles (by position) under their partition key, in
    /// arrival order.
    fn partition(
        &self,
        articles: &[EnrichedArticle],
        stats: &mut RunStats,
    ) -> BTreeMap<PartitionKey, Vec<usize>> {
        let mut buckets: BTreeMap<PartitionKey, Vec<usize>> = BTreeMap::new();
        for (index, article) in articles.iter().enumerate() {
            if article.tags.len() < MIN_TAGS_PER_ARTICLE {
                debug!(target: TARGET_ENGINE, "Article {} has {} tags, skipping", article.article.id, article.tags.len());
                stats.discarded_few_tags += 1;
                continue;
            }
            buckets
                .entry(PartitionKey::resolve(article, &self.config))
                .or_default()
                .push(index);
        }
        debug!(target: TARGET_ENGINE, "{} partitions", buckets.len());
        buckets
    }

    async fn synthesize(
        &self,
        cluster: Cluster,
        articles: &[EnrichedArticle],
        classifier: &HierarchyClassifier,
    ) -> Topic {
        let relevance = score_members(&cluster, articles);
        let summary = synthesize_summary(&cluster, articles, &relevance);

        let probe = title_probe(&cluster, articles);
        let classification = classifier.classify(&probe, "", &cluster.key.category).await;
        let named = (!classification.used_fallback).then_some(&classification.hierarchy);
        let title = synthesize_title(&cluster.seed_title, named);

        let priority = priority_tier(cluster.article_count(), cluster.source_count());
        info!(target: TARGET_ENGINE, "Topic '{}': {} articles, {} sources, priority {}", title, cluster.article_count(), cluster.source_count(), priority);

        Topic {
            title,
            summary,
            category: cluster.key.category.clone(),
            subcategory: cluster.subcategory.clone(),
            theme: cluster.theme.clone(),
            subtema: cluster.subtema.clone(),
            country: cluster.key.known_country().map(str::to_string),
            event_date: cluster.key.event_date(),
            priority,
            formatted_tags: format_tags(&cluster.tags, &cluster.key),
            main_image_url: main_image_url(&cluster, articles, &relevance),
            article_links: article_links(&cluster, articles),
            tags: cluster.tags,
            article_ids: cluster.article_ids,
            sources: cluster.sources,
            relevance,
        }
    }
}

/// Clusters every bucket on its own blocking task and returns the clusters in
/// key order, each bucket's in creation order.
async fn cluster_buckets(
    buckets: BTreeMap<PartitionKey, Vec<usize>>,
    articles: &Arc<Vec<EnrichedArticle>>,
) -> Vec<Cluster> {
    let mut tasks = JoinSet::new();
    for (position, (key, members)) in buckets.into_iter().enumerate() {
        let articles = Arc::clone(articles);
        tasks.spawn_blocking(move || (position, build_clusters(key, &members, &articles)));
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(e) => error!(target: TARGET_ENGINE, "Clustering task failed: {}", e),
        }
    }

    results.sort_by_key(|(position, _)| *position);
    results
        .into_iter()
        .flat_map(|(_, clusters)| clusters)
        .collect()
}
