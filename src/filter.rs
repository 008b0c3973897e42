use tracing::debug;

use crate::types::Article;
use crate::TARGET_ENGINE;

/// Titles shorter than this rarely describe an event.
const MIN_TITLE_CHARS: usize = 20;

const PROMOTIONAL_KEYWORDS: &[&str] = &[
    "sorteo",
    "promoción",
    "descuento",
    "oferta",
    "ganador",
    "premio",
];

/// Why an article was dropped before enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseReason {
    ShortTitle,
    Promotional,
}

/// Drops short and promotional articles before any provider is called.
#[derive(Debug, Clone)]
pub struct NoiseFilter {
    enabled: bool,
}

impl NoiseFilter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn check(&self, article: &Article) -> Option<NoiseReason> {
        if !self.enabled {
            return None;
        }

        if article.title.trim().chars().count() < MIN_TITLE_CHARS {
            return Some(NoiseReason::ShortTitle);
        }

        let text = format!(
            "{} {}",
            article.title,
            article.description.as_deref().unwrap_or("")
        )
        .to_lowercase();
        if PROMOTIONAL_KEYWORDS.iter().any(|k| text.contains(k)) {
            return Some(NoiseReason::Promotional);
        }

        None
    }

    /// Splits `articles` into the ones worth processing and the number dropped.
    pub fn retain(&self, articles: Vec<Article>) -> (Vec<Article>, usize) {
        let total = articles.len();
        let kept: Vec<Article> = articles
            .into_iter()
            .filter(|article| match self.check(article) {
                Some(reason) => {
                    debug!(target: TARGET_ENGINE, "Dropping article {} as noise: {:?}", article.id, reason);
                    false
                }
                None => true,
            })
            .collect();
        let dropped = total - kept.len();
        (kept, dropped)
    }
}
