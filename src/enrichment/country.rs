use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::types::Article;
use crate::TARGET_ENRICHMENT;

/// Only the start of the body is scanned; later paragraphs drift to context.
const CONTENT_SCAN_CHARS: usize = 1000;

/// Country vocabulary and the words that point at each country, in priority order.
const COUNTRY_PATTERNS: &[(&str, &[&str])] = &[
    ("Perú", &["perú", "peru", "peruano", "peruana", "lima", "arequipa", "cusco"]),
    ("Chile", &["chile", "chileno", "chilena", "santiago", "boric"]),
    ("Argentina", &["argentina", "argentino", "buenos aires", "milei"]),
    ("México", &["méxico", "mexico", "mexicano", "cdmx", "amlo"]),
    ("Colombia", &["colombia", "colombiano", "bogotá", "petro"]),
    ("Brasil", &["brasil", "brasileño", "brasilia", "lula"]),
    ("Estados Unidos", &["estados unidos", "eeuu", "ee.uu", "usa", "biden", "trump"]),
    ("España", &["españa", "español", "madrid", "barcelona"]),
    ("China", &["china", "chino", "beijing", "pekín", "xi jinping"]),
    ("Rusia", &["rusia", "ruso", "moscú", "putin"]),
];

static MATCHERS: Lazy<Vec<(&'static str, Vec<Regex>)>> = Lazy::new(|| {
    COUNTRY_PATTERNS
        .iter()
        .map(|(country, patterns)| {
            let regexes = patterns
                .iter()
                .filter_map(|p| Regex::new(&format!(r"(?i)\b{}\b", regex::escape(p))).ok())
                .collect();
            (*country, regexes)
        })
        .collect()
});

/// Finds the country an article is about from a fixed vocabulary.
#[derive(Debug, Default, Clone)]
pub struct CountryDetector;

impl CountryDetector {
    pub fn new() -> Self {
        CountryDetector
    }

    /// The country with the most distinct pattern hits in `text`; ties go to the
    /// country listed first.
    pub fn detect(&self, text: &str) -> Option<String> {
        let mut best: Option<(&str, usize)> = None;

        for (country, regexes) in MATCHERS.iter() {
            let hits = regexes.iter().filter(|r| r.is_match(text)).count();
            if hits > 0 && best.map_or(true, |(_, best_hits)| hits > best_hits) {
                best = Some((*country, hits));
            }
        }

        best.map(|(country, _)| country.to_string())
    }

    /// Runs detection over the title plus the start of the body, or the
    /// description when there is no body.
    pub fn detect_for_article(&self, article: &Article) -> Option<String> {
        let body: String = match article.content.as_deref().filter(|c| !c.trim().is_empty()) {
            Some(content) => content.chars().take(CONTENT_SCAN_CHARS).collect(),
            None => article.description_text().unwrap_or("").to_string(),
        };

        let country = self.detect(&format!("{} {}", article.title, body));
        debug!(target: TARGET_ENRICHMENT, "Article {}: detected country {:?}", article.id, country);
        country
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_most_mentioned_country() {
        let detector = CountryDetector::new();
        assert_eq!(
            detector.detect("Boric se reunió en Santiago con el canciller de Chile"),
            Some("Chile".to_string())
        );
        assert_eq!(
            detector.detect("Protestas en Lima y Arequipa contra el gobierno peruano"),
            Some("Perú".to_string())
        );
    }

    #[test]
    fn test_detect_requires_word_boundaries() {
        let detector = CountryDetector::new();
        // "causa" must not count as "usa"
        assert_eq!(detector.detect("La causa del incendio sigue en estudio"), None);
    }

    #[test]
    fn test_ties_go_to_vocabulary_order() {
        let detector = CountryDetector::new();
        assert_eq!(
            detector.detect("Reunión entre Perú y Chile"),
            Some("Perú".to_string())
        );
    }

    #[test]
    fn test_detect_for_article_prefers_content() {
        let detector = CountryDetector::new();
        let article: Article = serde_json::from_value(serde_json::json!({
            "id": 3,
            "title": "Cumbre regional",
            "description": "Reunión en Madrid",
            "content": "<p>El presidente Lula llegó a Brasilia</p>",
            "source": "andina",
        }))
        .unwrap();
        assert_eq!(detector.detect_for_article(&article), Some("Brasil".to_string()));
    }
}
