use anyhow::Result;
use async_trait::async_trait;

use super::lexicon::Lexicon;
use super::normalizer::normalize_tag;
use super::AiProvider;
use crate::types::{Hierarchy, DEFAULT_CATEGORY, FALLBACK_LEVEL};

/// Lowercase words allowed inside a proper noun ("Banco Central de Reserva").
const CONNECTORS: &[&str] = &["de", "del", "la", "las", "los", "y"];

/// Offline, deterministic provider built on the shared lexicon.
///
/// Entities are the known names found in the text plus runs of capitalized
/// words; the category is guessed from keyword lists.
#[derive(Debug, Default, Clone)]
pub struct KeywordProvider;

impl KeywordProvider {
    pub fn new() -> Self {
        KeywordProvider
    }

    /// Raw entity names found in the title and description.
    pub fn entities_for(&self, title: &str, description: &str) -> Vec<String> {
        let lexicon = Lexicon::global();
        let text = format!("{} {}", title, description);
        let mut names = Vec::new();

        // Match on tag form so accents and punctuation do not matter
        if let Some(text_key) = normalize_tag(&text) {
            let text_key = format!("_{}_", text_key);
            for entity in lexicon.known_entities() {
                if let Some(entity_key) = normalize_tag(entity) {
                    if text_key.contains(&format!("_{}_", entity_key)) {
                        names.push(entity.clone());
                    }
                }
            }
        }

        names.extend(proper_noun_runs(title, lexicon));
        names.extend(proper_noun_runs(description, lexicon));
        names
    }

    fn guess_hierarchy(&self, title: &str, description: &str, base_category: &str) -> Hierarchy {
        let lexicon = Lexicon::global();
        let base = base_category.trim();

        let category = if base.is_empty() || base.eq_ignore_ascii_case(DEFAULT_CATEGORY) {
            lexicon
                .guess_category(&format!("{} {}", title, description))
                .unwrap_or(DEFAULT_CATEGORY)
                .to_string()
        } else {
            base.to_string()
        };

        let theme = proper_noun_runs(title, lexicon)
            .into_iter()
            .next()
            .unwrap_or_else(|| FALLBACK_LEVEL.to_string());

        Hierarchy {
            category,
            subcategory: FALLBACK_LEVEL.to_string(),
            theme,
            subtema: FALLBACK_LEVEL.to_string(),
        }
    }
}

/// Whether `raw` closes a sentence, looking past closing quotes and brackets.
fn ends_sentence(raw: &str) -> bool {
    raw.trim_end_matches(['"', '\'', '»', ')', ']', '”'])
        .ends_with(['.', '!', '?', '…'])
}

/// Emits the collected run. A lone word that opened a sentence is usually
/// capitalized for that reason alone ("Luego", "Detalle"), so it is kept only
/// when the lexicon knows it.
fn flush(
    current: &mut Vec<&str>,
    pending: &mut Vec<&str>,
    runs: &mut Vec<String>,
    opens_sentence: bool,
    lexicon: &Lexicon,
) {
    pending.clear();
    if current.is_empty() {
        return;
    }
    if current.len() > 1 || !opens_sentence || lexicon.is_known_entity(current[0]) {
        runs.push(current.join(" "));
    }
    current.clear();
}

/// Runs of capitalized words, skipping stopwords and other words that are only
/// capitalized because they start a sentence.
fn proper_noun_runs(text: &str, lexicon: &Lexicon) -> Vec<String> {
    let mut runs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut pending: Vec<&str> = Vec::new();
    let mut at_sentence_start = true;
    let mut opens_sentence = false;

    for raw in text.split_whitespace() {
        let word = raw.trim_matches(|c: char| !c.is_alphanumeric());
        let ends_clause = raw.ends_with(['.', ',', ';', ':', '!', '?', ')', '"', '»']);
        let sentence_start = at_sentence_start;
        at_sentence_start = ends_sentence(raw);

        if word.is_empty() {
            flush(&mut current, &mut pending, &mut runs, opens_sentence, lexicon);
            continue;
        }

        let capitalized = word.chars().next().is_some_and(char::is_uppercase);
        if capitalized && !(current.is_empty() && lexicon.is_stopword(word)) {
            if current.is_empty() {
                opens_sentence = sentence_start;
            }
            current.append(&mut pending);
            current.push(word);
        } else if !current.is_empty()
            && pending.len() < 2
            && CONNECTORS.contains(&word.to_lowercase().as_str())
        {
            pending.push(word);
        } else {
            flush(&mut current, &mut pending, &mut runs, opens_sentence, lexicon);
        }

        if ends_clause {
            flush(&mut current, &mut pending, &mut runs, opens_sentence, lexicon);
        }
    }
    flush(&mut current, &mut pending, &mut runs, opens_sentence, lexicon);

    runs
}

#[async_trait]
impl AiProvider for KeywordProvider {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn is_available(&self) -> bool {
        Lexicon::global();
        Lexicon::is_ready()
    }

    async fn extract_entities(&self, title: &str, description: &str) -> Result<Vec<String>> {
        Ok(self.entities_for(title, description))
    }

    async fn classify(
        &self,
        title: &str,
        description: &str,
        base_category: &str,
    ) -> Result<Hierarchy> {
        Ok(self.guess_hierarchy(title, description, base_category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proper_noun_runs() {
        let lexicon = Lexicon::global();
        let runs = proper_noun_runs(
            "El presidente del Banco Central de Reserva habló en Lima. Luego viajó a Cusco",
            lexicon,
        );
        assert_eq!(
            runs,
            vec![
                "Banco Central de Reserva".to_string(),
                "Lima".to_string(),
                "Cusco".to_string(),
            ]
        );
    }

    #[test]
    fn test_sentence_initial_words_need_the_lexicon() {
        let lexicon = Lexicon::global();
        assert!(proper_noun_runs("Detalle de la nota 4", lexicon).is_empty());
        assert!(proper_noun_runs("La fiscalía abrió una investigación. Ayer declaró", lexicon).is_empty());
        assert_eq!(
            proper_noun_runs("Congreso aprueba la reforma", lexicon),
            vec!["Congreso".to_string()]
        );
        assert_eq!(
            proper_noun_runs("Dina Boluarte viaja. Según Reuters, llegó a Lima", lexicon),
            vec![
                "Dina Boluarte".to_string(),
                "Reuters".to_string(),
                "Lima".to_string(),
            ]
        );
    }

    #[test]
    fn test_connectors_need_a_following_capital() {
        let lexicon = Lexicon::global();
        let runs = proper_noun_runs("Alianza Lima de nuevo gana", lexicon);
        assert_eq!(runs, vec!["Alianza Lima".to_string()]);
    }

    #[test]
    fn test_entities_include_lexicon_hits_without_accents() {
        let provider = KeywordProvider::new();
        let names = provider.entities_for("gisela valcarcel vuelve a la tv", "");
        assert!(names.contains(&"gisela valcárcel".to_string()));
    }

    #[tokio::test]
    async fn test_classify_keeps_specific_base_category() {
        let provider = KeywordProvider::new();
        let hierarchy = provider
            .classify("Congreso aprueba reforma", "", "Economía")
            .await
            .unwrap();
        assert_eq!(hierarchy.category, "Economía");
        assert_eq!(hierarchy.theme, "Congreso");
        assert_eq!(hierarchy.subtema, "General");
    }

    #[tokio::test]
    async fn test_classify_guesses_general_category() {
        let provider = KeywordProvider::new();
        let hierarchy = provider
            .classify("asalto en una agencia bancaria", "", "General")
            .await
            .unwrap();
        assert_eq!(hierarchy.category, "Seguridad");
        assert_eq!(hierarchy.theme, "General");
    }
}
