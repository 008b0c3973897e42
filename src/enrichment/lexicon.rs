use once_cell::sync::OnceCell;
use std::collections::HashSet;
use tracing::debug;

use super::normalizer::normalize_tag;
use crate::TARGET_ENRICHMENT;

/// Well-known entities looked up verbatim when no AI backend answers.
const KNOWN_ENTITIES: &[&str] = &[
    // Politics
    "dina boluarte",
    "pedro castillo",
    "keiko fujimori",
    "donald trump",
    "joe biden",
    "congreso",
    "jne",
    "onpe",
    // Sport
    "paolo guerrero",
    "lionel messi",
    "alianza lima",
    "universitario",
    "sporting cristal",
    "selección peruana",
    // Entertainment
    "magaly medina",
    "gisela valcárcel",
    // Events
    "mundial",
    "copa américa",
    "miss universo",
];

const SPANISH_STOPWORDS: &[&str] = &[
    "a", "al", "ante", "bajo", "con", "contra", "de", "del", "desde", "durante", "e", "el",
    "ella", "ellos", "en", "entre", "es", "esta", "este", "esto", "fue", "ha", "han", "hasta",
    "hay", "la", "las", "lo", "los", "mas", "más", "muy", "ni", "no", "o", "para", "pero",
    "por", "que", "qué", "se", "según", "ser", "si", "sin", "sobre", "son", "su", "sus",
    "tras", "u", "un", "una", "uno", "unos", "unas", "y", "ya", "así", "cómo", "como",
    "cuando", "dónde", "donde", "hoy", "ayer", "mañana", "tras", "también", "otro", "otra",
];

/// Keyword lists used for the offline category guess, checked in order.
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Política",
        &[
            "congreso", "presidente", "presidenta", "ministr", "legisl", "gobierno", "elecciones",
            "boluarte", "castillo", "fujimori",
        ],
    ),
    (
        "Economía",
        &[
            "economía", "dólar", "inflación", "banco central", "bcr", "mercado", "inversión",
            "exportación", "pbi", "sunat",
        ],
    ),
    (
        "Seguridad",
        &[
            "crimen", "delincuencia", "robo", "asalto", "policía", "extorsión", "secuestro",
            "asesinato", "homicidio", "sismo", "accidente",
        ],
    ),
    (
        "Deportes",
        &[
            "fútbol", "deporte", "selección", "alianza", "universitario", "cristal", "copa",
            "mundial", "liga", "gol", "jugador",
        ],
    ),
    (
        "Salud",
        &[
            "salud", "hospital", "médico", "enfermedad", "vacuna", "minsa", "essalud", "pandemia",
            "dengue",
        ],
    ),
    (
        "Educación",
        &[
            "educación", "universidad", "colegio", "estudiante", "profesor", "minedu", "admisión",
        ],
    ),
    (
        "Internacional",
        &[
            "internacional", "eeuu", "estados unidos", "china", "europa", "rusia", "brasil",
            "argentina", "venezuela",
        ],
    ),
];

/// Linguistic resources shared by the offline enrichment code.
#[derive(Debug)]
pub struct Lexicon {
    known_entities: Vec<String>,
    // Tag form of every known entity
    entity_keys: HashSet<String>,
    stopwords: HashSet<String>,
}

static LEXICON: OnceCell<Lexicon> = OnceCell::new();

impl Lexicon {
    fn load() -> Self {
        debug!(target: TARGET_ENRICHMENT, "Loading lexicon: {} entities, {} stopwords", KNOWN_ENTITIES.len(), SPANISH_STOPWORDS.len());
        Lexicon {
            known_entities: KNOWN_ENTITIES.iter().map(|e| e.to_string()).collect(),
            entity_keys: KNOWN_ENTITIES.iter().filter_map(|e| normalize_tag(e)).collect(),
            stopwords: SPANISH_STOPWORDS.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// The process-wide lexicon, loaded on first use.
    pub fn global() -> &'static Lexicon {
        LEXICON.get_or_init(Lexicon::load)
    }

    /// Whether the lexicon has been loaded already.
    pub fn is_ready() -> bool {
        LEXICON.get().is_some()
    }

    pub fn known_entities(&self) -> &[String] {
        &self.known_entities
    }

    /// Whether `name` is a known entity, ignoring case and accents.
    pub fn is_known_entity(&self, name: &str) -> bool {
        normalize_tag(name).is_some_and(|key| self.entity_keys.contains(&key))
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(&word.to_lowercase())
    }

    /// Category whose keywords appear first in `text`, in list order.
    pub fn guess_category(&self, text: &str) -> Option<&'static str> {
        let text = text.to_lowercase();
        CATEGORY_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
            .map(|(category, _)| *category)
    }
}
