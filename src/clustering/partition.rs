use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::EngineConfig;
use crate::types::EnrichedArticle;

/// Country recorded for country-sensitive articles where detection found nothing.
pub const UNKNOWN_COUNTRY: &str = "unknown";

/// Where and when a local event happened.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Locality {
    pub country: String,
    pub event_date: NaiveDate,
}

/// Scope of merge candidates: only articles sharing a key are ever compared.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartitionKey {
    pub category: String,
    pub subcategory: String,
    // Only set for country-sensitive categories
    pub locality: Option<Locality>,
}

impl PartitionKey {
    /// Computes the key for an enriched article.
    ///
    /// Country-sensitive categories are split per country and event date, so two
    /// robberies in different cities on different days never merge. Everything
    /// else shares one partition per (category, subcategory), which lets global
    /// stories reported from many places come together.
    pub fn resolve(article: &EnrichedArticle, config: &EngineConfig) -> Self {
        let hierarchy = &article.hierarchy;
        let locality = if config.is_country_sensitive(&hierarchy.category) {
            Some(Locality {
                country: article
                    .country
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_COUNTRY.to_string()),
                event_date: article.event_date,
            })
        } else {
            None
        };

        PartitionKey {
            category: hierarchy.category.clone(),
            subcategory: hierarchy.subcategory.clone(),
            locality,
        }
    }

    pub fn country(&self) -> Option<&str> {
        self.locality.as_ref().map(|l| l.country.as_str())
    }

    /// Country worth showing to readers, i.e. anything but the unknown marker.
    pub fn known_country(&self) -> Option<&str> {
        self.country().filter(|c| *c != UNKNOWN_COUNTRY)
    }

    pub fn event_date(&self) -> Option<NaiveDate> {
        self.locality.as_ref().map(|l| l.event_date)
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.subcategory)?;
        if let Some(locality) = &self.locality {
            write!(f, "/{}/{}", locality.country, locality.event_date)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Article, Hierarchy};
    use std::collections::BTreeSet;

    fn enriched(category: &str, country: Option<&str>) -> EnrichedArticle {
        let article: Article = serde_json::from_value(serde_json::json!({
            "id": 1,
            "title": "Titular de prueba",
            "source": "rpp",
        }))
        .unwrap();

        EnrichedArticle {
            article,
            tags: BTreeSet::new(),
            country: country.map(str::to_string),
            event_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            hierarchy: Hierarchy {
                category: category.to_string(),
                subcategory: "Criminalidad".to_string(),
                theme: "General".to_string(),
                subtema: "General".to_string(),
            },
        }
    }

    #[test]
    fn test_sensitive_category_carries_locality() {
        let config = EngineConfig::default();
        let key = PartitionKey::resolve(&enriched("Seguridad", Some("Perú")), &config);

        assert_eq!(key.country(), Some("Perú"));
        assert_eq!(key.event_date(), NaiveDate::from_ymd_opt(2025, 3, 14));
        assert_eq!(key.to_string(), "Seguridad/Criminalidad/Perú/2025-03-14");
    }

    #[test]
    fn test_sensitive_category_without_country_uses_marker() {
        let config = EngineConfig::default();
        let key = PartitionKey::resolve(&enriched("seguridad", None), &config);

        assert_eq!(key.country(), Some(UNKNOWN_COUNTRY));
        assert_eq!(key.known_country(), None);
        assert!(key.event_date().is_some());
    }

    #[test]
    fn test_global_category_has_no_locality() {
        let config = EngineConfig::default();
        let key = PartitionKey::resolve(&enriched("Internacional", Some("China")), &config);

        assert_eq!(key.locality, None);
        assert_eq!(key.country(), None);
        assert_eq!(key.event_date(), None);
    }

    #[test]
    fn test_same_story_from_different_countries_shares_key() {
        let config = EngineConfig::default();
        let a = PartitionKey::resolve(&enriched("Deportes", Some("Perú")), &config);
        let b = PartitionKey::resolve(&enriched("Deportes", Some("Chile")), &config);
        assert_eq!(a, b);
    }
}
