pub mod country;
pub mod hierarchy;
pub mod keyword;
pub mod lexicon;
pub mod llm_provider;
pub mod normalizer;

use anyhow::{anyhow, Result};
use async_openai::{config::OpenAIConfig, Client as OpenAIClient};
use async_trait::async_trait;
use ollama_rs::Ollama;
use std::sync::Arc;
use tracing::info;

use crate::config::{ProviderConfig, ProviderKind};
use crate::types::Hierarchy;
use crate::{LLMClient, LLMParams, TARGET_ENRICHMENT};

pub use country::CountryDetector;
pub use hierarchy::HierarchyClassifier;
pub use keyword::KeywordProvider;
pub use llm_provider::LlmProvider;
pub use normalizer::{normalize_tag, normalize_tags, TagExtraction, TagNormalizer, MAX_TAGS};

/// Capability interface for the AI backends that enrich articles.
///
/// The engine only ever talks to this trait; which backend sits behind it is a
/// configuration decision.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Whether the backend can currently serve requests.
    async fn is_available(&self) -> bool;

    /// Raw entity names (people, institutions, places, events) found in the article.
    async fn extract_entities(&self, title: &str, description: &str) -> Result<Vec<String>>;

    /// Four level hierarchy for the article.
    async fn classify(
        &self,
        title: &str,
        description: &str,
        base_category: &str,
    ) -> Result<Hierarchy>;
}

/// Groq serves an OpenAI compatible API.
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Builds the provider selected by `config`.
pub fn build_provider(config: &ProviderConfig) -> Result<Arc<dyn AiProvider>> {
    let provider: Arc<dyn AiProvider> = match config.kind {
        ProviderKind::Ollama => {
            info!(target: TARGET_ENRICHMENT, "Connecting to Ollama at {}:{}", config.ollama_host, config.ollama_port);
            let client = LLMClient::Ollama(Ollama::new(config.ollama_host.clone(), config.ollama_port));
            Arc::new(LlmProvider::new("ollama", llm_params(client, config)))
        }
        ProviderKind::OpenAI => {
            let api_key = config
                .openai_api_key
                .clone()
                .ok_or_else(|| anyhow!("OPENAI_API_KEY must be set to use the openai provider"))?;
            let mut openai_config = OpenAIConfig::new().with_api_key(api_key);
            if let Some(api_base) = &config.openai_api_base {
                info!(target: TARGET_ENRICHMENT, "Using OpenAI compatible endpoint {}", api_base);
                openai_config = openai_config.with_api_base(api_base.clone());
            }
            let client = LLMClient::OpenAI(OpenAIClient::with_config(openai_config));
            Arc::new(LlmProvider::new("openai", llm_params(client, config)))
        }
        ProviderKind::Groq => {
            let api_key = config
                .groq_api_key
                .clone()
                .ok_or_else(|| anyhow!("GROQ_API_KEY must be set to use the groq provider"))?;
            let openai_config = OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base(GROQ_API_BASE);
            let client = LLMClient::OpenAI(OpenAIClient::with_config(openai_config));
            Arc::new(LlmProvider::new("groq", llm_params(client, config)))
        }
        ProviderKind::Keyword => Arc::new(KeywordProvider::new()),
    };

    info!(target: TARGET_ENRICHMENT, "Using {} enrichment provider with model {}", provider.name(), config.model_name());
    Ok(provider)
}

fn llm_params(llm_client: LLMClient, config: &ProviderConfig) -> LLMParams {
    LLMParams {
        llm_client,
        model: config.model_name().to_string(),
        temperature: config.temperature,
        require_json: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_keyword_provider() {
        let config = ProviderConfig {
            kind: ProviderKind::Keyword,
            ..ProviderConfig::default()
        };
        let provider = build_provider(&config).unwrap();
        assert_eq!(provider.name(), "keyword");
    }

    #[test]
    fn test_openai_requires_api_key() {
        let config = ProviderConfig {
            kind: ProviderKind::OpenAI,
            openai_api_key: None,
            ..ProviderConfig::default()
        };
        assert!(build_provider(&config).is_err());
    }

    #[test]
    fn test_groq_requires_api_key() {
        let config = ProviderConfig {
            kind: ProviderKind::Groq,
            openai_api_key: Some("sk-test".to_string()),
            ..ProviderConfig::default()
        };
        let err = build_provider(&config).err().unwrap();
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn test_build_groq_provider() {
        let config = ProviderConfig {
            kind: ProviderKind::Groq,
            groq_api_key: Some("gsk-test".to_string()),
            ..ProviderConfig::default()
        };
        let provider = build_provider(&config).unwrap();
        assert_eq!(provider.name(), "groq");
    }

    #[test]
    fn test_build_openai_provider_with_custom_base() {
        let config = ProviderConfig {
            kind: ProviderKind::OpenAI,
            openai_api_key: Some("sk-test".to_string()),
            openai_api_base: Some("http://localhost:8080/v1".to_string()),
            model: Some("mistral-7b".to_string()),
            ..ProviderConfig::default()
        };
        let provider = build_provider(&config).unwrap();
        assert_eq!(provider.name(), "openai");
    }
}
