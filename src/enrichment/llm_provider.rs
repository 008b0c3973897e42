use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use super::AiProvider;
use crate::llm::{extract_json_object, generate_llm_response};
use crate::prompt::{categorization_prompt, entity_extraction_prompt};
use crate::types::{Hierarchy, FALLBACK_LEVEL};
use crate::{LLMClient, LLMParams, TARGET_ENRICHMENT};

#[derive(Debug, Deserialize)]
struct EntityResponse {
    #[serde(alias = "entidades", default)]
    entities: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CategorizationResponse {
    #[serde(alias = "category", default)]
    categoria: Option<String>,
    #[serde(alias = "subcategory", default)]
    subcategoria: Option<String>,
    #[serde(alias = "theme", default)]
    tema: Option<String>,
    #[serde(alias = "subtopic", default)]
    subtema: Option<String>,
}

/// Provider backed by a chat/completion model: Ollama, or any OpenAI compatible
/// API (OpenAI itself, Groq).
pub struct LlmProvider {
    name: String,
    params: LLMParams,
}

impl LlmProvider {
    pub fn new(name: impl Into<String>, params: LLMParams) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    async fn ask(&self, prompt: &str) -> Result<String> {
        generate_llm_response(prompt, &self.params)
            .await
            .with_context(|| format!("{} returned no response", self.name))
    }
}

/// Ollama lists pulled models with an explicit tag, so `llama3` is stored as `llama3:latest`.
fn is_same_model(listed: &str, wanted: &str) -> bool {
    listed == wanted || listed.strip_suffix(":latest") == Some(wanted)
}

fn parse_entities(response: &str) -> Result<Vec<String>> {
    let json = extract_json_object(response).ok_or_else(|| anyhow!("No JSON object in entity response"))?;
    let parsed: EntityResponse =
        serde_json::from_str(json).context("Failed to parse entity response")?;

    Ok(parsed
        .entities
        .into_iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect())
}

fn parse_hierarchy(response: &str, base_category: &str) -> Result<Hierarchy> {
    let json = extract_json_object(response)
        .ok_or_else(|| anyhow!("No JSON object in categorization response"))?;
    let parsed: CategorizationResponse =
        serde_json::from_str(json).context("Failed to parse categorization response")?;

    let fallback = Hierarchy::fallback(base_category);
    let level = |value: Option<String>, default: &str| {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string())
    };

    Ok(Hierarchy {
        category: level(parsed.categoria, &fallback.category),
        subcategory: level(parsed.subcategoria, FALLBACK_LEVEL),
        theme: level(parsed.tema, FALLBACK_LEVEL),
        subtema: level(parsed.subtema, FALLBACK_LEVEL),
    })
}

#[async_trait]
impl AiProvider for LlmProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_available(&self) -> bool {
        let model = &self.params.model;
        let listed: Result<Vec<String>> = match &self.params.llm_client {
            LLMClient::Ollama(ollama) => ollama
                .list_local_models()
                .await
                .map(|models| models.into_iter().map(|m| m.name).collect::<Vec<_>>())
                .map_err(|e| anyhow!(e)),
            LLMClient::OpenAI(client) => client
                .models()
                .list()
                .await
                .map(|response| response.data.into_iter().map(|m| m.id).collect::<Vec<_>>())
                .map_err(|e| anyhow!(e)),
        };

        match listed {
            Ok(models) if models.iter().any(|m| is_same_model(m, model)) => true,
            Ok(_) => {
                warn!(target: TARGET_ENRICHMENT, "{} does not serve model {}", self.name, model);
                false
            }
            Err(e) => {
                warn!(target: TARGET_ENRICHMENT, "{} is not reachable: {}", self.name, e);
                false
            }
        }
    }

    async fn extract_entities(&self, title: &str, description: &str) -> Result<Vec<String>> {
        let prompt = entity_extraction_prompt(title, description, None);
        let response = self.ask(&prompt).await?;
        parse_entities(&response)
    }

    async fn classify(
        &self,
        title: &str,
        description: &str,
        base_category: &str,
    ) -> Result<Hierarchy> {
        let prompt = categorization_prompt(title, description, base_category);
        let response = self.ask(&prompt).await?;
        parse_hierarchy(&response, base_category)
    }
}
