use anyhow::{anyhow, Context, Result};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::environment::{get_env_flag, get_env_var_as_vec, get_env_var_or, get_env_var_parsed};

/// Categories whose events are local: the place where they happen matters more
/// than the outlet reporting them.
pub const DEFAULT_COUNTRY_SENSITIVE_CATEGORIES: &[&str] = &["Seguridad", "Sociedad", "Local"];

/// Which enrichment backend the run talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ProviderKind {
    #[default]
    Ollama,
    #[value(name = "openai")]
    OpenAI,
    Groq,
    Keyword,
}

impl ProviderKind {
    /// Model used when AI_MODEL is not set.
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Ollama | ProviderKind::Keyword => "qwen2.5:7b",
            ProviderKind::OpenAI => "gpt-4o-mini",
            ProviderKind::Groq => "llama-3.3-70b-versatile",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(ProviderKind::Ollama),
            "openai" => Ok(ProviderKind::OpenAI),
            "groq" => Ok(ProviderKind::Groq),
            "keyword" | "local" => Ok(ProviderKind::Keyword),
            other => Err(anyhow!(
                "Unsupported AI provider '{}', expected ollama, openai, groq or keyword",
                other
            )),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Ollama => write!(f, "ollama"),
            ProviderKind::OpenAI => write!(f, "openai"),
            ProviderKind::Groq => write!(f, "groq"),
            ProviderKind::Keyword => write!(f, "keyword"),
        }
    }
}

/// Parses AI_PROVIDER. Unset or blank selects the default provider; anything
/// else must name a known one.
fn provider_kind_from(value: Option<String>) -> Result<ProviderKind> {
    match value {
        Some(value) if !value.trim().is_empty() => value
            .parse()
            .with_context(|| format!("Invalid AI_PROVIDER value '{}'", value)),
        _ => Ok(ProviderKind::default()),
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Connection settings for the LLM backed providers.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub ollama_host: String,
    pub ollama_port: u16,
    // None picks the provider's default model
    pub model: Option<String>,
    pub openai_api_key: Option<String>,
    // OpenAI compatible endpoint, e.g. a local gateway
    pub openai_api_base: Option<String>,
    pub groq_api_key: Option<String>,
    pub temperature: f32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            ollama_host: "http://localhost".to_string(),
            ollama_port: 11434,
            model: None,
            openai_api_key: None,
            openai_api_base: None,
            groq_api_key: None,
            temperature: 0.3,
        }
    }
}

impl ProviderConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            kind: provider_kind_from(std::env::var("AI_PROVIDER").ok())?,
            ollama_host: get_env_var_or("OLLAMA_HOST", &defaults.ollama_host),
            ollama_port: get_env_var_parsed("OLLAMA_PORT", defaults.ollama_port),
            model: non_empty_env("AI_MODEL"),
            openai_api_key: non_empty_env("OPENAI_API_KEY"),
            openai_api_base: non_empty_env("OPENAI_API_BASE"),
            groq_api_key: non_empty_env("GROQ_API_KEY"),
            temperature: get_env_var_parsed("LLM_TEMPERATURE", defaults.temperature),
        })
    }

    pub fn model_name(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.kind.default_model())
    }
}

/// Tunables of one engine run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub country_sensitive_categories: Vec<String>,
    pub enrichment_retries: u32,
    pub retry_backoff: Duration,
    pub enrichment_concurrency: usize,
    pub noise_filter: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            country_sensitive_categories: DEFAULT_COUNTRY_SENSITIVE_CATEGORIES
                .iter()
                .map(|c| c.to_string())
                .collect(),
            enrichment_retries: 2,
            retry_backoff: Duration::from_millis(500),
            enrichment_concurrency: 4,
            noise_filter: true,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let mut sensitive = get_env_var_as_vec("COUNTRY_SENSITIVE_CATEGORIES", ';');
        if sensitive.is_empty() {
            sensitive = defaults.country_sensitive_categories;
        }

        Self {
            country_sensitive_categories: sensitive,
            enrichment_retries: get_env_var_parsed("ENRICHMENT_RETRIES", defaults.enrichment_retries),
            retry_backoff: Duration::from_millis(get_env_var_parsed(
                "ENRICHMENT_BACKOFF_MS",
                defaults.retry_backoff.as_millis() as u64,
            )),
            enrichment_concurrency: get_env_var_parsed(
                "ENRICHMENT_CONCURRENCY",
                defaults.enrichment_concurrency,
            )
            .max(1),
            noise_filter: get_env_flag("NOISE_FILTER", defaults.noise_filter),
        }
    }

    pub fn is_country_sensitive(&self, category: &str) -> bool {
        let category = category.trim().to_lowercase();
        self.country_sensitive_categories
            .iter()
            .any(|c| c.trim().to_lowercase() == category)
    }
}
