pub mod clustering;
pub mod config;
pub mod engine;
pub mod enrichment;
pub mod environment;
pub mod filter;
pub mod llm;
pub mod logging;
pub mod prompt;
pub mod types;
pub mod util;

use async_openai::{config::OpenAIConfig, Client as OpenAIClient};
use ollama_rs::Ollama;

pub use engine::{EngineOutput, RunStats, TopicEngine};
pub use types::{Article, EnrichedArticle, Hierarchy, Topic};

pub const TARGET_ENGINE: &str = "engine";
pub const TARGET_ENRICHMENT: &str = "enrichment";
pub const TARGET_LLM_REQUEST: &str = "llm_request";

#[derive(Clone, Debug)]
pub enum LLMClient {
    Ollama(Ollama),
    OpenAI(OpenAIClient<OpenAIConfig>),
}

#[derive(Clone, Debug)]
pub struct LLMParams {
    pub llm_client: LLMClient,
    pub model: String,
    pub temperature: f32,
    // Ask the backend for a JSON object instead of free text
    pub require_json: bool,
}
