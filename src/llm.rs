use anyhow::{anyhow, Result};
use async_openai::types::{
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
};
use ollama_rs::generation::completion::request::GenerationRequest;
use ollama_rs::generation::options::GenerationOptions;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::{LLMClient, LLMParams, TARGET_LLM_REQUEST};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Sends one prompt to the configured model. A single attempt: callers own the
/// retry policy.
pub async fn generate_llm_response(prompt: &str, params: &LLMParams) -> Result<String> {
    let worker_id = format!("{:?}", std::thread::current().id());

    debug!(target: TARGET_LLM_REQUEST, "Worker {}: Starting LLM response generation for prompt: {}", worker_id, prompt);

    match timeout(REQUEST_TIMEOUT, request_once(prompt, params)).await {
        Ok(Ok(response)) if !response.trim().is_empty() => {
            debug!(target: TARGET_LLM_REQUEST, "Worker {}: LLM response received: {}", worker_id, response);
            Ok(response)
        }
        Ok(Ok(_)) => {
            warn!(target: TARGET_LLM_REQUEST, "Worker {}: LLM returned an empty response", worker_id);
            Err(anyhow!("LLM returned an empty response"))
        }
        Ok(Err(e)) => {
            warn!(target: TARGET_LLM_REQUEST, "Worker {}: Error generating response: {}", worker_id, e);
            Err(e)
        }
        Err(_) => {
            warn!(target: TARGET_LLM_REQUEST, "Worker {}: LLM request timed out", worker_id);
            Err(anyhow!("LLM request timed out after {:?}", REQUEST_TIMEOUT))
        }
    }
}

async fn request_once(prompt: &str, params: &LLMParams) -> Result<String> {
    match &params.llm_client {
        LLMClient::Ollama(ollama) => {
            let mut request = GenerationRequest::new(params.model.clone(), prompt.to_string());
            request.options = Some(GenerationOptions::default().temperature(params.temperature));

            let response = ollama.generate(request).await?;
            Ok(response.response)
        }
        LLMClient::OpenAI(client) => {
            let mut builder = CreateChatCompletionRequestArgs::default();
            builder
                .model(params.model.clone())
                .temperature(params.temperature)
                .messages(vec![ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()?
                    .into()]);
            if params.require_json {
                builder.response_format(ResponseFormat::JsonObject);
            }

            let response = client.chat().create(builder.build()?).await?;
            response
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .ok_or_else(|| anyhow!("OpenAI response contained no message content"))
        }
    }
}

/// Cuts the JSON object out of an LLM answer that may carry prose or code fences around it.
pub fn extract_json_object(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&response[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_object() {
        assert_eq!(
            extract_json_object("```json\n{\"a\": 1}\n```"),
            Some("{\"a\": 1}")
        );
        assert_eq!(extract_json_object("Sure: {\"a\": {\"b\": 2}} done"), Some("{\"a\": {\"b\": 2}}"));
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }

    #[tokio::test]
    async fn test_unreachable_model_fails_without_retrying() {
        let params = LLMParams {
            llm_client: LLMClient::Ollama(ollama_rs::Ollama::new("http://127.0.0.1".to_string(), 1)),
            model: "qwen2.5:7b".to_string(),
            temperature: 0.0,
            require_json: true,
        };

        // A refused connection must surface at once rather than after internal backoff
        let result = tokio::time::timeout(
            Duration::from_secs(1),
            generate_llm_response("Hola", &params),
        )
        .await
        .expect("single attempt should not sleep");
        assert!(result.is_err());
    }
}
