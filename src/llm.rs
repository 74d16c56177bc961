use anyhow::{anyhow, Result};
use async_openai::types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs};
use async_trait::async_trait;
use ollama_rs::generation::completion::request::GenerationRequest;
use ollama_rs::generation::options::GenerationOptions;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

use crate::{LLMClient, LLMParams, TARGET_LLM_REQUEST};

const COMPLETION_TIMEOUT: Duration = Duration::from_secs(120);

/// Seam over the generative-text provider. Each pipeline call is a single
/// stateless prompt/response exchange; there is no retry policy.
#[async_trait]
pub trait TextCompleter: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
impl TextCompleter for LLMParams {
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(target: TARGET_LLM_REQUEST, "Sending completion request with model {}", self.model);

        let response = match &self.llm_client {
            LLMClient::Ollama(ollama) => {
                let mut request = GenerationRequest::new(self.model.clone(), prompt.to_string());
                request.options =
                    Some(GenerationOptions::default().temperature(self.temperature));

                match timeout(COMPLETION_TIMEOUT, ollama.generate(request)).await {
                    Ok(Ok(response)) => response.response,
                    Ok(Err(e)) => return Err(anyhow!("Error generating response: {}", e)),
                    Err(_) => return Err(anyhow!("LLM request timed out")),
                }
            }
            LLMClient::OpenAI(client) => {
                let request = CreateChatCompletionRequestArgs::default()
                    .model(&self.model)
                    .temperature(self.temperature)
                    .messages([ChatCompletionRequestUserMessageArgs::default()
                        .content(prompt)
                        .build()?
                        .into()])
                    .build()?;

                match timeout(COMPLETION_TIMEOUT, client.chat().create(request)).await {
                    Ok(Ok(response)) => response
                        .choices
                        .into_iter()
                        .next()
                        .and_then(|choice| choice.message.content)
                        .ok_or_else(|| anyhow!("No response choices returned"))?,
                    Ok(Err(e)) => return Err(anyhow!("Error generating response: {}", e)),
                    Err(_) => return Err(anyhow!("LLM request timed out")),
                }
            }
        };

        if response.trim().is_empty() {
            return Err(anyhow!("Empty response from LLM"));
        }

        debug!(target: TARGET_LLM_REQUEST, "Received {} byte completion", response.len());
        Ok(response)
    }
}
