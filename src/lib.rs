pub mod article;
pub mod config;
pub mod generator;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod prompts;
pub mod publisher;
pub mod search;
pub mod selector;
pub mod webdriver;
pub mod writer;

use async_openai::{config::OpenAIConfig, Client as OpenAIClient};
use ollama_rs::Ollama;

pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_LLM_REQUEST: &str = "llm_request";
pub const TARGET_BROWSER: &str = "browser";

#[derive(Clone, Debug)]
pub enum LLMClient {
    Ollama(Ollama),
    OpenAI(OpenAIClient<OpenAIConfig>),
}

#[derive(Clone)]
pub struct LLMParams {
    pub llm_client: LLMClient,
    pub model: String,
    pub temperature: f32,
}
