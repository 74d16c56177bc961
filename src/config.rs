use anyhow::{bail, Result};
use std::env;

/// Topic categories searched when `TOPIC_CATEGORIES` is not set.
pub const DEFAULT_TOPIC_CATEGORIES: &[&str] = &[
    "AI ML artificial intelligence machine learning",
    "programming software development coding",
    "technology tech trends innovation",
    "business startup entrepreneurship",
    "computer science algorithms data structures",
    "web development frontend backend",
    "data science analytics big data",
    "cybersecurity information security",
    "cloud computing AWS Azure DevOps",
    "blockchain cryptocurrency fintech",
];

/// Which generative-text backend to talk to.
#[derive(Clone, Debug)]
pub enum LlmBackend {
    Ollama {
        host: String,
        port: u16,
        model: String,
    },
    OpenAI {
        api_key: String,
        model: String,
    },
}

/// Immutable process configuration, built once from the environment and passed
/// by reference into each pipeline step. No component reads the environment
/// after startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub search_api_key: String,
    pub llm_backend: LlmBackend,
    pub llm_temperature: f32,
    pub topic_categories: Vec<String>,
    pub site_email: Option<String>,
    pub site_password: Option<String>,
    pub webdriver_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let search_api_key = match env::var("TAVILY_API_KEY") {
            Ok(key) if !key.trim().is_empty() => key,
            _ => bail!("TAVILY_API_KEY environment variable required"),
        };

        let llm_backend = match env::var("OPENAI_API_KEY") {
            Ok(api_key) if !api_key.trim().is_empty() => LlmBackend::OpenAI {
                api_key,
                model: env::var("OPENAI_MODEL").unwrap_or("gpt-4o-mini".to_string()),
            },
            _ => {
                let host = env::var("OLLAMA_HOST").unwrap_or("localhost".to_string());
                let port: u16 = env::var("OLLAMA_PORT")
                    .unwrap_or("11434".to_string())
                    .parse()
                    .unwrap_or(11434);
                let model = env::var("OLLAMA_MODEL").unwrap_or("llama2".to_string());
                LlmBackend::Ollama { host, port, model }
            }
        };

        let llm_temperature: f32 = env::var("LLM_TEMPERATURE")
            .unwrap_or("0.7".to_string())
            .parse()
            .unwrap_or(0.7);

        let mut topic_categories = get_env_var_as_vec("TOPIC_CATEGORIES", ';');
        if topic_categories.is_empty() {
            topic_categories = DEFAULT_TOPIC_CATEGORIES
                .iter()
                .map(|s| s.to_string())
                .collect();
        }

        Ok(Config {
            search_api_key,
            llm_backend,
            llm_temperature,
            topic_categories,
            site_email: env::var("MEDIUM_EMAIL").ok().filter(|v| !v.is_empty()),
            site_password: env::var("MEDIUM_PASSWORD").ok().filter(|v| !v.is_empty()),
            webdriver_url: env::var("WEBDRIVER_URL").unwrap_or("http://localhost:9515".to_string()),
        })
    }
}

/// Retrieves an environment variable and splits it into a vector of strings
/// based on a delimiter. Empty segments are dropped.
pub fn get_env_var_as_vec(var: &str, delimiter: char) -> Vec<String> {
    split_delimited(&env::var(var).unwrap_or_default(), delimiter)
}

fn split_delimited(value: &str, delimiter: char) -> Vec<String> {
    value
        .split(delimiter)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
