use anyhow::{Context, Result};
use async_openai::{config::OpenAIConfig, Client as OpenAIClient};
use clap::Parser;
use ollama_rs::Ollama;
use std::path::PathBuf;
use tracing::info;

use draftmill::config::{Config, LlmBackend};
use draftmill::publisher::{DraftPublisher, MediumPublisher};
use draftmill::search::TavilySearchClient;
use draftmill::{logging, pipeline, LLMClient, LLMParams};

#[derive(Parser, Debug)]
#[clap(
    name = "draftmill",
    about = "Generate a blog post from trending search results and stage it as a Medium draft"
)]
struct Args {
    /// Run the browser headless
    #[clap(long)]
    headless: bool,

    /// Generate and save content without driving the browser
    #[clap(long)]
    skip_publish: bool,

    /// Directory under which the timestamped output bundle is created
    #[clap(long, default_value = ".")]
    output_root: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::configure_logging();
    let args = Args::parse();
    let config = Config::from_env()?;

    info!("Starting automated blog generation process");

    let search_client = TavilySearchClient::new(&config.search_api_key);

    let (llm_client, model) = match &config.llm_backend {
        LlmBackend::Ollama { host, port, model } => {
            info!("Connecting to Ollama at {}:{}", host, port);
            (
                LLMClient::Ollama(Ollama::new(host.clone(), *port)),
                model.clone(),
            )
        }
        LlmBackend::OpenAI { api_key, model } => {
            info!("Using OpenAI model {}", model);
            let openai_config = OpenAIConfig::new().with_api_key(api_key);
            (
                LLMClient::OpenAI(OpenAIClient::with_config(openai_config)),
                model.clone(),
            )
        }
    };
    let llm_params = LLMParams {
        llm_client,
        model,
        temperature: config.llm_temperature,
    };

    let publisher = if args.skip_publish {
        None
    } else {
        let email = config
            .site_email
            .clone()
            .context("MEDIUM_EMAIL environment variable required (or pass --skip-publish)")?;
        let password = config
            .site_password
            .clone()
            .context("MEDIUM_PASSWORD environment variable required (or pass --skip-publish)")?;
        Some(MediumPublisher::new(
            &config.webdriver_url,
            &email,
            &password,
            args.headless,
        ))
    };
    let publisher_ref = publisher.as_ref().map(|p| p as &dyn DraftPublisher);

    let output_dir = pipeline::run(
        &config,
        &search_client,
        &llm_params,
        publisher_ref,
        &args.output_root,
    )
    .await?;

    info!("Content saved in: {}", output_dir.display());
    Ok(())
}
