use tracing::{error, info, warn};

use crate::llm::TextCompleter;
use crate::prompts;
use crate::search::SearchResult;
use crate::TARGET_LLM_REQUEST;

const CONTENT_SNIPPET_CHARS: usize = 500;

/// Generates the long-form article text. The raw completion is accepted as-is;
/// structural validation happens later in the tolerant preamble parser. A
/// failure here is fatal to the run, which the caller enforces.
pub async fn generate_article(
    completer: &dyn TextCompleter,
    topic: &SearchResult,
) -> Option<String> {
    info!("Generating blog content...");

    let snippet: String = topic.content.chars().take(CONTENT_SNIPPET_CHARS).collect();
    let prompt = prompts::article_prompt(&topic.title, &snippet);

    match completer.complete(&prompt).await {
        Ok(text) => Some(text),
        Err(err) => {
            error!(target: TARGET_LLM_REQUEST, "Error generating blog content: {}", err);
            None
        }
    }
}

/// Generates the short social post. Failure is non-fatal; the pipeline simply
/// omits the artifact.
pub async fn generate_social_post(
    completer: &dyn TextCompleter,
    blog_title: &str,
    topic_title: &str,
) -> Option<String> {
    info!("Generating social post...");

    let prompt = prompts::social_post_prompt(blog_title, topic_title);
    match completer.complete(&prompt).await {
        Ok(text) => Some(text),
        Err(err) => {
            warn!(target: TARGET_LLM_REQUEST, "Error generating social post: {}", err);
            None
        }
    }
}

/// Generates the image prompt, degrading to a deterministic template embedding
/// the blog title when the provider call fails.
pub async fn generate_image_prompt(
    completer: &dyn TextCompleter,
    blog_title: &str,
    topic_title: &str,
) -> String {
    info!("Generating image prompt...");

    let prompt = prompts::image_prompt_request(blog_title, topic_title);
    match completer.complete(&prompt).await {
        Ok(text) => text.trim().to_string(),
        Err(err) => {
            warn!(target: TARGET_LLM_REQUEST, "Error generating image prompt: {}", err);
            prompts::fallback_image_prompt(blog_title)
        }
    }
}
