use anyhow::{anyhow, bail, Result};
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::article::ArticleDraft;
use crate::config::Config;
use crate::generator;
use crate::llm::TextCompleter;
use crate::publisher::DraftPublisher;
use crate::search::{self, SearchProvider};
use crate::selector;
use crate::writer::{self, OutputBundle};

/// Runs the whole pipeline: harvest, select, generate, persist, publish.
///
/// Failure tiering follows two rules: steps whose output is required
/// downstream (empty harvest, selection, article generation) abort the run;
/// everything else degrades. Publisher failure is logged and the run still
/// reports the saved bundle.
pub async fn run(
    config: &Config,
    provider: &dyn SearchProvider,
    completer: &dyn TextCompleter,
    publisher: Option<&dyn DraftPublisher>,
    output_root: &Path,
) -> Result<PathBuf> {
    let harvested = search::harvest_trending(provider, &config.topic_categories).await;
    if harvested.is_empty() {
        bail!("No trending topics found");
    }

    let selected = selector::select_best_topic(completer, &harvested)
        .await
        .ok_or_else(|| anyhow!("Could not select a topic"))?;

    let article = generator::generate_article(completer, &selected)
        .await
        .ok_or_else(|| anyhow!("Could not generate blog content"))?;

    let draft = ArticleDraft::parse(&article);
    let blog_title = draft
        .title
        .clone()
        .unwrap_or_else(|| selected.title.clone());

    let social_post = generator::generate_social_post(completer, &blog_title, &selected.title).await;
    let image_prompt = generator::generate_image_prompt(completer, &blog_title, &selected.title).await;

    let bundle = OutputBundle {
        article,
        social_post,
        image_prompt,
    };
    let output_dir = writer::save_bundle(output_root, &bundle, Local::now())?;

    if let Some(publisher) = publisher {
        if let Err(err) = publisher
            .publish_draft(draft.title_or_placeholder(), &draft.body)
            .await
        {
            warn!("Error posting draft: {}", err);
        }
    }

    info!("Process completed, content saved in {}", output_dir.display());
    Ok(output_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmBackend;
    use crate::search::{SearchError, SearchResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn config() -> Config {
        Config {
            search_api_key: "key".to_string(),
            llm_backend: LlmBackend::Ollama {
                host: "localhost".to_string(),
                port: 11434,
                model: "test".to_string(),
            },
            llm_temperature: 0.0,
            topic_categories: vec!["tech".to_string()],
            site_email: None,
            site_password: None,
            webdriver_url: "http://localhost:9515".to_string(),
        }
    }

    struct StubProvider {
        results: Vec<SearchResult>,
    }

    #[async_trait]
    impl SearchProvider for StubProvider {
        async fn search(&self, _query: &str) -> search::Result<Vec<SearchResult>> {
            if self.results.is_empty() {
                Err(SearchError::Api {
                    status: 503,
                    message: "empty".to_string(),
                })
            } else {
                Ok(self.results.clone())
            }
        }
    }

    struct CountingCompleter {
        calls: AtomicUsize,
        response: String,
    }

    impl CountingCompleter {
        fn new(response: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                response: response.to_string(),
            }
        }
    }

    #[async_trait]
    impl TextCompleter for CountingCompleter {
        async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }
    }

    #[derive(Default)]
    struct StubPublisher {
        drafts: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl DraftPublisher for StubPublisher {
        async fn publish_draft(&self, title: &str, body: &str) -> anyhow::Result<()> {
            if self.fail {
                return Err(anyhow!("browser exploded"));
            }
            self.drafts
                .lock()
                .unwrap()
                .push((title.to_string(), body.to_string()));
            Ok(())
        }
    }

    fn topic(title: &str, score: f64) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            content: "snippet".to_string(),
            url: String::new(),
            score,
            published_date: String::new(),
            topic_category: String::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn empty_harvest_aborts_before_any_generation_call() {
        let provider = StubProvider { results: vec![] };
        let completer = CountingCompleter::new("unused");
        let root = tempfile::tempdir().unwrap();

        let outcome = run(&config(), &provider, &completer, None, root.path()).await;

        assert!(outcome.is_err());
        assert_eq!(completer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn full_run_writes_bundle_and_publishes_parsed_draft() {
        let provider = StubProvider {
            results: vec![topic("Seed", 0.8)],
        };
        // One canned completion serves selection, article, social, and image
        // calls; the article parser only cares about the marker lines.
        let completer = CountingCompleter::new(
            "TITLE: Parsed Title\nMETA_DESCRIPTION: m\nKEYWORDS: k\n\nFirst body line.",
        );
        let publisher = StubPublisher::default();
        let root = tempfile::tempdir().unwrap();

        let dir = run(&config(), &provider, &completer, Some(&publisher), root.path())
            .await
            .unwrap();

        assert!(dir.join(writer::ARTICLE_FILE).exists());
        assert!(dir.join(writer::SOCIAL_POST_FILE).exists());
        assert!(dir.join(writer::IMAGE_PROMPT_FILE).exists());

        // Selection + article + social + image prompt.
        assert_eq!(completer.calls.load(Ordering::SeqCst), 4);

        let drafts = publisher.drafts.lock().unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].0, "Parsed Title");
        assert_eq!(drafts[0].1, "First body line.");
    }

    #[tokio::test(start_paused = true)]
    async fn publisher_failure_does_not_fail_the_run() {
        let provider = StubProvider {
            results: vec![topic("Seed", 0.8)],
        };
        let completer = CountingCompleter::new("TITLE: T\nKEYWORDS: k\n\nbody");
        let publisher = StubPublisher {
            fail: true,
            ..Default::default()
        };
        let root = tempfile::tempdir().unwrap();

        let outcome = run(&config(), &provider, &completer, Some(&publisher), root.path()).await;
        assert!(outcome.is_ok());
    }
}
