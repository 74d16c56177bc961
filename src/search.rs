use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::TARGET_WEB_REQUEST;

const SEARCH_ENDPOINT: &str = "https://api.tavily.com/search";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const RESULTS_PER_CATEGORY: u32 = 5;
const RECENCY_WINDOW_DAYS: u32 = 7;
const QUERY_PAUSE: Duration = Duration::from_secs(1);

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        SearchError::Network(err.to_string())
    }
}

/// One search hit, tagged with the topic category whose query produced it.
/// Immutable once harvested.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub content: String,
    pub url: String,
    pub score: f64,
    pub published_date: String,
    pub topic_category: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'a str,
    max_results: u32,
    days: u32,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<RawResult>,
}

#[derive(Deserialize)]
struct RawResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    published_date: String,
}

/// Seam over the search provider so harvesting is testable without the live API.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>>;
}

pub struct TavilySearchClient {
    client: reqwest::Client,
    api_key: String,
}

impl TavilySearchClient {
    pub fn new(api_key: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl SearchProvider for TavilySearchClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let body = SearchRequest {
            api_key: &self.api_key,
            query,
            search_depth: "advanced",
            max_results: RESULTS_PER_CATEGORY,
            days: RECENCY_WINDOW_DAYS,
        };

        debug!(target: TARGET_WEB_REQUEST, "Sending search request: {}", query);

        let resp = self.client.post(SEARCH_ENDPOINT).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: SearchResponse = resp.json().await?;
        debug!(target: TARGET_WEB_REQUEST, "Search returned {} results", parsed.results.len());

        Ok(parsed
            .results
            .into_iter()
            .map(|r| SearchResult {
                title: r.title,
                content: r.content,
                url: r.url,
                score: r.score,
                published_date: r.published_date,
                topic_category: String::new(),
            })
            .collect())
    }
}

/// Issues one query per topic category and flattens everything into a single
/// collection. A failed category is logged and skipped; the remaining
/// categories are still harvested. May return an empty collection, which the
/// caller must treat as fatal.
pub async fn harvest_trending(
    provider: &dyn SearchProvider,
    categories: &[String],
) -> Vec<SearchResult> {
    info!(target: TARGET_WEB_REQUEST, "Searching for trending topics across {} categories", categories.len());
    let year = chrono::Local::now().format("%Y");
    let mut all_results = Vec::new();

    for category in categories {
        if category.trim().is_empty() {
            continue;
        }

        let query = format!("{} trending news today {}", category, year);
        match provider.search(&query).await {
            Ok(results) => {
                debug!(target: TARGET_WEB_REQUEST, "{} results for category: {}", results.len(), category);
                for mut result in results {
                    result.topic_category = category.clone();
                    all_results.push(result);
                }
            }
            Err(err) => {
                warn!(target: TARGET_WEB_REQUEST, "Error searching for {}: {}", category, err);
                continue;
            }
        }

        // Pace queries to respect the provider's rate limits.
        sleep(QUERY_PAUSE).await;
    }

    info!(target: TARGET_WEB_REQUEST, "Harvested {} candidate results", all_results.len());
    all_results
}
