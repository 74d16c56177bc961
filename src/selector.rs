use tracing::{info, warn};

use crate::llm::TextCompleter;
use crate::prompts;
use crate::search::SearchResult;
use crate::TARGET_LLM_REQUEST;

/// Only the first N harvested results (arrival order) are offered to the model.
const MAX_CANDIDATES: usize = 20;
const TITLE_PREVIEW_CHARS: usize = 100;
const SELECTION_LABEL: &str = "Number:";

/// Numbered one-line summaries of the candidate topics, for the selection prompt.
fn candidate_listing(results: &[SearchResult]) -> Vec<String> {
    results
        .iter()
        .take(MAX_CANDIDATES)
        .enumerate()
        .map(|(i, result)| {
            let preview: String = result.title.chars().take(TITLE_PREVIEW_CHARS).collect();
            format!("{}. {}... (Score: {})", i + 1, preview, result.score)
        })
        .collect()
}

/// Extracts the 1-based choice following the `Number:` label, if any.
fn parse_selection(response: &str) -> Option<usize> {
    let after_label = response.split(SELECTION_LABEL).nth(1)?;
    let number_str = after_label.split('|').next()?.trim();
    let digits: String = number_str
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Resolves the model's free-text reply against the candidate list. A missing
/// label, malformed numeral, or out-of-range index all fall back to the
/// highest-scored result; this never panics.
pub fn choose(results: &[SearchResult], response: &str) -> Option<SearchResult> {
    let capped = &results[..results.len().min(MAX_CANDIDATES)];

    if let Some(number) = parse_selection(response) {
        if let Some(result) = number.checked_sub(1).and_then(|idx| capped.get(idx)) {
            return Some(result.clone());
        }
        warn!(target: TARGET_LLM_REQUEST, "Selection {} out of range, falling back to top score", number);
    }

    fallback_by_score(results)
}

fn fallback_by_score(results: &[SearchResult]) -> Option<SearchResult> {
    let mut best: Option<&SearchResult> = None;
    for result in results {
        match best {
            Some(current) if result.score <= current.score => {}
            _ => best = Some(result),
        }
    }
    best.cloned()
}

/// Asks the generative-text provider to pick one topic from the harvest.
/// Returns `None` only for an empty harvest; any provider or parse failure
/// degrades to the max-score fallback.
pub async fn select_best_topic(
    completer: &dyn TextCompleter,
    results: &[SearchResult],
) -> Option<SearchResult> {
    if results.is_empty() {
        return None;
    }

    info!(target: TARGET_LLM_REQUEST, "Analyzing {} topics to select the best one", results.len());
    let prompt = prompts::selection_prompt(&candidate_listing(results));

    let selected = match completer.complete(&prompt).await {
        Ok(response) => choose(results, &response),
        Err(err) => {
            warn!(target: TARGET_LLM_REQUEST, "Error selecting topic: {}", err);
            fallback_by_score(results)
        }
    };

    if let Some(ref topic) = selected {
        info!("Selected topic: {}", topic.title);
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;

    fn result(title: &str, score: f64) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            content: String::new(),
            url: String::new(),
            score,
            published_date: String::new(),
            topic_category: String::new(),
        }
    }

    #[test]
    fn picks_the_numbered_candidate() {
        let results = vec![result("A", 0.9), result("B", 0.95)];
        let chosen = choose(&results, "Number: 1 | Reason: engaging").unwrap();
        assert_eq!(chosen.title, "A");
    }

    #[test]
    fn missing_label_falls_back_to_max_score() {
        let results = vec![result("A", 0.9), result("B", 0.95)];
        let chosen = choose(&results, "I like the first one best.").unwrap();
        assert_eq!(chosen.title, "B");
    }

    #[test]
    fn out_of_range_index_falls_back_to_max_score() {
        let results = vec![result("A", 0.9), result("B", 0.95)];
        let chosen = choose(&results, "Number: 7 | Reason: oops").unwrap();
        assert_eq!(chosen.title, "B");
    }

    #[test]
    fn zero_index_falls_back_to_max_score() {
        let results = vec![result("A", 0.9), result("B", 0.95)];
        let chosen = choose(&results, "Number: 0 | Reason: off by one").unwrap();
        assert_eq!(chosen.title, "B");
    }

    #[test]
    fn non_numeric_token_falls_back_to_max_score() {
        let results = vec![result("A", 0.9), result("B", 0.95)];
        let chosen = choose(&results, "Number: first | Reason: words").unwrap();
        assert_eq!(chosen.title, "B");
    }

    #[test]
    fn score_ties_take_the_first_candidate() {
        let results = vec![result("A", 0.9), result("B", 0.9)];
        let chosen = choose(&results, "no label here").unwrap();
        assert_eq!(chosen.title, "A");
    }

    #[test]
    fn empty_results_choose_nothing() {
        assert!(choose(&[], "Number: 1").is_none());
    }

    struct FailingCompleter;

    #[async_trait]
    impl TextCompleter for FailingCompleter {
        async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
            Err(anyhow!("provider down"))
        }
    }

    struct FixedCompleter(&'static str);

    #[async_trait]
    impl TextCompleter for FixedCompleter {
        async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn provider_failure_falls_back_to_max_score() {
        let results = vec![result("A", 0.9), result("B", 0.95)];
        let chosen = select_best_topic(&FailingCompleter, &results).await.unwrap();
        assert_eq!(chosen.title, "B");
    }

    #[tokio::test]
    async fn empty_harvest_selects_nothing() {
        assert!(select_best_topic(&FailingCompleter, &[]).await.is_none());
    }

    #[tokio::test]
    async fn well_formed_response_selects_that_candidate() {
        let results = vec![result("A", 0.9), result("B", 0.95), result("C", 0.1)];
        let chosen = select_best_topic(&FixedCompleter("Number: 3 | Reason: fresh"), &results)
            .await
            .unwrap();
        assert_eq!(chosen.title, "C");
    }
}
