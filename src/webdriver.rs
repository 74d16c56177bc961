//! Minimal W3C WebDriver wire client, speaking JSON over HTTP to a local
//! chromedriver-compatible endpoint. Only the handful of commands the draft
//! publisher needs are implemented. All waiting is condition-based polling
//! with a bounded timeout; there are no fixed sleeps.

use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::TARGET_BROWSER;

/// WebDriver codepoint for the Enter key.
pub const KEY_ENTER: &str = "\u{e007}";

const ELEMENT_WAIT_TIMEOUT: Duration = Duration::from_secs(20);
const POLL_INTERVAL: Duration = Duration::from_millis(250);
const W3C_ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

pub type Result<T> = std::result::Result<T, WebDriverError>;

#[derive(Debug, thiserror::Error)]
pub enum WebDriverError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("WebDriver error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Timed out after {timeout:?} waiting for element: {locator}")]
    Timeout { locator: String, timeout: Duration },

    #[error("Unexpected WebDriver response: {0}")]
    Protocol(String),
}

impl From<reqwest::Error> for WebDriverError {
    fn from(err: reqwest::Error) -> Self {
        WebDriverError::Network(err.to_string())
    }
}

/// Element locator, lowered to a W3C location strategy.
#[derive(Clone, Debug)]
pub enum Locator {
    XPath(String),
    Css(String),
}

impl Locator {
    /// Matches `<a>` or `<button>` elements by a substring of their visible text.
    pub fn visible_text(tag: &str, text: &str) -> Self {
        Locator::XPath(format!("//{}[contains(text(), '{}')]", tag, text))
    }

    /// Matches a form field by its `name` attribute.
    pub fn field_name(name: &str) -> Self {
        Locator::Css(format!("[name='{}']", name))
    }

    /// Matches an element by its `data-testid` attribute.
    pub fn test_id(id: &str) -> Self {
        Locator::Css(format!("[data-testid='{}']", id))
    }

    fn strategy(&self) -> (&'static str, &str) {
        match self {
            Locator::XPath(value) => ("xpath", value),
            Locator::Css(value) => ("css selector", value),
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (using, value) = self.strategy();
        write!(f, "{} {}", using, value)
    }
}

/// Opaque element reference returned by the remote end.
#[derive(Clone, Debug)]
pub struct Element(pub(crate) String);

pub struct WebDriverClient {
    client: reqwest::Client,
    base_url: String,
}

impl WebDriverClient {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Starts a Chrome session configured to minimize automation
    /// fingerprinting. Anything that can fail after this point must run under
    /// a teardown guard so the session is always released.
    pub async fn new_session(&self, headless: bool) -> Result<Session> {
        let mut args = vec![
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-blink-features=AutomationControlled".to_string(),
        ];
        if headless {
            args.push("--headless=new".to_string());
        }

        let body = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": {
                        "args": args,
                        "excludeSwitches": ["enable-automation"],
                        "useAutomationExtension": false,
                    }
                }
            }
        });

        debug!(target: TARGET_BROWSER, "Creating WebDriver session at {}", self.base_url);
        let value = post_command(&self.client, &format!("{}/session", self.base_url), &body).await?;

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| WebDriverError::Protocol("missing sessionId".to_string()))?
            .to_string();

        Ok(Session {
            client: self.client.clone(),
            base_url: format!("{}/session/{}", self.base_url, session_id),
        })
    }
}

pub struct Session {
    client: reqwest::Client,
    base_url: String,
}

impl Session {
    pub async fn goto(&self, url: &str) -> Result<()> {
        debug!(target: TARGET_BROWSER, "Navigating to {}", url);
        self.post("url", json!({ "url": url })).await?;
        Ok(())
    }

    pub async fn find_element(&self, locator: &Locator) -> Result<Element> {
        let (using, value) = locator.strategy();
        let response = self
            .post("element", json!({ "using": using, "value": value }))
            .await?;

        response
            .get(W3C_ELEMENT_KEY)
            .and_then(Value::as_str)
            .map(|id| Element(id.to_string()))
            .ok_or_else(|| WebDriverError::Protocol("missing element reference".to_string()))
    }

    /// Polls until the element is present in the DOM, up to a bounded timeout.
    pub async fn wait_for_present(&self, locator: &Locator) -> Result<Element> {
        self.wait_until(locator, false).await
    }

    /// Polls until the element is present and enabled, up to a bounded timeout.
    pub async fn wait_for_clickable(&self, locator: &Locator) -> Result<Element> {
        self.wait_until(locator, true).await
    }

    async fn wait_until(&self, locator: &Locator, require_enabled: bool) -> Result<Element> {
        let deadline = Instant::now() + ELEMENT_WAIT_TIMEOUT;

        loop {
            match self.find_element(locator).await {
                Ok(element) => {
                    if !require_enabled || self.is_enabled(&element).await.unwrap_or(false) {
                        return Ok(element);
                    }
                }
                Err(WebDriverError::Network(_)) | Err(WebDriverError::Api { .. }) => {}
                Err(err) => return Err(err),
            }

            if Instant::now() >= deadline {
                return Err(WebDriverError::Timeout {
                    locator: locator.to_string(),
                    timeout: ELEMENT_WAIT_TIMEOUT,
                });
            }
            tokio::time::sleep_until(Instant::now() + POLL_INTERVAL).await;
        }
    }

    async fn is_enabled(&self, element: &Element) -> Result<bool> {
        let url = format!("{}/element/{}/enabled", self.base_url, element.0);
        let resp = self.client.get(&url).send().await?;
        let value = unwrap_value(resp).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    pub async fn click(&self, element: &Element) -> Result<()> {
        self.post(&format!("element/{}/click", element.0), json!({}))
            .await?;
        Ok(())
    }

    pub async fn send_keys(&self, element: &Element, text: &str) -> Result<()> {
        self.post(
            &format!("element/{}/value", element.0),
            json!({ "text": text }),
        )
        .await?;
        Ok(())
    }

    pub async fn execute(&self, script: &str) -> Result<Value> {
        self.post("execute/sync", json!({ "script": script, "args": [] }))
            .await
    }

    /// Ends the session and releases the browser.
    pub async fn close(&self) -> Result<()> {
        debug!(target: TARGET_BROWSER, "Deleting WebDriver session");
        let resp = self.client.delete(&self.base_url).send().await?;
        unwrap_value(resp).await?;
        Ok(())
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        post_command(
            &self.client,
            &format!("{}/{}", self.base_url, path),
            &body,
        )
        .await
    }
}

async fn post_command(client: &reqwest::Client, url: &str, body: &Value) -> Result<Value> {
    let resp = client.post(url).json(body).send().await?;
    unwrap_value(resp).await
}

/// Unwraps the `value` field of a WebDriver response, turning non-success
/// statuses into typed errors with the remote end's message.
async fn unwrap_value(resp: reqwest::Response) -> Result<Value> {
    let status = resp.status();
    let body: Value = resp
        .json()
        .await
        .map_err(|e| WebDriverError::Protocol(e.to_string()))?;

    if !status.is_success() {
        let message = body
            .pointer("/value/message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Err(WebDriverError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(body.get("value").cloned().unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locators_lower_to_w3c_strategies() {
        let locator = Locator::visible_text("a", "Sign in");
        let (using, value) = locator.strategy();
        assert_eq!(using, "xpath");
        assert_eq!(value, "//a[contains(text(), 'Sign in')]");

        let locator = Locator::field_name("email");
        let (using, value) = locator.strategy();
        assert_eq!(using, "css selector");
        assert_eq!(value, "[name='email']");

        let locator = Locator::test_id("storyTitle");
        let (using, value) = locator.strategy();
        assert_eq!(using, "css selector");
        assert_eq!(value, "[data-testid='storyTitle']");
    }
}
