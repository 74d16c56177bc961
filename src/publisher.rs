use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::webdriver::{self, Element, Locator, Session, WebDriverClient, KEY_ENTER};
use crate::TARGET_BROWSER;

const HOME_URL: &str = "https://medium.com/";
const NEW_STORY_URL: &str = "https://medium.com/new-story";
const MASK_WEBDRIVER_SCRIPT: &str =
    "Object.defineProperty(navigator, 'webdriver', {get: () => undefined})";

/// Capability interface for putting a draft post in front of a human. The
/// core pipeline only depends on this seam, so the live browser flow can be
/// swapped for a stub under test.
#[async_trait]
pub trait DraftPublisher: Send + Sync {
    async fn publish_draft(&self, title: &str, body: &str) -> Result<()>;
}

/// The browser operations the compose flow needs, mirroring the WebDriver
/// session surface.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn goto(&self, url: &str) -> webdriver::Result<()>;
    async fn wait_for_present(&self, locator: &Locator) -> webdriver::Result<Element>;
    async fn wait_for_clickable(&self, locator: &Locator) -> webdriver::Result<Element>;
    async fn click(&self, element: &Element) -> webdriver::Result<()>;
    async fn send_keys(&self, element: &Element, text: &str) -> webdriver::Result<()>;
    async fn execute(&self, script: &str) -> webdriver::Result<()>;
    async fn close(&self) -> webdriver::Result<()>;
}

#[async_trait]
impl BrowserSession for Session {
    async fn goto(&self, url: &str) -> webdriver::Result<()> {
        Session::goto(self, url).await
    }
    async fn wait_for_present(&self, locator: &Locator) -> webdriver::Result<Element> {
        Session::wait_for_present(self, locator).await
    }
    async fn wait_for_clickable(&self, locator: &Locator) -> webdriver::Result<Element> {
        Session::wait_for_clickable(self, locator).await
    }
    async fn click(&self, element: &Element) -> webdriver::Result<()> {
        Session::click(self, element).await
    }
    async fn send_keys(&self, element: &Element, text: &str) -> webdriver::Result<()> {
        Session::send_keys(self, element, text).await
    }
    async fn execute(&self, script: &str) -> webdriver::Result<()> {
        Session::execute(self, script).await.map(|_| ())
    }
    async fn close(&self) -> webdriver::Result<()> {
        Session::close(self).await
    }
}

/// Drives the Medium sign-in form and story composer over WebDriver. The
/// composed draft is intentionally left unpublished for manual review.
pub struct MediumPublisher {
    driver: WebDriverClient,
    email: String,
    password: String,
    headless: bool,
}

impl MediumPublisher {
    pub fn new(webdriver_url: &str, email: &str, password: &str, headless: bool) -> Self {
        Self {
            driver: WebDriverClient::new(webdriver_url),
            email: email.to_string(),
            password: password.to_string(),
            headless,
        }
    }
}

#[async_trait]
impl DraftPublisher for MediumPublisher {
    async fn publish_draft(&self, title: &str, body: &str) -> Result<()> {
        info!("Posting draft to Medium...");
        let session = self.driver.new_session(self.headless).await?;
        run_and_teardown(&session, &self.email, &self.password, title, body).await?;
        Ok(())
    }
}

/// Runs the compose flow, then closes the session exactly once regardless of
/// whether any step failed.
pub async fn run_and_teardown(
    session: &dyn BrowserSession,
    email: &str,
    password: &str,
    title: &str,
    body: &str,
) -> webdriver::Result<()> {
    let outcome = compose_draft(session, email, password, title, body).await;

    if let Err(err) = session.close().await {
        warn!(target: TARGET_BROWSER, "Error closing browser session: {}", err);
    }

    outcome
}

async fn compose_draft(
    session: &dyn BrowserSession,
    email: &str,
    password: &str,
    title: &str,
    body: &str,
) -> webdriver::Result<()> {
    // Mask the automation fingerprint before touching the site. Running this
    // here keeps it under the teardown guard: if it fails, the session is
    // still closed.
    session.execute(MASK_WEBDRIVER_SCRIPT).await?;

    session.goto(HOME_URL).await?;

    let sign_in_link = Locator::XPath(
        "//a[contains(text(), 'Sign in') or contains(text(), 'Sign In')]".to_string(),
    );
    let link = session.wait_for_clickable(&sign_in_link).await?;
    session.click(&link).await?;

    let email_input = session
        .wait_for_present(&Locator::field_name("email"))
        .await?;
    session.send_keys(&email_input, email).await?;

    let continue_btn = session
        .wait_for_clickable(&Locator::visible_text("button", "Continue"))
        .await?;
    session.click(&continue_btn).await?;

    let password_input = session
        .wait_for_present(&Locator::field_name("password"))
        .await?;
    session.send_keys(&password_input, password).await?;

    let sign_in_btn = session
        .wait_for_clickable(&Locator::visible_text("button", "Sign in"))
        .await?;
    session.click(&sign_in_btn).await?;

    session.goto(NEW_STORY_URL).await?;

    let title_area = session
        .wait_for_clickable(&Locator::test_id("storyTitle"))
        .await?;
    session.click(&title_area).await?;
    session.send_keys(&title_area, title).await?;

    let content_area = session
        .wait_for_clickable(&Locator::test_id("storyContent"))
        .await?;
    session.click(&content_area).await?;

    for paragraph in body.split("\n\n") {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }
        session.send_keys(&content_area, paragraph).await?;
        session.send_keys(&content_area, KEY_ENTER).await?;
        session.send_keys(&content_area, KEY_ENTER).await?;
    }

    // The publish button is deliberately not touched; the draft stays in the
    // editor for manual review.
    info!("Blog content added to Medium editor, draft left for review");
    Ok(())
}
