//! Headless Chromium acquisition
//!
//! A [`BrowserSession`] owns one Chromium process and the task pumping its
//! CDP events. [`BrowserFetcher`] launches a session per request through
//! [`BrowserFetcher::with_session`], which closes it again on every path;
//! a session dropped without being closed still aborts its event task.

use crate::agent::UserAgentPool;
use crate::error::FetchError;
use crate::options::{FetchOptions, Interaction, ScrollDirection, WaitUntil};
use crate::{Fetcher, InteractiveFetcher};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const SCRIPT_SETTLE: Duration = Duration::from_millis(500);
const SCROLL_STEP_PX: i32 = 1000;
const SCROLL_PAUSE: Duration = Duration::from_millis(300);
const NETWORK_QUIET: Duration = Duration::from_millis(500);
const SELECTOR_GRACE: Duration = Duration::from_secs(5);

/// Launch settings for [`BrowserFetcher`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Run without a visible window
    pub headless: bool,
    /// Proxy server passed to Chromium (`http://host:port`)
    pub proxy: Option<String>,
    /// Chromium binary; detected when unset
    pub executable: Option<PathBuf>,
    /// Disable the Chromium sandbox (needed in some containers)
    pub no_sandbox: bool,
    /// Pause between scripted interactions, in milliseconds
    pub interaction_pause_ms: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            proxy: None,
            executable: None,
            no_sandbox: false,
            interaction_pause_ms: 1000,
        }
    }
}

impl BrowserSettings {
    fn to_config(&self) -> Result<BrowserConfig, FetchError> {
        let mut builder = BrowserConfig::builder().window_size(1920, 1080);

        if !self.headless {
            builder = builder.with_head();
        }
        if self.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(proxy) = &self.proxy {
            builder = builder.arg(format!("--proxy-server={}", proxy));
        }
        if let Some(executable) = &self.executable {
            builder = builder.chrome_executable(executable);
        }

        builder.build().map_err(FetchError::Launch)
    }
}

/// A running Chromium instance
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    agents: Arc<UserAgentPool>,
    interaction_pause: Duration,
}

impl BrowserSession {
    /// Launch Chromium
    pub async fn launch(settings: &BrowserSettings, agents: Arc<UserAgentPool>) -> Result<Self, FetchError> {
        info!(headless = settings.headless, "Launching browser");
        let (browser, mut handler) = Browser::launch(settings.to_config()?)
            .await
            .map_err(|e| FetchError::Launch(e.to_string()))?;

        // Spawn handler to process browser events
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser,
            handler,
            agents,
            interaction_pause: Duration::from_millis(settings.interaction_pause_ms),
        })
    }

    /// Load `url` and return the rendered HTML
    ///
    /// Waits for `options.wait_for` (up to the settle time plus five seconds)
    /// or for the fixed settle time, then runs the optional script and takes
    /// the optional screenshot.
    pub async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<String, FetchError> {
        let page = self.open(url).await?;
        let outcome = self.render(&page, url, options).await;
        close_page(page).await;
        outcome
    }

    /// Load `url`, perform `interactions` in order, and return the resulting HTML
    pub async fn fetch_with_interaction(
        &self,
        url: &str,
        interactions: &[Interaction],
        options: &FetchOptions,
    ) -> Result<String, FetchError> {
        let page = self.open(url).await?;
        let outcome = self.interact(&page, url, interactions, options).await;
        close_page(page).await;
        outcome
    }

    /// Shut Chromium down
    pub async fn close(mut self) -> Result<(), FetchError> {
        debug!("Closing browser");
        self.browser
            .close()
            .await
            .map_err(|e| FetchError::browser("about:blank", e))?;
        let _ = self.browser.wait().await;
        Ok(())
    }

    async fn open(&self, url: &str) -> Result<Page, FetchError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::browser(url, e))?;

        let agent = self.agents.agent();
        if let Err(e) = page.set_user_agent(SetUserAgentOverrideParams::new(agent)).await {
            close_page(page).await;
            return Err(FetchError::browser(url, e));
        }
        Ok(page)
    }

    async fn render(&self, page: &Page, url: &str, options: &FetchOptions) -> Result<String, FetchError> {
        navigate(page, url, options.wait_until, options.navigation_timeout()).await?;

        match &options.wait_for {
            Some(selector) => wait_for_selector(page, url, selector, options.wait_time() + SELECTOR_GRACE).await?,
            None => tokio::time::sleep(options.wait_time()).await,
        }

        if let Some(script) = &options.execute_script {
            debug!(url = %url, "Executing page script");
            page.evaluate(script.as_str())
                .await
                .map_err(|e| FetchError::browser(url, e))?;
            tokio::time::sleep(SCRIPT_SETTLE).await;
        }

        if let Some(path) = &options.screenshot {
            page.save_screenshot(ScreenshotParams::builder().full_page(true).build(), path)
                .await
                .map_err(|e| FetchError::browser(url, e))?;
            debug!(path = %path.display(), "Saved screenshot");
        }

        page.content().await.map_err(|e| FetchError::browser(url, e))
    }

    async fn interact(
        &self,
        page: &Page,
        url: &str,
        interactions: &[Interaction],
        options: &FetchOptions,
    ) -> Result<String, FetchError> {
        navigate(page, url, WaitUntil::NetworkIdle, options.navigation_timeout()).await?;

        for interaction in interactions {
            debug!(url = %url, ?interaction, "Performing interaction");
            match interaction {
                Interaction::Click { selector } => {
                    page.find_element(selector.as_str())
                        .await
                        .map_err(|e| FetchError::browser(url, format!("element '{}' not found: {}", selector, e)))?
                        .click()
                        .await
                        .map_err(|e| FetchError::browser(url, format!("click on '{}' failed: {}", selector, e)))?;
                }
                Interaction::Fill { selector, value } => {
                    let element = page
                        .find_element(selector.as_str())
                        .await
                        .map_err(|e| FetchError::browser(url, format!("element '{}' not found: {}", selector, e)))?;
                    element
                        .click()
                        .await
                        .map_err(|e| FetchError::browser(url, e))?
                        .type_str(value)
                        .await
                        .map_err(|e| FetchError::browser(url, format!("typing into '{}' failed: {}", selector, e)))?;
                }
                Interaction::Scroll { direction, times } => {
                    let dy = match direction {
                        ScrollDirection::Down => SCROLL_STEP_PX,
                        ScrollDirection::Up => -SCROLL_STEP_PX,
                    };
                    for _ in 0..*times {
                        page.evaluate(format!("window.scrollBy(0, {})", dy))
                            .await
                            .map_err(|e| FetchError::browser(url, e))?;
                        tokio::time::sleep(SCROLL_PAUSE).await;
                    }
                }
                Interaction::Wait { ms } => tokio::time::sleep(Duration::from_millis(*ms)).await,
            }

            tokio::time::sleep(self.interaction_pause).await;
        }

        page.content().await.map_err(|e| FetchError::browser(url, e))
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

async fn close_page(page: Page) {
    if let Err(e) = page.close().await {
        debug!(error = %e, "Failed to close page");
    }
}

/// Navigate, retrying once without the idle wait when a `networkidle` load fails
async fn navigate(page: &Page, url: &str, wait_until: WaitUntil, timeout: Duration) -> Result<(), FetchError> {
    match navigate_once(page, url, wait_until, timeout).await {
        Err(e) if wait_until == WaitUntil::NetworkIdle => {
            warn!(url = %url, error = %e, "networkidle navigation failed, retrying with domcontentloaded");
            navigate_once(page, url, WaitUntil::DomContentLoaded, timeout).await
        }
        outcome => outcome,
    }
}

async fn navigate_once(page: &Page, url: &str, wait_until: WaitUntil, timeout: Duration) -> Result<(), FetchError> {
    let started = Instant::now();
    debug!(url = %url, ?wait_until, "Navigating");

    tokio::time::timeout(timeout, page.goto(url))
        .await
        .map_err(|_| FetchError::Timeout {
            what: format!("navigation to {}", url),
            waited_ms: timeout.as_millis() as u64,
        })?
        .map_err(|e| FetchError::browser(url, e))?;

    match wait_until {
        WaitUntil::DomContentLoaded => Ok(()),
        WaitUntil::Load => {
            poll_until(timeout.saturating_sub(started.elapsed()), "load event", move || async move {
                page.evaluate("document.readyState")
                    .await
                    .ok()
                    .and_then(|r| r.into_value::<String>().ok())
                    .is_some_and(|state| state == "complete")
            })
            .await
        }
        WaitUntil::NetworkIdle => wait_for_network_idle(page, timeout.saturating_sub(started.elapsed())).await,
    }
}

/// Wait until the page has started no new resource loads for [`NETWORK_QUIET`]
async fn wait_for_network_idle(page: &Page, timeout: Duration) -> Result<(), FetchError> {
    let deadline = Instant::now() + timeout;
    let mut last_count = None;
    let mut quiet_since = Instant::now();

    loop {
        let count = page
            .evaluate("performance.getEntriesByType('resource').length")
            .await
            .ok()
            .and_then(|r| r.into_value::<u64>().ok());

        if count != last_count {
            last_count = count;
            quiet_since = Instant::now();
        } else if count.is_some() && quiet_since.elapsed() >= NETWORK_QUIET {
            return Ok(());
        }

        if Instant::now() >= deadline {
            return Err(FetchError::Timeout {
                what: "network idle".to_string(),
                waited_ms: timeout.as_millis() as u64,
            });
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

async fn wait_for_selector(page: &Page, url: &str, selector: &str, timeout: Duration) -> Result<(), FetchError> {
    debug!(url = %url, selector, "Waiting for selector");
    poll_until(timeout, &format!("selector '{}'", selector), move || async move {
        page.find_element(selector).await.is_ok()
    })
    .await
}

async fn poll_until<F, Fut>(timeout: Duration, what: &str, mut check: F) -> Result<(), FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if check().await {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(FetchError::Timeout {
                what: what.to_string(),
                waited_ms: timeout.as_millis() as u64,
            });
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Fetcher that renders pages in headless Chromium
///
/// Each fetch launches a fresh browser and closes it afterwards.
pub struct BrowserFetcher {
    settings: BrowserSettings,
    agents: Arc<UserAgentPool>,
}

impl BrowserFetcher {
    /// Create a fetcher
    pub fn new(agents: Arc<UserAgentPool>, settings: BrowserSettings) -> Self {
        Self { settings, agents }
    }

    /// Launch settings
    pub fn settings(&self) -> &BrowserSettings {
        &self.settings
    }

    /// Run `f` against a freshly launched session, then close it
    ///
    /// The session is closed whether `f` succeeds or fails; a failure to
    /// close is logged, not returned.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use harvest_fetch::{BrowserFetcher, BrowserSettings, FetchOptions, UserAgentPool};
    /// use std::sync::Arc;
    ///
    /// # async fn example() -> Result<(), harvest_fetch::FetchError> {
    /// let fetcher = BrowserFetcher::new(Arc::new(UserAgentPool::default()), BrowserSettings::default());
    /// let options = FetchOptions::default();
    /// let (a, b) = fetcher
    ///     .with_session(|session| async move {
    ///         let a = session.fetch("https://example.com/a", &options).await?;
    ///         let b = session.fetch("https://example.com/b", &options).await?;
    ///         Ok((a, b))
    ///     })
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn with_session<T, F, Fut>(&self, f: F) -> Result<T, FetchError>
    where
        F: FnOnce(Arc<BrowserSession>) -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let session = Arc::new(BrowserSession::launch(&self.settings, Arc::clone(&self.agents)).await?);
        let outcome = f(Arc::clone(&session)).await;

        match Arc::try_unwrap(session) {
            Ok(session) => {
                if let Err(e) = session.close().await {
                    warn!(error = %e, "Failed to close browser cleanly");
                }
            }
            Err(_) => warn!("Browser session still referenced after use; it closes when dropped"),
        }

        outcome
    }
}

#[async_trait]
impl Fetcher for BrowserFetcher {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<String, FetchError> {
        info!(url = %url, "Browser fetch starting");
        self.with_session(|session| async move { session.fetch(url, options).await })
            .await
    }

    fn name(&self) -> &'static str {
        "browser"
    }
}

#[async_trait]
impl InteractiveFetcher for BrowserFetcher {
    async fn fetch_with_interaction(
        &self,
        url: &str,
        interactions: &[Interaction],
        options: &FetchOptions,
    ) -> Result<String, FetchError> {
        info!(url = %url, steps = interactions.len(), "Browser fetch with interactions starting");
        self.with_session(|session| async move {
            session.fetch_with_interaction(url, interactions, options).await
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_build_a_config() {
        let settings = BrowserSettings {
            proxy: Some("http://127.0.0.1:8080".to_string()),
            executable: Some(PathBuf::from("/bin/sh")),
            no_sandbox: true,
            ..BrowserSettings::default()
        };
        assert!(settings.to_config().is_ok());
    }

    #[test]
    fn test_settings_from_toml() {
        let settings: BrowserSettings = toml::from_str("headless = false\ninteraction_pause_ms = 250\n").unwrap();
        assert!(!settings.headless);
        assert_eq!(settings.interaction_pause_ms, 250);
        assert!(settings.proxy.is_none());
    }

    // Requires a local Chromium
    #[tokio::test]
    #[ignore]
    async fn test_browser_fetch_integration() {
        let fetcher = BrowserFetcher::new(Arc::new(UserAgentPool::default()), BrowserSettings::default());
        let options = FetchOptions {
            wait_time_ms: 100,
            ..FetchOptions::default()
        };

        let html = fetcher
            .fetch("data:text/html,<html><body><p id='x'>hi</p></body></html>", &options)
            .await
            .unwrap();
        assert!(html.contains("hi"));
    }
}
