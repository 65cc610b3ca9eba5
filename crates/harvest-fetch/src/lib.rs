//! Harvest page acquisition
//!
//! Two ways of turning a URL into HTML:
//!
//! - [`PhantomFetcher`]: a plain HTTP request dressed up with browser headers.
//!   Fast, but only sees server-rendered markup.
//! - [`BrowserFetcher`]: headless Chromium. Slow, but runs the page's
//!   JavaScript and can click, type and scroll first.
//!
//! Both share a [`UserAgentPool`] so a caller can rotate identities for
//! every strategy at once.

#![warn(missing_docs)]

mod agent;
mod browser;
mod error;
mod options;
mod phantom;

use async_trait::async_trait;

pub use agent::UserAgentPool;
pub use browser::{BrowserFetcher, BrowserSession, BrowserSettings};
pub use error::FetchError;
pub use options::{FetchOptions, Interaction, ScrollDirection, WaitUntil};
pub use phantom::{PhantomConfig, PhantomFetcher};

/// A strategy for acquiring a page's HTML
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url` and return its HTML
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<String, FetchError>;

    /// Short strategy name for logs
    fn name(&self) -> &'static str;
}

/// A fetcher that can drive the page before reading it
#[async_trait]
pub trait InteractiveFetcher: Fetcher {
    /// Load `url`, perform `interactions` in order, then return the HTML
    async fn fetch_with_interaction(
        &self,
        url: &str,
        interactions: &[Interaction],
        options: &FetchOptions,
    ) -> Result<String, FetchError>;
}
