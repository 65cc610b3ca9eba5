//! Per-request acquisition options

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// When a browser navigation counts as finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WaitUntil {
    /// The `load` event fired
    #[serde(rename = "load")]
    Load,
    /// The DOM is parsed; subresources may still be loading
    #[default]
    #[serde(rename = "domcontentloaded")]
    DomContentLoaded,
    /// No new network activity for a short quiet period
    #[serde(rename = "networkidle")]
    NetworkIdle,
}

/// Options for one fetch
///
/// HTTP fetchers use the request fields; browser fetchers use the page
/// fields. Unused fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    /// HTTP method
    pub method: String,
    /// Extra request headers; these override the generated browser headers
    pub headers: BTreeMap<String, String>,
    /// Request body
    pub body: Option<String>,
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,

    /// CSS selector to wait for before reading the page
    pub wait_for: Option<String>,
    /// Settle time after navigation when no selector is given, in milliseconds
    pub wait_time_ms: u64,
    /// JavaScript to run before reading the page
    pub execute_script: Option<String>,
    /// Where to save a full-page screenshot
    pub screenshot: Option<PathBuf>,
    /// Navigation completion strategy
    pub wait_until: WaitUntil,
    /// Navigation timeout in seconds
    pub navigation_timeout_secs: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            method: "GET".to_string(),
            headers: BTreeMap::new(),
            body: None,
            timeout_secs: 30,
            wait_for: None,
            wait_time_ms: 3500,
            execute_script: None,
            screenshot: None,
            wait_until: WaitUntil::default(),
            navigation_timeout_secs: 60,
        }
    }
}

impl FetchOptions {
    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Navigation timeout
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    /// Settle time after navigation
    pub fn wait_time(&self) -> Duration {
        Duration::from_millis(self.wait_time_ms)
    }

    /// Add a request header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Send `body` with `method`
    pub fn with_body(mut self, method: impl Into<String>, body: impl Into<String>) -> Self {
        self.method = method.into();
        self.body = Some(body.into());
        self
    }

    /// Wait for `selector` instead of a fixed delay
    pub fn with_wait_for(mut self, selector: impl Into<String>) -> Self {
        self.wait_for = Some(selector.into());
        self
    }

    /// Run `script` in the page before reading it
    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.execute_script = Some(script.into());
        self
    }

    /// Save a full-page screenshot to `path`
    pub fn with_screenshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.screenshot = Some(path.into());
        self
    }

    /// Use `wait_until` for navigation
    pub fn with_wait_until(mut self, wait_until: WaitUntil) -> Self {
        self.wait_until = wait_until;
        self
    }
}

/// Scroll direction for [`Interaction::Scroll`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    /// Towards the end of the page
    #[default]
    Down,
    /// Towards the top of the page
    Up,
}

/// A scripted step performed in the browser before reading a page
///
/// Serialized with an `action` tag, e.g.
/// `{"action": "fill", "selector": "#q", "value": "rust"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Interaction {
    /// Click the first element matching `selector`
    Click {
        /// CSS selector
        selector: String,
    },
    /// Type `value` into the first element matching `selector`
    Fill {
        /// CSS selector
        selector: String,
        /// Text to type
        value: String,
    },
    /// Scroll the window by one viewport-ish step `times` times
    Scroll {
        /// Scroll direction
        #[serde(default)]
        direction: ScrollDirection,
        /// Number of steps
        #[serde(default = "default_times")]
        times: u32,
    },
    /// Pause
    Wait {
        /// Milliseconds to wait
        #[serde(default = "default_wait_ms")]
        ms: u64,
    },
}

fn default_times() -> u32 {
    1
}

fn default_wait_ms() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = FetchOptions::default();
        assert_eq!(options.method, "GET");
        assert_eq!(options.wait_time(), Duration::from_millis(3500));
        assert_eq!(options.wait_until, WaitUntil::DomContentLoaded);
    }

    #[test]
    fn test_partial_toml() {
        let options: FetchOptions = toml::from_str("timeout_secs = 10\nwait_until = \"networkidle\"\n").unwrap();
        assert_eq!(options.timeout(), Duration::from_secs(10));
        assert_eq!(options.wait_until, WaitUntil::NetworkIdle);
        assert_eq!(options.method, "GET");
    }

    #[test]
    fn test_interactions_from_json() {
        let steps: Vec<Interaction> = serde_json::from_str(
            r##"[
                {"action": "click", "selector": ".more"},
                {"action": "fill", "selector": "#q", "value": "rust"},
                {"action": "scroll", "times": 3},
                {"action": "wait"}
            ]"##,
        )
        .unwrap();

        assert_eq!(
            steps,
            vec![
                Interaction::Click { selector: ".more".into() },
                Interaction::Fill { selector: "#q".into(), value: "rust".into() },
                Interaction::Scroll { direction: ScrollDirection::Down, times: 3 },
                Interaction::Wait { ms: 1000 },
            ]
        );
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let result: Result<Interaction, _> = serde_json::from_str(r#"{"action": "hover", "selector": "a"}"#);
        assert!(result.is_err());
    }
}
