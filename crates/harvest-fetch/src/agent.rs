//! Browser identities for outgoing requests

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

const DESKTOP_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

const MOBILE_AGENTS: &[&str] = &[
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.6099.144 Mobile Safari/537.36",
    "Mozilla/5.0 (Linux; Android 14; SM-S918B) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.6099.144 Mobile Safari/537.36",
    "Mozilla/5.0 (iPad; CPU OS 17_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Mobile/15E148 Safari/604.1",
];

/// A rotating pool of user-agent strings
///
/// Agents are handed out round-robin. A sticky pool keeps returning the
/// same agent until [`UserAgentPool::rotate`] is called, so a sequence of
/// requests looks like one visitor.
///
/// # Examples
///
/// ```
/// use harvest_fetch::UserAgentPool;
///
/// let pool = UserAgentPool::new(true, true);
/// let first = pool.agent();
/// assert_eq!(pool.agent(), first);
///
/// pool.rotate();
/// assert_ne!(pool.agent(), first);
/// ```
#[derive(Debug)]
pub struct UserAgentPool {
    agents: Vec<String>,
    cursor: AtomicUsize,
    sticky: bool,
}

impl UserAgentPool {
    /// Built-in desktop agents, or mobile ones when `prefer_desktop` is false
    pub fn new(prefer_desktop: bool, sticky: bool) -> Self {
        let agents = if prefer_desktop { DESKTOP_AGENTS } else { MOBILE_AGENTS };
        Self::with_agents(agents.iter().map(|a| a.to_string()).collect(), sticky)
    }

    /// Pool over caller-supplied agents; an empty list falls back to the desktop set
    pub fn with_agents(agents: Vec<String>, sticky: bool) -> Self {
        let agents = if agents.is_empty() {
            DESKTOP_AGENTS.iter().map(|a| a.to_string()).collect()
        } else {
            agents
        };
        Self {
            agents,
            cursor: AtomicUsize::new(0),
            sticky,
        }
    }

    /// Whether the pool keeps its agent between requests
    pub fn is_sticky(&self) -> bool {
        self.sticky
    }

    /// Agent for the next request
    ///
    /// Sticky pools return the current agent; others advance first.
    pub fn agent(&self) -> String {
        if self.sticky {
            self.current()
        } else {
            self.rotate()
        }
    }

    /// Agent currently selected, without advancing
    pub fn current(&self) -> String {
        self.at(self.cursor.load(Ordering::Relaxed))
    }

    /// Advance to the next agent and return it
    pub fn rotate(&self) -> String {
        let next = self.cursor.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        self.at(next)
    }

    /// Browser-like request headers for `agent`, overlaid with `extra`
    ///
    /// Caller headers win; names are compared case-insensitively.
    /// `Accept-Encoding` is left to the HTTP client, which negotiates the
    /// encodings it can decode.
    pub fn headers(&self, agent: &str, extra: &BTreeMap<String, String>) -> Vec<(String, String)> {
        let defaults = [
            ("User-Agent", agent),
            ("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8"),
            ("Accept-Language", "en-US,en;q=0.9"),
            ("DNT", "1"),
            ("Upgrade-Insecure-Requests", "1"),
        ];

        let mut headers: Vec<(String, String)> = defaults
            .iter()
            .filter(|(name, _)| !extra.keys().any(|k| k.eq_ignore_ascii_case(name)))
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        headers.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        headers
    }

    fn at(&self, idx: usize) -> String {
        self.agents[idx % self.agents.len()].clone()
    }
}

impl Default for UserAgentPool {
    fn default() -> Self {
        Self::new(true, true)
    }
}
