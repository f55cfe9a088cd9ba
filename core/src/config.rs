//! Connection settings for `ZenzapClient`.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.zenzap.co";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Base URL and per-request timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
