//! Client configuration.

use hiroba_shared::time::TimeDisplay;

use crate::domain::ReconnectPolicy;

/// Environment variable holding the backend WebSocket URL
pub const BACKEND_URL_ENV: &str = "HIROBA_BACKEND_URL";

/// Backend URL used when nothing is configured
pub const DEFAULT_BACKEND_URL: &str = "ws://127.0.0.1:8080/ws";

/// Configuration of a [`ChatSession`](crate::ChatSession).
///
/// The backend URL is the only required value; it is read once when the
/// session is created.
///
/// ```
/// use std::time::Duration;
/// use hiroba_client::{ClientConfig, ReconnectPolicy};
///
/// let config = ClientConfig::new("ws://chat.example:8080/ws").with_reconnect(ReconnectPolicy {
///     max_attempts: 10,
///     interval: Duration::from_secs(1),
/// });
/// assert_eq!(config.backend_url, "ws://chat.example:8080/ws");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// WebSocket endpoint of the backend
    pub backend_url: String,
    /// Reconnection behavior of the transport
    pub reconnect: ReconnectPolicy,
    /// Time zone used for transcript timestamps
    pub time_display: TimeDisplay,
}

impl ClientConfig {
    /// Create a configuration for the given backend with default settings
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            reconnect: ReconnectPolicy::default(),
            time_display: TimeDisplay::default(),
        }
    }

    /// Read the backend URL from `HIROBA_BACKEND_URL`, falling back to the default
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let url = lookup(BACKEND_URL_ENV)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        Self::new(url)
    }

    #[must_use]
    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }

    #[must_use]
    pub fn with_time_display(mut self, time_display: TimeDisplay) -> Self {
        self.time_display = time_display;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_lookup_uses_configured_url() {
        // テスト項目: 環境変数が設定されていればその URL を使う
        // given (前提条件):
        let lookup = |key: &str| {
            (key == BACKEND_URL_ENV).then(|| "ws://backend.internal:9000/ws".to_string())
        };

        // when (操作):
        let config = ClientConfig::from_lookup(lookup);

        // then (期待する結果):
        assert_eq!(config.backend_url, "ws://backend.internal:9000/ws");
    }

    #[test]
    fn test_from_lookup_falls_back_to_default() {
        // テスト項目: 未設定または空文字列の場合はデフォルト URL になる
        // given (前提条件):
        let unset = |_: &str| None;
        let blank = |_: &str| Some("  ".to_string());

        // when (操作):
        let from_unset = ClientConfig::from_lookup(unset);
        let from_blank = ClientConfig::from_lookup(blank);

        // then (期待する結果):
        assert_eq!(from_unset.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(from_blank.backend_url, DEFAULT_BACKEND_URL);
    }
}
