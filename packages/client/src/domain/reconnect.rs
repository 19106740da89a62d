//! Reconnection policy of the transport.
//!
//! Pure decision logic without side effects, kept apart from the
//! transport loop so it is easy to test.

use std::time::Duration;

const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;
const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_secs(5);

/// How often and how fast the transport reconnects after losing the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Consecutive failed attempts allowed before giving up
    pub max_attempts: u32,
    /// Delay between two attempts
    pub interval: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            interval: DEFAULT_RECONNECT_INTERVAL,
        }
    }
}

impl ReconnectPolicy {
    /// Policy that never reconnects
    pub fn disabled() -> Self {
        Self {
            max_attempts: 0,
            interval: Duration::ZERO,
        }
    }

    /// Check if the transport should attempt to reconnect.
    ///
    /// # Arguments
    ///
    /// * `failed_attempts` - Consecutive failures since the last successful connection
    ///
    /// # Returns
    ///
    /// `true` if another attempt is allowed, `false` otherwise
    pub fn should_attempt_reconnect(&self, failed_attempts: u32) -> bool {
        failed_attempts < self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_attempt_reconnect_within_limit() {
        // テスト項目: 再接続回数が上限未満の場合、再接続すべきと判定される
        // given (前提条件):
        let policy = ReconnectPolicy::default();

        // when (操作):
        let result = policy.should_attempt_reconnect(3);

        // then (期待する結果):
        assert!(result);
    }

    #[test]
    fn test_should_attempt_reconnect_at_limit() {
        // テスト項目: 再接続回数が上限に達した場合、再接続すべきではないと判定される
        // given (前提条件):
        let policy = ReconnectPolicy::default();

        // when (操作):
        let result = policy.should_attempt_reconnect(5);

        // then (期待する結果):
        assert!(!result);
    }

    #[test]
    fn test_should_attempt_reconnect_first_attempt() {
        // テスト項目: 初回の再接続試行では再接続すべきと判定される
        // given (前提条件):
        let policy = ReconnectPolicy::default();

        // when (操作):
        let result = policy.should_attempt_reconnect(0);

        // then (期待する結果):
        assert!(result);
    }

    #[test]
    fn test_disabled_policy_never_reconnects() {
        // テスト項目: 無効化されたポリシーでは一度も再接続しない
        // given (前提条件):
        let policy = ReconnectPolicy::disabled();

        // when (操作):
        let result = policy.should_attempt_reconnect(0);

        // then (期待する結果):
        assert!(!result);
    }
}
