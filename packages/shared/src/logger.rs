//! Logging setup utilities for the Hiroba binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Workspace crates whose log output is enabled by default.
const WORKSPACE_CRATES: [&str; 3] = ["hiroba_shared", "hiroba_client", "hiroba_server"];

/// Build the default filter directive used when `RUST_LOG` is not set.
fn default_directive(binary_name: &str, default_log_level: &str) -> String {
    let binary = binary_name.replace('-', "_");
    let mut targets: Vec<String> = WORKSPACE_CRATES.iter().map(|name| name.to_string()).collect();
    if !targets.contains(&binary) {
        targets.push(binary);
    }
    targets
        .into_iter()
        .map(|target| format!("{}={}", target, default_log_level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// This function sets up logging for every workspace crate and the binary.
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "hiroba-server", "hiroba-client")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use hiroba_shared::logger::setup_logger;
///
/// setup_logger("hiroba-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_for_workspace_binary() {
        // テスト項目: ワークスペースのバイナリ名は重複せずにフィルタに含まれる
        // given (前提条件):
        let binary_name = "hiroba-client";

        // when (操作):
        let directive = default_directive(binary_name, "info");

        // then (期待する結果):
        assert_eq!(
            directive,
            "hiroba_shared=info,hiroba_client=info,hiroba_server=info"
        );
    }

    #[test]
    fn test_default_directive_appends_foreign_binary() {
        // テスト項目: ワークスペース外のバイナリ名はフィルタの末尾に追加される
        // given (前提条件):
        let binary_name = "load-tester";

        // when (操作):
        let directive = default_directive(binary_name, "debug");

        // then (期待する結果):
        assert!(directive.ends_with(",load_tester=debug"));
        assert!(directive.starts_with("hiroba_shared=debug"));
    }
}
