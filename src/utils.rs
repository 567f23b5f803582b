//! Miscellaneous helper utilities.

use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Log directives used when `RUST_LOG` is unset or unparsable. The RPC
/// client's HTTP stack is noisy at `info`.
pub const DEFAULT_LOG_FILTER: &str = "info,solana_rpc_client=warn,reqwest=warn,hyper=warn";

fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Install the global compact `tracing` subscriber, filtered by `RUST_LOG`.
pub fn init_logging() {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(directives.as_deref()))
        .with_target(false)
        .compact()
        .init();
}

/// First program log line that names an error or a funds shortfall,
/// otherwise `fallback`.
pub fn surface_failure_reason(logs: &[String], fallback: &str) -> String {
    logs.iter()
        .find(|line| line.contains("Error:") || line.contains("insufficient"))
        .cloned()
        .unwrap_or_else(|| fallback.to_string())
}

/// Logged sleep between orders and restarts.
pub async fn pause(duration: Duration) {
    info!(ms = duration.as_millis() as u64, "sleeping");
    tokio::time::sleep(duration).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logs(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn picks_first_error_line() {
        let lines = logs(&[
            "Program 675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8 invoke [1]",
            "Program log: Error: exceeds desired slippage limit",
            "Program log: Error: second",
        ]);
        assert_eq!(
            surface_failure_reason(&lines, "generic"),
            "Program log: Error: exceeds desired slippage limit"
        );
    }

    #[test]
    fn matches_insufficient_funds() {
        let lines = logs(&["Transfer: insufficient lamports 10, need 20"]);
        assert_eq!(
            surface_failure_reason(&lines, "generic"),
            "Transfer: insufficient lamports 10, need 20"
        );
    }

    #[test]
    fn falls_back_to_generic_message() {
        let lines = logs(&["Program log: ok"]);
        assert_eq!(surface_failure_reason(&lines, "generic"), "generic");
        assert_eq!(surface_failure_reason(&[], "generic"), "generic");
    }

    #[test]
    fn default_log_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }

    #[test]
    fn bad_rust_log_falls_back_to_default_filter() {
        let default = EnvFilter::new(DEFAULT_LOG_FILTER).to_string();
        assert_eq!(log_filter(None).to_string(), default);
        assert_eq!(log_filter(Some("info,bot=loudest")).to_string(), default);
        assert_eq!(log_filter(Some("debug")).to_string(), "debug");
    }
}
