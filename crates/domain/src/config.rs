//! Checkout configuration loaded from environment variables.

use std::time::Duration;

/// Placement engine configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `CHECKOUT_COMMIT_TIMEOUT_MS`: per-supplier commit timeout in
///   milliseconds (default: `5000`)
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// How long a single per-supplier order commit may take before the
    /// checkout gives up on it.
    pub commit_timeout: Duration,
}

impl CheckoutConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let commit_timeout_ms = std::env::var("CHECKOUT_COMMIT_TIMEOUT_MS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(5000);

        Self {
            commit_timeout: Duration::from_millis(commit_timeout_ms),
        }
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            commit_timeout: Duration::from_millis(5000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_commit_timeout() {
        let config = CheckoutConfig::default();
        assert_eq!(config.commit_timeout, Duration::from_secs(5));
    }

    #[test]
    fn custom_timeout_is_kept() {
        let config = CheckoutConfig {
            commit_timeout: Duration::from_millis(250),
        };
        assert_eq!(config.commit_timeout.as_millis(), 250);
    }
}
