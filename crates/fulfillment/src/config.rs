use std::str::FromStr;
use std::time::Duration;

/// What to do when a checkout that already has a session is opened again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReentryPolicy {
    /// Always hand back the existing session. At most one generation per checkout.
    #[default]
    Reuse,
    /// Replace a session that already reached a terminal state with a fresh
    /// one, which runs a new generation. Sessions still in progress are reused.
    Regenerate,
}

impl FromStr for ReentryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reuse" => Ok(Self::Reuse),
            "regenerate" => Ok(Self::Regenerate),
            other => Err(format!(
                "unknown re-entry policy '{other}', expected 'reuse' or 'regenerate'"
            )),
        }
    }
}

/// Fulfillment session configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct FulfillmentConfig {
    /// Delay between payment-status queries (default: 2000 ms).
    pub poll_interval: Duration,
    /// How long a session keeps verifying before the payment counts as
    /// rejected (default: 600 s).
    pub verify_timeout: Duration,
    /// How long a finished session stays queryable (default: 3600 s).
    pub session_ttl: Duration,
    /// Behaviour when a known checkout is opened again (default: `reuse`).
    pub reentry: ReentryPolicy,
}

impl Default for FulfillmentConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(2000),
            verify_timeout: Duration::from_secs(600),
            session_ttl: Duration::from_secs(3600),
            reentry: ReentryPolicy::Reuse,
        }
    }
}

impl FulfillmentConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default |
    /// |-------------------------------|---------|
    /// | `PAYMENT_POLL_INTERVAL_MS`    | `2000`  |
    /// | `PAYMENT_VERIFY_TIMEOUT_SECS` | `600`   |
    /// | `SESSION_TTL_SECS`            | `3600`  |
    /// | `FULFILLMENT_REENTRY`         | `reuse` |
    pub fn from_env() -> Self {
        let poll_interval_ms: u64 = std::env::var("PAYMENT_POLL_INTERVAL_MS")
            .unwrap_or_else(|_| "2000".into())
            .parse()
            .expect("PAYMENT_POLL_INTERVAL_MS must be a valid u64");

        let verify_timeout_secs: u64 = std::env::var("PAYMENT_VERIFY_TIMEOUT_SECS")
            .unwrap_or_else(|_| "600".into())
            .parse()
            .expect("PAYMENT_VERIFY_TIMEOUT_SECS must be a valid u64");

        let session_ttl_secs: u64 = std::env::var("SESSION_TTL_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("SESSION_TTL_SECS must be a valid u64");

        let reentry = std::env::var("FULFILLMENT_REENTRY")
            .unwrap_or_else(|_| "reuse".into())
            .parse()
            .unwrap_or_else(|e| panic!("FULFILLMENT_REENTRY: {e}"));

        Self {
            poll_interval: Duration::from_millis(poll_interval_ms.max(1)),
            verify_timeout: Duration::from_secs(verify_timeout_secs),
            session_ttl: Duration::from_secs(session_ttl_secs),
            reentry,
        }
    }
}
