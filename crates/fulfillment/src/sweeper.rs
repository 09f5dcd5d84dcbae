use std::sync::Arc;
use std::time::Duration;

use crate::registry::SessionRegistry;

/// Upper bound on the delay between two sweeps.
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Spawn a background task that periodically drops finished sessions older
/// than `ttl`.
///
/// The task runs for the life of the process. The returned `JoinHandle` can
/// be used to abort it explicitly, e.g. during shutdown.
pub fn start_session_sweeper(
    registry: Arc<SessionRegistry>,
    ttl: Duration,
) -> tokio::task::JoinHandle<()> {
    let period = ttl.min(MAX_SWEEP_INTERVAL).max(Duration::from_millis(10));

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);

        loop {
            interval.tick().await;
            let removed = registry.sweep_expired(ttl).await;
            if removed > 0 {
                let remaining = registry.session_count().await;
                tracing::debug!(removed, remaining, "Swept expired fulfillment sessions");
            }
        }
    })
}
