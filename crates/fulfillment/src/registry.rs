use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::config::ReentryPolicy;
use crate::session::{FulfillmentOrchestrator, FulfillmentSession, FulfillmentSnapshot};

/// Result of [`SessionRegistry::open`].
#[derive(Debug)]
pub enum OpenSession {
    /// The session for the checkout, newly started or already known.
    Opened(FulfillmentSnapshot),
    RedirectToStart,
}

/// All live fulfillment sessions, keyed by checkout id.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, FulfillmentSession>>,
    orchestrator: Arc<FulfillmentOrchestrator>,
    reentry: ReentryPolicy,
}

impl SessionRegistry {
    pub fn new(orchestrator: Arc<FulfillmentOrchestrator>) -> Self {
        let reentry = orchestrator.config().reentry;
        Self {
            sessions: RwLock::new(HashMap::new()),
            orchestrator,
            reentry,
        }
    }

    /// Return the session for `checkout_id`, starting one if needed.
    ///
    /// The prompt is resolved without holding the lock, since that may take a
    /// round-trip to the checkout provider. The entry is checked again under
    /// the write lock before inserting, so concurrent returns from the same
    /// checkout still share a single session.
    pub async fn open(&self, checkout_id: &str, prompt: Option<&str>) -> OpenSession {
        if let Some(snapshot) = self.reusable(&*self.sessions.read().await, checkout_id) {
            return OpenSession::Opened(snapshot);
        }

        let Some(prepared) = self.orchestrator.prepare(checkout_id, prompt).await else {
            return OpenSession::RedirectToStart;
        };

        let mut sessions = self.sessions.write().await;
        if let Some(snapshot) = self.reusable(&sessions, checkout_id) {
            return OpenSession::Opened(snapshot);
        }
        if let Some(previous) = sessions.get(checkout_id) {
            tracing::info!(checkout_id, previous = %previous.id(), "Replacing finished session");
        }

        let session = self.orchestrator.launch(prepared);
        let snapshot = session.snapshot();
        sessions.insert(checkout_id.to_string(), session);
        OpenSession::Opened(snapshot)
    }

    /// Snapshot of the existing session when the reentry policy keeps it.
    fn reusable(
        &self,
        sessions: &HashMap<String, FulfillmentSession>,
        checkout_id: &str,
    ) -> Option<FulfillmentSnapshot> {
        let snapshot = sessions.get(checkout_id)?.snapshot();
        if self.reentry == ReentryPolicy::Regenerate && snapshot.is_terminal() {
            return None;
        }
        tracing::debug!(checkout_id, status = snapshot.status.as_str(), "Reusing session");
        Some(snapshot)
    }

    /// Handle to the session for `checkout_id`, if any.
    pub async fn get(&self, checkout_id: &str) -> Option<FulfillmentSession> {
        self.sessions.read().await.get(checkout_id).cloned()
    }

    /// Drop the session for `checkout_id`. Returns whether one existed.
    pub async fn abandon(&self, checkout_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(checkout_id).is_some();
        if removed {
            tracing::info!(checkout_id, "Fulfillment session abandoned");
        }
        removed
    }

    /// Drop terminal sessions whose last update is older than `ttl`.
    ///
    /// Returns the number of sessions removed.
    pub async fn sweep_expired(&self, ttl: Duration) -> usize {
        let cutoff = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_sub_signed(ttl));

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| {
            let snapshot = session.snapshot();
            let expired = match cutoff {
                Some(cutoff) => snapshot.updated_at <= cutoff,
                None => false,
            };
            !(snapshot.is_terminal() && expired)
        });
        before - sessions.len()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
