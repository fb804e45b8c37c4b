//! Session audit log fed by the identity provider's change stream.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;

use folio_core::domain::mask_email;
use folio_core::ports::{AuthChange, AuthEvent, IdentityProvider};

fn record(change: &AuthChange) {
    let user = change
        .session
        .as_ref()
        .map(|s| (s.user.id, mask_email(&s.user.email)));

    match (change.event, user) {
        (AuthEvent::SignedIn, Some((user_id, email))) => {
            tracing::info!(target: "audit", %user_id, %email, "Session started")
        }
        (AuthEvent::TokenRefreshed, Some((user_id, _))) => {
            tracing::debug!(target: "audit", %user_id, "Session refreshed")
        }
        (AuthEvent::SignedOut, Some((user_id, _))) => {
            tracing::info!(target: "audit", %user_id, "Session ended")
        }
        (event, None) => tracing::debug!(target: "audit", ?event, "Session change without session"),
    }
}

/// Log every session change until the provider goes away.
pub fn spawn_session_audit(identity: Arc<dyn IdentityProvider>) {
    let mut changes = identity.subscribe();
    drop(identity);

    actix_rt::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(change) => record(&change),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(target: "audit", skipped, "Audit listener fell behind")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}
