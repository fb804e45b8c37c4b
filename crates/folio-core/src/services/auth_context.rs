//! Session + role hydration as an explicit state container.
//!
//! Gated surfaces must not treat "roles not fetched yet" as "no roles". The
//! context therefore distinguishes `RoleLoad::Pending` from a loaded empty set,
//! and only reports `is_hydrated` once both the session and, for a signed-in
//! user, the roles have resolved.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::roles::RoleResolver;
use crate::domain::{Account, CapabilitySet, Profile};
use crate::ports::{AuthChange, AuthEvent, IdentityProvider, ProfileRepository, Session};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleLoad {
    Pending,
    Loaded(CapabilitySet),
}

#[derive(Debug, Clone)]
pub enum AuthState {
    Unresolved,
    Resolving,
    Resolved {
        session: Option<Session>,
        profile: Option<Profile>,
        roles: RoleLoad,
    },
}

/// Point-in-time view of the context for rendering decisions.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSnapshot {
    pub user: Option<Account>,
    pub profile: Option<Profile>,
    pub capabilities: CapabilitySet,
    pub session_resolved: bool,
    pub roles_loaded: bool,
}

impl AuthSnapshot {
    pub fn is_admin(&self) -> bool {
        self.capabilities.is_admin()
    }

    pub fn is_editor(&self) -> bool {
        self.capabilities.is_editor()
    }

    pub fn is_hydrated(&self) -> bool {
        self.session_resolved && (self.user.is_none() || self.roles_loaded)
    }
}

pub struct AuthContext {
    state: RwLock<AuthState>,
    /// Bumped on every session change; role fetches for an older session are dropped.
    generation: AtomicU64,
    resolver: RoleResolver,
    profiles: Arc<dyn ProfileRepository>,
}

impl AuthContext {
    pub fn new(resolver: RoleResolver, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self {
            state: RwLock::new(AuthState::Unresolved),
            generation: AtomicU64::new(0),
            resolver,
            profiles,
        }
    }

    /// Mark that a stored session is being looked up.
    pub async fn begin_restore(&self) {
        let mut state = self.state.write().await;
        if matches!(*state, AuthState::Unresolved) {
            *state = AuthState::Resolving;
        }
    }

    /// Resolve the session found on startup (or its absence).
    pub async fn restore(&self, session: Option<Session>) {
        self.set_session(session).await;
    }

    /// Handle a provider event.
    pub async fn apply(&self, change: AuthChange) {
        tracing::debug!(event = ?change.event, "Applying auth change");
        match change.event {
            AuthEvent::SignedOut => self.set_session(None).await,
            AuthEvent::SignedIn | AuthEvent::TokenRefreshed => {
                self.set_session(change.session).await
            }
        }
    }

    pub async fn snapshot(&self) -> AuthSnapshot {
        let state = self.state.read().await;
        match &*state {
            AuthState::Unresolved | AuthState::Resolving => AuthSnapshot {
                user: None,
                profile: None,
                capabilities: CapabilitySet::none(),
                session_resolved: false,
                roles_loaded: false,
            },
            AuthState::Resolved {
                session,
                profile,
                roles,
            } => {
                let (capabilities, roles_loaded) = match roles {
                    RoleLoad::Pending => (CapabilitySet::none(), false),
                    RoleLoad::Loaded(caps) => (caps.clone(), true),
                };
                AuthSnapshot {
                    user: session.as_ref().map(|s| s.user.clone()),
                    profile: profile.clone(),
                    capabilities,
                    session_resolved: true,
                    roles_loaded,
                }
            }
        }
    }

    async fn current_session_id(&self) -> Option<Uuid> {
        match &*self.state.read().await {
            AuthState::Resolved {
                session: Some(session),
                ..
            } => Some(session.session_id),
            _ => None,
        }
    }

    /// Follow provider events that concern the session this context holds.
    ///
    /// The subscription ends when the returned handle is dropped or
    /// [`AuthSubscription::unsubscribe`] is called.
    pub fn attach(self: &Arc<Self>, provider: &dyn IdentityProvider) -> AuthSubscription {
        let mut rx = provider.subscribe();
        let ctx = Arc::clone(self);

        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(change) => {
                        let concerned = change.session.as_ref().map(|s| s.session_id);
                        if concerned.is_some() && concerned == ctx.current_session_id().await {
                            ctx.apply(change).await;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Auth subscriber lagged, events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        AuthSubscription { task }
    }

    async fn set_session(&self, session: Option<Session>) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let user_id = session.as_ref().map(|s| s.user.id);

        {
            let mut state = self.state.write().await;
            *state = AuthState::Resolved {
                session,
                profile: None,
                roles: match user_id {
                    Some(_) => RoleLoad::Pending,
                    None => RoleLoad::Loaded(CapabilitySet::none()),
                },
            };
        }

        // Roles are only ever fetched for a session that is already resolved.
        if let Some(user_id) = user_id {
            self.hydrate(generation, user_id).await;
        }
    }

    async fn hydrate(&self, generation: u64, user_id: Uuid) {
        let profile = match self.profiles.find_by_user_id(user_id).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(%user_id, error = %e, "Profile fetch failed");
                None
            }
        };
        let capabilities = self.resolver.resolve(user_id).await;

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(%user_id, "Discarding roles fetched for a superseded session");
            return;
        }
        if let AuthState::Resolved {
            profile: slot,
            roles,
            ..
        } = &mut *state
        {
            *slot = profile;
            *roles = RoleLoad::Loaded(capabilities);
        }
    }
}

/// Handle for an [`AuthContext::attach`] subscription.
pub struct AuthSubscription {
    task: JoinHandle<()>,
}

impl AuthSubscription {
    pub fn unsubscribe(self) {}
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::Notify;

    use super::*;
    use crate::domain::Role;
    use crate::error::RepoError;
    use crate::ports::{AuthError, BaseRepository, RoleRepository};
    use crate::domain::RoleAssignment;

    #[derive(Default)]
    struct FakeRoles {
        roles: HashMap<Uuid, Vec<Role>>,
        fail: bool,
        entered: Option<Arc<Notify>>,
        release: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl RoleRepository for FakeRoles {
        async fn roles_for_user(&self, user_id: Uuid) -> Result<Vec<Role>, RepoError> {
            if let (Some(entered), Some(release)) = (&self.entered, &self.release) {
                entered.notify_one();
                release.notified().await;
            }
            if self.fail {
                return Err(RepoError::Connection("offline".into()));
            }
            Ok(self.roles.get(&user_id).cloned().unwrap_or_default())
        }

        async fn list_all(&self) -> Result<Vec<RoleAssignment>, RepoError> {
            Ok(vec![])
        }

        async fn assign(&self, _assignment: RoleAssignment) -> Result<(), RepoError> {
            unimplemented!()
        }

        async fn revoke(&self, _user_id: Uuid, _role: Role) -> Result<(), RepoError> {
            unimplemented!()
        }
    }

    struct NoProfiles;

    #[async_trait]
    impl BaseRepository<Profile, Uuid> for NoProfiles {
        async fn find_by_id(&self, _id: Uuid) -> Result<Option<Profile>, RepoError> {
            Ok(None)
        }
        async fn insert(&self, entity: Profile) -> Result<Profile, RepoError> {
            Ok(entity)
        }
        async fn update(&self, entity: Profile) -> Result<Profile, RepoError> {
            Ok(entity)
        }
        async fn delete(&self, _id: Uuid) -> Result<(), RepoError> {
            Ok(())
        }
        async fn count(&self) -> Result<u64, RepoError> {
            Ok(0)
        }
    }

    #[async_trait]
    impl ProfileRepository for NoProfiles {
        async fn find_by_user_id(&self, _user_id: Uuid) -> Result<Option<Profile>, RepoError> {
            Ok(None)
        }
        async fn list_newest_first(&self) -> Result<Vec<Profile>, RepoError> {
            Ok(vec![])
        }
    }

    struct FakeProvider {
        tx: broadcast::Sender<AuthChange>,
    }

    #[async_trait]
    impl IdentityProvider for FakeProvider {
        async fn sign_up(&self, _: &str, _: &str, _: &str) -> Result<Session, AuthError> {
            unimplemented!()
        }
        async fn sign_in(&self, _: &str, _: &str) -> Result<Session, AuthError> {
            unimplemented!()
        }
        async fn sign_out(&self, _: &Session) -> Result<(), AuthError> {
            unimplemented!()
        }
        async fn refresh(&self, _: &Session) -> Result<Session, AuthError> {
            unimplemented!()
        }
        async fn get_session(&self, _: &str) -> Result<Option<Session>, AuthError> {
            Ok(None)
        }
        fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
            self.tx.subscribe()
        }
    }

    fn session() -> Session {
        Session {
            session_id: Uuid::new_v4(),
            access_token: "token".into(),
            expires_at: Utc::now(),
            user: Account::new("editor@beamx.io".into(), String::new()),
        }
    }

    fn context(roles: FakeRoles) -> AuthContext {
        AuthContext::new(RoleResolver::new(Arc::new(roles)), Arc::new(NoProfiles))
    }

    #[tokio::test]
    async fn test_not_hydrated_until_session_resolves() {
        let ctx = context(FakeRoles::default());
        assert!(!ctx.snapshot().await.is_hydrated());

        ctx.begin_restore().await;
        assert!(!ctx.snapshot().await.is_hydrated());

        ctx.restore(None).await;
        let snapshot = ctx.snapshot().await;
        assert!(snapshot.is_hydrated());
        assert!(snapshot.user.is_none());
        assert!(!snapshot.is_editor());
    }

    #[tokio::test]
    async fn test_restored_editor_session() {
        let session = session();
        let mut roles = FakeRoles::default();
        roles.roles.insert(session.user.id, vec![Role::Editor]);
        let ctx = context(roles);

        ctx.restore(Some(session)).await;
        let snapshot = ctx.snapshot().await;
        assert!(snapshot.is_hydrated());
        assert!(snapshot.is_editor());
        assert!(!snapshot.is_admin());
    }

    #[tokio::test]
    async fn test_pending_roles_are_not_an_empty_role_set() {
        let session = session();
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let mut roles = FakeRoles {
            entered: Some(entered.clone()),
            release: Some(release.clone()),
            ..Default::default()
        };
        roles.roles.insert(session.user.id, vec![Role::Admin]);
        let ctx = Arc::new(context(roles));

        let restoring = {
            let ctx = ctx.clone();
            tokio::spawn(async move { ctx.restore(Some(session)).await })
        };
        entered.notified().await;

        let during = ctx.snapshot().await;
        assert!(during.session_resolved);
        assert!(during.user.is_some());
        assert!(!during.roles_loaded);
        assert!(!during.is_hydrated());

        release.notify_one();
        restoring.await.unwrap();

        let after = ctx.snapshot().await;
        assert!(after.is_hydrated());
        assert!(after.is_admin());
    }

    #[tokio::test]
    async fn test_role_fetch_failure_fails_closed() {
        let ctx = context(FakeRoles {
            fail: true,
            ..Default::default()
        });
        ctx.restore(Some(session())).await;

        let snapshot = ctx.snapshot().await;
        assert!(snapshot.roles_loaded);
        assert!(snapshot.is_hydrated());
        assert!(!snapshot.is_editor());
    }

    #[tokio::test]
    async fn test_sign_out_clears_user_and_roles() {
        let session = session();
        let mut roles = FakeRoles::default();
        roles.roles.insert(session.user.id, vec![Role::Editor]);
        let ctx = context(roles);
        ctx.restore(Some(session.clone())).await;

        ctx.apply(AuthChange {
            event: AuthEvent::SignedOut,
            session: Some(session),
        })
        .await;

        let snapshot = ctx.snapshot().await;
        assert!(snapshot.user.is_none());
        assert!(snapshot.roles_loaded);
        assert!(!snapshot.is_editor());
    }

    #[tokio::test]
    async fn test_attached_context_follows_its_own_session() {
        let (tx, _) = broadcast::channel(8);
        let provider = FakeProvider { tx: tx.clone() };
        let mine = session();
        let ctx = Arc::new(context(FakeRoles::default()));
        ctx.restore(Some(mine.clone())).await;

        let subscription = ctx.attach(&provider);

        // Someone else's sign-out is ignored.
        tx.send(AuthChange {
            event: AuthEvent::SignedOut,
            session: Some(session()),
        })
        .unwrap();
        tx.send(AuthChange {
            event: AuthEvent::SignedOut,
            session: Some(mine),
        })
        .unwrap();

        for _ in 0..100 {
            if ctx.snapshot().await.user.is_none() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(ctx.snapshot().await.user.is_none());
        subscription.unsubscribe();
    }
}
