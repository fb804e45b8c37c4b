//! Local identity provider: accounts in the repository, JWT access tokens and
//! in-process change notifications.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

use folio_core::domain::{Account, Profile};
use folio_core::error::RepoError;
use folio_core::ports::{
    AccountRepository, AuthChange, AuthError, AuthEvent, IdentityProvider, PasswordService,
    ProfileRepository, Session, TokenService,
};

use super::password::check_length;

const EVENT_CAPACITY: usize = 64;

pub struct LocalIdentityProvider {
    accounts: Arc<dyn AccountRepository>,
    profiles: Arc<dyn ProfileRepository>,
    tokens: Arc<dyn TokenService>,
    passwords: Arc<dyn PasswordService>,
    revoked: RwLock<HashSet<Uuid>>,
    events: broadcast::Sender<AuthChange>,
}

impl LocalIdentityProvider {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        profiles: Arc<dyn ProfileRepository>,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            accounts,
            profiles,
            tokens,
            passwords,
            revoked: RwLock::new(HashSet::new()),
            events,
        }
    }

    fn issue(&self, user: Account, session_id: Uuid) -> Result<Session, AuthError> {
        let issued = self
            .tokens
            .generate_token(user.id, &user.email, session_id)?;
        Ok(Session {
            session_id,
            access_token: issued.token,
            expires_at: issued.expires_at,
            user,
        })
    }

    fn announce(&self, event: AuthEvent, session: Option<Session>) {
        // No subscribers is fine.
        let _ = self.events.send(AuthChange { event, session });
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<Session, AuthError> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(AuthError::Validation(
                "Please enter a valid email address".to_string(),
            ));
        }
        check_length(password)?;
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(AuthError::Validation("Full name is required".to_string()));
        }

        if self.accounts.find_by_email(&email).await?.is_some() {
            return Err(AuthError::AlreadyRegistered);
        }

        let hash = self.passwords.hash(password)?;
        let account = self
            .accounts
            .insert(Account::new(email, hash))
            .await
            .map_err(|e| match e {
                RepoError::Duplicate(_) => AuthError::AlreadyRegistered,
                other => other.into(),
            })?;
        let profile = Profile::for_account(&account, Some(full_name.to_string()));
        if let Err(e) = self.profiles.insert(profile).await {
            tracing::warn!(
                user_id = %account.id,
                error = %e,
                "Profile insert failed, removing account"
            );
            if let Err(cleanup) = self.accounts.delete(account.id).await {
                tracing::error!(user_id = %account.id, error = %cleanup, "Orphaned account left behind");
            }
            return Err(e.into());
        }

        tracing::info!(user_id = %account.id, email = %account.masked_email(), "Account created");

        let session = self.issue(account, Uuid::new_v4())?;
        self.announce(AuthEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = normalize_email(email);
        let account = self
            .accounts
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.passwords.verify(password, &account.password_hash)? {
            tracing::debug!(email = %account.masked_email(), "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let session = self.issue(account, Uuid::new_v4())?;
        tracing::info!(user_id = %session.user.id, "Signed in");
        self.announce(AuthEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self, session: &Session) -> Result<(), AuthError> {
        self.revoked.write().await.insert(session.session_id);
        tracing::info!(user_id = %session.user.id, "Signed out");
        self.announce(AuthEvent::SignedOut, Some(session.clone()));
        Ok(())
    }

    async fn refresh(&self, session: &Session) -> Result<Session, AuthError> {
        if self.revoked.read().await.contains(&session.session_id) {
            return Err(AuthError::SessionRevoked);
        }

        let refreshed = self.issue(session.user.clone(), session.session_id)?;
        self.announce(AuthEvent::TokenRefreshed, Some(refreshed.clone()));
        Ok(refreshed)
    }

    async fn get_session(&self, access_token: &str) -> Result<Option<Session>, AuthError> {
        let claims = match self.tokens.validate_token(access_token) {
            Ok(claims) => claims,
            Err(AuthError::TokenExpired | AuthError::InvalidToken(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        if self.revoked.read().await.contains(&claims.session_id) {
            return Ok(None);
        }

        let Some(user) = self.accounts.find_by_id(claims.user_id).await? else {
            return Ok(None);
        };

        Ok(Some(Session {
            session_id: claims.session_id,
            access_token: access_token.to_string(),
            expires_at: chrono::DateTime::from_timestamp(claims.exp, 0).unwrap_or_default(),
            user,
        }))
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Argon2PasswordService, JwtTokenService, jwt::JwtConfig};
    use crate::memory::InMemoryStore;
    use folio_core::ports::BaseRepository;
    use folio_core::services::{AuthContext, RoleResolver};
    use std::time::Duration;

    fn provider() -> LocalIdentityProvider {
        let repos = InMemoryStore::empty().repositories();
        LocalIdentityProvider::new(
            repos.accounts,
            repos.profiles,
            Arc::new(JwtTokenService::new(JwtConfig::default())),
            Arc::new(Argon2PasswordService::new()),
        )
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("sarah@beamx.io"));
        assert!(!is_valid_email("sarah"));
        assert!(!is_valid_email("@beamx.io"));
        assert!(!is_valid_email("sarah@localhost"));
        assert!(!is_valid_email("sa rah@beamx.io"));
    }

    #[tokio::test]
    async fn test_sign_up_validation() {
        let idp = provider();
        let err = idp.sign_up("nope", "secret1", "Sarah").await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));

        let err = idp
            .sign_up("sarah@beamx.io", "12345", "Sarah")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Password must be at least 6 characters");

        let err = idp
            .sign_up("sarah@beamx.io", "123456", "  ")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Full name is required");
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let idp = provider();
        let mut events = idp.subscribe();

        let session = idp
            .sign_up("Sarah@BeamX.io", "secret1", "Sarah Chen")
            .await
            .unwrap();
        assert_eq!(session.user.email, "sarah@beamx.io");
        assert_eq!(events.recv().await.unwrap().event, AuthEvent::SignedIn);

        let err = idp
            .sign_up("sarah@beamx.io", "another", "Sarah")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "This email is already registered");

        let err = idp.sign_in("sarah@beamx.io", "wrong-pw").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password");
        let err = idp.sign_in("nobody@beamx.io", "secret1").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password");

        let again = idp.sign_in("sarah@beamx.io", "secret1").await.unwrap();
        assert_eq!(again.user.id, session.user.id);
        assert_ne!(again.session_id, session.session_id);
    }

    #[tokio::test]
    async fn test_sign_out_revokes_session() {
        let idp = provider();
        let session = idp
            .sign_up("michael@beamx.io", "secret1", "Michael Torres")
            .await
            .unwrap();

        let restored = idp.get_session(&session.access_token).await.unwrap();
        assert_eq!(restored.unwrap().user.id, session.user.id);

        let refreshed = idp.refresh(&session).await.unwrap();
        assert_eq!(refreshed.session_id, session.session_id);

        idp.sign_out(&session).await.unwrap();
        assert!(idp.get_session(&session.access_token).await.unwrap().is_none());
        assert!(idp.get_session(&refreshed.access_token).await.unwrap().is_none());
        assert!(matches!(
            idp.refresh(&session).await.unwrap_err(),
            AuthError::SessionRevoked
        ));
    }

    #[tokio::test]
    async fn test_attached_context_clears_on_sign_out() {
        let repos = InMemoryStore::empty().repositories();
        let idp = LocalIdentityProvider::new(
            repos.accounts.clone(),
            repos.profiles.clone(),
            Arc::new(JwtTokenService::new(JwtConfig::default())),
            Arc::new(Argon2PasswordService::new()),
        );
        let session = idp
            .sign_up("ed@beamx.io", "secret1", "Ed Park")
            .await
            .unwrap();

        let ctx = Arc::new(AuthContext::new(
            RoleResolver::new(repos.roles.clone()),
            repos.profiles.clone(),
        ));
        ctx.restore(Some(session.clone())).await;
        let _subscription = ctx.attach(&idp);
        assert_eq!(
            ctx.snapshot().await.user.map(|u| u.email).as_deref(),
            Some("ed@beamx.io")
        );

        idp.sign_out(&session).await.unwrap();

        let cleared = tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                if ctx.snapshot().await.user.is_none() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(cleared.is_ok(), "context still holds the signed-out user");
        assert!(ctx.snapshot().await.is_hydrated());
    }

    #[tokio::test]
    async fn test_sign_out_names_the_session() {
        let idp = provider();
        let session = idp
            .sign_up("ed@beamx.io", "secret1", "Ed Park")
            .await
            .unwrap();
        let mut events = idp.subscribe();

        idp.sign_out(&session).await.unwrap();
        let change = events.recv().await.unwrap();
        assert_eq!(change.event, AuthEvent::SignedOut);
        assert_eq!(change.session.map(|s| s.session_id), Some(session.session_id));
    }

    struct BrokenProfiles;

    #[async_trait]
    impl BaseRepository<Profile, Uuid> for BrokenProfiles {
        async fn find_by_id(&self, _id: Uuid) -> Result<Option<Profile>, RepoError> {
            Ok(None)
        }
        async fn insert(&self, _entity: Profile) -> Result<Profile, RepoError> {
            Err(RepoError::Connection("profiles offline".into()))
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
    impl ProfileRepository for BrokenProfiles {
        async fn find_by_user_id(&self, _user_id: Uuid) -> Result<Option<Profile>, RepoError> {
            Ok(None)
        }
        async fn list_newest_first(&self) -> Result<Vec<Profile>, RepoError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_failed_profile_insert_leaves_no_account() {
        let repos = InMemoryStore::empty().repositories();
        let idp = LocalIdentityProvider::new(
            repos.accounts.clone(),
            Arc::new(BrokenProfiles),
            Arc::new(JwtTokenService::new(JwtConfig::default())),
            Arc::new(Argon2PasswordService::new()),
        );

        let err = idp
            .sign_up("lena@beamx.io", "secret1", "Lena Ortiz")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Store(_)), "{err:?}");
        assert!(
            repos
                .accounts
                .find_by_email("lena@beamx.io")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_garbage_token_has_no_session() {
        let idp = provider();
        assert!(idp.get_session("garbage").await.unwrap().is_none());
    }
}
