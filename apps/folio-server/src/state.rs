//! Application state - shared across all handlers.

use std::sync::Arc;

use anyhow::Context;

use folio_core::domain::{Role, RoleAssignment};
use folio_core::error::RepoError;
use folio_core::ports::{
    AuthError, IdentityProvider, ObjectStorage, ProfileRepository, Repositories, Session,
    TokenService,
};
use folio_core::services::{
    AdminConsole, AuthContext, AuthSnapshot, ContentReader, EditorWorkspace, ReadPolicy,
    RoleResolver,
};
use folio_infra::{
    Argon2PasswordService, InMemoryObjectStorage, InMemoryStore, JwtConfig, JwtTokenService,
    LocalIdentityProvider, LocalObjectStorage,
};

use crate::config::{AdminBootstrap, AppConfig, StoreBackend};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityProvider>,
    pub tokens: Arc<dyn TokenService>,
    pub resolver: RoleResolver,
    pub profiles: Arc<dyn ProfileRepository>,
    pub storage: Arc<dyn ObjectStorage>,
    pub content: ContentReader,
    pub editor: EditorWorkspace,
    pub admin: AdminConsole,
}

impl AppState {
    /// Build the application state for the configured backend.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let repos = match config.store_backend {
            StoreBackend::Fixture => {
                tracing::info!("Using the in-memory fixture store");
                InMemoryStore::seeded().repositories()
            }
            #[cfg(feature = "postgres")]
            StoreBackend::Postgres => {
                let db_config = config
                    .database
                    .as_ref()
                    .context("DATABASE_URL is not configured")?;
                let conn = folio_infra::database::connect(db_config)
                    .await
                    .context("Failed to connect to database")?;
                folio_infra::database::repositories(conn)
            }
            #[cfg(not(feature = "postgres"))]
            StoreBackend::Postgres => anyhow::bail!("This build has no postgres support"),
        };

        let storage: Arc<dyn ObjectStorage> = match &config.media_dir {
            Some(dir) => {
                tracing::info!(dir = %dir.display(), "Storing media on disk");
                Arc::new(LocalObjectStorage::new(
                    dir.clone(),
                    config.media_public_base_url.clone(),
                ))
            }
            None => Arc::new(InMemoryObjectStorage::new(
                config.media_public_base_url.clone(),
            )),
        };

        let state = Self::from_parts(repos.clone(), storage, config.jwt.clone(), config.read_policy);

        if let Some(admin) = &config.admin_bootstrap {
            state
                .ensure_admin(&repos, admin)
                .await
                .context("Failed to bootstrap admin account")?;
        }

        tracing::info!("Application state initialized");
        Ok(state)
    }

    /// Wire services over an already chosen backend.
    pub fn from_parts(
        repos: Repositories,
        storage: Arc<dyn ObjectStorage>,
        jwt: JwtConfig,
        policy: ReadPolicy,
    ) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(jwt));
        let identity: Arc<dyn IdentityProvider> = Arc::new(LocalIdentityProvider::new(
            repos.accounts.clone(),
            repos.profiles.clone(),
            tokens.clone(),
            Arc::new(Argon2PasswordService::new()),
        ));

        Self {
            identity,
            tokens,
            resolver: RoleResolver::new(repos.roles.clone()),
            profiles: repos.profiles.clone(),
            content: ContentReader::new(
                repos.posts.clone(),
                repos.authors.clone(),
                repos.categories.clone(),
                policy,
            ),
            editor: EditorWorkspace::new(
                repos.posts.clone(),
                repos.authors.clone(),
                repos.categories.clone(),
                storage.clone(),
            ),
            admin: AdminConsole::new(repos.profiles, repos.roles, repos.authors),
            storage,
        }
    }

    /// Resolve a session (or none) into a hydrated auth snapshot.
    pub async fn snapshot_for(&self, session: Option<Session>) -> AuthSnapshot {
        let ctx = AuthContext::new(self.resolver.clone(), self.profiles.clone());
        ctx.begin_restore().await;
        ctx.restore(session).await;
        ctx.snapshot().await
    }

    async fn ensure_admin(
        &self,
        repos: &Repositories,
        admin: &AdminBootstrap,
    ) -> anyhow::Result<()> {
        let user_id = match self
            .identity
            .sign_up(&admin.email, &admin.password, "Administrator")
            .await
        {
            Ok(session) => session.user.id,
            Err(AuthError::AlreadyRegistered) => repos
                .accounts
                .find_by_email(&admin.email.trim().to_lowercase())
                .await?
                .context("Admin account vanished during bootstrap")?
                .id,
            Err(e) => return Err(e.into()),
        };

        match repos
            .roles
            .assign(RoleAssignment {
                user_id,
                role: Role::Admin,
            })
            .await
        {
            Ok(()) => tracing::info!(%user_id, "Admin role granted"),
            Err(RepoError::Duplicate(_)) => {}
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }
}
