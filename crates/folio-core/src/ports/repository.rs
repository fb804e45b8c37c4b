use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Account, Author, Category, Post, Profile, Role, RoleAssignment};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity. Unique key collisions surface as `RepoError::Duplicate`.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity. Last write wins.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;

    /// Number of stored entities.
    async fn count(&self) -> Result<u64, RepoError>;
}

/// Account repository with domain-specific methods.
#[async_trait]
pub trait AccountRepository: BaseRepository<Account, Uuid> {
    /// Find an account by its email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, RepoError>;
}

#[async_trait]
pub trait ProfileRepository: BaseRepository<Profile, Uuid> {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Profile>, RepoError>;

    /// All profiles, most recently created first.
    async fn list_newest_first(&self) -> Result<Vec<Profile>, RepoError>;
}

/// Access to `user_roles` rows.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn roles_for_user(&self, user_id: Uuid) -> Result<Vec<Role>, RepoError>;

    async fn list_all(&self) -> Result<Vec<RoleAssignment>, RepoError>;

    /// Insert an assignment. An existing identical row is `RepoError::Duplicate`.
    async fn assign(&self, assignment: RoleAssignment) -> Result<(), RepoError>;

    async fn revoke(&self, user_id: Uuid, role: Role) -> Result<(), RepoError>;
}

#[async_trait]
pub trait AuthorRepository: BaseRepository<Author, Uuid> {
    /// All authors ordered by name.
    async fn list_by_name(&self) -> Result<Vec<Author>, RepoError>;
}

#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    /// All categories ordered by name.
    async fn list_by_name(&self) -> Result<Vec<Category>, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Every post including drafts, most recently created first.
    async fn list_newest_first(&self) -> Result<Vec<Post>, RepoError>;

    /// Published posts ordered by publication date, newest first.
    async fn list_published(&self) -> Result<Vec<Post>, RepoError>;

    /// A published post by slug. Drafts are never returned.
    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;
}

/// One backend's full set of repositories, chosen once at startup.
#[derive(Clone)]
pub struct Repositories {
    pub accounts: Arc<dyn AccountRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub roles: Arc<dyn RoleRepository>,
    pub authors: Arc<dyn AuthorRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub posts: Arc<dyn PostRepository>,
}
