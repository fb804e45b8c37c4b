use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use folio_core::domain::{Account, Author, Category, Post, Profile, Role, RoleAssignment};
use folio_core::error::RepoError;
use folio_core::ports::{
    AccountRepository, AuthorRepository, BaseRepository, CategoryRepository, PostRepository,
    ProfileRepository, RoleRepository,
};

use super::Tables;

/// A row type stored in one of the in-memory tables.
pub(crate) trait Row: Clone + Send + Sync + 'static {
    const TABLE: &'static str;

    fn id(&self) -> Uuid;

    fn table(tables: &Tables) -> &HashMap<Uuid, Self>;

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self>;

    /// Value of the row's unique column besides the primary key.
    fn unique_key(&self) -> Option<String>;

    fn check_references(&self, _tables: &Tables) -> Result<(), RepoError> {
        Ok(())
    }

    /// Runs before the row is removed; may reject the delete or touch other tables.
    fn on_delete(_id: Uuid, _tables: &mut Tables) -> Result<(), RepoError> {
        Ok(())
    }
}

impl Row for Account {
    const TABLE: &'static str = "accounts";

    fn id(&self) -> Uuid {
        self.id
    }
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.accounts
    }
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.accounts
    }
    fn unique_key(&self) -> Option<String> {
        Some(self.email.clone())
    }

    fn on_delete(id: Uuid, tables: &mut Tables) -> Result<(), RepoError> {
        tables.profiles.retain(|_, p| p.user_id != id);
        tables.roles.retain(|(user_id, _)| *user_id != id);
        Ok(())
    }
}

impl Row for Profile {
    const TABLE: &'static str = "profiles";

    fn id(&self) -> Uuid {
        self.id
    }
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.profiles
    }
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.profiles
    }
    fn unique_key(&self) -> Option<String> {
        Some(self.user_id.to_string())
    }

    fn check_references(&self, tables: &Tables) -> Result<(), RepoError> {
        if !tables.accounts.contains_key(&self.user_id) {
            return Err(RepoError::ForeignKey(
                "profiles.user_id references a missing account".to_string(),
            ));
        }
        Ok(())
    }
}

impl Row for Author {
    const TABLE: &'static str = "authors";

    fn id(&self) -> Uuid {
        self.id
    }
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.authors
    }
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.authors
    }
    fn unique_key(&self) -> Option<String> {
        Some(self.slug.clone())
    }

    fn on_delete(id: Uuid, tables: &mut Tables) -> Result<(), RepoError> {
        if tables.posts.values().any(|p| p.author_id == Some(id)) {
            return Err(RepoError::ForeignKey(
                "posts.author_id still references this author".to_string(),
            ));
        }
        Ok(())
    }
}

impl Row for Category {
    const TABLE: &'static str = "categories";

    fn id(&self) -> Uuid {
        self.id
    }
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.categories
    }
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.categories
    }
    fn unique_key(&self) -> Option<String> {
        Some(self.slug.clone())
    }

    fn on_delete(id: Uuid, tables: &mut Tables) -> Result<(), RepoError> {
        for post in tables.posts.values_mut() {
            if post.category_id == Some(id) {
                post.category_id = None;
            }
        }
        Ok(())
    }
}

impl Row for Post {
    const TABLE: &'static str = "posts";

    fn id(&self) -> Uuid {
        self.id
    }
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.posts
    }
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.posts
    }
    fn unique_key(&self) -> Option<String> {
        Some(self.slug.clone())
    }

    fn check_references(&self, tables: &Tables) -> Result<(), RepoError> {
        if let Some(author_id) = self.author_id {
            if !tables.authors.contains_key(&author_id) {
                return Err(RepoError::ForeignKey(
                    "posts.author_id references a missing author".to_string(),
                ));
            }
        }
        if let Some(category_id) = self.category_id {
            if !tables.categories.contains_key(&category_id) {
                return Err(RepoError::ForeignKey(
                    "posts.category_id references a missing category".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Generic in-memory repository over one table.
pub(crate) struct MemoryRepository<T> {
    tables: Arc<RwLock<Tables>>,
    _row: PhantomData<T>,
}

impl<T: Row> MemoryRepository<T> {
    pub(crate) fn new(tables: Arc<RwLock<Tables>>) -> Self {
        Self {
            tables,
            _row: PhantomData,
        }
    }

    fn check_unique(row: &T, tables: &Tables) -> Result<(), RepoError> {
        let Some(key) = row.unique_key() else {
            return Ok(());
        };
        let taken = T::table(tables)
            .values()
            .any(|other| other.id() != row.id() && other.unique_key().as_deref() == Some(&key));
        if taken {
            return Err(RepoError::Duplicate(format!(
                "duplicate key value violates unique constraint on {} ({})",
                T::TABLE,
                key
            )));
        }
        Ok(())
    }

    async fn select(&self, keep: impl Fn(&T) -> bool) -> Vec<T> {
        let tables = self.tables.read().await;
        T::table(&tables)
            .values()
            .filter(|row| keep(row))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl<T: Row> BaseRepository<T, Uuid> for MemoryRepository<T> {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        let tables = self.tables.read().await;
        Ok(T::table(&tables).get(&id).cloned())
    }

    async fn insert(&self, entity: T) -> Result<T, RepoError> {
        let mut tables = self.tables.write().await;
        if T::table(&tables).contains_key(&entity.id()) {
            return Err(RepoError::Duplicate(format!(
                "duplicate key value violates unique constraint {}_pkey",
                T::TABLE
            )));
        }
        Self::check_unique(&entity, &tables)?;
        entity.check_references(&tables)?;

        T::table_mut(&mut tables).insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: T) -> Result<T, RepoError> {
        let mut tables = self.tables.write().await;
        if !T::table(&tables).contains_key(&entity.id()) {
            return Err(RepoError::NotFound);
        }
        Self::check_unique(&entity, &tables)?;
        entity.check_references(&tables)?;

        T::table_mut(&mut tables).insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if !T::table(&tables).contains_key(&id) {
            return Err(RepoError::NotFound);
        }
        T::on_delete(id, &mut tables)?;
        T::table_mut(&mut tables).remove(&id);
        Ok(())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(T::table(&tables).len() as u64)
    }
}

#[async_trait]
impl AccountRepository for MemoryRepository<Account> {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, RepoError> {
        Ok(self.select(|a| a.email == email).await.into_iter().next())
    }
}

#[async_trait]
impl ProfileRepository for MemoryRepository<Profile> {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Profile>, RepoError> {
        Ok(self
            .select(|p| p.user_id == user_id)
            .await
            .into_iter()
            .next())
    }

    async fn list_newest_first(&self) -> Result<Vec<Profile>, RepoError> {
        let mut profiles = self.select(|_| true).await;
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(profiles)
    }
}

#[async_trait]
impl AuthorRepository for MemoryRepository<Author> {
    async fn list_by_name(&self) -> Result<Vec<Author>, RepoError> {
        let mut authors = self.select(|_| true).await;
        authors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(authors)
    }
}

#[async_trait]
impl CategoryRepository for MemoryRepository<Category> {
    async fn list_by_name(&self) -> Result<Vec<Category>, RepoError> {
        let mut categories = self.select(|_| true).await;
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        Ok(self.select(|c| c.slug == slug).await.into_iter().next())
    }
}

#[async_trait]
impl PostRepository for MemoryRepository<Post> {
    async fn list_newest_first(&self) -> Result<Vec<Post>, RepoError> {
        let mut posts = self.select(|_| true).await;
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn list_published(&self) -> Result<Vec<Post>, RepoError> {
        let mut posts = self.select(Post::is_published).await;
        posts.sort_by(Post::cmp_by_recency);
        Ok(posts)
    }

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        Ok(self
            .select(|p| p.slug == slug && p.is_published())
            .await
            .into_iter()
            .next())
    }
}

/// In-memory `user_roles` table.
pub(crate) struct MemoryRoleRepository {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryRoleRepository {
    pub(crate) fn new(tables: Arc<RwLock<Tables>>) -> Self {
        Self { tables }
    }
}

#[async_trait]
impl RoleRepository for MemoryRoleRepository {
    async fn roles_for_user(&self, user_id: Uuid) -> Result<Vec<Role>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .roles
            .iter()
            .filter(|(id, _)| *id == user_id)
            .map(|(_, role)| *role)
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<RoleAssignment>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .roles
            .iter()
            .map(|(user_id, role)| RoleAssignment {
                user_id: *user_id,
                role: *role,
            })
            .collect())
    }

    async fn assign(&self, assignment: RoleAssignment) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.accounts.contains_key(&assignment.user_id) {
            return Err(RepoError::ForeignKey(
                "user_roles.user_id references a missing account".to_string(),
            ));
        }
        if !tables.roles.insert((assignment.user_id, assignment.role)) {
            return Err(RepoError::Duplicate(
                "duplicate key value violates unique constraint user_roles_pkey".to_string(),
            ));
        }
        Ok(())
    }

    async fn revoke(&self, user_id: Uuid, role: Role) -> Result<(), RepoError> {
        self.tables.write().await.roles.remove(&(user_id, role));
        Ok(())
    }
}
