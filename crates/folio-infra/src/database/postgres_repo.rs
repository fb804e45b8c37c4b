//! PostgreSQL repository implementations.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::NullOrdering;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbConn, EntityTrait, Order, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use folio_core::domain::{Account, Author, Category, Post, Profile, Role, RoleAssignment};
use folio_core::error::RepoError;
use folio_core::ports::{
    AccountRepository, AuthorRepository, CategoryRepository, PostRepository, ProfileRepository,
    Repositories, RoleRepository,
};

use super::entity::account::{self, Entity as AccountEntity};
use super::entity::author::{self, Entity as AuthorEntity};
use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::profile::{self, Entity as ProfileEntity};
use super::entity::user_role::{self, Entity as UserRoleEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

pub type PostgresAccountRepository = PostgresBaseRepository<AccountEntity>;
pub type PostgresProfileRepository = PostgresBaseRepository<ProfileEntity>;
pub type PostgresAuthorRepository = PostgresBaseRepository<AuthorEntity>;
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// Build every repository over one connection pool.
pub fn repositories(db: DbConn) -> Repositories {
    Repositories {
        accounts: Arc::new(PostgresAccountRepository::new(db.clone())),
        profiles: Arc::new(PostgresProfileRepository::new(db.clone())),
        roles: Arc::new(PostgresRoleRepository::new(db.clone())),
        authors: Arc::new(PostgresAuthorRepository::new(db.clone())),
        categories: Arc::new(PostgresCategoryRepository::new(db.clone())),
        posts: Arc::new(PostgresPostRepository::new(db)),
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, RepoError> {
        tracing::debug!(user_email = %folio_core::domain::mask_email(email), "Finding account by email");

        let result = AccountEntity::find()
            .filter(account::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Profile>, RepoError> {
        let result = ProfileEntity::find()
            .filter(profile::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_newest_first(&self) -> Result<Vec<Profile>, RepoError> {
        let result = ProfileEntity::find()
            .order_by_desc(profile::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl AuthorRepository for PostgresAuthorRepository {
    async fn list_by_name(&self) -> Result<Vec<Author>, RepoError> {
        let result = AuthorEntity::find()
            .order_by_asc(author::Column::Name)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn list_by_name(&self) -> Result<Vec<Category>, RepoError> {
        let result = CategoryEntity::find()
            .order_by_asc(category::Column::Name)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list_newest_first(&self) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn list_published(&self) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::IsPublished.eq(true))
            .order_by_with_nulls(post::Column::PublishedAt, Order::Desc, NullOrdering::Last)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .filter(post::Column::IsPublished.eq(true))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

/// PostgreSQL role repository over `user_roles`.
pub struct PostgresRoleRepository {
    db: DbConn,
}

impl PostgresRoleRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

fn parse_assignment(model: user_role::Model) -> Option<RoleAssignment> {
    match model.role.parse::<Role>() {
        Ok(role) => Some(RoleAssignment {
            user_id: model.user_id,
            role,
        }),
        Err(_) => {
            tracing::warn!(user_id = %model.user_id, role = %model.role, "Ignoring unknown role");
            None
        }
    }
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn roles_for_user(&self, user_id: Uuid) -> Result<Vec<Role>, RepoError> {
        let rows = UserRoleEntity::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .filter_map(parse_assignment)
            .map(|a| a.role)
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<RoleAssignment>, RepoError> {
        let rows = UserRoleEntity::find()
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().filter_map(parse_assignment).collect())
    }

    async fn assign(&self, assignment: RoleAssignment) -> Result<(), RepoError> {
        user_role::ActiveModel {
            user_id: Set(assignment.user_id),
            role: Set(assignment.role.as_str().to_string()),
        }
        .insert(&self.db)
        .await
        .map_err(map_db_err)?;

        Ok(())
    }

    async fn revoke(&self, user_id: Uuid, role: Role) -> Result<(), RepoError> {
        UserRoleEntity::delete_many()
            .filter(user_role::Column::UserId.eq(user_id))
            .filter(user_role::Column::Role.eq(role.as_str()))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(())
    }
}
