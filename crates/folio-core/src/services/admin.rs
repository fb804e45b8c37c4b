//! Admin console: role management, author bylines and profile edits.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use super::duplicate_as;
use super::guard::{authorize, require};
use crate::domain::{Author, AuthorInput, Capability, CapabilitySet, Profile, Role, RoleAssignment};
use crate::error::{DomainError, RepoError};
use crate::ports::{AuthorRepository, ProfileRepository, RoleRepository};

/// A profile with every role its account holds.
#[derive(Debug, Clone, Serialize)]
pub struct UserWithRoles {
    pub profile: Profile,
    pub roles: Vec<Role>,
}

#[derive(Clone)]
pub struct AdminConsole {
    profiles: Arc<dyn ProfileRepository>,
    roles: Arc<dyn RoleRepository>,
    authors: Arc<dyn AuthorRepository>,
}

impl AdminConsole {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        roles: Arc<dyn RoleRepository>,
        authors: Arc<dyn AuthorRepository>,
    ) -> Self {
        Self {
            profiles,
            roles,
            authors,
        }
    }

    /// All users, newest first. A failed role fetch still lists the users.
    pub async fn list_users(&self, caps: &CapabilitySet) -> Result<Vec<UserWithRoles>, DomainError> {
        require(caps, Capability::Admin)?;

        let profiles = self.profiles.list_newest_first().await?;
        let assignments = self.roles.list_all().await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to fetch role assignments");
            Vec::new()
        });

        Ok(profiles
            .into_iter()
            .map(|profile| {
                let mut roles: Vec<Role> = assignments
                    .iter()
                    .filter(|a| a.user_id == profile.user_id)
                    .map(|a| a.role)
                    .collect();
                roles.sort();
                UserWithRoles { profile, roles }
            })
            .collect())
    }

    pub async fn add_role(
        &self,
        caps: &CapabilitySet,
        user_id: Uuid,
        role: Role,
    ) -> Result<(), DomainError> {
        require(caps, Capability::Admin)?;

        self.roles
            .assign(RoleAssignment { user_id, role })
            .await
            .map_err(duplicate_as("User already has this role"))?;
        tracing::info!(%user_id, %role, "Role granted");
        Ok(())
    }

    /// Revoke a role. Admins may not revoke their own admin role.
    pub async fn remove_role(
        &self,
        caps: &CapabilitySet,
        actor_id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> Result<(), DomainError> {
        require(caps, Capability::Admin)?;

        if user_id == actor_id && role == Role::Admin {
            return Err(DomainError::Forbidden(
                "You cannot remove your own admin role".to_string(),
            ));
        }

        self.roles.revoke(user_id, role).await?;
        tracing::info!(%user_id, %role, "Role revoked");
        Ok(())
    }

    pub async fn create_author(
        &self,
        caps: &CapabilitySet,
        input: AuthorInput,
    ) -> Result<Author, DomainError> {
        require(caps, Capability::Admin)?;

        let author = Author::new(input)?;
        Ok(self
            .authors
            .insert(author)
            .await
            .map_err(duplicate_as("An author with this slug already exists"))?)
    }

    pub async fn update_author(
        &self,
        caps: &CapabilitySet,
        id: Uuid,
        input: AuthorInput,
    ) -> Result<Author, DomainError> {
        require(caps, Capability::Admin)?;

        let mut author = self
            .authors
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Author", id))?;
        author.apply(input)?;
        Ok(self
            .authors
            .update(author)
            .await
            .map_err(duplicate_as("An author with this slug already exists"))?)
    }

    /// Rejected by the store while any post still references the author.
    pub async fn delete_author(&self, caps: &CapabilitySet, id: Uuid) -> Result<(), DomainError> {
        require(caps, Capability::Admin)?;

        self.authors.delete(id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::not_found("Author", id),
            RepoError::ForeignKey(_) => DomainError::Conflict(
                "This author still has posts; reassign or delete them first".to_string(),
            ),
            other => other.into(),
        })
    }

    /// Users may edit their own profile; admins may edit anyone's.
    pub async fn update_profile(
        &self,
        caps: &CapabilitySet,
        actor_id: Uuid,
        user_id: Uuid,
        full_name: Option<String>,
    ) -> Result<Profile, DomainError> {
        if actor_id != user_id && !authorize(caps, Capability::Admin) {
            return Err(DomainError::Forbidden(
                "You can only edit your own profile".to_string(),
            ));
        }

        let mut profile = self
            .profiles
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Profile", user_id))?;
        profile.full_name = full_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        profile.updated_at = Utc::now();

        Ok(self.profiles.update(profile).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::ports::BaseRepository;

    /// Role store that counts writes.
    #[derive(Default)]
    struct CountingRoles {
        writes: AtomicUsize,
    }

    #[async_trait]
    impl RoleRepository for CountingRoles {
        async fn roles_for_user(&self, _user_id: Uuid) -> Result<Vec<Role>, RepoError> {
            Ok(vec![])
        }
        async fn list_all(&self) -> Result<Vec<RoleAssignment>, RepoError> {
            Err(RepoError::Connection("offline".into()))
        }
        async fn assign(&self, _assignment: RoleAssignment) -> Result<(), RepoError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Err(RepoError::Duplicate("user_roles_pkey".into()))
        }
        async fn revoke(&self, _user_id: Uuid, _role: Role) -> Result<(), RepoError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Unused;

    #[async_trait]
    impl<T: Send + 'static> BaseRepository<T, Uuid> for Unused {
        async fn find_by_id(&self, _id: Uuid) -> Result<Option<T>, RepoError> {
            Ok(None)
        }
        async fn insert(&self, entity: T) -> Result<T, RepoError> {
            Ok(entity)
        }
        async fn update(&self, entity: T) -> Result<T, RepoError> {
            Ok(entity)
        }
        async fn delete(&self, _id: Uuid) -> Result<(), RepoError> {
            Err(RepoError::NotFound)
        }
        async fn count(&self) -> Result<u64, RepoError> {
            Ok(0)
        }
    }

    #[async_trait]
    impl ProfileRepository for Unused {
        async fn find_by_user_id(&self, _user_id: Uuid) -> Result<Option<Profile>, RepoError> {
            Ok(None)
        }
        async fn list_newest_first(&self) -> Result<Vec<Profile>, RepoError> {
            Ok(vec![])
        }
    }

    #[async_trait]
    impl AuthorRepository for Unused {
        async fn list_by_name(&self) -> Result<Vec<Author>, RepoError> {
            Ok(vec![])
        }
    }

    fn console(roles: Arc<CountingRoles>) -> AdminConsole {
        AdminConsole::new(Arc::new(Unused), roles, Arc::new(Unused))
    }

    #[tokio::test]
    async fn test_admin_cannot_remove_own_admin_role() {
        let roles = Arc::new(CountingRoles::default());
        let admin = CapabilitySet::new([Role::Admin]);
        let me = Uuid::new_v4();

        let err = console(roles.clone())
            .remove_role(&admin, me, me, Role::Admin)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Forbidden(_)));
        assert_eq!(roles.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_admin_can_drop_own_editor_role_and_others_admin_role() {
        let roles = Arc::new(CountingRoles::default());
        let admin = CapabilitySet::new([Role::Admin]);
        let me = Uuid::new_v4();
        let console = console(roles.clone());

        console.remove_role(&admin, me, me, Role::Editor).await.unwrap();
        console
            .remove_role(&admin, me, Uuid::new_v4(), Role::Admin)
            .await
            .unwrap();
        assert_eq!(roles.writes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_editor_cannot_manage_roles() {
        let roles = Arc::new(CountingRoles::default());
        let editor = CapabilitySet::new([Role::Editor]);
        let err = console(roles.clone())
            .add_role(&editor, Uuid::new_v4(), Role::Editor)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        assert_eq!(roles.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_duplicate_role_has_friendly_message() {
        let roles = Arc::new(CountingRoles::default());
        let admin = CapabilitySet::new([Role::Admin]);
        let err = console(roles)
            .add_role(&admin, Uuid::new_v4(), Role::Editor)
            .await
            .unwrap_err();
        match err {
            DomainError::Duplicate(msg) => assert_eq!(msg, "User already has this role"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_users_survives_role_fetch_failure() {
        let admin = CapabilitySet::new([Role::Admin]);
        let users = console(Arc::new(CountingRoles::default()))
            .list_users(&admin)
            .await
            .unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn test_profile_edit_requires_self_or_admin() {
        let reader = CapabilitySet::none();
        let err = console(Arc::new(CountingRoles::default()))
            .update_profile(&reader, Uuid::new_v4(), Uuid::new_v4(), Some("Eve".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }
}
