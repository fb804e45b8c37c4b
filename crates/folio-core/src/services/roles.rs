use std::sync::Arc;

use uuid::Uuid;

use crate::domain::CapabilitySet;
use crate::ports::RoleRepository;

/// Derives a user's capability set from their stored role rows.
#[derive(Clone)]
pub struct RoleResolver {
    roles: Arc<dyn RoleRepository>,
}

impl RoleResolver {
    pub fn new(roles: Arc<dyn RoleRepository>) -> Self {
        Self { roles }
    }

    /// Fetch and resolve roles. A failed fetch resolves to the reader tier
    /// rather than blocking: callers always get a loaded set.
    pub async fn resolve(&self, user_id: Uuid) -> CapabilitySet {
        match self.roles.roles_for_user(user_id).await {
            Ok(roles) => CapabilitySet::new(roles),
            Err(e) => {
                tracing::warn!(%user_id, error = %e, "Role fetch failed, treating user as reader");
                CapabilitySet::none()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::domain::{Role, RoleAssignment};
    use crate::error::RepoError;

    struct FixedRoles(Result<Vec<Role>, ()>);

    #[async_trait]
    impl RoleRepository for FixedRoles {
        async fn roles_for_user(&self, _user_id: Uuid) -> Result<Vec<Role>, RepoError> {
            self.0
                .clone()
                .map_err(|_| RepoError::Connection("connection reset".into()))
        }
        async fn list_all(&self) -> Result<Vec<RoleAssignment>, RepoError> {
            Ok(vec![])
        }
        async fn assign(&self, _assignment: RoleAssignment) -> Result<(), RepoError> {
            Ok(())
        }
        async fn revoke(&self, _user_id: Uuid, _role: Role) -> Result<(), RepoError> {
            Ok(())
        }
    }

    async fn resolve(rows: Result<Vec<Role>, ()>) -> CapabilitySet {
        RoleResolver::new(Arc::new(FixedRoles(rows)))
            .resolve(Uuid::new_v4())
            .await
    }

    #[tokio::test]
    async fn test_admin_implies_editor() {
        let caps = resolve(Ok(vec![Role::Admin])).await;
        assert!(caps.is_admin());
        assert!(caps.is_editor());
    }

    #[tokio::test]
    async fn test_editor_only() {
        let caps = resolve(Ok(vec![Role::Editor])).await;
        assert!(!caps.is_admin());
        assert!(caps.is_editor());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_reader_tier() {
        let caps = resolve(Err(())).await;
        assert!(!caps.is_admin());
        assert!(!caps.is_editor());
    }
}
