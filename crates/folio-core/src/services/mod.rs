//! Services - the operations the HTTP layer drives, written against ports only.

mod admin;
mod auth_context;
mod content;
mod editor;
mod guard;
mod roles;
mod routes;

pub use admin::{AdminConsole, UserWithRoles};
pub use auth_context::{AuthContext, AuthSnapshot, AuthState, AuthSubscription, RoleLoad};
pub use content::{
    AuthorSummary, CategoryPosts, CategorySummary, ContentReader, PostDetails, ReadPolicy,
};
pub use editor::{DashboardStats, EditorWorkspace};
pub use guard::{authorize, require};
pub use roles::RoleResolver;
pub use routes::{EditorTarget, GateDecision, Route, gate};

use crate::error::{DomainError, RepoError};

/// Map a unique-key violation to a friendly duplicate message.
pub(crate) fn duplicate_as(message: &'static str) -> impl FnOnce(RepoError) -> DomainError {
    move |err| match err {
        RepoError::Duplicate(detail) => {
            tracing::debug!(%detail, "Unique constraint violated");
            DomainError::Duplicate(message.to_string())
        }
        other => DomainError::Store(other),
    }
}
