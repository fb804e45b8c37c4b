//! Client routes and the access decision for each of them.

use serde::Serialize;
use uuid::Uuid;

use super::auth_context::AuthSnapshot;
use super::guard::authorize;
use crate::domain::Capability;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorTarget {
    New,
    Existing(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Post { slug: String },
    About,
    Categories,
    Category { slug: String },
    Auth,
    Editor,
    EditorPost { target: EditorTarget },
    Admin,
    NotFound,
}

impl Route {
    /// Parse a client path. Query strings and fragments are ignored.
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["post", slug] => Route::Post {
                slug: (*slug).to_string(),
            },
            ["about"] => Route::About,
            ["categories"] => Route::Categories,
            ["category", slug] => Route::Category {
                slug: (*slug).to_string(),
            },
            ["auth"] => Route::Auth,
            ["editor"] => Route::Editor,
            ["editor", "post", "new"] => Route::EditorPost {
                target: EditorTarget::New,
            },
            ["editor", "post", id] => match Uuid::parse_str(id) {
                Ok(id) => Route::EditorPost {
                    target: EditorTarget::Existing(id),
                },
                Err(_) => Route::NotFound,
            },
            ["admin"] => Route::Admin,
            _ => Route::NotFound,
        }
    }

    pub fn required_capability(&self) -> Option<Capability> {
        match self {
            Route::Editor | Route::EditorPost { .. } => Some(Capability::Editor),
            Route::Admin => Some(Capability::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateDecision {
    Allow,
    /// Still hydrating; render a loading state, not a denial.
    Pending,
    SignInRequired,
    AccessDenied,
}

pub fn gate(route: &Route, snapshot: &AuthSnapshot) -> GateDecision {
    let Some(required) = route.required_capability() else {
        return GateDecision::Allow;
    };

    if !snapshot.session_resolved {
        return GateDecision::Pending;
    }
    if snapshot.user.is_none() {
        return GateDecision::SignInRequired;
    }
    if !snapshot.is_hydrated() {
        return GateDecision::Pending;
    }

    if authorize(&snapshot.capabilities, required) {
        GateDecision::Allow
    } else {
        GateDecision::AccessDenied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Account, CapabilitySet, Role};

    fn snapshot(user: bool, roles: Option<Vec<Role>>) -> AuthSnapshot {
        AuthSnapshot {
            user: user.then(|| Account::new("a@b.io".into(), String::new())),
            profile: None,
            capabilities: CapabilitySet::new(roles.clone().unwrap_or_default()),
            session_resolved: true,
            roles_loaded: roles.is_some(),
        }
    }

    #[test]
    fn test_parse_routes() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(
            Route::parse("/post/ai-transforming-business-operations"),
            Route::Post {
                slug: "ai-transforming-business-operations".into()
            }
        );
        assert_eq!(Route::parse("/categories"), Route::Categories);
        assert_eq!(
            Route::parse("/category/ai?page=2"),
            Route::Category { slug: "ai".into() }
        );
        assert_eq!(
            Route::parse("/editor/post/new"),
            Route::EditorPost {
                target: EditorTarget::New
            }
        );
        let id = Uuid::new_v4();
        assert_eq!(
            Route::parse(&format!("/editor/post/{id}")),
            Route::EditorPost {
                target: EditorTarget::Existing(id)
            }
        );
        assert_eq!(Route::parse("/editor/post/not-an-id"), Route::NotFound);
        assert_eq!(Route::parse("/admin/"), Route::Admin);
        assert_eq!(Route::parse("/nowhere"), Route::NotFound);
    }

    #[test]
    fn test_public_routes_always_allowed() {
        let unresolved = AuthSnapshot {
            session_resolved: false,
            ..snapshot(false, None)
        };
        assert_eq!(gate(&Route::Home, &unresolved), GateDecision::Allow);
        assert_eq!(gate(&Route::NotFound, &unresolved), GateDecision::Allow);
    }

    #[test]
    fn test_no_denial_while_roles_are_loading() {
        let loading = snapshot(true, None);
        assert_eq!(gate(&Route::Editor, &loading), GateDecision::Pending);
        assert_eq!(gate(&Route::Admin, &loading), GateDecision::Pending);
    }

    #[test]
    fn test_gated_routes() {
        let anonymous = snapshot(false, Some(vec![]));
        assert_eq!(gate(&Route::Editor, &anonymous), GateDecision::SignInRequired);

        let reader = snapshot(true, Some(vec![]));
        assert_eq!(gate(&Route::Editor, &reader), GateDecision::AccessDenied);

        let editor = snapshot(true, Some(vec![Role::Editor]));
        assert_eq!(gate(&Route::Editor, &editor), GateDecision::Allow);
        assert_eq!(gate(&Route::Admin, &editor), GateDecision::AccessDenied);

        let admin = snapshot(true, Some(vec![Role::Admin]));
        assert_eq!(gate(&Route::Admin, &admin), GateDecision::Allow);
        assert_eq!(
            gate(
                &Route::EditorPost {
                    target: EditorTarget::New
                },
                &admin
            ),
            GateDecision::Allow
        );
    }
}
