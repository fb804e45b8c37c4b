//! Admin console endpoints: users and roles, author bylines.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use folio_core::domain::{AuthorInput, Role};
use folio_shared::ApiResponse;
use folio_shared::dto::{AddRoleRequest, AuthorRequest, UpdateProfileRequest};

use super::mapping;
use crate::middleware::auth::Caller;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn author_input(req: AuthorRequest) -> AuthorInput {
    AuthorInput {
        name: req.name,
        slug: req.slug,
        bio: req.bio,
        avatar_url: req.avatar_url,
    }
}

/// GET /api/admin/users
pub async fn list_users(state: web::Data<AppState>, caller: Caller) -> AppResult<HttpResponse> {
    let users = state.admin.list_users(caller.capabilities()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        users
            .into_iter()
            .map(mapping::user_with_roles)
            .collect::<Vec<_>>(),
    )))
}

/// Role names from bodies and paths are matched case-insensitively.
fn parse_role(raw: &str) -> AppResult<Role> {
    Ok(raw.trim().to_lowercase().parse::<Role>()?)
}

/// POST /api/admin/users/{id}/roles
pub async fn add_role(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<Uuid>,
    body: web::Json<AddRoleRequest>,
) -> AppResult<HttpResponse> {
    let role = parse_role(&body.role)?;
    state
        .admin
        .add_role(caller.capabilities(), path.into_inner(), role)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        role.to_string(),
        "Role added successfully",
    )))
}

/// DELETE /api/admin/users/{id}/roles/{role}
pub async fn remove_role(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<(Uuid, String)>,
) -> AppResult<HttpResponse> {
    let (user_id, role) = path.into_inner();
    let role = parse_role(&role)?;
    state
        .admin
        .remove_role(caller.capabilities(), caller.user_id(), user_id, role)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// PUT /api/admin/users/{id}/profile
pub async fn update_user_profile(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let profile = state
        .admin
        .update_profile(
            caller.capabilities(),
            caller.user_id(),
            path.into_inner(),
            body.into_inner().full_name,
        )
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(mapping::profile(profile))))
}

/// POST /api/admin/authors
pub async fn create_author(
    state: web::Data<AppState>,
    caller: Caller,
    body: web::Json<AuthorRequest>,
) -> AppResult<HttpResponse> {
    let author = state
        .admin
        .create_author(caller.capabilities(), author_input(body.into_inner()))
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(mapping::author(author))))
}

/// PUT /api/admin/authors/{id}
pub async fn update_author(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<Uuid>,
    body: web::Json<AuthorRequest>,
) -> AppResult<HttpResponse> {
    let author = state
        .admin
        .update_author(
            caller.capabilities(),
            path.into_inner(),
            author_input(body.into_inner()),
        )
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(mapping::author(author))))
}

/// DELETE /api/admin/authors/{id}
pub async fn delete_author(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .admin
        .delete_author(caller.capabilities(), path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
