//! Sign-up, sign-in and session handlers.

use actix_web::{HttpResponse, web};

use folio_shared::ApiResponse;
use folio_shared::dto::{SignInRequest, SignUpRequest, UpdateProfileRequest};

use super::mapping;
use crate::middleware::auth::{Caller, OptionalCaller};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/auth/signup
pub async fn sign_up(
    state: web::Data<AppState>,
    body: web::Json<SignUpRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let session = state
        .identity
        .sign_up(&req.email, &req.password, &req.full_name)
        .await?;

    Ok(HttpResponse::Created().json(mapping::session(
        &session,
        state.tokens.expiration_seconds(),
    )))
}

/// POST /api/auth/signin
pub async fn sign_in(
    state: web::Data<AppState>,
    body: web::Json<SignInRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let session = state.identity.sign_in(&req.email, &req.password).await?;

    Ok(HttpResponse::Ok().json(mapping::session(
        &session,
        state.tokens.expiration_seconds(),
    )))
}

/// POST /api/auth/signout
pub async fn sign_out(state: web::Data<AppState>, caller: Caller) -> AppResult<HttpResponse> {
    state.identity.sign_out(&caller.session).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/auth/refresh
pub async fn refresh(state: web::Data<AppState>, caller: Caller) -> AppResult<HttpResponse> {
    let session = state.identity.refresh(&caller.session).await?;
    Ok(HttpResponse::Ok().json(mapping::session(
        &session,
        state.tokens.expiration_seconds(),
    )))
}

/// GET /api/auth/session - the caller's hydrated auth state.
///
/// Anonymous callers get a resolved, empty snapshot rather than a 401.
pub async fn current_session(
    state: web::Data<AppState>,
    caller: OptionalCaller,
) -> AppResult<HttpResponse> {
    let snapshot = match caller.0 {
        Some(caller) => caller.snapshot,
        None => state.snapshot_for(None).await,
    };
    Ok(HttpResponse::Ok().json(ApiResponse::ok(mapping::snapshot(snapshot))))
}

/// PUT /api/auth/profile
pub async fn update_profile(
    state: web::Data<AppState>,
    caller: Caller,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let profile = state
        .admin
        .update_profile(
            caller.capabilities(),
            caller.user_id(),
            caller.user_id(),
            body.into_inner().full_name,
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        mapping::profile(profile),
        "Profile updated",
    )))
}
