//! Authentication extractors.
//!
//! A bearer token is turned into a session by the identity provider, then the
//! caller's roles are hydrated from the store on every request; roles are never
//! read from the token itself.

use std::future::Future;
use std::pin::Pin;

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use uuid::Uuid;

use folio_core::domain::CapabilitySet;
use folio_core::ports::{AuthError, Session};
use folio_core::services::AuthSnapshot;

use super::error::AppError;
use crate::state::AppState;

/// Authenticated caller with hydrated capabilities.
///
/// Use this in handlers to require authentication:
/// ```ignore
/// async fn protected_route(caller: Caller) -> impl Responder {
///     format!("Hello, user {}!", caller.user_id())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Caller {
    pub session: Session,
    pub snapshot: AuthSnapshot,
}

impl Caller {
    pub fn user_id(&self) -> Uuid {
        self.session.user.id
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.snapshot.capabilities
    }
}

/// Extract the bearer token, if the request carries one.
fn bearer_token(req: &HttpRequest) -> Result<Option<String>, AuthError> {
    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(|t| Some(t.trim().to_string()))
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))
}

fn app_state(req: &HttpRequest) -> Result<web::Data<AppState>, AppError> {
    req.app_data::<web::Data<AppState>>().cloned().ok_or_else(|| {
        tracing::error!("AppState not found in app data");
        AppError::Internal("Server configuration error".to_string())
    })
}

async fn resolve(
    state: web::Data<AppState>,
    token: String,
) -> Result<Caller, AppError> {
    let session = state
        .identity
        .get_session(&token)
        .await?
        .ok_or(AuthError::SessionRevoked)?;
    let snapshot = state.snapshot_for(Some(session.clone())).await;
    Ok(Caller { session, snapshot })
}

impl FromRequest for Caller {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = app_state(req);
        let token = bearer_token(req);

        Box::pin(async move {
            let state = state?;
            let token = token?.ok_or(AuthError::MissingAuth)?;
            resolve(state, token).await
        })
    }
}

/// Optional caller extractor - doesn't fail if not authenticated.
pub struct OptionalCaller(pub Option<Caller>);

impl FromRequest for OptionalCaller {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = app_state(req);
        let token = bearer_token(req).ok().flatten();

        Box::pin(async move {
            let state = state?;
            let Some(token) = token else {
                return Ok(OptionalCaller(None));
            };
            match resolve(state, token).await {
                Ok(caller) => Ok(OptionalCaller(Some(caller))),
                Err(AppError::Unauthorized(_)) => Ok(OptionalCaller(None)),
                Err(e) => Err(e),
            }
        })
    }
}
