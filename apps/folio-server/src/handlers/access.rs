//! Route gating for the client: which screen a caller may see.

use actix_web::{HttpResponse, web};

use folio_core::services::{GateDecision, Route, gate};
use folio_shared::ApiResponse;
use folio_shared::dto::{RouteAccessQuery, RouteAccessResponse};

use crate::middleware::auth::OptionalCaller;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn decision_name(decision: GateDecision) -> &'static str {
    match decision {
        GateDecision::Allow => "allow",
        GateDecision::Pending => "pending",
        GateDecision::SignInRequired => "sign_in_required",
        GateDecision::AccessDenied => "access_denied",
    }
}

/// GET /api/routes/access?path=/editor
pub async fn route_access(
    state: web::Data<AppState>,
    caller: OptionalCaller,
    query: web::Query<RouteAccessQuery>,
) -> AppResult<HttpResponse> {
    let snapshot = match caller.0 {
        Some(caller) => caller.snapshot,
        None => state.snapshot_for(None).await,
    };

    let RouteAccessQuery { path } = query.into_inner();
    let route = Route::parse(&path);
    let decision = gate(&route, &snapshot);

    Ok(HttpResponse::Ok().json(ApiResponse::ok(RouteAccessResponse {
        required_capability: route.required_capability().map(|c| c.to_string()),
        decision: decision_name(decision).to_string(),
        path,
    })))
}
