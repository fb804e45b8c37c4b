//! Public post endpoints. Drafts never leave through here.

use actix_web::{HttpResponse, web};
use serde::Deserialize;

use folio_shared::ApiResponse;

use super::mapping;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const DEFAULT_RELATED: usize = 2;
const MAX_RELATED: usize = 12;

#[derive(Debug, Deserialize)]
pub struct RelatedQuery {
    pub limit: Option<usize>,
}

fn post_not_found() -> AppError {
    AppError::NotFound("Post not found".to_string())
}

/// GET /api/posts
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.content.list_published().await?;
    let posts = state.content.expand(posts).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        posts.into_iter().map(mapping::post_details).collect::<Vec<_>>(),
    )))
}

/// GET /api/posts/{slug}
pub async fn get_by_slug(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = state
        .content
        .get_by_slug(&path.into_inner())
        .await?
        .ok_or_else(post_not_found)?;
    let details = state
        .content
        .expand(vec![post])
        .await?
        .into_iter()
        .next()
        .ok_or_else(post_not_found)?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(mapping::post_details(details))))
}

/// GET /api/posts/{slug}/related?limit=2
pub async fn related(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<RelatedQuery>,
) -> AppResult<HttpResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_RELATED).min(MAX_RELATED);
    let posts = state
        .content
        .related_posts(&path.into_inner(), limit)
        .await?
        .ok_or_else(post_not_found)?;
    let posts = state.content.expand(posts).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        posts.into_iter().map(mapping::post_details).collect::<Vec<_>>(),
    )))
}
