//! Public category and author listings.

use actix_web::{HttpResponse, web};

use folio_shared::ApiResponse;
use folio_shared::dto::CategoryPostsResponse;

use super::mapping;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/categories
pub async fn list_categories(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let categories = state.content.categories_with_counts().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        categories
            .into_iter()
            .map(mapping::category_summary)
            .collect::<Vec<_>>(),
    )))
}

/// GET /api/categories/{slug} - the category with its published posts.
pub async fn category_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let listing = state
        .content
        .list_by_category(&path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;
    let posts = state.content.expand(listing.posts).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(CategoryPostsResponse {
        category: mapping::category(listing.category),
        posts: posts.into_iter().map(mapping::post_details).collect(),
    })))
}

/// GET /api/authors
pub async fn list_authors(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let authors = state.content.authors_with_counts().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        authors
            .into_iter()
            .map(mapping::author_summary)
            .collect::<Vec<_>>(),
    )))
}
