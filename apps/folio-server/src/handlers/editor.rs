//! Editor workspace endpoints: posts including drafts, categories and image uploads.
//!
//! Every handler requires an authenticated caller; the editor capability itself
//! is checked by the workspace service.

use actix_web::{HttpRequest, HttpResponse, http::header, web};
use uuid::Uuid;

use folio_core::domain::{CategoryInput, ImageUpload, PostDraft, PostPatch};
use folio_shared::ApiResponse;
use folio_shared::dto::{
    CategoryRequest, CreatePostRequest, DashboardStatsResponse, PublishRequest, UpdatePostRequest,
    UploadResponse,
};

use super::mapping;
use crate::middleware::auth::Caller;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// Header carrying the original file name of an uploaded image.
pub const FILE_NAME_HEADER: &str = "x-file-name";

fn draft_from(req: CreatePostRequest) -> PostDraft {
    PostDraft {
        publication: mapping::publication(req.is_published, req.published_at),
        title: req.title,
        slug: req.slug,
        excerpt: req.excerpt,
        body: req.body,
        featured_image_url: req.featured_image_url,
        author_id: req.author_id,
        category_id: req.category_id,
        tags: req.tags,
        read_time_minutes: req.read_time_minutes,
    }
}

fn patch_from(req: UpdatePostRequest) -> PostPatch {
    PostPatch {
        publication: mapping::publication(req.is_published, req.published_at),
        title: req.title,
        slug: req.slug,
        excerpt: req.excerpt,
        body: req.body,
        featured_image_url: req.featured_image_url,
        author_id: req.author_id,
        category_id: req.category_id,
        tags: req.tags,
        read_time_minutes: req.read_time_minutes,
    }
}

fn category_input(req: CategoryRequest) -> CategoryInput {
    CategoryInput {
        name: req.name,
        slug: req.slug,
        description: req.description,
    }
}

/// GET /api/editor/stats
pub async fn stats(state: web::Data<AppState>, caller: Caller) -> AppResult<HttpResponse> {
    let stats = state.editor.dashboard_stats(caller.capabilities()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(DashboardStatsResponse {
        posts: stats.posts,
        authors: stats.authors,
        categories: stats.categories,
    })))
}

/// GET /api/editor/posts
pub async fn list_posts(state: web::Data<AppState>, caller: Caller) -> AppResult<HttpResponse> {
    let posts = state.editor.list_all_posts(caller.capabilities()).await?;
    let posts = state.content.expand(posts).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        posts.into_iter().map(mapping::post_details).collect::<Vec<_>>(),
    )))
}

/// GET /api/editor/posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state
        .editor
        .get_post_for_editing(caller.capabilities(), path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(mapping::post(post))))
}

/// POST /api/editor/posts
pub async fn create_post(
    state: web::Data<AppState>,
    caller: Caller,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .editor
        .create_post(caller.capabilities(), draft_from(body.into_inner()))
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        mapping::post(post),
        "Post created successfully",
    )))
}

/// PUT /api/editor/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .editor
        .update_post(
            caller.capabilities(),
            path.into_inner(),
            patch_from(body.into_inner()),
        )
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        mapping::post(post),
        "Post updated successfully",
    )))
}

/// POST /api/editor/posts/{id}/publish
///
/// The body is optional; without a date a draft is stamped with the current time.
pub async fn publish_post(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<Uuid>,
    body: Option<web::Json<PublishRequest>>,
) -> AppResult<HttpResponse> {
    let at = body.and_then(|b| b.into_inner().published_at);
    let post = state
        .editor
        .publish_post(caller.capabilities(), path.into_inner(), at)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        mapping::post(post),
        "Post published",
    )))
}

/// POST /api/editor/posts/{id}/unpublish
pub async fn unpublish_post(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state
        .editor
        .unpublish_post(caller.capabilities(), path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        mapping::post(post),
        "Post moved to drafts",
    )))
}

/// DELETE /api/editor/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .editor
        .delete_post(caller.capabilities(), path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/editor/categories
pub async fn create_category(
    state: web::Data<AppState>,
    caller: Caller,
    body: web::Json<CategoryRequest>,
) -> AppResult<HttpResponse> {
    let category = state
        .editor
        .create_category(caller.capabilities(), category_input(body.into_inner()))
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(mapping::category(category))))
}

/// PUT /api/editor/categories/{id}
pub async fn update_category(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<Uuid>,
    body: web::Json<CategoryRequest>,
) -> AppResult<HttpResponse> {
    let category = state
        .editor
        .update_category(
            caller.capabilities(),
            path.into_inner(),
            category_input(body.into_inner()),
        )
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(mapping::category(category))))
}

/// DELETE /api/editor/categories/{id}
pub async fn delete_category(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .editor
        .delete_category(caller.capabilities(), path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/editor/images
///
/// Raw image bytes in the body, the MIME type in `Content-Type` and the original
/// file name in `X-File-Name`.
pub async fn upload_image(
    state: web::Data<AppState>,
    caller: Caller,
    req: HttpRequest,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let file_name = req
        .headers()
        .get(FILE_NAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("image")
        .to_string();

    let uploaded = state
        .editor
        .upload_image(
            caller.capabilities(),
            ImageUpload {
                file_name,
                content_type,
                bytes: body.to_vec(),
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(UploadResponse {
        path: uploaded.path,
        url: uploaded.url,
    })))
}
