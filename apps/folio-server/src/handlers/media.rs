//! Serves uploaded images back from object storage.

use actix_web::{HttpResponse, http::header, web};

use folio_core::ports::StorageError;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /media/{path:.*}
pub async fn serve(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let path = path.into_inner();
    let object = state.storage.download(&path).await.map_err(|e| match e {
        StorageError::InvalidPath(p) => AppError::BadRequest(format!("Invalid media path: {p}")),
        other => AppError::Internal(other.to_string()),
    })?;

    let object = object.ok_or_else(|| AppError::NotFound("Media not found".to_string()))?;
    Ok(HttpResponse::Ok()
        .content_type(object.content_type)
        .insert_header((header::CACHE_CONTROL, "public, max-age=31536000, immutable"))
        .insert_header((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .insert_header((header::CONTENT_SECURITY_POLICY, "default-src 'none'; sandbox"))
        .body(object.bytes))
}
