//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Request to create an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Request to sign in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// An account's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Response containing an access token for a new or refreshed session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

/// Who the caller is and whether it is safe to render gated screens yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSnapshotResponse {
    pub user: Option<UserResponse>,
    pub profile: Option<ProfileResponse>,
    pub roles: Vec<String>,
    pub is_admin: bool,
    pub is_editor: bool,
    pub session_resolved: bool,
    pub roles_loaded: bool,
    pub is_hydrated: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Published posts by this author, on listings only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_count: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Published posts filed here, on listings only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_count: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    /// Rich-text HTML.
    pub body: String,
    pub featured_image_url: Option<String>,
    pub author_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryResponse>,
    pub tags: Vec<String>,
    pub read_time_minutes: u32,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPostsResponse {
    pub category: CategoryResponse,
    pub posts: Vec<PostResponse>,
}

// ---------------------------------------------------------------------------
// Editor
// ---------------------------------------------------------------------------

/// Body of `POST /api/editor/posts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    /// Derived from the title when omitted.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub featured_image_url: Option<String>,
    #[serde(default)]
    pub author_id: Option<Uuid>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub read_time_minutes: Option<u32>,
    /// `true` publishes on save, `false` or absent keeps a draft.
    #[serde(default)]
    pub is_published: Option<bool>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

/// Body of `PUT /api/editor/posts/{id}`. Absent fields are left unchanged;
/// `null` clears a nullable field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub excerpt: Option<Option<String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub featured_image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub author_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<Uuid>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub read_time_minutes: Option<u32>,
    #[serde(default)]
    pub is_published: Option<bool>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublishRequest {
    /// Defaults to now, or the existing date for an already published post.
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DashboardStatsResponse {
    pub posts: u64,
    pub authors: u64,
    pub categories: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub path: String,
    pub url: String,
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorRequest {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddRoleRequest {
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserWithRolesResponse {
    pub profile: ProfileResponse,
    pub roles: Vec<String>,
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteAccessQuery {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteAccessResponse {
    pub path: String,
    pub required_capability: Option<String>,
    /// One of `allow`, `pending`, `sign_in_required`, `access_denied`.
    pub decision: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let req: UpdatePostRequest =
            serde_json::from_str(r#"{"title":"New","category_id":null}"#).unwrap();

        assert_eq!(req.title.as_deref(), Some("New"));
        assert_eq!(req.category_id, Some(None));
        assert_eq!(req.author_id, None);
        assert_eq!(req.excerpt, None);
    }

    #[test]
    fn test_create_defaults() {
        let req: CreatePostRequest = serde_json::from_str(r#"{"title":"Draft"}"#).unwrap();
        assert!(req.body.is_empty());
        assert!(req.tags.is_empty());
        assert_eq!(req.is_published, None);
    }

    #[test]
    fn test_listing_counts_are_optional() {
        let category = CategoryResponse {
            id: Uuid::new_v4(),
            name: "Data Culture".into(),
            slug: "data-culture".into(),
            description: None,
            created_at: Utc::now(),
            post_count: None,
        };
        let body = serde_json::to_value(&category).unwrap();
        assert!(body.get("post_count").is_none());
    }
}
