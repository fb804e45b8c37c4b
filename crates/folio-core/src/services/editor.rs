//! Editor workspace: the write side for posts and categories, plus image uploads.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::duplicate_as;
use super::guard::require;
use crate::domain::{
    Capability, CapabilitySet, Category, CategoryInput, IMAGE_BUCKET, ImageUpload, Post,
    PostDraft, PostPatch, PublishIntent, UploadedImage,
};
use crate::error::{DomainError, RepoError};
use crate::ports::{AuthorRepository, CategoryRepository, ObjectStorage, PostRepository};

const POST_SLUG_TAKEN: &str = "A post with this slug already exists";
const CATEGORY_SLUG_TAKEN: &str = "A category with this slug already exists";

/// Totals shown on the editor dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub posts: u64,
    pub authors: u64,
    pub categories: u64,
}

#[derive(Clone)]
pub struct EditorWorkspace {
    posts: Arc<dyn PostRepository>,
    authors: Arc<dyn AuthorRepository>,
    categories: Arc<dyn CategoryRepository>,
    storage: Arc<dyn ObjectStorage>,
}

impl EditorWorkspace {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        authors: Arc<dyn AuthorRepository>,
        categories: Arc<dyn CategoryRepository>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self {
            posts,
            authors,
            categories,
            storage,
        }
    }

    /// Every post including drafts, newest first.
    pub async fn list_all_posts(&self, caps: &CapabilitySet) -> Result<Vec<Post>, DomainError> {
        require(caps, Capability::Editor)?;
        Ok(self.posts.list_newest_first().await?)
    }

    pub async fn dashboard_stats(&self, caps: &CapabilitySet) -> Result<DashboardStats, DomainError> {
        require(caps, Capability::Editor)?;
        Ok(DashboardStats {
            posts: self.posts.count().await?,
            authors: self.authors.count().await?,
            categories: self.categories.count().await?,
        })
    }

    /// Fetch any post, draft or not, by id.
    pub async fn get_post_for_editing(
        &self,
        caps: &CapabilitySet,
        id: Uuid,
    ) -> Result<Post, DomainError> {
        require(caps, Capability::Editor)?;
        self.find_post(id).await
    }

    pub async fn create_post(
        &self,
        caps: &CapabilitySet,
        draft: PostDraft,
    ) -> Result<Post, DomainError> {
        require(caps, Capability::Editor)?;

        let post = Post::from_draft(draft, Utc::now())?;
        self.check_references(&post).await?;

        let saved = self
            .posts
            .insert(post)
            .await
            .map_err(duplicate_as(POST_SLUG_TAKEN))?;
        tracing::info!(post_id = %saved.id, slug = %saved.slug, published = saved.is_published(), "Post created");
        Ok(saved)
    }

    pub async fn update_post(
        &self,
        caps: &CapabilitySet,
        id: Uuid,
        patch: PostPatch,
    ) -> Result<Post, DomainError> {
        require(caps, Capability::Editor)?;

        let mut post = self.find_post(id).await?;
        post.apply_patch(patch, Utc::now())?;
        self.check_references(&post).await?;
        self.save_post(post).await
    }

    pub async fn publish_post(
        &self,
        caps: &CapabilitySet,
        id: Uuid,
        at: Option<DateTime<Utc>>,
    ) -> Result<Post, DomainError> {
        self.transition(caps, id, PublishIntent::Publish { at }).await
    }

    pub async fn unpublish_post(&self, caps: &CapabilitySet, id: Uuid) -> Result<Post, DomainError> {
        self.transition(caps, id, PublishIntent::Unpublish).await
    }

    async fn transition(
        &self,
        caps: &CapabilitySet,
        id: Uuid,
        intent: PublishIntent,
    ) -> Result<Post, DomainError> {
        require(caps, Capability::Editor)?;

        let mut post = self.find_post(id).await?;
        post.transition(intent, Utc::now())?;
        let saved = self.save_post(post).await?;
        tracing::info!(post_id = %id, published_at = ?saved.published_at(), "Post publication changed");
        Ok(saved)
    }

    /// Permanent; there is no soft delete.
    pub async fn delete_post(&self, caps: &CapabilitySet, id: Uuid) -> Result<(), DomainError> {
        require(caps, Capability::Editor)?;

        self.posts.delete(id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::not_found("Post", id),
            other => other.into(),
        })?;
        tracing::info!(post_id = %id, "Post deleted");
        Ok(())
    }

    pub async fn create_category(
        &self,
        caps: &CapabilitySet,
        input: CategoryInput,
    ) -> Result<Category, DomainError> {
        require(caps, Capability::Editor)?;

        let category = Category::new(input)?;
        Ok(self
            .categories
            .insert(category)
            .await
            .map_err(duplicate_as(CATEGORY_SLUG_TAKEN))?)
    }

    pub async fn update_category(
        &self,
        caps: &CapabilitySet,
        id: Uuid,
        input: CategoryInput,
    ) -> Result<Category, DomainError> {
        require(caps, Capability::Editor)?;

        let mut category = self
            .categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Category", id))?;
        category.apply(input)?;
        Ok(self
            .categories
            .update(category)
            .await
            .map_err(duplicate_as(CATEGORY_SLUG_TAKEN))?)
    }

    /// Posts filed under the category are detached by the store.
    pub async fn delete_category(&self, caps: &CapabilitySet, id: Uuid) -> Result<(), DomainError> {
        require(caps, Capability::Editor)?;

        self.categories.delete(id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::not_found("Category", id),
            other => other.into(),
        })
    }

    /// Validate and store an editor image, returning its public URL.
    ///
    /// Nothing reaches storage unless the file is an image within the size limit.
    pub async fn upload_image(
        &self,
        caps: &CapabilitySet,
        upload: ImageUpload,
    ) -> Result<UploadedImage, DomainError> {
        require(caps, Capability::Editor)?;
        upload.validate()?;

        let object = format!("{}/{}", IMAGE_BUCKET, upload.object_name(Utc::now()));
        let path = self
            .storage
            .upload(&object, upload.bytes, &upload.content_type)
            .await
            .map_err(|e| {
                tracing::warn!(path = %object, error = %e, "Image upload failed");
                DomainError::Upload(e.to_string())
            })?;

        let url = self.storage.public_url(&path);
        tracing::info!(%path, "Image uploaded");
        Ok(UploadedImage { path, url })
    }

    async fn find_post(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))
    }

    async fn save_post(&self, post: Post) -> Result<Post, DomainError> {
        let id = post.id;
        self.posts.update(post).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::not_found("Post", id),
            other => duplicate_as(POST_SLUG_TAKEN)(other),
        })
    }

    async fn check_references(&self, post: &Post) -> Result<(), DomainError> {
        if let Some(author_id) = post.author_id {
            if self.authors.find_by_id(author_id).await?.is_none() {
                return Err(DomainError::validation("Selected author does not exist"));
            }
        }
        if let Some(category_id) = post.category_id {
            if self.categories.find_by_id(category_id).await?.is_none() {
                return Err(DomainError::validation("Selected category does not exist"));
            }
        }
        Ok(())
    }
}
