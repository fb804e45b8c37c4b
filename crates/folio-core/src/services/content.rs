//! Public read side of the content repository.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Author, Category, Post};
use crate::error::DomainError;
use crate::ports::{AuthorRepository, CategoryRepository, PostRepository};

/// Which published posts the public site may see.
#[derive(Debug, Clone, Copy)]
pub struct ReadPolicy {
    /// Whether posts published with a future date are visible right away.
    pub include_future_dated: bool,
}

impl Default for ReadPolicy {
    fn default() -> Self {
        Self {
            include_future_dated: true,
        }
    }
}

/// A post joined with its byline and category.
#[derive(Debug, Clone)]
pub struct PostDetails {
    pub post: Post,
    pub author: Option<Author>,
    pub category: Option<Category>,
}

#[derive(Debug, Clone)]
pub struct CategoryPosts {
    pub category: Category,
    pub posts: Vec<Post>,
}

#[derive(Debug, Clone)]
pub struct CategorySummary {
    pub category: Category,
    pub post_count: usize,
}

#[derive(Debug, Clone)]
pub struct AuthorSummary {
    pub author: Author,
    pub post_count: usize,
}

#[derive(Clone)]
pub struct ContentReader {
    posts: Arc<dyn PostRepository>,
    authors: Arc<dyn AuthorRepository>,
    categories: Arc<dyn CategoryRepository>,
    policy: ReadPolicy,
}

impl ContentReader {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        authors: Arc<dyn AuthorRepository>,
        categories: Arc<dyn CategoryRepository>,
        policy: ReadPolicy,
    ) -> Self {
        Self {
            posts,
            authors,
            categories,
            policy,
        }
    }

    fn is_visible(&self, post: &Post) -> bool {
        if self.policy.include_future_dated {
            post.is_published()
        } else {
            post.is_live_at(Utc::now())
        }
    }

    /// Published posts, newest publication first.
    pub async fn list_published(&self) -> Result<Vec<Post>, DomainError> {
        let mut posts: Vec<Post> = self
            .posts
            .list_published()
            .await?
            .into_iter()
            .filter(|p| self.is_visible(p))
            .collect();
        posts.sort_by(Post::cmp_by_recency);
        Ok(posts)
    }

    /// A published post by slug. Drafts are never returned, whoever asks.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>, DomainError> {
        let post = self.posts.find_published_by_slug(slug).await?;
        Ok(post.filter(|p| self.is_visible(p)))
    }

    /// A category and its published posts; `None` for an unknown slug.
    pub async fn list_by_category(
        &self,
        category_slug: &str,
    ) -> Result<Option<CategoryPosts>, DomainError> {
        let Some(category) = self.categories.find_by_slug(category_slug).await? else {
            return Ok(None);
        };

        let posts = self
            .list_published()
            .await?
            .into_iter()
            .filter(|p| p.category_id == Some(category.id))
            .collect();

        Ok(Some(CategoryPosts { category, posts }))
    }

    /// Categories by name with the number of published posts filed under each.
    pub async fn categories_with_counts(&self) -> Result<Vec<CategorySummary>, DomainError> {
        let categories = self.categories.list_by_name().await?;
        let posts = self.list_published().await?;
        let counts = count_by(&posts, |p| p.category_id);

        Ok(categories
            .into_iter()
            .map(|category| CategorySummary {
                post_count: counts.get(&category.id).copied().unwrap_or(0),
                category,
            })
            .collect())
    }

    /// Authors by name with the number of published posts they wrote.
    pub async fn authors_with_counts(&self) -> Result<Vec<AuthorSummary>, DomainError> {
        let authors = self.authors.list_by_name().await?;
        let posts = self.list_published().await?;
        let counts = count_by(&posts, |p| p.author_id);

        Ok(authors
            .into_iter()
            .map(|author| AuthorSummary {
                post_count: counts.get(&author.id).copied().unwrap_or(0),
                author,
            })
            .collect())
    }

    /// Other published posts to suggest after `slug`: same category first,
    /// then the most recent. `None` when `slug` is not publicly visible.
    pub async fn related_posts(
        &self,
        slug: &str,
        limit: usize,
    ) -> Result<Option<Vec<Post>>, DomainError> {
        let Some(current) = self.get_by_slug(slug).await? else {
            return Ok(None);
        };

        let mut others: Vec<Post> = self
            .list_published()
            .await?
            .into_iter()
            .filter(|p| p.id != current.id)
            .collect();
        // Stable sort keeps recency order within each group.
        others.sort_by_key(|p| current.category_id.is_none() || p.category_id != current.category_id);
        others.truncate(limit);
        Ok(Some(others))
    }

    /// Join posts with their author and category.
    pub async fn expand(&self, posts: Vec<Post>) -> Result<Vec<PostDetails>, DomainError> {
        let authors: HashMap<Uuid, Author> = self
            .authors
            .list_by_name()
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();
        let categories: HashMap<Uuid, Category> = self
            .categories
            .list_by_name()
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        Ok(posts
            .into_iter()
            .map(|post| PostDetails {
                author: post.author_id.and_then(|id| authors.get(&id).cloned()),
                category: post.category_id.and_then(|id| categories.get(&id).cloned()),
                post,
            })
            .collect())
    }
}

fn count_by(posts: &[Post], key: impl Fn(&Post) -> Option<Uuid>) -> HashMap<Uuid, usize> {
    let mut counts = HashMap::new();
    for id in posts.iter().filter_map(key) {
        *counts.entry(id).or_insert(0) += 1;
    }
    counts
}
