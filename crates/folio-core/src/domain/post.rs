use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{derive_slug, non_blank, validate_slug};
use crate::error::DomainError;

pub const DEFAULT_READ_TIME_MINUTES: u32 = 5;

/// Publication state of a post.
///
/// `is_published` and `published_at` are both projections of this value, so a
/// published post always carries a date and a draft never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum PublishState {
    Draft,
    Published { at: DateTime<Utc> },
}

impl PublishState {
    pub fn is_published(&self) -> bool {
        matches!(self, PublishState::Published { .. })
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        match self {
            PublishState::Draft => None,
            PublishState::Published { at } => Some(*at),
        }
    }
}

/// Requested publication transition carried by a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum PublishIntent {
    /// Publish at the given date, or now when none is given.
    Publish { at: Option<DateTime<Utc>> },
    Unpublish,
}

/// Post entity - a blog article with an HTML body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    /// HTML document produced by the rich-text editor.
    pub body: String,
    pub featured_image_url: Option<String>,
    pub author_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub tags: BTreeSet<String>,
    pub read_time_minutes: u32,
    pub state: PublishState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to create a post.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub title: String,
    /// Derived from `title` when omitted or blank.
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub body: String,
    pub featured_image_url: Option<String>,
    pub author_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub tags: Vec<String>,
    pub read_time_minutes: Option<u32>,
    pub publication: Option<PublishIntent>,
}

/// Partial update of a post. `None` leaves a field unchanged; for nullable
/// fields `Some(None)` clears the value.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<Option<String>>,
    pub body: Option<String>,
    pub featured_image_url: Option<Option<String>>,
    pub author_id: Option<Option<Uuid>>,
    pub category_id: Option<Option<Uuid>>,
    pub tags: Option<Vec<String>>,
    pub read_time_minutes: Option<u32>,
    pub publication: Option<PublishIntent>,
}

fn normalize_tags(tags: impl IntoIterator<Item = String>) -> BTreeSet<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

impl Post {
    /// Build a post from a draft. The post starts as a draft unless the draft
    /// requests publication.
    pub fn from_draft(draft: PostDraft, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let title = draft.title.trim().to_string();
        let slug = non_blank(draft.slug).unwrap_or_else(|| derive_slug(&title));

        let mut post = Self {
            id: Uuid::new_v4(),
            title,
            slug,
            excerpt: non_blank(draft.excerpt),
            body: draft.body,
            featured_image_url: non_blank(draft.featured_image_url),
            author_id: draft.author_id,
            category_id: draft.category_id,
            tags: normalize_tags(draft.tags),
            read_time_minutes: draft
                .read_time_minutes
                .unwrap_or(DEFAULT_READ_TIME_MINUTES),
            state: PublishState::Draft,
            created_at: now,
            updated_at: now,
        };

        post.validate()?;
        if let Some(intent) = draft.publication {
            post.transition(intent, now)?;
        }
        Ok(post)
    }

    pub fn is_published(&self) -> bool {
        self.state.is_published()
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.state.published_at()
    }

    /// Published and not dated in the future.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.published_at().is_some_and(|at| at <= now)
    }

    /// Checks every save must pass.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("Title is required"));
        }
        validate_slug(&self.slug)?;
        if self.read_time_minutes == 0 {
            return Err(DomainError::validation(
                "Read time must be at least 1 minute",
            ));
        }
        Ok(())
    }

    /// `Draft -> Published`, or re-date an already published post.
    ///
    /// Without an explicit date a draft is stamped with `now` and a published
    /// post keeps its existing date.
    pub fn publish(
        &mut self,
        at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("Title is required to publish"));
        }
        if self.slug.trim().is_empty() {
            return Err(DomainError::validation("Slug is required to publish"));
        }

        let at = at.or(self.published_at()).unwrap_or(now);
        self.state = PublishState::Published { at };
        self.updated_at = now;
        Ok(())
    }

    /// `Published -> Draft`. A no-op for drafts.
    pub fn unpublish(&mut self, now: DateTime<Utc>) {
        if self.is_published() {
            self.state = PublishState::Draft;
            self.updated_at = now;
        }
    }

    pub fn transition(
        &mut self,
        intent: PublishIntent,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        match intent {
            PublishIntent::Publish { at } => self.publish(at, now),
            PublishIntent::Unpublish => {
                self.unpublish(now);
                Ok(())
            }
        }
    }

    /// Apply a patch in place. The slug is never re-derived from a new title.
    pub fn apply_patch(&mut self, patch: PostPatch, now: DateTime<Utc>) -> Result<(), DomainError> {
        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(slug) = patch.slug {
            self.slug = slug.trim().to_string();
        }
        if let Some(excerpt) = patch.excerpt {
            self.excerpt = non_blank(excerpt);
        }
        if let Some(body) = patch.body {
            self.body = body;
        }
        if let Some(url) = patch.featured_image_url {
            self.featured_image_url = non_blank(url);
        }
        if let Some(author_id) = patch.author_id {
            self.author_id = author_id;
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }
        if let Some(tags) = patch.tags {
            self.tags = normalize_tags(tags);
        }
        if let Some(minutes) = patch.read_time_minutes {
            self.read_time_minutes = minutes;
        }

        self.validate()?;
        if let Some(intent) = patch.publication {
            self.transition(intent, now)?;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Newest publication first, undated posts last, then newest created.
    pub fn cmp_by_recency(a: &Post, b: &Post) -> Ordering {
        match (a.published_at(), b.published_at()) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then_with(|| b.created_at.cmp(&a.created_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 15, 9, 0, 0).unwrap()
    }

    fn draft(title: &str) -> PostDraft {
        PostDraft {
            title: title.to_string(),
            body: "<p>Hello</p>".to_string(),
            ..Default::default()
        }
    }

    fn assert_state_consistent(post: &Post) {
        assert_eq!(post.is_published(), post.published_at().is_some());
    }

    #[test]
    fn test_new_post_is_a_draft_with_derived_slug() {
        let post = Post::from_draft(draft("Power BI vs Tableau: Which BI Tool?"), now()).unwrap();
        assert_eq!(post.slug, "power-bi-vs-tableau-which-bi-tool");
        assert!(!post.is_published());
        assert_eq!(post.read_time_minutes, DEFAULT_READ_TIME_MINUTES);
        assert_state_consistent(&post);
    }

    #[test]
    fn test_create_published_stamps_now() {
        let mut d = draft("Launch");
        d.publication = Some(PublishIntent::Publish { at: None });
        let post = Post::from_draft(d, now()).unwrap();
        assert_eq!(post.published_at(), Some(now()));
        assert_state_consistent(&post);
    }

    #[test]
    fn test_title_required() {
        let err = Post::from_draft(draft("   "), now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_publish_with_editor_date_then_unpublish() {
        let mut post = Post::from_draft(draft("Dated"), now()).unwrap();
        let chosen = Utc.with_ymd_and_hms(2024, 11, 28, 0, 0, 0).unwrap();

        post.publish(Some(chosen), now()).unwrap();
        assert_eq!(post.published_at(), Some(chosen));
        assert_state_consistent(&post);

        post.unpublish(now());
        assert_eq!(post.state, PublishState::Draft);
        assert_state_consistent(&post);
    }

    #[test]
    fn test_republish_keeps_existing_date() {
        let mut post = Post::from_draft(draft("Stable"), now()).unwrap();
        post.publish(None, now()).unwrap();
        let later = now() + chrono::Duration::days(3);
        post.publish(None, later).unwrap();
        assert_eq!(post.published_at(), Some(now()));
    }

    #[test]
    fn test_patch_keeps_slug_when_title_changes() {
        let mut post = Post::from_draft(draft("Original Title"), now()).unwrap();
        post.apply_patch(
            PostPatch {
                title: Some("Renamed".into()),
                excerpt: Some(Some("Summary".into())),
                tags: Some(vec![" AI ".into(), "".into(), "AI".into(), "BI".into()]),
                ..Default::default()
            },
            now(),
        )
        .unwrap();
        assert_eq!(post.slug, "original-title");
        assert_eq!(post.excerpt.as_deref(), Some("Summary"));
        assert_eq!(post.tags.len(), 2);

        post.apply_patch(
            PostPatch {
                excerpt: Some(None),
                ..Default::default()
            },
            now(),
        )
        .unwrap();
        assert_eq!(post.excerpt, None);
    }

    #[test]
    fn test_patch_rejects_blank_slug_and_zero_read_time() {
        let mut post = Post::from_draft(draft("Valid"), now()).unwrap();
        let err = post
            .apply_patch(
                PostPatch {
                    slug: Some(" ".into()),
                    ..Default::default()
                },
                now(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let mut post = Post::from_draft(draft("Valid"), now()).unwrap();
        assert!(
            post.apply_patch(
                PostPatch {
                    read_time_minutes: Some(0),
                    ..Default::default()
                },
                now(),
            )
            .is_err()
        );
    }

    #[test]
    fn test_recency_ordering_puts_undated_last() {
        let mut older = Post::from_draft(draft("Older"), now()).unwrap();
        older.publish(Some(now() - chrono::Duration::days(5)), now()).unwrap();
        let mut newer = Post::from_draft(draft("Newer"), now()).unwrap();
        newer.publish(Some(now()), now()).unwrap();
        let undated = Post::from_draft(draft("Undated"), now()).unwrap();

        let mut posts = vec![undated.clone(), older.clone(), newer.clone()];
        posts.sort_by(Post::cmp_by_recency);
        let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Newer", "Older", "Undated"]);
    }

    #[test]
    fn test_future_dated_post_is_not_live_yet() {
        let mut post = Post::from_draft(draft("Tomorrow"), now()).unwrap();
        post.publish(Some(now() + chrono::Duration::days(1)), now()).unwrap();
        assert!(post.is_published());
        assert!(!post.is_live_at(now()));
    }
}
