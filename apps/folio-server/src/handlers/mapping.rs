//! Domain to wire conversions.

use folio_core::domain::{Account, Author, Category, Post, Profile, PublishIntent};
use folio_core::ports::Session;
use folio_core::services::{AuthSnapshot, AuthorSummary, CategorySummary, PostDetails, UserWithRoles};
use folio_shared::dto::{
    AuthSnapshotResponse, AuthorResponse, CategoryResponse, PostResponse, ProfileResponse,
    SessionResponse, UserResponse, UserWithRolesResponse,
};

pub fn user(account: &Account) -> UserResponse {
    UserResponse {
        id: account.id,
        email: account.email.clone(),
        created_at: account.created_at,
    }
}

pub fn profile(profile: Profile) -> ProfileResponse {
    ProfileResponse {
        id: profile.id,
        user_id: profile.user_id,
        email: profile.email,
        full_name: profile.full_name,
        created_at: profile.created_at,
        updated_at: profile.updated_at,
    }
}

pub fn session(session: &Session, expires_in: i64) -> SessionResponse {
    SessionResponse {
        access_token: session.access_token.clone(),
        token_type: "Bearer".to_string(),
        expires_in,
        expires_at: session.expires_at,
        user: user(&session.user),
    }
}

pub fn snapshot(snapshot: AuthSnapshot) -> AuthSnapshotResponse {
    let is_hydrated = snapshot.is_hydrated();
    AuthSnapshotResponse {
        roles: snapshot
            .capabilities
            .roles()
            .map(|r| r.to_string())
            .collect(),
        is_admin: snapshot.is_admin(),
        is_editor: snapshot.is_editor(),
        user: snapshot.user.as_ref().map(user),
        profile: snapshot.profile.map(profile),
        session_resolved: snapshot.session_resolved,
        roles_loaded: snapshot.roles_loaded,
        is_hydrated,
    }
}

pub fn author(author: Author) -> AuthorResponse {
    AuthorResponse {
        id: author.id,
        name: author.name,
        slug: author.slug,
        bio: author.bio,
        avatar_url: author.avatar_url,
        created_at: author.created_at,
        post_count: None,
    }
}

pub fn author_summary(summary: AuthorSummary) -> AuthorResponse {
    AuthorResponse {
        post_count: Some(summary.post_count),
        ..author(summary.author)
    }
}

pub fn category(category: Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id,
        name: category.name,
        slug: category.slug,
        description: category.description,
        created_at: category.created_at,
        post_count: None,
    }
}

pub fn category_summary(summary: CategorySummary) -> CategoryResponse {
    CategoryResponse {
        post_count: Some(summary.post_count),
        ..category(summary.category)
    }
}

pub fn post(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        is_published: post.is_published(),
        published_at: post.published_at(),
        title: post.title,
        slug: post.slug,
        excerpt: post.excerpt,
        body: post.body,
        featured_image_url: post.featured_image_url,
        author_id: post.author_id,
        category_id: post.category_id,
        author: None,
        category: None,
        tags: post.tags.into_iter().collect(),
        read_time_minutes: post.read_time_minutes,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

pub fn post_details(details: PostDetails) -> PostResponse {
    PostResponse {
        author: details.author.map(author),
        category: details.category.map(category),
        ..post(details.post)
    }
}

pub fn user_with_roles(entry: UserWithRoles) -> UserWithRolesResponse {
    UserWithRolesResponse {
        profile: profile(entry.profile),
        roles: entry.roles.iter().map(|r| r.to_string()).collect(),
    }
}

/// Read the publish toggle of a save request.
///
/// `is_published: true` publishes (at `published_at` or now), `false` unpublishes,
/// and an absent flag leaves the state alone even when a date is sent.
pub fn publication(
    is_published: Option<bool>,
    published_at: Option<chrono::DateTime<chrono::Utc>>,
) -> Option<PublishIntent> {
    match is_published {
        Some(true) => Some(PublishIntent::Publish { at: published_at }),
        Some(false) => Some(PublishIntent::Unpublish),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn test_publication_toggle() {
        let at = Utc.with_ymd_and_hms(2024, 12, 15, 9, 0, 0).unwrap();

        assert_eq!(publication(None, None), None);
        assert_eq!(
            publication(Some(true), None),
            Some(PublishIntent::Publish { at: None })
        );
        assert_eq!(
            publication(Some(true), Some(at)),
            Some(PublishIntent::Publish { at: Some(at) })
        );
        assert_eq!(publication(Some(false), Some(at)), Some(PublishIntent::Unpublish));
        assert_eq!(publication(None, Some(at)), None);
    }
}
