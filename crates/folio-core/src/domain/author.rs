use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{derive_slug, non_blank, validate_slug};
use crate::error::DomainError;

/// Author entity - a byline identity, independent of any account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields an admin supplies when creating or editing an author.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorInput {
    pub name: String,
    /// Derived from `name` when omitted.
    pub slug: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

impl Author {
    pub fn new(input: AuthorInput) -> Result<Self, DomainError> {
        let mut author = Self {
            id: Uuid::new_v4(),
            name: String::new(),
            slug: String::new(),
            bio: None,
            avatar_url: None,
            created_at: Utc::now(),
        };
        author.apply(input)?;
        Ok(author)
    }

    /// Overwrite every editable field. Leaves `self` untouched on error.
    pub fn apply(&mut self, input: AuthorInput) -> Result<(), DomainError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("Name is required"));
        }
        let slug = non_blank(input.slug).unwrap_or_else(|| derive_slug(&name));
        validate_slug(&slug)?;

        self.name = name;
        self.slug = slug;
        self.bio = non_blank(input.bio);
        self.avatar_url = non_blank(input.avatar_url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_author_derives_slug() {
        let author = Author::new(AuthorInput {
            name: "Sarah Chen".into(),
            bio: Some("  ".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(author.slug, "sarah-chen");
        assert_eq!(author.bio, None);
    }

    #[test]
    fn test_author_requires_name() {
        let err = Author::new(AuthorInput::default()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
