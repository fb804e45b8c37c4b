use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{derive_slug, non_blank, validate_slug};
use crate::error::DomainError;

/// Category entity - a topic posts can be filed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
}

impl Category {
    pub fn new(input: CategoryInput) -> Result<Self, DomainError> {
        let mut category = Self {
            id: Uuid::new_v4(),
            name: String::new(),
            slug: String::new(),
            description: None,
            created_at: Utc::now(),
        };
        category.apply(input)?;
        Ok(category)
    }

    pub fn apply(&mut self, input: CategoryInput) -> Result<(), DomainError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("Name is required"));
        }
        let slug = non_blank(input.slug).unwrap_or_else(|| derive_slug(&name));
        validate_slug(&slug)?;

        self.name = name;
        self.slug = slug;
        self.description = non_blank(input.description);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_slug_from_name() {
        let category = Category::new(CategoryInput {
            name: "Tools & Platforms".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(category.slug, "tools-platforms");
    }

    #[test]
    fn test_explicit_slug_must_be_url_safe() {
        let err = Category::new(CategoryInput {
            name: "AI".into(),
            slug: Some("A I".into()),
            description: None,
        })
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
