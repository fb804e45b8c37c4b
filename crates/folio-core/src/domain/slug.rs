//! URL slugs for posts, authors and categories.

use crate::error::DomainError;

/// Derive a URL-safe slug from free text.
///
/// Lowercases the input, collapses every run of characters outside `[a-z0-9]`
/// into a single hyphen and never emits a leading or trailing hyphen.
pub fn derive_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Whether `slug` is already in canonical form.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

pub fn validate_slug(slug: &str) -> Result<(), DomainError> {
    if slug.trim().is_empty() {
        return Err(DomainError::validation("Slug is required"));
    }
    if !is_valid_slug(slug) {
        return Err(DomainError::validation(
            "Slug may only contain lowercase letters, digits and single hyphens",
        ));
    }
    Ok(())
}
