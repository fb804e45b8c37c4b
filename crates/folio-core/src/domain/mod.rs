//! Domain entities - the core business objects.

mod account;
mod author;
mod category;
mod media;
mod post;
mod role;
mod slug;

pub use account::{Account, Profile, mask_email};
pub use author::{Author, AuthorInput};
pub use category::{Category, CategoryInput};
pub use media::{IMAGE_BUCKET, ImageUpload, MAX_IMAGE_BYTES, UploadedImage};
pub use post::{DEFAULT_READ_TIME_MINUTES, Post, PostDraft, PostPatch, PublishIntent, PublishState};
pub use role::{Capability, CapabilitySet, Role, RoleAssignment};
pub use slug::{derive_slug, is_valid_slug, validate_slug};

/// Trim an optional text field, collapsing blank input to `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
