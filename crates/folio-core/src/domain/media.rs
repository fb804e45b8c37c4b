//! Inline images uploaded from the editor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// 5 MiB upload limit for editor images.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Object storage bucket holding editor images.
pub const IMAGE_BUCKET: &str = "blog-images";

/// An image file picked, dropped or pasted into the editor.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Where an accepted image ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub path: String,
    pub url: String,
}

impl ImageUpload {
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.content_type.trim().to_ascii_lowercase().starts_with("image/") {
            return Err(DomainError::validation("Please upload an image file"));
        }
        if self.bytes.is_empty() {
            return Err(DomainError::validation("Image file is empty"));
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(DomainError::validation("Image must be under 5MB"));
        }
        Ok(())
    }

    /// Collision-resistant object name: `{unix_millis}-{random}-{sanitized name}`.
    ///
    /// Names without an image extension (pasted screenshots, for one) get the
    /// extension matching the declared content type, so storage can serve them
    /// with the right MIME type.
    pub fn object_name(&self, now: DateTime<Utc>) -> String {
        let nonce = Uuid::new_v4().simple().to_string();
        let mut name = sanitize_file_name(&self.file_name);
        if !has_image_extension(&name) {
            if let Some(ext) = extension_for(&self.content_type) {
                name.push('.');
                name.push_str(ext);
            }
        }
        format!("{}-{}-{}", now.timestamp_millis(), &nonce[..8], name)
    }
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg", "avif"];

fn has_image_extension(name: &str) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    let essence = content_type.split(';').next().unwrap_or_default();
    match essence.trim().to_ascii_lowercase().as_str() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/svg+xml" => Some("svg"),
        "image/avif" => Some("avif"),
        _ => None,
    }
}

fn sanitize_file_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim_matches(|c| c == '.' || c == '_').is_empty() {
        "image".to_string()
    } else {
        sanitized
    }
}
