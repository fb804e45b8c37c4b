//! Object storage for uploaded images.

mod local;
mod memory;

pub use local::LocalObjectStorage;
pub use memory::InMemoryObjectStorage;

use folio_core::ports::StorageError;

/// Reject empty, absolute or parent-relative object paths.
pub(crate) fn validate_path(path: &str) -> Result<(), StorageError> {
    let valid = !path.is_empty()
        && !path.starts_with('/')
        && path
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '/'));

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidPath(path.to_string()))
    }
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path)
}

/// Best-effort MIME type from a file extension.
pub(crate) fn content_type_for(path: &str) -> &'static str {
    let ext = path.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("avif") => "image/avif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("blog-images/1734-ab12cd34-chart.png").is_ok());
        assert!(validate_path("").is_err());
        assert!(validate_path("/etc/passwd").is_err());
        assert!(validate_path("blog-images/../secret").is_err());
        assert!(validate_path("blog-images//x.png").is_err());
        assert!(validate_path("blog-images/a b.png").is_err());
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a/b.PNG"), "image/png");
        assert_eq!(content_type_for("a/b.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("a/b"), "application/octet-stream");
    }

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://localhost:8080/media/", "blog-images/x.png"),
            "http://localhost:8080/media/blog-images/x.png"
        );
    }
}
