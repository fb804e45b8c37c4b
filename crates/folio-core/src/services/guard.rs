//! The single authorization check applied before every write and gated route.

use crate::domain::{Capability, CapabilitySet};
use crate::error::DomainError;

pub fn authorize(capabilities: &CapabilitySet, required: Capability) -> bool {
    match required {
        Capability::Editor => capabilities.is_editor(),
        Capability::Admin => capabilities.is_admin(),
    }
}

/// Like [`authorize`], but as an early-return error.
pub fn require(capabilities: &CapabilitySet, required: Capability) -> Result<(), DomainError> {
    if authorize(capabilities, required) {
        Ok(())
    } else {
        tracing::debug!(%required, "Capability check failed");
        Err(DomainError::Forbidden(format!("{} access required", required)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    #[test]
    fn test_admin_satisfies_every_capability() {
        let caps = CapabilitySet::new([Role::Admin]);
        assert!(authorize(&caps, Capability::Editor));
        assert!(authorize(&caps, Capability::Admin));
    }

    #[test]
    fn test_editor_is_not_admin() {
        let caps = CapabilitySet::new([Role::Editor]);
        assert!(authorize(&caps, Capability::Editor));
        assert!(!authorize(&caps, Capability::Admin));
        assert!(matches!(
            require(&caps, Capability::Admin),
            Err(DomainError::Forbidden(_))
        ));
    }

    #[test]
    fn test_reader_has_no_capabilities() {
        let caps = CapabilitySet::none();
        assert!(!authorize(&caps, Capability::Editor));
        assert!(require(&caps, Capability::Editor).is_err());
    }
}
