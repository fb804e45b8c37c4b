//! # Folio Core
//!
//! The domain layer of the Folio editorial blog.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! entities, the publish state machine, role resolution, authorization and the
//! services the HTTP layer drives.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::{DomainError, RepoError};
