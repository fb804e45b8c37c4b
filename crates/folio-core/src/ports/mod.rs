//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod repository;
mod storage;

pub use auth::{
    AuthChange, AuthError, AuthEvent, IdentityProvider, IssuedToken, PasswordService, Session,
    TokenClaims, TokenService,
};
pub use repository::{
    AccountRepository, AuthorRepository, BaseRepository, CategoryRepository, PostRepository,
    ProfileRepository, Repositories, RoleRepository,
};
pub use storage::{ObjectStorage, StorageError, StoredObject};
