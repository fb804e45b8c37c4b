//! Authentication implementations.

mod identity;
pub mod jwt;
mod password;

pub use identity::LocalIdentityProvider;
pub use jwt::{JwtConfig, JwtTokenService};
pub use password::Argon2PasswordService;
