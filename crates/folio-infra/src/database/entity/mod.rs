//! SeaORM entities, one per table.

pub mod account;
pub mod author;
pub mod category;
pub mod post;
pub mod profile;
pub mod user_role;
