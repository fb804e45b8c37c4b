//! Postgres backend built on SeaORM.

mod connections;
mod postgres_base;
mod postgres_repo;

pub mod entity;

pub use connections::{DatabaseConfig, connect};
pub use postgres_base::PostgresBaseRepository;
pub use postgres_repo::{
    PostgresAccountRepository, PostgresAuthorRepository, PostgresCategoryRepository,
    PostgresPostRepository, PostgresProfileRepository, PostgresRoleRepository, repositories,
};

#[cfg(test)]
mod tests;
