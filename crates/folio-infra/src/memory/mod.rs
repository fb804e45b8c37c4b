//! In-memory backend. Used when no database is configured and in tests.
//!
//! Enforces the same constraints the Postgres schema declares: unique slugs and
//! emails, one profile per account, `posts.author_id` restricting author
//! deletes and `posts.category_id` set to null when its category goes away.
//! Data is lost on process restart.

mod fixture;
mod repository;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use folio_core::domain::{Account, Author, Category, Post, Profile, Role};
use folio_core::ports::Repositories;

use repository::{MemoryRepository, MemoryRoleRepository};

#[derive(Default)]
pub(crate) struct Tables {
    pub(crate) accounts: HashMap<Uuid, Account>,
    pub(crate) profiles: HashMap<Uuid, Profile>,
    pub(crate) roles: BTreeSet<(Uuid, Role)>,
    pub(crate) authors: HashMap<Uuid, Author>,
    pub(crate) categories: HashMap<Uuid, Category>,
    pub(crate) posts: HashMap<Uuid, Post>,
}

/// Shared tables behind every in-memory repository.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A store pre-filled with the sample authors, categories and posts.
    pub fn seeded() -> Self {
        let tables = fixture::tables();
        tracing::info!(
            authors = tables.authors.len(),
            categories = tables.categories.len(),
            posts = tables.posts.len(),
            "Seeded in-memory store"
        );
        Self {
            tables: Arc::new(RwLock::new(tables)),
        }
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            accounts: Arc::new(MemoryRepository::<Account>::new(self.tables.clone())),
            profiles: Arc::new(MemoryRepository::<Profile>::new(self.tables.clone())),
            roles: Arc::new(MemoryRoleRepository::new(self.tables.clone())),
            authors: Arc::new(MemoryRepository::<Author>::new(self.tables.clone())),
            categories: Arc::new(MemoryRepository::<Category>::new(self.tables.clone())),
            posts: Arc::new(MemoryRepository::<Post>::new(self.tables.clone())),
        }
    }
}
