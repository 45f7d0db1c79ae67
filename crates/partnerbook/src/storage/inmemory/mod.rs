//! In-memory storage backend for testing and local development.
//!
//! Implements [`ItemStore`](crate::storage::dynamodb::ItemStore) on top of a
//! `BTreeMap` wrapped in `Arc<RwLock<_>>`, so the real repository code runs
//! unchanged against it. Faults can be injected to exercise error paths.
//!
//! # Example
//!
//! ```rust,ignore
//! use partnerbook::storage::inmemory::InMemoryItemStore;
//!
//! let store = InMemoryItemStore::new();
//! let repo = SingleTableRepository::new(store);
//! ```

mod store;

pub use store::InMemoryItemStore;
