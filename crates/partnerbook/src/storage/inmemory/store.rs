//! In-memory item store implementation.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use partnerbook_core::storage::{RepositoryError, Result};

use crate::storage::dynamodb::{attr, BatchWriteOutcome, Item, ItemStore, TRANSACT_WRITE_LIMIT};

type Key = (String, String);

/// Injected failures for exercising error paths. Only tests can set them.
#[derive(Debug, Default)]
struct Faults {
    unavailable: bool,
    /// Number of further items the store accepts before leaving the rest unprocessed.
    capacity: Option<usize>,
}

/// In-memory item store for tests and local development.
///
/// Items are kept in a `BTreeMap` keyed by `(pk, sk)` wrapped in `Arc<RwLock<_>>`,
/// so partition queries come back ordered by sort key like DynamoDB's.
/// Data is not persisted and will be lost when the store is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryItemStore {
    items: Arc<RwLock<BTreeMap<Key, Item>>>,
    faults: Arc<RwLock<Faults>>,
}

impl InMemoryItemStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every operation fail with `ConnectionFailed` until reset.
    #[cfg(test)]
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.faults.write().await.unavailable = unavailable;
    }

    /// Accepts only `capacity` more items; batched writes past that point
    /// report the remainder as unprocessed.
    #[cfg(test)]
    pub async fn limit_capacity(&self, capacity: usize) {
        self.faults.write().await.capacity = Some(capacity);
    }

    /// Stores a record as-is, bypassing every check.
    #[cfg(test)]
    pub async fn insert_raw(&self, item: Item) -> Result<()> {
        let key = item_key(&item)?;
        self.items.write().await.insert(key, item);
        Ok(())
    }

    /// Total number of stored records.
    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    async fn check_available(&self) -> Result<()> {
        if self.faults.read().await.unavailable {
            return Err(RepositoryError::ConnectionFailed(
                "In-memory store is unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

fn item_key(item: &Item) -> Result<Key> {
    let get = |name: &str| {
        item.get(name)
            .and_then(|v| v.as_s().ok())
            .cloned()
            .ok_or_else(|| {
                RepositoryError::InvalidData(format!("Missing or invalid field: {}", name))
            })
    };
    Ok((get(attr::PK)?, get(attr::SK)?))
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn put_batch(&self, items: Vec<Item>) -> Result<BatchWriteOutcome> {
        self.check_available().await?;

        let mut faults = self.faults.write().await;
        let mut stored = self.items.write().await;
        let mut outcome = BatchWriteOutcome::default();

        for item in items {
            if faults.capacity == Some(0) {
                outcome.unprocessed.push(item);
                continue;
            }
            let key = item_key(&item)?;
            stored.insert(key, item);
            outcome.written += 1;
            if let Some(capacity) = faults.capacity.as_mut() {
                *capacity -= 1;
            }
        }

        Ok(outcome)
    }

    async fn put_transaction(&self, items: Vec<Item>) -> Result<()> {
        self.check_available().await?;

        if items.len() > TRANSACT_WRITE_LIMIT {
            return Err(RepositoryError::TransactionTooLarge {
                items: items.len(),
                limit: TRANSACT_WRITE_LIMIT,
            });
        }

        let mut faults = self.faults.write().await;
        let mut stored = self.items.write().await;

        let keyed = items
            .into_iter()
            .map(|item| Ok::<_, RepositoryError>((item_key(&item)?, item)))
            .collect::<Result<Vec<(Key, Item)>>>()?;

        if let Some((key, _)) = keyed.iter().find(|(key, _)| stored.contains_key(key)) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Item",
                id: key.0.clone(),
            });
        }

        if let Some(capacity) = faults.capacity.as_mut() {
            if *capacity < keyed.len() {
                return Err(RepositoryError::Throttled(
                    "In-memory store capacity exceeded".to_string(),
                ));
            }
            *capacity -= keyed.len();
        }

        stored.extend(keyed);
        Ok(())
    }

    async fn query_partition(&self, pk: &str) -> Result<Vec<Item>> {
        self.check_available().await?;

        let stored = self.items.read().await;
        Ok(stored
            .range((pk.to_string(), String::new())..)
            .take_while(|((item_pk, _), _)| item_pk == pk)
            .map(|(_, item)| item.clone())
            .collect())
    }

    async fn ping(&self) -> Result<()> {
        self.check_available().await
    }
}
