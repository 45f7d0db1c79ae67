//! Application state with repository-based storage.
//!
//! This module defines the shared application state that is passed to all
//! request handlers. The item store is chosen at startup from [`Config`] and
//! shared between the partner repository and the readiness probe.

use std::sync::Arc;

use anyhow::Result;
use aws_config::BehaviorVersion;

use crate::config::{Config, StorageBackend};
use crate::services::PartnerService;
use crate::storage::dynamodb::{DynamoDbItemStore, ItemStore, SingleTableRepository};
use crate::storage::inmemory::InMemoryItemStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Partner use cases.
    pub partners: PartnerService,
    /// Item store behind the repository, pinged by `/readyz`.
    pub store: Arc<dyn ItemStore>,
    pub config: Config,
}

impl AppState {
    /// Builds state around an existing item store.
    pub fn with_store(store: Arc<dyn ItemStore>, config: Config) -> Self {
        let repo = SingleTableRepository::new(store.clone())
            .with_write_mode(config.write_mode)
            .with_malformed_item_policy(config.malformed_item_policy);

        Self {
            partners: PartnerService::new(Arc::new(repo)),
            store,
            config,
        }
    }

    /// Builds state for the configured storage backend.
    pub async fn from_config(config: Config) -> Result<Self> {
        let store: Arc<dyn ItemStore> = match config.storage_backend {
            StorageBackend::DynamoDb => {
                let mut loader = aws_config::defaults(BehaviorVersion::latest());
                if let Some(endpoint_url) = &config.endpoint_url {
                    loader = loader.endpoint_url(endpoint_url);
                }
                let sdk_config = loader.load().await;
                let client = aws_sdk_dynamodb::Client::new(&sdk_config);

                tracing::info!(
                    table = %config.table_name,
                    endpoint = config.endpoint_url.as_deref().unwrap_or("default"),
                    write_mode = %config.write_mode,
                    malformed_items = %config.malformed_item_policy,
                    "Using DynamoDB storage"
                );

                Arc::new(
                    DynamoDbItemStore::new(client, config.table_name.clone())
                        .with_consistent_read(config.consistent_read)
                        .with_retry_config(config.batch_retry()),
                )
            }
            StorageBackend::Memory => {
                tracing::info!(write_mode = %config.write_mode, "Using in-memory storage");
                Arc::new(InMemoryItemStore::new())
            }
        };

        Ok(Self::with_store(store, config))
    }

    /// In-memory state with default settings.
    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(InMemoryItemStore::new()), Config::default())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::in_memory()
    }
}
