//! The item-level store the repository writes to and reads from.
//!
//! [`ItemStore`] is the narrow interface the partner repository needs from the
//! table: batched puts, transactional puts and a full partition query.
//! [`DynamoDbItemStore`] implements it with `aws-sdk-dynamodb`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, Put, PutRequest, TransactWriteItem, WriteRequest};
use aws_sdk_dynamodb::Client;
use partnerbook_core::storage::{RepositoryError, Result};

use super::conversions::{attr, Item};
use super::error::{
    map_batch_write_error, map_build_error, map_describe_table_error, map_query_error,
    map_transact_write_error,
};

/// Maximum number of put requests in one `BatchWriteItem` call.
pub const BATCH_WRITE_LIMIT: usize = 25;

/// Maximum number of actions in one `TransactWriteItems` call.
pub const TRANSACT_WRITE_LIMIT: usize = 100;

/// Result of a best-effort batched write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchWriteOutcome {
    /// Items the store acknowledged.
    pub written: usize,
    /// Items still unwritten after all retries.
    pub unprocessed: Vec<Item>,
}

impl BatchWriteOutcome {
    pub fn is_complete(&self) -> bool {
        self.unprocessed.is_empty()
    }
}

/// Retry configuration for unprocessed batch items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchRetryConfig {
    /// How many times unprocessed items are resubmitted.
    pub max_retries: usize,
    /// Delay before the first retry. Doubles on every attempt.
    pub initial_delay: Duration,
    /// Upper bound for the delay between retries.
    pub max_delay: Duration,
}

impl Default for BatchRetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(2000),
        }
    }
}

impl BatchRetryConfig {
    /// Exponential backoff for the given 0-based attempt, capped at `max_delay`.
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let factor = 2u32.saturating_pow(attempt.min(31) as u32);
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

/// Item-level operations on the single table.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Writes items with batched puts. Not atomic across items.
    ///
    /// Items the store keeps rejecting after retries come back in
    /// [`BatchWriteOutcome::unprocessed`] instead of failing the call.
    async fn put_batch(&self, items: Vec<Item>) -> Result<BatchWriteOutcome>;

    /// Writes every item or none of them. Fails with `AlreadyExists` if any
    /// item's key is already taken.
    async fn put_transaction(&self, items: Vec<Item>) -> Result<()>;

    /// Returns every item whose partition key equals `pk`, ordered by sort key.
    async fn query_partition(&self, pk: &str) -> Result<Vec<Item>>;

    /// Checks that the table is reachable.
    async fn ping(&self) -> Result<()>;
}

#[async_trait]
impl<T: ItemStore + ?Sized> ItemStore for Arc<T> {
    async fn put_batch(&self, items: Vec<Item>) -> Result<BatchWriteOutcome> {
        (**self).put_batch(items).await
    }

    async fn put_transaction(&self, items: Vec<Item>) -> Result<()> {
        (**self).put_transaction(items).await
    }

    async fn query_partition(&self, pk: &str) -> Result<Vec<Item>> {
        (**self).query_partition(pk).await
    }

    async fn ping(&self) -> Result<()> {
        (**self).ping().await
    }
}

/// DynamoDB-backed item store.
#[derive(Debug, Clone)]
pub struct DynamoDbItemStore {
    client: Client,
    table_name: String,
    consistent_read: bool,
    retry: BatchRetryConfig,
}

impl DynamoDbItemStore {
    /// Creates a store with the given DynamoDB client and table name.
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
            consistent_read: false,
            retry: BatchRetryConfig::default(),
        }
    }

    /// Use strongly consistent reads for partition queries.
    pub fn with_consistent_read(mut self, consistent_read: bool) -> Self {
        self.consistent_read = consistent_read;
        self
    }

    pub fn with_retry_config(mut self, retry: BatchRetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Writes one chunk of at most [`BATCH_WRITE_LIMIT`] items, retrying
    /// unprocessed items with backoff. Returns the items left over.
    async fn write_chunk(&self, chunk: Vec<Item>) -> Result<Vec<Item>> {
        let mut requests = chunk
            .into_iter()
            .map(|item| {
                let put = PutRequest::builder()
                    .set_item(Some(item))
                    .build()
                    .map_err(map_build_error)?;
                Ok::<_, RepositoryError>(WriteRequest::builder().put_request(put).build())
            })
            .collect::<Result<Vec<_>>>()?;

        let mut attempt = 0;
        loop {
            let output = self
                .client
                .batch_write_item()
                .request_items(&self.table_name, requests)
                .send()
                .await
                .map_err(map_batch_write_error)?;

            let leftover = output
                .unprocessed_items
                .and_then(|mut tables| tables.remove(&self.table_name))
                .unwrap_or_default();

            if leftover.is_empty() {
                return Ok(Vec::new());
            }

            if attempt >= self.retry.max_retries {
                return Ok(leftover
                    .into_iter()
                    .filter_map(|request| request.put_request.map(|put| put.item))
                    .collect());
            }

            let delay = self.retry.delay_for(attempt);
            tracing::debug!(
                table = %self.table_name,
                unprocessed = leftover.len(),
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                "Retrying unprocessed batch items"
            );
            tokio::time::sleep(delay).await;

            attempt += 1;
            requests = leftover;
        }
    }
}

#[async_trait]
impl ItemStore for DynamoDbItemStore {
    async fn put_batch(&self, items: Vec<Item>) -> Result<BatchWriteOutcome> {
        let mut outcome = BatchWriteOutcome::default();
        let mut remaining = items;

        while !remaining.is_empty() {
            let rest = remaining.split_off(remaining.len().min(BATCH_WRITE_LIMIT));
            let chunk = std::mem::replace(&mut remaining, rest);
            let chunk_len = chunk.len();

            match self.write_chunk(chunk).await {
                Ok(leftover) => {
                    outcome.written += chunk_len - leftover.len();
                    outcome.unprocessed.extend(leftover);
                }
                Err(err) => {
                    if outcome.written > 0 {
                        tracing::warn!(
                            table = %self.table_name,
                            written = outcome.written,
                            error = %err,
                            "Batch write failed after earlier chunks were written"
                        );
                    }
                    return Err(err);
                }
            }
        }

        Ok(outcome)
    }

    async fn put_transaction(&self, items: Vec<Item>) -> Result<()> {
        if items.len() > TRANSACT_WRITE_LIMIT {
            return Err(RepositoryError::TransactionTooLarge {
                items: items.len(),
                limit: TRANSACT_WRITE_LIMIT,
            });
        }

        let first_pk = items
            .first()
            .and_then(|item| item.get(attr::PK))
            .and_then(|pk| pk.as_s().ok())
            .cloned()
            .unwrap_or_default();

        let actions = items
            .into_iter()
            .map(|item| {
                let put = Put::builder()
                    .table_name(&self.table_name)
                    .set_item(Some(item))
                    .condition_expression("attribute_not_exists(#pk)")
                    .expression_attribute_names("#pk", attr::PK)
                    .build()
                    .map_err(map_build_error)?;
                Ok::<_, RepositoryError>(TransactWriteItem::builder().put(put).build())
            })
            .collect::<Result<Vec<_>>>()?;

        self.client
            .transact_write_items()
            .set_transact_items(Some(actions))
            .send()
            .await
            .map_err(|e| map_transact_write_error(e, "Item", first_pk))?;

        Ok(())
    }

    async fn query_partition(&self, pk: &str) -> Result<Vec<Item>> {
        let mut items = Vec::new();
        let mut exclusive_start_key = None;

        loop {
            let output = self
                .client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression("#pk = :pk")
                .expression_attribute_names("#pk", attr::PK)
                .expression_attribute_values(":pk", AttributeValue::S(pk.to_string()))
                .consistent_read(self.consistent_read)
                .set_exclusive_start_key(exclusive_start_key)
                .send()
                .await
                .map_err(map_query_error)?;

            items.extend(output.items.unwrap_or_default());

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => exclusive_start_key = Some(key),
                _ => break,
            }
        }

        Ok(items)
    }

    async fn ping(&self) -> Result<()> {
        self.client
            .describe_table()
            .table_name(&self.table_name)
            .send()
            .await
            .map_err(map_describe_table_error)?;
        Ok(())
    }
}
