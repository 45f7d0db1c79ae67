//! Partner repository over the single-table layout.
//!
//! Every partner owns one partition (`PARTNER#<id>`): the root record plus one
//! record per service and staffer. Creation writes all of them, retrieval
//! queries the partition and folds the records back into the aggregate.

use async_trait::async_trait;
use partnerbook_core::partner::Partner;
use partnerbook_core::storage::{
    MalformedItemPolicy, PartnerRepository, RepositoryError, Result, WriteMode,
};

use super::assembly::{fold_partition, PartitionScan};
use super::conversions::partner_to_items;
use super::keys;
use super::store::{ItemStore, TRANSACT_WRITE_LIMIT};

/// [`PartnerRepository`] backed by any [`ItemStore`].
#[derive(Debug, Clone)]
pub struct SingleTableRepository<S> {
    store: S,
    write_mode: WriteMode,
    malformed_items: MalformedItemPolicy,
}

impl<S: ItemStore> SingleTableRepository<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            write_mode: WriteMode::default(),
            malformed_items: MalformedItemPolicy::default(),
        }
    }

    pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    pub fn with_malformed_item_policy(mut self, policy: MalformedItemPolicy) -> Self {
        self.malformed_items = policy;
        self
    }

    async fn create_batched(&self, partner: &Partner) -> Result<()> {
        let items = partner_to_items(partner);
        let outcome = self.store.put_batch(items).await?;

        if !outcome.is_complete() {
            tracing::warn!(
                partner_id = %partner.id,
                written = outcome.written,
                unprocessed = outcome.unprocessed.len(),
                "Partner partially written"
            );
            return Err(RepositoryError::PartialWrite {
                partner_id: partner.id.to_string(),
                written: outcome.written,
                unprocessed: outcome.unprocessed.len(),
            });
        }

        Ok(())
    }

    async fn create_transactional(&self, partner: &Partner) -> Result<()> {
        let count = partner.item_count();
        if count > TRANSACT_WRITE_LIMIT {
            return Err(RepositoryError::TransactionTooLarge {
                items: count,
                limit: TRANSACT_WRITE_LIMIT,
            });
        }

        let items = partner_to_items(partner);
        self.store
            .put_transaction(items)
            .await
            .map_err(|err| match err {
                RepositoryError::AlreadyExists { .. } => RepositoryError::AlreadyExists {
                    entity_type: "Partner",
                    id: partner.id.to_string(),
                },
                other => other,
            })
    }
}

fn log_failure(operation: &str, partner_id: &str, err: &RepositoryError) {
    tracing::error!(
        operation,
        partner_id,
        retryable = err.is_retryable(),
        error = %err,
        "Repository operation failed"
    );
}

#[async_trait]
impl<S: ItemStore> PartnerRepository for SingleTableRepository<S> {
    async fn create_partner(&self, partner: &Partner) -> Result<()> {
        tracing::debug!(
            partner_id = %partner.id,
            items = partner.item_count(),
            mode = %self.write_mode,
            "Writing partner"
        );

        let id = partner.id.to_string();
        let written = match self.write_mode {
            WriteMode::Batch => self.create_batched(partner).await,
            WriteMode::Transactional => self.create_transactional(partner).await,
        };
        written
            .map_err(|err| err.with_context("create_partner", &id))
            .inspect_err(|err| log_failure("create_partner", &id, err))?;

        tracing::info!(
            partner_id = %partner.id,
            services = partner.services.len(),
            staff = partner.staff.len(),
            "Partner created"
        );
        Ok(())
    }

    async fn get_partner(&self, id: &str) -> Result<Option<Partner>> {
        let items = self
            .store
            .query_partition(&keys::partition_key(id))
            .await
            .map_err(|err| err.with_context("get_partner", id))
            .inspect_err(|err| log_failure("get_partner", id, err))?;

        let scan = fold_partition(&items, self.malformed_items)
            .map_err(|err| err.with_context("get_partner", id))
            .inspect_err(|err| log_failure("get_partner", id, err))?;

        match scan {
            PartitionScan::Complete(partner) => {
                tracing::debug!(partner_id = %partner.id, records = items.len(), "Partner loaded");
                Ok(Some(partner))
            }
            PartitionScan::RootMissing { orphans } => {
                if !orphans.is_empty() {
                    tracing::warn!(
                        partner_id = %id,
                        orphans = orphans.len(),
                        "Partition has children but no partner record"
                    );
                }
                Ok(None)
            }
        }
    }
}
