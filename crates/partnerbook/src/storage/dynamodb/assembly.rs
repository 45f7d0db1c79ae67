//! Reassembly of a partner aggregate from the flat records of its partition.

use partnerbook_core::partner::{Partner, Service, Staffer};
use partnerbook_core::storage::{MalformedItemPolicy, RepositoryError, Result};
use ulid::Ulid;

use super::conversions::{attr, get_string, Item, PartnerItem};

/// What a partition query turned out to contain.
#[derive(Debug, Clone, PartialEq)]
pub enum PartitionScan {
    /// A root record was found; children are attached to it.
    Complete(Partner),
    /// No root record. Any children found are orphans.
    RootMissing { orphans: Vec<PartnerItem> },
}

/// Accumulates decoded records into one root slot and two child lists.
#[derive(Debug)]
pub struct PartitionFold {
    policy: MalformedItemPolicy,
    root: Option<Partner>,
    services: Vec<Service>,
    staff: Vec<Staffer>,
    skipped: usize,
}

impl PartitionFold {
    pub fn new(policy: MalformedItemPolicy) -> Self {
        Self {
            policy,
            root: None,
            services: Vec::new(),
            staff: Vec::new(),
            skipped: 0,
        }
    }

    /// Number of records dropped under [`MalformedItemPolicy::SkipAndLog`].
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Decodes one record and files it by its `item_type`.
    pub fn push(&mut self, item: &Item) -> Result<()> {
        match PartnerItem::from_item(item) {
            Ok(PartnerItem::Partner(partner)) => {
                if self.root.is_some() {
                    return self.malformed(
                        item,
                        RepositoryError::InvalidData(format!(
                            "Duplicate partner record {}",
                            partner.id
                        )),
                    );
                }
                self.root = Some(partner);
            }
            Ok(PartnerItem::Service(service)) => self.services.push(service),
            Ok(PartnerItem::Staffer(staffer)) => self.staff.push(staffer),
            Err(err) => return self.malformed(item, err),
        }
        Ok(())
    }

    /// Attaches children to the root, or reports the orphans if there is none.
    ///
    /// Children pointing at a different partner than the root are malformed.
    pub fn finish(mut self) -> Result<PartitionScan> {
        let Some(mut root) = self.root.take() else {
            let orphans = self
                .services
                .into_iter()
                .map(PartnerItem::Service)
                .chain(self.staff.into_iter().map(PartnerItem::Staffer))
                .collect();
            return Ok(PartitionScan::RootMissing { orphans });
        };

        let services = std::mem::take(&mut self.services);
        for service in services {
            if service.partner_id == root.id {
                root.services.push(service);
            } else {
                self.foreign_child("Service", service.id, service.partner_id)?;
            }
        }

        let staff = std::mem::take(&mut self.staff);
        for staffer in staff {
            if staffer.partner_id == root.id {
                root.staff.push(staffer);
            } else {
                self.foreign_child("Staffer", staffer.id, staffer.partner_id)?;
            }
        }

        Ok(PartitionScan::Complete(root))
    }

    fn malformed(&mut self, item: &Item, err: RepositoryError) -> Result<()> {
        match self.policy {
            MalformedItemPolicy::Fail => Err(err),
            MalformedItemPolicy::SkipAndLog => {
                self.skipped += 1;
                tracing::warn!(
                    pk = %get_string(item, attr::PK).unwrap_or_default(),
                    sk = %get_string(item, attr::SK).unwrap_or_default(),
                    error = %err,
                    "Skipping malformed item"
                );
                Ok(())
            }
        }
    }

    fn foreign_child(&mut self, entity: &str, id: Ulid, owner: Ulid) -> Result<()> {
        let err = RepositoryError::InvalidData(format!(
            "{entity} {id} references partner {owner} outside its partition"
        ));
        match self.policy {
            MalformedItemPolicy::Fail => Err(err),
            MalformedItemPolicy::SkipAndLog => {
                self.skipped += 1;
                tracing::warn!(error = %err, "Skipping malformed item");
                Ok(())
            }
        }
    }
}

/// Folds a partition's records into a [`PartitionScan`].
pub fn fold_partition(items: &[Item], policy: MalformedItemPolicy) -> Result<PartitionScan> {
    let mut fold = PartitionFold::new(policy);
    for item in items {
        fold.push(item)?;
    }
    if fold.skipped() > 0 {
        tracing::debug!(
            records = items.len(),
            skipped = fold.skipped(),
            "Partition folded with skipped records"
        );
    }
    fold.finish()
}
