use async_trait::async_trait;

use crate::partner::Partner;

use super::Result;

/// Repository for the partner aggregate.
///
/// A partner and all of its services and staff are persisted and loaded as one unit.
#[async_trait]
pub trait PartnerRepository: Send + Sync {
    /// Persists a partner together with its children.
    async fn create_partner(&self, partner: &Partner) -> Result<()>;

    /// Loads a partner and its children by the partner ID.
    ///
    /// Returns `Ok(None)` when the partition holds no partner record.
    async fn get_partner(&self, id: &str) -> Result<Option<Partner>>;
}
