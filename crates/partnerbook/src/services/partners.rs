//! Partner use cases: role checks, input validation and not-found handling
//! around the [`PartnerRepository`].

use std::sync::Arc;

use partnerbook_core::auth::Caller;
use partnerbook_core::partner::{validate_partner, PartnerCreate, PartnerPublic, ServiceError};
use partnerbook_core::storage::PartnerRepository;

#[derive(Clone)]
pub struct PartnerService {
    repo: Arc<dyn PartnerRepository>,
}

impl PartnerService {
    pub fn new(repo: Arc<dyn PartnerRepository>) -> Self {
        Self { repo }
    }

    /// Creates a partner together with its services and staff.
    ///
    /// Only elevated callers may create partners. The request is validated
    /// in full before anything is written.
    pub async fn create_partner(
        &self,
        caller: &Caller,
        request: PartnerCreate,
    ) -> Result<PartnerPublic, ServiceError> {
        if !caller.is_elevated() {
            tracing::warn!(caller_id = %caller.id, role = %caller.role, "Partner creation denied");
            return Err(ServiceError::Forbidden);
        }

        let partner = request.into_partner();
        validate_partner(&partner)?;

        self.repo.create_partner(&partner).await?;

        tracing::info!(
            partner_id = %partner.id,
            name = %partner.name,
            caller_id = %caller.id,
            "Created new partner"
        );

        Ok(partner.into())
    }

    /// Fetches a partner by id. Any authenticated caller may read.
    pub async fn get_partner(
        &self,
        _caller: &Caller,
        id: &str,
    ) -> Result<PartnerPublic, ServiceError> {
        self.repo
            .get_partner(id)
            .await?
            .map(PartnerPublic::from)
            .ok_or_else(|| ServiceError::NotFound {
                entity: "Partner",
                id: id.to_string(),
            })
    }
}
