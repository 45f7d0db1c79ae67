//! External request and response shapes for partner operations.
//!
//! The service maps these onto the internal aggregate and back. Pure data, no I/O.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use super::types::{Address, Currency, Partner, Service, Staffer, WorkingHours};

/// Request payload for a service offered by a new partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCreate {
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    pub currency: Currency,
}

impl ServiceCreate {
    pub fn new(name: impl Into<String>, price: Decimal, currency: Currency) -> Self {
        Self {
            name: name.into(),
            price,
            currency,
        }
    }
}

/// Request payload for a staffer of a new partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StafferCreate {
    pub first_name: String,
    pub last_name: String,
}

impl StafferCreate {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

/// Request payload for creating a partner with its services and staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerCreate {
    pub name: String,
    pub address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_hours: Option<Vec<WorkingHours>>,
    #[serde(default)]
    pub services: Vec<ServiceCreate>,
    #[serde(default)]
    pub staff: Vec<StafferCreate>,
}

impl PartnerCreate {
    /// Create a request with no schedule and no children.
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            name: name.into(),
            address,
            working_hours: None,
            services: Vec::new(),
            staff: Vec::new(),
        }
    }

    pub fn with_working_hours(mut self, working_hours: Vec<WorkingHours>) -> Self {
        self.working_hours = Some(working_hours);
        self
    }

    pub fn with_service(mut self, service: ServiceCreate) -> Self {
        self.services.push(service);
        self
    }

    pub fn with_staffer(mut self, staffer: StafferCreate) -> Self {
        self.staff.push(staffer);
        self
    }

    /// Convert into a fresh aggregate.
    ///
    /// The root gets a new id and `is_active = true`; every child gets its own
    /// new id and points at the root.
    pub fn into_partner(self) -> Partner {
        let mut partner = Partner::new(self.name, self.address);
        partner.working_hours = self.working_hours;

        for service in self.services {
            partner = partner.with_service(service.name, service.price, service.currency);
        }
        for staffer in self.staff {
            partner = partner.with_staffer(staffer.first_name, staffer.last_name);
        }

        partner
    }
}

/// Public view of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePublic {
    pub id: Ulid,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    pub currency: Currency,
}

impl From<Service> for ServicePublic {
    fn from(service: Service) -> Self {
        Self {
            id: service.id,
            name: service.name,
            price: service.price,
            currency: service.currency,
        }
    }
}

/// Public view of a staffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StafferPublic {
    pub id: Ulid,
    pub first_name: String,
    pub last_name: String,
}

impl From<Staffer> for StafferPublic {
    fn from(staffer: Staffer) -> Self {
        Self {
            id: staffer.id,
            first_name: staffer.first_name,
            last_name: staffer.last_name,
        }
    }
}

/// Public view of a partner and its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerPublic {
    pub id: Ulid,
    pub name: String,
    pub address: Address,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_hours: Option<Vec<WorkingHours>>,
    pub services: Vec<ServicePublic>,
    pub staff: Vec<StafferPublic>,
}

impl From<Partner> for PartnerPublic {
    fn from(partner: Partner) -> Self {
        Self {
            id: partner.id,
            name: partner.name,
            address: partner.address,
            is_active: partner.is_active,
            working_hours: partner.working_hours,
            services: partner.services.into_iter().map(Into::into).collect(),
            staff: partner.staff.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::partner::types::Location;

    fn sample_address() -> Address {
        Address {
            country: "Serbia".to_string(),
            city: "Belgrade".to_string(),
            location: Location {
                address: "Knez Mihailova 1".to_string(),
                lat: Decimal::from_str("44.8176").unwrap(),
                lon: Decimal::from_str("20.4569").unwrap(),
            },
        }
    }

    #[test]
    fn test_into_partner_assigns_ids_and_owner() {
        let request = PartnerCreate::new("Acme Salon", sample_address())
            .with_service(ServiceCreate::new(
                "Haircut",
                Decimal::from_str("15.00").unwrap(),
                Currency::Rsd,
            ))
            .with_staffer(StafferCreate::new("Ana", "Jovanovic"))
            .with_staffer(StafferCreate::new("Marko", "Petrovic"));

        let partner = request.into_partner();

        assert!(partner.is_active);
        assert_eq!(partner.services.len(), 1);
        assert_eq!(partner.staff.len(), 2);
        assert!(partner.services.iter().all(|s| s.partner_id == partner.id));
        assert!(partner.staff.iter().all(|s| s.partner_id == partner.id));
        assert_ne!(partner.staff[0].id, partner.staff[1].id);
        assert_ne!(partner.services[0].id, partner.id);
    }

    #[test]
    fn test_partner_create_defaults_children() {
        let json = r#"{
            "name": "Acme Salon",
            "address": {
                "country": "Serbia",
                "city": "Belgrade",
                "location": {"address": "Knez Mihailova 1", "lat": "44.8176", "lon": "20.4569"}
            }
        }"#;

        let request: PartnerCreate = serde_json::from_str(json).unwrap();

        assert!(request.services.is_empty());
        assert!(request.staff.is_empty());
        assert!(request.working_hours.is_none());
    }

    #[test]
    fn test_partner_create_rejects_unknown_currency() {
        let json = r#"{
            "name": "Acme Salon",
            "address": {
                "country": "Serbia",
                "city": "Belgrade",
                "location": {"address": "Knez Mihailova 1", "lat": "44.8176", "lon": "20.4569"}
            },
            "services": [{"name": "Haircut", "price": "15.00", "currency": "EUR"}]
        }"#;

        assert!(serde_json::from_str::<PartnerCreate>(json).is_err());
    }

    #[test]
    fn test_partner_public_keeps_price_exact() {
        let partner = PartnerCreate::new("Acme Salon", sample_address())
            .with_service(ServiceCreate::new(
                "Haircut",
                Decimal::from_str("15.00").unwrap(),
                Currency::Rsd,
            ))
            .into_partner();

        let public = PartnerPublic::from(partner.clone());
        let json = serde_json::to_value(&public).unwrap();

        assert_eq!(json["services"][0]["price"], "15.00");
        assert_eq!(json["services"][0]["currency"], "RSD");
        assert_eq!(json["is_active"], true);
        assert!(json.get("working_hours").is_none());
        assert_eq!(public.id, partner.id);
        assert_eq!(public.services[0].id, partner.services[0].id);
    }

    #[test]
    fn test_service_price_parses_without_rounding() {
        let json = r#"{"name": "Haircut", "price": "1234567890.123456789", "currency": "RSD"}"#;

        let service: ServiceCreate = serde_json::from_str(json).unwrap();

        assert_eq!(
            service.price,
            Decimal::from_str("1234567890.123456789").unwrap()
        );
        assert_eq!(
            serde_json::to_value(&service).unwrap()["price"],
            "1234567890.123456789"
        );
    }

    #[test]
    fn test_numeric_decimals_are_rejected() {
        let price = r#"{"name": "Haircut", "price": 1234567890.123456789, "currency": "RSD"}"#;
        assert!(serde_json::from_str::<ServiceCreate>(price).is_err());

        let coordinates = r#"{"address": "Knez Mihailova 1", "lat": 44.8176, "lon": "20.4569"}"#;
        assert!(serde_json::from_str::<Location>(coordinates).is_err());
    }
}
