//! DynamoDB attribute conversion functions.
//!
//! Converts between the partner aggregate's entities and flat DynamoDB item records.
//! Everything here is pure and testable without DynamoDB access.

use std::collections::HashMap;
use std::str::FromStr;

use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, NaiveTime, Utc};
use partnerbook_core::partner::{
    validate_address, validate_partner, validate_service, validate_staffer, Address, Currency,
    DayOfWeek, Location, Partner, Service, Staffer, TimeRange, WorkingHours,
};
use partnerbook_core::storage::RepositoryError;
use rust_decimal::Decimal;
use ulid::Ulid;

use super::keys;
use super::update::UpdateExpression;

/// A flat DynamoDB record.
pub type Item = HashMap<String, AttributeValue>;

// ============================================================================
// Attribute names
// ============================================================================

pub mod attr {
    pub const PK: &str = "pk";
    pub const SK: &str = "sk";
    pub const ITEM_TYPE: &str = "item_type";
    pub const GSI_SK: &str = "gsi_sk";

    pub const ID: &str = "id";
    pub const PARTNER_ID: &str = "partner_id";
    pub const NAME: &str = "name";
    pub const IS_ACTIVE: &str = "is_active";
    pub const ADDRESS: &str = "address";
    pub const WORKING_HOURS: &str = "working_hours";
    pub const CREATED_AT: &str = "created_at";
    pub const UPDATED_AT: &str = "updated_at";
    pub const PRICE: &str = "price";
    pub const CURRENCY: &str = "currency";
    pub const FIRST_NAME: &str = "first_name";
    pub const LAST_NAME: &str = "last_name";

    pub const COUNTRY: &str = "country";
    pub const CITY: &str = "city";
    pub const LOCATION: &str = "location";
    pub const STREET: &str = "address";
    pub const LAT: &str = "lat";
    pub const LON: &str = "lon";
    pub const DAY: &str = "day";
    pub const SHIFTS: &str = "shifts";
    pub const START: &str = "start";
    pub const END: &str = "end";
}

// ============================================================================
// Entity type constants
// ============================================================================

pub const ENTITY_TYPE_PARTNER: &str = "PARTNER";
pub const ENTITY_TYPE_SERVICE: &str = "SERVICE";
pub const ENTITY_TYPE_STAFFER: &str = "STAFFER";

// ============================================================================
// TableItem
// ============================================================================

/// An entity stored as one record of the single table.
pub trait TableItem: Sized {
    /// Discriminator written to `item_type`.
    const ENTITY_TYPE: &'static str;
    /// Entity whose id names the partition this record lives in.
    const PARENT_ENTITY: &'static str;

    fn pk(&self) -> String;

    fn sk(&self) -> String;

    /// Flattens the entity into a record, keys and discriminator included.
    fn to_item(&self) -> Item;

    /// Rebuilds the entity, rejecting records that are incomplete or invalid.
    fn from_item(item: &Item) -> Result<Self, RepositoryError>;

    /// Builds a `SET` expression for every mutable attribute.
    fn to_update_expression(&self, now: DateTime<Utc>) -> UpdateExpression {
        UpdateExpression::from_item(self.to_item(), now)
    }
}

/// Base record shared by every entity: keys plus discriminator.
fn base_item<T: TableItem>(entity: &T) -> Item {
    let mut item = HashMap::new();
    item.insert(attr::PK.to_string(), AttributeValue::S(entity.pk()));
    item.insert(attr::SK.to_string(), AttributeValue::S(entity.sk()));
    item.insert(
        attr::ITEM_TYPE.to_string(),
        AttributeValue::S(T::ENTITY_TYPE.to_string()),
    );
    item
}

fn expect_item_type<T: TableItem>(item: &Item) -> Result<(), RepositoryError> {
    let item_type = get_string(item, attr::ITEM_TYPE)?;
    if item_type != T::ENTITY_TYPE {
        return Err(RepositoryError::InvalidData(format!(
            "Expected item_type {}, found {}",
            T::ENTITY_TYPE,
            item_type
        )));
    }
    Ok(())
}

// ============================================================================
// Partner conversions
// ============================================================================

impl TableItem for Partner {
    const ENTITY_TYPE: &'static str = ENTITY_TYPE_PARTNER;
    const PARENT_ENTITY: &'static str = ENTITY_TYPE_PARTNER;

    fn pk(&self) -> String {
        keys::partner_pk(self.id)
    }

    fn sk(&self) -> String {
        keys::partner_sk(self.id)
    }

    /// Services and staff are stored as their own records, never embedded here.
    fn to_item(&self) -> Item {
        let mut item = base_item(self);

        item.insert(
            attr::GSI_SK.to_string(),
            AttributeValue::S(keys::partner_gsi_sk(&self.name)),
        );

        item.insert(attr::ID.to_string(), AttributeValue::S(self.id.to_string()));
        item.insert(attr::NAME.to_string(), AttributeValue::S(self.name.clone()));
        item.insert(
            attr::IS_ACTIVE.to_string(),
            AttributeValue::Bool(self.is_active),
        );
        item.insert(attr::ADDRESS.to_string(), address_to_attr(&self.address));
        if let Some(working_hours) = &self.working_hours {
            item.insert(
                attr::WORKING_HOURS.to_string(),
                working_hours_to_attr(working_hours),
            );
        }
        item.insert(
            attr::CREATED_AT.to_string(),
            AttributeValue::S(self.created_at.to_rfc3339()),
        );
        item.insert(
            attr::UPDATED_AT.to_string(),
            AttributeValue::S(self.updated_at.to_rfc3339()),
        );

        item
    }

    fn from_item(item: &Item) -> Result<Self, RepositoryError> {
        expect_item_type::<Self>(item)?;

        let working_hours = match item.get(attr::WORKING_HOURS) {
            None | Some(AttributeValue::Null(_)) => None,
            Some(value) => Some(attr_to_working_hours(value)?),
        };

        let partner = Partner {
            id: get_ulid(item, attr::ID)?,
            name: get_string(item, attr::NAME)?,
            is_active: get_bool(item, attr::IS_ACTIVE)?,
            address: attr_to_address(get_attr(item, attr::ADDRESS)?)?,
            working_hours,
            services: Vec::new(),
            staff: Vec::new(),
            created_at: get_datetime(item, attr::CREATED_AT)?,
            updated_at: get_datetime(item, attr::UPDATED_AT)?,
        };

        validate_partner(&partner).map_err(invalid_data)?;
        Ok(partner)
    }
}

fn address_to_attr(address: &Address) -> AttributeValue {
    let location = HashMap::from([
        (
            attr::STREET.to_string(),
            AttributeValue::S(address.location.address.clone()),
        ),
        (
            attr::LAT.to_string(),
            AttributeValue::N(address.location.lat.to_string()),
        ),
        (
            attr::LON.to_string(),
            AttributeValue::N(address.location.lon.to_string()),
        ),
    ]);

    AttributeValue::M(HashMap::from([
        (
            attr::COUNTRY.to_string(),
            AttributeValue::S(address.country.clone()),
        ),
        (attr::CITY.to_string(), AttributeValue::S(address.city.clone())),
        (attr::LOCATION.to_string(), AttributeValue::M(location)),
    ]))
}

fn attr_to_address(value: &AttributeValue) -> Result<Address, RepositoryError> {
    let map = as_map(value, attr::ADDRESS)?;
    let location = as_map(get_attr(map, attr::LOCATION)?, attr::LOCATION)?;

    let address = Address {
        country: get_string(map, attr::COUNTRY)?,
        city: get_string(map, attr::CITY)?,
        location: Location {
            address: get_string(location, attr::STREET)?,
            lat: get_decimal(location, attr::LAT)?,
            lon: get_decimal(location, attr::LON)?,
        },
    };

    validate_address(&address).map_err(invalid_data)?;
    Ok(address)
}

fn working_hours_to_attr(working_hours: &[WorkingHours]) -> AttributeValue {
    let days = working_hours
        .iter()
        .map(|day| {
            let shifts = day
                .shifts
                .iter()
                .map(|shift| {
                    AttributeValue::M(HashMap::from([
                        (
                            attr::START.to_string(),
                            AttributeValue::S(shift.start.to_string()),
                        ),
                        (
                            attr::END.to_string(),
                            AttributeValue::S(shift.end.to_string()),
                        ),
                    ]))
                })
                .collect();

            AttributeValue::M(HashMap::from([
                (
                    attr::DAY.to_string(),
                    AttributeValue::S(day.day.as_str().to_string()),
                ),
                (attr::SHIFTS.to_string(), AttributeValue::L(shifts)),
            ]))
        })
        .collect();

    AttributeValue::L(days)
}

/// Schedule rules are checked by `validate_partner` once the root is built.
fn attr_to_working_hours(value: &AttributeValue) -> Result<Vec<WorkingHours>, RepositoryError> {
    as_list(value, attr::WORKING_HOURS)?
        .iter()
        .map(|day| {
            let day = as_map(day, attr::WORKING_HOURS)?;
            let name = get_string(day, attr::DAY)?;
            let parsed = DayOfWeek::parse(&name)
                .ok_or_else(|| RepositoryError::InvalidData(format!("Unknown day: {}", name)))?;

            let shifts = as_list(get_attr(day, attr::SHIFTS)?, attr::SHIFTS)?
                .iter()
                .map(|shift| {
                    let shift = as_map(shift, attr::SHIFTS)?;
                    Ok::<_, RepositoryError>(TimeRange::new(
                        get_time(shift, attr::START)?,
                        get_time(shift, attr::END)?,
                    ))
                })
                .collect::<Result<Vec<_>, _>>()?;

            Ok::<_, RepositoryError>(WorkingHours::new(parsed, shifts))
        })
        .collect()
}

// ============================================================================
// Service conversions
// ============================================================================

impl TableItem for Service {
    const ENTITY_TYPE: &'static str = ENTITY_TYPE_SERVICE;
    const PARENT_ENTITY: &'static str = ENTITY_TYPE_PARTNER;

    fn pk(&self) -> String {
        keys::child_pk(self.partner_id)
    }

    fn sk(&self) -> String {
        keys::service_sk(self.id)
    }

    fn to_item(&self) -> Item {
        let mut item = base_item(self);

        item.insert(attr::ID.to_string(), AttributeValue::S(self.id.to_string()));
        item.insert(
            attr::PARTNER_ID.to_string(),
            AttributeValue::S(self.partner_id.to_string()),
        );
        item.insert(attr::NAME.to_string(), AttributeValue::S(self.name.clone()));
        item.insert(
            attr::PRICE.to_string(),
            AttributeValue::N(self.price.to_string()),
        );
        item.insert(
            attr::CURRENCY.to_string(),
            AttributeValue::S(self.currency.as_str().to_string()),
        );

        item
    }

    fn from_item(item: &Item) -> Result<Self, RepositoryError> {
        expect_item_type::<Self>(item)?;

        let currency = get_string(item, attr::CURRENCY)?;
        let service = Service {
            id: get_ulid(item, attr::ID)?,
            partner_id: get_ulid(item, attr::PARTNER_ID)?,
            name: get_string(item, attr::NAME)?,
            price: get_decimal(item, attr::PRICE)?,
            currency: Currency::parse(&currency).ok_or_else(|| {
                RepositoryError::InvalidData(format!("Unknown currency: {}", currency))
            })?,
        };

        validate_service(&service).map_err(invalid_data)?;
        Ok(service)
    }
}

// ============================================================================
// Staffer conversions
// ============================================================================

impl TableItem for Staffer {
    const ENTITY_TYPE: &'static str = ENTITY_TYPE_STAFFER;
    const PARENT_ENTITY: &'static str = ENTITY_TYPE_PARTNER;

    fn pk(&self) -> String {
        keys::child_pk(self.partner_id)
    }

    fn sk(&self) -> String {
        keys::staffer_sk(self.id)
    }

    fn to_item(&self) -> Item {
        let mut item = base_item(self);

        item.insert(attr::ID.to_string(), AttributeValue::S(self.id.to_string()));
        item.insert(
            attr::PARTNER_ID.to_string(),
            AttributeValue::S(self.partner_id.to_string()),
        );
        item.insert(
            attr::FIRST_NAME.to_string(),
            AttributeValue::S(self.first_name.clone()),
        );
        item.insert(
            attr::LAST_NAME.to_string(),
            AttributeValue::S(self.last_name.clone()),
        );

        item
    }

    fn from_item(item: &Item) -> Result<Self, RepositoryError> {
        expect_item_type::<Self>(item)?;

        let staffer = Staffer {
            id: get_ulid(item, attr::ID)?,
            partner_id: get_ulid(item, attr::PARTNER_ID)?,
            first_name: get_string(item, attr::FIRST_NAME)?,
            last_name: get_string(item, attr::LAST_NAME)?,
        };

        validate_staffer(&staffer).map_err(invalid_data)?;
        Ok(staffer)
    }
}

// ============================================================================
// Decoding by discriminator
// ============================================================================

/// Any record found in a partner partition.
#[derive(Debug, Clone, PartialEq)]
pub enum PartnerItem {
    Partner(Partner),
    Service(Service),
    Staffer(Staffer),
}

impl PartnerItem {
    /// Decodes a record according to its `item_type`.
    pub fn from_item(item: &Item) -> Result<Self, RepositoryError> {
        let item_type = get_string(item, attr::ITEM_TYPE)?;
        match item_type.as_str() {
            ENTITY_TYPE_PARTNER => Partner::from_item(item).map(Self::Partner),
            ENTITY_TYPE_SERVICE => Service::from_item(item).map(Self::Service),
            ENTITY_TYPE_STAFFER => Staffer::from_item(item).map(Self::Staffer),
            other => Err(RepositoryError::InvalidData(format!(
                "Unknown item_type: {}",
                other
            ))),
        }
    }
}

/// Serializes a whole aggregate: the root record first, then every child.
pub fn partner_to_items(partner: &Partner) -> Vec<Item> {
    let mut items = Vec::with_capacity(partner.item_count());
    items.push(partner.to_item());
    items.extend(partner.services.iter().map(TableItem::to_item));
    items.extend(partner.staff.iter().map(TableItem::to_item));
    items
}

// ============================================================================
// Helper functions
// ============================================================================

fn invalid_data(err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::InvalidData(err.to_string())
}

fn missing(key: &str) -> RepositoryError {
    RepositoryError::InvalidData(format!("Missing or invalid field: {}", key))
}

/// Get a required attribute of any type.
fn get_attr<'a>(item: &'a Item, key: &str) -> Result<&'a AttributeValue, RepositoryError> {
    item.get(key).ok_or_else(|| missing(key))
}

/// Get a required string attribute.
pub(crate) fn get_string(item: &Item, key: &str) -> Result<String, RepositoryError> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .ok_or_else(|| missing(key))
}

/// Get a required boolean attribute.
fn get_bool(item: &Item, key: &str) -> Result<bool, RepositoryError> {
    item.get(key)
        .and_then(|v| v.as_bool().ok())
        .copied()
        .ok_or_else(|| missing(key))
}

/// Get a required ULID attribute.
fn get_ulid(item: &Item, key: &str) -> Result<Ulid, RepositoryError> {
    let s = get_string(item, key)?;
    Ulid::from_string(&s)
        .map_err(|e| RepositoryError::InvalidData(format!("Invalid ULID {}: {}", key, e)))
}

/// Get a required exact decimal stored as a number attribute.
fn get_decimal(item: &Item, key: &str) -> Result<Decimal, RepositoryError> {
    let n = item
        .get(key)
        .and_then(|v| v.as_n().ok())
        .ok_or_else(|| missing(key))?;
    Decimal::from_str(n)
        .or_else(|_| Decimal::from_scientific(n))
        .map_err(|e| RepositoryError::InvalidData(format!("Invalid decimal {}: {}", key, e)))
}

/// Get a required time-of-day attribute.
fn get_time(item: &Item, key: &str) -> Result<NaiveTime, RepositoryError> {
    let s = get_string(item, key)?;
    s.parse::<NaiveTime>()
        .map_err(|e| RepositoryError::InvalidData(format!("Invalid time {}: {}", key, e)))
}

/// Get a required datetime attribute (RFC 3339 format).
fn get_datetime(item: &Item, key: &str) -> Result<DateTime<Utc>, RepositoryError> {
    let s = get_string(item, key)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::InvalidData(format!("Invalid datetime {}: {}", key, e)))
}

fn as_map<'a>(value: &'a AttributeValue, key: &str) -> Result<&'a Item, RepositoryError> {
    value.as_m().map_err(|_| missing(key))
}

fn as_list<'a>(
    value: &'a AttributeValue,
    key: &str,
) -> Result<&'a Vec<AttributeValue>, RepositoryError> {
    value.as_l().map_err(|_| missing(key))
}
