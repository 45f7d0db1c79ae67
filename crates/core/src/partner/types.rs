use chrono::{DateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Day of the week used by working-hours schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
        }
    }

    /// Parses the lowercase day name used on the wire and in stored items.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "monday" => Some(Self::Monday),
            "tuesday" => Some(Self::Tuesday),
            "wednesday" => Some(Self::Wednesday),
            "thursday" => Some(Self::Thursday),
            "friday" => Some(Self::Friday),
            "saturday" => Some(Self::Saturday),
            "sunday" => Some(Self::Sunday),
            _ => None,
        }
    }
}

impl std::fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A half-open `[start, end)` slice of a working day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Returns true if the two ranges share any instant.
    /// Ranges that only touch (`a.end == b.start`) do not overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Shifts a partner works on one day of the week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    pub day: DayOfWeek,
    pub shifts: Vec<TimeRange>,
}

impl WorkingHours {
    pub fn new(day: DayOfWeek, shifts: Vec<TimeRange>) -> Self {
        Self { day, shifts }
    }
}

/// Currencies a service can be priced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "RSD")]
    Rsd,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rsd => "RSD",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "RSD" => Some(Self::Rsd),
            _ => None,
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Street address plus coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub lat: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub lon: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub country: String,
    pub city: String,
    pub location: Location,
}

/// A bookable service offered by a partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: Ulid,
    /// The partner this service belongs to.
    pub partner_id: Ulid,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    pub currency: Currency,
}

impl Service {
    /// Creates a new service with a fresh id.
    pub fn new(
        partner_id: Ulid,
        name: impl Into<String>,
        price: Decimal,
        currency: Currency,
    ) -> Self {
        Self {
            id: Ulid::new(),
            partner_id,
            name: name.into(),
            price,
            currency,
        }
    }

    /// Sets a specific ID for this service (useful for testing).
    pub fn with_id(mut self, id: Ulid) -> Self {
        self.id = id;
        self
    }
}

/// A member of a partner's staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staffer {
    pub id: Ulid,
    /// The partner this staffer works for.
    pub partner_id: Ulid,
    pub first_name: String,
    pub last_name: String,
}

impl Staffer {
    /// Creates a new staffer with a fresh id.
    pub fn new(
        partner_id: Ulid,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: Ulid::new(),
            partner_id,
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// Sets a specific ID for this staffer (useful for testing).
    pub fn with_id(mut self, id: Ulid) -> Self {
        self.id = id;
        self
    }
}

/// Aggregate root: a partner together with the services and staff it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    pub id: Ulid,
    pub name: String,
    pub is_active: bool,
    pub address: Address,
    pub working_hours: Option<Vec<WorkingHours>>,
    pub services: Vec<Service>,
    pub staff: Vec<Staffer>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Partner {
    /// Creates an active partner with a fresh id and no children.
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        let now = Utc::now();
        Self {
            id: Ulid::new(),
            name: name.into(),
            is_active: true,
            address,
            working_hours: None,
            services: Vec::new(),
            staff: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets a specific ID for this partner (useful for testing).
    ///
    /// Children already attached are re-pointed at the new id.
    pub fn with_id(mut self, id: Ulid) -> Self {
        self.id = id;
        for service in &mut self.services {
            service.partner_id = id;
        }
        for staffer in &mut self.staff {
            staffer.partner_id = id;
        }
        self
    }

    pub fn with_working_hours(mut self, working_hours: Vec<WorkingHours>) -> Self {
        self.working_hours = Some(working_hours);
        self
    }

    /// Adds a service owned by this partner.
    pub fn with_service(
        mut self,
        name: impl Into<String>,
        price: Decimal,
        currency: Currency,
    ) -> Self {
        let service = Service::new(self.id, name, price, currency);
        self.services.push(service);
        self
    }

    /// Adds a staffer owned by this partner.
    pub fn with_staffer(
        mut self,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        let staffer = Staffer::new(self.id, first_name, last_name);
        self.staff.push(staffer);
        self
    }

    /// Number of stored records this aggregate occupies (root plus children).
    pub fn item_count(&self) -> usize {
        1 + self.services.len() + self.staff.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

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

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_new_partner_is_active_without_children() {
        let partner = Partner::new("Acme Salon", sample_address());

        assert!(partner.is_active);
        assert!(partner.services.is_empty());
        assert!(partner.staff.is_empty());
        assert!(partner.working_hours.is_none());
        assert_eq!(partner.item_count(), 1);
    }

    #[test]
    fn test_children_reference_owner() {
        let partner = Partner::new("Acme Salon", sample_address())
            .with_service("Haircut", Decimal::from_str("15.00").unwrap(), Currency::Rsd)
            .with_staffer("Ana", "Jovanovic");

        assert_eq!(partner.services[0].partner_id, partner.id);
        assert_eq!(partner.staff[0].partner_id, partner.id);
        assert_eq!(partner.item_count(), 3);
    }

    #[test]
    fn test_with_id_repoints_children() {
        let id = Ulid::from_string("01HZY8K3J6Q9W2X4V5T7R8M0NB").unwrap();
        let partner = Partner::new("Acme Salon", sample_address())
            .with_service("Haircut", Decimal::from_str("15.00").unwrap(), Currency::Rsd)
            .with_staffer("Ana", "Jovanovic")
            .with_id(id);

        assert_eq!(partner.id, id);
        assert_eq!(partner.services[0].partner_id, id);
        assert_eq!(partner.staff[0].partner_id, id);
    }

    #[test]
    fn test_time_range_overlap() {
        let morning = TimeRange::new(time(9, 0), time(12, 0));
        let lunch = TimeRange::new(time(11, 30), time(13, 0));
        let afternoon = TimeRange::new(time(12, 0), time(17, 0));

        assert!(morning.overlaps(&lunch));
        assert!(lunch.overlaps(&morning));
        assert!(!morning.overlaps(&afternoon));
    }

    #[test]
    fn test_day_of_week_round_trip() {
        for day in [
            DayOfWeek::Monday,
            DayOfWeek::Tuesday,
            DayOfWeek::Wednesday,
            DayOfWeek::Thursday,
            DayOfWeek::Friday,
            DayOfWeek::Saturday,
            DayOfWeek::Sunday,
        ] {
            assert_eq!(DayOfWeek::parse(day.as_str()), Some(day));
        }
        assert_eq!(DayOfWeek::parse("Funday"), None);
    }

    #[test]
    fn test_currency_serde() {
        assert_eq!(serde_json::to_string(&Currency::Rsd).unwrap(), "\"RSD\"");
        assert!(serde_json::from_str::<Currency>("\"EUR\"").is_err());
        assert_eq!(Currency::parse("RSD"), Some(Currency::Rsd));
        assert_eq!(Currency::parse("rsd"), None);
    }
}
