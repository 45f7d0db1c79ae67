mod error;
mod operations;
mod requests;
mod types;

pub use error::{ServiceError, ValidationError};
pub use operations::{
    normalize_name, validate_address, validate_partner, validate_service, validate_staffer,
    validate_working_hours, CITY_MAX_LEN, COUNTRY_MAX_LEN, PARTNER_NAME_MAX_LEN,
    SERVICE_NAME_MAX_LEN, STAFFER_NAME_MAX_LEN,
};
pub use requests::{
    PartnerCreate, PartnerPublic, ServiceCreate, ServicePublic, StafferCreate, StafferPublic,
};
pub use types::{
    Address, Currency, DayOfWeek, Location, Partner, Service, Staffer, TimeRange, WorkingHours,
};
