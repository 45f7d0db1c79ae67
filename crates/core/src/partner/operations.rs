use std::collections::HashSet;

use super::error::ValidationError;
use super::types::{Address, Partner, Service, Staffer, WorkingHours};

pub const PARTNER_NAME_MAX_LEN: usize = 50;
pub const COUNTRY_MAX_LEN: usize = 56;
pub const CITY_MAX_LEN: usize = 100;
pub const SERVICE_NAME_MAX_LEN: usize = 50;
pub const STAFFER_NAME_MAX_LEN: usize = 50;

/// Normalizes a name for case- and whitespace-insensitive lookups.
///
/// Idempotent: `normalize_name(normalize_name(s)) == normalize_name(s)`.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Validates a whole aggregate: the root, its schedule and every child.
pub fn validate_partner(partner: &Partner) -> Result<(), ValidationError> {
    check_length("name", &partner.name, PARTNER_NAME_MAX_LEN)?;
    validate_address(&partner.address)?;

    if let Some(working_hours) = &partner.working_hours {
        validate_working_hours(working_hours)?;
    }

    for (index, service) in partner.services.iter().enumerate() {
        validate_service_at(service, &format!("services[{index}]"))?;
        check_owner("Service", service.id, service.partner_id, partner)?;
    }
    for (index, staffer) in partner.staff.iter().enumerate() {
        validate_staffer_at(staffer, &format!("staff[{index}]"))?;
        check_owner("Staffer", staffer.id, staffer.partner_id, partner)?;
    }

    Ok(())
}

/// Validates the length limits on an address.
pub fn validate_address(address: &Address) -> Result<(), ValidationError> {
    check_length("address.country", &address.country, COUNTRY_MAX_LEN)?;
    check_length("address.city", &address.city, CITY_MAX_LEN)?;
    Ok(())
}

/// Validates a working-hours schedule.
///
/// Each day may appear once, must have at least one shift, every shift must
/// end after it starts and shifts within a day must not overlap.
pub fn validate_working_hours(working_hours: &[WorkingHours]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();

    for day in working_hours {
        if !seen.insert(day.day) {
            return Err(ValidationError::DuplicateDay { day: day.day });
        }
        if day.shifts.is_empty() {
            return Err(ValidationError::NoShifts { day: day.day });
        }
        if let Some(shift) = day.shifts.iter().find(|shift| shift.end <= shift.start) {
            return Err(ValidationError::InvalidShift {
                day: day.day,
                start: shift.start,
                end: shift.end,
            });
        }

        let mut shifts = day.shifts.clone();
        shifts.sort_by_key(|shift| shift.start);
        if shifts.windows(2).any(|pair| pair[0].overlaps(&pair[1])) {
            return Err(ValidationError::OverlappingShifts { day: day.day });
        }
    }

    Ok(())
}

pub fn validate_service(service: &Service) -> Result<(), ValidationError> {
    validate_service_at(service, "service")
}

pub fn validate_staffer(staffer: &Staffer) -> Result<(), ValidationError> {
    validate_staffer_at(staffer, "staffer")
}

fn validate_service_at(service: &Service, path: &str) -> Result<(), ValidationError> {
    check_length(&format!("{path}.name"), &service.name, SERVICE_NAME_MAX_LEN)
}

fn validate_staffer_at(staffer: &Staffer, path: &str) -> Result<(), ValidationError> {
    check_length(
        &format!("{path}.first_name"),
        &staffer.first_name,
        STAFFER_NAME_MAX_LEN,
    )?;
    check_length(
        &format!("{path}.last_name"),
        &staffer.last_name,
        STAFFER_NAME_MAX_LEN,
    )
}

fn check_owner(
    entity: &'static str,
    child_id: ulid::Ulid,
    owner_id: ulid::Ulid,
    partner: &Partner,
) -> Result<(), ValidationError> {
    if owner_id != partner.id {
        return Err(ValidationError::ForeignChild {
            entity,
            child_id,
            owner_id,
            partner_id: partner.id,
        });
    }
    Ok(())
}

/// Length limits count characters, not bytes.
fn check_length(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
            actual,
        });
    }
    Ok(())
}
