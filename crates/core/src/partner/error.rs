use chrono::NaiveTime;
use thiserror::Error;
use ulid::Ulid;

use crate::storage::RepositoryError;

use super::types::DayOfWeek;

/// Constraint violations on partner input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must be at most {max} characters long (got {actual})")]
    TooLong {
        field: String,
        max: usize,
        actual: usize,
    },
    #[error("Working hours for {day} must contain at least one shift")]
    NoShifts { day: DayOfWeek },
    #[error("Shift on {day} must end after it starts ({start} - {end})")]
    InvalidShift {
        day: DayOfWeek,
        start: NaiveTime,
        end: NaiveTime,
    },
    #[error("Shifts on {day} overlap")]
    OverlappingShifts { day: DayOfWeek },
    #[error("Working hours for {day} are listed more than once")]
    DuplicateDay { day: DayOfWeek },
    #[error("{entity} {child_id} belongs to partner {owner_id}, expected {partner_id}")]
    ForeignChild {
        entity: &'static str,
        child_id: Ulid,
        owner_id: Ulid,
        partner_id: Ulid,
    },
}

/// Errors surfaced by the partner service to its callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("{entity} with id {id} does not exist.")]
    NotFound { entity: &'static str, id: String },
    #[error("The user doesn't have enough privileges")]
    Forbidden,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let error = ValidationError::TooLong {
            field: "name".to_string(),
            max: 50,
            actual: 51,
        };
        assert_eq!(
            error.to_string(),
            "name must be at most 50 characters long (got 51)"
        );
        assert_eq!(
            ValidationError::NoShifts {
                day: DayOfWeek::Monday
            }
            .to_string(),
            "Working hours for monday must contain at least one shift"
        );
    }

    #[test]
    fn test_not_found_display() {
        let error = ServiceError::NotFound {
            entity: "Partner",
            id: "nonexistent-id".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Partner with id nonexistent-id does not exist."
        );
    }

    #[test]
    fn test_repository_error_is_transparent() {
        let error: ServiceError = RepositoryError::Throttled("slow down".to_string()).into();
        assert_eq!(error.to_string(), "Throttled: slow down");
    }
}
