//! Pure functions for mapping repository and service errors to HTTP status codes.
//!
//! Functional Core: no side effects, the shell turns these into responses.

use crate::partner::ServiceError;

use super::RepositoryError;

/// Maps a [`RepositoryError`] to an HTTP status code.
///
/// - `AlreadyExists` -> 409 (Conflict)
/// - `ConnectionFailed`, `Throttled`, `PartialWrite` -> 503 (Service Unavailable)
/// - `QueryFailed`, `Serialization` -> 500 (Internal Server Error)
/// - `InvalidData`, `TransactionTooLarge` -> 400 (Bad Request)
///
/// # Examples
///
/// ```
/// use partnerbook_core::storage::{RepositoryError, repository_error_to_status_code};
///
/// let error = RepositoryError::Throttled("rate exceeded".to_string());
/// assert_eq!(repository_error_to_status_code(&error), 503);
/// ```
pub fn repository_error_to_status_code(error: &RepositoryError) -> u16 {
    match error {
        RepositoryError::AlreadyExists { .. } => 409,
        RepositoryError::ConnectionFailed(_) => 503,
        RepositoryError::Throttled(_) => 503,
        RepositoryError::PartialWrite { .. } => 503,
        RepositoryError::QueryFailed(_) => 500,
        RepositoryError::Serialization(_) => 500,
        RepositoryError::InvalidData(_) => 400,
        RepositoryError::TransactionTooLarge { .. } => 400,
    }
}

/// Maps a [`ServiceError`] to an HTTP status code.
///
/// Validation failures share the 422 used for malformed JSON bodies.
pub fn service_error_to_status_code(error: &ServiceError) -> u16 {
    match error {
        ServiceError::Validation(_) => 422,
        ServiceError::NotFound { .. } => 404,
        ServiceError::Forbidden => 403,
        ServiceError::Repository(inner) => repository_error_to_status_code(inner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partner::ValidationError;

    #[test]
    fn test_already_exists_maps_to_409() {
        let error = RepositoryError::AlreadyExists {
            entity_type: "Partner",
            id: "p-123".to_string(),
        };
        assert_eq!(repository_error_to_status_code(&error), 409);
    }

    #[test]
    fn test_retryable_errors_map_to_503() {
        let errors = [
            RepositoryError::ConnectionFailed("dns failure".to_string()),
            RepositoryError::Throttled("throughput exceeded".to_string()),
            RepositoryError::PartialWrite {
                partner_id: "p-123".to_string(),
                written: 3,
                unprocessed: 1,
            },
        ];
        for error in errors {
            assert_eq!(repository_error_to_status_code(&error), 503, "{error}");
        }
    }

    #[test]
    fn test_internal_errors_map_to_500() {
        let error = RepositoryError::QueryFailed("invalid query syntax".to_string());
        assert_eq!(repository_error_to_status_code(&error), 500);

        let error = RepositoryError::Serialization("bad attribute".to_string());
        assert_eq!(repository_error_to_status_code(&error), 500);
    }

    #[test]
    fn test_invalid_data_maps_to_400() {
        let error = RepositoryError::InvalidData("price is not a number".to_string());
        assert_eq!(repository_error_to_status_code(&error), 400);

        let error = RepositoryError::TransactionTooLarge {
            items: 120,
            limit: 100,
        };
        assert_eq!(repository_error_to_status_code(&error), 400);
    }

    #[test]
    fn test_service_errors() {
        let validation = ServiceError::Validation(ValidationError::TooLong {
            field: "name".to_string(),
            max: 50,
            actual: 51,
        });
        assert_eq!(service_error_to_status_code(&validation), 422);

        let not_found = ServiceError::NotFound {
            entity: "Partner",
            id: "nonexistent-id".to_string(),
        };
        assert_eq!(service_error_to_status_code(&not_found), 404);

        assert_eq!(service_error_to_status_code(&ServiceError::Forbidden), 403);

        let repository =
            ServiceError::Repository(RepositoryError::ConnectionFailed("down".to_string()));
        assert_eq!(service_error_to_status_code(&repository), 503);
    }
}
