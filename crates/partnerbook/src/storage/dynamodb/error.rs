//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `RepositoryError` from `partnerbook_core::storage`.
//! Transport failures and throttling stay distinguishable from not-found so
//! callers can retry them.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::batch_write_item::BatchWriteItemError;
use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;
use aws_sdk_dynamodb::operation::query::QueryError;
use aws_sdk_dynamodb::operation::transact_write_items::TransactWriteItemsError;
use partnerbook_core::storage::RepositoryError;

/// Cancellation code DynamoDB reports for a failed condition inside a transaction.
const CONDITIONAL_CHECK_FAILED: &str = "ConditionalCheckFailed";

/// Transport-level failures, reported before looking at the service error.
fn transport_error<E, R>(err: &SdkError<E, R>) -> Option<RepositoryError> {
    match err {
        SdkError::DispatchFailure(failure) => Some(RepositoryError::ConnectionFailed(format!(
            "Dispatch failure: {:?}",
            failure
        ))),
        SdkError::TimeoutError(_) => Some(RepositoryError::ConnectionFailed(
            "Request to DynamoDB timed out".to_string(),
        )),
        _ => None,
    }
}

/// Map a Query SDK error to RepositoryError.
pub fn map_query_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<QueryError, R>,
) -> RepositoryError {
    if let Some(mapped) = transport_error(&err) {
        return mapped;
    }
    match err.into_service_error() {
        QueryError::ResourceNotFoundException(_) => {
            RepositoryError::QueryFailed("Table not found".to_string())
        }
        QueryError::ProvisionedThroughputExceededException(_) => {
            RepositoryError::Throttled("Throughput exceeded, please retry".to_string())
        }
        QueryError::RequestLimitExceeded(_) => {
            RepositoryError::Throttled("Request limit exceeded, please retry".to_string())
        }
        QueryError::InternalServerError(_) => {
            RepositoryError::ConnectionFailed("DynamoDB internal server error".to_string())
        }
        err => RepositoryError::QueryFailed(format!("Query failed: {:?}", err)),
    }
}

/// Map a BatchWriteItem SDK error to RepositoryError.
pub fn map_batch_write_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<BatchWriteItemError, R>,
) -> RepositoryError {
    if let Some(mapped) = transport_error(&err) {
        return mapped;
    }
    match err.into_service_error() {
        BatchWriteItemError::ResourceNotFoundException(_) => {
            RepositoryError::QueryFailed("Table not found".to_string())
        }
        BatchWriteItemError::ProvisionedThroughputExceededException(_) => {
            RepositoryError::Throttled("Throughput exceeded, please retry".to_string())
        }
        BatchWriteItemError::RequestLimitExceeded(_) => {
            RepositoryError::Throttled("Request limit exceeded, please retry".to_string())
        }
        BatchWriteItemError::ItemCollectionSizeLimitExceededException(_) => {
            RepositoryError::QueryFailed("Item collection size limit exceeded".to_string())
        }
        BatchWriteItemError::InternalServerError(_) => {
            RepositoryError::ConnectionFailed("DynamoDB internal server error".to_string())
        }
        err => RepositoryError::QueryFailed(format!("BatchWriteItem failed: {:?}", err)),
    }
}

/// Map a TransactWriteItems SDK error to RepositoryError.
///
/// A cancelled transaction whose reasons include a failed condition means the
/// aggregate already exists.
pub fn map_transact_write_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<TransactWriteItemsError, R>,
    entity_type: &'static str,
    id: impl Into<String>,
) -> RepositoryError {
    if let Some(mapped) = transport_error(&err) {
        return mapped;
    }
    match err.into_service_error() {
        TransactWriteItemsError::TransactionCanceledException(cancelled) => {
            let condition_failed = cancelled
                .cancellation_reasons()
                .iter()
                .any(|reason| reason.code() == Some(CONDITIONAL_CHECK_FAILED));
            if condition_failed {
                RepositoryError::AlreadyExists {
                    entity_type,
                    id: id.into(),
                }
            } else {
                RepositoryError::QueryFailed(format!("Transaction cancelled: {:?}", cancelled))
            }
        }
        TransactWriteItemsError::TransactionInProgressException(_) => {
            RepositoryError::Throttled("Transaction in progress, please retry".to_string())
        }
        TransactWriteItemsError::ResourceNotFoundException(_) => {
            RepositoryError::QueryFailed("Table not found".to_string())
        }
        TransactWriteItemsError::ProvisionedThroughputExceededException(_) => {
            RepositoryError::Throttled("Throughput exceeded, please retry".to_string())
        }
        TransactWriteItemsError::RequestLimitExceeded(_) => {
            RepositoryError::Throttled("Request limit exceeded, please retry".to_string())
        }
        TransactWriteItemsError::InternalServerError(_) => {
            RepositoryError::ConnectionFailed("DynamoDB internal server error".to_string())
        }
        err => RepositoryError::QueryFailed(format!("TransactWriteItems failed: {:?}", err)),
    }
}

/// Map a DescribeTable SDK error to RepositoryError.
pub fn map_describe_table_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DescribeTableError, R>,
) -> RepositoryError {
    if let Some(mapped) = transport_error(&err) {
        return mapped;
    }
    match err.into_service_error() {
        DescribeTableError::ResourceNotFoundException(_) => {
            RepositoryError::ConnectionFailed("Table not found".to_string())
        }
        err => RepositoryError::ConnectionFailed(format!("DescribeTable failed: {:?}", err)),
    }
}

/// Map a failure to build an SDK request type to RepositoryError.
pub fn map_build_error(err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Serialization(err.to_string())
}

#[cfg(test)]
mod tests {
    use aws_sdk_dynamodb::types::error::{
        InternalServerError, ProvisionedThroughputExceededException, ResourceNotFoundException,
        TransactionCanceledException,
    };
    use aws_sdk_dynamodb::types::CancellationReason;

    use super::*;

    fn cancelled(codes: &[&str]) -> SdkError<TransactWriteItemsError, ()> {
        let reasons = codes
            .iter()
            .map(|code| CancellationReason::builder().code(*code).build())
            .collect();
        let exception = TransactionCanceledException::builder()
            .message("Transaction cancelled")
            .set_cancellation_reasons(Some(reasons))
            .build();
        SdkError::service_error(
            TransactWriteItemsError::TransactionCanceledException(exception),
            (),
        )
    }

    #[test]
    fn test_timeout_is_connection_failure() {
        let err: SdkError<QueryError, ()> = SdkError::timeout_error("deadline elapsed");

        let mapped = map_query_error(err);

        assert!(matches!(mapped, RepositoryError::ConnectionFailed(_)));
        assert!(mapped.is_retryable());
    }

    #[test]
    fn test_throughput_exceeded_is_throttled() {
        let err = SdkError::service_error(
            QueryError::ProvisionedThroughputExceededException(
                ProvisionedThroughputExceededException::builder()
                    .message("slow down")
                    .build(),
            ),
            (),
        );

        assert!(matches!(map_query_error(err), RepositoryError::Throttled(_)));
    }

    #[test]
    fn test_batch_write_throttling_and_outage() {
        let throttled = SdkError::service_error(
            BatchWriteItemError::ProvisionedThroughputExceededException(
                ProvisionedThroughputExceededException::builder().build(),
            ),
            (),
        );
        let internal = SdkError::service_error(
            BatchWriteItemError::InternalServerError(InternalServerError::builder().build()),
            (),
        );

        assert!(matches!(
            map_batch_write_error(throttled),
            RepositoryError::Throttled(_)
        ));
        assert!(matches!(
            map_batch_write_error(internal),
            RepositoryError::ConnectionFailed(_)
        ));
    }

    #[test]
    fn test_failed_condition_is_already_exists() {
        let err = cancelled(&["None", CONDITIONAL_CHECK_FAILED]);

        assert_eq!(
            map_transact_write_error(err, "Partner", "01HZY8K3J6Q9W2X4V5T7R8M0NB"),
            RepositoryError::AlreadyExists {
                entity_type: "Partner",
                id: "01HZY8K3J6Q9W2X4V5T7R8M0NB".to_string(),
            }
        );
    }

    #[test]
    fn test_other_cancellation_is_query_failure() {
        let err = cancelled(&["TransactionConflict"]);

        assert!(matches!(
            map_transact_write_error(err, "Partner", "abc"),
            RepositoryError::QueryFailed(_)
        ));
    }

    #[test]
    fn test_missing_table_fails_readiness() {
        let err = SdkError::service_error(
            DescribeTableError::ResourceNotFoundException(
                ResourceNotFoundException::builder().build(),
            ),
            (),
        );

        assert!(matches!(
            map_describe_table_error(err),
            RepositoryError::ConnectionFailed(_)
        ));
    }
}
