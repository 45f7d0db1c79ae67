use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use partnerbook_core::auth::AuthError;
use partnerbook_core::partner::ServiceError;
use partnerbook_core::storage::{
    repository_error_to_status_code, service_error_to_status_code, RepositoryError,
};
use serde::Serialize;

/// JSON body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub status_code: u16,
}

pub struct AppError(pub anyhow::Error);

impl AppError {
    fn status_code(&self) -> StatusCode {
        let code = if let Some(service_error) = self.0.downcast_ref::<ServiceError>() {
            service_error_to_status_code(service_error)
        } else if let Some(repo_error) = self.0.downcast_ref::<RepositoryError>() {
            repository_error_to_status_code(repo_error)
        } else if self.0.downcast_ref::<AuthError>().is_some() {
            401
        } else {
            500
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        // Server-side detail stays in the log.
        let message = if status_code.is_server_error() {
            tracing::error!(status = status_code.as_u16(), error = %self.0, "Request failed");
            status_code
                .canonical_reason()
                .unwrap_or("Internal Server Error")
                .to_string()
        } else {
            self.0.to_string()
        };

        let body = ErrorBody {
            message,
            status_code: status_code.as_u16(),
        };
        (status_code, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let err = AppError::from(ServiceError::NotFound {
            entity: "Partner",
            id: "abc".to_string(),
        });

        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Partner with id abc does not exist.");
        assert_eq!(json["status_code"], 404);
    }

    #[tokio::test]
    async fn test_status_codes_by_error_kind() {
        let cases = [
            (AppError::from(ServiceError::Forbidden), StatusCode::FORBIDDEN),
            (
                AppError::from(AuthError::MissingIdentity),
                StatusCode::UNAUTHORIZED,
            ),
            (
                AppError::from(RepositoryError::Throttled("slow down".to_string())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AppError::from(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn test_server_errors_hide_internal_detail() {
        let err = AppError::from(RepositoryError::QueryFailed(
            "get_partner abc: Query failed: InternalServerError { message: \"boom\" }".to_string(),
        ));

        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"message": "Internal Server Error", "status_code": 500})
        );

        let unavailable = AppError::from(RepositoryError::ConnectionFailed(
            "Dispatch failure: connection refused".to_string(),
        ))
        .into_response();
        let json = body_json(unavailable).await;
        assert_eq!(json["message"], "Service Unavailable");
        assert_eq!(json["status_code"], 503);
    }
}
