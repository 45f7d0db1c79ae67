//! Axum extractor for RequestContext.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use partnerbook_core::auth::{AuthError, Caller, CallerRole};
use uuid::Uuid;

use super::types::{RequestContext, RequestId};
use crate::handlers::AppError;

pub const CALLER_ID_HEADER: &str = "x-caller-id";
pub const CALLER_ROLE_HEADER: &str = "x-caller-role";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

fn extract_request_id(headers: &HeaderMap) -> RequestId {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .map(RequestId::from_uuid)
        .unwrap_or_else(RequestId::new)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn extract_caller(headers: &HeaderMap) -> Result<Caller, AuthError> {
    let id = header_str(headers, CALLER_ID_HEADER).ok_or(AuthError::MissingIdentity)?;
    let role: CallerRole = header_str(headers, CALLER_ROLE_HEADER)
        .ok_or(AuthError::MissingIdentity)?
        .parse()?;
    Ok(Caller::new(id, role))
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let request_id = extract_request_id(&parts.headers);
        let caller = extract_caller(&parts.headers).inspect_err(|err| {
            tracing::debug!(
                request_id = %request_id,
                error = %err,
                "Rejected request without caller"
            );
        })?;

        Ok(RequestContext { caller, request_id })
    }
}
