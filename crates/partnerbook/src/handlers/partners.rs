use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use partnerbook_core::partner::{PartnerCreate, PartnerPublic};

use crate::{context::RequestContext, handlers::AppError, state::AppState};

/// Create a partner with its services and staff (POST /api/partners).
///
/// Requires an elevated caller.
pub async fn create_partner(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<PartnerCreate>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!(
        request_id = %ctx.request_id,
        caller_id = %ctx.caller.id,
        services = payload.services.len(),
        staff = payload.staff.len(),
        "Create partner request"
    );

    let partner = state.partners.create_partner(&ctx.caller, payload).await?;

    Ok((StatusCode::CREATED, Json(partner)))
}

/// Get a single partner by ID (GET /api/partners/{id}).
pub async fn get_partner(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<Json<PartnerPublic>, AppError> {
    tracing::debug!(request_id = %ctx.request_id, partner_id = %id, "Get partner request");

    let partner = state.partners.get_partner(&ctx.caller, &id).await?;

    Ok(Json(partner))
}
