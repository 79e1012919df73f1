use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;

use crate::{
    dto::partner_dto::PendingPartnerItem,
    error::{Error, Result},
    middleware::auth::Claims,
    models::partner::Partner,
    AppState,
};

#[utoipa::path(
    get,
    path = "/partners/pending",
    responses(
        (status = 200, description = "Partner requests awaiting approval", body = Json<Vec<PendingPartnerItem>>)
    )
)]
#[axum::debug_handler]
pub async fn pending_partners(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let requests = state.partner_service.pending_requests().await?;
    Ok(Json(requests))
}

#[utoipa::path(
    post,
    path = "/partners/{id}/approve",
    params(("id" = Uuid, Path, description = "Partner ID")),
    responses(
        (status = 200, description = "Partner approved", body = Json<Partner>),
        (status = 404, description = "Partner not found"),
        (status = 409, description = "Partner is not pending")
    )
)]
#[axum::debug_handler]
pub async fn approve_partner(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let partner = state.partner_service.approve(id).await?;
    Ok(Json(partner))
}

#[utoipa::path(
    post,
    path = "/partners/{id}/reject",
    params(("id" = Uuid, Path, description = "Partner ID")),
    responses(
        (status = 200, description = "Partner rejected", body = Json<Partner>),
        (status = 404, description = "Partner not found"),
        (status = 409, description = "Partner is not pending")
    )
)]
#[axum::debug_handler]
pub async fn reject_partner(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let partner = state.partner_service.reject(id).await?;
    Ok(Json(partner))
}

#[utoipa::path(
    get,
    path = "/partners/me",
    responses(
        (status = 200, description = "Caller's partner profile", body = Json<Partner>),
        (status = 404, description = "Partner profile not found")
    )
)]
#[axum::debug_handler]
pub async fn my_partner_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| Error::Unauthorized("invalid token subject".to_string()))?;
    let partner = state.partner_service.get_by_user_id(user_id).await?;
    Ok(Json(partner))
}
