use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    dto::dashboard_dto::{
        AdminDashboard, DashboardQuery, PartnerDashboard, RecruiterDashboard, UserDashboard,
    },
    error::{Error, Result},
    middleware::auth::ActorContext,
    models::user::Role,
    AppState,
};

#[utoipa::path(
    get,
    path = "/admin/dashboard",
    params(("range" = Option<String>, Query, description = "Trailing window: 7d, 30d or 90d")),
    responses(
        (status = 200, description = "Global analytics report", body = Json<AdminDashboard>)
    )
)]
#[axum::debug_handler]
pub async fn admin_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<impl IntoResponse> {
    let range = query.range.unwrap_or_default();
    let dashboard = state.dashboard_service.admin_dashboard(range).await?;
    Ok(Json(dashboard))
}

#[utoipa::path(
    get,
    path = "/partner/dashboard",
    params(("range" = Option<String>, Query, description = "Trailing window: 7d, 30d or 90d")),
    responses(
        (status = 200, description = "Partner-scoped analytics report", body = Json<PartnerDashboard>),
        (status = 403, description = "Caller is not an approved partner")
    )
)]
#[axum::debug_handler]
pub async fn partner_dashboard(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Query(query): Query<DashboardQuery>,
) -> Result<impl IntoResponse> {
    let partner_id = actor
        .partner_id
        .ok_or_else(|| Error::Forbidden("partner access required".to_string()))?;
    let range = query.range.unwrap_or_default();
    let dashboard = state
        .dashboard_service
        .partner_dashboard(partner_id, range)
        .await?;
    Ok(Json(dashboard))
}

#[utoipa::path(
    get,
    path = "/user/dashboard",
    params(("range" = Option<String>, Query, description = "Trailing window: 7d, 30d or 90d")),
    responses(
        (status = 200, description = "Caller-scoped analytics report", body = Json<UserDashboard>)
    )
)]
#[axum::debug_handler]
pub async fn user_dashboard(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Query(query): Query<DashboardQuery>,
) -> Result<impl IntoResponse> {
    let range = query.range.unwrap_or_default();
    let dashboard = state
        .dashboard_service
        .user_dashboard(actor.user_id, range)
        .await?;
    Ok(Json(dashboard))
}

#[utoipa::path(
    get,
    path = "/recruiter/dashboard",
    params(("range" = Option<String>, Query, description = "Trailing window: 7d, 30d or 90d")),
    responses(
        (status = 200, description = "Recruiter-scoped analytics report", body = Json<RecruiterDashboard>),
        (status = 403, description = "Caller is not a recruiter")
    )
)]
#[axum::debug_handler]
pub async fn recruiter_dashboard(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Query(query): Query<DashboardQuery>,
) -> Result<impl IntoResponse> {
    if actor.role != Role::Recruiter {
        return Err(Error::Forbidden("recruiter access required".to_string()));
    }
    let range = query.range.unwrap_or_default();
    let dashboard = state
        .dashboard_service
        .recruiter_dashboard(actor.user_id, range)
        .await?;
    Ok(Json(dashboard))
}
