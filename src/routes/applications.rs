use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::application_dto::{
        AdvanceStagePayload, ApplicationFilters, ApplicationListItem, ApplyPayload,
    },
    error::{Error, Result},
    middleware::auth::ActorContext,
    models::application::Application,
    models::user::Role,
    AppState,
};

#[utoipa::path(
    post,
    path = "/applications/apply",
    request_body = ApplyPayload,
    responses(
        (status = 201, description = "Application submitted", body = Json<Application>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Job not found"),
        (status = 409, description = "Job not open, or candidate already applied")
    )
)]
#[axum::debug_handler]
pub async fn apply(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Json(payload): Json<ApplyPayload>,
) -> Result<impl IntoResponse> {
    if actor.role == Role::Admin {
        return Err(Error::Forbidden(
            "admins cannot submit applications".to_string(),
        ));
    }
    payload.validate()?;
    let application = state.application_service.apply_to_job(&payload, &actor).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

#[utoipa::path(
    get,
    path = "/applications/my",
    params(
        ("stage" = Option<String>, Query, description = "Filter by pipeline stage"),
        ("job_id" = Option<Uuid>, Query, description = "Filter by job")
    ),
    responses(
        (status = 200, description = "Applications submitted by the caller", body = Json<Vec<ApplicationListItem>>)
    )
)]
#[axum::debug_handler]
pub async fn my_applications(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Query(filters): Query<ApplicationFilters>,
) -> Result<impl IntoResponse> {
    let applications = state.application_service.list_for(&actor, &filters).await?;
    Ok(Json(applications))
}

#[utoipa::path(
    post,
    path = "/applications/{id}/withdraw",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application withdrawn", body = Json<Application>),
        (status = 404, description = "Application not found"),
        (status = 409, description = "Application already finalized")
    )
)]
#[axum::debug_handler]
pub async fn withdraw_application(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let application = state.application_service.withdraw(id, &actor).await?;
    Ok(Json(application))
}

#[utoipa::path(
    get,
    path = "/applications",
    params(
        ("stage" = Option<String>, Query, description = "Filter by pipeline stage"),
        ("job_id" = Option<Uuid>, Query, description = "Filter by job")
    ),
    responses(
        (status = 200, description = "All applications", body = Json<Vec<ApplicationListItem>>)
    )
)]
#[axum::debug_handler]
pub async fn all_applications(
    State(state): State<AppState>,
    Query(filters): Query<ApplicationFilters>,
) -> Result<impl IntoResponse> {
    let applications = state.application_service.list_all(&filters).await?;
    Ok(Json(applications))
}

#[utoipa::path(
    patch,
    path = "/applications/{id}/stage",
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = AdvanceStagePayload,
    responses(
        (status = 200, description = "Stage advanced", body = Json<Application>),
        (status = 400, description = "Invalid pipeline stage"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn advance_stage(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdvanceStagePayload>,
) -> Result<impl IntoResponse> {
    let application = state
        .application_service
        .advance_stage(id, &payload.pipeline_stage)
        .await?;
    Ok(Json(application))
}
