use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::auth_dto::{CreateRecruiterPayload, UserResponse},
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/admin/recruiters",
    request_body = CreateRecruiterPayload,
    responses(
        (status = 201, description = "Recruiter account created", body = Json<UserResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Email already registered")
    )
)]
#[axum::debug_handler]
pub async fn create_recruiter(
    State(state): State<AppState>,
    Json(payload): Json<CreateRecruiterPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let recruiter = state.auth_service.create_recruiter(&payload).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(recruiter))))
}
