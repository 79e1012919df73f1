use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::auth_dto::{
        AuthResponse, LoginPayload, PartnerSignupPayload, PartnerSignupResponse, SignupPayload,
        UserResponse,
    },
    error::{Error, Result},
    middleware::auth::Claims,
    services::auth_service,
    AppState,
};

#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupPayload,
    responses(
        (status = 201, description = "Account created", body = Json<UserResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Email already registered")
    )
)]
#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.auth_service.signup(&payload).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Authenticated", body = Json<AuthResponse>),
        (status = 401, description = "Invalid credentials")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let (token, user) = state.auth_service.login(&payload).await?;
    Ok(Json(AuthResponse {
        token,
        user: UserResponse::from(user),
    }))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current account", body = Json<UserResponse>),
        (status = 401, description = "Not authenticated")
    )
)]
#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| Error::Unauthorized("invalid token subject".to_string()))?;
    let user = state.auth_service.get_user(user_id).await?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    post,
    path = "/auth/partner-signup",
    request_body = PartnerSignupPayload,
    responses(
        (status = 201, description = "Partner account created, pending approval", body = Json<PartnerSignupResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Email already registered")
    )
)]
#[axum::debug_handler]
pub async fn partner_signup(
    State(state): State<AppState>,
    Json(payload): Json<PartnerSignupPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let password_hash = auth_service::hash_password(&payload.password)?;
    let (user, partner) = state.partner_service.signup(&payload, password_hash).await?;
    Ok((
        StatusCode::CREATED,
        Json(PartnerSignupResponse {
            user: UserResponse::from(user),
            partner,
        }),
    ))
}
