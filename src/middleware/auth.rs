use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;
use crate::models::partner::PartnerStatus;
use crate::models::user::Role;
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: String,
}

/// Authenticated caller, resolved from the bearer token (and, for partner
/// accounts, the approved partner profile). Exactly one attribution id is
/// used downstream: partners act through `partner_id`, everyone else
/// through `user_id`.
#[derive(Debug, Clone)]
pub struct ActorContext {
    pub user_id: Uuid,
    pub role: Role,
    pub partner_id: Option<Uuid>,
}

fn decode_claims(req: &Request) -> Result<Claims, Response> {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return Err(Error::Unauthorized("missing authorization header".into()).into_response());
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err(Error::Unauthorized("malformed authorization header".into()).into_response());
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(Error::Unauthorized("unsupported authorization scheme".into()).into_response());
    };

    let config = crate::config::get_config();
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| Error::Unauthorized("invalid token".into()).into_response())
}

fn parse_identity(claims: &Claims) -> Result<(Uuid, Role), Response> {
    let user_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| Error::Unauthorized("invalid token subject".into()).into_response())?;
    let role = Role::parse(&claims.role)
        .ok_or_else(|| Error::Unauthorized("unknown role".into()).into_response())?;
    Ok((user_id, role))
}

pub async fn require_bearer_auth(mut req: Request, next: Next) -> Response {
    let claims = match decode_claims(&req) {
        Ok(claims) => claims,
        Err(resp) => return resp,
    };
    req.extensions_mut().insert(claims);
    next.run(req).await
}

pub async fn require_admin(mut req: Request, next: Next) -> Response {
    let claims = match decode_claims(&req) {
        Ok(claims) => claims,
        Err(resp) => return resp,
    };
    let (user_id, role) = match parse_identity(&claims) {
        Ok(identity) => identity,
        Err(resp) => return resp,
    };
    if role != Role::Admin {
        return Error::Forbidden("admin access required".into()).into_response();
    }
    req.extensions_mut().insert(claims);
    req.extensions_mut().insert(ActorContext {
        user_id,
        role,
        partner_id: None,
    });
    next.run(req).await
}

/// Resolves the full actor context. Partner accounts must hold an APPROVED
/// partner profile; PENDING and REJECTED partners are turned away here so
/// the submission paths never see them.
pub async fn load_actor(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let claims = match decode_claims(&req) {
        Ok(claims) => claims,
        Err(resp) => return resp,
    };
    let (user_id, role) = match parse_identity(&claims) {
        Ok(identity) => identity,
        Err(resp) => return resp,
    };

    let partner_id = if role == Role::Partner {
        let row = sqlx::query_as::<_, (Uuid, PartnerStatus)>(
            "SELECT id, status FROM partners WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&state.pool)
        .await;

        match row {
            Ok(Some((id, PartnerStatus::Approved))) => Some(id),
            Ok(Some((_, PartnerStatus::Pending))) => {
                return Error::Forbidden(
                    "your partner account is pending admin approval".into(),
                )
                .into_response()
            }
            Ok(Some((_, PartnerStatus::Rejected))) => {
                return Error::Forbidden(
                    "your partner account has been rejected, please contact admin".into(),
                )
                .into_response()
            }
            Ok(None) => {
                return Error::Forbidden("partner profile not found".into()).into_response()
            }
            Err(err) => return Error::from(err).into_response(),
        }
    } else {
        None
    };

    req.extensions_mut().insert(claims);
    req.extensions_mut().insert(ActorContext {
        user_id,
        role,
        partner_id,
    });
    next.run(req).await
}
