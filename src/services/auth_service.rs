use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::auth_dto::{CreateRecruiterPayload, LoginPayload, SignupPayload};
use crate::error::{is_unique_violation, Error, Result};
use crate::middleware::auth::Claims;
use crate::models::user::{Role, User};
use crate::utils::time;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at";

#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
}

impl AuthService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn signup(&self, payload: &SignupPayload) -> Result<User> {
        self.create_account(&payload.name, &payload.email, &payload.password, Role::User)
            .await
    }

    /// Admin-provisioned recruiter account.
    pub async fn create_recruiter(&self, payload: &CreateRecruiterPayload) -> Result<User> {
        self.create_account(
            &payload.name,
            &payload.email,
            &payload.password,
            Role::Recruiter,
        )
        .await
    }

    pub async fn login(&self, payload: &LoginPayload) -> Result<(String, User)> {
        let email = payload.email.to_lowercase();

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::Unauthorized("Invalid email or password".to_string()))?;

        if !verify_password(&payload.password, &user.password_hash) {
            return Err(Error::Unauthorized("Invalid email or password".to_string()));
        }

        let token = issue_token(&user)?;
        Ok((token, user))
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
        Ok(user)
    }

    async fn create_account(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<User> {
        let email = email.to_lowercase();
        let password_hash = hash_password(password)?;

        let inserted = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, password_hash, role) VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(name.trim())
        .bind(email.trim())
        .bind(&password_hash)
        .bind(role)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(user) => Ok(user),
            Err(err) if is_unique_violation(&err) => {
                Err(Error::Conflict("Email already registered".to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| Error::Internal(format!("Password hashing failed: {}", err)))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

pub fn issue_token(user: &User) -> Result<String> {
    let config = crate::config::get_config();
    let expires_at = time::now() + chrono::Duration::hours(config.jwt_ttl_hours);
    let claims = Claims {
        sub: user.id.to_string(),
        exp: expires_at.timestamp() as usize,
        role: user.role.as_str().to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|err| Error::Internal(format!("Token issuance failed: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let hash = hash_password("hunter2secret").unwrap();
        assert!(verify_password("hunter2secret", &hash));
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn verify_rejects_garbage_hashes() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
