use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::auth_dto::PartnerSignupPayload;
use crate::dto::partner_dto::PendingPartnerItem;
use crate::error::{is_unique_violation, Error, Result};
use crate::models::partner::{Partner, PartnerStatus};
use crate::models::user::{Role, User};

const PARTNER_COLUMNS: &str = "id, organisation_name, owner_name, establishment_date, \
     gst_number, pan_number, msme_registered, address, contact_number, official_email, \
     user_id, status, created_at, updated_at";

#[derive(Clone)]
pub struct PartnerService {
    pool: PgPool,
}

impl PartnerService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the partner's user account and PENDING organisation profile
    /// in one transaction; neither exists without the other.
    pub async fn signup(
        &self,
        payload: &PartnerSignupPayload,
        password_hash: String,
    ) -> Result<(User, Partner)> {
        let email = payload.email.to_lowercase();

        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, password_hash, role) VALUES ($1, $2, $3, $4) \
             RETURNING id, name, email, password_hash, role, created_at, updated_at",
        )
        .bind(payload.name.trim())
        .bind(&email)
        .bind(&password_hash)
        .bind(Role::Partner)
        .fetch_one(&mut *tx)
        .await;

        let user = match inserted {
            Ok(user) => user,
            Err(err) if is_unique_violation(&err) => {
                return Err(Error::Conflict("Email already registered".to_string()))
            }
            Err(err) => return Err(err.into()),
        };

        let partner = sqlx::query_as::<_, Partner>(&format!(
            r#"
            INSERT INTO partners (
                organisation_name, owner_name, establishment_date, gst_number, pan_number,
                msme_registered, address, contact_number, official_email, user_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {PARTNER_COLUMNS}
            "#
        ))
        .bind(&payload.organisation_name)
        .bind(&payload.owner_name)
        .bind(payload.establishment_date)
        .bind(&payload.gst_number)
        .bind(&payload.pan_number)
        .bind(payload.msme_registered)
        .bind(&payload.address)
        .bind(&payload.contact_number)
        .bind(&payload.official_email)
        .bind(user.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((user, partner))
    }

    pub async fn pending_requests(&self) -> Result<Vec<PendingPartnerItem>> {
        let requests = sqlx::query_as::<_, PendingPartnerItem>(
            "SELECT p.id, p.organisation_name, p.status, p.user_id, \
                    u.name AS user_name, u.email AS user_email, p.created_at \
             FROM partners p \
             JOIN users u ON u.id = p.user_id \
             WHERE p.status = 'PENDING' \
             ORDER BY p.created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    /// PENDING -> APPROVED. Both terminal states refuse the transition.
    pub async fn approve(&self, partner_id: Uuid) -> Result<Partner> {
        let partner = self.get_by_id(partner_id).await?;

        match partner.status {
            PartnerStatus::Approved => {
                return Err(Error::InvalidState("Partner already approved".to_string()))
            }
            PartnerStatus::Rejected => {
                return Err(Error::InvalidState(
                    "Rejected partner cannot be approved".to_string(),
                ))
            }
            PartnerStatus::Pending => {}
        }

        self.set_status(partner_id, PartnerStatus::Approved).await
    }

    /// PENDING -> REJECTED. Both terminal states refuse the transition.
    pub async fn reject(&self, partner_id: Uuid) -> Result<Partner> {
        let partner = self.get_by_id(partner_id).await?;

        match partner.status {
            PartnerStatus::Rejected => {
                return Err(Error::InvalidState("Partner already rejected".to_string()))
            }
            PartnerStatus::Approved => {
                return Err(Error::InvalidState(
                    "Approved partner cannot be rejected".to_string(),
                ))
            }
            PartnerStatus::Pending => {}
        }

        self.set_status(partner_id, PartnerStatus::Rejected).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Partner> {
        let partner = sqlx::query_as::<_, Partner>(&format!(
            "SELECT {PARTNER_COLUMNS} FROM partners WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Partner not found".to_string()))?;
        Ok(partner)
    }

    pub async fn get_by_user_id(&self, user_id: Uuid) -> Result<Partner> {
        let partner = sqlx::query_as::<_, Partner>(&format!(
            "SELECT {PARTNER_COLUMNS} FROM partners WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Partner profile not found".to_string()))?;
        Ok(partner)
    }

    async fn set_status(&self, id: Uuid, status: PartnerStatus) -> Result<Partner> {
        let partner = sqlx::query_as::<_, Partner>(&format!(
            "UPDATE partners SET status = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {PARTNER_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        Ok(partner)
    }
}
