use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::partner::PartnerStatus;

/// Pending approval request joined with the owning user account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PendingPartnerItem {
    pub id: Uuid,
    pub organisation_name: String,
    pub status: PartnerStatus,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub created_at: Option<DateTime<Utc>>,
}
