use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Global candidate record, unique on (email, phone). Owned by whichever
/// actor first created it; enriched fill-only on later submissions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Candidate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub current_location: Option<String>,
    pub preferred_locations: Option<String>,
    pub hometown: Option<String>,
    pub pincode: Option<String>,
    pub total_experience: Option<Decimal>,
    pub current_company: Option<String>,
    pub current_designation: Option<String>,
    pub department: Option<String>,
    pub industry: Option<String>,
    pub skills: Option<String>,
    pub current_salary: Option<Decimal>,
    pub expected_salary: Option<Decimal>,
    pub notice_period_days: Option<i32>,
    pub highest_qualification: Option<String>,
    pub specialization: Option<String>,
    pub university: Option<String>,
    pub graduation_year: Option<i32>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub marital_status: Option<String>,
    pub created_by_user_id: Option<Uuid>,
    pub created_by_partner_id: Option<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
