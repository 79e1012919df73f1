use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "job_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Open,
    Closed,
    OnHold,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Open => "OPEN",
            JobStatus::Closed => "CLOSED",
            JobStatus::OnHold => "ON_HOLD",
            JobStatus::Cancelled => "CANCELLED",
        }
    }

    /// Lenient mapping for imported/free-form status values; anything
    /// unrecognized falls back to OPEN.
    pub fn normalize(value: Option<&str>) -> JobStatus {
        match value.map(|v| v.trim().to_uppercase()).as_deref() {
            Some("CLOSED") => JobStatus::Closed,
            Some("ON_HOLD") => JobStatus::OnHold,
            Some("CANCELLED") => JobStatus::Cancelled,
            _ => JobStatus::Open,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub jr_code: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub company_name: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub min_experience: Option<i32>,
    pub max_experience: Option<i32>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub openings: i32,
    pub skills: Option<String>,
    pub education: Option<String>,
    pub status: JobStatus,
    pub request_date: Option<NaiveDate>,
    pub closure_date: Option<NaiveDate>,
    // Denormalized; kept in step with the applications table inside the
    // application-creation transaction, repairable via reconcile.
    pub applications_count: i64,
    pub created_by_id: Option<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_recognizes_known_statuses() {
        assert_eq!(JobStatus::normalize(Some("closed")), JobStatus::Closed);
        assert_eq!(JobStatus::normalize(Some(" ON_HOLD ")), JobStatus::OnHold);
        assert_eq!(JobStatus::normalize(Some("CANCELLED")), JobStatus::Cancelled);
    }

    #[test]
    fn normalize_defaults_to_open() {
        assert_eq!(JobStatus::normalize(None), JobStatus::Open);
        assert_eq!(JobStatus::normalize(Some("archived")), JobStatus::Open);
        assert_eq!(JobStatus::normalize(Some("")), JobStatus::Open);
    }
}
