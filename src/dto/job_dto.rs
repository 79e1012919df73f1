use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateJobPayload {
    pub jr_code: Option<String>,
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    pub description: Option<String>,
    pub company_name: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub min_experience: Option<i32>,
    pub max_experience: Option<i32>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub openings: Option<i32>,
    pub skills: Option<String>,
    pub education: Option<String>,
    /// Free-form; normalized to the closed status set, defaulting to OPEN.
    pub status: Option<String>,
    pub request_date: Option<NaiveDate>,
    pub closure_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateJobPayload {
    pub jr_code: Option<String>,
    #[validate(length(min = 1))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub company_name: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub min_experience: Option<i32>,
    pub max_experience: Option<i32>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub openings: Option<i32>,
    pub skills: Option<String>,
    pub education: Option<String>,
    pub status: Option<String>,
    pub request_date: Option<NaiveDate>,
    pub closure_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileResponse {
    pub jobs_updated: u64,
}
