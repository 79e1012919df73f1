use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::application::{FinalStatus, PipelineStage};
use crate::models::candidate::Candidate;

/// Candidate profile as submitted with an application. Name, email and
/// phone are mandatory; everything else enriches the global record.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CandidateSubmission {
    #[validate(length(min = 1, message = "candidate name is required"))]
    pub name: String,
    #[validate(email(message = "candidate email is invalid"))]
    pub email: String,
    #[validate(length(min = 1, message = "candidate phone is required"))]
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
}

impl CandidateSubmission {
    /// Fill-only merge: existing non-null values win, the submission only
    /// lands in slots that are still empty. Identity fields (name, email,
    /// phone) are never touched.
    pub fn fill_missing(&self, existing: &mut Candidate) {
        fill(&mut existing.current_location, &self.current_location);
        fill(&mut existing.preferred_locations, &self.preferred_locations);
        fill(&mut existing.hometown, &self.hometown);
        fill(&mut existing.pincode, &self.pincode);
        fill(&mut existing.total_experience, &self.total_experience);
        fill(&mut existing.current_company, &self.current_company);
        fill(&mut existing.current_designation, &self.current_designation);
        fill(&mut existing.department, &self.department);
        fill(&mut existing.industry, &self.industry);
        fill(&mut existing.skills, &self.skills);
        fill(&mut existing.current_salary, &self.current_salary);
        fill(&mut existing.expected_salary, &self.expected_salary);
        fill(&mut existing.notice_period_days, &self.notice_period_days);
        fill(
            &mut existing.highest_qualification,
            &self.highest_qualification,
        );
        fill(&mut existing.specialization, &self.specialization);
        fill(&mut existing.university, &self.university);
        fill(&mut existing.graduation_year, &self.graduation_year);
        fill(&mut existing.date_of_birth, &self.date_of_birth);
        fill(&mut existing.gender, &self.gender);
        fill(&mut existing.marital_status, &self.marital_status);
    }
}

fn fill<T: Clone>(slot: &mut Option<T>, incoming: &Option<T>) {
    if slot.is_none() {
        *slot = incoming.clone();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApplyPayload {
    pub job_id: Uuid,
    #[validate(nested)]
    pub candidate: CandidateSubmission,
    /// Explicit channel tag (e.g. "LINKEDIN", "REFERRAL"); defaults to the
    /// submitting actor's role.
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceStagePayload {
    pub pipeline_stage: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationFilters {
    pub stage: Option<String>,
    pub job_id: Option<Uuid>,
}

/// List row joined through job and candidate for listings and the
/// recruiter dashboard's recent-applications panel.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationListItem {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub candidate_id: Uuid,
    pub candidate_name: String,
    pub candidate_email: String,
    pub pipeline_stage: PipelineStage,
    pub final_status: Option<FinalStatus>,
    pub source: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn existing_candidate() -> Candidate {
        Candidate {
            id: Uuid::new_v4(),
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9000000001".to_string(),
            current_location: Some("Pune".to_string()),
            preferred_locations: None,
            hometown: None,
            pincode: None,
            total_experience: Some(Decimal::new(45, 1)),
            current_company: None,
            current_designation: None,
            department: None,
            industry: None,
            skills: None,
            current_salary: None,
            expected_salary: None,
            notice_period_days: None,
            highest_qualification: None,
            specialization: None,
            university: None,
            graduation_year: None,
            date_of_birth: None,
            gender: None,
            marital_status: None,
            created_by_user_id: None,
            created_by_partner_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn submission() -> CandidateSubmission {
        CandidateSubmission {
            name: "Asha R".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9000000001".to_string(),
            current_location: Some("Mumbai".to_string()),
            preferred_locations: Some("Remote".to_string()),
            hometown: None,
            pincode: None,
            total_experience: Some(Decimal::new(60, 1)),
            current_company: Some("Acme".to_string()),
            current_designation: None,
            department: None,
            industry: None,
            skills: Some("Rust, SQL".to_string()),
            current_salary: None,
            expected_salary: None,
            notice_period_days: Some(30),
            highest_qualification: None,
            specialization: None,
            university: None,
            graduation_year: None,
            date_of_birth: None,
            gender: None,
            marital_status: None,
        }
    }

    #[test]
    fn merge_only_fills_empty_slots() {
        let mut candidate = existing_candidate();
        submission().fill_missing(&mut candidate);

        // populated fields keep their original values
        assert_eq!(candidate.current_location.as_deref(), Some("Pune"));
        assert_eq!(candidate.total_experience, Some(Decimal::new(45, 1)));
        // empty slots take the submitted values
        assert_eq!(candidate.preferred_locations.as_deref(), Some("Remote"));
        assert_eq!(candidate.current_company.as_deref(), Some("Acme"));
        assert_eq!(candidate.notice_period_days, Some(30));
    }

    #[test]
    fn merge_never_touches_identity_fields() {
        let mut candidate = existing_candidate();
        submission().fill_missing(&mut candidate);
        assert_eq!(candidate.name, "Asha Rao");
        assert_eq!(candidate.email, "asha@example.com");
        assert_eq!(candidate.phone, "9000000001");
    }

    #[test]
    fn merge_is_idempotent() {
        let mut once = existing_candidate();
        submission().fill_missing(&mut once);
        let mut twice = once.clone();
        submission().fill_missing(&mut twice);
        assert_eq!(
            serde_json::to_value(&once).unwrap(),
            serde_json::to_value(&twice).unwrap()
        );
    }

    #[test]
    fn submission_requires_identity_fields() {
        let mut payload = submission();
        payload.name = String::new();
        assert!(payload.validate().is_err());

        let mut payload = submission();
        payload.email = "not-an-email".to_string();
        assert!(payload.validate().is_err());

        let mut payload = submission();
        payload.phone = String::new();
        assert!(payload.validate().is_err());
    }
}
