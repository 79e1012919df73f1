use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::application_dto::CandidateSubmission;
use crate::error::{is_unique_violation, Error, Result};
use crate::middleware::auth::ActorContext;
use crate::models::candidate::Candidate;
use crate::models::user::Role;

const CANDIDATE_COLUMNS: &str = "id, name, email, phone, current_location, preferred_locations, \
     hometown, pincode, total_experience, current_company, current_designation, department, \
     industry, skills, current_salary, expected_salary, notice_period_days, \
     highest_qualification, specialization, university, graduation_year, date_of_birth, \
     gender, marital_status, created_by_user_id, created_by_partner_id, created_at, updated_at";

#[derive(Clone)]
pub struct CandidateService {
    pool: PgPool,
}

impl CandidateService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolves a submission to the single canonical candidate keyed by
    /// (email, phone): creates the record on first sight, otherwise
    /// enriches the existing one fill-only. A concurrent first submission
    /// losing the insert race falls back onto the merge path.
    pub async fn resolve(
        &self,
        submission: &CandidateSubmission,
        actor: &ActorContext,
    ) -> Result<Candidate> {
        if let Some(existing) = self
            .find_by_identity(&submission.email, &submission.phone)
            .await?
        {
            return self.enrich(existing, submission).await;
        }

        match self.insert(submission, actor).await {
            Ok(candidate) => Ok(candidate),
            Err(Error::Database(err)) if is_unique_violation(&err) => {
                let existing = self
                    .find_by_identity(&submission.email, &submission.phone)
                    .await?
                    .ok_or_else(|| {
                        Error::Internal("candidate vanished after unique conflict".to_string())
                    })?;
                self.enrich(existing, submission).await
            }
            Err(err) => Err(err),
        }
    }

    pub async fn find_by_identity(&self, email: &str, phone: &str) -> Result<Option<Candidate>> {
        let candidate = sqlx::query_as::<_, Candidate>(&format!(
            "SELECT {CANDIDATE_COLUMNS} FROM candidates WHERE email = $1 AND phone = $2"
        ))
        .bind(email)
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;
        Ok(candidate)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Candidate>> {
        let candidate = sqlx::query_as::<_, Candidate>(&format!(
            "SELECT {CANDIDATE_COLUMNS} FROM candidates WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(candidate)
    }

    async fn insert(
        &self,
        submission: &CandidateSubmission,
        actor: &ActorContext,
    ) -> Result<Candidate> {
        let (created_by_user_id, created_by_partner_id) = ownership(actor)?;

        let candidate = sqlx::query_as::<_, Candidate>(&format!(
            r#"
            INSERT INTO candidates (
                name, email, phone, current_location, preferred_locations, hometown, pincode,
                total_experience, current_company, current_designation, department, industry,
                skills, current_salary, expected_salary, notice_period_days,
                highest_qualification, specialization, university, graduation_year,
                date_of_birth, gender, marital_status, created_by_user_id, created_by_partner_id
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19, $20, $21, $22, $23, $24, $25
            )
            RETURNING {CANDIDATE_COLUMNS}
            "#
        ))
        .bind(&submission.name)
        .bind(&submission.email)
        .bind(&submission.phone)
        .bind(&submission.current_location)
        .bind(&submission.preferred_locations)
        .bind(&submission.hometown)
        .bind(&submission.pincode)
        .bind(submission.total_experience)
        .bind(&submission.current_company)
        .bind(&submission.current_designation)
        .bind(&submission.department)
        .bind(&submission.industry)
        .bind(&submission.skills)
        .bind(submission.current_salary)
        .bind(submission.expected_salary)
        .bind(submission.notice_period_days)
        .bind(&submission.highest_qualification)
        .bind(&submission.specialization)
        .bind(&submission.university)
        .bind(submission.graduation_year)
        .bind(submission.date_of_birth)
        .bind(&submission.gender)
        .bind(&submission.marital_status)
        .bind(created_by_user_id)
        .bind(created_by_partner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(candidate)
    }

    /// Persists the fill-only merge of `submission` into `existing`.
    async fn enrich(
        &self,
        mut existing: Candidate,
        submission: &CandidateSubmission,
    ) -> Result<Candidate> {
        submission.fill_missing(&mut existing);

        let candidate = sqlx::query_as::<_, Candidate>(&format!(
            r#"
            UPDATE candidates SET
                current_location = $2,
                preferred_locations = $3,
                hometown = $4,
                pincode = $5,
                total_experience = $6,
                current_company = $7,
                current_designation = $8,
                department = $9,
                industry = $10,
                skills = $11,
                current_salary = $12,
                expected_salary = $13,
                notice_period_days = $14,
                highest_qualification = $15,
                specialization = $16,
                university = $17,
                graduation_year = $18,
                date_of_birth = $19,
                gender = $20,
                marital_status = $21,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CANDIDATE_COLUMNS}
            "#
        ))
        .bind(existing.id)
        .bind(&existing.current_location)
        .bind(&existing.preferred_locations)
        .bind(&existing.hometown)
        .bind(&existing.pincode)
        .bind(existing.total_experience)
        .bind(&existing.current_company)
        .bind(&existing.current_designation)
        .bind(&existing.department)
        .bind(&existing.industry)
        .bind(&existing.skills)
        .bind(existing.current_salary)
        .bind(existing.expected_salary)
        .bind(existing.notice_period_days)
        .bind(&existing.highest_qualification)
        .bind(&existing.specialization)
        .bind(&existing.university)
        .bind(existing.graduation_year)
        .bind(existing.date_of_birth)
        .bind(&existing.gender)
        .bind(&existing.marital_status)
        .fetch_one(&self.pool)
        .await?;

        Ok(candidate)
    }
}

/// Ownership attribution: partners own through their organisation profile,
/// everyone else through their user account.
fn ownership(actor: &ActorContext) -> Result<(Option<Uuid>, Option<Uuid>)> {
    match actor.role {
        Role::Partner => {
            let partner_id = actor.partner_id.ok_or_else(|| {
                Error::Forbidden("partner profile required to submit candidates".to_string())
            })?;
            Ok((None, Some(partner_id)))
        }
        _ => Ok((Some(actor.user_id), None)),
    }
}
