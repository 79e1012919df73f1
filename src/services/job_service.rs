use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::job_dto::{CreateJobPayload, UpdateJobPayload};
use crate::error::{is_foreign_key_violation, Error, Result};
use crate::models::job::{Job, JobStatus};

const JOB_COLUMNS: &str = "id, jr_code, title, description, company_name, department, location, \
     min_experience, max_experience, salary_min, salary_max, openings, skills, education, \
     status, request_date, closure_date, applications_count, created_by_id, created_at, \
     updated_at";

#[derive(Clone)]
pub struct JobService {
    pool: PgPool,
}

impl JobService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateJobPayload, created_by: Uuid) -> Result<Job> {
        let status = JobStatus::normalize(payload.status.as_deref());

        let job = sqlx::query_as::<_, Job>(&format!(
            r#"
            INSERT INTO jobs (
                jr_code, title, description, company_name, department, location,
                min_experience, max_experience, salary_min, salary_max, openings,
                skills, education, status, request_date, closure_date, created_by_id
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17
            )
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(&payload.jr_code)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(&payload.company_name)
        .bind(&payload.department)
        .bind(&payload.location)
        .bind(payload.min_experience)
        .bind(payload.max_experience)
        .bind(payload.salary_min)
        .bind(payload.salary_max)
        .bind(payload.openings.unwrap_or(1))
        .bind(&payload.skills)
        .bind(&payload.education)
        .bind(status)
        .bind(payload.request_date)
        .bind(payload.closure_date)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(job)
    }

    pub async fn list(&self) -> Result<Vec<Job>> {
        let jobs = sqlx::query_as::<_, Job>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Job> {
        let job = sqlx::query_as::<_, Job>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Job not found".to_string()))?;
        Ok(job)
    }

    pub async fn update(&self, id: Uuid, payload: UpdateJobPayload) -> Result<Job> {
        self.get_by_id(id).await?;

        let status = payload
            .status
            .as_deref()
            .map(|raw| JobStatus::normalize(Some(raw)));

        let job = sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs SET
                jr_code = COALESCE($2, jr_code),
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                company_name = COALESCE($5, company_name),
                department = COALESCE($6, department),
                location = COALESCE($7, location),
                min_experience = COALESCE($8, min_experience),
                max_experience = COALESCE($9, max_experience),
                salary_min = COALESCE($10, salary_min),
                salary_max = COALESCE($11, salary_max),
                openings = COALESCE($12, openings),
                skills = COALESCE($13, skills),
                education = COALESCE($14, education),
                status = COALESCE($15, status),
                request_date = COALESCE($16, request_date),
                closure_date = COALESCE($17, closure_date),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&payload.jr_code)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(&payload.company_name)
        .bind(&payload.department)
        .bind(&payload.location)
        .bind(payload.min_experience)
        .bind(payload.max_experience)
        .bind(payload.salary_min)
        .bind(payload.salary_max)
        .bind(payload.openings)
        .bind(&payload.skills)
        .bind(&payload.education)
        .bind(status)
        .bind(payload.request_date)
        .bind(payload.closure_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(job)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.get_by_id(id).await?;

        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_foreign_key_violation(&err) => Err(Error::Conflict(
                "Job has applications and cannot be deleted".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    /// Idempotent repair path for the denormalized counter: recomputes
    /// every job's applications_count from the applications table.
    pub async fn reconcile_application_counts(&self) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE jobs j SET applications_count = \
                 (SELECT COUNT(*) FROM applications a WHERE a.job_id = j.id), \
                 updated_at = NOW()",
        )
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
