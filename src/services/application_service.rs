use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::application_dto::{ApplicationFilters, ApplicationListItem, ApplyPayload};
use crate::error::{is_unique_violation, Error, Result};
use crate::middleware::auth::ActorContext;
use crate::models::application::{Application, FinalStatus, PipelineStage};
use crate::models::job::JobStatus;
use crate::models::user::Role;
use crate::services::candidate_service::CandidateService;
use crate::utils::time;

pub const APPLICATION_COLUMNS: &str = "id, job_id, candidate_id, applied_by_user_id, \
     applied_by_partner_id, pipeline_stage, final_status, source, contacted_at, \
     interview_scheduled_at, interview_completed_at, offer_sent_at, offer_accepted_at, \
     offer_rejected_at, hired_at, rejected_at, created_at, updated_at";

pub(crate) const LIST_ITEM_SELECT: &str = "SELECT a.id, a.job_id, j.title AS job_title, a.candidate_id, \
     c.name AS candidate_name, c.email AS candidate_email, a.pipeline_stage, a.final_status, \
     a.source, a.created_at \
     FROM applications a \
     JOIN jobs j ON j.id = a.job_id \
     JOIN candidates c ON c.id = a.candidate_id";

#[derive(Clone)]
pub struct ApplicationService {
    pool: PgPool,
    candidates: CandidateService,
}

impl ApplicationService {
    pub fn new(pool: PgPool, candidates: CandidateService) -> Self {
        Self { pool, candidates }
    }

    /// Submits a candidate against an open job. Candidate resolution is
    /// fill-only (see CandidateService); the application insert and the
    /// job counter increment commit atomically, and the schema-level
    /// UNIQUE(candidate_id, job_id) backstops the duplicate pre-check.
    pub async fn apply_to_job(
        &self,
        payload: &ApplyPayload,
        actor: &ActorContext,
    ) -> Result<Application> {
        let job = sqlx::query_as::<_, (Uuid, JobStatus)>("SELECT id, status FROM jobs WHERE id = $1")
            .bind(payload.job_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found".to_string()))?;

        if job.1 != JobStatus::Open {
            return Err(Error::InvalidState(
                "Job is not open for applications".to_string(),
            ));
        }

        let candidate = self.candidates.resolve(&payload.candidate, actor).await?;

        let duplicate = sqlx::query_as::<_, (Uuid,)>(
            "SELECT id FROM applications WHERE candidate_id = $1 AND job_id = $2",
        )
        .bind(candidate.id)
        .bind(payload.job_id)
        .fetch_optional(&self.pool)
        .await?;
        if duplicate.is_some() {
            return Err(Error::Conflict(
                "Candidate already applied to this job".to_string(),
            ));
        }

        let source = derive_source(actor.role, payload.source.as_deref());
        let (applied_by_user_id, applied_by_partner_id) = attribution(actor)?;

        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, Application>(&format!(
            r#"
            INSERT INTO applications (
                job_id, candidate_id, applied_by_user_id, applied_by_partner_id, source
            ) VALUES ($1, $2, $3, $4, $5)
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(payload.job_id)
        .bind(candidate.id)
        .bind(applied_by_user_id)
        .bind(applied_by_partner_id)
        .bind(&source)
        .fetch_one(&mut *tx)
        .await;

        let application = match inserted {
            Ok(application) => application,
            // Lost the race against a concurrent duplicate submission;
            // the transaction rolls back, so the counter never moved.
            Err(err) if is_unique_violation(&err) => {
                return Err(Error::Conflict(
                    "Candidate already applied to this job".to_string(),
                ))
            }
            Err(err) => return Err(err.into()),
        };

        sqlx::query(
            "UPDATE jobs SET applications_count = applications_count + 1, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(payload.job_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(application)
    }

    /// Moves an application to a new pipeline stage, stamping the stage's
    /// milestone timestamp on first entry only. Job status is not
    /// re-validated; a pipeline may keep moving after its job closes.
    pub async fn advance_stage(&self, application_id: Uuid, stage: &str) -> Result<Application> {
        let stage = PipelineStage::parse(stage)
            .ok_or_else(|| Error::Validation("Invalid pipeline stage".to_string()))?;

        let mut application = self
            .get_by_id(application_id)
            .await?
            .ok_or_else(|| Error::NotFound("Application not found".to_string()))?;

        application.advance_to(stage, time::now());

        let updated = sqlx::query_as::<_, Application>(&format!(
            r#"
            UPDATE applications SET
                pipeline_stage = $2,
                final_status = $3,
                contacted_at = $4,
                interview_scheduled_at = $5,
                interview_completed_at = $6,
                offer_sent_at = $7,
                offer_accepted_at = $8,
                offer_rejected_at = $9,
                hired_at = $10,
                rejected_at = $11,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(application.id)
        .bind(application.pipeline_stage)
        .bind(application.final_status)
        .bind(application.contacted_at)
        .bind(application.interview_scheduled_at)
        .bind(application.interview_completed_at)
        .bind(application.offer_sent_at)
        .bind(application.offer_accepted_at)
        .bind(application.offer_rejected_at)
        .bind(application.hired_at)
        .bind(application.rejected_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Candidate-initiated withdrawal: settles `final_status` without
    /// moving the pipeline stage. Only the submitting actor (or an admin)
    /// may withdraw, and only while the application is still active.
    pub async fn withdraw(&self, application_id: Uuid, actor: &ActorContext) -> Result<Application> {
        let application = self
            .get_by_id(application_id)
            .await?
            .ok_or_else(|| Error::NotFound("Application not found".to_string()))?;

        let owned = match actor.role {
            Role::Admin => true,
            Role::Partner => application.applied_by_partner_id == actor.partner_id,
            _ => application.applied_by_user_id == Some(actor.user_id),
        };
        if !owned {
            return Err(Error::Forbidden(
                "Only the submitting actor may withdraw an application".to_string(),
            ));
        }

        if application.final_status.is_some() {
            return Err(Error::InvalidState(
                "Application is already finalized".to_string(),
            ));
        }

        let updated = sqlx::query_as::<_, Application>(&format!(
            "UPDATE applications SET final_status = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {APPLICATION_COLUMNS}"
        ))
        .bind(application.id)
        .bind(FinalStatus::Withdrawn)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Application>> {
        let application = sqlx::query_as::<_, Application>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(application)
    }

    /// Applications submitted by the calling actor, newest first.
    pub async fn list_for(
        &self,
        actor: &ActorContext,
        filters: &ApplicationFilters,
    ) -> Result<Vec<ApplicationListItem>> {
        let stage = parse_stage_filter(filters)?;
        let (partner_id, user_id) = match actor.role {
            Role::Partner => (actor.partner_id, None),
            _ => (None, Some(actor.user_id)),
        };

        let items = sqlx::query_as::<_, ApplicationListItem>(&format!(
            "{LIST_ITEM_SELECT} \
             WHERE ($1::uuid IS NULL OR a.applied_by_partner_id = $1) \
               AND ($2::uuid IS NULL OR a.applied_by_user_id = $2) \
               AND ($3::pipeline_stage IS NULL OR a.pipeline_stage = $3) \
               AND ($4::uuid IS NULL OR a.job_id = $4) \
             ORDER BY a.created_at DESC"
        ))
        .bind(partner_id)
        .bind(user_id)
        .bind(stage)
        .bind(filters.job_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Every application in the system, newest first (admin view).
    pub async fn list_all(&self, filters: &ApplicationFilters) -> Result<Vec<ApplicationListItem>> {
        let stage = parse_stage_filter(filters)?;

        let items = sqlx::query_as::<_, ApplicationListItem>(&format!(
            "{LIST_ITEM_SELECT} \
             WHERE ($1::pipeline_stage IS NULL OR a.pipeline_stage = $1) \
               AND ($2::uuid IS NULL OR a.job_id = $2) \
             ORDER BY a.created_at DESC"
        ))
        .bind(stage)
        .bind(filters.job_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}

fn parse_stage_filter(filters: &ApplicationFilters) -> Result<Option<PipelineStage>> {
    filters
        .stage
        .as_deref()
        .map(|raw| {
            PipelineStage::parse(raw)
                .ok_or_else(|| Error::Validation("Invalid pipeline stage".to_string()))
        })
        .transpose()
}

/// Channel tag for an application: an explicit tag wins, otherwise the
/// submitting actor's role.
pub fn derive_source(role: Role, explicit: Option<&str>) -> String {
    if let Some(tag) = explicit {
        let tag = tag.trim();
        if !tag.is_empty() {
            return tag.to_uppercase();
        }
    }
    match role {
        Role::Partner => "PARTNER",
        Role::Recruiter => "RECRUITER",
        _ => "USER",
    }
    .to_string()
}

/// Exactly one attribution id: the partner organisation for partner
/// submissions, the user account for everyone else.
fn attribution(actor: &ActorContext) -> Result<(Option<Uuid>, Option<Uuid>)> {
    match actor.role {
        Role::Partner => {
            let partner_id = actor.partner_id.ok_or_else(|| {
                Error::Forbidden("partner profile required to apply".to_string())
            })?;
            Ok((None, Some(partner_id)))
        }
        _ => Ok((Some(actor.user_id), None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_defaults_to_role() {
        assert_eq!(derive_source(Role::Partner, None), "PARTNER");
        assert_eq!(derive_source(Role::Recruiter, None), "RECRUITER");
        assert_eq!(derive_source(Role::User, None), "USER");
    }

    #[test]
    fn explicit_channel_tag_wins() {
        assert_eq!(derive_source(Role::User, Some("LinkedIn")), "LINKEDIN");
        assert_eq!(derive_source(Role::Partner, Some(" referral ")), "REFERRAL");
        // blank tags fall back to the role
        assert_eq!(derive_source(Role::Recruiter, Some("  ")), "RECRUITER");
    }

    #[test]
    fn attribution_is_mutually_exclusive() {
        let partner = ActorContext {
            user_id: Uuid::new_v4(),
            role: Role::Partner,
            partner_id: Some(Uuid::new_v4()),
        };
        let (user_id, partner_id) = attribution(&partner).unwrap();
        assert!(user_id.is_none());
        assert_eq!(partner_id, partner.partner_id);

        let user = ActorContext {
            user_id: Uuid::new_v4(),
            role: Role::User,
            partner_id: None,
        };
        let (user_id, partner_id) = attribution(&user).unwrap();
        assert_eq!(user_id, Some(user.user_id));
        assert!(partner_id.is_none());
    }

    #[test]
    fn partner_without_profile_cannot_apply() {
        let actor = ActorContext {
            user_id: Uuid::new_v4(),
            role: Role::Partner,
            partner_id: None,
        };
        assert!(attribution(&actor).is_err());
    }
}
