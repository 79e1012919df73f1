use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::dto::application_dto::ApplicationListItem;
use crate::dto::dashboard_dto::{
    AdminDashboard, AdminSummary, AdminTrends, Conversion, DepartmentCount, Distribution,
    HireRate, JobLeader, Leaderboards, PartnerDashboard, PartnerLeader, PartnerSummary,
    PartnerTrends, PipelineBreakdown, Range, RecruiterDashboard, RecruiterLeader,
    RecruiterSummary, SourceBreakdown, SummaryChange, TopJobs, TrendPoint, UserDashboard,
    UserSummary, UserTrends,
};
use crate::error::Result;
use crate::models::application::PipelineStage;
use crate::services::application_service::LIST_ITEM_SELECT;
use crate::utils::stats::{fill_missing_dates, percent_change, rate};
use crate::utils::time::{self, window_start};

/// Attribution filter threaded through every aggregate query, so the same
/// query set serves the admin, partner, user and recruiter reports.
#[derive(Debug, Clone, Copy)]
pub enum Scope {
    Global,
    Partner(Uuid),
    User(Uuid),
}

impl Scope {
    fn partner_id(&self) -> Option<Uuid> {
        match self {
            Scope::Partner(id) => Some(*id),
            _ => None,
        }
    }

    fn user_id(&self) -> Option<Uuid> {
        match self {
            Scope::User(id) => Some(*id),
            _ => None,
        }
    }
}

const SCOPE_FILTER: &str = "($1::uuid IS NULL OR applied_by_partner_id = $1) \
     AND ($2::uuid IS NULL OR applied_by_user_id = $2)";

#[derive(Clone)]
pub struct DashboardService {
    pool: PgPool,
}

impl DashboardService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn admin_dashboard(&self, range: Range) -> Result<AdminDashboard> {
        let days = range.days();
        let start = window_start(time::now(), days);
        let end = start + Duration::days(days);
        let prev_start = start - Duration::days(days);

        let (summary, previous) = tokio::try_join!(
            self.window_summary(start, end),
            self.window_summary(prev_start, start),
        )?;

        let summary_change = SummaryChange {
            partners: percent_change(summary.total_partners, previous.total_partners),
            jobs: percent_change(summary.total_jobs, previous.total_jobs),
            applications: percent_change(summary.total_applications, previous.total_applications),
            hired: percent_change(summary.hired, previous.hired),
            rejected: percent_change(summary.rejected, previous.rejected),
            recruiters: percent_change(summary.recruiters, previous.recruiters),
        };

        let (pipeline, applications, hires, jobs_created) = tokio::try_join!(
            self.pipeline_breakdown(Scope::Global),
            self.applications_trend(Scope::Global, start, days),
            self.hires_trend(Scope::Global, start, days),
            self.jobs_trend(start, days),
        )?;

        let (applications_by_source, applications_by_department, top_jobs) = tokio::try_join!(
            self.source_breakdown(),
            self.department_distribution(),
            self.top_jobs_by_counter(),
        )?;

        let (top_partners, top_recruiters) =
            tokio::try_join!(self.top_partners(), self.top_recruiters())?;

        let conversion = conversion_from(&pipeline);

        Ok(AdminDashboard {
            range,
            summary,
            summary_change,
            pipeline,
            trends: AdminTrends {
                applications,
                hires,
                jobs_created,
            },
            distribution: Distribution {
                applications_by_source,
                applications_by_department,
                applications_by_job: top_jobs.clone(),
            },
            leaderboards: Leaderboards {
                top_partners,
                top_recruiters,
                top_jobs,
            },
            conversion,
        })
    }

    pub async fn partner_dashboard(&self, partner_id: Uuid, range: Range) -> Result<PartnerDashboard> {
        let scope = Scope::Partner(partner_id);
        let days = range.days();
        let start = window_start(time::now(), days);

        let (candidates, counts, pipeline) = tokio::try_join!(
            self.candidates_created_by_partner(partner_id),
            self.outcome_counts(scope),
            self.pipeline_breakdown(scope),
        )?;

        let (applications, hires, top_jobs) = tokio::try_join!(
            self.applications_trend(scope, start, days),
            self.hires_trend(scope, start, days),
            self.top_jobs_by_volume(scope),
        )?;

        Ok(PartnerDashboard {
            range,
            summary: PartnerSummary {
                total_candidates: candidates,
                total_applications: counts.total,
                active_applications: counts.active,
                hired: counts.hired,
                rejected: counts.rejected,
            },
            pipeline,
            trends: PartnerTrends { applications, hires },
            leaderboards: TopJobs { top_jobs },
            conversion: HireRate {
                application_to_hire_rate: rate(counts.hired, counts.total),
            },
        })
    }

    pub async fn user_dashboard(&self, user_id: Uuid, range: Range) -> Result<UserDashboard> {
        let scope = Scope::User(user_id);
        let days = range.days();
        let start = window_start(time::now(), days);

        let (counts, pipeline, applications, top_jobs) = tokio::try_join!(
            self.outcome_counts(scope),
            self.pipeline_breakdown(scope),
            self.applications_trend(scope, start, days),
            self.top_jobs_by_volume(scope),
        )?;

        Ok(UserDashboard {
            range,
            summary: UserSummary {
                total_applications: counts.total,
                active_applications: counts.active,
                hired: counts.hired,
                rejected: counts.rejected,
            },
            pipeline,
            trends: UserTrends { applications },
            leaderboards: TopJobs { top_jobs },
            conversion: HireRate {
                application_to_hire_rate: rate(counts.hired, counts.total),
            },
        })
    }

    pub async fn recruiter_dashboard(
        &self,
        recruiter_id: Uuid,
        range: Range,
    ) -> Result<RecruiterDashboard> {
        let scope = Scope::User(recruiter_id);
        let days = range.days();
        let start = window_start(time::now(), days);

        let (counts, candidates_added, jobs_worked_on, pipeline) = tokio::try_join!(
            self.outcome_counts(scope),
            self.candidates_created_by_user(recruiter_id),
            self.distinct_jobs_touched(recruiter_id),
            self.pipeline_breakdown(scope),
        )?;

        let (applications, recent_applications) = tokio::try_join!(
            self.applications_trend(scope, start, days),
            self.recent_applications(recruiter_id),
        )?;

        Ok(RecruiterDashboard {
            range,
            summary: RecruiterSummary {
                total_candidates_added: candidates_added,
                active_jobs_worked_on: jobs_worked_on,
                hire_rate: rate(counts.hired, counts.total),
                total_applications: counts.total,
                active: counts.active,
                hired: counts.hired,
                rejected: counts.rejected,
            },
            pipeline,
            trends: UserTrends { applications },
            recent_applications,
        })
    }

    /// Window-scoped admin summary; `[start, end)` so that current and
    /// preceding windows compare like for like.
    async fn window_summary(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<AdminSummary> {
        let partners = sqlx::query_as::<_, (i64, i64, i64, i64)>(
            "SELECT COUNT(*), \
                    COUNT(*) FILTER (WHERE status = 'PENDING'), \
                    COUNT(*) FILTER (WHERE status = 'APPROVED'), \
                    COUNT(*) FILTER (WHERE status = 'REJECTED') \
             FROM partners WHERE created_at >= $1 AND created_at < $2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool);

        let jobs = sqlx::query_as::<_, (i64, i64, i64, i64, i64)>(
            "SELECT COUNT(*), \
                    COUNT(*) FILTER (WHERE status = 'OPEN'), \
                    COUNT(*) FILTER (WHERE status = 'CLOSED'), \
                    COUNT(*) FILTER (WHERE status = 'ON_HOLD'), \
                    COUNT(*) FILTER (WHERE status = 'CANCELLED') \
             FROM jobs WHERE created_at >= $1 AND created_at < $2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool);

        let applications = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE final_status IS NULL) \
             FROM applications WHERE created_at >= $1 AND created_at < $2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool);

        // Outcomes are windowed on their own milestone timestamps, not on
        // when the application was created.
        let outcomes = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*) FILTER (WHERE hired_at >= $1 AND hired_at < $2), \
                    COUNT(*) FILTER (WHERE rejected_at >= $1 AND rejected_at < $2) \
             FROM applications",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool);

        let recruiters = sqlx::query_as::<_, (i64,)>(
            "SELECT COUNT(*) FROM users \
             WHERE role = 'RECRUITER' AND created_at >= $1 AND created_at < $2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool);

        let (partners, jobs, applications, outcomes, recruiters) =
            tokio::try_join!(partners, jobs, applications, outcomes, recruiters)?;

        Ok(AdminSummary {
            total_partners: partners.0,
            pending_partners: partners.1,
            approved_partners: partners.2,
            rejected_partners: partners.3,
            total_jobs: jobs.0,
            open_jobs: jobs.1,
            closed_jobs: jobs.2,
            on_hold_jobs: jobs.3,
            cancelled_jobs: jobs.4,
            total_applications: applications.0,
            active_applications: applications.1,
            hired: outcomes.0,
            rejected: outcomes.1,
            recruiters: recruiters.0,
        })
    }

    async fn pipeline_breakdown(&self, scope: Scope) -> Result<PipelineBreakdown> {
        let counts = sqlx::query_as::<_, (PipelineStage, i64)>(&format!(
            "SELECT pipeline_stage, COUNT(*) FROM applications \
             WHERE {SCOPE_FILTER} GROUP BY pipeline_stage"
        ))
        .bind(scope.partner_id())
        .bind(scope.user_id())
        .fetch_all(&self.pool)
        .await?;

        Ok(PipelineBreakdown::from_counts(counts))
    }

    async fn applications_trend(
        &self,
        scope: Scope,
        start: DateTime<Utc>,
        days: i64,
    ) -> Result<Vec<TrendPoint>> {
        let rows = sqlx::query_as::<_, (NaiveDate, i64)>(&format!(
            "SELECT created_at::date AS day, COUNT(*) FROM applications \
             WHERE {SCOPE_FILTER} AND created_at >= $3 \
             GROUP BY day ORDER BY day"
        ))
        .bind(scope.partner_id())
        .bind(scope.user_id())
        .bind(start)
        .fetch_all(&self.pool)
        .await?;

        Ok(fill_missing_dates(rows, start.date_naive(), days))
    }

    async fn hires_trend(
        &self,
        scope: Scope,
        start: DateTime<Utc>,
        days: i64,
    ) -> Result<Vec<TrendPoint>> {
        let rows = sqlx::query_as::<_, (NaiveDate, i64)>(&format!(
            "SELECT hired_at::date AS day, COUNT(*) FROM applications \
             WHERE {SCOPE_FILTER} AND hired_at IS NOT NULL AND hired_at >= $3 \
             GROUP BY day ORDER BY day"
        ))
        .bind(scope.partner_id())
        .bind(scope.user_id())
        .bind(start)
        .fetch_all(&self.pool)
        .await?;

        Ok(fill_missing_dates(rows, start.date_naive(), days))
    }

    async fn jobs_trend(&self, start: DateTime<Utc>, days: i64) -> Result<Vec<TrendPoint>> {
        let rows = sqlx::query_as::<_, (NaiveDate, i64)>(
            "SELECT created_at::date AS day, COUNT(*) FROM jobs \
             WHERE created_at >= $1 GROUP BY day ORDER BY day",
        )
        .bind(start)
        .fetch_all(&self.pool)
        .await?;

        Ok(fill_missing_dates(rows, start.date_naive(), days))
    }

    async fn source_breakdown(&self) -> Result<SourceBreakdown> {
        let (partner, recruiter, direct) = sqlx::query_as::<_, (i64, i64, i64)>(
            "SELECT COUNT(*) FILTER (WHERE a.applied_by_partner_id IS NOT NULL), \
                    COUNT(*) FILTER (WHERE u.role = 'RECRUITER'), \
                    COUNT(*) FILTER (WHERE u.role = 'USER') \
             FROM applications a \
             LEFT JOIN users u ON u.id = a.applied_by_user_id",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(SourceBreakdown {
            partner,
            recruiter,
            direct,
        })
    }

    async fn department_distribution(&self) -> Result<Vec<DepartmentCount>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT j.department, COUNT(a.id) FROM applications a \
             JOIN jobs j ON j.id = a.job_id \
             WHERE j.department IS NOT NULL \
             GROUP BY j.department ORDER BY COUNT(a.id) DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(department, applications)| DepartmentCount {
                department,
                applications,
            })
            .collect())
    }

    /// Global top jobs read off the denormalized counter.
    async fn top_jobs_by_counter(&self) -> Result<Vec<JobLeader>> {
        let rows = sqlx::query_as::<_, (Uuid, String, i64)>(
            "SELECT id, title, applications_count FROM jobs \
             ORDER BY applications_count DESC LIMIT 5",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(job_id, job_title, applications)| JobLeader {
                job_id,
                job_title,
                applications,
            })
            .collect())
    }

    /// Scoped top jobs counted from the actor's own applications.
    async fn top_jobs_by_volume(&self, scope: Scope) -> Result<Vec<JobLeader>> {
        let rows = sqlx::query_as::<_, (Uuid, i64)>(&format!(
            "SELECT job_id, COUNT(*) FROM applications \
             WHERE {SCOPE_FILTER} \
             GROUP BY job_id ORDER BY COUNT(*) DESC LIMIT 5"
        ))
        .bind(scope.partner_id())
        .bind(scope.user_id())
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|(id, _)| *id).collect();
        let titles = self
            .lookup_names("SELECT id, title FROM jobs WHERE id = ANY($1)", &ids)
            .await;

        Ok(rows
            .into_iter()
            .map(|(job_id, applications)| JobLeader {
                job_id,
                job_title: resolve_name(&titles, &job_id),
                applications,
            })
            .collect())
    }

    async fn top_partners(&self) -> Result<Vec<PartnerLeader>> {
        let rows = sqlx::query_as::<_, (Uuid, i64)>(
            "SELECT applied_by_partner_id, COUNT(*) FROM applications \
             WHERE applied_by_partner_id IS NOT NULL \
             GROUP BY applied_by_partner_id ORDER BY COUNT(*) DESC LIMIT 5",
        )
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|(id, _)| *id).collect();
        let names = self
            .lookup_names(
                "SELECT id, organisation_name FROM partners WHERE id = ANY($1)",
                &ids,
            )
            .await;

        Ok(rows
            .into_iter()
            .map(|(partner_id, applications)| PartnerLeader {
                partner_id,
                partner_name: resolve_name(&names, &partner_id),
                applications,
            })
            .collect())
    }

    async fn top_recruiters(&self) -> Result<Vec<RecruiterLeader>> {
        let rows = sqlx::query_as::<_, (Uuid, i64)>(
            "SELECT applied_by_user_id, COUNT(*) FROM applications \
             WHERE applied_by_user_id IS NOT NULL \
             GROUP BY applied_by_user_id ORDER BY COUNT(*) DESC LIMIT 5",
        )
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|(id, _)| *id).collect();
        let names = self
            .lookup_names("SELECT id, name FROM users WHERE id = ANY($1)", &ids)
            .await;

        Ok(rows
            .into_iter()
            .map(|(user_id, applications)| RecruiterLeader {
                user_id,
                user_name: resolve_name(&names, &user_id),
                applications,
            })
            .collect())
    }

    /// Leaderboard name enrichment is allowed to degrade: a failed lookup
    /// logs and falls back to "Unknown" rather than failing the report.
    async fn lookup_names(&self, query: &str, ids: &[Uuid]) -> HashMap<Uuid, String> {
        if ids.is_empty() {
            return HashMap::new();
        }
        match sqlx::query_as::<_, (Uuid, String)>(query)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
        {
            Ok(rows) => rows.into_iter().collect(),
            Err(err) => {
                warn!(error = ?err, "leaderboard name lookup failed");
                HashMap::new()
            }
        }
    }

    /// All-time outcome counts for a scope.
    async fn outcome_counts(&self, scope: Scope) -> Result<OutcomeCounts> {
        let (total, active, hired, rejected) = sqlx::query_as::<_, (i64, i64, i64, i64)>(&format!(
            "SELECT COUNT(*), \
                    COUNT(*) FILTER (WHERE final_status IS NULL), \
                    COUNT(*) FILTER (WHERE final_status = 'HIRED'), \
                    COUNT(*) FILTER (WHERE final_status = 'REJECTED') \
             FROM applications WHERE {SCOPE_FILTER}"
        ))
        .bind(scope.partner_id())
        .bind(scope.user_id())
        .fetch_one(&self.pool)
        .await?;

        Ok(OutcomeCounts {
            total,
            active,
            hired,
            rejected,
        })
    }

    async fn candidates_created_by_partner(&self, partner_id: Uuid) -> Result<i64> {
        let (count,) = sqlx::query_as::<_, (i64,)>(
            "SELECT COUNT(*) FROM candidates WHERE created_by_partner_id = $1",
        )
        .bind(partner_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn candidates_created_by_user(&self, user_id: Uuid) -> Result<i64> {
        let (count,) = sqlx::query_as::<_, (i64,)>(
            "SELECT COUNT(*) FROM candidates WHERE created_by_user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn distinct_jobs_touched(&self, user_id: Uuid) -> Result<i64> {
        let (count,) = sqlx::query_as::<_, (i64,)>(
            "SELECT COUNT(DISTINCT job_id) FROM applications WHERE applied_by_user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn recent_applications(&self, user_id: Uuid) -> Result<Vec<ApplicationListItem>> {
        let items = sqlx::query_as::<_, ApplicationListItem>(&format!(
            "{LIST_ITEM_SELECT} WHERE a.applied_by_user_id = $1 \
             ORDER BY a.created_at DESC LIMIT 5"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}

struct OutcomeCounts {
    total: i64,
    active: i64,
    hired: i64,
    rejected: i64,
}

fn resolve_name(names: &HashMap<Uuid, String>, id: &Uuid) -> String {
    names
        .get(id)
        .cloned()
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Funnel rates over the current stage distribution. Zero denominators
/// yield 0.0, never an error.
fn conversion_from(pipeline: &PipelineBreakdown) -> Conversion {
    let total = pipeline.total();
    Conversion {
        application_to_hire_rate: rate(pipeline.hired, total),
        screening_to_interview_rate: rate(pipeline.interview_scheduled, pipeline.screening),
        interview_to_hire_rate: rate(pipeline.hired, pipeline.interview_scheduled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_handles_empty_pipeline() {
        let conversion = conversion_from(&PipelineBreakdown::default());
        assert_eq!(conversion.application_to_hire_rate, 0.0);
        assert_eq!(conversion.screening_to_interview_rate, 0.0);
        assert_eq!(conversion.interview_to_hire_rate, 0.0);
    }

    #[test]
    fn conversion_rounds_to_one_decimal() {
        let pipeline = PipelineBreakdown::from_counts([
            (PipelineStage::Applied, 5),
            (PipelineStage::Screening, 3),
            (PipelineStage::InterviewScheduled, 2),
            (PipelineStage::Hired, 2),
        ]);
        let conversion = conversion_from(&pipeline);
        assert_eq!(conversion.application_to_hire_rate, 16.7);
        assert_eq!(conversion.screening_to_interview_rate, 66.7);
        assert_eq!(conversion.interview_to_hire_rate, 100.0);
    }

    #[test]
    fn unknown_fallback_for_missing_names() {
        let names = HashMap::new();
        assert_eq!(resolve_name(&names, &Uuid::new_v4()), "Unknown");
    }
}
