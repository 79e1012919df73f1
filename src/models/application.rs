use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Fixed hiring pipeline. Ordered in declaration order from intake to
/// terminal outcome; HIRED and REJECTED also settle `final_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "pipeline_stage", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStage {
    Applied,
    Screening,
    Contacted,
    DocumentRequested,
    DocumentReceived,
    SubmittedToClient,
    InterviewScheduled,
    InterviewCompleted,
    Shortlisted,
    OfferSent,
    OfferAccepted,
    OfferRejected,
    Hired,
    Rejected,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 14] = [
        PipelineStage::Applied,
        PipelineStage::Screening,
        PipelineStage::Contacted,
        PipelineStage::DocumentRequested,
        PipelineStage::DocumentReceived,
        PipelineStage::SubmittedToClient,
        PipelineStage::InterviewScheduled,
        PipelineStage::InterviewCompleted,
        PipelineStage::Shortlisted,
        PipelineStage::OfferSent,
        PipelineStage::OfferAccepted,
        PipelineStage::OfferRejected,
        PipelineStage::Hired,
        PipelineStage::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Applied => "APPLIED",
            PipelineStage::Screening => "SCREENING",
            PipelineStage::Contacted => "CONTACTED",
            PipelineStage::DocumentRequested => "DOCUMENT_REQUESTED",
            PipelineStage::DocumentReceived => "DOCUMENT_RECEIVED",
            PipelineStage::SubmittedToClient => "SUBMITTED_TO_CLIENT",
            PipelineStage::InterviewScheduled => "INTERVIEW_SCHEDULED",
            PipelineStage::InterviewCompleted => "INTERVIEW_COMPLETED",
            PipelineStage::Shortlisted => "SHORTLISTED",
            PipelineStage::OfferSent => "OFFER_SENT",
            PipelineStage::OfferAccepted => "OFFER_ACCEPTED",
            PipelineStage::OfferRejected => "OFFER_REJECTED",
            PipelineStage::Hired => "HIRED",
            PipelineStage::Rejected => "REJECTED",
        }
    }

    pub fn parse(value: &str) -> Option<PipelineStage> {
        PipelineStage::ALL
            .iter()
            .copied()
            .find(|stage| stage.as_str() == value)
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "final_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinalStatus {
    Hired,
    Rejected,
    Withdrawn,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub applied_by_user_id: Option<Uuid>,
    pub applied_by_partner_id: Option<Uuid>,
    pub pipeline_stage: PipelineStage,
    pub final_status: Option<FinalStatus>,
    pub source: String,
    pub contacted_at: Option<DateTime<Utc>>,
    pub interview_scheduled_at: Option<DateTime<Utc>>,
    pub interview_completed_at: Option<DateTime<Utc>>,
    pub offer_sent_at: Option<DateTime<Utc>>,
    pub offer_accepted_at: Option<DateTime<Utc>>,
    pub offer_rejected_at: Option<DateTime<Utc>>,
    pub hired_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Application {
    /// Moves the application to `stage` and stamps the stage's milestone.
    /// Milestones are first-write-only: re-entering a stage keeps the
    /// original timestamp. Only HIRED and REJECTED settle `final_status`.
    pub fn advance_to(&mut self, stage: PipelineStage, now: DateTime<Utc>) {
        self.pipeline_stage = stage;
        match stage {
            PipelineStage::Contacted => stamp(&mut self.contacted_at, now),
            PipelineStage::InterviewScheduled => stamp(&mut self.interview_scheduled_at, now),
            PipelineStage::InterviewCompleted => stamp(&mut self.interview_completed_at, now),
            PipelineStage::OfferSent => stamp(&mut self.offer_sent_at, now),
            PipelineStage::OfferAccepted => stamp(&mut self.offer_accepted_at, now),
            PipelineStage::OfferRejected => stamp(&mut self.offer_rejected_at, now),
            PipelineStage::Hired => {
                stamp(&mut self.hired_at, now);
                self.final_status = Some(FinalStatus::Hired);
            }
            PipelineStage::Rejected => {
                stamp(&mut self.rejected_at, now);
                self.final_status = Some(FinalStatus::Rejected);
            }
            _ => {}
        }
    }

    pub fn is_active(&self) -> bool {
        self.final_status.is_none()
    }
}

fn stamp(slot: &mut Option<DateTime<Utc>>, now: DateTime<Utc>) {
    if slot.is_none() {
        *slot = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn blank_application() -> Application {
        Application {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            candidate_id: Uuid::new_v4(),
            applied_by_user_id: Some(Uuid::new_v4()),
            applied_by_partner_id: None,
            pipeline_stage: PipelineStage::Applied,
            final_status: None,
            source: "USER".to_string(),
            contacted_at: None,
            interview_scheduled_at: None,
            interview_completed_at: None,
            offer_sent_at: None,
            offer_accepted_at: None,
            offer_rejected_at: None,
            hired_at: None,
            rejected_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn first_entry_stamps_milestone() {
        let mut app = blank_application();
        app.advance_to(PipelineStage::Contacted, at(1_000));
        assert_eq!(app.pipeline_stage, PipelineStage::Contacted);
        assert_eq!(app.contacted_at, Some(at(1_000)));
        assert!(app.final_status.is_none());
    }

    #[test]
    fn reentry_keeps_original_timestamp() {
        let mut app = blank_application();
        app.advance_to(PipelineStage::InterviewScheduled, at(1_000));
        app.advance_to(PipelineStage::Screening, at(2_000));
        app.advance_to(PipelineStage::InterviewScheduled, at(3_000));
        assert_eq!(app.interview_scheduled_at, Some(at(1_000)));
    }

    #[test]
    fn hired_settles_final_status() {
        let mut app = blank_application();
        app.advance_to(PipelineStage::Hired, at(5_000));
        assert_eq!(app.final_status, Some(FinalStatus::Hired));
        assert_eq!(app.hired_at, Some(at(5_000)));
        assert!(!app.is_active());
    }

    #[test]
    fn rejected_settles_final_status() {
        let mut app = blank_application();
        app.advance_to(PipelineStage::Rejected, at(5_000));
        assert_eq!(app.final_status, Some(FinalStatus::Rejected));
        assert_eq!(app.rejected_at, Some(at(5_000)));
    }

    #[test]
    fn intermediate_stages_leave_final_status_open() {
        let mut app = blank_application();
        for stage in [
            PipelineStage::Screening,
            PipelineStage::DocumentRequested,
            PipelineStage::SubmittedToClient,
            PipelineStage::Shortlisted,
            PipelineStage::OfferAccepted,
        ] {
            app.advance_to(stage, at(1_000));
            assert!(app.final_status.is_none(), "{stage} must not finalize");
        }
    }

    #[test]
    fn parse_round_trips_every_stage() {
        for stage in PipelineStage::ALL {
            assert_eq!(PipelineStage::parse(stage.as_str()), Some(stage));
        }
        assert_eq!(PipelineStage::parse("ARCHIVED"), None);
        assert_eq!(PipelineStage::parse("applied"), None);
    }
}
