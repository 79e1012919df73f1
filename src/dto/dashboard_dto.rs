use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::application::PipelineStage;

/// Trailing aggregation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Range {
    #[default]
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
}

impl Range {
    pub fn days(&self) -> i64 {
        match self {
            Range::Week => 7,
            Range::Month => 30,
            Range::Quarter => 90,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub range: Option<Range>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub count: i64,
}

/// Fixed-key stage breakdown; every stage is present, zero-filled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PipelineBreakdown {
    pub applied: i64,
    pub screening: i64,
    pub contacted: i64,
    pub document_requested: i64,
    pub document_received: i64,
    pub submitted_to_client: i64,
    pub interview_scheduled: i64,
    pub interview_completed: i64,
    pub shortlisted: i64,
    pub offer_sent: i64,
    pub offer_accepted: i64,
    pub offer_rejected: i64,
    pub hired: i64,
    pub rejected: i64,
}

impl PipelineBreakdown {
    pub fn from_counts(counts: impl IntoIterator<Item = (PipelineStage, i64)>) -> Self {
        let mut breakdown = PipelineBreakdown::default();
        for (stage, count) in counts {
            *breakdown.slot_mut(stage) = count;
        }
        breakdown
    }

    /// Applications across every stage, i.e. the scoped total.
    pub fn total(&self) -> i64 {
        PipelineStage::ALL
            .into_iter()
            .map(|stage| *self.slot(stage))
            .sum()
    }

    pub fn slot(&self, stage: PipelineStage) -> &i64 {
        match stage {
            PipelineStage::Applied => &self.applied,
            PipelineStage::Screening => &self.screening,
            PipelineStage::Contacted => &self.contacted,
            PipelineStage::DocumentRequested => &self.document_requested,
            PipelineStage::DocumentReceived => &self.document_received,
            PipelineStage::SubmittedToClient => &self.submitted_to_client,
            PipelineStage::InterviewScheduled => &self.interview_scheduled,
            PipelineStage::InterviewCompleted => &self.interview_completed,
            PipelineStage::Shortlisted => &self.shortlisted,
            PipelineStage::OfferSent => &self.offer_sent,
            PipelineStage::OfferAccepted => &self.offer_accepted,
            PipelineStage::OfferRejected => &self.offer_rejected,
            PipelineStage::Hired => &self.hired,
            PipelineStage::Rejected => &self.rejected,
        }
    }

    fn slot_mut(&mut self, stage: PipelineStage) -> &mut i64 {
        match stage {
            PipelineStage::Applied => &mut self.applied,
            PipelineStage::Screening => &mut self.screening,
            PipelineStage::Contacted => &mut self.contacted,
            PipelineStage::DocumentRequested => &mut self.document_requested,
            PipelineStage::DocumentReceived => &mut self.document_received,
            PipelineStage::SubmittedToClient => &mut self.submitted_to_client,
            PipelineStage::InterviewScheduled => &mut self.interview_scheduled,
            PipelineStage::InterviewCompleted => &mut self.interview_completed,
            PipelineStage::Shortlisted => &mut self.shortlisted,
            PipelineStage::OfferSent => &mut self.offer_sent,
            PipelineStage::OfferAccepted => &mut self.offer_accepted,
            PipelineStage::OfferRejected => &mut self.offer_rejected,
            PipelineStage::Hired => &mut self.hired,
            PipelineStage::Rejected => &mut self.rejected,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminSummary {
    pub total_partners: i64,
    pub pending_partners: i64,
    pub approved_partners: i64,
    pub rejected_partners: i64,
    pub total_jobs: i64,
    pub open_jobs: i64,
    pub closed_jobs: i64,
    pub on_hold_jobs: i64,
    pub cancelled_jobs: i64,
    pub total_applications: i64,
    pub active_applications: i64,
    pub hired: i64,
    pub rejected: i64,
    pub recruiters: i64,
}

/// Period-over-period percentage deltas for the admin summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryChange {
    pub partners: f64,
    pub jobs: f64,
    pub applications: f64,
    pub hired: f64,
    pub rejected: f64,
    pub recruiters: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminTrends {
    pub applications: Vec<TrendPoint>,
    pub hires: Vec<TrendPoint>,
    pub jobs_created: Vec<TrendPoint>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceBreakdown {
    pub partner: i64,
    pub recruiter: i64,
    pub direct: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentCount {
    pub department: String,
    pub applications: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobLeader {
    pub job_id: Uuid,
    pub job_title: String,
    pub applications: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerLeader {
    pub partner_id: Uuid,
    pub partner_name: String,
    pub applications: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecruiterLeader {
    pub user_id: Uuid,
    pub user_name: String,
    pub applications: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Distribution {
    pub applications_by_source: SourceBreakdown,
    pub applications_by_department: Vec<DepartmentCount>,
    pub applications_by_job: Vec<JobLeader>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leaderboards {
    pub top_partners: Vec<PartnerLeader>,
    pub top_recruiters: Vec<RecruiterLeader>,
    pub top_jobs: Vec<JobLeader>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub application_to_hire_rate: f64,
    pub screening_to_interview_rate: f64,
    pub interview_to_hire_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminDashboard {
    pub range: Range,
    pub summary: AdminSummary,
    pub summary_change: SummaryChange,
    pub pipeline: PipelineBreakdown,
    pub trends: AdminTrends,
    pub distribution: Distribution,
    pub leaderboards: Leaderboards,
    pub conversion: Conversion,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartnerSummary {
    pub total_candidates: i64,
    pub total_applications: i64,
    pub active_applications: i64,
    pub hired: i64,
    pub rejected: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerTrends {
    pub applications: Vec<TrendPoint>,
    pub hires: Vec<TrendPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopJobs {
    pub top_jobs: Vec<JobLeader>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HireRate {
    pub application_to_hire_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerDashboard {
    pub range: Range,
    pub summary: PartnerSummary,
    pub pipeline: PipelineBreakdown,
    pub trends: PartnerTrends,
    pub leaderboards: TopJobs,
    pub conversion: HireRate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserSummary {
    pub total_applications: i64,
    pub active_applications: i64,
    pub hired: i64,
    pub rejected: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTrends {
    pub applications: Vec<TrendPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDashboard {
    pub range: Range,
    pub summary: UserSummary,
    pub pipeline: PipelineBreakdown,
    pub trends: UserTrends,
    pub leaderboards: TopJobs,
    pub conversion: HireRate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecruiterSummary {
    pub total_candidates_added: i64,
    pub active_jobs_worked_on: i64,
    pub hire_rate: f64,
    pub total_applications: i64,
    pub active: i64,
    pub hired: i64,
    pub rejected: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecruiterDashboard {
    pub range: Range,
    pub summary: RecruiterSummary,
    pub pipeline: PipelineBreakdown,
    pub trends: UserTrends,
    pub recent_applications: Vec<crate::dto::application_dto::ApplicationListItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_parses_from_query_values() {
        let range: Range = serde_json::from_str("\"30d\"").unwrap();
        assert_eq!(range, Range::Month);
        assert_eq!(Range::default().days(), 7);
        assert_eq!(Range::Quarter.days(), 90);
    }

    #[test]
    fn breakdown_covers_every_stage_zero_filled() {
        let breakdown = PipelineBreakdown::from_counts([
            (PipelineStage::Screening, 4),
            (PipelineStage::Hired, 2),
        ]);
        let value = serde_json::to_value(&breakdown).unwrap();
        let map = value.as_object().unwrap();
        assert_eq!(map.len(), PipelineStage::ALL.len());
        assert_eq!(map["SCREENING"], 4);
        assert_eq!(map["HIRED"], 2);
        assert_eq!(map["OFFER_SENT"], 0);
        assert_eq!(map["APPLIED"], 0);
    }
}
