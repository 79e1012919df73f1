pub mod application_service;
pub mod auth_service;
pub mod candidate_service;
pub mod dashboard_service;
pub mod job_service;
pub mod partner_service;
