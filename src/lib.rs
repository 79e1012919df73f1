pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    application_service::ApplicationService, auth_service::AuthService,
    candidate_service::CandidateService, dashboard_service::DashboardService,
    job_service::JobService, partner_service::PartnerService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub auth_service: AuthService,
    pub partner_service: PartnerService,
    pub job_service: JobService,
    pub candidate_service: CandidateService,
    pub application_service: ApplicationService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let auth_service = AuthService::new(pool.clone());
        let partner_service = PartnerService::new(pool.clone());
        let job_service = JobService::new(pool.clone());
        let candidate_service = CandidateService::new(pool.clone());
        let application_service = ApplicationService::new(pool.clone(), candidate_service.clone());
        let dashboard_service = DashboardService::new(pool.clone());

        Self {
            pool,
            auth_service,
            partner_service,
            job_service,
            candidate_service,
            application_service,
            dashboard_service,
        }
    }
}
