pub mod admin;
pub mod applications;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod jobs;
pub mod partners;

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};

use crate::middleware::auth as auth_mw;
use crate::AppState;

/// Full application router. Route groups carry their own gate: bearer auth
/// for reads, actor resolution (with the partner-approval check) for
/// submission paths, and the admin gate for back-office operations.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/partner-signup", post(auth::partner_signup));

    let authed = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/partners/me", get(partners::my_partner_profile))
        .route("/jobs", get(jobs::list_jobs))
        .route("/jobs/:id", get(jobs::get_job))
        .route_layer(axum_middleware::from_fn(auth_mw::require_bearer_auth));

    let actor_scoped = Router::new()
        .route("/applications/apply", post(applications::apply))
        .route("/applications/my", get(applications::my_applications))
        .route(
            "/applications/:id/withdraw",
            post(applications::withdraw_application),
        )
        .route("/partner/dashboard", get(dashboard::partner_dashboard))
        .route("/user/dashboard", get(dashboard::user_dashboard))
        .route("/recruiter/dashboard", get(dashboard::recruiter_dashboard))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_mw::load_actor,
        ));

    let admin_only = Router::new()
        .route("/jobs", post(jobs::create_job))
        .route("/jobs/reconcile-counts", post(jobs::reconcile_counts))
        .route("/jobs/:id", patch(jobs::update_job).delete(jobs::delete_job))
        .route("/applications", get(applications::all_applications))
        .route("/applications/:id/stage", patch(applications::advance_stage))
        .route("/partners/pending", get(partners::pending_partners))
        .route("/partners/:id/approve", post(partners::approve_partner))
        .route("/partners/:id/reject", post(partners::reject_partner))
        .route("/admin/dashboard", get(dashboard::admin_dashboard))
        .route("/admin/recruiters", post(admin::create_recruiter))
        .route_layer(axum_middleware::from_fn(auth_mw::require_admin));

    public
        .merge(authed)
        .merge(actor_scoped)
        .merge(admin_only)
        .with_state(state)
}
