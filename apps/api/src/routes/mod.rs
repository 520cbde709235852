pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::emails;
use crate::pipeline::handlers as pipeline_handlers;
use crate::resumes::handlers as resume_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/health", get(health::health_handler))
        .route("/api/v1/stats", get(resume_handlers::handle_stats))
        // Generation pipelines
        .route(
            "/api/v1/resumes/onboard",
            post(pipeline_handlers::handle_onboard),
        )
        .route("/api/v1/resumes", post(pipeline_handlers::handle_manual))
        .route(
            "/api/v1/resumes/tailor",
            post(pipeline_handlers::handle_tailor),
        )
        // Resume records
        .route("/api/v1/resumes", get(resume_handlers::handle_list_resumes))
        .route(
            "/api/v1/resumes/:id",
            get(resume_handlers::handle_get_resume),
        )
        .route(
            "/api/v1/resumes/:id",
            delete(resume_handlers::handle_delete_resume),
        )
        // Derived profile + emails
        .route(
            "/api/v1/preferences",
            get(resume_handlers::handle_get_preferences),
        )
        .route(
            "/api/v1/emails/generate",
            post(emails::handle_generate_email),
        )
        .layer(DefaultBodyLimit::max(
            pipeline_handlers::MAX_UPLOAD_BYTES + 1024,
        ))
        .with_state(state)
}
