pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::accounts::handlers as accounts;
use crate::assessment::handlers as assessment;
use crate::cv::handlers as cv;
use crate::recommendations::handlers as recommendations;
use crate::reporting::handlers as reporting;
use crate::state::AppState;

/// Headroom over the CV size limit for multipart framing.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_cv_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .route("/health", get(health::health_handler))
        // Accounts
        .route("/api/v1/users", post(accounts::handle_register))
        .route(
            "/api/v1/users/:id",
            get(accounts::handle_get_user).patch(accounts::handle_update_user),
        )
        // Tests and submissions
        .route("/api/v1/tests", get(assessment::handle_list_tests))
        .route("/api/v1/tests/:id", get(assessment::handle_get_test))
        .route(
            "/api/v1/tests/:id/submit",
            post(assessment::handle_submit_test),
        )
        .route(
            "/api/v1/users/:id/results",
            get(assessment::handle_list_results),
        )
        .route(
            "/api/v1/users/:id/skills",
            get(assessment::handle_list_skills),
        )
        .route(
            "/api/v1/users/:id/progress",
            get(assessment::handle_get_progress),
        )
        // Reporting
        .route(
            "/api/v1/users/:id/performance",
            get(reporting::handle_performance),
        )
        .route(
            "/api/v1/users/:id/statistics",
            get(reporting::handle_statistics),
        )
        // Recommendations
        .route(
            "/api/v1/users/:id/recommendations",
            get(recommendations::handle_recommendations),
        )
        .route(
            "/api/v1/users/:id/recommendations/catalog",
            get(recommendations::handle_catalog),
        )
        .route(
            "/api/v1/users/:id/recommendations/:rec_id/progress",
            put(recommendations::handle_update_progress),
        )
        .route(
            "/api/v1/users/:id/recommendations/:rec_id/complete",
            post(recommendations::handle_complete),
        )
        // CV
        .route(
            "/api/v1/users/:id/cv",
            get(cv::handle_get_cv)
                .post(cv::handle_upload_cv)
                .delete(cv::handle_delete_cv),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
