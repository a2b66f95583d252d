//! HTTP interface - router, shared state and the authorization gate.
//!
//! Every route lives under `/api/admin` and requires an `OWNER` session. Errors are
//! rendered by [`crate::errors::Error`]'s `IntoResponse` implementation as
//! `{ "error": "..." }` bodies.

/// Session resolution and the `OWNER` gate
pub mod auth;
/// Directory, statistics and report endpoints
pub mod users;

use crate::config::ReportSettings;
use axum::{Router, routing::get};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// State shared by all request handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
    /// Report branding and locale
    pub reports: Arc<ReportSettings>,
}

impl AppState {
    /// Creates the handler state.
    #[must_use]
    pub fn new(db: DatabaseConnection, reports: ReportSettings) -> Self {
        Self {
            db,
            reports: Arc::new(reports),
        }
    }
}

/// Builds the admin API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/admin/users", get(users::list_users))
        .route("/api/admin/users/export.csv", get(users::export_users_csv))
        .route("/api/admin/users/{id}", get(users::get_user_detail))
        .route("/api/admin/users/{id}/report.pdf", get(users::get_user_report))
        .route("/api/admin/stats", get(users::get_stats))
        .with_state(state)
}
