//! Router assembly and shared request state.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api::handlers::{daos, proposals, status, tasks, upload};
use crate::arkiv::Ledger;
use crate::ipfs::FileStore;

/// Upload body cap; the only resource guard in this layer.
pub const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Shared clients, constructed once in the entry point and reused for
/// every request.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn Ledger>,
    pub files: Arc<dyn FileStore>,
    pub wallet_address: String,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(status::health))
        .route("/api/upload", post(upload::upload_file))
        // DAO routes
        .route(
            "/api/arkiv/daos",
            post(daos::create_dao).get(daos::list_daos),
        )
        .route("/api/arkiv/daos/:dao_key", get(daos::get_dao))
        .route("/api/arkiv/daos/:dao_key/board", get(daos::get_board))
        .route("/api/arkiv/daos/:dao_key/members", post(daos::add_member))
        // Proposal routes
        .route(
            "/api/arkiv/proposals",
            post(proposals::create_proposal).get(proposals::list_proposals),
        )
        .route(
            "/api/arkiv/proposals/by-dao/:dao_key",
            get(proposals::list_proposals_by_dao),
        )
        .route(
            "/api/arkiv/proposals/:proposal_key",
            get(proposals::get_proposal),
        )
        // Task routes
        .route(
            "/api/arkiv/tasks",
            post(tasks::create_task).get(tasks::list_tasks),
        )
        .route(
            "/api/arkiv/tasks/by-proposal/:proposal_key",
            get(tasks::list_tasks_by_proposal),
        )
        .route("/api/arkiv/tasks/:task_key", get(tasks::get_task))
        // Task-tracking stubs
        .route("/api/tasks/:task_id/status", post(tasks::update_task_status))
        .route(
            "/api/tasks/:task_id/attachments",
            get(tasks::list_task_attachments),
        )
        .route("/api/tasks/:task_id/history", get(tasks::get_task_history))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(Any),
        )
        .with_state(state)
}
