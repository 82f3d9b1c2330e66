pub mod health;
pub mod settings;
pub mod tabs;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // UI surface
        .route("/api/v1/tabs", post(tabs::handle_open_tab))
        .route("/api/v1/tabs/:id", delete(tabs::handle_close_tab))
        .route("/api/v1/tabs/:id/reload", post(tabs::handle_reload_tab))
        .route("/api/v1/tabs/:id/inject", post(tabs::handle_inject))
        .route("/api/v1/tabs/:id/form", get(tabs::handle_form_state))
        .route("/api/v1/tabs/:id/ping", post(tabs::handle_ping))
        .route("/api/v1/tabs/:id/extract", post(tabs::handle_extract))
        .route("/api/v1/tabs/:id/proposal", post(tabs::handle_generate_proposal))
        .route("/api/v1/tabs/:id/bid", post(tabs::handle_insert_bid))
        .route("/api/v1/tabs/:id/questions", post(tabs::handle_generate_questions))
        .route(
            "/api/v1/tabs/:id/questions/insert",
            post(tabs::handle_insert_questions),
        )
        // Options surface
        .route(
            "/api/v1/settings",
            get(settings::handle_get_settings).put(settings::handle_put_settings),
        )
        .with_state(state)
}
