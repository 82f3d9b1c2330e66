//! Axum route handlers for the UI surface: one tab, one page, one session.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::messaging::protocol::{BackgroundReply, PageReply};
use crate::messaging::tabs::Tab;
use crate::models::bid::BidPayload;
use crate::page::document::DomEvent;
use crate::page::form_writer::FieldValue;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

fn default_inject() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct OpenTabRequest {
    pub url: String,
    pub html: String,
    #[serde(default = "default_inject")]
    pub inject: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReloadTabRequest {
    pub html: Option<String>,
    #[serde(default = "default_inject")]
    pub inject: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabResponse {
    pub id: Uuid,
    pub url: String,
    pub loaded_at: DateTime<Utc>,
    pub listener_registered: bool,
    pub generating: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectResponse {
    pub newly_registered: bool,
}

#[derive(Debug, Serialize)]
pub struct FormStateResponse {
    pub url: String,
    pub fields: Vec<FieldValue>,
    pub events: Vec<DomEvent>,
}

#[derive(Debug, Deserialize)]
pub struct QuestionsRequest {
    /// Falls back to the description extracted from the page.
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InsertQuestionsRequest {
    pub text: String,
}

async fn find_tab(state: &AppState, id: Uuid) -> Result<Arc<Tab>, AppError> {
    state
        .tabs
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Tab {id} not found")))
}

async fn describe(tab: &Tab) -> TabResponse {
    let page = tab.page().await;
    TabResponse {
        id: tab.id,
        url: page.url().to_string(),
        loaded_at: page.loaded_at(),
        listener_registered: page.endpoint().is_some(),
        generating: tab.session().is_generating(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/tabs
///
/// Loads a page snapshot into a new tab. With `inject` (default) the content
/// script registers its listener on load.
pub async fn handle_open_tab(
    State(state): State<AppState>,
    Json(request): Json<OpenTabRequest>,
) -> Result<(StatusCode, Json<TabResponse>), AppError> {
    if request.url.trim().is_empty() {
        return Err(AppError::Validation("url cannot be empty".to_string()));
    }

    let tab = state
        .tabs
        .open(request.url, request.html, request.inject)
        .await;

    Ok((StatusCode::CREATED, Json(describe(&tab).await)))
}

/// DELETE /api/v1/tabs/:id
pub async fn handle_close_tab(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.tabs.close(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Tab {id} not found")))
    }
}

/// POST /api/v1/tabs/:id/reload
///
/// A new page load: fresh form state and a fresh registration guard.
pub async fn handle_reload_tab(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReloadTabRequest>,
) -> Result<Json<TabResponse>, AppError> {
    let tab = state
        .tabs
        .reload(id, request.html, request.inject)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Tab {id} not found")))?;

    Ok(Json(describe(&tab).await))
}

/// POST /api/v1/tabs/:id/inject
pub async fn handle_inject(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InjectResponse>, AppError> {
    let tab = find_tab(&state, id).await?;
    let newly_registered = tab.page().await.inject_content_script();
    Ok(Json(InjectResponse { newly_registered }))
}

/// GET /api/v1/tabs/:id/form
pub async fn handle_form_state(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FormStateResponse>, AppError> {
    let tab = find_tab(&state, id).await?;
    let page = tab.page().await;
    let (fields, events) = page.form_state().await;
    Ok(Json(FormStateResponse {
        url: page.url().to_string(),
        fields,
        events,
    }))
}

/// POST /api/v1/tabs/:id/ping
pub async fn handle_ping(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PageReply>, AppError> {
    let tab = find_tab(&state, id).await?;
    let endpoint = tab.page_endpoint().await;
    tab.session().ensure_alive(endpoint.as_ref()).await?;
    Ok(Json(PageReply::Alive))
}

/// POST /api/v1/tabs/:id/extract
pub async fn handle_extract(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PageReply>, AppError> {
    let tab = find_tab(&state, id).await?;
    let endpoint = tab.page_endpoint().await;
    let job = tab.session().extract_only(endpoint.as_ref()).await?;
    Ok(Json(PageReply::Extracted(job)))
}

/// POST /api/v1/tabs/:id/proposal
///
/// Full flow: ping → extract → generate. Returns the draft for preview;
/// nothing is written to the page.
pub async fn handle_generate_proposal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PageReply>, AppError> {
    let tab = find_tab(&state, id).await?;
    let endpoint = tab.page_endpoint().await;
    let proposal = tab.session().extract_and_generate(endpoint.as_ref()).await?;
    Ok(Json(PageReply::Proposal(proposal)))
}

/// POST /api/v1/tabs/:id/bid
pub async fn handle_insert_bid(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BidPayload>,
) -> Result<Json<PageReply>, AppError> {
    if payload.proposal_text.trim().is_empty() {
        return Err(AppError::Validation("proposalText cannot be empty".to_string()));
    }

    let tab = find_tab(&state, id).await?;
    let endpoint = tab.page_endpoint().await;
    let message = tab.session().insert_bid(endpoint.as_ref(), payload).await?;
    Ok(Json(PageReply::Done { message }))
}

/// POST /api/v1/tabs/:id/questions
pub async fn handle_generate_questions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<QuestionsRequest>,
) -> Result<Json<BackgroundReply>, AppError> {
    let tab = find_tab(&state, id).await?;

    let description = match request.description.filter(|d| !d.trim().is_empty()) {
        Some(description) => description,
        None => {
            let endpoint = tab.page_endpoint().await;
            let job = tab.session().extract_only(endpoint.as_ref()).await?;
            job.require_description()?.to_string()
        }
    };

    let questions = tab.session().generate_clarifying_questions(description).await?;
    Ok(Json(BackgroundReply::Questions { questions }))
}

/// POST /api/v1/tabs/:id/questions/insert
pub async fn handle_insert_questions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<InsertQuestionsRequest>,
) -> Result<Json<PageReply>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }

    let tab = find_tab(&state, id).await?;
    let endpoint = tab.page_endpoint().await;
    let message = tab
        .session()
        .insert_clarifying_questions(endpoint.as_ref(), request.text)
        .await?;
    Ok(Json(PageReply::Done { message }))
}
