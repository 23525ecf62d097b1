//! Dashboard API endpoints
//!
//! - api_state: JSON snapshot of filter and display state
//! - htmx_*: filter intents, each answering with the refreshed content partial

use axum::extract::{Form, State};
use axum::response::Html;
use axum::Json;
use serde::Deserialize;
use txdash_core::DashboardView;

use super::page::render_content;
use crate::{ApiError, AppState};

/// Month selector form body
#[derive(Debug, Deserialize)]
pub struct MonthForm {
    pub month: String,
}

/// Search box form body
#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(rename = "searchText", default)]
    pub search_text: String,
}

/// Current filter and display state (JSON API)
pub async fn api_state(state: State<AppState>) -> Json<DashboardView> {
    Json(state.dashboard.view().await)
}

/// Content partial for the current state
pub async fn htmx_dashboard_content(state: State<AppState>) -> Html<String> {
    Html(render_content(&state.dashboard.view().await, false))
}

/// Select a month by name; page resets to 1
pub async fn htmx_select_month(
    state: State<AppState>,
    Form(form): Form<MonthForm>,
) -> Result<Html<String>, ApiError> {
    let changed = state.dashboard.select_month_name(&form.month).await?;
    log::debug!(target: "txdash::api", "month intent {:?} (changed: {})", form.month, changed);
    Ok(respond(&state, changed).await)
}

/// Set the search text; page resets to 1
pub async fn htmx_search(state: State<AppState>, Form(form): Form<SearchForm>) -> Html<String> {
    let changed = state.dashboard.search(form.search_text.clone()).await;
    log::debug!(target: "txdash::api", "search intent {:?} (changed: {})", form.search_text, changed);
    respond(&state, changed).await
}

pub async fn htmx_next_page(state: State<AppState>) -> Html<String> {
    let changed = state.dashboard.next_page().await;
    respond(&state, changed).await
}

pub async fn htmx_prev_page(state: State<AppState>) -> Html<String> {
    let changed = state.dashboard.prev_page().await;
    respond(&state, changed).await
}

/// Re-run the fetch cycle for the current filters
pub async fn htmx_refresh(state: State<AppState>) -> Html<String> {
    state.dashboard.refresh().await;
    respond(&state, true).await
}

/// Render the partial; a freshly published intent may not have started its cycle yet
async fn respond(state: &AppState, pending: bool) -> Html<String> {
    Html(render_content(&state.dashboard.view().await, pending))
}
