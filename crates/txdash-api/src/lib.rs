//! HTTP dashboard server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::dashboard: dashboard page, content partial, filter intents, JSON state

pub mod error;
pub mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use txdash_config::Config;
use txdash_core::Dashboard;

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::dashboard::{
        api_state, htmx_dashboard_content, htmx_next_page, htmx_prev_page, htmx_refresh, htmx_search,
        htmx_select_month, page_dashboard,
    };

    Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        .route("/api/state", get(api_state))
        // HTMX page routes
        .route("/", get(page_dashboard))
        .route("/dashboard", get(page_dashboard))
        // HTMX partial routes
        .route("/dashboard/content", get(htmx_dashboard_content))
        .route("/dashboard/month", post(htmx_select_month))
        .route("/dashboard/search", post(htmx_search))
        .route("/dashboard/next", post(htmx_next_page))
        .route("/dashboard/prev", post(htmx_prev_page))
        .route("/dashboard/refresh", post(htmx_refresh))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Transaction Dashboard</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
</body>
</html>"#,
        txdash_utils::escape_html(title),
        content
    )
}

/// Check if request is from HTMX (partial page update)
fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(headers: &axum::http::HeaderMap, title: &str, inner_content: &str) -> String {
    if is_htmx_request(headers) {
        format!(r#"<main class='max-w-6xl mx-auto p-6'>{}</main>"#, inner_content)
    } else {
        base_html(
            title,
            &format!(
                r#"<header class='bg-white border-b'>
    <div class='max-w-6xl mx-auto px-6 py-4'><h1 class='text-xl font-bold text-indigo-600'>Transaction Dashboard</h1></div>
</header>
<main class='max-w-6xl mx-auto p-6'>{}</main>"#,
                inner_content
            ),
        )
    }
}

/// Start the HTTP server
///
/// Binds the configured address and serves until the listener fails.
pub async fn start_server(config: Config, dashboard: Arc<Dashboard>) -> std::io::Result<()> {
    let addr = config.bind_addr();
    let state = AppState { dashboard };

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!(target: "txdash::api", "Starting dashboard server on http://{}", addr);
    log::info!(target: "txdash::api", "Available routes:");
    log::info!(target: "txdash::api", "  - / (Dashboard)");
    log::info!(target: "txdash::api", "  - /dashboard/* (HTMX partials and filter intents)");
    log::info!(target: "txdash::api", "  - /api/* (JSON API endpoints)");

    match axum::serve(listener, router).await {
        Ok(()) => {
            log::info!(target: "txdash::api", "Server stopped gracefully");
            Ok(())
        }
        Err(e) => {
            log::error!(target: "txdash::api", "Server error: {}", e);
            Err(e)
        }
    }
}
