//! Dashboard routes - month selection, search, pagination, statistics, chart
//!
//! Structure:
//! - api.rs: JSON state endpoint and HTMX intent endpoints
//! - page.rs: Full page and content partial rendering

pub mod api;
pub mod page;

pub use api::{
    api_state,
    htmx_dashboard_content,
    htmx_next_page,
    htmx_prev_page,
    htmx_refresh,
    htmx_search,
    htmx_select_month,
};

pub use page::{page_dashboard, render_content};
