//! Route modules for the dashboard server
//!
//! Each module follows a consistent structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON API and HTMX intent endpoints
//! - page.rs: HTMX page rendering

pub mod dashboard;
