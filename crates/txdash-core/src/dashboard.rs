//! Dashboard facade
//!
//! Wires the filter holder to the synchronization controller and is the
//! only entry point the presentation layer talks to. Intents are applied
//! one at a time under the holder's lock, so snapshots reach the
//! controller in intent order.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use txdash_config::{Config, Month};

use crate::error::CoreError;
use crate::filter::{FilterState, FilterStateHolder};
use crate::gateway::{GatewayRef, HttpGateway};
use crate::models::DisplayState;
use crate::sync::{CyclePhase, SyncController};

/// Everything the presentation layer needs for one render
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardView {
    pub filter: FilterState,
    pub display: DisplayState,
    pub phase: CyclePhase,
    pub latest_token: u64,
}

impl DashboardView {
    /// Previous-page control enabled
    pub fn can_go_prev(&self) -> bool {
        self.filter.page > 1
    }

    /// Next-page control enabled
    pub fn can_go_next(&self) -> bool {
        self.filter.page < self.display.page_bound()
    }

    /// The stored page lies past the last page of the committed results.
    ///
    /// The page is left as is until the user navigates; see DESIGN.md.
    pub fn is_page_out_of_range(&self) -> bool {
        self.filter.page > self.display.page_bound()
    }
}

pub struct Dashboard {
    filters: Mutex<FilterStateHolder>,
    controller: Arc<SyncController>,
    listener: JoinHandle<()>,
}

impl Dashboard {
    /// Create a dashboard over `controller`; must run inside a tokio runtime
    pub fn new(controller: SyncController, initial: FilterState) -> Self {
        let controller = Arc::new(controller);
        let mut holder = FilterStateHolder::new(initial);
        let receiver = holder.subscribe();
        let listener = tokio::spawn(Arc::clone(&controller).run_listener(receiver));

        Self {
            filters: Mutex::new(holder),
            controller,
            listener,
        }
    }

    /// Create a dashboard over `gateway` with default controller settings
    pub fn with_gateway(gateway: GatewayRef, initial: FilterState) -> Self {
        Self::new(SyncController::new(gateway), initial)
    }

    /// Create a dashboard talking HTTP to the configured service
    pub fn from_config(config: &Config) -> Result<Self, CoreError> {
        let gateway = HttpGateway::from_config(config)?;
        let month = config
            .initial_month()
            .map_err(|e| CoreError::ValidationError { message: e.to_string() })?;
        let controller = SyncController::new(Arc::new(gateway)).with_page_size(config.dashboard.page_size);
        Ok(Self::new(controller, FilterState::new(month)))
    }

    /// Run the initial fetch cycle
    pub async fn start(&self) {
        log::info!(target: "txdash::sync", "dashboard starting");
        self.refresh().await;
    }

    pub fn controller(&self) -> &Arc<SyncController> {
        &self.controller
    }

    pub async fn filter_state(&self) -> FilterState {
        self.filters.lock().await.state().clone()
    }

    pub async fn display(&self) -> DisplayState {
        self.controller.display().await
    }

    /// Filter and display state read together for rendering
    pub async fn view(&self) -> DashboardView {
        let filter = self.filter_state().await;
        DashboardView {
            filter,
            display: self.controller.display().await,
            phase: self.controller.cycle_phase(),
            latest_token: self.controller.latest_token(),
        }
    }

    pub async fn select_month(&self, month: Month) -> bool {
        self.filters.lock().await.set_month(month)
    }

    pub async fn select_month_name(&self, name: &str) -> Result<bool, CoreError> {
        self.filters.lock().await.set_month_name(name)
    }

    pub async fn search(&self, text: impl Into<String>) -> bool {
        self.filters.lock().await.set_search_text(text)
    }

    /// Jump to `page`, clamped against the committed page count
    pub async fn go_to_page(&self, page: u32) -> bool {
        let total_pages = self.controller.display().await.total_pages;
        self.filters.lock().await.set_page(page, total_pages)
    }

    pub async fn next_page(&self) -> bool {
        let total_pages = self.controller.display().await.total_pages;
        self.filters.lock().await.next_page(total_pages)
    }

    pub async fn prev_page(&self) -> bool {
        self.filters.lock().await.prev_page()
    }

    /// Re-run the fetch cycle for the current filters
    pub async fn refresh(&self) {
        self.filters.lock().await.refresh();
    }

    /// Wait until every intent issued so far has a settled cycle
    pub async fn wait_until_settled(&self) {
        let revision = self.filters.lock().await.revision();
        self.controller.wait_settled(revision).await;
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.listener.abort();
    }
}
