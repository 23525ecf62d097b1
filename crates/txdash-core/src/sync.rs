//! Synchronization controller
//!
//! Turns filter snapshots into fetch cycles. Each cycle gets a monotonically
//! increasing token and issues the three gateway queries concurrently. A
//! response may only touch [`DisplayState`] while its token is still the
//! latest issued; anything older is dropped on arrival, success or failure.
//! The token check and the write happen under the same guard.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::{watch, RwLock};
use tokio::task::{JoinError, JoinHandle};
use txdash_config::SERVICE_PAGE_SIZE;

use crate::error::{CoreError, DefaultErrorLogger, ErrorContext, ErrorLogger, GatewayError};
use crate::filter::FilterState;
use crate::gateway::{Endpoint, GatewayRef};
use crate::models::{DisplayState, HistogramBucket, PagedResult, Statistics};

/// Queries issued per cycle
pub const FETCHES_PER_CYCLE: u8 = 3;

/// Token and snapshot identifying one fetch cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleTicket {
    token: u64,
    snapshot: FilterState,
}

impl CycleTicket {
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn snapshot(&self) -> &FilterState {
        &self.snapshot
    }
}

/// What happened to a single response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitOutcome {
    /// Written to display state
    Committed,
    /// Belonged to a superseded cycle
    Discarded,
    /// Latest cycle, but the query failed; previous values kept
    Failed,
}

/// Progress of the latest cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    /// No cycle started yet
    Idle,
    /// Latest cycle still has outstanding queries
    InFlight,
    /// Every query of the latest cycle resolved
    Settled,
}

/// Outcomes of the three queries of one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub token: u64,
    pub transactions: CommitOutcome,
    pub statistics: CommitOutcome,
    pub histogram: CommitOutcome,
}

impl CycleReport {
    /// True when all three queries ended with `outcome`
    pub fn all(&self, outcome: CommitOutcome) -> bool {
        self.transactions == outcome && self.statistics == outcome && self.histogram == outcome
    }
}

/// Spawned queries of a started cycle
#[derive(Debug)]
pub struct CycleHandle {
    ticket: CycleTicket,
    transactions: JoinHandle<CommitOutcome>,
    statistics: JoinHandle<CommitOutcome>,
    histogram: JoinHandle<CommitOutcome>,
}

impl CycleHandle {
    pub fn ticket(&self) -> &CycleTicket {
        &self.ticket
    }

    /// Wait for the three queries and collect their outcomes
    pub async fn wait(self) -> CycleReport {
        CycleReport {
            token: self.ticket.token,
            transactions: join_outcome(self.transactions).await,
            statistics: join_outcome(self.statistics).await,
            histogram: join_outcome(self.histogram).await,
        }
    }
}

async fn join_outcome(handle: JoinHandle<CommitOutcome>) -> CommitOutcome {
    handle.await.unwrap_or(CommitOutcome::Failed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Progress {
    latest: u64,
    remaining: u8,
}

#[derive(Debug, Default)]
struct ControllerState {
    display: DisplayState,
    progress: Progress,
}

/// Owner and sole writer of [`DisplayState`]
pub struct SyncController {
    gateway: GatewayRef,
    page_size: u32,
    state: RwLock<ControllerState>,
    progress_tx: watch::Sender<Progress>,
    discarded: AtomicU64,
    logger: Arc<dyn ErrorLogger>,
}

impl SyncController {
    pub fn new(gateway: GatewayRef) -> Self {
        let (progress_tx, _) = watch::channel(Progress::default());
        Self {
            gateway,
            page_size: SERVICE_PAGE_SIZE,
            state: RwLock::new(ControllerState::default()),
            progress_tx,
            discarded: AtomicU64::new(0),
            logger: Arc::new(DefaultErrorLogger),
        }
    }

    /// Use `page_size` when deriving total pages
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Report absorbed failures to `logger`
    pub fn with_logger(mut self, logger: Arc<dyn ErrorLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Snapshot of the committed display state
    pub async fn display(&self) -> DisplayState {
        self.state.read().await.display.clone()
    }

    /// Token of the most recently started cycle, 0 before the first
    pub fn latest_token(&self) -> u64 {
        self.progress_tx.borrow().latest
    }

    pub fn cycle_phase(&self) -> CyclePhase {
        let progress = *self.progress_tx.borrow();
        if progress.latest == 0 {
            CyclePhase::Idle
        } else if progress.remaining > 0 {
            CyclePhase::InFlight
        } else {
            CyclePhase::Settled
        }
    }

    /// Responses dropped because their cycle was superseded
    pub fn discarded_count(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }

    /// Register a new cycle for `snapshot`; every older cycle becomes stale
    pub async fn begin_cycle(&self, snapshot: FilterState) -> CycleTicket {
        let mut state = self.state.write().await;
        state.progress = Progress {
            latest: state.progress.latest + 1,
            remaining: FETCHES_PER_CYCLE,
        };
        self.progress_tx.send_replace(state.progress);

        let token = state.progress.latest;
        log::info!(
            target: "txdash::sync",
            "cycle {} started: month={} page={} search={:?}",
            token,
            snapshot.month,
            snapshot.page,
            snapshot.search_text
        );

        CycleTicket { token, snapshot }
    }

    /// Commit a transaction-list response and derive the page count
    pub async fn apply_transactions(
        &self,
        ticket: &CycleTicket,
        result: Result<PagedResult, GatewayError>,
    ) -> CommitOutcome {
        let page_size = self.page_size;
        let result = result.map_err(CoreError::from);
        self.apply(ticket, Endpoint::Transactions, result, move |display, paged| {
            display.total_pages = paged.total_pages(page_size);
            display.total_count = paged.total_count;
            display.transactions = paged.records;
            display.transactions_updated_at = Some(Utc::now());
        })
        .await
    }

    /// Commit a statistics response
    pub async fn apply_statistics(
        &self,
        ticket: &CycleTicket,
        result: Result<Statistics, GatewayError>,
    ) -> CommitOutcome {
        let result = result.map_err(CoreError::from);
        self.apply(ticket, Endpoint::Statistics, result, |display, stats| {
            display.stats = stats;
            display.stats_updated_at = Some(Utc::now());
        })
        .await
    }

    /// Commit a histogram response
    pub async fn apply_histogram(
        &self,
        ticket: &CycleTicket,
        result: Result<Vec<HistogramBucket>, GatewayError>,
    ) -> CommitOutcome {
        let result = result.map_err(CoreError::from);
        self.apply(ticket, Endpoint::Histogram, result, |display, buckets| {
            display.buckets = buckets;
            display.buckets_updated_at = Some(Utc::now());
        })
        .await
    }

    /// Resolve a query whose task died before producing a result
    async fn abandon(&self, ticket: &CycleTicket, endpoint: Endpoint, error: JoinError) -> CommitOutcome {
        let error = CoreError::InternalError {
            message: format!("{} query task failed: {}", endpoint, error),
        };
        self.apply::<(), _>(ticket, endpoint, Err(error), |_, ()| {}).await
    }

    async fn apply<T, F>(
        &self,
        ticket: &CycleTicket,
        endpoint: Endpoint,
        result: Result<T, CoreError>,
        commit: F,
    ) -> CommitOutcome
    where
        F: FnOnce(&mut DisplayState, T),
    {
        let mut state = self.state.write().await;

        if ticket.token != state.progress.latest {
            self.discarded.fetch_add(1, Ordering::Relaxed);
            log::debug!(
                target: "txdash::sync",
                "cycle {} {} response discarded ({}), latest is {}",
                ticket.token,
                endpoint,
                if result.is_ok() { "ok" } else { "failed" },
                state.progress.latest
            );
            return CommitOutcome::Discarded;
        }

        let outcome = match result {
            Ok(value) => {
                commit(&mut state.display, value);
                log::debug!(target: "txdash::sync", "cycle {} {} committed", ticket.token, endpoint);
                CommitOutcome::Committed
            }
            Err(error) => {
                let context = ErrorContext::new(format!("fetch {}", endpoint))
                    .with_cycle(ticket.token)
                    .with_data("month", serde_json::json!(ticket.snapshot.month.name()));
                self.logger.log_error(&error, &context);
                CommitOutcome::Failed
            }
        };

        state.progress.remaining = state.progress.remaining.saturating_sub(1);
        self.progress_tx.send_replace(state.progress);
        if state.progress.remaining == 0 {
            log::info!(target: "txdash::sync", "cycle {} settled", ticket.token);
        }

        outcome
    }

    /// Start a cycle and spawn its three queries
    ///
    /// Each gateway call runs in its own task; a call that panics resolves
    /// as `Failed` so the cycle still settles.
    pub async fn start_cycle(self: &Arc<Self>, snapshot: FilterState) -> CycleHandle {
        let ticket = self.begin_cycle(snapshot).await;

        let transactions = {
            let controller = Arc::clone(self);
            let ticket = ticket.clone();
            tokio::spawn(async move {
                let gateway = Arc::clone(&controller.gateway);
                let filter = ticket.snapshot().clone();
                let fetched = tokio::spawn(async move {
                    gateway
                        .fetch_transactions(filter.month, filter.page, &filter.search_text)
                        .await
                })
                .await;
                match fetched {
                    Ok(result) => controller.apply_transactions(&ticket, result).await,
                    Err(e) => controller.abandon(&ticket, Endpoint::Transactions, e).await,
                }
            })
        };

        let statistics = {
            let controller = Arc::clone(self);
            let ticket = ticket.clone();
            tokio::spawn(async move {
                let gateway = Arc::clone(&controller.gateway);
                let month = ticket.snapshot().month;
                match tokio::spawn(async move { gateway.fetch_statistics(month).await }).await {
                    Ok(result) => controller.apply_statistics(&ticket, result).await,
                    Err(e) => controller.abandon(&ticket, Endpoint::Statistics, e).await,
                }
            })
        };

        let histogram = {
            let controller = Arc::clone(self);
            let ticket = ticket.clone();
            tokio::spawn(async move {
                let gateway = Arc::clone(&controller.gateway);
                let month = ticket.snapshot().month;
                match tokio::spawn(async move { gateway.fetch_histogram(month).await }).await {
                    Ok(result) => controller.apply_histogram(&ticket, result).await,
                    Err(e) => controller.abandon(&ticket, Endpoint::Histogram, e).await,
                }
            })
        };

        CycleHandle {
            ticket,
            transactions,
            statistics,
            histogram,
        }
    }

    /// Start one cycle per received snapshot until the channel closes
    pub async fn run_listener(self: Arc<Self>, mut receiver: UnboundedReceiver<FilterState>) {
        while let Some(snapshot) = receiver.recv().await {
            // Queries keep running after the handle is dropped
            drop(self.start_cycle(snapshot).await);
        }
        log::info!(target: "txdash::sync", "filter channel closed, listener stopped");
    }

    /// Wait until cycle `token` (or a later one) has no outstanding queries
    pub async fn wait_settled(&self, token: u64) {
        let mut progress = self.progress_tx.subscribe();
        // The sender lives as long as `self`, so this cannot fail
        let _ = progress
            .wait_for(|p| p.latest >= token && p.remaining == 0)
            .await;
    }
}
