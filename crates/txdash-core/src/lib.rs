//! View-state synchronization for the transaction dashboard
//!
//! - filter: month, search text and page with their reset rules
//! - gateway: the three remote queries (transactions, statistics, histogram)
//! - sync: fetch cycles, sequence tokens and stale-response discard
//! - dashboard: facade wiring the filter holder to the controller

pub mod dashboard;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod models;
pub mod sync;

pub use dashboard::{Dashboard, DashboardView};
pub use error::{
    CoreError, DefaultErrorLogger, ErrorContext, ErrorLogger, ErrorSeverity, GatewayError,
};
pub use filter::{FilterState, FilterStateHolder};
pub use gateway::{DataGateway, Endpoint, GatewayRef, HttpGateway};
pub use models::{
    total_pages_for, DisplayState, HistogramBucket, PagedResult, Statistics, TransactionId,
    TransactionRecord,
};
pub use sync::{CommitOutcome, CycleHandle, CyclePhase, CycleReport, CycleTicket, SyncController};
pub use txdash_config::Month;
