//! Data models shared by the gateway, the controller and the view

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transaction identifier, numeric or textual depending on the service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransactionId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionId::Number(n) => write!(f, "{}", n),
            TransactionId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A single ledger transaction as returned by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// Unique identifier
    pub id: TransactionId,
    /// Product title
    #[serde(default)]
    pub title: String,
    /// Product description
    #[serde(default)]
    pub description: String,
    /// Sale price
    pub price: f64,
    /// Product category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Whether the item sold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold: Option<bool>,
    /// Date of sale as sent by the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_sale: Option<String>,
    /// Image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl TransactionRecord {
    /// Minimal record with only the required fields set
    pub fn new(id: TransactionId, title: impl Into<String>, description: impl Into<String>, price: f64) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            price,
            category: None,
            sold: None,
            date_of_sale: None,
            image: None,
        }
    }
}

/// One page of transactions plus the total number of matches
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PagedResult {
    pub records: Vec<TransactionRecord>,
    pub total_count: u64,
}

impl PagedResult {
    /// Number of pages needed for `total_count` at `page_size`
    pub fn total_pages(&self, page_size: u32) -> u32 {
        total_pages_for(self.total_count, page_size)
    }
}

/// Wire shape of the transaction list response
#[derive(Debug, Deserialize)]
pub(crate) struct TransactionsPayload {
    #[serde(default)]
    pub transactions: Option<Vec<TransactionRecord>>,
    pub total: u64,
}

impl From<TransactionsPayload> for PagedResult {
    fn from(payload: TransactionsPayload) -> Self {
        Self {
            records: payload.transactions.unwrap_or_default(),
            total_count: payload.total,
        }
    }
}

/// `ceil(total_count / page_size)`, zero when there is nothing to show
pub fn total_pages_for(total_count: u64, page_size: u32) -> u32 {
    let page_size = u64::from(page_size.max(1));
    let pages = total_count.div_ceil(page_size);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Monthly aggregate statistics
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_sale_amount: f64,
    pub total_sold_items: u64,
    pub total_not_sold_items: u64,
}

/// One bar of the price-range histogram
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramBucket {
    pub price_range: String,
    pub num_items: u64,
}

/// Render-visible snapshot, written only by the synchronization controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayState {
    /// Current page of transactions
    pub transactions: Vec<TransactionRecord>,
    /// Matches across all pages
    pub total_count: u64,
    /// `ceil(total_count / page_size)`
    pub total_pages: u32,
    /// Monthly statistics
    pub stats: Statistics,
    /// Histogram buckets in service order
    pub buckets: Vec<HistogramBucket>,
    /// Last commit of the transaction fields
    pub transactions_updated_at: Option<DateTime<Utc>>,
    /// Last commit of the statistics
    pub stats_updated_at: Option<DateTime<Utc>>,
    /// Last commit of the histogram
    pub buckets_updated_at: Option<DateTime<Utc>>,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            transactions: Vec::new(),
            total_count: 0,
            total_pages: 1,
            stats: Statistics::default(),
            buckets: Vec::new(),
            transactions_updated_at: None,
            stats_updated_at: None,
            buckets_updated_at: None,
        }
    }
}

impl DisplayState {
    /// Highest page navigation may reach; never below 1
    pub fn page_bound(&self) -> u32 {
        self.total_pages.max(1)
    }

    /// Largest bucket count, used to scale the chart
    pub fn max_bucket_items(&self) -> u64 {
        self.buckets.iter().map(|b| b.num_items).max().unwrap_or(0)
    }

    /// True once every field group has been committed at least once
    pub fn is_fully_loaded(&self) -> bool {
        self.transactions_updated_at.is_some()
            && self.stats_updated_at.is_some()
            && self.buckets_updated_at.is_some()
    }
}
