#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use txdash_core::{
    DataGateway, Endpoint, GatewayError, HistogramBucket, Month, PagedResult, Statistics,
    TransactionId, TransactionRecord,
};

/// A recorded gateway call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub endpoint: Endpoint,
    pub month: Month,
    pub page: u32,
    pub search_text: String,
}

/// In-memory service with per-month record counts, injectable failures and
/// gates that hold a transaction response until released
#[derive(Default)]
pub struct ScriptedGateway {
    totals: Mutex<HashMap<Month, u64>>,
    failing: Mutex<HashSet<Endpoint>>,
    gates: Mutex<HashMap<(Month, u32), Arc<Notify>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_month(self, month: Month, total: u64) -> Self {
        self.set_total(month, total);
        self
    }

    pub fn set_total(&self, month: Month, total: u64) {
        self.totals.lock().unwrap().insert(month, total);
    }

    pub fn fail(&self, endpoint: Endpoint) {
        self.failing.lock().unwrap().insert(endpoint);
    }

    pub fn recover(&self, endpoint: Endpoint) {
        self.failing.lock().unwrap().remove(&endpoint);
    }

    /// Hold the transaction response for `month`/`page` until the returned gate is notified
    pub fn hold(&self, month: Month, page: u32) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert((month, page), Arc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, endpoint: Endpoint, month: Month, page: u32, search_text: &str) {
        self.calls.lock().unwrap().push(Call {
            endpoint,
            month,
            page,
            search_text: search_text.to_string(),
        });
    }

    fn check(&self, endpoint: Endpoint) -> Result<(), GatewayError> {
        if self.failing.lock().unwrap().contains(&endpoint) {
            return Err(GatewayError::Status {
                endpoint,
                status: 503,
                body: "service unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn total(&self, month: Month) -> u64 {
        self.totals.lock().unwrap().get(&month).copied().unwrap_or(0)
    }

    fn records(&self, month: Month, search_text: &str) -> Vec<TransactionRecord> {
        let needle = search_text.to_lowercase();
        (0..self.total(month))
            .map(|n| {
                TransactionRecord::new(
                    TransactionId::Number(month.number() as i64 * 1000 + n as i64),
                    format!("{} item {}", month, n),
                    format!("Sold in {}", month),
                    10.0 + n as f64,
                )
            })
            .filter(|r| {
                needle.is_empty()
                    || r.title.to_lowercase().contains(&needle)
                    || r.description.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

#[async_trait]
impl DataGateway for ScriptedGateway {
    async fn fetch_transactions(
        &self,
        month: Month,
        page: u32,
        search_text: &str,
    ) -> Result<PagedResult, GatewayError> {
        self.record(Endpoint::Transactions, month, page, search_text);
        let gate = self.gates.lock().unwrap().get(&(month, page)).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.check(Endpoint::Transactions)?;

        let matching = self.records(month, search_text);
        let total_count = matching.len() as u64;
        let records = matching
            .into_iter()
            .skip((page.saturating_sub(1) * 10) as usize)
            .take(10)
            .collect();
        Ok(PagedResult { records, total_count })
    }

    async fn fetch_statistics(&self, month: Month) -> Result<Statistics, GatewayError> {
        self.record(Endpoint::Statistics, month, 0, "");
        self.check(Endpoint::Statistics)?;
        let total = self.total(month);
        Ok(Statistics {
            total_sale_amount: total as f64 * 10.0,
            total_sold_items: total / 2,
            total_not_sold_items: total - total / 2,
        })
    }

    async fn fetch_histogram(&self, month: Month) -> Result<Vec<HistogramBucket>, GatewayError> {
        self.record(Endpoint::Histogram, month, 0, "");
        self.check(Endpoint::Histogram)?;
        Ok(vec![
            HistogramBucket { price_range: "0-100".to_string(), num_items: self.total(month) },
            HistogramBucket { price_range: "101-200".to_string(), num_items: 0 },
        ])
    }
}

/// Poll `condition` until it holds, failing the test after five seconds
pub async fn eventually<F: Fn() -> bool>(condition: F) {
    let wait = async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    };
    tokio::time::timeout(Duration::from_secs(5), wait)
        .await
        .expect("condition not reached in time");
}

/// Run `future` with a five second limit
pub async fn within<T>(future: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(5), future)
        .await
        .expect("timed out")
}
