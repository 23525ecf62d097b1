//! Filter state holder
//!
//! Owns the month, search text and page dimensions. Every mutation that
//! changes the state publishes the new snapshot to all subscribers; the
//! synchronization controller subscribes once at startup.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use txdash_config::Month;

use crate::error::CoreError;

/// The three user-controlled filter dimensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub month: Month,
    pub search_text: String,
    /// 1-based page number
    pub page: u32,
}

impl FilterState {
    /// First page of `month` with no search text
    pub fn new(month: Month) -> Self {
        Self {
            month,
            search_text: String::new(),
            page: 1,
        }
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new(Month::default())
    }
}

/// Single owner of [`FilterState`]
#[derive(Debug)]
pub struct FilterStateHolder {
    state: FilterState,
    subscribers: Vec<UnboundedSender<FilterState>>,
    revision: u64,
}

impl FilterStateHolder {
    pub fn new(initial: FilterState) -> Self {
        Self {
            state: initial,
            subscribers: Vec::new(),
            revision: 0,
        }
    }

    /// Current filter state
    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// Number of snapshots published so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Receive every snapshot published from now on
    pub fn subscribe(&mut self) -> UnboundedReceiver<FilterState> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Select a month and go back to the first page
    pub fn set_month(&mut self, month: Month) -> bool {
        let next = FilterState {
            month,
            page: 1,
            ..self.state.clone()
        };
        self.commit(next)
    }

    /// Select a month by name
    pub fn set_month_name(&mut self, name: &str) -> Result<bool, CoreError> {
        let month = name
            .parse::<Month>()
            .map_err(|_| CoreError::InvalidMonth { value: name.to_string() })?;
        Ok(self.set_month(month))
    }

    /// Replace the search text and go back to the first page
    pub fn set_search_text(&mut self, text: impl Into<String>) -> bool {
        let next = FilterState {
            search_text: text.into(),
            page: 1,
            ..self.state.clone()
        };
        self.commit(next)
    }

    /// Jump to `page`, clamped to `[1, max(total_pages, 1)]`
    pub fn set_page(&mut self, page: u32, total_pages: u32) -> bool {
        let page = page.clamp(1, total_pages.max(1));
        let next = FilterState {
            page,
            ..self.state.clone()
        };
        self.commit(next)
    }

    /// Advance one page; a no-op on the last page
    pub fn next_page(&mut self, total_pages: u32) -> bool {
        let bound = total_pages.max(1);
        let page = self.state.page.saturating_add(1).min(bound);
        if page <= self.state.page {
            return false;
        }
        self.set_page(page, total_pages)
    }

    /// Go back one page; a no-op on the first page
    pub fn prev_page(&mut self) -> bool {
        let page = self.state.page.saturating_sub(1).max(1);
        if page >= self.state.page {
            return false;
        }
        let next = FilterState {
            page,
            ..self.state.clone()
        };
        self.commit(next)
    }

    /// Republish the current snapshot without changing it
    pub fn refresh(&mut self) {
        self.publish();
    }

    fn commit(&mut self, next: FilterState) -> bool {
        if next == self.state {
            return false;
        }
        self.state = next;
        self.publish();
        true
    }

    fn publish(&mut self) {
        self.revision += 1;
        let snapshot = self.state.clone();
        self.subscribers.retain(|tx| tx.send(snapshot.clone()).is_ok());
        log::debug!(
            target: "txdash::filter",
            "filter changed (rev {}): month={} page={} search={:?}",
            self.revision,
            snapshot.month,
            snapshot.page,
            snapshot.search_text
        );
    }
}

impl Default for FilterStateHolder {
    fn default() -> Self {
        Self::new(FilterState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holder_on_page(page: u32) -> FilterStateHolder {
        FilterStateHolder::new(FilterState {
            month: Month::March,
            search_text: "shirt".to_string(),
            page,
        })
    }

    #[test]
    fn test_set_month_resets_page() {
        for page in 2..=7 {
            let mut holder = holder_on_page(page);
            assert!(holder.set_month(Month::April));
            assert_eq!(holder.state().page, 1);
            assert_eq!(holder.state().month, Month::April);
            assert_eq!(holder.state().search_text, "shirt");
        }
    }

    #[test]
    fn test_same_month_still_resets_page() {
        let mut holder = holder_on_page(3);
        assert!(holder.set_month(Month::March));
        assert_eq!(holder.state().page, 1);
    }

    #[test]
    fn test_set_search_text_resets_page() {
        for page in 2..=7 {
            let mut holder = holder_on_page(page);
            assert!(holder.set_search_text(""));
            assert_eq!(holder.state().page, 1);
            assert_eq!(holder.state().search_text, "");
            assert_eq!(holder.state().month, Month::March);
        }
    }

    #[test]
    fn test_set_page_keeps_other_dimensions() {
        let mut holder = holder_on_page(1);
        assert!(holder.set_page(4, 9));
        assert_eq!(holder.state().page, 4);
        assert_eq!(holder.state().month, Month::March);
        assert_eq!(holder.state().search_text, "shirt");
    }

    #[test]
    fn test_set_page_clamps() {
        let mut holder = holder_on_page(1);
        holder.set_page(50, 3);
        assert_eq!(holder.state().page, 3);
        holder.set_page(0, 3);
        assert_eq!(holder.state().page, 1);
        holder.set_page(2, 0);
        assert_eq!(holder.state().page, 1);
    }

    #[test]
    fn test_boundary_navigation_is_idempotent() {
        let mut holder = holder_on_page(1);
        assert!(!holder.prev_page());
        assert_eq!(holder.state().page, 1);

        let mut holder = holder_on_page(3);
        assert!(!holder.next_page(3));
        assert_eq!(holder.state().page, 3);

        let mut holder = holder_on_page(1);
        assert!(!holder.next_page(0));
        assert_eq!(holder.state().page, 1);
    }

    #[test]
    fn test_next_and_prev_page() {
        let mut holder = holder_on_page(1);
        assert!(holder.next_page(3));
        assert!(holder.next_page(3));
        assert_eq!(holder.state().page, 3);
        assert!(holder.prev_page());
        assert_eq!(holder.state().page, 2);
    }

    #[test]
    fn test_next_page_does_not_pull_out_of_range_page_back() {
        // Narrowed results leave the page beyond the bound; next must not move it
        let mut holder = holder_on_page(3);
        assert!(!holder.next_page(1));
        assert_eq!(holder.state().page, 3);
        assert!(holder.prev_page());
        assert_eq!(holder.state().page, 2);
    }

    #[test]
    fn test_set_month_name() {
        let mut holder = holder_on_page(2);
        assert!(holder.set_month_name("june").unwrap());
        assert_eq!(holder.state().month, Month::June);

        let err = holder.set_month_name("Smarch").unwrap_err();
        assert!(matches!(err, CoreError::InvalidMonth { .. }));
        assert_eq!(holder.state().month, Month::June);
    }

    #[tokio::test]
    async fn test_subscribers_receive_changes_only() {
        let mut holder = holder_on_page(1);
        let mut rx = holder.subscribe();

        holder.prev_page();
        holder.set_page(2, 5);
        holder.set_page(2, 5);
        holder.set_search_text("bag");
        holder.refresh();

        assert_eq!(rx.recv().await.unwrap().page, 2);
        let searched = rx.recv().await.unwrap();
        assert_eq!(searched.search_text, "bag");
        assert_eq!(searched.page, 1);
        assert_eq!(rx.recv().await.unwrap(), searched);
        assert!(rx.try_recv().is_err());
        assert_eq!(holder.revision(), 3);
    }

    #[test]
    fn test_closed_subscribers_are_dropped() {
        let mut holder = FilterStateHolder::default();
        let rx = holder.subscribe();
        drop(rx);
        assert!(holder.set_month(Month::May));
        assert!(holder.subscribers.is_empty());
    }
}
