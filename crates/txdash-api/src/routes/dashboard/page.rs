//! Dashboard page rendering
//!
//! Endpoints:
//! - page_dashboard: full page with month selector and search box
//!
//! Helper functions:
//! - render_content: table, pager, statistics and chart partial

use chrono::{DateTime, Utc};
use txdash_core::{DashboardView, DisplayState, HistogramBucket, Month, TransactionRecord};
use txdash_utils::{escape_html, format_amount, format_number};

use crate::AppState;

/// Dashboard page - filter controls around the swappable content area
pub async fn page_dashboard(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> axum::response::Html<String> {
    let view = state.dashboard.view().await;

    let inner_content = format!(
        r#"<div class='flex items-center justify-between mb-6'>
            <h2 class='text-2xl font-bold'>Transactions</h2>
            <div class='flex gap-2'>
                <input type='text' name='searchText' value='{}' placeholder='Search transaction'
                    hx-post='/dashboard/search' hx-target='#dashboard-content' hx-trigger='keyup changed delay:400ms'
                    class='px-4 py-2 border rounded-lg w-56'>
                <select name='month' hx-post='/dashboard/month' hx-target='#dashboard-content' hx-trigger='change'
                    class='px-4 py-2 border rounded-lg'>
                    {}
                </select>
                <button hx-post='/dashboard/refresh' hx-target='#dashboard-content'
                    class='px-4 py-2 bg-gray-100 text-gray-700 rounded-lg hover:bg-gray-200' title='Reload data'>Refresh</button>
            </div>
        </div>
        <div id='dashboard-content'>
            {}
        </div>"#,
        escape_html(&view.filter.search_text),
        render_month_options(view.filter.month),
        render_content(&view, false)
    );

    axum::response::Html(crate::page_response(&headers, "Dashboard", &inner_content))
}

fn render_month_options(selected: Month) -> String {
    Month::ALL
        .iter()
        .map(|month| {
            format!(
                "<option value='{}'{}>{}</option>",
                month.name(),
                if *month == selected { " selected" } else { "" },
                month.name()
            )
        })
        .collect()
}

/// Render the content partial for `view`
///
/// While a cycle is outstanding (or `pending` says one is about to start)
/// the partial polls itself until the cycle settles.
pub fn render_content(view: &DashboardView, pending: bool) -> String {
    let display = &view.display;
    let loading = pending || view.phase == txdash_core::CyclePhase::InFlight;

    let poll = if loading {
        "<div hx-get='/dashboard/content' hx-trigger='load delay:300ms' hx-target='#dashboard-content'></div>\
         <p class='text-sm text-gray-500 mb-2'>Loading...</p>"
    } else {
        ""
    };

    let notice = if view.is_page_out_of_range() {
        format!(
            r#"<div class='p-3 mb-4 bg-yellow-50 text-yellow-800 rounded-lg border border-yellow-200'>Page {} is past the last page ({}). Use Previous to go back.</div>"#,
            view.filter.page,
            display.page_bound()
        )
    } else {
        String::new()
    };

    format!(
        r#"{}{}
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            {}
            {}
        </div>
        <div class='grid grid-cols-1 lg:grid-cols-2 gap-6'>
            {}
            {}
        </div>"#,
        poll,
        notice,
        render_transaction_table(&display.transactions),
        render_pager(view),
        render_statistics(view.filter.month, display),
        render_chart(view.filter.month, &display.buckets, display.max_bucket_items())
    )
}

fn render_transaction_table(records: &[TransactionRecord]) -> String {
    if records.is_empty() {
        return r#"<div class='text-center py-12 text-gray-500'><p>No transactions available</p></div>"#.to_string();
    }

    let mut html = String::from(
        r#"<div class='overflow-x-auto'>
        <table class='w-full'>
            <thead class='bg-gray-50'>
                <tr>
                    <th class='px-4 py-3 text-left text-sm font-medium text-gray-600'>ID</th>
                    <th class='px-4 py-3 text-left text-sm font-medium text-gray-600'>Title</th>
                    <th class='px-4 py-3 text-left text-sm font-medium text-gray-600'>Description</th>
                    <th class='px-4 py-3 text-right text-sm font-medium text-gray-600'>Price</th>
                    <th class='px-4 py-3 text-left text-sm font-medium text-gray-600'>Category</th>
                    <th class='px-4 py-3 text-left text-sm font-medium text-gray-600'>Sold</th>
                    <th class='px-4 py-3 text-left text-sm font-medium text-gray-600'>Image</th>
                </tr>
            </thead>
            <tbody class='divide-y divide-gray-100'>"#,
    );

    for record in records {
        let sold = match record.sold {
            Some(true) => "Yes",
            Some(false) => "No",
            None => "-",
        };
        let image = record
            .image
            .as_deref()
            .map(|url| format!("<img src='{}' alt='' class='h-10 w-10 object-cover rounded'>", escape_html(url)))
            .unwrap_or_default();

        html.push_str(&format!(
            r#"<tr class='hover:bg-gray-50'>
                <td class='px-4 py-3 text-sm text-gray-500'>{}</td>
                <td class='px-4 py-3 font-medium'>{}</td>
                <td class='px-4 py-3 text-sm text-gray-600'>{}</td>
                <td class='px-4 py-3 text-right'>{}</td>
                <td class='px-4 py-3 text-sm'>{}</td>
                <td class='px-4 py-3 text-sm'>{}</td>
                <td class='px-4 py-3'>{}</td>
            </tr>"#,
            escape_html(&record.id.to_string()),
            escape_html(&record.title),
            escape_html(&record.description),
            format_amount(record.price),
            escape_html(record.category.as_deref().unwrap_or("-")),
            sold,
            image
        ));
    }

    html.push_str("</tbody></table></div>");
    html
}

fn render_pager(view: &DashboardView) -> String {
    format!(
        r#"<div class='flex items-center justify-between mt-4'>
            <p class='text-sm text-gray-600'>Page {} of {}</p>
            <div class='flex gap-2'>
                {}
                {}
            </div>
        </div>"#,
        view.filter.page,
        view.display.page_bound(),
        pager_button("prev-page", "/dashboard/prev", "Previous", view.can_go_prev()),
        pager_button("next-page", "/dashboard/next", "Next", view.can_go_next())
    )
}

fn pager_button(id: &str, path: &str, label: &str, enabled: bool) -> String {
    let (disabled, class) = if enabled {
        ("", "bg-indigo-600 text-white hover:bg-indigo-700")
    } else {
        (" disabled", "bg-gray-100 text-gray-400 cursor-not-allowed")
    };
    format!(
        "<button id='{}'{} hx-post='{}' hx-target='#dashboard-content' class='px-4 py-2 rounded-lg {}'>{}</button>",
        id, disabled, path, class, label
    )
}

fn render_statistics(month: Month, display: &DisplayState) -> String {
    let stats = &display.stats;
    format!(
        r#"<div class='bg-white rounded-xl shadow-sm p-6'>
            <h3 class='text-lg font-semibold mb-4'>Statistics - {}</h3>
            <div class='grid grid-cols-3 gap-4'>
                <div class='text-center p-4 bg-green-50 rounded-lg'><p class='text-sm text-green-600'>Total sale</p><p class='text-xl font-bold'>{}</p></div>
                <div class='text-center p-4 bg-blue-50 rounded-lg'><p class='text-sm text-blue-600'>Sold items</p><p class='text-xl font-bold'>{}</p></div>
                <div class='text-center p-4 bg-red-50 rounded-lg'><p class='text-sm text-red-600'>Not sold items</p><p class='text-xl font-bold'>{}</p></div>
            </div>
            {}
        </div>"#,
        month,
        format_amount(stats.total_sale_amount),
        format_number(stats.total_sold_items),
        format_number(stats.total_not_sold_items),
        render_updated_at(display.stats_updated_at)
    )
}

fn render_chart(month: Month, buckets: &[HistogramBucket], max_items: u64) -> String {
    let body = if buckets.is_empty() {
        r#"<div class='text-center py-12 text-gray-500'><p>No chart data available</p></div>"#.to_string()
    } else {
        let bars: String = buckets
            .iter()
            .map(|bucket| {
                let height = bar_height(bucket.num_items, max_items);
                format!(
                    r#"<div class='flex-1 flex flex-col items-center justify-end h-full' title='{} items'>
                        <span class='text-xs text-gray-600 mb-1'>{}</span>
                        <div class='w-full bg-indigo-500 rounded-t' style='height: {}%'></div>
                        <span class='text-xs text-gray-500 mt-1'>{}</span>
                    </div>"#,
                    bucket.num_items,
                    format_number(bucket.num_items),
                    height,
                    escape_html(&bucket.price_range)
                )
            })
            .collect();
        format!("<div class='flex items-end gap-2 h-56'>{}</div>", bars)
    };

    format!(
        r#"<div class='bg-white rounded-xl shadow-sm p-6'>
            <h3 class='text-lg font-semibold mb-4'>Price Range - {}</h3>
            {}
        </div>"#,
        month, body
    )
}

/// Bar height as a percentage of the largest bucket
fn bar_height(items: u64, max_items: u64) -> u64 {
    if max_items == 0 {
        return 0;
    }
    let percent = u128::from(items.min(max_items)) * 100 / u128::from(max_items);
    u64::try_from(percent).unwrap_or(100)
}

fn render_updated_at(updated_at: Option<DateTime<Utc>>) -> String {
    match updated_at {
        Some(ts) => format!(
            "<p class='text-xs text-gray-400 mt-3'>Updated {}</p>",
            ts.format("%H:%M:%S UTC")
        ),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use txdash_core::{CyclePhase, FilterState, Statistics, TransactionId};

    fn view(page: u32, total_count: u64, records: Vec<TransactionRecord>) -> DashboardView {
        let display = DisplayState {
            transactions: records,
            total_count,
            total_pages: txdash_core::total_pages_for(total_count, 10),
            stats: Statistics {
                total_sale_amount: 12345.5,
                total_sold_items: 1200,
                total_not_sold_items: 3,
            },
            buckets: vec![
                HistogramBucket { price_range: "0-100".to_string(), num_items: 8 },
                HistogramBucket { price_range: "101-200".to_string(), num_items: 2 },
            ],
            ..DisplayState::default()
        };
        DashboardView {
            filter: FilterState { page, ..FilterState::new(Month::March) },
            display,
            phase: CyclePhase::Settled,
            latest_token: 1,
        }
    }

    #[test]
    fn test_empty_table_placeholder() {
        let html = render_content(&view(1, 0, Vec::new()), false);
        assert!(html.contains("No transactions available"));
        assert!(html.contains("Page 1 of 1"));
        assert!(html.contains("id='prev-page' disabled"));
        assert!(html.contains("id='next-page' disabled"));
        assert!(!html.contains("Loading..."));
    }

    #[test]
    fn test_rows_are_escaped() {
        let record = TransactionRecord::new(TransactionId::Number(1), "<b>Bag</b>", "it's new", 1099.5);
        let html = render_content(&view(1, 1, vec![record]), false);
        assert!(html.contains("&lt;b&gt;Bag&lt;/b&gt;"));
        assert!(html.contains("it&#39;s new"));
        assert!(html.contains("1,099.50"));
        assert!(!html.contains("<b>Bag</b>"));
    }

    #[test]
    fn test_pager_and_statistics() {
        let html = render_content(&view(2, 23, Vec::new()), false);
        assert!(html.contains("Page 2 of 3"));
        assert!(html.contains("id='prev-page' hx-post"));
        assert!(html.contains("id='next-page' hx-post"));
        assert!(html.contains("Statistics - March"));
        assert!(html.contains("12,345.50"));
        assert!(html.contains("1,200"));
    }

    #[test]
    fn test_out_of_range_notice() {
        let html = render_content(&view(3, 5, Vec::new()), false);
        assert!(html.contains("Page 3 is past the last page (1)"));
        assert!(html.contains("id='next-page' disabled"));
    }

    #[test]
    fn test_pending_content_polls() {
        let html = render_content(&view(1, 0, Vec::new()), true);
        assert!(html.contains("hx-trigger='load delay:300ms'"));
    }

    #[test]
    fn test_bar_heights_scale_to_largest_bucket() {
        assert_eq!(bar_height(8, 8), 100);
        assert_eq!(bar_height(2, 8), 25);
        assert_eq!(bar_height(0, 0), 0);
    }

    #[test]
    fn test_bar_heights_for_huge_counts() {
        assert_eq!(bar_height(u64::MAX / 2, u64::MAX / 2), 100);
        assert_eq!(bar_height(u64::MAX / 4, u64::MAX / 2), 49);
        assert_eq!(bar_height(u64::MAX, u64::MAX), 100);
        assert_eq!(bar_height(1, u64::MAX), 0);

        let html = render_content(&view(1, 0, Vec::new()), false);
        assert!(html.contains("height: 100%"));
        assert!(html.contains("height: 25%"));
    }

    #[test]
    fn test_month_options_mark_selection() {
        let options = render_month_options(Month::April);
        assert_eq!(options.matches("<option").count(), 12);
        assert!(options.contains("<option value='April' selected>April</option>"));
        assert!(options.contains("<option value='March'>March</option>"));
    }
}
