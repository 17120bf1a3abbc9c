//! Plain-text summary printed by `--view summary`.

use dashboard_core::formatting::{format_amount, format_count, format_number, format_rating, percentage};
use dashboard_core::time_utils::{day_key, month_label};
use dashboard_data::analysis::Dataset;

/// How many emerging markets the summary lists.
const TOP_MARKETS: usize = 5;

/// Render `dataset` as a multi-line report with amounts labelled `currency`.
pub fn render_summary(dataset: &Dataset, currency: &str) -> String {
    let mut out = vec![
        format!("Store report for {}", dataset.product_id),
        format!(
            "Files read: {} ({} skipped)",
            dataset.diagnostics.files_read,
            dataset.diagnostics.skipped_files.len()
        ),
        String::new(),
    ];

    if dataset.monthly_sales.is_empty() {
        out.push("No sales found.".to_string());
    } else {
        out.push("Monthly revenue".to_string());
        for m in &dataset.monthly_sales {
            out.push(format!(
                "  {:<10} {:>18} {:>8} tx",
                month_label(&m.month),
                format_amount(m.amount, currency),
                format_count(m.transactions)
            ));
        }
        let total = dataset.total_amount();
        out.push(format!(
            "  {:<10} {:>18} {:>8} tx",
            "Total",
            format_amount(total, currency),
            format_count(dataset.total_transactions())
        ));

        out.push(String::new());
        out.push("Revenue by SKU".to_string());
        for sku in &dataset.skus {
            let amount: f64 = dataset
                .sku_sales
                .iter()
                .filter(|s| &s.sku == sku)
                .map(|s| s.amount)
                .sum();
            out.push(format!(
                "  {:<24} {:>18} {:>6}%",
                sku,
                format_amount(amount, currency),
                format_number(percentage(amount, total, 1), 1)
            ));
        }
    }

    if let Some(last) = dataset.quality.last() {
        out.push(String::new());
        out.push(format!("Quality on {}", day_key(&last.date)));
        out.push(format!(
            "  crashes {} (7d avg {}), ANRs {} (7d avg {})",
            format_number(last.crashes, 0),
            format_number(last.crashes_ma7, 1),
            format_number(last.anrs, 0),
            format_number(last.anrs_ma7, 1)
        ));
        out.push(format!("  rating 21d avg {}", format_rating(last.rating_ma21)));
    }
    if let Some(last) = dataset.overview.last() {
        out.push(format!("  overall rating {}", format_rating(last.total_rating)));
    }

    if !dataset.emerging_markets.is_empty() {
        out.push(String::new());
        out.push("Emerging markets".to_string());
        for c in dataset.emerging_markets.iter().take(TOP_MARKETS) {
            out.push(format!(
                "  {} {:<22} {:>6} tx {:>18}  rating {}",
                c.country,
                c.name,
                format_count(c.transactions),
                format_amount(c.amount, currency),
                format_rating(c.latest_daily_rating)
            ));
        }
    }

    let diagnostics = &dataset.diagnostics;
    if diagnostics.has_warnings() {
        out.push(String::new());
        out.push("Warnings".to_string());
        for skipped in &diagnostics.skipped_files {
            out.push(format!("  skipped {}: {}", skipped.path.display(), skipped.reason));
        }
        if !diagnostics.unresolved_currencies.is_empty() {
            out.push(format!(
                "  no conversion rate for {}",
                diagnostics.unresolved_currencies.join(", ")
            ));
        }
    }

    let mut text = out.join("\n");
    text.push('\n');
    text
}
