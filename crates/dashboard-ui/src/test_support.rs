//! Fixtures shared by the view tests.

use chrono::NaiveDate;
use ratatui::buffer::Buffer;

use dashboard_core::models::{CountryRatingRecord, CrashRecord, OverviewRatingRecord, SalesRecord};
use dashboard_data::aggregator::ReportAggregator;
use dashboard_data::analysis::{Dataset, Diagnostics};
use dashboard_data::currency::CurrencyRates;

/// Rendered buffer as plain text, one line per row.
pub fn buffer_text(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut out = String::new();
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            out.push_str(buffer[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

fn sale(day: Option<NaiveDate>, sku: &str, country: &str, amount: f64) -> SalesRecord {
    SalesRecord {
        transaction_date: day,
        transaction_type: "Charge".to_string(),
        product_id: "com.example.app".to_string(),
        sku_id: sku.to_string(),
        buyer_country: country.to_string(),
        buyer_currency: "EUR".to_string(),
        charged_amount: Some(amount),
        conversion_rate: Some(1.0),
        merchant_amount: Some(amount),
    }
}

fn rating(day: Option<NaiveDate>, country: &str, daily: f64, total: f64) -> CountryRatingRecord {
    CountryRatingRecord {
        date: day,
        country: country.to_string(),
        daily_average_rating: Some(daily),
        total_average_rating: Some(total),
    }
}

/// Two months of sales (premium in January, dice in February) across
/// US, NL and BR, with two days of crash and rating data.
pub fn sample_dataset() -> Dataset {
    let sales = vec![
        sale(date(2024, 1, 5), "premium", "US", 10.0),
        sale(date(2024, 1, 9), "premium", "NL", 8.0),
        sale(date(2024, 1, 20), "premium", "BR", 5.0),
        sale(date(2024, 2, 2), "dice", "BR", 9.0),
        sale(date(2024, 2, 14), "dice", "US", 9.0),
    ];
    let crashes = vec![
        CrashRecord {
            date: date(2024, 1, 1),
            daily_crashes: Some(4.0),
            daily_anrs: Some(1.0),
        },
        CrashRecord {
            date: date(2024, 1, 2),
            daily_crashes: Some(2.0),
            daily_anrs: Some(0.0),
        },
    ];
    let ratings = vec![
        rating(date(2024, 1, 1), "US", 4.0, 4.2),
        rating(date(2024, 1, 2), "US", 5.0, 4.3),
        rating(date(2024, 1, 2), "NL", 3.0, 3.9),
        rating(date(2024, 1, 2), "BR", 4.5, 4.6),
    ];
    let overview = vec![
        OverviewRatingRecord {
            date: date(2024, 1, 1),
            daily_average_rating: Some(4.0),
            total_average_rating: Some(4.25),
        },
        OverviewRatingRecord {
            date: date(2024, 1, 2),
            daily_average_rating: Some(4.5),
            total_average_rating: Some(4.26),
        },
    ];

    let sku_sales = ReportAggregator::sku_monthly_sales(&sales);
    let countries = ReportAggregator::country_rollup(&sales, &ratings);

    Dataset {
        product_id: "com.example.app".to_string(),
        monthly_sales: ReportAggregator::monthly_sales(&sales),
        skus: ReportAggregator::skus(&sku_sales),
        sku_sales,
        quality: ReportAggregator::quality_series(&crashes, &ratings),
        overview: ReportAggregator::overview_series(&overview),
        emerging_markets: ReportAggregator::emerging_markets(&countries),
        countries,
        currency_rates: CurrencyRates::from_pairs([("EUR", 1.0), ("USD", 0.9)]),
        diagnostics: Diagnostics {
            files_read: 4,
            ..Default::default()
        },
    }
}
