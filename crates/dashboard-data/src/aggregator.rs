//! Sales, quality and country aggregation over normalized records.
//!
//! Every function here is a pure function of its inputs; grouping uses
//! `BTreeMap` so the output order is stable across runs.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use dashboard_core::country::country_name;
use dashboard_core::models::{CountryRatingRecord, CrashRecord, OverviewRatingRecord, SalesRecord};
use serde::Serialize;

/// Trailing window for crash and ANR moving averages.
pub const CRASH_WINDOW: usize = 7;
/// Trailing window for rating moving averages.
pub const RATING_WINDOW: usize = 21;

/// Country code excluded from the emerging-markets view.
pub const HOME_MARKET: &str = "US";

// ── Aggregate rows ────────────────────────────────────────────────────────────

/// Merchant-currency revenue for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySales {
    /// `"%Y-%m"` key.
    pub month: String,
    pub amount: f64,
    pub transactions: u64,
}

/// Revenue for one SKU in one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkuMonthlySales {
    pub sku: String,
    pub month: String,
    pub amount: f64,
    pub transactions: u64,
}

/// One day of crash and rating data with trailing averages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityPoint {
    pub date: NaiveDate,
    pub crashes: f64,
    pub anrs: f64,
    /// Mean daily rating across countries that reported one.
    pub rating: Option<f64>,
    pub crashes_ma7: f64,
    pub anrs_ma7: f64,
    pub rating_ma21: Option<f64>,
}

/// One day of the all-countries rating export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewPoint {
    pub date: NaiveDate,
    pub daily_rating: Option<f64>,
    pub total_rating: Option<f64>,
    pub daily_rating_ma21: Option<f64>,
}

/// Sales and rating totals for one buyer country.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryStats {
    /// ISO alpha-2 code.
    pub country: String,
    /// English short name, or the code when unknown.
    pub name: String,
    pub transactions: u64,
    pub amount: f64,
    pub latest_daily_rating: Option<f64>,
    pub latest_total_rating: Option<f64>,
}

// ── ReportAggregator ──────────────────────────────────────────────────────────

/// Stateless helper grouping normalized records into dashboard tables.
pub struct ReportAggregator;

impl ReportAggregator {
    /// Revenue per month, ascending.  Rows without a date are ignored and
    /// missing merchant amounts add nothing to the sum but still count.
    pub fn monthly_sales(records: &[SalesRecord]) -> Vec<MonthlySales> {
        let mut months: BTreeMap<String, (f64, u64)> = BTreeMap::new();
        for record in records {
            if let Some(month) = record.month() {
                let slot = months.entry(month).or_insert((0.0, 0));
                slot.0 += record.merchant_amount.unwrap_or(0.0);
                slot.1 += 1;
            }
        }

        months
            .into_iter()
            .map(|(month, (amount, transactions))| MonthlySales {
                month,
                amount,
                transactions,
            })
            .collect()
    }

    /// Revenue per `(sku, month)`, sorted by SKU then month.
    pub fn sku_monthly_sales(records: &[SalesRecord]) -> Vec<SkuMonthlySales> {
        let mut cells: BTreeMap<(String, String), (f64, u64)> = BTreeMap::new();
        for record in records {
            if let Some(month) = record.month() {
                let slot = cells
                    .entry((record.sku_id.clone(), month))
                    .or_insert((0.0, 0));
                slot.0 += record.merchant_amount.unwrap_or(0.0);
                slot.1 += 1;
            }
        }

        cells
            .into_iter()
            .map(|((sku, month), (amount, transactions))| SkuMonthlySales {
                sku,
                month,
                amount,
                transactions,
            })
            .collect()
    }

    /// Distinct SKUs appearing in `sales`, sorted.
    pub fn skus(sales: &[SkuMonthlySales]) -> Vec<String> {
        let mut skus: Vec<String> = sales.iter().map(|s| s.sku.clone()).collect();
        skus.dedup();
        skus
    }

    /// One SKU's series reindexed against `months`; absent months are zero.
    pub fn sku_series(sales: &[SkuMonthlySales], sku: &str, months: &[String]) -> Vec<SkuMonthlySales> {
        let by_month: BTreeMap<&str, &SkuMonthlySales> = sales
            .iter()
            .filter(|s| s.sku == sku)
            .map(|s| (s.month.as_str(), s))
            .collect();

        months
            .iter()
            .map(|month| match by_month.get(month.as_str()) {
                Some(found) => (*found).clone(),
                None => SkuMonthlySales {
                    sku: sku.to_string(),
                    month: month.clone(),
                    amount: 0.0,
                    transactions: 0,
                },
            })
            .collect()
    }

    /// Daily crash/rating series over the union of crash and rating dates.
    ///
    /// Crash and ANR counts take the first value reported for a date; the
    /// rating is the mean over countries that reported one.
    pub fn quality_series(crashes: &[CrashRecord], ratings: &[CountryRatingRecord]) -> Vec<QualityPoint> {
        #[derive(Default)]
        struct Day {
            crashes: Option<f64>,
            anrs: Option<f64>,
            rating_sum: f64,
            rating_count: u32,
        }

        let mut days: BTreeMap<NaiveDate, Day> = BTreeMap::new();
        for record in crashes {
            let Some(date) = record.date else { continue };
            let day = days.entry(date).or_default();
            day.crashes = day.crashes.or(record.daily_crashes);
            day.anrs = day.anrs.or(record.daily_anrs);
        }
        for record in ratings {
            let Some(date) = record.date else { continue };
            let day = days.entry(date).or_default();
            if let Some(rating) = record.daily_average_rating {
                day.rating_sum += rating;
                day.rating_count += 1;
            }
        }

        let dates: Vec<NaiveDate> = days.keys().copied().collect();
        let crash_values: Vec<Option<f64>> = days.values().map(|d| Some(d.crashes.unwrap_or(0.0))).collect();
        let anr_values: Vec<Option<f64>> = days.values().map(|d| Some(d.anrs.unwrap_or(0.0))).collect();
        let ratings: Vec<Option<f64>> = days
            .values()
            .map(|d| (d.rating_count > 0).then(|| d.rating_sum / f64::from(d.rating_count)))
            .collect();

        let crashes_ma = trailing_mean(&crash_values, CRASH_WINDOW);
        let anrs_ma = trailing_mean(&anr_values, CRASH_WINDOW);
        let rating_ma = trailing_mean(&ratings, RATING_WINDOW);

        dates
            .into_iter()
            .enumerate()
            .map(|(i, date)| QualityPoint {
                date,
                crashes: crash_values[i].unwrap_or(0.0),
                anrs: anr_values[i].unwrap_or(0.0),
                rating: ratings[i],
                crashes_ma7: crashes_ma[i].unwrap_or(0.0),
                anrs_ma7: anrs_ma[i].unwrap_or(0.0),
                rating_ma21: rating_ma[i],
            })
            .collect()
    }

    /// Daily all-countries rating series with a trailing average.
    pub fn overview_series(records: &[OverviewRatingRecord]) -> Vec<OverviewPoint> {
        let mut days: BTreeMap<NaiveDate, (Option<f64>, Option<f64>)> = BTreeMap::new();
        for record in records {
            let Some(date) = record.date else { continue };
            let day = days.entry(date).or_insert((None, None));
            day.0 = day.0.or(record.daily_average_rating);
            day.1 = day.1.or(record.total_average_rating);
        }

        let daily: Vec<Option<f64>> = days.values().map(|d| d.0).collect();
        let ma = trailing_mean(&daily, RATING_WINDOW);

        days.into_iter()
            .zip(ma)
            .map(|((date, (daily_rating, total_rating)), daily_rating_ma21)| OverviewPoint {
                date,
                daily_rating,
                total_rating,
                daily_rating_ma21,
            })
            .collect()
    }

    /// Per-country sales joined with each country's latest rating.
    ///
    /// Countries present on only one side get zero sales or no rating.
    /// Rows with a blank country code cannot be joined and are left out.
    pub fn country_rollup(sales: &[SalesRecord], ratings: &[CountryRatingRecord]) -> Vec<CountryStats> {
        let mut countries: BTreeMap<String, CountryStats> = BTreeMap::new();

        for record in sales.iter().filter(|r| !r.buyer_country.is_empty()) {
            let stats = countries
                .entry(record.buyer_country.clone())
                .or_insert_with(|| empty_stats(&record.buyer_country));
            stats.transactions += 1;
            stats.amount += record.merchant_amount.unwrap_or(0.0);
        }

        let mut latest: BTreeMap<&str, &CountryRatingRecord> = BTreeMap::new();
        for record in ratings.iter().filter(|r| !r.country.is_empty() && r.date.is_some()) {
            let newer = latest
                .get(record.country.as_str())
                .map_or(true, |current| record.date > current.date);
            if newer {
                latest.insert(record.country.as_str(), record);
            }
        }

        for (country, record) in latest {
            let stats = countries
                .entry(country.to_string())
                .or_insert_with(|| empty_stats(country));
            stats.latest_daily_rating = record.daily_average_rating;
            stats.latest_total_rating = record.total_average_rating;
        }

        countries.into_values().collect()
    }

    /// Rollup without the home market and without countries that never
    /// bought, busiest first.
    pub fn emerging_markets(rollup: &[CountryStats]) -> Vec<CountryStats> {
        let mut markets: Vec<CountryStats> = rollup
            .iter()
            .filter(|c| c.country != HOME_MARKET && c.transactions > 0)
            .cloned()
            .collect();
        markets.sort_by(|a, b| {
            b.transactions
                .cmp(&a.transactions)
                .then_with(|| a.country.cmp(&b.country))
        });
        markets
    }
}

fn empty_stats(country: &str) -> CountryStats {
    CountryStats {
        country: country.to_string(),
        name: country_name(country).unwrap_or(country).to_string(),
        transactions: 0,
        amount: 0.0,
        latest_daily_rating: None,
        latest_total_rating: None,
    }
}

/// Trailing mean over the last `window` positions, counting only present
/// values.  A window with no values yields `None`.
pub fn trailing_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let (sum, count) = values[start..=i]
                .iter()
                .flatten()
                .fold((0.0, 0u32), |(sum, count), v| (sum + v, count + 1));
            (count > 0).then(|| sum / f64::from(count))
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
