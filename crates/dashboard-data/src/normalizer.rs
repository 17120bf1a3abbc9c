//! Schema normalization: turns a classified [`RawTable`] into typed records.

use std::path::PathBuf;

use dashboard_core::country::normalize_country_code;
use dashboard_core::data_processors::{DateParser, NumberParser};
use dashboard_core::models::{
    CountryRatingRecord, CrashRecord, OverviewRatingRecord, ReportKind, SalesRecord,
};
use tracing::{debug, warn};

use crate::reader::RawTable;
use crate::schema::{columns, schema_for, FilterValue, ReportSchema};

// ── Output types ──────────────────────────────────────────────────────────────

/// Normalized sales rows from one export, plus which money columns the
/// source carried.
#[derive(Debug, Clone)]
pub struct SalesTable {
    pub source: PathBuf,
    /// The export had an explicit `Currency Conversion Rate` column.
    pub has_conversion_rate: bool,
    /// The export had an explicit `Amount (Merchant Currency)` column.
    pub has_merchant_amount: bool,
    pub records: Vec<SalesRecord>,
}

/// A normalized export of any known kind.
#[derive(Debug, Clone)]
pub enum NormalizedTable {
    Sales(SalesTable),
    Crash(Vec<CrashRecord>),
    RatingsByCountry(Vec<CountryRatingRecord>),
    RatingsOverview(Vec<OverviewRatingRecord>),
}

/// Row accounting for one normalized export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub rows_read: usize,
    pub rows_kept: usize,
    /// Dropped because the product id is not the target app.
    pub foreign_product_rows: usize,
    /// Dropped by a literal-value filter (non-charge transactions).
    pub filtered_rows: usize,
    /// Kept rows whose date could not be parsed.
    pub missing_date_rows: usize,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Apply `schema`'s column renames and value rewrites in place.
///
/// Idempotent: running it on already-canonical input changes nothing.
/// Returns the number of renamed columns plus rewritten cells.
pub fn apply_schema(table: &mut RawTable, schema: &ReportSchema) -> usize {
    let mut changes = 0;

    for (legacy, canonical) in schema.renames {
        if table.rename_column(legacy, canonical) {
            changes += 1;
        }
    }

    for rewrite in schema.value_rewrites {
        let Some(idx) = table.column_index(rewrite.column) else {
            continue;
        };
        for row in table.rows.iter_mut() {
            if row[idx] == rewrite.from {
                row[idx] = rewrite.to.to_string();
                changes += 1;
            }
        }
    }

    changes
}

/// Normalize `table` as `kind`, keeping only sales of `product_id`.
///
/// Returns `None` for [`ReportKind::Unrecognized`].
pub fn normalize(
    mut table: RawTable,
    kind: ReportKind,
    product_id: &str,
) -> Option<(NormalizedTable, NormalizeStats)> {
    let schema = schema_for(kind)?;
    apply_schema(&mut table, schema);

    let mut stats = NormalizeStats {
        rows_read: table.rows.len(),
        ..Default::default()
    };
    let rows = filter_rows(&table, schema, product_id, &mut stats);

    let normalized = match kind {
        ReportKind::Sales => NormalizedTable::Sales(build_sales(&table, &rows, &mut stats)),
        ReportKind::Crash => NormalizedTable::Crash(build_crashes(&table, &rows, &mut stats)),
        ReportKind::RatingsByCountry => {
            NormalizedTable::RatingsByCountry(build_country_ratings(&table, &rows, &mut stats))
        }
        ReportKind::RatingsOverview => {
            NormalizedTable::RatingsOverview(build_overview_ratings(&table, &rows, &mut stats))
        }
        ReportKind::Unrecognized => return None,
    };
    stats.rows_kept = rows.len();

    debug!(
        "Normalized {} as {}: {} read, {} kept, {} foreign product, {} filtered, {} without date",
        table.file_name(),
        kind,
        stats.rows_read,
        stats.rows_kept,
        stats.foreign_product_rows,
        stats.filtered_rows,
        stats.missing_date_rows,
    );

    Some((normalized, stats))
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Indices of the rows that pass every filter of `schema`.
fn filter_rows(
    table: &RawTable,
    schema: &ReportSchema,
    product_id: &str,
    stats: &mut NormalizeStats,
) -> Vec<usize> {
    let filters: Vec<(Option<usize>, FilterValue)> = schema
        .row_filters
        .iter()
        .map(|f| {
            let idx = table.column_index(f.column);
            if idx.is_none() {
                warn!(
                    "{} has no \"{}\" column; all rows will be filtered out",
                    table.file_name(),
                    f.column
                );
            }
            (idx, f.value)
        })
        .collect();

    let mut kept = Vec::with_capacity(table.rows.len());
    'rows: for (i, row) in table.rows.iter().enumerate() {
        for (idx, value) in &filters {
            let cell = idx.map(|c| row[c].as_str()).unwrap_or("");
            let (expected, counter) = match value {
                FilterValue::TargetProduct => (product_id, &mut stats.foreign_product_rows),
                FilterValue::Literal(lit) => (*lit, &mut stats.filtered_rows),
            };
            if cell != expected {
                *counter += 1;
                continue 'rows;
            }
        }
        kept.push(i);
    }
    kept
}

/// Column accessor that yields `""` for absent columns.
struct Cells<'a> {
    table: &'a RawTable,
}

impl<'a> Cells<'a> {
    fn idx(&self, name: &str) -> Option<usize> {
        self.table.column_index(name)
    }

    fn get(&self, row: usize, col: Option<usize>) -> &'a str {
        col.map(|c| self.table.rows[row][c].as_str()).unwrap_or("")
    }
}

fn build_sales(table: &RawTable, rows: &[usize], stats: &mut NormalizeStats) -> SalesTable {
    let cells = Cells { table };
    let date = cells.idx(columns::TRANSACTION_DATE);
    let kind = cells.idx(columns::TRANSACTION_TYPE);
    let product = cells.idx(columns::PRODUCT_ID);
    let sku = cells.idx(columns::SKU_ID);
    let country = cells.idx(columns::BUYER_COUNTRY);
    let currency = cells.idx(columns::BUYER_CURRENCY);
    let amount = cells.idx(columns::BUYER_AMOUNT);
    let rate = cells.idx(columns::CONVERSION_RATE);
    let merchant = cells.idx(columns::MERCHANT_AMOUNT);

    let records = rows
        .iter()
        .map(|&r| {
            let transaction_date = DateParser::parse(cells.get(r, date));
            if transaction_date.is_none() {
                stats.missing_date_rows += 1;
            }
            SalesRecord {
                transaction_date,
                transaction_type: cells.get(r, kind).to_string(),
                product_id: cells.get(r, product).to_string(),
                sku_id: cells.get(r, sku).to_string(),
                buyer_country: normalize_country_code(cells.get(r, country)),
                buyer_currency: cells.get(r, currency).trim().to_ascii_uppercase(),
                charged_amount: NumberParser::parse(cells.get(r, amount)),
                conversion_rate: NumberParser::parse(cells.get(r, rate)),
                merchant_amount: NumberParser::parse(cells.get(r, merchant)),
            }
        })
        .collect();

    SalesTable {
        source: table.path.clone(),
        has_conversion_rate: rate.is_some(),
        has_merchant_amount: merchant.is_some(),
        records,
    }
}

fn build_crashes(table: &RawTable, rows: &[usize], stats: &mut NormalizeStats) -> Vec<CrashRecord> {
    let cells = Cells { table };
    let date = cells.idx(columns::DATE);
    let crashes = cells.idx(columns::DAILY_CRASHES);
    let anrs = cells.idx(columns::DAILY_ANRS);

    rows.iter()
        .map(|&r| {
            let date = DateParser::parse(cells.get(r, date));
            if date.is_none() {
                stats.missing_date_rows += 1;
            }
            CrashRecord {
                date,
                daily_crashes: NumberParser::parse(cells.get(r, crashes)),
                daily_anrs: NumberParser::parse(cells.get(r, anrs)),
            }
        })
        .collect()
}

fn build_country_ratings(
    table: &RawTable,
    rows: &[usize],
    stats: &mut NormalizeStats,
) -> Vec<CountryRatingRecord> {
    let cells = Cells { table };
    let date = cells.idx(columns::DATE);
    let country = cells.idx(columns::COUNTRY);
    let daily = cells.idx(columns::DAILY_AVERAGE_RATING);
    let total = cells.idx(columns::TOTAL_AVERAGE_RATING);

    rows.iter()
        .map(|&r| {
            let date = DateParser::parse(cells.get(r, date));
            if date.is_none() {
                stats.missing_date_rows += 1;
            }
            CountryRatingRecord {
                date,
                country: normalize_country_code(cells.get(r, country)),
                daily_average_rating: NumberParser::parse(cells.get(r, daily)),
                total_average_rating: NumberParser::parse(cells.get(r, total)),
            }
        })
        .collect()
}

fn build_overview_ratings(
    table: &RawTable,
    rows: &[usize],
    stats: &mut NormalizeStats,
) -> Vec<OverviewRatingRecord> {
    let cells = Cells { table };
    let date = cells.idx(columns::DATE);
    let daily = cells.idx(columns::DAILY_AVERAGE_RATING);
    let total = cells.idx(columns::TOTAL_AVERAGE_RATING);

    rows.iter()
        .map(|&r| {
            let date = DateParser::parse(cells.get(r, date));
            if date.is_none() {
                stats.missing_date_rows += 1;
            }
            OverviewRatingRecord {
                date,
                daily_average_rating: NumberParser::parse(cells.get(r, daily)),
                total_average_rating: NumberParser::parse(cells.get(r, total)),
            }
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dashboard_core::models::{TextEncoding, TARGET_PRODUCT_ID};

    fn table(text: &str) -> RawTable {
        RawTable::from_csv_text("fixture.csv", TextEncoding::Utf8, text).unwrap()
    }

    fn sales_of(normalized: NormalizedTable) -> SalesTable {
        match normalized {
            NormalizedTable::Sales(t) => t,
            other => panic!("expected sales, got {:?}", other),
        }
    }

    const LEGACY: &str = "\
Order Number,Order Charged Date,Financial Status,Product ID,SKU ID,Currency of Sale,Charged Amount,Country of Buyer
GPA.1,2024-01-03,Charged,com.vansteinengroentjes.apps.ddfive,premium,USD,20.00,US
GPA.2,2024-01-04,Refund,com.vansteinengroentjes.apps.ddfive,premium,USD,-20.00,US
GPA.3,2024-01-05,Charged,com.other.app,coins,EUR,1.00,DE
GPA.4,garbage,Charged,com.vansteinengroentjes.apps.ddfive,tip,EUR,2.50,deu
";

    const EARNINGS: &str = "\
Transaction Date,Transaction Type,Product id,Sku Id,Buyer Country,Buyer Currency,Amount (Buyer Currency),Currency Conversion Rate,Amount (Merchant Currency)
\"Jan 3, 2024\",Charge,com.vansteinengroentjes.apps.ddfive,premium,NL,EUR,10.00,1.000000,10.00
\"Jan 3, 2024\",Google fee,com.vansteinengroentjes.apps.ddfive,premium,NL,EUR,-1.50,1.000000,-1.50
";

    // ── apply_schema ──────────────────────────────────────────────────────────

    #[test]
    fn test_apply_schema_renames_legacy_columns() {
        let mut t = table(LEGACY);
        let schema = schema_for(ReportKind::Sales).unwrap();
        apply_schema(&mut t, schema);

        for canonical in [
            columns::PRODUCT_ID,
            columns::TRANSACTION_DATE,
            columns::TRANSACTION_TYPE,
            columns::BUYER_CURRENCY,
            columns::SKU_ID,
            columns::BUYER_AMOUNT,
            columns::BUYER_COUNTRY,
        ] {
            assert!(t.has_column(canonical), "missing {canonical}");
        }
        assert!(!t.has_column("Financial Status"));
    }

    #[test]
    fn test_apply_schema_rewrites_charged_to_charge() {
        let mut t = table(LEGACY);
        apply_schema(&mut t, schema_for(ReportKind::Sales).unwrap());
        let idx = t.column_index(columns::TRANSACTION_TYPE).unwrap();
        assert_eq!(t.rows[0][idx], "Charge");
        assert_eq!(t.rows[1][idx], "Refund");
        assert!(t.rows.iter().all(|r| r[idx] != "Charged"));
    }

    #[test]
    fn test_apply_schema_idempotent() {
        let mut t = table(LEGACY);
        let schema = schema_for(ReportKind::Sales).unwrap();
        assert!(apply_schema(&mut t, schema) > 0);
        let columns_after_first = t.columns.clone();
        let rows_after_first = t.rows.clone();

        assert_eq!(apply_schema(&mut t, schema), 0);
        assert_eq!(t.columns, columns_after_first);
        assert_eq!(t.rows, rows_after_first);
    }

    #[test]
    fn test_apply_schema_noop_on_canonical_input() {
        let mut t = table(EARNINGS);
        assert_eq!(apply_schema(&mut t, schema_for(ReportKind::Sales).unwrap()), 0);
    }

    // ── normalize: sales ──────────────────────────────────────────────────────

    #[test]
    fn test_normalize_legacy_sales_filters_rows() {
        let (normalized, stats) =
            normalize(table(LEGACY), ReportKind::Sales, TARGET_PRODUCT_ID).unwrap();
        let sales = sales_of(normalized);

        assert_eq!(stats.rows_read, 4);
        assert_eq!(stats.rows_kept, 2);
        assert_eq!(stats.foreign_product_rows, 1);
        assert_eq!(stats.filtered_rows, 1);
        assert_eq!(stats.missing_date_rows, 1);

        assert!(!sales.has_conversion_rate);
        assert!(!sales.has_merchant_amount);
        assert_eq!(sales.records.len(), 2);

        let first = &sales.records[0];
        assert_eq!(first.transaction_type, "Charge");
        assert_eq!(first.transaction_date, NaiveDate::from_ymd_opt(2024, 1, 3));
        assert_eq!(first.buyer_currency, "USD");
        assert_eq!(first.charged_amount, Some(20.0));
        assert_eq!(first.conversion_rate, None);
        assert_eq!(first.merchant_amount, None);

        let second = &sales.records[1];
        assert_eq!(second.transaction_date, None);
        assert_eq!(second.buyer_country, "DE");
    }

    #[test]
    fn test_normalize_earnings_keeps_charges_only() {
        let (normalized, stats) =
            normalize(table(EARNINGS), ReportKind::Sales, TARGET_PRODUCT_ID).unwrap();
        let sales = sales_of(normalized);

        assert_eq!(stats.filtered_rows, 1);
        assert!(sales.has_conversion_rate);
        assert!(sales.has_merchant_amount);
        assert_eq!(sales.records.len(), 1);
        assert_eq!(sales.records[0].merchant_amount, Some(10.0));
        assert_eq!(sales.records[0].conversion_rate, Some(1.0));
        assert_eq!(sales.records[0].month(), Some("2024-01".to_string()));
    }

    #[test]
    fn test_normalize_respects_configured_product() {
        let (normalized, stats) =
            normalize(table(LEGACY), ReportKind::Sales, "com.other.app").unwrap();
        let sales = sales_of(normalized);
        assert_eq!(sales.records.len(), 1);
        assert_eq!(sales.records[0].sku_id, "coins");
        assert_eq!(stats.foreign_product_rows, 3);
    }

    #[test]
    fn test_normalize_without_product_column_drops_all() {
        let t = table("Transaction Type,Sku Id\nCharge,premium\n");
        let (normalized, stats) = normalize(t, ReportKind::Sales, TARGET_PRODUCT_ID).unwrap();
        assert!(sales_of(normalized).records.is_empty());
        assert_eq!(stats.foreign_product_rows, 1);
    }

    // ── normalize: quality tables ─────────────────────────────────────────────

    #[test]
    fn test_normalize_crashes() {
        let t = table("Date,Package Name,Daily Crashes,Daily ANRs\n2024-01-01,x,4,\nbad,x,1,2\n");
        let (normalized, stats) = normalize(t, ReportKind::Crash, TARGET_PRODUCT_ID).unwrap();
        let NormalizedTable::Crash(rows) = normalized else {
            panic!("expected crash table");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].daily_crashes, Some(4.0));
        assert_eq!(rows[0].daily_anrs, None);
        assert_eq!(rows[1].date, None);
        assert_eq!(stats.missing_date_rows, 1);
    }

    #[test]
    fn test_normalize_country_ratings() {
        let t = table(
            "Date,Package Name,Country,Daily Average Rating,Total Average Rating\n\
             2024-01-01,x,br,NA,4.31\n",
        );
        let (normalized, _) =
            normalize(t, ReportKind::RatingsByCountry, TARGET_PRODUCT_ID).unwrap();
        let NormalizedTable::RatingsByCountry(rows) = normalized else {
            panic!("expected ratings table");
        };
        assert_eq!(rows[0].country, "BR");
        assert_eq!(rows[0].daily_average_rating, None);
        assert_eq!(rows[0].total_average_rating, Some(4.31));
    }

    #[test]
    fn test_normalize_overview_ratings() {
        let t = table("Date,Daily Average Rating,Total Average Rating\n2024-02-01,4.0,4.2\n");
        let (normalized, _) =
            normalize(t, ReportKind::RatingsOverview, TARGET_PRODUCT_ID).unwrap();
        let NormalizedTable::RatingsOverview(rows) = normalized else {
            panic!("expected overview table");
        };
        assert_eq!(rows[0].daily_average_rating, Some(4.0));
    }

    #[test]
    fn test_normalize_unrecognized_returns_none() {
        let t = table("Foo,Bar\n1,2\n");
        assert!(normalize(t, ReportKind::Unrecognized, TARGET_PRODUCT_ID).is_none());
    }
}
