//! Top-level report pipeline.
//!
//! Reads every export under a directory, classifies and normalizes it,
//! reconciles currencies and aggregates the result into a [`Dataset`] ready
//! for the UI layer.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use dashboard_core::models::{
    CountryRatingRecord, CrashRecord, OverviewRatingRecord, ReportKind, SalesRecord, TARGET_PRODUCT_ID,
};
use dashboard_core::{DashboardError, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::aggregator::{
    CountryStats, MonthlySales, OverviewPoint, QualityPoint, ReportAggregator, SkuMonthlySales,
};
use crate::currency::{reconcile, CurrencyRates};
use crate::normalizer::{normalize, NormalizedTable, SalesTable};
use crate::reader::{find_csv_files, read_table};
use crate::schema::classify;

// ── Public types ──────────────────────────────────────────────────────────────

/// Knobs for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Sales rows for any other product id are dropped.
    pub product_id: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            product_id: TARGET_PRODUCT_ID.to_string(),
        }
    }
}

/// Why an export did not contribute to the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    UnrecognizedColumns { columns: Vec<String> },
    ReadError { message: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognizedColumns { columns } => {
                write!(f, "Unrecognized columns: {}", columns.join(", "))
            }
            Self::ReadError { message } => write!(f, "Read error: {}", message),
        }
    }
}

/// One export left out of the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    /// Path relative to the data directory when possible.
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// What happened to the input while building a [`Dataset`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    /// Exports that were read successfully, recognized or not.
    pub files_read: usize,
    /// Recognized exports per report kind.
    pub files_by_kind: BTreeMap<ReportKind, usize>,
    pub skipped_files: Vec<SkippedFile>,
    /// Buyer currencies with no observed conversion rate, sorted.
    pub unresolved_currencies: Vec<String>,
    pub foreign_product_rows: usize,
    pub filtered_rows: usize,
    pub missing_date_rows: usize,
}

impl Diagnostics {
    /// Whether anything was dropped or left unresolved.
    pub fn has_warnings(&self) -> bool {
        !self.skipped_files.is_empty() || !self.unresolved_currencies.is_empty()
    }
}

/// Everything the dashboard shows, computed in one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub product_id: String,
    pub monthly_sales: Vec<MonthlySales>,
    pub sku_sales: Vec<SkuMonthlySales>,
    pub skus: Vec<String>,
    pub quality: Vec<QualityPoint>,
    pub overview: Vec<OverviewPoint>,
    pub countries: Vec<CountryStats>,
    pub emerging_markets: Vec<CountryStats>,
    pub currency_rates: CurrencyRates,
    pub diagnostics: Diagnostics,
}

impl Dataset {
    /// Month axis of the sales charts, ascending.
    pub fn months(&self) -> Vec<String> {
        self.monthly_sales.iter().map(|m| m.month.clone()).collect()
    }

    /// One SKU's sales over the full month axis, zero-filled.
    pub fn sku_series(&self, sku: &str) -> Vec<SkuMonthlySales> {
        ReportAggregator::sku_series(&self.sku_sales, sku, &self.months())
    }

    /// Merchant-currency revenue across all dated sales.
    pub fn total_amount(&self) -> f64 {
        self.monthly_sales.iter().map(|m| m.amount).sum()
    }

    pub fn total_transactions(&self) -> u64 {
        self.monthly_sales.iter().map(|m| m.transactions).sum()
    }

    /// Whether no export contributed any row.
    pub fn is_empty(&self) -> bool {
        self.monthly_sales.is_empty()
            && self.countries.is_empty()
            && self.quality.is_empty()
            && self.overview.is_empty()
    }
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the full pipeline over `data_dir`.
///
/// 1. Discover and read every CSV export.
/// 2. Classify each one by its columns; unrecognized exports are skipped.
/// 3. Normalize recognized exports into typed records.
/// 4. Reconcile conversion rates and merchant amounts across sales exports.
/// 5. Aggregate into a [`Dataset`].
///
/// Only a missing data directory is an error; problems with individual files
/// end up in [`Diagnostics`].
pub fn run_pipeline(data_dir: &Path, options: &PipelineOptions) -> Result<Dataset> {
    if !data_dir.is_dir() {
        return Err(DashboardError::DataPathNotFound(data_dir.to_path_buf()));
    }

    let mut diagnostics = Diagnostics::default();
    let mut sales_tables: Vec<SalesTable> = Vec::new();
    let mut crashes: Vec<CrashRecord> = Vec::new();
    let mut country_ratings: Vec<CountryRatingRecord> = Vec::new();
    let mut overview_ratings: Vec<OverviewRatingRecord> = Vec::new();

    // ── Step 1-3: Read, classify, normalize ──────────────────────────────────
    for path in find_csv_files(data_dir) {
        let display_path = path.strip_prefix(data_dir).unwrap_or(path.as_path()).to_path_buf();

        let table = match read_table(&path) {
            Ok(table) => table,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                diagnostics.skipped_files.push(SkippedFile {
                    path: display_path,
                    reason: SkipReason::ReadError {
                        message: e.to_string(),
                    },
                });
                continue;
            }
        };
        diagnostics.files_read += 1;

        let kind = classify(&table.columns);
        if kind == ReportKind::Unrecognized {
            warn!(
                "Skipping {}: unrecognized columns {:?}",
                path.display(),
                table.columns
            );
            diagnostics.skipped_files.push(SkippedFile {
                path: display_path,
                reason: SkipReason::UnrecognizedColumns {
                    columns: table.columns,
                },
            });
            continue;
        }

        let Some((normalized, stats)) = normalize(table, kind, &options.product_id) else {
            continue;
        };
        *diagnostics.files_by_kind.entry(kind).or_insert(0) += 1;
        diagnostics.foreign_product_rows += stats.foreign_product_rows;
        diagnostics.filtered_rows += stats.filtered_rows;
        diagnostics.missing_date_rows += stats.missing_date_rows;

        match normalized {
            NormalizedTable::Sales(table) => sales_tables.push(table),
            NormalizedTable::Crash(records) => crashes.extend(records),
            NormalizedTable::RatingsByCountry(records) => country_ratings.extend(records),
            NormalizedTable::RatingsOverview(records) => overview_ratings.extend(records),
        }
    }

    // ── Step 4: Currency reconciliation ──────────────────────────────────────
    let currency_rates = CurrencyRates::from_tables(&sales_tables);
    diagnostics.unresolved_currencies = reconcile(&mut sales_tables, &currency_rates);
    let sales: Vec<SalesRecord> = sales_tables.into_iter().flat_map(|t| t.records).collect();

    // ── Step 5: Aggregate ────────────────────────────────────────────────────
    let monthly_sales = ReportAggregator::monthly_sales(&sales);
    let sku_sales = ReportAggregator::sku_monthly_sales(&sales);
    let skus = ReportAggregator::skus(&sku_sales);
    let quality = ReportAggregator::quality_series(&crashes, &country_ratings);
    let overview = ReportAggregator::overview_series(&overview_ratings);
    let countries = ReportAggregator::country_rollup(&sales, &country_ratings);
    let emerging_markets = ReportAggregator::emerging_markets(&countries);

    info!(
        "Loaded {} files ({} skipped): {} sales rows, {} months, {} SKUs, {} quality days, {} countries",
        diagnostics.files_read,
        diagnostics.skipped_files.len(),
        sales.len(),
        monthly_sales.len(),
        skus.len(),
        quality.len(),
        countries.len(),
    );

    Ok(Dataset {
        product_id: options.product_id.clone(),
        monthly_sales,
        sku_sales,
        skus,
        quality,
        overview,
        countries,
        emerging_markets,
        currency_rates,
        diagnostics,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
