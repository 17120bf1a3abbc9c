//! Declarative description of the known report shapes.
//!
//! Each [`ReportSchema`] carries the column predicate that identifies the
//! shape, the legacy-to-canonical renames, value rewrites and row filters
//! applied during normalization.  Classification is a single ordered lookup
//! over [`REPORT_SCHEMAS`].

use std::collections::HashSet;

use dashboard_core::models::{ReportKind, CHARGE_TRANSACTION};

/// Canonical column names.
pub mod columns {
    pub const TRANSACTION_DATE: &str = "Transaction Date";
    pub const TRANSACTION_TYPE: &str = "Transaction Type";
    pub const FINANCIAL_STATUS: &str = "Financial Status";
    pub const PRODUCT_ID: &str = "Product id";
    pub const SKU_ID: &str = "Sku Id";
    pub const BUYER_COUNTRY: &str = "Buyer Country";
    pub const BUYER_CURRENCY: &str = "Buyer Currency";
    pub const BUYER_AMOUNT: &str = "Amount (Buyer Currency)";
    pub const CONVERSION_RATE: &str = "Currency Conversion Rate";
    pub const MERCHANT_AMOUNT: &str = "Amount (Merchant Currency)";

    pub const DATE: &str = "Date";
    pub const DAILY_CRASHES: &str = "Daily Crashes";
    pub const DAILY_ANRS: &str = "Daily ANRs";
    pub const COUNTRY: &str = "Country";
    pub const DAILY_AVERAGE_RATING: &str = "Daily Average Rating";
    pub const TOTAL_AVERAGE_RATING: &str = "Total Average Rating";
}

/// Replace `from` with `to` in `column`.
#[derive(Debug, Clone, Copy)]
pub struct ValueRewrite {
    pub column: &'static str,
    pub from: &'static str,
    pub to: &'static str,
}

/// Value a row filter compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterValue {
    /// The configured target product id.
    TargetProduct,
    Literal(&'static str),
}

/// Keep only rows whose `column` equals `value`.
#[derive(Debug, Clone, Copy)]
pub struct RowFilter {
    pub column: &'static str,
    pub value: FilterValue,
}

/// One known report shape.
#[derive(Debug)]
pub struct ReportSchema {
    pub kind: ReportKind,
    /// At least one of these columns must be present (ignored when empty).
    pub any_of: &'static [&'static str],
    /// All of these columns must be present.
    pub all_of: &'static [&'static str],
    /// None of these columns may be present.
    pub none_of: &'static [&'static str],
    /// `(legacy, canonical)` pairs applied when the legacy name is present.
    pub renames: &'static [(&'static str, &'static str)],
    pub value_rewrites: &'static [ValueRewrite],
    pub row_filters: &'static [RowFilter],
    /// Column holding the calendar date of each row.
    pub date_column: &'static str,
}

impl ReportSchema {
    /// Whether a column set satisfies this schema's predicate.
    pub fn matches(&self, present: &HashSet<&str>) -> bool {
        (self.any_of.is_empty() || self.any_of.iter().any(|c| present.contains(c)))
            && self.all_of.iter().all(|c| present.contains(c))
            && !self.none_of.iter().any(|c| present.contains(c))
    }
}

/// Known report shapes in priority order; the first match wins.
pub static REPORT_SCHEMAS: &[ReportSchema] = &[
    ReportSchema {
        kind: ReportKind::Sales,
        any_of: &[columns::TRANSACTION_TYPE, columns::FINANCIAL_STATUS],
        all_of: &[],
        none_of: &[],
        renames: &[
            ("Product ID", columns::PRODUCT_ID),
            ("Order Charged Date", columns::TRANSACTION_DATE),
            (columns::FINANCIAL_STATUS, columns::TRANSACTION_TYPE),
            ("Currency of Sale", columns::BUYER_CURRENCY),
            ("SKU ID", columns::SKU_ID),
            ("Charged Amount", columns::BUYER_AMOUNT),
            ("Country of Buyer", columns::BUYER_COUNTRY),
        ],
        value_rewrites: &[ValueRewrite {
            column: columns::TRANSACTION_TYPE,
            from: "Charged",
            to: CHARGE_TRANSACTION,
        }],
        row_filters: &[
            RowFilter {
                column: columns::PRODUCT_ID,
                value: FilterValue::TargetProduct,
            },
            RowFilter {
                column: columns::TRANSACTION_TYPE,
                value: FilterValue::Literal(CHARGE_TRANSACTION),
            },
        ],
        date_column: columns::TRANSACTION_DATE,
    },
    ReportSchema {
        kind: ReportKind::Crash,
        any_of: &[],
        all_of: &[columns::DAILY_CRASHES, columns::DAILY_ANRS],
        none_of: &[],
        renames: &[],
        value_rewrites: &[],
        row_filters: &[],
        date_column: columns::DATE,
    },
    ReportSchema {
        kind: ReportKind::RatingsByCountry,
        any_of: &[],
        all_of: &[columns::DAILY_AVERAGE_RATING, columns::COUNTRY],
        none_of: &[],
        renames: &[],
        value_rewrites: &[],
        row_filters: &[],
        date_column: columns::DATE,
    },
    ReportSchema {
        kind: ReportKind::RatingsOverview,
        any_of: &[],
        all_of: &[columns::DAILY_AVERAGE_RATING],
        none_of: &[columns::COUNTRY],
        renames: &[],
        value_rewrites: &[],
        row_filters: &[],
        date_column: columns::DATE,
    },
];

/// Classify a column set into a [`ReportKind`].
///
/// Returns [`ReportKind::Unrecognized`] when no schema matches.
pub fn classify<S: AsRef<str>>(columns: &[S]) -> ReportKind {
    let present: HashSet<&str> = columns.iter().map(|c| c.as_ref()).collect();
    REPORT_SCHEMAS
        .iter()
        .find(|schema| schema.matches(&present))
        .map(|schema| schema.kind)
        .unwrap_or(ReportKind::Unrecognized)
}

/// The schema describing `kind`, if it is a known shape.
pub fn schema_for(kind: ReportKind) -> Option<&'static ReportSchema> {
    REPORT_SCHEMAS.iter().find(|schema| schema.kind == kind)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
