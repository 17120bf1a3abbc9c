use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Package name of the app whose reports the dashboard covers.
pub const TARGET_PRODUCT_ID: &str = "com.vansteinengroentjes.apps.ddfive";

/// Transaction type kept by the sales filter.
pub const CHARGE_TRANSACTION: &str = "Charge";

/// The category a report export belongs to, decided from its column set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// In-app purchase transactions (earnings or legacy sales report).
    Sales,
    /// Daily crash and ANR counts.
    Crash,
    /// Daily ratings broken down by buyer country.
    RatingsByCountry,
    /// Daily ratings for the whole app.
    RatingsOverview,
    /// Columns matched none of the known report shapes.
    Unrecognized,
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ReportKind::Sales => "sales",
            ReportKind::Crash => "crash",
            ReportKind::RatingsByCountry => "ratings-by-country",
            ReportKind::RatingsOverview => "ratings-overview",
            ReportKind::Unrecognized => "unrecognized",
        };
        f.write_str(name)
    }
}

/// Text encoding of a raw export, detected from its byte-order mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    Utf8,
    Utf8Bom,
    Utf16Le,
    Utf16Be,
}

/// A single in-app transaction after schema normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// Calendar date of the charge; `None` when the source value was unparsable.
    pub transaction_date: Option<NaiveDate>,
    /// Canonical transaction type, e.g. `"Charge"`.
    pub transaction_type: String,
    /// Package name of the product the transaction belongs to.
    pub product_id: String,
    /// Purchasable item identifier.
    pub sku_id: String,
    /// ISO alpha-2 code of the buyer's country.
    pub buyer_country: String,
    /// ISO 4217 code of the currency the buyer paid in.
    pub buyer_currency: String,
    /// Amount charged, in buyer currency.
    pub charged_amount: Option<f64>,
    /// Buyer-to-merchant currency conversion rate.
    pub conversion_rate: Option<f64>,
    /// Amount in merchant currency, supplied by the source or derived.
    pub merchant_amount: Option<f64>,
}

impl SalesRecord {
    /// Calendar month of the transaction as `"YYYY-MM"`.
    pub fn month(&self) -> Option<String> {
        self.transaction_date
            .map(|d| crate::time_utils::month_key(&d))
    }
}

/// Daily crash statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrashRecord {
    pub date: Option<NaiveDate>,
    pub daily_crashes: Option<f64>,
    pub daily_anrs: Option<f64>,
}

/// Daily rating for one buyer country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRatingRecord {
    pub date: Option<NaiveDate>,
    /// ISO alpha-2 country code.
    pub country: String,
    pub daily_average_rating: Option<f64>,
    /// Cumulative average rating up to and including `date`.
    pub total_average_rating: Option<f64>,
}

/// Daily rating for the app across all countries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewRatingRecord {
    pub date: Option<NaiveDate>,
    pub daily_average_rating: Option<f64>,
    pub total_average_rating: Option<f64>,
}
