//! Currency conversion reconciliation across sales exports.
//!
//! Exports that carry an explicit conversion rate teach the mean rate per
//! buyer currency; exports without one borrow it, and the merchant-currency
//! amount is derived wherever the source did not supply it.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, warn};

use crate::normalizer::SalesTable;

/// Label used for rows whose buyer currency cell was blank.
const BLANK_CURRENCY: &str = "(blank)";

// ── CurrencyRates ─────────────────────────────────────────────────────────────

/// Mean observed conversion rate per buyer currency.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CurrencyRates {
    means: BTreeMap<String, f64>,
}

impl CurrencyRates {
    /// Build the table from every sales export that declares a
    /// `Currency Conversion Rate` column.
    ///
    /// Rows with a missing rate or blank currency are ignored.  When no export
    /// declares rates the table is empty and every lookup misses.
    pub fn from_tables(tables: &[SalesTable]) -> Self {
        Self::from_pairs(
            tables
                .iter()
                .filter(|t| t.has_conversion_rate)
                .flat_map(|t| t.records.iter())
                .filter_map(|r| Some((r.buyer_currency.as_str(), r.conversion_rate?))),
        )
    }

    /// Arithmetic mean per currency of `(currency, rate)` observations.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        let mut sums: BTreeMap<String, (f64, u32)> = BTreeMap::new();
        for (currency, rate) in pairs {
            if currency.is_empty() {
                continue;
            }
            let slot = sums.entry(currency.to_string()).or_insert((0.0, 0));
            slot.0 += rate;
            slot.1 += 1;
        }

        let means = sums
            .into_iter()
            .map(|(currency, (sum, count))| (currency, sum / f64::from(count)))
            .collect();
        Self { means }
    }

    /// Mean rate for `currency`, if any export observed one.
    pub fn get(&self, currency: &str) -> Option<f64> {
        self.means.get(currency).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }

    pub fn len(&self) -> usize {
        self.means.len()
    }

    /// `(currency, mean rate)` pairs sorted by currency code.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.means.iter().map(|(c, r)| (c.as_str(), *r))
    }
}

// ── Reconciliation ────────────────────────────────────────────────────────────

/// Backfill conversion rates and derive merchant-currency amounts in place.
///
/// * Exports without a rate column get each row's rate from `rates`; a
///   currency with no observed rate leaves the row's rate missing.
/// * Exports without a merchant-amount column get
///   `charged amount × conversion rate`; a missing operand leaves the amount
///   missing.
///
/// Returns the sorted, deduplicated currencies that could not be resolved.
pub fn reconcile(tables: &mut [SalesTable], rates: &CurrencyRates) -> Vec<String> {
    let mut unresolved: BTreeSet<String> = BTreeSet::new();

    for table in tables.iter_mut() {
        let mut backfilled = 0usize;
        let mut derived = 0usize;

        if !table.has_conversion_rate {
            for record in table.records.iter_mut() {
                record.conversion_rate = rates.get(&record.buyer_currency);
                match record.conversion_rate {
                    Some(_) => backfilled += 1,
                    None if record.buyer_currency.is_empty() => {
                        unresolved.insert(BLANK_CURRENCY.to_string());
                    }
                    None => {
                        unresolved.insert(record.buyer_currency.clone());
                    }
                }
            }
        }

        if !table.has_merchant_amount {
            for record in table.records.iter_mut() {
                record.merchant_amount = match (record.charged_amount, record.conversion_rate) {
                    (Some(amount), Some(rate)) => Some(amount * rate),
                    _ => None,
                };
                if record.merchant_amount.is_some() {
                    derived += 1;
                }
            }
        }

        debug!(
            "Reconciled {}: {} rates backfilled, {} amounts derived",
            table.source.display(),
            backfilled,
            derived
        );
    }

    if !unresolved.is_empty() {
        warn!(
            "No conversion rate observed for: {}",
            unresolved.iter().cloned().collect::<Vec<_>>().join(", ")
        );
    }

    unresolved.into_iter().collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::models::{SalesRecord, CHARGE_TRANSACTION, TARGET_PRODUCT_ID};
    use std::path::PathBuf;

    fn record(currency: &str, amount: Option<f64>, rate: Option<f64>, merchant: Option<f64>) -> SalesRecord {
        SalesRecord {
            transaction_date: None,
            transaction_type: CHARGE_TRANSACTION.to_string(),
            product_id: TARGET_PRODUCT_ID.to_string(),
            sku_id: "premium".to_string(),
            buyer_country: "NL".to_string(),
            buyer_currency: currency.to_string(),
            charged_amount: amount,
            conversion_rate: rate,
            merchant_amount: merchant,
        }
    }

    fn table(has_rate: bool, has_merchant: bool, records: Vec<SalesRecord>) -> SalesTable {
        SalesTable {
            source: PathBuf::from("fixture.csv"),
            has_conversion_rate: has_rate,
            has_merchant_amount: has_merchant,
            records,
        }
    }

    // ── CurrencyRates ─────────────────────────────────────────────────────────

    #[test]
    fn test_rates_mean_per_currency() {
        let tables = vec![
            table(true, true, vec![
                record("USD", Some(1.0), Some(0.8), Some(0.8)),
                record("USD", Some(1.0), Some(1.0), Some(1.0)),
                record("EUR", Some(1.0), Some(1.0), Some(1.0)),
            ]),
            table(true, true, vec![record("USD", Some(1.0), Some(0.9), Some(0.9))]),
        ];
        let rates = CurrencyRates::from_tables(&tables);

        assert_eq!(rates.len(), 2);
        assert!((rates.get("USD").unwrap() - 0.9).abs() < 1e-12);
        assert_eq!(rates.get("EUR"), Some(1.0));
        assert_eq!(rates.get("GBP"), None);
    }

    #[test]
    fn test_rates_ignore_tables_without_rate_column() {
        let tables = vec![table(false, false, vec![record("USD", Some(1.0), Some(5.0), None)])];
        assert!(CurrencyRates::from_tables(&tables).is_empty());
    }

    #[test]
    fn test_rates_empty_when_no_tables() {
        let rates = CurrencyRates::from_tables(&[]);
        assert!(rates.is_empty());
        assert_eq!(rates.get("USD"), None);
    }

    #[test]
    fn test_rates_skip_missing_rates_and_blank_currency() {
        let rates = CurrencyRates::from_pairs([("", 2.0), ("JPY", 0.006)]);
        assert_eq!(rates.iter().collect::<Vec<_>>(), vec![("JPY", 0.006)]);
    }

    // ── reconcile ─────────────────────────────────────────────────────────────

    #[test]
    fn test_reconcile_explicit_rate_derives_amount() {
        let mut tables = vec![table(true, false, vec![record("EUR", Some(10.0), Some(1.0), None)])];
        let rates = CurrencyRates::from_tables(&tables);
        let unresolved = reconcile(&mut tables, &rates);

        assert!(unresolved.is_empty());
        assert_eq!(tables[0].records[0].merchant_amount, Some(10.0));
    }

    #[test]
    fn test_reconcile_backfills_from_mean_table() {
        let rates = CurrencyRates::from_pairs([("USD", 0.9)]);
        let mut tables = vec![table(false, false, vec![record("USD", Some(20.0), None, None)])];
        let unresolved = reconcile(&mut tables, &rates);

        assert!(unresolved.is_empty());
        let r = &tables[0].records[0];
        assert_eq!(r.conversion_rate, Some(0.9));
        assert!((r.merchant_amount.unwrap() - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_reconcile_unresolved_currency_propagates_missing() {
        let rates = CurrencyRates::from_pairs([("USD", 0.9)]);
        let mut tables = vec![table(false, false, vec![
            record("BRL", Some(5.0), None, None),
            record("BRL", Some(6.0), None, None),
            record("ARS", Some(7.0), None, None),
            record("", Some(1.0), None, None),
        ])];
        let unresolved = reconcile(&mut tables, &rates);

        assert_eq!(unresolved, vec!["(blank)", "ARS", "BRL"]);
        assert!(tables[0].records.iter().all(|r| r.merchant_amount.is_none()));
    }

    #[test]
    fn test_reconcile_with_empty_rate_table() {
        let mut tables = vec![table(false, false, vec![record("USD", Some(20.0), None, None)])];
        let unresolved = reconcile(&mut tables, &CurrencyRates::default());
        assert_eq!(unresolved, vec!["USD"]);
        assert_eq!(tables[0].records[0].merchant_amount, None);
    }

    #[test]
    fn test_reconcile_keeps_supplied_merchant_amount() {
        let rates = CurrencyRates::from_pairs([("USD", 0.5)]);
        let mut tables = vec![table(true, true, vec![record("USD", Some(20.0), Some(0.9), Some(17.5))])];
        reconcile(&mut tables, &rates);
        assert_eq!(tables[0].records[0].merchant_amount, Some(17.5));
        assert_eq!(tables[0].records[0].conversion_rate, Some(0.9));
    }

    #[test]
    fn test_reconcile_missing_charged_amount() {
        let rates = CurrencyRates::from_pairs([("USD", 0.9)]);
        let mut tables = vec![table(false, false, vec![record("USD", None, None, None)])];
        let unresolved = reconcile(&mut tables, &rates);
        assert!(unresolved.is_empty());
        assert_eq!(tables[0].records[0].merchant_amount, None);
    }
}
