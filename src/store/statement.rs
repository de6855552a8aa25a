//! Builds the multi-row upsert statement for a rate payload.

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::rate_provider::RatePayload;

/// How the target driver marks bind parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// Distinct ascending markers: `$1`, `$2`, ... (PostgreSQL).
    Numbered,
    /// A single repeatable marker: `?` (SQLite, MySQL).
    Question,
}

impl PlaceholderStyle {
    fn marker(self, index: usize) -> String {
        match self {
            PlaceholderStyle::Numbered => format!("${index}"),
            PlaceholderStyle::Question => "?".to_string(),
        }
    }
}

/// A value slot in the statement, in bind order.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Currency(String),
    Rate(Decimal),
    Timestamp(DateTime<Utc>),
}

#[derive(Debug)]
pub struct UpsertStatement {
    pub sql: String,
    pub binds: Vec<BindValue>,
}

/// Build one multi-row upsert for every quote in the payload.
///
/// Each quote contributes a `(from_currency, to_currency, rate, created_at,
/// updated_at)` tuple, both timestamp slots carrying the payload timestamp.
/// The conflict clause updates `rate` and `updated_at` only, so `created_at`
/// keeps the original insertion time. The WHERE guard re-affirms the
/// conflicting key; some engines' conflict-clause semantics want it spelled
/// out.
pub fn build_upsert(payload: &RatePayload, style: PlaceholderStyle) -> Result<UpsertStatement> {
    if payload.to.is_empty() {
        bail!(
            "refusing to build an empty upsert for base currency {}",
            payload.from
        );
    }

    let mut values = Vec::with_capacity(payload.to.len());
    let mut binds = Vec::with_capacity(payload.to.len() * 5);
    let mut index = 1;

    for quote in &payload.to {
        let markers: Vec<String> = (0..5).map(|slot| style.marker(index + slot)).collect();
        values.push(format!("({})", markers.join(", ")));
        index += 5;

        binds.push(BindValue::Currency(payload.from.clone()));
        binds.push(BindValue::Currency(quote.quote_currency.clone()));
        binds.push(BindValue::Rate(quote.mid));
        binds.push(BindValue::Timestamp(payload.timestamp));
        binds.push(BindValue::Timestamp(payload.timestamp));
    }

    let sql = format!(
        "INSERT INTO exchange_rates \
         (from_currency, to_currency, rate, created_at, updated_at) \
         VALUES {} \
         ON CONFLICT (from_currency, to_currency) DO UPDATE \
         SET rate = excluded.rate, updated_at = excluded.updated_at \
         WHERE exchange_rates.from_currency = excluded.from_currency \
         AND exchange_rates.to_currency = excluded.to_currency",
        values.join(", ")
    );

    Ok(UpsertStatement { sql, binds })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_provider::QuoteRate;

    fn payload(quotes: &[(&str, &str)]) -> RatePayload {
        RatePayload {
            from: "USD".to_string(),
            to: quotes
                .iter()
                .map(|(currency, mid)| QuoteRate {
                    quote_currency: currency.to_string(),
                    mid: mid.parse().unwrap(),
                })
                .collect(),
            timestamp: "2024-03-01T00:00:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn test_single_quote_round_trip() {
        let payload = payload(&[("EUR", "0.91")]);
        let statement = build_upsert(&payload, PlaceholderStyle::Numbered).unwrap();

        assert!(statement.sql.contains("VALUES ($1, $2, $3, $4, $5)"));
        assert_eq!(
            statement.binds,
            vec![
                BindValue::Currency("USD".to_string()),
                BindValue::Currency("EUR".to_string()),
                BindValue::Rate("0.91".parse().unwrap()),
                BindValue::Timestamp(payload.timestamp),
                BindValue::Timestamp(payload.timestamp),
            ]
        );
    }

    #[test]
    fn test_placeholders_ascend_across_rows() {
        let payload = payload(&[("EUR", "0.91"), ("INR", "82.85"), ("GBP", "0.78")]);
        let statement = build_upsert(&payload, PlaceholderStyle::Numbered).unwrap();

        assert_eq!(statement.binds.len(), 15);
        assert!(statement.sql.contains(
            "VALUES ($1, $2, $3, $4, $5), ($6, $7, $8, $9, $10), ($11, $12, $13, $14, $15)"
        ));
        assert!(!statement.sql.contains("$16"));
    }

    #[test]
    fn test_question_style_repeats_marker() {
        let payload = payload(&[("EUR", "0.91"), ("INR", "82.85")]);
        let statement = build_upsert(&payload, PlaceholderStyle::Question).unwrap();

        assert_eq!(statement.sql.matches('?').count(), 10);
        assert!(!statement.sql.contains('$'));
        assert_eq!(statement.binds.len(), 10);
    }

    #[test]
    fn test_conflict_clause_leaves_created_at_alone() {
        let payload = payload(&[("EUR", "0.91")]);
        let statement = build_upsert(&payload, PlaceholderStyle::Numbered).unwrap();

        assert!(
            statement
                .sql
                .contains("SET rate = excluded.rate, updated_at = excluded.updated_at")
        );
        assert!(!statement.sql.contains("created_at = excluded"));
    }

    #[test]
    fn test_empty_payload_is_an_error() {
        let empty = RatePayload {
            from: "USD".to_string(),
            to: vec![],
            timestamp: "2024-03-01T00:00:00Z".parse().unwrap(),
        };
        assert!(build_upsert(&empty, PlaceholderStyle::Numbered).is_err());
    }
}
