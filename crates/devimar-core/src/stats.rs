//! # Dashboard Statistics
//!
//! Aggregate counters over a set of quotes, shaped for the dashboard
//! cards. Revenue only counts accepted quotes and always goes through the
//! recomputation path of the totals module.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::round2;
use crate::types::{Quote, QuoteStatus};

// =============================================================================
// Quote Stats
// =============================================================================

/// Dashboard counters.
///
/// Status buckets: `accepted` counts as approved, `refused` as rejected,
/// and both `draft` and `sent` as pending (still awaiting an answer).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct QuoteStats {
    pub total_quotes: usize,
    pub approved_quotes: usize,
    pub pending_quotes: usize,
    pub rejected_quotes: usize,
    /// Sum of TTC over accepted quotes.
    #[ts(as = "String")]
    pub total_revenue: Decimal,
}

impl QuoteStats {
    /// Tallies a collection of quotes.
    ///
    /// Revenue uses each quote's effective totals, so the figure holds up
    /// even when stored amounts have drifted or details were not loaded.
    pub fn collect<'a, I>(quotes: I) -> Self
    where
        I: IntoIterator<Item = &'a Quote>,
    {
        let mut stats = QuoteStats::default();
        let mut revenue = Decimal::ZERO;

        for quote in quotes {
            stats.total_quotes += 1;
            match quote.statut {
                QuoteStatus::Accepted => {
                    stats.approved_quotes += 1;
                    revenue += quote.effective_totals().total_ttc;
                }
                QuoteStatus::Draft | QuoteStatus::Sent => stats.pending_quotes += 1,
                QuoteStatus::Refused => stats.rejected_quotes += 1,
            }
        }

        stats.total_revenue = round2(revenue);
        stats
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::VatRate;
    use crate::types::QuoteDetail;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;

    fn test_quote(id: i64, statut: QuoteStatus, total_ht: Decimal) -> Quote {
        Quote {
            id,
            numero_devis: format!("DEV-20240105-{id:03}"),
            client_id: 3,
            user_id: 1,
            date_devis: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            date_validite: NaiveDate::from_ymd_opt(2024, 2, 4).unwrap(),
            statut,
            total_ht,
            tva: VatRate::STANDARD,
            total_ttc: round2(total_ht * dec!(1.2)),
            client: None,
            details: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_collection_is_all_zero() {
        let quotes: Vec<Quote> = Vec::new();
        assert_eq!(QuoteStats::collect(&quotes), QuoteStats::default());
    }

    #[test]
    fn test_status_buckets() {
        let quotes = vec![
            test_quote(1, QuoteStatus::Draft, dec!(100)),
            test_quote(2, QuoteStatus::Sent, dec!(100)),
            test_quote(3, QuoteStatus::Sent, dec!(100)),
            test_quote(4, QuoteStatus::Accepted, dec!(100)),
            test_quote(5, QuoteStatus::Refused, dec!(100)),
        ];

        let stats = QuoteStats::collect(&quotes);
        assert_eq!(stats.total_quotes, 5);
        assert_eq!(stats.approved_quotes, 1);
        assert_eq!(stats.pending_quotes, 3);
        assert_eq!(stats.rejected_quotes, 1);
    }

    #[test]
    fn test_revenue_counts_accepted_only() {
        let quotes = vec![
            test_quote(1, QuoteStatus::Accepted, dec!(250.01)),
            test_quote(2, QuoteStatus::Sent, dec!(1000.00)),
            test_quote(3, QuoteStatus::Accepted, dec!(100.00)),
            test_quote(4, QuoteStatus::Refused, dec!(9999.99)),
        ];

        let stats = QuoteStats::collect(&quotes);
        // 300.01 + 120.00, the pending and refused amounts stay out
        assert_eq!(stats.total_revenue, dec!(420.01));
    }

    #[test]
    fn test_revenue_recomputes_from_details_when_loaded() {
        let mut quote = test_quote(1, QuoteStatus::Accepted, dec!(9999.99));
        quote.details = Some(vec![QuoteDetail {
            id: 101,
            quote_id: 1,
            product_id: 7,
            quantite: dec!(2),
            prix_unitaire: dec!(100.00),
            total_ligne: dec!(123.45),
            product: None,
        }]);

        let stats = QuoteStats::collect([&quote]);
        assert_eq!(stats.total_revenue, dec!(240.00));
    }

    #[test]
    fn test_wire_shape_is_camel_case() {
        let stats = QuoteStats::collect([&test_quote(1, QuoteStatus::Accepted, dec!(250.01))]);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "totalQuotes": 1,
                "approvedQuotes": 1,
                "pendingQuotes": 0,
                "rejectedQuotes": 0,
                "totalRevenue": "300.01"
            })
        );
    }
}
