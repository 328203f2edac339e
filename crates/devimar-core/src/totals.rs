//! # Quote Totals
//!
//! The calculation pipeline for quote amounts. Every HT/TVA/TTC figure shown
//! anywhere comes from here; stored totals are never trusted for display.
//!
//! ## Pipeline
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  per line:   subtotal = round2(quantite × prix_unitaire)          │
//! │                                  │                                │
//! │  sum lines:  total_ht = round2(Σ subtotals)                       │
//! │                                  │                                │
//! │  apply VAT:  tva_amount = round2(total_ht × tva / 100)            │
//! │                                  │                                │
//! │  grand:      total_ttc = round2(total_ht + tva_amount)            │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Line subtotals are rounded first (each line is a 2-decimal amount on the
//! document), then summed exactly. No rounding happens inside an
//! aggregation step, so recomputing over the same lines always lands on the
//! same figures.
//!
//! ## Example
//! ```rust
//! use devimar_core::{compute_totals, QuoteLine, VatRate};
//! use rust_decimal_macros::dec;
//!
//! let lines = vec![
//!     QuoteLine { product_id: Some(1), quantite: dec!(2), prix_unitaire: dec!(100.00) },
//!     QuoteLine { product_id: Some(2), quantite: dec!(1), prix_unitaire: dec!(50.005) },
//! ];
//!
//! let totals = compute_totals(&lines, VatRate::STANDARD);
//! assert_eq!(totals.total_ht, dec!(250.01));
//! assert_eq!(totals.tva_amount, dec!(50.00));
//! assert_eq!(totals.total_ttc, dec!(300.01));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, TotalsMismatch};
use crate::money::{round2, VatRate};
use crate::types::{Quote, QuoteLine};

// =============================================================================
// Line Subtotal
// =============================================================================

/// Subtotal of one line: quantity times unit price, rounded to 2 decimals.
///
/// `2 × 50.005` gives `100.01` (the raw product `100.010` rounds half-up),
/// and `1 × 50.005` gives `50.01`.
pub fn line_subtotal(quantite: Decimal, prix_unitaire: Decimal) -> Decimal {
    round2(quantite * prix_unitaire)
}

// =============================================================================
// Quote Totals
// =============================================================================

/// The three document amounts of a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuoteTotals {
    /// Sum of line subtotals, before tax.
    #[ts(as = "String")]
    pub total_ht: Decimal,
    /// VAT amount on `total_ht`.
    #[ts(as = "String")]
    pub tva_amount: Decimal,
    /// Grand total, tax included.
    #[ts(as = "String")]
    pub total_ttc: Decimal,
}

impl QuoteTotals {
    /// All-zero totals, what an empty quote computes to.
    pub const ZERO: QuoteTotals = QuoteTotals {
        total_ht: Decimal::ZERO,
        tva_amount: Decimal::ZERO,
        total_ttc: Decimal::ZERO,
    };
}

/// Computes totals for a set of draft lines.
pub fn compute_totals(lines: &[QuoteLine], tva: VatRate) -> QuoteTotals {
    from_subtotals(lines.iter().map(QuoteLine::subtotal), tva)
}

/// Computes totals from already-rounded line subtotals.
///
/// The subtotals are summed exactly, then the sum goes through the
/// HT → TVA → TTC derivation of [`totals_from_ht`].
pub fn from_subtotals<I>(subtotals: I, tva: VatRate) -> QuoteTotals
where
    I: IntoIterator<Item = Decimal>,
{
    let total_ht: Decimal = subtotals.into_iter().sum();
    totals_from_ht(total_ht, tva)
}

/// Derives VAT amount and TTC from a pre-tax total.
///
/// Also usable on its own when only a stored `total_ht` is at hand (list
/// rows where the details relation was not loaded).
pub fn totals_from_ht(total_ht: Decimal, tva: VatRate) -> QuoteTotals {
    let total_ht = round2(total_ht);
    let tva_amount = round2(total_ht * tva.fraction());
    let total_ttc = round2(total_ht + tva_amount);
    QuoteTotals {
        total_ht,
        tva_amount,
        total_ttc,
    }
}

// =============================================================================
// Quote Integration
// =============================================================================

impl Quote {
    /// Recomputes totals from the loaded details, ignoring every stored
    /// amount (including each line's `total_ligne`).
    pub fn recompute_totals(&self) -> QuoteTotals {
        from_subtotals(self.lines().iter().map(|d| d.subtotal()), self.tva)
    }

    /// The totals to display for this quote.
    ///
    /// Recomputed from the details when they are loaded; otherwise derived
    /// from the stored `total_ht`, the only trustworthy stored figure.
    pub fn effective_totals(&self) -> QuoteTotals {
        match &self.details {
            Some(details) if !details.is_empty() => self.recompute_totals(),
            _ => totals_from_ht(self.total_ht, self.tva),
        }
    }

    /// Checks the stored `total_ht` / `total_ttc` against a fresh
    /// computation over the loaded details.
    ///
    /// Returns the recomputed totals when everything agrees. On divergence
    /// the error lists every mismatched field; the caller decides whether
    /// to re-save or to flag the record. Without loaded details there is
    /// nothing to check against and the stored figures pass as-is.
    pub fn verify_stored_totals(&self) -> CoreResult<QuoteTotals> {
        if self.lines().is_empty() {
            return Ok(totals_from_ht(self.total_ht, self.tva));
        }

        let computed = self.recompute_totals();
        let mut mismatches = Vec::new();

        if self.total_ht != computed.total_ht {
            mismatches.push(TotalsMismatch {
                field: "total_ht".to_string(),
                stored: self.total_ht,
                computed: computed.total_ht,
            });
        }
        if self.total_ttc != computed.total_ttc {
            mismatches.push(TotalsMismatch {
                field: "total_ttc".to_string(),
                stored: self.total_ttc,
                computed: computed.total_ttc,
            });
        }

        if mismatches.is_empty() {
            Ok(computed)
        } else {
            warn!(
                quote = %self.numero_devis,
                mismatches = mismatches.len(),
                "stored totals disagree with recomputed totals"
            );
            Err(CoreError::InconsistentTotals { mismatches })
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
