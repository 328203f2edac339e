//! # Money & Numeric Parsing
//!
//! Decimal arithmetic for quote amounts. All money math in the crate funnels
//! through this module.
//!
//! ## Why Decimal Instead of Float?
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Floating point breaks money math:                          │
//! │                                                             │
//! │  0.1 + 0.2 = 0.30000000000000004  ❌ (f64)                  │
//! │  2 × 50.005 = 100.00999999999999  ❌ (f64)                  │
//! │                                                             │
//! │  Decimal keeps exact base-10 digits:                        │
//! │                                                             │
//! │  0.1 + 0.2 = 0.3                  ✅ (Decimal)              │
//! │  2 × 50.005 = 100.010             ✅ (Decimal)              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Quantities are not integers in this business (2.5 m² of marble) and unit
//! prices can carry sub-centime digits (50.005 MAD), so integer-cent storage
//! does not fit. `rust_decimal` gives exact decimal digits with explicit
//! rounding at the boundaries we choose.
//!
//! ## Rounding Policy
//! One strategy everywhere: half-up to 2 decimal places ([`round2`]).
//! `0.005` rounds to `0.01`, never to `0.00`. Rounding is applied only where
//! the domain defines a 2-decimal amount (line subtotals, document totals,
//! VAT amounts); raw inputs are kept at full precision.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Rounding
// =============================================================================

/// Rounds an amount to 2 decimal places, half-up.
///
/// The single rounding function of the crate. Midpoints round away from
/// zero, so `50.005` becomes `50.01` and `2.675` becomes `2.68` (a plain
/// `f64` would put both on the wrong side).
///
/// ## Example
/// ```rust
/// use devimar_core::money::round2;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(round2(dec!(50.005)), dec!(50.01));
/// assert_eq!(round2(dec!(2.675)), dec!(2.68));
/// assert_eq!(round2(dec!(1.004)), dec!(1.00));
/// ```
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

// =============================================================================
// Input Parsing
// =============================================================================

/// Parses a decimal out of raw text, or reports which field was malformed.
fn parse_decimal(field: &'static str, raw: &str) -> CoreResult<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::invalid_number(field, raw));
    }
    trimmed
        .parse::<Decimal>()
        .map_err(|_| CoreError::invalid_number(field, raw))
}

/// Parses a unit price from text input.
///
/// Accepts any non-negative decimal. Full precision is preserved; prices are
/// not rounded on entry, only the derived subtotals and totals are.
///
/// ## Example
/// ```rust
/// use devimar_core::money::parse_price;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(parse_price("50.005").unwrap(), dec!(50.005));
/// assert!(parse_price("abc").is_err());
/// assert!(parse_price("-3").is_err());
/// ```
pub fn parse_price(raw: &str) -> CoreResult<Decimal> {
    let value = parse_decimal("prix_unitaire", raw)?;
    if value < Decimal::ZERO {
        return Err(CoreError::invalid_number("prix_unitaire", raw));
    }
    Ok(value)
}

/// Parses a quantity from text input.
///
/// Fractional quantities are legal (2.5 m² of marble slab). Negative input
/// is rejected here; `0` parses fine and is caught later by validation,
/// which owns the business rules.
pub fn parse_quantity(raw: &str) -> CoreResult<Decimal> {
    let value = parse_decimal("quantite", raw)?;
    if value < Decimal::ZERO {
        return Err(CoreError::invalid_number("quantite", raw));
    }
    Ok(value)
}

/// Converts an `f64` price (e.g. out of a JSON number) into a `Decimal`.
///
/// `NaN` and infinities have no decimal form and are rejected instead of
/// silently becoming zero.
pub fn price_from_f64(raw: f64) -> CoreResult<Decimal> {
    let value = Decimal::from_f64(raw)
        .ok_or_else(|| CoreError::invalid_number("prix_unitaire", raw.to_string()))?;
    if value < Decimal::ZERO {
        return Err(CoreError::invalid_number("prix_unitaire", raw.to_string()));
    }
    Ok(value)
}

/// Converts an `f64` quantity into a `Decimal`. Same rules as
/// [`price_from_f64`].
pub fn quantity_from_f64(raw: f64) -> CoreResult<Decimal> {
    let value = Decimal::from_f64(raw)
        .ok_or_else(|| CoreError::invalid_number("quantite", raw.to_string()))?;
    if value < Decimal::ZERO {
        return Err(CoreError::invalid_number("quantite", raw.to_string()));
    }
    Ok(value)
}

// =============================================================================
// VAT Rate
// =============================================================================

/// A VAT percentage (`20` means 20%).
///
/// Newtype over `Decimal` so a rate can never be confused with an amount.
/// Parsing accepts any non-negative number; the 0..=100 business range is
/// enforced by quote validation, not here, so a draft holding `120` can
/// still be rendered back to the user with its error message.
///
/// ## Example
/// ```rust
/// use devimar_core::money::VatRate;
/// use rust_decimal_macros::dec;
///
/// let rate = VatRate::STANDARD;
/// assert_eq!(rate.percent(), dec!(20));
/// assert_eq!(rate.fraction(), dec!(0.20));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VatRate(Decimal);

impl VatRate {
    /// The standard rate, 20%. Pre-filled on every new quote.
    pub const STANDARD: VatRate = VatRate(dec!(20));

    /// Zero-rated (exempt operations).
    pub const ZERO: VatRate = VatRate(dec!(0));

    /// Wraps a raw percentage value.
    #[inline]
    pub const fn from_percent(percent: Decimal) -> Self {
        VatRate(percent)
    }

    /// The rate as a percentage (`20` for 20%).
    #[inline]
    pub const fn percent(&self) -> Decimal {
        self.0
    }

    /// The rate as a multiplier fraction (`0.20` for 20%).
    pub fn fraction(&self) -> Decimal {
        self.0 / dec!(100)
    }

    /// True for zero-rated quotes.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Default for VatRate {
    fn default() -> Self {
        VatRate::STANDARD
    }
}

/// Parses a VAT percentage from text input.
///
/// Negative rates are malformed input. Out-of-range positive rates (like
/// `120`) parse successfully and are rejected downstream by validation.
pub fn parse_vat_rate(raw: &str) -> CoreResult<VatRate> {
    let value = parse_decimal("tva", raw)?;
    if value < Decimal::ZERO {
        return Err(CoreError::invalid_number("tva", raw));
    }
    Ok(VatRate(value))
}

/// Converts an `f64` VAT percentage into a [`VatRate`].
pub fn vat_rate_from_f64(raw: f64) -> CoreResult<VatRate> {
    let value =
        Decimal::from_f64(raw).ok_or_else(|| CoreError::invalid_number("tva", raw.to_string()))?;
    if value < Decimal::ZERO {
        return Err(CoreError::invalid_number("tva", raw.to_string()));
    }
    Ok(VatRate(value))
}

// =============================================================================
// Display Formatting
// =============================================================================

/// Formats an amount for display in MAD, 2 decimal places.
///
/// ## Example
/// ```rust
/// use devimar_core::money::format_mad;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_mad(dec!(250.01)), "250.01 MAD");
/// assert_eq!(format_mad(dec!(250)), "250.00 MAD");
/// ```
pub fn format_mad(amount: Decimal) -> String {
    format!("{:.2} MAD", round2(amount))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2_half_up() {
        assert_eq!(round2(dec!(50.005)), dec!(50.01));
        assert_eq!(round2(dec!(2.675)), dec!(2.68));
        assert_eq!(round2(dec!(1.005)), dec!(1.01));
    }

    #[test]
    fn test_round2_below_midpoint_rounds_down() {
        assert_eq!(round2(dec!(1.004)), dec!(1.00));
        assert_eq!(round2(dec!(49.98375)), dec!(49.98));
    }

    #[test]
    fn test_round2_is_noop_on_two_decimals() {
        assert_eq!(round2(dec!(250.01)), dec!(250.01));
        assert_eq!(round2(dec!(0)), dec!(0));
    }

    #[test]
    fn test_round2_negative_midpoint_away_from_zero() {
        assert_eq!(round2(dec!(-1.005)), dec!(-1.01));
    }

    #[test]
    fn test_parse_price_accepts_fractional_centimes() {
        assert_eq!(parse_price("50.005").unwrap(), dec!(50.005));
        assert_eq!(parse_price("  100.00  ").unwrap(), dec!(100.00));
        assert_eq!(parse_price("0").unwrap(), dec!(0));
    }

    #[test]
    fn test_parse_price_rejects_garbage() {
        assert!(parse_price("abc").is_err());
        assert!(parse_price("").is_err());
        assert!(parse_price("   ").is_err());
        assert!(parse_price("12,50").is_err());
        assert!(parse_price("-3").is_err());
    }

    #[test]
    fn test_parse_error_names_the_field() {
        let err = parse_quantity("beaucoup").unwrap_err();
        assert_eq!(err.to_string(), "quantite is not a valid number: 'beaucoup'");
    }

    #[test]
    fn test_parse_quantity_fractional() {
        assert_eq!(parse_quantity("2.5").unwrap(), dec!(2.5));
        assert!(parse_quantity("-1").is_err());
    }

    #[test]
    fn test_from_f64_rejects_non_finite() {
        assert!(price_from_f64(f64::NAN).is_err());
        assert!(price_from_f64(f64::INFINITY).is_err());
        assert!(quantity_from_f64(f64::NEG_INFINITY).is_err());
        assert!(vat_rate_from_f64(f64::NAN).is_err());
    }

    #[test]
    fn test_from_f64_accepts_plain_values() {
        assert_eq!(price_from_f64(19.99).unwrap(), dec!(19.99));
        assert_eq!(quantity_from_f64(2.5).unwrap(), dec!(2.5));
        assert!(price_from_f64(-0.01).is_err());
    }

    #[test]
    fn test_vat_rate_default_is_standard() {
        assert_eq!(VatRate::default(), VatRate::STANDARD);
        assert_eq!(VatRate::default().percent(), dec!(20));
    }

    #[test]
    fn test_vat_rate_fraction() {
        assert_eq!(VatRate::STANDARD.fraction(), dec!(0.2));
        assert_eq!(VatRate::from_percent(dec!(7)).fraction(), dec!(0.07));
        assert!(VatRate::ZERO.is_zero());
    }

    #[test]
    fn test_parse_vat_rate_keeps_out_of_range_for_validation() {
        // 120 parses; the 0..=100 rule belongs to validation
        assert_eq!(parse_vat_rate("120").unwrap().percent(), dec!(120));
        assert!(parse_vat_rate("-20").is_err());
    }

    #[test]
    fn test_format_mad() {
        assert_eq!(format_mad(dec!(250.01)), "250.01 MAD");
        assert_eq!(format_mad(dec!(250)), "250.00 MAD");
        assert_eq!(format_mad(dec!(50.005)), "50.01 MAD");
        assert_eq!(format_mad(dec!(0)), "0.00 MAD");
    }

    #[test]
    fn test_vat_rate_serde_transparent() {
        let json = serde_json::to_string(&VatRate::STANDARD).unwrap();
        assert_eq!(json, "\"20\"");

        let back: VatRate = serde_json::from_str("20").unwrap();
        assert_eq!(back, VatRate::STANDARD);
    }
}
