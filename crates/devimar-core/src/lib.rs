//! # Devimar Core
//!
//! Pure business logic for the Devimar quote system: quote calculations,
//! field validation, the status lifecycle and the wire shapes. No I/O
//! happens here, not even clock reads. Callers pass dates in and get
//! values or errors back.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Devimar Quote System                        │
//! │                                                                 │
//! │  ┌────────────┐      ┌──────────────────┐      ┌─────────────┐  │
//! │  │  Frontend  │─────►│   devimar-core   │─────►│  REST       │  │
//! │  │  (forms,   │      │  totals          │      │  backend    │  │
//! │  │   print)   │◄─────│  validation      │◄─────│  (storage,  │  │
//! │  └────────────┘      │  lifecycle       │      │   auth)     │  │
//! │                      │  wire shapes     │      └─────────────┘  │
//! │                      └──────────────────┘                       │
//! │                                                                 │
//! │  devimar-core is level 0: it depends on nothing above it and    │
//! │  every displayed amount funnels through it.                     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`money`] - decimal amounts, rounding, VAT rates, input parsing
//! - [`totals`] - the HT → TVA → TTC pipeline
//! - [`types`] - products, clients, quotes, drafts, statuses
//! - [`validation`] - all-at-once field validation
//! - [`stats`] - dashboard counters
//! - [`wire`] - REST payloads, pagination, printable documents
//! - [`error`] - error types and the per-field error map
//!
//! ## Design Principles
//! 1. Pure functions only; the caller owns time, storage and transport
//! 2. `rust_decimal` everywhere an amount or quantity lives, one rounding
//!    rule (half-up to 2 decimals)
//! 3. Errors are values carrying the offending field, never panics
//! 4. Quantities and unit prices are the source of truth; every displayed
//!    total is recomputed from them
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

pub mod error;
pub mod money;
pub mod stats;
pub mod totals;
pub mod types;
pub mod validation;
pub mod wire;

// Re-export commonly used types at crate root
pub use error::{CoreError, CoreResult, FieldErrors, TotalsMismatch};
pub use money::{
    format_mad, parse_price, parse_quantity, parse_vat_rate, price_from_f64, quantity_from_f64,
    round2, vat_rate_from_f64, VatRate,
};
pub use stats::QuoteStats;
pub use totals::{compute_totals, from_subtotals, line_subtotal, totals_from_ht, QuoteTotals};
pub use types::*;
pub use validation::{validate_client, validate_product, validate_quote};
pub use wire::{DocumentLine, Paginated, QuoteDocument, QuoteLinePayload, QuotePayload};

// =============================================================================
// Constants
// =============================================================================

/// How long a quote stays valid when no explicit validity date is chosen.
///
/// ## Why 30 days?
/// Commercial habit of the trade: a month gives the client time to decide
/// while keeping the price commitment short enough to survive material
/// cost swings. New drafts pre-fill `date_validite` with
/// `date_devis + 30 days`; the user can still pick any other date.
pub const DEFAULT_VALIDITY_DAYS: i64 = 30;

/// Display label for a quote line whose product relation was not loaded
/// or whose product has a blank name.
pub const UNNAMED_PRODUCT_LABEL: &str = "Produit sans nom";
