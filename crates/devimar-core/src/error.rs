//! # Error Types
//!
//! Domain-specific error types for devimar-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  devimar-core errors (this file)                                       │
//! │  ├── CoreError      - InvalidNumber / ValidationFailed /               │
//! │  │                    InconsistentTotals                               │
//! │  ├── FieldErrors    - Accumulated per-field validation messages        │
//! │  └── TotalsMismatch - One stored-vs-recomputed divergence              │
//! │                                                                         │
//! │  REST collaborator errors (external)                                   │
//! │  └── Transport/timeout/422 handling happens outside this crate         │
//! │                                                                         │
//! │  Flow: parse → InvalidNumber                                           │
//! │        validate → FieldErrors → ValidationFailed                       │
//! │        verify stored totals → InconsistentTotals                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field name, offending value)
//! 3. Expected business violations are values, not panics
//! 4. Validation reports every offending field at once, never fail-fast

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Field Errors
// =============================================================================

/// Accumulated validation failures, keyed by field name.
///
/// Serializes to the flat JSON object a form consumer renders directly:
///
/// ```json
/// {
///   "numero_devis": "Le numéro de devis est requis",
///   "detail_0_quantite": "Une quantité valide est requise"
/// }
/// ```
///
/// Line-item fields use `detail_{index}_{field}` keys so each row of a
/// multi-line form can be highlighted independently.
///
/// ## Example
/// ```rust
/// use devimar_core::error::FieldErrors;
///
/// let mut errors = FieldErrors::new();
/// errors.insert("client_id", "Le client est requis");
///
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors.get("client_id"), Some("Le client est requis"));
/// assert!(errors.into_result().is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Creates an empty error map.
    pub fn new() -> Self {
        FieldErrors(BTreeMap::new())
    }

    /// Creates a map holding a single field error.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field, message);
        errors
    }

    /// Records an error message for a field. A second message for the same
    /// field replaces the first.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    /// Returns the message recorded for a field, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Checks whether a field has an error recorded.
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// True when no field has an error.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with an error.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Converts the map into a `Result`: `Ok(())` when empty, `Err(self)`
    /// when at least one field failed.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

// =============================================================================
// Totals Mismatch
// =============================================================================

/// One field where a stored total disagrees with a fresh computation.
///
/// Carried by [`CoreError::InconsistentTotals`]. The caller decides which
/// side to trust; the core never overwrites either value on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TotalsMismatch {
    /// Which total diverged (`total_ht` or `total_ttc`).
    pub field: String,

    /// The value as persisted server-side.
    pub stored: Decimal,

    /// The value a fresh computation produces.
    pub computed: Decimal,
}

impl fmt::Display for TotalsMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: stored {} vs computed {}",
            self.field, self.stored, self.computed
        )
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Exactly three failure classes exist in this domain:
/// - malformed numeric input fails loudly ([`CoreError::InvalidNumber`]),
/// - business-rule violations come back as a per-field map
///   ([`CoreError::ValidationFailed`]),
/// - stored totals that disagree with a recomputation are a data-integrity
///   warning ([`CoreError::InconsistentTotals`]).
#[derive(Debug, Error)]
pub enum CoreError {
    /// A quantity, price or VAT input that is not a usable number
    /// (non-numeric text, non-finite float, or negative where the field
    /// must not be).
    #[error("{field} is not a valid number: '{value}'")]
    InvalidNumber { field: String, value: String },

    /// One or more required-field or business-rule violations.
    /// Every offending field is reported; see [`FieldErrors`].
    #[error("validation failed: {0}")]
    ValidationFailed(FieldErrors),

    /// Recomputed totals disagree with previously persisted values.
    ///
    /// Warning-grade: the quote is still displayable from the recomputed
    /// side, but persistence and display have drifted apart and the caller
    /// must choose which to trust.
    #[error("stored totals disagree with recomputed totals ({} field(s))", .mismatches.len())]
    InconsistentTotals { mismatches: Vec<TotalsMismatch> },
}

impl CoreError {
    /// Builds an [`CoreError::InvalidNumber`] for a field and raw value.
    pub fn invalid_number(field: impl Into<String>, value: impl Into<String>) -> Self {
        CoreError::InvalidNumber {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl From<FieldErrors> for CoreError {
    fn from(errors: FieldErrors) -> Self {
        CoreError::ValidationFailed(errors)
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
