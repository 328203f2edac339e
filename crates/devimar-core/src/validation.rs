//! # Field Validation
//!
//! All-at-once validation for quotes, clients and products. Each function
//! walks every rule and returns the full [`FieldErrors`] map, never just
//! the first failure, so a form can highlight everything in one pass.
//!
//! ## Quote Rules
//! | Field            | Rule                                   |
//! |------------------|----------------------------------------|
//! | `numero_devis`   | non-blank                              |
//! | `client_id`      | picked                                 |
//! | `date_devis`     | set                                    |
//! | `date_validite`  | set                                    |
//! | `tva`            | 0 ≤ rate ≤ 100                         |
//! | `lines`          | at least one                           |
//! | per line         | product picked, quantity > 0, price > 0|
//!
//! Messages are the French strings the forms display verbatim.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::FieldErrors;
use crate::types::{Client, Product, QuoteDraft};

// =============================================================================
// Quote Validation
// =============================================================================

/// Validates a quote draft before submission.
///
/// Line errors are keyed `detail_{index}_{field}` so each form row gets its
/// own messages. No rule ties `date_validite` to `date_devis`; a validity
/// date before the issue date is accepted.
///
/// ## Example
/// ```rust
/// use devimar_core::{validate_quote, QuoteDraft};
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
/// let draft = QuoteDraft::new("", date);
///
/// let errors = validate_quote(&draft).unwrap_err();
/// assert_eq!(errors.len(), 3);
/// assert!(errors.contains("numero_devis"));
/// assert!(errors.contains("client_id"));
/// assert!(errors.contains("lines"));
/// ```
pub fn validate_quote(draft: &QuoteDraft) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if draft.numero_devis.trim().is_empty() {
        errors.insert("numero_devis", "Le numéro de devis est requis");
    }
    if draft.client_id.is_none() {
        errors.insert("client_id", "Le client est requis");
    }
    if draft.date_devis.is_none() {
        errors.insert("date_devis", "La date du devis est requise");
    }
    if draft.date_validite.is_none() {
        errors.insert("date_validite", "La date de validité est requise");
    }

    let tva = draft.tva.percent();
    if tva < Decimal::ZERO || tva > dec!(100) {
        errors.insert("tva", "La TVA doit être comprise entre 0 et 100");
    }

    if draft.lines.is_empty() {
        errors.insert("lines", "Au moins un article est requis");
    }
    for (index, line) in draft.lines.iter().enumerate() {
        if line.product_id.is_none() {
            errors.insert(format!("detail_{index}_product"), "Le produit est requis");
        }
        if line.quantite <= Decimal::ZERO {
            errors.insert(
                format!("detail_{index}_quantite"),
                "Une quantité valide est requise",
            );
        }
        if line.prix_unitaire <= Decimal::ZERO {
            errors.insert(
                format!("detail_{index}_prix"),
                "Un prix unitaire valide est requis",
            );
        }
    }

    errors.into_result()
}

// =============================================================================
// Client Validation
// =============================================================================

/// Validates a client record. Only the name is mandatory; the email is
/// checked for shape when present and non-blank.
pub fn validate_client(client: &Client) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if client.nom.trim().is_empty() {
        errors.insert("nom", "Le nom du client est requis");
    }

    if let Some(email) = client.email.as_deref() {
        if !email.trim().is_empty() && !looks_like_email(email) {
            errors.insert("email", "L'email est invalide");
        }
    }

    errors.into_result()
}

// =============================================================================
// Product Validation
// =============================================================================

/// Validates a catalog product.
pub fn validate_product(product: &Product) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if product.nom.trim().is_empty() {
        errors.insert("nom", "Le nom du produit est requis");
    }
    if product.prix_vente < Decimal::ZERO {
        errors.insert("prix_vente", "Le prix de vente doit être positif");
    }

    errors.into_result()
}

// =============================================================================
// Helpers
// =============================================================================

/// Loose email shape check: something before an `@`, and a dot strictly
/// inside what follows it. Deliverability is the mail server's problem.
fn looks_like_email(value: &str) -> bool {
    value.split_whitespace().any(|token| match token.find('@') {
        Some(at) if at > 0 => {
            let tail: Vec<char> = token[at + 1..].chars().collect();
            tail.iter()
                .enumerate()
                .any(|(i, &c)| c == '.' && i > 0 && i + 1 < tail.len())
        }
        _ => false,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
