//! # Wire Shapes
//!
//! Payloads exchanged with the REST backend and the flattened document
//! model handed to exporters. Field names are the backend's French
//! snake_case names; amounts travel as strings.
//!
//! ```text
//! ┌────────────┐  to_payload()   ┌──────────────┐  POST /quotes   ┌─────────┐
//! │ QuoteDraft │ ───────────────►│ QuotePayload │ ───────────────►│ backend │
//! └────────────┘  (validated)    └──────────────┘                 └────┬────┘
//!                                                                      │
//! ┌───────────────┐  from_quote()  ┌───────┐   GET /quotes/{id}        │
//! │ QuoteDocument │ ◄──────────────│ Quote │ ◄─────────────────────────┘
//! └───────────────┘  (recomputed)  └───────┘
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::error::{CoreResult, FieldErrors};
use crate::money::VatRate;
use crate::types::{Quote, QuoteDraft, QuoteStatus};

// =============================================================================
// Creation / Update Payload
// =============================================================================

/// Body of `POST /quotes` and `PUT /quotes/{id}`.
///
/// The line array is named `products` on the wire; stored totals are not
/// part of the payload, the backend computes its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuotePayload {
    pub numero_devis: String,
    pub client_id: i64,
    #[ts(as = "String")]
    pub date_devis: NaiveDate,
    #[ts(as = "String")]
    pub date_validite: NaiveDate,
    pub statut: QuoteStatus,
    #[ts(as = "String")]
    pub tva: VatRate,
    pub products: Vec<QuoteLinePayload>,
}

/// One line of a [`QuotePayload`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuoteLinePayload {
    pub product_id: i64,
    #[ts(as = "String")]
    pub quantite: Decimal,
    #[ts(as = "String")]
    pub prix_unitaire: Decimal,
}

impl QuoteDraft {
    /// Validates the draft and assembles the submission payload.
    ///
    /// Fails with [`crate::CoreError::ValidationFailed`] when any field
    /// rule is broken; a payload is only ever built from a draft that
    /// passed the full check. The quote number is trimmed on the way out.
    pub fn to_payload(&self) -> CoreResult<QuotePayload> {
        self.validate()?;

        let client_id = self
            .client_id
            .ok_or_else(|| FieldErrors::single("client_id", "Le client est requis"))?;
        let date_devis = self
            .date_devis
            .ok_or_else(|| FieldErrors::single("date_devis", "La date du devis est requise"))?;
        let date_validite = self
            .date_validite
            .ok_or_else(|| FieldErrors::single("date_validite", "La date de validité est requise"))?;

        let mut products = Vec::with_capacity(self.lines.len());
        for (index, line) in self.lines.iter().enumerate() {
            let product_id = line.product_id.ok_or_else(|| {
                FieldErrors::single(format!("detail_{index}_product"), "Le produit est requis")
            })?;
            products.push(QuoteLinePayload {
                product_id,
                quantite: line.quantite,
                prix_unitaire: line.prix_unitaire,
            });
        }

        let payload = QuotePayload {
            numero_devis: self.numero_devis.trim().to_string(),
            client_id,
            date_devis,
            date_validite,
            statut: self.statut,
            tva: self.tva,
            products,
        };

        debug!(
            numero_devis = %payload.numero_devis,
            lines = payload.products.len(),
            "assembled quote payload"
        );

        Ok(payload)
    }
}

// =============================================================================
// Pagination Envelope
// =============================================================================

/// The backend's paginated list envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl<T> Paginated<T> {
    /// True when this is the last page.
    pub fn is_last_page(&self) -> bool {
        self.current_page >= self.last_page
    }
}

// =============================================================================
// Printable Document
// =============================================================================

/// A quote flattened for rendering (print view, PDF export).
///
/// Everything a template needs is resolved up front: client name with its
/// fallback, French status label, per-line names, and totals recomputed
/// from the lines rather than read from storage.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct QuoteDocument {
    pub numero_devis: String,
    pub client_nom: String,
    #[ts(as = "String")]
    pub date_devis: NaiveDate,
    #[ts(as = "String")]
    pub date_validite: NaiveDate,
    pub statut: QuoteStatus,
    pub statut_label: String,
    pub lines: Vec<DocumentLine>,
    #[ts(as = "String")]
    pub tva_rate: VatRate,
    #[ts(as = "String")]
    pub total_ht: Decimal,
    #[ts(as = "String")]
    pub tva_amount: Decimal,
    #[ts(as = "String")]
    pub total_ttc: Decimal,
}

/// One rendered line of a [`QuoteDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct DocumentLine {
    pub produit_nom: String,
    #[ts(as = "String")]
    pub quantite: Decimal,
    #[ts(as = "String")]
    pub prix_unitaire: Decimal,
    #[ts(as = "String")]
    pub total_ligne: Decimal,
}

impl QuoteDocument {
    /// Flattens a quote for rendering. Lines keep their input order.
    pub fn from_quote(quote: &Quote) -> Self {
        let totals = quote.effective_totals();
        let lines = quote
            .lines()
            .iter()
            .map(|detail| DocumentLine {
                produit_nom: detail.product_name().to_string(),
                quantite: detail.quantite,
                prix_unitaire: detail.prix_unitaire,
                total_ligne: detail.subtotal(),
            })
            .collect();

        QuoteDocument {
            numero_devis: quote.numero_devis.clone(),
            client_nom: quote
                .client
                .as_ref()
                .map(|c| c.nom.clone())
                .unwrap_or_else(|| "N/A".to_string()),
            date_devis: quote.date_devis,
            date_validite: quote.date_validite,
            statut: quote.statut,
            statut_label: quote.statut.label().to_string(),
            lines,
            tva_rate: quote.tva,
            total_ht: totals.total_ht,
            tva_amount: totals.tva_amount,
            total_ttc: totals.total_ttc,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
