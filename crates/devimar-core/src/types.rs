//! # Core Domain Types
//!
//! Shared types used across the quote workflow. These types are
//! serialization-ready (serde) and TypeScript-export-ready (ts-rs) so the
//! React frontend consumes the exact same shapes.
//!
//! ## Entity Relationships
//! ```text
//! ┌──────────┐      ┌───────────────┐      ┌─────────────┐
//! │  Client  │◄─────│     Quote     │─────►│ QuoteDetail │
//! │          │ 1..n │  numero_devis │ 1..n │  quantite   │
//! └──────────┘      │  statut       │      │  prix_unit. │
//!                   │  total_ht/ttc │      └──────┬──────┘
//!                   └───────────────┘             │ n..1
//!                                                 ▼
//!                                          ┌─────────────┐
//!                                          │   Product   │
//!                                          │  prix_vente │
//!                                          └─────────────┘
//! ```
//!
//! `Quote`/`QuoteDetail` mirror the persisted records. `QuoteDraft`/
//! `QuoteLine` are the in-progress editing model before anything has an id.

use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, FieldErrors};
use crate::money::VatRate;
use crate::totals::{self, QuoteTotals};
use crate::{DEFAULT_VALIDITY_DAYS, UNNAMED_PRODUCT_LABEL};

// =============================================================================
// Product
// =============================================================================

/// Product category. The catalog only carries stone and tiling trade goods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ProductCategory {
    Marbre,
    Carrelage,
    Autre,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Marbre => "Marbre",
            ProductCategory::Carrelage => "Carrelage",
            ProductCategory::Autre => "Autre",
        }
    }
}

impl Default for ProductCategory {
    fn default() -> Self {
        ProductCategory::Marbre
    }
}

impl FromStr for ProductCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "marbre" => Ok(ProductCategory::Marbre),
            "carrelage" => Ok(ProductCategory::Carrelage),
            "autre" => Ok(ProductCategory::Autre),
            _ => Err(FieldErrors::single("categorie", "Catégorie invalide").into()),
        }
    }
}

/// Measure unit for quantities. Surface (m²) or volume (m³).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum MeasureUnit {
    M2,
    M3,
}

impl MeasureUnit {
    /// Wire value (`m2` / `m3`).
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasureUnit::M2 => "m2",
            MeasureUnit::M3 => "m3",
        }
    }

    /// Display symbol (`m²` / `m³`).
    pub fn symbol(&self) -> &'static str {
        match self {
            MeasureUnit::M2 => "m²",
            MeasureUnit::M3 => "m³",
        }
    }
}

impl Default for MeasureUnit {
    fn default() -> Self {
        MeasureUnit::M2
    }
}

impl FromStr for MeasureUnit {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "m2" | "m²" => Ok(MeasureUnit::M2),
            "m3" | "m³" => Ok(MeasureUnit::M3),
            _ => Err(FieldErrors::single("unite", "Unité invalide").into()),
        }
    }
}

/// A catalog product.
///
/// `prix_vente` is the current selling price per unit. Quote lines copy it
/// at insertion time, so later catalog edits never rewrite old quotes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: i64,
    pub nom: String,
    pub categorie: ProductCategory,
    pub unite: MeasureUnit,
    /// Current selling price per unit, in MAD.
    #[serde(default)]
    #[ts(as = "String")]
    pub prix_vente: Decimal,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Client
// =============================================================================

/// A customer record. Only the name is mandatory; contact details are
/// filled in as they become known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Client {
    pub id: i64,
    pub nom: String,
    pub email: Option<String>,
    pub telephone: Option<String>,
    pub adresse: Option<String>,
    pub ville: Option<String>,
    pub code_postal: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Quote Status
// =============================================================================

/// Lifecycle state of a quote.
///
/// ## Rules
/// - Every quote starts as `Draft`
/// - Any status may be set from any other status; there is no enforced
///   order (an accepted quote can go back to draft)
/// - Status never affects totals
///
/// Wire values are the English snake_case names. Historical data also
/// carries French spellings (`brouillon`, `envoyé`, ...), which
/// [`QuoteStatus::from_str`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum QuoteStatus {
    Draft,
    Sent,
    Accepted,
    Refused,
}

impl QuoteStatus {
    /// All statuses, in lifecycle display order.
    pub const ALL: [QuoteStatus; 4] = [
        QuoteStatus::Draft,
        QuoteStatus::Sent,
        QuoteStatus::Accepted,
        QuoteStatus::Refused,
    ];

    /// Wire value (`draft`, `sent`, `accepted`, `refused`).
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Sent => "sent",
            QuoteStatus::Accepted => "accepted",
            QuoteStatus::Refused => "refused",
        }
    }

    /// French display label.
    pub fn label(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "Brouillon",
            QuoteStatus::Sent => "Envoyé",
            QuoteStatus::Accepted => "Accepté",
            QuoteStatus::Refused => "Refusé",
        }
    }

    /// Badge tone for status display.
    pub fn tone(&self) -> StatusTone {
        match self {
            QuoteStatus::Draft => StatusTone::Neutral,
            QuoteStatus::Sent => StatusTone::Info,
            QuoteStatus::Accepted => StatusTone::Success,
            QuoteStatus::Refused => StatusTone::Error,
        }
    }

    /// Whether this status may change to `next`.
    ///
    /// Currently every transition is allowed, including sending a refused
    /// quote again or pulling an accepted one back to draft. The check
    /// exists as the single place to tighten if that ever changes.
    pub fn can_transition_to(&self, _next: QuoteStatus) -> bool {
        true
    }
}

impl Default for QuoteStatus {
    fn default() -> Self {
        QuoteStatus::Draft
    }
}

impl FromStr for QuoteStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" | "brouillon" => Ok(QuoteStatus::Draft),
            "sent" | "envoye" | "envoyé" => Ok(QuoteStatus::Sent),
            "accepted" | "accepte" | "accepté" => Ok(QuoteStatus::Accepted),
            "refused" | "refuse" | "refusé" => Ok(QuoteStatus::Refused),
            _ => Err(FieldErrors::single("statut", "Statut de devis invalide").into()),
        }
    }
}

/// Visual tone of a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum StatusTone {
    Neutral,
    Info,
    Success,
    Error,
}

// =============================================================================
// Quote & Details
// =============================================================================

/// A persisted quote line.
///
/// `quantite` and `prix_unitaire` are the source of truth; `total_ligne` is
/// the server-stored product of the two and is recomputed locally rather
/// than trusted (see [`QuoteDetail::subtotal`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuoteDetail {
    pub id: i64,
    pub quote_id: i64,
    pub product_id: i64,
    #[ts(as = "String")]
    pub quantite: Decimal,
    /// Unit price frozen at quote creation time.
    #[ts(as = "String")]
    pub prix_unitaire: Decimal,
    /// Stored line total. Display paths recompute instead of reading this.
    #[ts(as = "String")]
    pub total_ligne: Decimal,
    pub product: Option<Product>,
}

impl QuoteDetail {
    /// Recomputes the line subtotal from quantity and unit price.
    pub fn subtotal(&self) -> Decimal {
        totals::line_subtotal(self.quantite, self.prix_unitaire)
    }

    /// Product name for display, with a fallback when the relation was not
    /// loaded or the name is blank.
    pub fn product_name(&self) -> &str {
        self.product
            .as_ref()
            .map(|p| p.nom.as_str())
            .filter(|nom| !nom.trim().is_empty())
            .unwrap_or(UNNAMED_PRODUCT_LABEL)
    }
}

/// A persisted quote.
///
/// `total_ht`, `tva` and `total_ttc` are the stored amounts. Display and
/// export paths recompute from the details and only fall back to these
/// when no details were loaded; `verify_stored_totals` (in the totals
/// module) reports any drift between the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Quote {
    pub id: i64,
    pub numero_devis: String,
    pub client_id: i64,
    #[serde(default)]
    pub user_id: i64,
    #[ts(as = "String")]
    pub date_devis: NaiveDate,
    #[ts(as = "String")]
    pub date_validite: NaiveDate,
    pub statut: QuoteStatus,
    #[ts(as = "String")]
    pub total_ht: Decimal,
    /// VAT percentage applied to the whole quote.
    #[ts(as = "String")]
    pub tva: VatRate,
    #[ts(as = "String")]
    pub total_ttc: Decimal,
    pub client: Option<Client>,
    pub details: Option<Vec<QuoteDetail>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    /// The quote lines, empty when the relation was not loaded.
    pub fn lines(&self) -> &[QuoteDetail] {
        self.details.as_deref().unwrap_or(&[])
    }
}

// =============================================================================
// Quote Draft (editing model)
// =============================================================================

/// One editable line of a quote being drafted.
///
/// Unlike [`QuoteDetail`] nothing here has an id yet and the product may
/// still be unpicked (`product_id: None` is an empty form row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuoteLine {
    pub product_id: Option<i64>,
    #[ts(as = "String")]
    pub quantite: Decimal,
    #[ts(as = "String")]
    pub prix_unitaire: Decimal,
}

impl QuoteLine {
    /// An empty row: no product, zero quantity, zero price.
    pub fn new() -> Self {
        QuoteLine {
            product_id: None,
            quantite: Decimal::ZERO,
            prix_unitaire: Decimal::ZERO,
        }
    }

    /// Builds a line from a catalog product, freezing its current selling
    /// price into the line.
    ///
    /// ## Example
    /// ```rust
    /// use devimar_core::{MeasureUnit, Product, ProductCategory, QuoteLine};
    /// use chrono::Utc;
    /// use rust_decimal_macros::dec;
    ///
    /// let mut product = Product {
    ///     id: 7,
    ///     nom: "Marbre blanc".to_string(),
    ///     categorie: ProductCategory::Marbre,
    ///     unite: MeasureUnit::M2,
    ///     prix_vente: dec!(100.00),
    ///     created_at: Utc::now(),
    ///     updated_at: Utc::now(),
    /// };
    ///
    /// let line = QuoteLine::from_product(&product, dec!(2));
    ///
    /// // a later catalog price change leaves the line untouched
    /// product.prix_vente = dec!(120.00);
    /// assert_eq!(line.prix_unitaire, dec!(100.00));
    /// ```
    pub fn from_product(product: &Product, quantite: Decimal) -> Self {
        QuoteLine {
            product_id: Some(product.id),
            quantite,
            prix_unitaire: product.prix_vente,
        }
    }

    /// The rounded line subtotal.
    pub fn subtotal(&self) -> Decimal {
        totals::line_subtotal(self.quantite, self.prix_unitaire)
    }
}

impl Default for QuoteLine {
    fn default() -> Self {
        QuoteLine::new()
    }
}

/// A quote being composed, before submission.
///
/// Field-level rules live in the validation module; the draft itself only
/// carries state and the small editing operations the form needs.
///
/// ## Example
/// ```rust
/// use devimar_core::QuoteDraft;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
/// let draft = QuoteDraft::new("DEV-20240105-001", date);
///
/// assert_eq!(draft.date_validite, NaiveDate::from_ymd_opt(2024, 2, 4));
/// assert_eq!(draft.tva.percent(), rust_decimal_macros::dec!(20));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuoteDraft {
    pub numero_devis: String,
    pub client_id: Option<i64>,
    #[ts(as = "Option<String>")]
    pub date_devis: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub date_validite: Option<NaiveDate>,
    pub statut: QuoteStatus,
    #[ts(as = "String")]
    pub tva: VatRate,
    pub lines: Vec<QuoteLine>,
}

impl QuoteDraft {
    /// Starts a fresh draft dated `date_devis`, valid for
    /// [`DEFAULT_VALIDITY_DAYS`] days, at the standard VAT rate, with no
    /// lines yet.
    pub fn new(numero_devis: impl Into<String>, date_devis: NaiveDate) -> Self {
        QuoteDraft {
            numero_devis: numero_devis.into(),
            client_id: None,
            date_devis: Some(date_devis),
            date_validite: Some(date_devis + Duration::days(DEFAULT_VALIDITY_DAYS)),
            statut: QuoteStatus::Draft,
            tva: VatRate::STANDARD,
            lines: Vec::new(),
        }
    }

    /// Appends a line.
    pub fn add_line(&mut self, line: QuoteLine) {
        self.lines.push(line);
    }

    /// Removes the line at `index`. Refuses to remove the last remaining
    /// line (the form always keeps at least one row once editing started)
    /// and returns whether a line was removed.
    pub fn remove_line(&mut self, index: usize) -> bool {
        if self.lines.len() <= 1 || index >= self.lines.len() {
            return false;
        }
        self.lines.remove(index);
        true
    }

    /// Computes live totals for the current lines.
    pub fn totals(&self) -> QuoteTotals {
        totals::compute_totals(&self.lines, self.tva)
    }

    /// Runs full field validation. See the validation module for the rules.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        crate::validation::validate_quote(self)
    }
}

// =============================================================================
// Quote Numbering
// =============================================================================

/// Builds a quote number: `DEV-YYYYMMDD-NNN`.
///
/// `seq` is the per-day counter. It is formatted on three digits and wraps
/// above 999, matching the server-side scheme.
///
/// ## Example
/// ```rust
/// use devimar_core::generate_quote_number;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
/// assert_eq!(generate_quote_number(date, 7), "DEV-20240105-007");
/// ```
pub fn generate_quote_number(date: NaiveDate, seq: u32) -> String {
    format!("DEV-{}-{:03}", date.format("%Y%m%d"), seq % 1000)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn test_product() -> Product {
        Product {
            id: 7,
            nom: "Marbre blanc de Carrare".to_string(),
            categorie: ProductCategory::Marbre,
            unite: MeasureUnit::M2,
            prix_vente: dec!(100.00),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_wire_values() {
        assert_eq!(serde_json::to_string(&QuoteStatus::Draft).unwrap(), "\"draft\"");
        assert_eq!(serde_json::to_string(&QuoteStatus::Sent).unwrap(), "\"sent\"");
        assert_eq!(
            serde_json::to_string(&QuoteStatus::Accepted).unwrap(),
            "\"accepted\""
        );
        assert_eq!(
            serde_json::to_string(&QuoteStatus::Refused).unwrap(),
            "\"refused\""
        );
    }

    #[test]
    fn test_status_labels_and_tones() {
        assert_eq!(QuoteStatus::Draft.label(), "Brouillon");
        assert_eq!(QuoteStatus::Sent.label(), "Envoyé");
        assert_eq!(QuoteStatus::Accepted.label(), "Accepté");
        assert_eq!(QuoteStatus::Refused.label(), "Refusé");

        assert_eq!(QuoteStatus::Draft.tone(), StatusTone::Neutral);
        assert_eq!(QuoteStatus::Sent.tone(), StatusTone::Info);
        assert_eq!(QuoteStatus::Accepted.tone(), StatusTone::Success);
        assert_eq!(QuoteStatus::Refused.tone(), StatusTone::Error);
    }

    #[test]
    fn test_every_status_transition_is_permitted() {
        for from in QuoteStatus::ALL {
            for to in QuoteStatus::ALL {
                assert!(from.can_transition_to(to), "{from:?} -> {to:?} must be allowed");
            }
        }
        // the contentious one, spelled out
        assert!(QuoteStatus::Accepted.can_transition_to(QuoteStatus::Draft));
    }

    #[test]
    fn test_status_from_str_accepts_french_aliases() {
        assert_eq!("brouillon".parse::<QuoteStatus>().unwrap(), QuoteStatus::Draft);
        assert_eq!(" Envoyé ".parse::<QuoteStatus>().unwrap(), QuoteStatus::Sent);
        assert_eq!("envoye".parse::<QuoteStatus>().unwrap(), QuoteStatus::Sent);
        assert_eq!("accepté".parse::<QuoteStatus>().unwrap(), QuoteStatus::Accepted);
        assert_eq!("refuse".parse::<QuoteStatus>().unwrap(), QuoteStatus::Refused);
        assert_eq!("ACCEPTED".parse::<QuoteStatus>().unwrap(), QuoteStatus::Accepted);
        assert!("annulé".parse::<QuoteStatus>().is_err());
    }

    #[test]
    fn test_category_and_unit_wire_values() {
        assert_eq!(
            serde_json::to_string(&ProductCategory::Marbre).unwrap(),
            "\"Marbre\""
        );
        assert_eq!(serde_json::to_string(&MeasureUnit::M2).unwrap(), "\"m2\"");
        assert_eq!(MeasureUnit::M2.symbol(), "m²");
        assert_eq!(MeasureUnit::M3.symbol(), "m³");
        assert_eq!("m²".parse::<MeasureUnit>().unwrap(), MeasureUnit::M2);
        assert_eq!("Carrelage".parse::<ProductCategory>().unwrap(), ProductCategory::Carrelage);
    }

    #[test]
    fn test_line_freezes_product_price() {
        let mut product = test_product();
        let line = QuoteLine::from_product(&product, dec!(2.5));

        product.prix_vente = dec!(150.00);

        assert_eq!(line.product_id, Some(7));
        assert_eq!(line.prix_unitaire, dec!(100.00));
        assert_eq!(line.subtotal(), dec!(250.00));
    }

    #[test]
    fn test_draft_defaults() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let draft = QuoteDraft::new("DEV-20240105-001", date);

        assert_eq!(draft.statut, QuoteStatus::Draft);
        assert_eq!(draft.tva, VatRate::STANDARD);
        assert_eq!(draft.date_devis, Some(date));
        assert_eq!(
            draft.date_validite,
            NaiveDate::from_ymd_opt(2024, 2, 4)
        );
        assert!(draft.lines.is_empty());
        assert_eq!(draft.client_id, None);
    }

    #[test]
    fn test_remove_line_keeps_at_least_one_row() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let mut draft = QuoteDraft::new("DEV-20240105-001", date);
        draft.add_line(QuoteLine::new());

        assert!(!draft.remove_line(0), "the only row must stay");

        draft.add_line(QuoteLine::from_product(&test_product(), dec!(1)));
        assert_eq!(draft.lines.len(), 2);
        assert!(!draft.remove_line(5), "out of range");
        assert!(draft.remove_line(0));
        assert_eq!(draft.lines.len(), 1);
        assert_eq!(draft.lines[0].product_id, Some(7));
    }

    #[test]
    fn test_generate_quote_number() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(generate_quote_number(date, 7), "DEV-20240105-007");
        assert_eq!(generate_quote_number(date, 42), "DEV-20240105-042");
        assert_eq!(generate_quote_number(date, 1234), "DEV-20240105-234");
    }

    #[test]
    fn test_quote_deserializes_from_server_json() {
        // String decimals and a bare numeric VAT, the way the API sends them
        let json = r#"{
            "id": 12,
            "numero_devis": "DEV-20240105-007",
            "client_id": 3,
            "user_id": 1,
            "date_devis": "2024-01-05",
            "date_validite": "2024-02-04",
            "statut": "sent",
            "total_ht": "250.01",
            "tva": 20,
            "total_ttc": "300.01",
            "client": null,
            "details": [
                {
                    "id": 101,
                    "quote_id": 12,
                    "product_id": 7,
                    "quantite": "2.00",
                    "prix_unitaire": "100.00",
                    "total_ligne": "200.00",
                    "product": null
                }
            ],
            "created_at": "2024-01-05T10:30:00.000000Z",
            "updated_at": "2024-01-05T10:30:00.000000Z"
        }"#;

        let quote: Quote = serde_json::from_str(json).unwrap();
        assert_eq!(quote.numero_devis, "DEV-20240105-007");
        assert_eq!(quote.statut, QuoteStatus::Sent);
        assert_eq!(quote.tva, VatRate::STANDARD);
        assert_eq!(quote.total_ht, dec!(250.01));
        assert_eq!(quote.lines().len(), 1);
        assert_eq!(quote.lines()[0].subtotal(), dec!(200.00));
        assert_eq!(quote.lines()[0].product_name(), "Produit sans nom");
    }

    #[test]
    fn test_quote_lines_empty_when_relation_missing() {
        let json = r#"{
            "id": 12,
            "numero_devis": "DEV-20240105-007",
            "client_id": 3,
            "date_devis": "2024-01-05",
            "date_validite": "2024-02-04",
            "statut": "draft",
            "total_ht": "0.00",
            "tva": "20",
            "total_ttc": "0.00",
            "client": null,
            "details": null,
            "created_at": "2024-01-05T10:30:00.000000Z",
            "updated_at": "2024-01-05T10:30:00.000000Z"
        }"#;

        let quote: Quote = serde_json::from_str(json).unwrap();
        assert!(quote.lines().is_empty());
        assert_eq!(quote.user_id, 0);
    }
}
