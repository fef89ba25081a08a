//! Request-line domain types.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::{Gauge, Material, ProductFamily, UnitOfMeasure};
use crate::matching::normalize;

/// Raw token substrings extracted from a request line by the upstream parser.
///
/// Extraction itself (email/chat/CSV tokenization) happens outside this crate;
/// these are opaque fragments until the normalizer canonicalizes them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTokens {
    pub size: Option<String>,
    pub material: Option<String>,
    pub gauge: Option<String>,
    pub color: Option<String>,
}

/// Canonical projection of a request line, produced once at construction.
///
/// Absent fields mean the raw token was missing or unparseable; downstream
/// scoring treats that as partial credit, never as an error.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedLine {
    pub size_mm: Option<f64>,
    pub material: Option<Material>,
    pub gauge: Option<Gauge>,
    pub color: Option<String>,
    pub family: Option<ProductFamily>,
}

/// One parsed RFQ line, immutable after normalization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RequestLine {
    pub text: String,
    pub quantity: f64,
    pub uom: UnitOfMeasure,
    pub tokens: RawTokens,
    pub normalized: NormalizedLine,
}

impl RequestLine {
    /// Build a line from raw input, running normalization exactly once.
    pub fn new(
        text: impl Into<String>,
        quantity: f64,
        uom: UnitOfMeasure,
        tokens: RawTokens,
    ) -> Self {
        let text = text.into();
        let normalized = normalize::normalize(&text, &tokens);
        Self { text, quantity, uom, tokens, normalized }
    }

    /// Build a line from free text alone, extracting tokens heuristically.
    ///
    /// This is the ad-hoc probe path; production callers supply tokens from
    /// the upstream parser.
    pub fn from_text(text: impl Into<String>, quantity: f64, uom: UnitOfMeasure) -> Self {
        let text = text.into();
        let tokens = normalize::extract_tokens(&text);
        Self::new(text, quantity, uom, tokens)
    }

    /// Requested quantity expressed in linear metres, where the unit allows.
    pub fn quantity_metres(&self) -> Option<f64> {
        self.uom.to_metres(self.quantity)
    }
}
