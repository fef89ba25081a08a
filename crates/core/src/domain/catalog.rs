//! Catalog domain types: SKUs, families, materials, gauges.
//!
//! A catalog is loaded once per matching session and treated as read-only
//! until it is replaced wholesale by a reload.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Unique key of a catalog product.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkuCode(pub String);

impl fmt::Display for SkuCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Product family a SKU belongs to.
///
/// Families gate hard-constraint filtering: a line whose inferred family is
/// known may only match SKUs of the same family.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductFamily {
    CorrugatedFlexiblePipe,
    RigidPvcConduit,
    Other(String),
}

impl ProductFamily {
    pub fn as_str(&self) -> &str {
        match self {
            Self::CorrugatedFlexiblePipe => "corrugated_flexible_pipe",
            Self::RigidPvcConduit => "rigid_pvc_conduit",
            Self::Other(name) => name.as_str(),
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "corrugated_flexible_pipe" => Self::CorrugatedFlexiblePipe,
            "rigid_pvc_conduit" => Self::RigidPvcConduit,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// Closed set of canonical material codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    Pvc,
    Pp,
    Frpp,
    Fr,
    Ms,
    Nylon,
    Hdpe,
    Ldpe,
}

impl Material {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pvc => "PVC",
            Self::Pp => "PP",
            Self::Frpp => "FRPP",
            Self::Fr => "FR",
            Self::Ms => "MS",
            Self::Nylon => "NYLON",
            Self::Hdpe => "HDPE",
            Self::Ldpe => "LDPE",
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse thickness classification for conduit products.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gauge {
    Light,
    Medium,
    Heavy,
}

impl Gauge {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "L",
            Self::Medium => "M",
            Self::Heavy => "H",
        }
    }
}

/// Unit of measure for quantities on both lines and SKUs.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitOfMeasure {
    Metre,
    Piece,
    Coil,
    Kilogram,
    Other(String),
}

/// Fixed linear length of one coil, in metres.
pub const COIL_LENGTH_M: f64 = 30.0;

impl UnitOfMeasure {
    /// Convert a quantity in this unit to linear metres, where meaningful.
    pub fn to_metres(&self, quantity: f64) -> Option<f64> {
        match self {
            Self::Metre => Some(quantity),
            Self::Coil => Some(quantity * COIL_LENGTH_M),
            Self::Piece | Self::Kilogram | Self::Other(_) => None,
        }
    }
}

/// A canonical catalog product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub code: SkuCode,
    pub family: ProductFamily,
    pub description: String,
    pub uom: UnitOfMeasure,
    pub material: Option<Material>,
    /// Secondary material this SKU can be supplied in, if any.
    pub alternate_material: Option<Material>,
    pub gauge: Option<Gauge>,
    pub nominal_size_mm: Option<f64>,
    /// Per-SKU size tolerance; the global default applies when absent.
    pub size_tolerance_mm: Option<f64>,
    pub unit_rate: Decimal,
    pub lead_time_days: u32,
    pub min_order_qty: u32,
}

impl CatalogEntry {
    /// Tolerance applied to size comparisons against this SKU.
    pub fn tolerance_mm(&self, default_tolerance_mm: f64) -> f64 {
        self.size_tolerance_mm.unwrap_or(default_tolerance_mm)
    }
}

/// Immutable catalog loaded for one matching session.
///
/// Entry order is the provider's iteration order and is the tie-break order
/// for equal-score candidates, so it must never be shuffled.
#[derive(Clone, Debug)]
pub struct CatalogSnapshot {
    entries: Vec<CatalogEntry>,
    loaded_at: DateTime<Utc>,
}

impl CatalogSnapshot {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries, loaded_at: Utc::now() }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}
