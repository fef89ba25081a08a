use serde::{Deserialize, Serialize};

use crate::domain::catalog::SkuCode;

/// A known free-text phrase referring to a specific SKU.
///
/// The boost scales the alias sub-score; it must lie in (0, 1].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AliasEntry {
    pub alias: String,
    pub sku_code: SkuCode,
    pub boost: f64,
}

impl AliasEntry {
    pub fn new(alias: impl Into<String>, sku_code: impl Into<String>, boost: f64) -> Self {
        Self { alias: alias.into(), sku_code: SkuCode(sku_code.into()), boost }
    }
}
