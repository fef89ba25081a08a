//! Build-once alias index: known free-text phrases keyed by SKU.

use std::collections::HashMap;

use tracing::warn;

use crate::domain::alias::AliasEntry;
use crate::domain::catalog::SkuCode;

/// One alias registered against a SKU, boost clamped to (0, 1].
#[derive(Clone, Debug, PartialEq)]
pub struct AliasBoost {
    pub alias: String,
    pub boost: f64,
}

/// Minimal built-in alias table, used when the alias source is unavailable.
///
/// Matching must degrade to reduced alias coverage, never to a hard error.
const SEED_ALIASES: &[(&str, &str, f64)] = &[
    ("nfc pipe", "NFC25", 0.9),
    ("flexible conduit", "NFC25", 0.7),
    ("corrugated pipe", "NFC25", 0.7),
    ("rigid conduit", "RPC20", 0.7),
    ("pvc pipe heavy", "RPC20", 0.6),
];

/// Read-only alias index grouped by SKU code.
///
/// Built once before matching begins; lookups borrow, nothing mutates.
#[derive(Clone, Debug, Default)]
pub struct AliasIndex {
    by_sku: HashMap<SkuCode, Vec<AliasBoost>>,
    alias_count: usize,
}

impl AliasIndex {
    /// Group alias entries by SKU code, lowercasing aliases and clamping
    /// out-of-range boosts.
    pub fn build(entries: Vec<AliasEntry>) -> Self {
        let mut by_sku: HashMap<SkuCode, Vec<AliasBoost>> = HashMap::new();
        let mut alias_count = 0;

        for entry in entries {
            let alias = entry.alias.trim().to_ascii_lowercase();
            if alias.is_empty() {
                continue;
            }
            let boost = entry.boost.clamp(f64::EPSILON, 1.0);
            if boost != entry.boost {
                warn!(
                    event_name = "alias_index.boost_clamped",
                    sku_code = %entry.sku_code,
                    raw_boost = entry.boost,
                    "alias boost outside (0,1], clamped"
                );
            }
            by_sku.entry(entry.sku_code).or_default().push(AliasBoost { alias, boost });
            alias_count += 1;
        }

        Self { by_sku, alias_count }
    }

    /// Index built from the embedded seed table.
    pub fn seed() -> Self {
        Self::build(
            SEED_ALIASES
                .iter()
                .map(|(alias, code, boost)| AliasEntry::new(*alias, *code, *boost))
                .collect(),
        )
    }

    /// Build from a loaded alias list, falling back to the seed table when
    /// the source yielded nothing.
    pub fn build_or_seed(entries: Vec<AliasEntry>) -> Self {
        if entries.is_empty() {
            warn!(
                event_name = "alias_index.seed_fallback",
                "alias source empty or unavailable, using built-in seed table"
            );
            return Self::seed();
        }
        Self::build(entries)
    }

    pub fn boosts_for(&self, code: &SkuCode) -> &[AliasBoost] {
        self.by_sku.get(code).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.alias_count
    }

    pub fn is_empty(&self) -> bool {
        self.alias_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_aliases_by_sku_code() {
        let index = AliasIndex::build(vec![
            AliasEntry::new("nfc pipe", "NFC25", 0.9),
            AliasEntry::new("Flexible Conduit", "NFC25", 0.7),
            AliasEntry::new("rigid conduit", "RPC20", 0.8),
        ]);

        let boosts = index.boosts_for(&SkuCode("NFC25".to_owned()));
        assert_eq!(boosts.len(), 2);
        assert_eq!(boosts[1].alias, "flexible conduit");
        assert_eq!(index.boosts_for(&SkuCode("RPC20".to_owned())).len(), 1);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn unknown_sku_yields_empty_slice() {
        let index = AliasIndex::build(Vec::new());
        assert!(index.boosts_for(&SkuCode("MISSING".to_owned())).is_empty());
    }

    #[test]
    fn empty_source_falls_back_to_seed() {
        let index = AliasIndex::build_or_seed(Vec::new());
        assert!(!index.is_empty());
        assert!(!index.boosts_for(&SkuCode("NFC25".to_owned())).is_empty());
    }

    #[test]
    fn out_of_range_boosts_are_clamped() {
        let index = AliasIndex::build(vec![
            AliasEntry::new("big boost", "X1", 1.7),
            AliasEntry::new("", "X1", 0.5),
        ]);

        let boosts = index.boosts_for(&SkuCode("X1".to_owned()));
        assert_eq!(boosts.len(), 1);
        assert_eq!(boosts[0].boost, 1.0);
    }
}
