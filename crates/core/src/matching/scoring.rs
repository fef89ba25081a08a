//! Weighted candidate scoring along four independent axes.

use serde::{Deserialize, Serialize};

use super::aliases::AliasIndex;
use super::filter::{CompatibilityRules, MaterialMatch};
use super::{
    ALIAS_REASON_THRESHOLD, FUZZY_REASON_THRESHOLD, MATERIAL_EXACT_THRESHOLD,
    MATERIAL_SIMILARITY_THRESHOLD, SIZE_FULL_THRESHOLD, SIZE_PARTIAL_THRESHOLD,
};
use crate::domain::catalog::{CatalogEntry, ProductFamily};
use crate::domain::line::RequestLine;
use crate::domain::mapping::{MatchReason, ScoreBreakdown, ScoredCandidate};

/// Weights for the four scoring axes.
///
/// Weights are not required to sum to 1; the total is capped at 1.0 and
/// capping absorbs any overflow.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub fuzzy: f64,
    pub size: f64,
    pub material: f64,
    pub alias: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        super::DEFAULT_WEIGHTS
    }
}

/// A family whose exact material match also requires gauge equality.
///
/// On gauge mismatch the material sub-score drops to `mismatch_score`
/// instead of 1.0.
#[derive(Clone, Debug)]
pub struct GaugeRule {
    pub family: ProductFamily,
    pub mismatch_score: f64,
}

impl GaugeRule {
    /// The gauge-sensitive families observed in the reference catalog.
    pub fn default_rules() -> Vec<Self> {
        vec![Self { family: ProductFamily::RigidPvcConduit, mismatch_score: 0.7 }]
    }
}

/// Engine seam for scoring admissible candidates.
pub trait CandidateScoring: Send + Sync {
    fn score(&self, line: &RequestLine, entry: &CatalogEntry, aliases: &AliasIndex)
        -> ScoredCandidate;
}

/// Deterministic weighted scorer.
#[derive(Clone, Debug)]
pub struct WeightedScorer {
    weights: ScoringWeights,
    material_rules: CompatibilityRules,
    gauge_rules: Vec<GaugeRule>,
    default_tolerance_mm: f64,
}

impl WeightedScorer {
    pub fn new(
        weights: ScoringWeights,
        material_rules: CompatibilityRules,
        gauge_rules: Vec<GaugeRule>,
        default_tolerance_mm: f64,
    ) -> Self {
        Self { weights, material_rules, gauge_rules, default_tolerance_mm }
    }

    /// Normalized edit-distance similarity between line text and description.
    fn fuzzy_score(&self, line: &RequestLine, entry: &CatalogEntry) -> f64 {
        strsim::normalized_levenshtein(
            &line.text.to_ascii_lowercase(),
            &entry.description.to_ascii_lowercase(),
        )
    }

    /// Tiered size score plus the (difference, tolerance) pair it was scored
    /// against, when both sides carried a size.
    fn size_score(&self, line: &RequestLine, entry: &CatalogEntry) -> (f64, Option<(f64, f64)>) {
        let (Some(line_size), Some(sku_size)) = (line.normalized.size_mm, entry.nominal_size_mm)
        else {
            return (0.0, None);
        };

        let difference = (line_size - sku_size).abs();
        let tolerance = entry.tolerance_mm(self.default_tolerance_mm);
        let score = if difference <= tolerance {
            1.0
        } else if difference <= 2.0 * tolerance {
            0.7
        } else if difference <= 4.0 * tolerance {
            0.3
        } else {
            0.0
        };
        (score, Some((difference, tolerance)))
    }

    fn material_score(&self, line: &RequestLine, entry: &CatalogEntry) -> f64 {
        match self.material_rules.classify(line.normalized.material, entry) {
            MaterialMatch::Exact => {
                let gauge_sensitive =
                    self.gauge_rules.iter().find(|rule| rule.family == entry.family);
                match gauge_sensitive {
                    Some(rule) if line.normalized.gauge != entry.gauge => rule.mismatch_score,
                    _ => 1.0,
                }
            }
            MaterialMatch::Compatible => 0.7,
            MaterialMatch::BothUnset => 0.5,
            MaterialMatch::OneUnset => 0.2,
            MaterialMatch::Incompatible => 0.0,
        }
    }

    /// Best alias evidence for this SKU: word-overlap ratio scaled by boost,
    /// or whole-text containment at 0.8 of the boost, whichever is larger.
    fn alias_score(
        &self,
        line: &RequestLine,
        entry: &CatalogEntry,
        aliases: &AliasIndex,
    ) -> (f64, Option<String>) {
        let line_lower = line.text.to_ascii_lowercase();
        let line_words: Vec<&str> = line_lower.split_whitespace().collect();
        let line_flat = strip_non_alphanumeric(&line_lower);

        let mut best = 0.0_f64;
        let mut best_alias = None;
        for registered in aliases.boosts_for(&entry.code) {
            let alias_words: Vec<&str> = registered.alias.split_whitespace().collect();
            let mut candidate = if alias_words.is_empty() {
                0.0
            } else {
                let matched = alias_words
                    .iter()
                    .filter(|alias_word| {
                        line_words.iter().any(|line_word| {
                            line_word.contains(*alias_word) || alias_word.contains(line_word)
                        })
                    })
                    .count();
                matched as f64 / alias_words.len() as f64 * registered.boost
            };

            let alias_flat = strip_non_alphanumeric(&registered.alias);
            if !alias_flat.is_empty()
                && !line_flat.is_empty()
                && (line_flat.contains(&alias_flat) || alias_flat.contains(&line_flat))
            {
                candidate = candidate.max(registered.boost * 0.8);
            }

            if candidate > best {
                best = candidate;
                best_alias = Some(registered.alias.clone());
            }
        }
        (best.min(1.0), best_alias)
    }

    fn reasons(
        &self,
        line: &RequestLine,
        breakdown: &ScoreBreakdown,
        size_context: Option<(f64, f64)>,
        best_alias: Option<String>,
    ) -> Vec<MatchReason> {
        let mut reasons = Vec::new();

        if breakdown.fuzzy > FUZZY_REASON_THRESHOLD {
            reasons.push(MatchReason::FuzzyMatch { similarity: breakdown.fuzzy });
        }
        if let Some((difference_mm, tolerance_mm)) = size_context {
            if breakdown.size > SIZE_FULL_THRESHOLD {
                reasons.push(MatchReason::SizeWithinTolerance { difference_mm, tolerance_mm });
            } else if breakdown.size > SIZE_PARTIAL_THRESHOLD {
                reasons.push(MatchReason::SizePartial { difference_mm, tolerance_mm });
            }
        }
        if breakdown.material > MATERIAL_EXACT_THRESHOLD {
            if let Some(material) = line.normalized.material {
                reasons.push(MatchReason::MaterialExact { material });
            }
        } else if breakdown.material > MATERIAL_SIMILARITY_THRESHOLD {
            reasons.push(MatchReason::MaterialSimilarity { score: breakdown.material });
        }
        if breakdown.alias > ALIAS_REASON_THRESHOLD {
            if let Some(alias) = best_alias {
                reasons.push(MatchReason::AliasHit { alias, score: breakdown.alias });
            }
        }

        reasons
    }
}

impl CandidateScoring for WeightedScorer {
    fn score(
        &self,
        line: &RequestLine,
        entry: &CatalogEntry,
        aliases: &AliasIndex,
    ) -> ScoredCandidate {
        let fuzzy = self.fuzzy_score(line, entry);
        let (size, size_context) = self.size_score(line, entry);
        let material = self.material_score(line, entry);
        let (alias, best_alias) = self.alias_score(line, entry, aliases);

        let breakdown = ScoreBreakdown { fuzzy, size, material, alias };
        let total = (fuzzy * self.weights.fuzzy
            + size * self.weights.size
            + material * self.weights.material
            + alias * self.weights.alias)
            .min(1.0);

        let reasons = self.reasons(line, &breakdown, size_context, best_alias);
        ScoredCandidate { entry: entry.clone(), total, breakdown, reasons }
    }
}

fn strip_non_alphanumeric(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::catalog::{Gauge, Material, SkuCode, UnitOfMeasure};
    use crate::domain::line::{RawTokens, RequestLine};

    #[test]
    fn size_score_follows_tolerance_tiers() {
        let scorer = scorer_fixture();
        let entry = entry_fixture();

        // tolerance is 2mm on the fixture entry
        assert_eq!(score_at(&scorer, &entry, 26.0).breakdown.size, 1.0);
        assert_eq!(score_at(&scorer, &entry, 28.0).breakdown.size, 0.7);
        assert_eq!(score_at(&scorer, &entry, 32.0).breakdown.size, 0.3);
        assert_eq!(score_at(&scorer, &entry, 35.0).breakdown.size, 0.0);
    }

    #[test]
    fn missing_size_scores_zero() {
        let scorer = scorer_fixture();
        let line = line_fixture("corrugated pp pipe", None, Some("pp"), None);

        let scored = scorer.score(&line, &entry_fixture(), &AliasIndex::default());
        assert_eq!(scored.breakdown.size, 0.0);
    }

    #[test]
    fn material_scores_exact_unset_and_one_sided_cases() {
        let scorer = scorer_fixture();
        let mut entry = entry_fixture();

        let exact = line_fixture("25mm corrugated pp pipe", Some("25mm"), Some("pp"), None);
        assert_eq!(scorer.score(&exact, &entry, &AliasIndex::default()).breakdown.material, 1.0);

        let unset = line_fixture("25mm corrugated pipe", Some("25mm"), None, None);
        assert_eq!(scorer.score(&unset, &entry, &AliasIndex::default()).breakdown.material, 0.2);

        entry.material = None;
        assert_eq!(scorer.score(&unset, &entry, &AliasIndex::default()).breakdown.material, 0.5);
    }

    #[test]
    fn hierarchy_compatible_material_scores_similarity() {
        let scorer = scorer_fixture();
        let line = line_fixture("25mm corrugated frpp pipe", Some("25mm"), Some("frpp"), None);

        let scored = scorer.score(&line, &entry_fixture(), &AliasIndex::default());
        assert_eq!(scored.breakdown.material, 0.7);
        assert!(scored
            .reasons
            .iter()
            .any(|r| matches!(r, MatchReason::MaterialSimilarity { .. })));
    }

    #[test]
    fn rigid_conduit_material_match_requires_gauge_equality() {
        let scorer = scorer_fixture();
        let mut entry = entry_fixture();
        entry.family = ProductFamily::RigidPvcConduit;
        entry.description = "20mm rigid pvc conduit heavy".to_owned();
        entry.material = Some(Material::Pvc);
        entry.gauge = Some(Gauge::Heavy);
        entry.nominal_size_mm = Some(20.0);

        let matched = line_fixture("20mm rigid pvc conduit", Some("20mm"), Some("pvc"), Some("h"));
        assert_eq!(scorer.score(&matched, &entry, &AliasIndex::default()).breakdown.material, 1.0);

        let mismatched =
            line_fixture("20mm rigid pvc conduit", Some("20mm"), Some("pvc"), Some("l"));
        assert_eq!(
            scorer.score(&mismatched, &entry, &AliasIndex::default()).breakdown.material,
            0.7
        );
    }

    #[test]
    fn alias_word_overlap_scales_with_boost() {
        let scorer = scorer_fixture();
        let aliases = AliasIndex::build(vec![crate::domain::alias::AliasEntry::new(
            "corrugated pipe",
            "NFC25",
            0.9,
        )]);
        let line = line_fixture("25mm corrugated pp pipe", Some("25mm"), Some("pp"), None);

        let scored = scorer.score(&line, &entry_fixture(), &aliases);
        // both alias words appear in the line, full-text containment does not beat it
        assert!((scored.breakdown.alias - 0.9).abs() < 1e-9);
        assert!(scored.reasons.iter().any(|r| matches!(r, MatchReason::AliasHit { .. })));
    }

    #[test]
    fn alias_containment_applies_reduced_boost() {
        let scorer = scorer_fixture();
        let aliases = AliasIndex::build(vec![crate::domain::alias::AliasEntry::new(
            "nfc-25 flex",
            "NFC25",
            1.0,
        )]);
        let line = line_fixture("nfc25flex", None, None, None);

        let scored = scorer.score(&line, &entry_fixture(), &aliases);
        // word overlap fails ("nfc-25" vs "nfc25flex" matches "flex" only after
        // the containment path strips punctuation), containment gives 0.8
        assert!(scored.breakdown.alias >= 0.8);
    }

    #[test]
    fn total_is_weighted_sum_capped_at_one() {
        let scorer = WeightedScorer::new(
            ScoringWeights { fuzzy: 1.0, size: 1.0, material: 1.0, alias: 1.0 },
            CompatibilityRules::default_rules(),
            GaugeRule::default_rules(),
            2.0,
        );
        let line = line_fixture("25mm corrugated flexible pipe", Some("25mm"), Some("pp"), None);

        let scored = scorer.score(&line, &entry_fixture(), &AliasIndex::default());
        assert_eq!(scored.total, 1.0);
    }

    fn score_at(scorer: &WeightedScorer, entry: &CatalogEntry, size_mm: f64) -> ScoredCandidate {
        let token = format!("{size_mm}mm");
        let line = line_fixture("corrugated pp pipe", Some(&token), Some("pp"), None);
        scorer.score(&line, entry, &AliasIndex::default())
    }

    fn scorer_fixture() -> WeightedScorer {
        WeightedScorer::new(
            ScoringWeights::default(),
            CompatibilityRules::default_rules(),
            GaugeRule::default_rules(),
            2.0,
        )
    }

    fn line_fixture(
        text: &str,
        size: Option<&str>,
        material: Option<&str>,
        gauge: Option<&str>,
    ) -> RequestLine {
        RequestLine::new(
            text,
            100.0,
            UnitOfMeasure::Metre,
            RawTokens {
                size: size.map(str::to_owned),
                material: material.map(str::to_owned),
                gauge: gauge.map(str::to_owned),
                color: None,
            },
        )
    }

    fn entry_fixture() -> CatalogEntry {
        CatalogEntry {
            code: SkuCode("NFC25".to_owned()),
            family: ProductFamily::CorrugatedFlexiblePipe,
            description: "25mm corrugated flexible pipe".to_owned(),
            uom: UnitOfMeasure::Metre,
            material: Some(Material::Pp),
            alternate_material: None,
            gauge: None,
            nominal_size_mm: Some(25.0),
            size_tolerance_mm: Some(2.0),
            unit_rate: Decimal::new(1250, 2),
            lead_time_days: 7,
            min_order_qty: 100,
        }
    }
}
