//! Deterministic SKU matching engine.
//!
//! Pipeline per request line, leaves first: normalize (at line construction),
//! hard-constraint filter, weighted scoring with alias boosts, then the
//! threshold/margin decision. Everything operates on an immutable catalog
//! snapshot; reload means building a new engine, never mutating a live one.

pub mod aliases;
pub mod decision;
pub mod filter;
pub mod normalize;
pub mod scoring;

use tracing::{debug, info, warn};

use self::aliases::AliasIndex;
use self::decision::{DecisionEngine, ThresholdMarginPolicy};
use self::filter::{AdmissibilityFilter, CompatibilityRules, HardConstraintFilter};
use self::scoring::{CandidateScoring, GaugeRule, ScoringWeights, WeightedScorer};
use crate::config::MappingConfig;
use crate::domain::catalog::{CatalogEntry, CatalogSnapshot};
use crate::domain::line::RequestLine;
use crate::domain::mapping::{MappingResult, ScoredCandidate};
use crate::errors::{ApplicationError, DomainError};
use crate::providers::{AliasProvider, CatalogProvider};

/// Default scoring weights.
pub const DEFAULT_WEIGHTS: ScoringWeights =
    ScoringWeights { fuzzy: 0.30, size: 0.30, material: 0.25, alias: 0.15 };

/// Candidates surfaced for human review.
pub const TOP_CANDIDATES: usize = 3;

/// Floor for medium confidence when the high-confidence criteria fail.
pub const MEDIUM_CONFIDENCE_FLOOR: f64 = 0.6;

/// Sub-score informativeness thresholds for reason emission.
pub const FUZZY_REASON_THRESHOLD: f64 = 0.5;
pub const SIZE_FULL_THRESHOLD: f64 = 0.8;
pub const SIZE_PARTIAL_THRESHOLD: f64 = 0.5;
pub const MATERIAL_EXACT_THRESHOLD: f64 = 0.9;
pub const MATERIAL_SIMILARITY_THRESHOLD: f64 = 0.5;
pub const ALIAS_REASON_THRESHOLD: f64 = 0.5;

/// Sub-score level above which an axis counts as a matched field.
pub const MATCHED_FIELD_THRESHOLD: f64 = 0.5;

/// One-shot construction of catalog snapshot, alias index, and engines.
///
/// Generic over the three engine seams the way the CPQ runtime composes its
/// constraint, pricing, and policy engines; `MappingEngine::with_config`
/// builds the deterministic production combination.
#[derive(Debug)]
pub struct MappingEngine<F = HardConstraintFilter, S = WeightedScorer, D = ThresholdMarginPolicy> {
    catalog: CatalogSnapshot,
    aliases: AliasIndex,
    filter: F,
    scorer: S,
    decision: D,
    default_tolerance_mm: f64,
}

impl MappingEngine {
    /// Build the deterministic engine from a catalog, alias index, and config.
    ///
    /// An empty catalog is rejected here rather than guaranteeing a `failed`
    /// result for every line downstream.
    pub fn with_config(
        entries: Vec<CatalogEntry>,
        aliases: AliasIndex,
        config: &MappingConfig,
    ) -> Result<Self, DomainError> {
        if entries.is_empty() {
            return Err(DomainError::EmptyCatalog);
        }

        let tolerance = config.default_size_tolerance_mm;
        let material_rules = CompatibilityRules::default_rules();
        let engine = Self {
            catalog: CatalogSnapshot::new(entries),
            filter: HardConstraintFilter::new(material_rules.clone(), tolerance),
            scorer: WeightedScorer::new(
                config.weights,
                material_rules,
                GaugeRule::default_rules(),
                tolerance,
            ),
            decision: ThresholdMarginPolicy::new(
                config.auto_map_threshold,
                config.confidence_delta,
            ),
            default_tolerance_mm: tolerance,
            aliases,
        };

        info!(
            event_name = "matching.engine_built",
            catalog_entries = engine.catalog.len(),
            alias_count = engine.aliases.len(),
            auto_map_threshold = config.auto_map_threshold,
            confidence_delta = config.confidence_delta,
            "mapping engine constructed"
        );
        Ok(engine)
    }

    /// Load catalog and aliases from providers, then build the engine.
    ///
    /// Alias-source failures degrade to the seed table; catalog failures
    /// propagate, as does an empty catalog.
    pub fn from_providers(
        catalog: &dyn CatalogProvider,
        aliases: &dyn AliasProvider,
        config: &MappingConfig,
    ) -> Result<Self, ApplicationError> {
        let entries = catalog.all_entries()?;
        let alias_entries = aliases.alias_entries().unwrap_or_else(|error| {
            warn!(
                event_name = "matching.alias_source_failed",
                error = %error,
                "alias source failed to load, using built-in seed table"
            );
            Vec::new()
        });

        let index = AliasIndex::build_or_seed(alias_entries);
        Ok(Self::with_config(entries, index, config)?)
    }
}

impl<F, S, D> MappingEngine<F, S, D>
where
    F: AdmissibilityFilter,
    S: CandidateScoring,
    D: DecisionEngine,
{
    pub fn new(
        entries: Vec<CatalogEntry>,
        aliases: AliasIndex,
        filter: F,
        scorer: S,
        decision: D,
        default_tolerance_mm: f64,
    ) -> Result<Self, DomainError> {
        if entries.is_empty() {
            return Err(DomainError::EmptyCatalog);
        }
        Ok(Self {
            catalog: CatalogSnapshot::new(entries),
            aliases,
            filter,
            scorer,
            decision,
            default_tolerance_mm,
        })
    }

    pub fn catalog(&self) -> &CatalogSnapshot {
        &self.catalog
    }

    pub fn aliases(&self) -> &AliasIndex {
        &self.aliases
    }

    /// Admissible candidates for a line, scored and sorted by descending
    /// total. The sort is stable, so equal scores keep catalog order.
    pub fn rank_candidates(&self, line: &RequestLine) -> Vec<ScoredCandidate> {
        let mut candidates: Vec<ScoredCandidate> = self
            .catalog
            .entries()
            .iter()
            .filter(|entry| self.filter.admissible(line, entry))
            .map(|entry| self.scorer.score(line, entry, &self.aliases))
            .collect();

        candidates.sort_by(|a, b| {
            b.total.partial_cmp(&a.total).unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates
    }

    /// Map a single request line to its result.
    pub fn map_line(&self, line: &RequestLine) -> MappingResult {
        let candidates = self.rank_candidates(line);
        let result = self.decision.decide(&candidates, self.default_tolerance_mm);

        debug!(
            event_name = "matching.line_mapped",
            line_text = %line.text,
            status = result.status.as_str(),
            candidate_count = candidates.len(),
            top_score = candidates.first().map(|c| c.total).unwrap_or(0.0),
            "request line mapped"
        );
        result
    }

    /// Map a batch of lines, order-preserving, one result per line.
    ///
    /// Lines are independent; callers may shard batches across threads as
    /// long as they share one snapshot.
    pub fn map_lines(&self, lines: &[RequestLine]) -> Vec<MappingResult> {
        lines.iter().map(|line| self.map_line(line)).collect()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::config::MappingConfig;
    use crate::domain::catalog::{Material, ProductFamily, SkuCode, UnitOfMeasure};
    use crate::domain::line::{RawTokens, RequestLine};
    use crate::domain::mapping::MappingStatus;

    #[test]
    fn empty_catalog_is_rejected_at_construction() {
        let result =
            MappingEngine::with_config(Vec::new(), AliasIndex::seed(), &MappingConfig::default());
        assert_eq!(result.err(), Some(DomainError::EmptyCatalog));
    }

    #[test]
    fn corrugated_pp_line_auto_maps_to_matching_size() {
        let engine = engine_fixture();
        let line = line_fixture("25mm corrugated PP pipe", Some("25mm"), Some("pp"));

        let result = engine.map_line(&line);
        assert_eq!(result.status, MappingStatus::AutoMapped);
        assert_eq!(result.selected_sku, Some(SkuCode("NFC25".to_owned())));
        // NFC32 is 7mm away with 2mm tolerance: filtered before scoring
        assert_eq!(result.candidates.len(), 1);
    }

    #[test]
    fn ranking_is_monotonically_descending() {
        let engine = engine_fixture();
        let line = line_fixture("corrugated pipe", None, None);

        let candidates = engine.rank_candidates(&line);
        assert!(candidates.len() > 1);
        for pair in candidates.windows(2) {
            assert!(pair[0].total >= pair[1].total);
        }
    }

    #[test]
    fn repeated_invocations_are_bit_identical() {
        let engine = engine_fixture();
        let line = line_fixture("25mm corrugated PP pipe", Some("25mm"), Some("pp"));

        let first = engine.map_line(&line);
        let second = engine.map_line(&line);
        assert_eq!(first, second);
    }

    #[test]
    fn batch_mapping_preserves_input_order() {
        let engine = engine_fixture();
        let lines = vec![
            line_fixture("25mm corrugated PP pipe", Some("25mm"), Some("pp")),
            line_fixture("32mm corrugated PP pipe", Some("32mm"), Some("pp")),
        ];

        let results = engine.map_lines(&lines);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].selected_sku, Some(SkuCode("NFC25".to_owned())));
        assert_eq!(results[1].selected_sku, Some(SkuCode("NFC32".to_owned())));
    }

    fn engine_fixture() -> MappingEngine {
        MappingEngine::with_config(
            vec![entry("NFC25", 25.0), entry("NFC32", 32.0)],
            AliasIndex::default(),
            &MappingConfig::default(),
        )
        .expect("non-empty catalog")
    }

    fn line_fixture(text: &str, size: Option<&str>, material: Option<&str>) -> RequestLine {
        RequestLine::new(
            text,
            100.0,
            UnitOfMeasure::Metre,
            RawTokens {
                size: size.map(str::to_owned),
                material: material.map(str::to_owned),
                ..RawTokens::default()
            },
        )
    }

    fn entry(code: &str, size_mm: f64) -> CatalogEntry {
        CatalogEntry {
            code: SkuCode(code.to_owned()),
            family: ProductFamily::CorrugatedFlexiblePipe,
            description: format!("{size_mm}mm corrugated flexible pipe"),
            uom: UnitOfMeasure::Metre,
            material: Some(Material::Pp),
            alternate_material: None,
            gauge: None,
            nominal_size_mm: Some(size_mm),
            size_tolerance_mm: Some(2.0),
            unit_rate: Decimal::new(1250, 2),
            lead_time_days: 7,
            min_order_qty: 100,
        }
    }
}
