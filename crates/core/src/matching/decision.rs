//! Threshold/margin decision policy over ranked candidates.
//!
//! Two thresholds, not one: an absolute floor alone cannot tell "one clearly
//! best candidate at 0.72" apart from "two near-identical candidates at 0.72
//! and 0.71" — the second case needs a human even though the absolute score
//! looks fine.

use super::{MATCHED_FIELD_THRESHOLD, MEDIUM_CONFIDENCE_FLOOR, TOP_CANDIDATES};
use crate::domain::mapping::{
    CandidateSummary, ConfidenceLevel, Explanation, MappingResult, MappingStatus, MatchReason,
    ScoredCandidate,
};

/// Engine seam for the mapping decision.
pub trait DecisionEngine: Send + Sync {
    /// Decide on a candidate list already sorted by descending score.
    fn decide(&self, candidates: &[ScoredCandidate], default_tolerance_mm: f64) -> MappingResult;
}

/// Deterministic absolute-floor plus relative-margin policy.
#[derive(Clone, Copy, Debug)]
pub struct ThresholdMarginPolicy {
    pub auto_map_threshold: f64,
    pub confidence_delta: f64,
}

impl ThresholdMarginPolicy {
    pub fn new(auto_map_threshold: f64, confidence_delta: f64) -> Self {
        Self { auto_map_threshold, confidence_delta }
    }
}

impl DecisionEngine for ThresholdMarginPolicy {
    fn decide(&self, candidates: &[ScoredCandidate], default_tolerance_mm: f64) -> MappingResult {
        let Some(top) = candidates.first() else {
            return MappingResult {
                status: MappingStatus::Failed,
                selected_sku: None,
                candidates: Vec::new(),
                explanation: Explanation {
                    matched_fields: Vec::new(),
                    breakdown: None,
                    tolerance_mm: default_tolerance_mm,
                    material_exact: false,
                    assumptions: vec!["no suitable candidates found".to_owned()],
                    confidence: ConfidenceLevel::Low,
                    needs_review: true,
                },
            };
        };

        let margin = candidates.get(1).map(|second| top.total - second.total);
        let margin_ok = margin.map_or(true, |m| m >= self.confidence_delta);

        let confidence = if top.total >= self.auto_map_threshold && margin_ok {
            ConfidenceLevel::High
        } else if top.total >= MEDIUM_CONFIDENCE_FLOOR {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        };

        let needs_review = top.total < self.auto_map_threshold || !margin_ok;
        let status =
            if needs_review { MappingStatus::NeedsReview } else { MappingStatus::AutoMapped };
        let selected_sku = (status == MappingStatus::AutoMapped).then(|| top.entry.code.clone());

        let summaries = candidates
            .iter()
            .take(TOP_CANDIDATES)
            .map(CandidateSummary::from_candidate)
            .collect();

        let breakdown = top.breakdown;
        let mut matched_fields = Vec::new();
        for (field, value) in [
            ("fuzzy", breakdown.fuzzy),
            ("size", breakdown.size),
            ("material", breakdown.material),
            ("alias", breakdown.alias),
        ] {
            if value > MATCHED_FIELD_THRESHOLD {
                matched_fields.push(field.to_owned());
            }
        }

        let tolerance_mm = top.entry.tolerance_mm(default_tolerance_mm);
        let material_exact =
            top.reasons.iter().any(|reason| matches!(reason, MatchReason::MaterialExact { .. }));

        let mut assumptions = Vec::new();
        if let Some(margin) = margin {
            if margin < self.confidence_delta {
                assumptions.push(format!(
                    "top two candidates within {margin:.3} of each other, below margin {:.3}",
                    self.confidence_delta
                ));
            }
        }

        MappingResult {
            status,
            selected_sku,
            candidates: summaries,
            explanation: Explanation {
                matched_fields,
                breakdown: Some(breakdown),
                tolerance_mm,
                material_exact,
                assumptions,
                confidence,
                needs_review,
            },
        }
    }
}
