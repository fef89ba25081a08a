//! Mapping outcome types: scored candidates, decisions, and explanations.
//!
//! Everything here is assembled deterministically from the scorer's output so
//! a reviewer can reconstruct exactly why a SKU was or was not chosen.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::catalog::{CatalogEntry, Material, SkuCode};

/// Per-axis sub-scores, each in [0, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub fuzzy: f64,
    pub size: f64,
    pub material: f64,
    pub alias: f64,
}

/// One reason a sub-score contributed to a candidate's total.
///
/// Tagged variants carry their numeric contribution so downstream consumers
/// never parse strings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchReason {
    FuzzyMatch { similarity: f64 },
    SizeWithinTolerance { difference_mm: f64, tolerance_mm: f64 },
    SizePartial { difference_mm: f64, tolerance_mm: f64 },
    MaterialExact { material: Material },
    MaterialSimilarity { score: f64 },
    AliasHit { alias: String, score: f64 },
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FuzzyMatch { similarity } => {
                write!(f, "description similarity {:.0}%", similarity * 100.0)
            }
            Self::SizeWithinTolerance { difference_mm, tolerance_mm } => {
                write!(f, "size within tolerance ({difference_mm:.1}mm of {tolerance_mm:.1}mm)")
            }
            Self::SizePartial { difference_mm, tolerance_mm } => {
                write!(f, "size near tolerance ({difference_mm:.1}mm vs {tolerance_mm:.1}mm)")
            }
            Self::MaterialExact { material } => write!(f, "material {material} matches exactly"),
            Self::MaterialSimilarity { score } => {
                write!(f, "material compatible ({:.0}%)", score * 100.0)
            }
            Self::AliasHit { alias, score } => {
                write!(f, "known alias \"{alias}\" ({:.0}%)", score * 100.0)
            }
        }
    }
}

/// A catalog entry paired with its score for one request line.
///
/// Ephemeral: built per line, consumed by the decision engine, discarded.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredCandidate {
    pub entry: CatalogEntry,
    pub total: f64,
    pub breakdown: ScoreBreakdown,
    pub reasons: Vec<MatchReason>,
}

/// Terminal status of one line's mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingStatus {
    AutoMapped,
    NeedsReview,
    Failed,
}

impl MappingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutoMapped => "auto_mapped",
            Self::NeedsReview => "needs_review",
            Self::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto_mapped" => Some(Self::AutoMapped),
            "needs_review" => Some(Self::NeedsReview),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Confidence in the top candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

/// Compact view of one ranked candidate, surfaced for human review.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub sku_code: SkuCode,
    pub score: f64,
    pub reasons: String,
}

impl CandidateSummary {
    pub fn from_candidate(candidate: &ScoredCandidate) -> Self {
        let reasons = candidate
            .reasons
            .iter()
            .map(|reason| reason.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Self { sku_code: candidate.entry.code.clone(), score: candidate.total, reasons }
    }
}

/// Auditable record of how a mapping decision was reached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// Axes whose sub-score exceeded 0.5 on the top candidate.
    pub matched_fields: Vec<String>,
    /// Sub-score breakdown of the top candidate, absent when no candidates.
    pub breakdown: Option<ScoreBreakdown>,
    /// Size tolerance applied to the top candidate, in millimetres.
    pub tolerance_mm: f64,
    pub material_exact: bool,
    pub assumptions: Vec<String>,
    pub confidence: ConfidenceLevel,
    pub needs_review: bool,
}

/// Final outcome for one request line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MappingResult {
    pub status: MappingStatus,
    /// Present if and only if status is `auto_mapped`.
    pub selected_sku: Option<SkuCode>,
    /// Top candidates (at most three), always populated when any exist.
    pub candidates: Vec<CandidateSummary>,
    pub explanation: Explanation,
}
