//! Token normalization: raw request-line fragments to canonical values.
//!
//! Every function here is pure and total. Unparseable input yields `None`,
//! never an error; scoring treats the absent field as partial credit.

use crate::domain::catalog::{Gauge, Material, ProductFamily};
use crate::domain::line::{NormalizedLine, RawTokens};

/// Millimetres per inch.
const MM_PER_INCH: f64 = 25.4;

/// Substring markers for material detection, checked in order.
///
/// FRPP precedes PP and FR: "frpp" contains both markers and is a refinement
/// of PP, not a separate family.
const MATERIAL_MARKERS: &[(&str, Material)] = &[
    ("frpp", Material::Frpp),
    ("pvc", Material::Pvc),
    ("nylon", Material::Nylon),
    ("hdpe", Material::Hdpe),
    ("ldpe", Material::Ldpe),
    ("pp", Material::Pp),
    ("fr", Material::Fr),
];

/// Keyword markers for product-family inference, checked in order.
const FAMILY_MARKERS: &[(&str, ProductFamily)] = &[
    ("corrugated", ProductFamily::CorrugatedFlexiblePipe),
    ("flexible", ProductFamily::CorrugatedFlexiblePipe),
    ("rigid", ProductFamily::RigidPvcConduit),
    ("conduit", ProductFamily::RigidPvcConduit),
];

/// Canonicalize all raw tokens of a line in one pass.
pub fn normalize(text: &str, tokens: &RawTokens) -> NormalizedLine {
    NormalizedLine {
        size_mm: tokens.size.as_deref().and_then(parse_size_mm),
        material: tokens.material.as_deref().and_then(canonical_material),
        gauge: tokens.gauge.as_deref().and_then(canonical_gauge),
        color: tokens.color.as_deref().map(normalize_color),
        family: infer_family(text),
    }
}

/// Parse a size token into millimetres.
///
/// Accepts a number followed by `mm`, `inch`, `in`, or `"`; inches convert at
/// 25.4. Anything else is `None`.
pub fn parse_size_mm(raw: &str) -> Option<f64> {
    let trimmed = raw.trim().to_ascii_lowercase();
    if trimmed.is_empty() {
        return None;
    }

    let digits_end = trimmed
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit() && *c != '.')
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    let value: f64 = trimmed[..digits_end].parse().ok()?;
    if !value.is_finite() || value <= 0.0 {
        return None;
    }

    match trimmed[digits_end..].trim() {
        "mm" => Some(value),
        "inch" | "in" | "\"" => Some(value * MM_PER_INCH),
        _ => None,
    }
}

/// Map free-text material descriptions onto the closed code set.
pub fn canonical_material(raw: &str) -> Option<Material> {
    let lowered = raw.trim().to_ascii_lowercase();
    if lowered.is_empty() {
        return None;
    }

    if lowered == "ms" || lowered.contains("mild steel") {
        return Some(Material::Ms);
    }
    MATERIAL_MARKERS
        .iter()
        .find(|(marker, _)| lowered.contains(marker))
        .map(|(_, material)| *material)
}

/// Map a gauge token onto Light/Medium/Heavy.
pub fn canonical_gauge(raw: &str) -> Option<Gauge> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "light" | "l" => Some(Gauge::Light),
        "medium" | "med" | "m" => Some(Gauge::Medium),
        "heavy" | "h" => Some(Gauge::Heavy),
        _ => None,
    }
}

/// Colors are compared case-insensitively; nothing else is canonicalized.
pub fn normalize_color(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// Infer the product family from description keywords, if any marker hits.
pub fn infer_family(text: &str) -> Option<ProductFamily> {
    let lowered = text.to_ascii_lowercase();
    FAMILY_MARKERS
        .iter()
        .find(|(marker, _)| lowered.contains(marker))
        .map(|(_, family)| family.clone())
}

/// Heuristic token extraction from bare free text.
///
/// Serves the ad-hoc probe path only; the production parser supplies tokens
/// itself. Picks the first size-like word pair, the first material marker and
/// gauge word, and the first known color word.
pub fn extract_tokens(text: &str) -> RawTokens {
    const COLORS: &[&str] = &["black", "white", "grey", "gray", "blue", "red", "green", "orange"];
    const GAUGE_WORDS: &[&str] = &["light", "medium", "med", "heavy"];

    let lowered = text.to_ascii_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();

    let mut size = None;
    for (i, word) in words.iter().enumerate() {
        if parse_size_mm(word).is_some() {
            size = Some((*word).to_owned());
            break;
        }
        // "25 mm" split across two words
        if let Some(next) = words.get(i + 1) {
            let joined = format!("{word}{next}");
            if parse_size_mm(&joined).is_some() {
                size = Some(joined);
                break;
            }
        }
    }

    // Whole words only here: the substring rule would read "copper" as PP.
    let material = words
        .iter()
        .find(|word| is_material_word(word.trim_matches(|c: char| !c.is_ascii_alphanumeric())));
    let gauge = words.iter().find(|word| GAUGE_WORDS.contains(word));
    let color = words.iter().find(|word| COLORS.contains(word));

    RawTokens {
        size,
        material: material.map(|w| (*w).to_owned()),
        gauge: gauge.map(|w| (*w).to_owned()),
        color: color.map(|w| (*w).to_owned()),
    }
}

fn is_material_word(word: &str) -> bool {
    word == "ms" || MATERIAL_MARKERS.iter().any(|(marker, _)| word == *marker)
}
