//! Hard-constraint admissibility: family, size tolerance, material.
//!
//! Hard constraints run before scoring so that a textually similar but
//! physically incompatible SKU can never reach the ranked list.

use crate::domain::catalog::{CatalogEntry, Material, ProductFamily};
use crate::domain::line::RequestLine;

/// One material-hierarchy rule, scoped to a product family.
///
/// A requested material is compatible with a catalog entry when the entry's
/// material is in `catalog_materials`, or its alternate material is in
/// `alternate_materials`. Exact matches never need a rule.
#[derive(Clone, Debug)]
pub struct MaterialRule {
    pub family: ProductFamily,
    pub requested: Material,
    pub catalog_materials: Vec<Material>,
    pub alternate_materials: Vec<Material>,
}

/// How a line's material relates to a catalog entry's.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaterialMatch {
    Exact,
    /// Covered by a hierarchy rule rather than an exact match.
    Compatible,
    BothUnset,
    OneUnset,
    Incompatible,
}

/// Extensible table of material-hierarchy rules.
#[derive(Clone, Debug, Default)]
pub struct CompatibilityRules {
    rules: Vec<MaterialRule>,
}

impl CompatibilityRules {
    pub fn new(rules: Vec<MaterialRule>) -> Self {
        Self { rules }
    }

    /// The rule set observed in the reference catalog: for corrugated
    /// flexible pipe, FRPP and FR requests are satisfiable by a PP entry or
    /// one whose alternate material is FRPP. PP requests stay PP-only.
    pub fn default_rules() -> Self {
        let corrugated = ProductFamily::CorrugatedFlexiblePipe;
        Self::new(vec![
            MaterialRule {
                family: corrugated.clone(),
                requested: Material::Frpp,
                catalog_materials: vec![Material::Pp],
                alternate_materials: vec![Material::Frpp],
            },
            MaterialRule {
                family: corrugated,
                requested: Material::Fr,
                catalog_materials: vec![Material::Pp],
                alternate_materials: vec![Material::Frpp],
            },
        ])
    }

    /// Classify the line material against a catalog entry.
    pub fn classify(&self, requested: Option<Material>, entry: &CatalogEntry) -> MaterialMatch {
        match (requested, entry.material) {
            (None, None) => MaterialMatch::BothUnset,
            (None, Some(_)) | (Some(_), None) => MaterialMatch::OneUnset,
            (Some(wanted), Some(have)) if wanted == have => MaterialMatch::Exact,
            (Some(wanted), Some(have)) => {
                let covered = self.rules.iter().any(|rule| {
                    rule.family == entry.family
                        && rule.requested == wanted
                        && (rule.catalog_materials.contains(&have)
                            || entry
                                .alternate_material
                                .is_some_and(|alt| rule.alternate_materials.contains(&alt)))
                });
                if covered {
                    MaterialMatch::Compatible
                } else {
                    MaterialMatch::Incompatible
                }
            }
        }
    }
}

/// Engine seam for candidate admissibility.
pub trait AdmissibilityFilter: Send + Sync {
    fn admissible(&self, line: &RequestLine, entry: &CatalogEntry) -> bool;
}

/// Deterministic filter over family, size tolerance, and material rules.
#[derive(Clone, Debug)]
pub struct HardConstraintFilter {
    rules: CompatibilityRules,
    default_tolerance_mm: f64,
}

impl HardConstraintFilter {
    pub fn new(rules: CompatibilityRules, default_tolerance_mm: f64) -> Self {
        Self { rules, default_tolerance_mm }
    }

    pub fn rules(&self) -> &CompatibilityRules {
        &self.rules
    }

    fn family_admissible(&self, line: &RequestLine, entry: &CatalogEntry) -> bool {
        match &line.normalized.family {
            Some(family) => *family == entry.family,
            None => true,
        }
    }

    fn size_admissible(&self, line: &RequestLine, entry: &CatalogEntry) -> bool {
        match (line.normalized.size_mm, entry.nominal_size_mm) {
            (Some(line_size), Some(sku_size)) => {
                (line_size - sku_size).abs() <= entry.tolerance_mm(self.default_tolerance_mm)
            }
            _ => true,
        }
    }

    fn material_admissible(&self, line: &RequestLine, entry: &CatalogEntry) -> bool {
        self.rules.classify(line.normalized.material, entry) != MaterialMatch::Incompatible
    }
}

impl AdmissibilityFilter for HardConstraintFilter {
    fn admissible(&self, line: &RequestLine, entry: &CatalogEntry) -> bool {
        self.family_admissible(line, entry)
            && self.size_admissible(line, entry)
            && self.material_admissible(line, entry)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::catalog::{SkuCode, UnitOfMeasure};
    use crate::domain::line::{RawTokens, RequestLine};

    #[test]
    fn fr_request_is_compatible_with_pp_corrugated_entry() {
        let filter = filter_fixture();
        let line = line_fixture("25mm corrugated fr pipe", Some("25mm"), Some("fr"));

        assert!(filter.admissible(&line, &pp_entry_fixture()));
    }

    #[test]
    fn pvc_request_is_filtered_from_pp_corrugated_entry() {
        let filter = filter_fixture();
        let line = line_fixture("25mm corrugated pvc pipe", Some("25mm"), Some("pvc"));

        assert!(!filter.admissible(&line, &pp_entry_fixture()));
    }

    #[test]
    fn pp_request_only_matches_pp_entries() {
        let rules = CompatibilityRules::default_rules();
        let mut entry = pp_entry_fixture();

        assert_eq!(rules.classify(Some(Material::Pp), &entry), MaterialMatch::Exact);
        entry.material = Some(Material::Pvc);
        assert_eq!(rules.classify(Some(Material::Pp), &entry), MaterialMatch::Incompatible);
    }

    #[test]
    fn alternate_material_satisfies_hierarchy_rule() {
        let rules = CompatibilityRules::default_rules();
        let mut entry = pp_entry_fixture();
        entry.material = Some(Material::Hdpe);
        entry.alternate_material = Some(Material::Frpp);

        assert_eq!(rules.classify(Some(Material::Frpp), &entry), MaterialMatch::Compatible);
    }

    #[test]
    fn size_outside_tolerance_is_inadmissible() {
        let filter = filter_fixture();
        let line = line_fixture("32mm corrugated pp pipe", Some("32mm"), Some("pp"));

        assert!(!filter.admissible(&line, &pp_entry_fixture()));
    }

    #[test]
    fn missing_sizes_do_not_constrain() {
        let filter = filter_fixture();
        let line = line_fixture("corrugated pp pipe", None, Some("pp"));

        assert!(filter.admissible(&line, &pp_entry_fixture()));
    }

    #[test]
    fn unknown_family_does_not_constrain() {
        let filter = filter_fixture();
        let line = line_fixture("25mm pp pipe", Some("25mm"), Some("pp"));

        assert_eq!(line.normalized.family, None);
        assert!(filter.admissible(&line, &pp_entry_fixture()));
    }

    fn filter_fixture() -> HardConstraintFilter {
        HardConstraintFilter::new(CompatibilityRules::default_rules(), 2.0)
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

    fn pp_entry_fixture() -> CatalogEntry {
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
