//! Catalog and alias data sources.
//!
//! Loading happens once before matching begins; the engine only ever sees the
//! loaded snapshot. File-backed providers read JSON arrays of the domain
//! types. A missing alias file degrades to the seed table; a missing catalog
//! is a hard error.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::alias::AliasEntry;
use crate::domain::catalog::CatalogEntry;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("could not read data file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse data file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: serde_json::Error },
}

/// Source of catalog entries.
pub trait CatalogProvider: Send + Sync {
    fn all_entries(&self) -> Result<Vec<CatalogEntry>, ProviderError>;
}

/// Source of alias entries.
///
/// Implementations should return an empty list, not an error, when the
/// underlying source is merely absent; the engine then falls back to its
/// built-in seed table.
pub trait AliasProvider: Send + Sync {
    fn alias_entries(&self) -> Result<Vec<AliasEntry>, ProviderError>;
}

/// Catalog backed by a JSON file.
#[derive(Clone, Debug)]
pub struct FileCatalogProvider {
    path: PathBuf,
}

impl FileCatalogProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogProvider for FileCatalogProvider {
    fn all_entries(&self) -> Result<Vec<CatalogEntry>, ProviderError> {
        let raw = fs::read_to_string(&self.path)
            .map_err(|source| ProviderError::ReadFile { path: self.path.clone(), source })?;
        let entries: Vec<CatalogEntry> = serde_json::from_str(&raw)
            .map_err(|source| ProviderError::ParseFile { path: self.path.clone(), source })?;

        info!(
            event_name = "providers.catalog_loaded",
            path = %self.path.display(),
            entry_count = entries.len(),
            "catalog file loaded"
        );
        Ok(entries)
    }
}

/// Alias list backed by a JSON file; a missing file yields the empty list.
#[derive(Clone, Debug)]
pub struct FileAliasProvider {
    path: PathBuf,
}

impl FileAliasProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AliasProvider for FileAliasProvider {
    fn alias_entries(&self) -> Result<Vec<AliasEntry>, ProviderError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    event_name = "providers.alias_file_missing",
                    path = %self.path.display(),
                    "alias file not found, matching will use the seed table"
                );
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(ProviderError::ReadFile { path: self.path.clone(), source })
            }
        };

        serde_json::from_str(&raw)
            .map_err(|source| ProviderError::ParseFile { path: self.path.clone(), source })
    }
}

/// In-memory providers for tests and the ad-hoc probe path.
#[derive(Clone, Debug, Default)]
pub struct InMemoryCatalogProvider {
    entries: Vec<CatalogEntry>,
}

impl InMemoryCatalogProvider {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }
}

impl CatalogProvider for InMemoryCatalogProvider {
    fn all_entries(&self) -> Result<Vec<CatalogEntry>, ProviderError> {
        Ok(self.entries.clone())
    }
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryAliasProvider {
    entries: Vec<AliasEntry>,
}

impl InMemoryAliasProvider {
    pub fn new(entries: Vec<AliasEntry>) -> Self {
        Self { entries }
    }
}

impl AliasProvider for InMemoryAliasProvider {
    fn alias_entries(&self) -> Result<Vec<AliasEntry>, ProviderError> {
        Ok(self.entries.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::catalog::{Material, ProductFamily, SkuCode, UnitOfMeasure};

    #[test]
    fn file_catalog_round_trips_entries() {
        let entries = vec![CatalogEntry {
            code: SkuCode("NFC25".to_owned()),
            family: ProductFamily::CorrugatedFlexiblePipe,
            description: "25mm corrugated flexible pipe".to_owned(),
            uom: UnitOfMeasure::Metre,
            material: Some(Material::Pp),
            alternate_material: Some(Material::Frpp),
            gauge: None,
            nominal_size_mm: Some(25.0),
            size_tolerance_mm: Some(2.0),
            unit_rate: Decimal::new(1250, 2),
            lead_time_days: 7,
            min_order_qty: 100,
        }];

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(serde_json::to_string(&entries).unwrap().as_bytes()).expect("write");

        let provider = FileCatalogProvider::new(file.path());
        assert_eq!(provider.all_entries().expect("load"), entries);
    }

    #[test]
    fn malformed_catalog_file_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"{not json").expect("write");

        let provider = FileCatalogProvider::new(file.path());
        assert!(matches!(provider.all_entries(), Err(ProviderError::ParseFile { .. })));
    }

    #[test]
    fn missing_alias_file_yields_empty_list() {
        let dir = tempfile::tempdir().expect("temp dir");
        let provider = FileAliasProvider::new(dir.path().join("absent.json"));

        assert!(provider.alias_entries().expect("tolerated").is_empty());
    }

    #[test]
    fn alias_file_parses_entries() {
        let entries =
            vec![AliasEntry::new("nfc pipe", "NFC25", 0.9), AliasEntry::new("flex", "NFC25", 0.6)];
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(serde_json::to_string(&entries).unwrap().as_bytes()).expect("write");

        let provider = FileAliasProvider::new(file.path());
        assert_eq!(provider.alias_entries().expect("load"), entries);
    }
}
