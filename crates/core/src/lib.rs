pub mod config;
pub mod domain;
pub mod errors;
pub mod matching;
pub mod providers;

pub use config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat, MappingConfig};
pub use domain::alias::AliasEntry;
pub use domain::catalog::{
    CatalogEntry, CatalogSnapshot, Gauge, Material, ProductFamily, SkuCode, UnitOfMeasure,
};
pub use domain::line::{NormalizedLine, RawTokens, RequestLine};
pub use domain::mapping::{
    CandidateSummary, ConfidenceLevel, Explanation, MappingResult, MappingStatus, MatchReason,
    ScoreBreakdown, ScoredCandidate,
};
pub use errors::{ApplicationError, DomainError};
pub use matching::aliases::AliasIndex;
pub use matching::MappingEngine;
pub use providers::{
    AliasProvider, CatalogProvider, FileAliasProvider, FileCatalogProvider,
    InMemoryAliasProvider, InMemoryCatalogProvider, ProviderError,
};
