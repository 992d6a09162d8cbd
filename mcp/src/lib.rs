//! Ordered, deduplicated feature registry for Model Context Protocol servers.
//!
//! ## Modules
//!
//! - [`registry`]: Key-ordered feature storage with cursor seeks
//! - [`pagination`]: Opaque cursor tokens and page slicing
//! - [`catalog`]: Per-kind server catalog (tools, prompts, resources, templates)
//! - [`config`]: Page size, duplicate policy, event buffering

pub mod catalog;
pub mod config;
pub mod error;
pub mod pagination;
pub mod registry;

pub use catalog::{
    CatalogCounts, CatalogEvent, FeatureCatalog, FeatureKind, Prompt, RawResource,
    RawResourceTemplate, Tool,
};
pub use config::{DuplicatePolicy, FeatureConfig, DEFAULT_PAGE_SIZE};
pub use error::{FeatureError, FeatureResult};
pub use pagination::{decode_cursor, encode_cursor, Page, Paginator};
pub use registry::{FeatureIter, FeatureSet};
