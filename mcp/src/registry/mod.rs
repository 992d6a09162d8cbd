//! Ordered feature registry.
//!
//! [`FeatureSet`] keeps named entries (tools, prompts, resources, ...) unique
//! by key and enumerates them in ascending key order, either in full or
//! strictly after a cursor key for pagination.

pub mod iter;
pub mod set;

pub use iter::FeatureIter;
pub use set::FeatureSet;
