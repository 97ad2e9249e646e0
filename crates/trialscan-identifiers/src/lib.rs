//! Clinical trial registry identifier matching
//!
//! Detects which registry IDs, registry prefixes and registry names a
//! publication mentions:
//! - a fixed catalogue of per-registry patterns (ClinicalTrials.gov,
//!   ChiCTR, EudraCT, ISRCTN, IRCT, CTRI and others)
//! - a matcher returning every hit of a pattern list, or `None`
//! - a per-document scan over all three pattern lists

pub mod catalogue;
pub mod error;
pub mod matcher;
pub mod registry;

pub use catalogue::*;
pub use error::*;
pub use matcher::*;
pub use registry::{find_registry, pattern_sources, Registry, REGISTRIES};
