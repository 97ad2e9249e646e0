//! # trialscan-screening
//!
//! Finds publications that may report results of a registered clinical
//! trial. PubMed abstracts and CORD-19 full texts are scanned with the
//! registry catalogue, kept when they carry any registration signal and
//! merged per publication.

pub mod combine;
pub mod cord;
pub mod error;
pub mod pubmed;
pub mod record;

pub use combine::*;
pub use cord::*;
pub use error::*;
pub use pubmed::*;
pub use record::{read_search_records, write_search_records, SearchRecord, Source};
