//! # trialscan-cleaning
//!
//! Cleaning for the WHO ICTRP COVID-19 trial export.
//!
//! ## Features
//!
//! - **Dates**: mixed numeric and free-text enrollment dates to `NaiveDate`
//! - **Target enrollment**: plain counts and per-arm breakdowns
//! - **Names**: ASCII folding of sponsor names
//! - **Fields**: study type, phase, status and country vocabularies
//! - **Registration**: known data errors, retrospective registration,
//!   cross-registrations
//! - **Lookups**: curated lookup tables reconciled until nothing is missing
//!
//! ## Example
//!
//! ```rust
//! use trialscan_cleaning::{enroll_extract, RawValue, TargetEnrollment};
//!
//! let sizes = vec![RawValue::from("120"), RawValue::Missing, RawValue::from(":30;:20;")];
//! let parsed = enroll_extract(&sizes).unwrap();
//! assert_eq!(parsed[2], TargetEnrollment::Count(50));
//! ```

pub mod dates;
pub mod enrollment;
pub mod error;
pub mod fields;
pub mod ictrp;
pub mod lookup;
pub mod names;
pub mod registration;
pub mod value;

pub use dates::*;
pub use enrollment::*;
pub use error::*;
pub use fields::*;
pub use ictrp::*;
pub use lookup::*;
pub use names::*;
pub use registration::*;
pub use value::*;
