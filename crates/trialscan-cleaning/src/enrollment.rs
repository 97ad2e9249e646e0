//! Target enrollment extraction
//!
//! Registries report target size as a plain integer, except where a
//! breakdown by arm is given as `label:N;` tokens. Breakdowns are summed.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::{CleaningError, RawValue, Result};

lazy_static! {
    static ref ARM_SIZE: Regex = Regex::new(r":(\d{1,10});").unwrap();
}

pub const NOT_AVAILABLE: &str = "Not Available";

/// Parsed target enrollment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetEnrollment {
    Count(i64),
    NotAvailable,
}

impl fmt::Display for TargetEnrollment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetEnrollment::Count(n) => write!(f, "{}", n),
            TargetEnrollment::NotAvailable => write!(f, "{}", NOT_AVAILABLE),
        }
    }
}

impl Serialize for TargetEnrollment {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            TargetEnrollment::Count(n) => serializer.serialize_i64(*n),
            TargetEnrollment::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

/// Why a single value could not be read
#[derive(Debug, Clone, PartialEq)]
pub struct UnsupportedValue(pub RawValue);

/// Extract one target size.
///
/// - integers (or integer text) are returned as is
/// - text carrying `:N;` tokens yields the sum of all `N`
/// - missing/empty values yield `NotAvailable`
/// - anything else is unsupported
pub fn extract_target_enrollment(
    value: &RawValue,
) -> std::result::Result<TargetEnrollment, UnsupportedValue> {
    match value {
        v if v.is_null() => Ok(TargetEnrollment::NotAvailable),
        RawValue::Integer(n) => Ok(TargetEnrollment::Count(*n)),
        RawValue::Float(x) if x.is_finite() && x.abs() < i64::MAX as f64 => {
            Ok(TargetEnrollment::Count(x.trunc() as i64))
        }
        RawValue::Text(s) => {
            if let Ok(n) = s.trim().parse::<i64>() {
                return Ok(TargetEnrollment::Count(n));
            }
            let arms: Vec<i64> = ARM_SIZE
                .captures_iter(s)
                .filter_map(|cap| cap[1].parse().ok())
                .collect();
            if arms.is_empty() {
                return Err(UnsupportedValue(value.clone()));
            }
            sum_arms(&arms)
                .map(TargetEnrollment::Count)
                .ok_or_else(|| UnsupportedValue(value.clone()))
        }
        _ => Err(UnsupportedValue(value.clone())),
    }
}

/// Sum of per-arm sizes, `None` on overflow
fn sum_arms(arms: &[i64]) -> Option<i64> {
    arms.iter().try_fold(0i64, |total, &n| total.checked_add(n))
}

/// Extract target sizes for a whole column.
///
/// Halts on the first unsupported value.
pub fn enroll_extract(values: &[RawValue]) -> Result<Vec<TargetEnrollment>> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            extract_target_enrollment(value).map_err(|UnsupportedValue(v)| {
                tracing::error!("Unsupported target size ({}) at row {}: {}", v.type_name(), index, v);
                CleaningError::UnsupportedValue {
                    index,
                    value: v.to_string(),
                }
            })
        })
        .collect()
}
