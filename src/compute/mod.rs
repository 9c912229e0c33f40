//! The Share-of-Search computation core.
//!
//! Every function here is pure: it reads its inputs, builds fresh result
//! values and keeps no state between calls. Percentages are rounded to two
//! decimals; a zero denominator yields a share of `0` rather than an error.

pub mod aggregate;
pub mod combine;
pub mod monthly;
pub mod normalize;

pub use aggregate::compute_aggregate;
pub use combine::compute_combined;
pub use monthly::compute_monthly;
pub use normalize::VolumeNormalizer;

use std::collections::HashSet;

use crate::error::{Result, SosError};
use crate::models::{NormalizedRecord, Platform};

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `volume / total` as a percentage, or `0` when the total is zero.
pub fn share_pct(volume: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        round2(volume as f64 / total as f64 * 100.0)
    }
}

/// Sum volumes, failing instead of wrapping when the total leaves `u64`.
pub(crate) fn checked_total(volumes: impl IntoIterator<Item = u64>, what: &str) -> Result<u64> {
    volumes
        .into_iter()
        .try_fold(0u64, |acc, v| acc.checked_add(v))
        .ok_or_else(|| SosError::Computation(format!("{} overflows a 64-bit volume", what)))
}

/// Check that `records` form a usable brand set for one platform and return
/// that platform.
fn single_platform_brand_set(records: &[NormalizedRecord]) -> Result<Platform> {
    let first = records
        .first()
        .ok_or_else(|| SosError::Computation("empty brand set".to_string()))?;

    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if record.platform != first.platform {
            return Err(SosError::Computation(format!(
                "records mix platforms {} and {}",
                first.platform, record.platform
            )));
        }
        if record.brand.trim().is_empty() {
            return Err(SosError::Computation("record with empty brand".to_string()));
        }
        if !seen.insert(record.brand.as_str()) {
            return Err(SosError::Computation(format!(
                "brand '{}' appears more than once on {}",
                record.brand, record.platform
            )));
        }
    }
    Ok(first.platform)
}
