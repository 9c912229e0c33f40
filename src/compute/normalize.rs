//! Validation and gap-filling of raw source records.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Result, SosError};
use crate::models::{BrandVolumeRecord, NormalizedRecord};
use crate::period::Period;

// ---------------------------------------------------------------------------
// VolumeNormalizer
// ---------------------------------------------------------------------------

/// Repairs raw records against the canonical period.
///
/// A normalized record covers exactly the period's months, missing months
/// are zero-filled and keys outside the period are dropped. Negative volumes
/// are never clamped: the whole record is rejected with a
/// [`SosError::Data`] so the caller can report it for that brand alone.
pub struct VolumeNormalizer<'a> {
    period: &'a Period,
}

impl<'a> VolumeNormalizer<'a> {
    pub fn new(period: &'a Period) -> Self {
        Self { period }
    }

    pub fn normalize(&self, record: &BrandVolumeRecord) -> Result<NormalizedRecord> {
        let brand = record.brand.trim();
        if brand.is_empty() {
            return Err(SosError::data(&record.brand, "brand must not be empty"));
        }

        if let Some((month, volume)) = record.monthly_volumes.iter().find(|(_, v)| **v < 0) {
            return Err(SosError::data(
                brand,
                format!("negative volume {} for {}", volume, month),
            ));
        }
        if let Some(avg) = record.average_volume.filter(|a| *a < 0) {
            return Err(SosError::data(brand, format!("negative average volume {}", avg)));
        }

        let dropped = record
            .monthly_volumes
            .keys()
            .filter(|k| !self.period.contains(k))
            .count();
        if dropped > 0 {
            debug!(brand, platform = %record.platform, dropped, "dropped months outside the period");
        }

        let mut filled = 0usize;
        let monthly_volumes: BTreeMap<_, u64> = self
            .period
            .months()
            .iter()
            .map(|month| {
                let volume = match record.monthly_volumes.get(month) {
                    Some(v) => *v as u64,
                    None => {
                        filled += 1;
                        0
                    }
                };
                (*month, volume)
            })
            .collect();
        if filled > 0 {
            debug!(brand, platform = %record.platform, filled, "zero-filled missing months");
        }

        let average_volume = match record.average_volume {
            Some(avg) => avg as u64,
            None => rounded_mean(monthly_volumes.values().copied()),
        };

        Ok(NormalizedRecord {
            brand: brand.to_string(),
            platform: record.platform,
            monthly_volumes,
            average_volume,
            granularity: record.granularity,
            keywords: record.keywords.clone(),
        })
    }
}

/// Arithmetic mean rounded to the nearest integer (halves round up).
///
/// Accumulates in `u128`; the mean never exceeds the largest input, so it
/// always fits back into `u64`.
fn rounded_mean(values: impl Iterator<Item = u64>) -> u64 {
    let (sum, count) = values.fold((0u128, 0u128), |(s, c), v| (s + u128::from(v), c + 1));
    if count == 0 {
        0
    } else {
        ((sum + count / 2) / count) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::rounded_mean;

    #[test]
    fn mean_rounds_half_up() {
        assert_eq!(rounded_mean([1, 2].into_iter()), 2);
        assert_eq!(rounded_mean([1, 1, 2].into_iter()), 1);
        assert_eq!(rounded_mean(std::iter::empty()), 0);
    }

    #[test]
    fn mean_of_huge_values_does_not_overflow() {
        let max = i64::MAX as u64;
        assert_eq!(rounded_mean([max, max, max].into_iter()), max);
        assert_eq!(rounded_mean([u64::MAX, u64::MAX - 2].into_iter()), u64::MAX - 1);
    }
}
