//! Shared fixtures for the Share of Search integration tests.
//!
//! Provides a fixed three-month period and builders for raw, normalized and
//! per-platform aggregate inputs.

#![allow(dead_code)]

use share_of_search::compute::VolumeNormalizer;
use share_of_search::models::{NormalizedRecord, PlatformAggregate};
use share_of_search::{BrandVolumeRecord, MonthKey, Period, Platform};

/// 2024-04, 2024-05, 2024-06.
pub fn period() -> Period {
    Period::ending_at(month("2024-06"), 3).unwrap()
}

pub fn month(key: &str) -> MonthKey {
    key.parse().unwrap()
}

/// A monthly record whose values line up with `period()`.
pub fn raw(brand: &str, platform: Platform, volumes: &[i64]) -> BrandVolumeRecord {
    let months = period().months().to_vec();
    BrandVolumeRecord::monthly(brand, platform, months.into_iter().zip(volumes.iter().copied()))
}

pub fn normalized(brand: &str, platform: Platform, volumes: &[i64]) -> NormalizedRecord {
    let period = period();
    VolumeNormalizer::new(&period)
        .normalize(&raw(brand, platform, volumes))
        .unwrap()
}

/// A normalized record whose aggregate volume is `total`, flattened over `period()`.
pub fn with_total(brand: &str, platform: Platform, total: i64) -> NormalizedRecord {
    let period = period();
    let record = BrandVolumeRecord::flattened(brand, platform, total, &period);
    VolumeNormalizer::new(&period).normalize(&record).unwrap()
}

pub fn totals(platform: Platform, totals: &[(&str, u64)]) -> PlatformAggregate {
    PlatformAggregate::from_totals(platform, totals)
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
