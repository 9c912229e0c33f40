use std::collections::BTreeMap;

use serde::Serialize;

use super::record::Platform;
use crate::error::{ErrorClass, SosError};
use crate::period::MonthKey;

// ---------------------------------------------------------------------------
// AggregateShare
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateShare {
    pub brand: String,
    pub total_volume: u64,
    pub share_pct: f64,
    pub rank: u32,
}

// ---------------------------------------------------------------------------
// MonthlyShare
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyShare {
    pub brand: String,
    pub month: MonthKey,
    pub volume: u64,
    pub share_pct: f64,
}

// ---------------------------------------------------------------------------
// PlatformAggregate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformAggregate {
    pub platform: Platform,
    pub shares: Vec<AggregateShare>,
}

impl PlatformAggregate {
    pub fn new(platform: Platform, shares: Vec<AggregateShare>) -> Self {
        Self { platform, shares }
    }

    /// Build from raw `(brand, volume)` totals, without shares or ranks.
    pub fn from_totals<S: AsRef<str>>(platform: Platform, totals: &[(S, u64)]) -> Self {
        let shares = totals
            .iter()
            .map(|(brand, volume)| AggregateShare {
                brand: brand.as_ref().to_string(),
                total_volume: *volume,
                share_pct: 0.0,
                rank: 0,
            })
            .collect();
        Self { platform, shares }
    }

    /// Sum of every brand's volume, `None` if it does not fit in `u64`.
    pub fn grand_total(&self) -> Option<u64> {
        self.shares
            .iter()
            .try_fold(0u64, |acc, s| acc.checked_add(s.total_volume))
    }

    pub fn volume_of(&self, brand: &str) -> u64 {
        self.shares
            .iter()
            .find(|s| s.brand == brand)
            .map(|s| s.total_volume)
            .unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// CombinedShare
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedShare {
    pub brand: String,
    pub per_platform_volume: BTreeMap<Platform, u64>,
    pub total_volume: u64,
    pub per_platform_share_pct: BTreeMap<Platform, f64>,
    pub combined_share_pct: f64,
}

// ---------------------------------------------------------------------------
// BrandFailure
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandFailure {
    pub brand: String,
    pub class: ErrorClass,
    pub message: String,
}

impl BrandFailure {
    pub fn new(brand: &str, error: &SosError) -> Self {
        Self {
            brand: brand.to_string(),
            class: error.class(),
            message: error.to_string(),
        }
    }
}
