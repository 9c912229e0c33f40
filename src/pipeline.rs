//! Per-platform pipelines and the cross-platform join.
//!
//! Each platform runs normalize, aggregate and monthly independently. Once
//! every platform has finished (or failed) the qualifying ones are combined.
//! Results are plain values held by the caller: nothing is kept between runs.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{info, warn};

use crate::compute::{compute_aggregate, compute_combined, compute_monthly, VolumeNormalizer};
use crate::error::{Result, SosError};
use crate::models::{
    AggregateShare, BrandFailure, BrandVolumeRecord, CombinedShare, Granularity, MonthlyShare,
    PlatformAggregate, Platform,
};
use crate::period::Period;

// ---------------------------------------------------------------------------
// PlatformReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum PlatformStatus {
    /// At least one brand has non-zero volume.
    Ok,
    /// Valid result, but no brand had any search volume.
    ZeroVolume,
    /// No usable records, or the computation itself failed.
    Failed(String),
}

/// Everything computed for one platform in one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformReport {
    pub platform: Platform,
    pub status: PlatformStatus,
    pub aggregate: Vec<AggregateShare>,
    pub monthly: Vec<MonthlyShare>,
    pub failures: Vec<BrandFailure>,
    /// `FlattenedAggregate` if any record only had an aggregate value.
    pub granularity: Granularity,
}

impl PlatformReport {
    /// A report for a platform whose pipeline produced nothing.
    pub fn failed(platform: Platform, reason: impl Into<String>, failures: Vec<BrandFailure>) -> Self {
        Self {
            platform,
            status: PlatformStatus::Failed(reason.into()),
            aggregate: Vec::new(),
            monthly: Vec::new(),
            failures,
            granularity: Granularity::Monthly,
        }
    }

    /// Whether this platform takes part in cross-platform combination.
    pub fn qualifies_for_combination(&self) -> bool {
        self.status == PlatformStatus::Ok
    }

    pub fn share_of(&self, brand: &str) -> Option<&AggregateShare> {
        self.aggregate.iter().find(|s| s.brand == brand)
    }

    /// The brand's monthly series, months ascending.
    pub fn trend(&self, brand: &str) -> Vec<&MonthlyShare> {
        self.monthly.iter().filter(|m| m.brand == brand).collect()
    }

    /// Sum of every brand's volume, `None` if it does not fit in `u64`.
    pub fn grand_total(&self) -> Option<u64> {
        self.aggregate
            .iter()
            .try_fold(0u64, |acc, s| acc.checked_add(s.total_volume))
    }

    pub fn to_aggregate(&self) -> PlatformAggregate {
        PlatformAggregate::new(self.platform, self.aggregate.clone())
    }
}

/// Normalize and compute one platform's shares.
///
/// Records that fail normalization are reported as brand failures and left
/// out; the remaining brands are still computed. A brand name that repeats
/// once trimmed keeps its first record and the later ones become failures. `failures` carries any
/// earlier per-brand failures (typically from fetching).
pub fn analyze_platform(
    platform: Platform,
    records: &[BrandVolumeRecord],
    period: &Period,
    mut failures: Vec<BrandFailure>,
) -> PlatformReport {
    let normalizer = VolumeNormalizer::new(period);
    let mut normalized = Vec::with_capacity(records.len());
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if record.platform != platform {
            let e = SosError::Computation(format!(
                "record for {} passed to the {} pipeline",
                record.platform, platform
            ));
            failures.push(BrandFailure::new(&record.brand, &e));
            continue;
        }
        match normalizer.normalize(record) {
            Ok(n) if !seen.insert(n.brand.clone()) => {
                let e = SosError::data(&n.brand, "duplicate record for brand");
                warn!(%platform, brand = n.brand.as_str(), "duplicate record rejected");
                failures.push(BrandFailure::new(&record.brand, &e));
            }
            Ok(n) => normalized.push(n),
            Err(e) => {
                warn!(%platform, brand = record.brand.as_str(), error = %e, "record rejected");
                failures.push(BrandFailure::new(&record.brand, &e));
            }
        }
    }

    if normalized.is_empty() {
        warn!(%platform, "no usable records");
        return PlatformReport::failed(platform, "no usable records", failures);
    }

    let computed = compute_aggregate(&normalized).and_then(|aggregate| {
        compute_monthly(&normalized, period).map(|monthly| (aggregate, monthly))
    });
    let (aggregate, monthly) = match computed {
        Ok(result) => result,
        Err(e) => {
            warn!(%platform, error = %e, "computation failed");
            return PlatformReport::failed(platform, e.to_string(), failures);
        }
    };

    let granularity = if normalized
        .iter()
        .any(|r| r.granularity == Granularity::FlattenedAggregate)
    {
        Granularity::FlattenedAggregate
    } else {
        Granularity::Monthly
    };

    let status = if aggregate.iter().any(|s| s.total_volume > 0) {
        PlatformStatus::Ok
    } else {
        PlatformStatus::ZeroVolume
    };
    info!(%platform, brands = aggregate.len(), ?status, failures = failures.len(), "platform analyzed");

    PlatformReport {
        platform,
        status,
        aggregate,
        monthly,
        failures,
        granularity,
    }
}

/// Combine every qualifying platform.
///
/// Returns `Ok(None)` when fewer than two platforms qualify; that is a skip,
/// not an error.
pub fn combine_reports(reports: &[PlatformReport]) -> Result<Option<Vec<CombinedShare>>> {
    let qualifying: Vec<PlatformAggregate> = reports
        .iter()
        .filter(|r| r.qualifies_for_combination())
        .map(PlatformReport::to_aggregate)
        .collect();

    if qualifying.len() < 2 {
        info!(qualifying = qualifying.len(), "combination skipped");
        return Ok(None);
    }
    compute_combined(&qualifying).map(Some)
}

// ---------------------------------------------------------------------------
// RunReport
// ---------------------------------------------------------------------------

/// The target brand's standing on one platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetSummary {
    pub platform: Platform,
    pub share_pct: f64,
    pub volume: u64,
    pub rank: u32,
}

/// The result of a whole run, passed explicitly to whoever presents it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub target_brand: String,
    pub period: Period,
    pub platforms: Vec<PlatformReport>,
    pub combined: Option<Vec<CombinedShare>>,
    /// Set when the combination step itself failed.
    pub combination_error: Option<String>,
}

impl RunReport {
    /// Join finished platform reports into a run result.
    pub fn assemble(target_brand: &str, period: Period, platforms: Vec<PlatformReport>) -> Self {
        let (combined, combination_error) = match combine_reports(&platforms) {
            Ok(combined) => (combined, None),
            Err(e) => {
                warn!(error = %e, "combination failed");
                (None, Some(e.to_string()))
            }
        };
        Self {
            target_brand: target_brand.to_string(),
            period,
            platforms,
            combined,
            combination_error,
        }
    }

    pub fn platform(&self, platform: Platform) -> Option<&PlatformReport> {
        self.platforms.iter().find(|r| r.platform == platform)
    }

    pub fn target_summary(&self, platform: Platform) -> Option<TargetSummary> {
        let share = self.platform(platform)?.share_of(&self.target_brand)?;
        Some(TargetSummary {
            platform,
            share_pct: share.share_pct,
            volume: share.total_volume,
            rank: share.rank,
        })
    }

    pub fn combined_target(&self) -> Option<&CombinedShare> {
        self.combined
            .as_ref()?
            .iter()
            .find(|c| c.brand == self.target_brand)
    }

    /// `true` when at least one platform produced a result (including zero volume).
    pub fn has_results(&self) -> bool {
        self.platforms
            .iter()
            .any(|r| !matches!(r.status, PlatformStatus::Failed(_)))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
