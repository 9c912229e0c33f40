//! Merging per-platform totals into one cross-platform view.

use std::collections::{BTreeMap, HashSet};

use super::{checked_total, share_pct};
use crate::error::{Result, SosError};
use crate::models::{CombinedShare, PlatformAggregate};

/// Combine two or more platforms' aggregate results.
///
/// Raw volumes are summed across platforms before any percentage is taken,
/// so the combined share is not an average of per-platform shares. A brand
/// missing from a platform counts as zero volume there. Only `total_volume`
/// of each input row is read.
///
/// Rows are returned ordered by combined volume descending, then brand name.
pub fn compute_combined(per_platform: &[PlatformAggregate]) -> Result<Vec<CombinedShare>> {
    if per_platform.len() < 2 {
        return Err(SosError::Computation(format!(
            "combination needs at least two platforms, got {}",
            per_platform.len()
        )));
    }

    let mut platforms = HashSet::new();
    let mut brands: Vec<&str> = Vec::new();
    for aggregate in per_platform {
        if !platforms.insert(aggregate.platform) {
            return Err(SosError::Computation(format!(
                "platform {} supplied more than once",
                aggregate.platform
            )));
        }
        let mut seen = HashSet::new();
        for share in &aggregate.shares {
            if share.brand.trim().is_empty() {
                return Err(SosError::Computation("record with empty brand".to_string()));
            }
            if !seen.insert(share.brand.as_str()) {
                return Err(SosError::Computation(format!(
                    "brand '{}' appears more than once on {}",
                    share.brand, aggregate.platform
                )));
            }
            if !brands.contains(&share.brand.as_str()) {
                brands.push(share.brand.as_str());
            }
        }
    }
    if brands.is_empty() {
        return Err(SosError::Computation("empty brand set".to_string()));
    }

    let platform_totals = per_platform
        .iter()
        .map(|p| {
            checked_total(
                p.shares.iter().map(|s| s.total_volume),
                &format!("{} grand total", p.platform),
            )
        })
        .collect::<Result<Vec<u64>>>()?;

    let mut combined = Vec::with_capacity(brands.len());
    for brand in &brands {
        let mut per_platform_volume = BTreeMap::new();
        let mut per_platform_share_pct = BTreeMap::new();
        for (aggregate, platform_total) in per_platform.iter().zip(&platform_totals) {
            let volume = aggregate.volume_of(brand);
            per_platform_volume.insert(aggregate.platform, volume);
            per_platform_share_pct.insert(aggregate.platform, share_pct(volume, *platform_total));
        }
        let total_volume = checked_total(
            per_platform_volume.values().copied(),
            &format!("combined volume of '{}'", brand),
        )?;
        combined.push(CombinedShare {
            brand: brand.to_string(),
            per_platform_volume,
            total_volume,
            per_platform_share_pct,
            combined_share_pct: 0.0,
        });
    }

    let grand_total = checked_total(
        combined.iter().map(|c| c.total_volume),
        "combined grand total",
    )?;
    for row in &mut combined {
        row.combined_share_pct = share_pct(row.total_volume, grand_total);
    }

    combined.sort_by(|a, b| {
        b.total_volume
            .cmp(&a.total_volume)
            .then_with(|| a.brand.cmp(&b.brand))
    });
    Ok(combined)
}
