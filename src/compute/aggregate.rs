//! Whole-period share and rank per brand for one platform.

use super::{checked_total, share_pct, single_platform_brand_set};
use crate::error::Result;
use crate::models::{AggregateShare, NormalizedRecord};

/// Compute each brand's total volume, share of the grand total and rank.
///
/// Ranking is competition style: `rank = 1 + number of brands with strictly
/// greater volume`, so tied brands share a rank and the next rank is skipped.
/// When no brand has any volume every share is `0` and ranks follow brand
/// name order instead.
///
/// Rows are returned ordered by rank, then brand name.
pub fn compute_aggregate(records: &[NormalizedRecord]) -> Result<Vec<AggregateShare>> {
    single_platform_brand_set(records)?;

    let grand_total = checked_total(
        records.iter().map(|r| r.average_volume),
        "aggregate grand total",
    )?;

    let mut shares: Vec<AggregateShare> = if grand_total == 0 {
        let mut names: Vec<&str> = records.iter().map(|r| r.brand.as_str()).collect();
        names.sort_unstable();
        names
            .into_iter()
            .enumerate()
            .map(|(i, brand)| AggregateShare {
                brand: brand.to_string(),
                total_volume: 0,
                share_pct: 0.0,
                rank: i as u32 + 1,
            })
            .collect()
    } else {
        records
            .iter()
            .map(|r| {
                let greater = records
                    .iter()
                    .filter(|o| o.average_volume > r.average_volume)
                    .count();
                AggregateShare {
                    brand: r.brand.clone(),
                    total_volume: r.average_volume,
                    share_pct: share_pct(r.average_volume, grand_total),
                    rank: greater as u32 + 1,
                }
            })
            .collect()
    };

    shares.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.brand.cmp(&b.brand)));
    Ok(shares)
}
