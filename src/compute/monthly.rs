//! Month-by-month share series for one platform.

use super::{checked_total, share_pct, single_platform_brand_set};
use crate::error::Result;
use crate::models::{MonthlyShare, NormalizedRecord};
use crate::period::Period;

/// Compute every brand's share of each month's total.
///
/// Every month of `period` appears for every brand, even when the month's
/// total is zero (all shares `0`), so trend series stay contiguous. Output is
/// grouped by brand in input order, months ascending within each brand.
pub fn compute_monthly(records: &[NormalizedRecord], period: &Period) -> Result<Vec<MonthlyShare>> {
    single_platform_brand_set(records)?;

    let monthly_totals = period
        .months()
        .iter()
        .map(|month| {
            checked_total(
                records.iter().map(|r| r.volume_for(month)),
                &format!("total for {}", month),
            )
        })
        .collect::<Result<Vec<u64>>>()?;

    let mut shares = Vec::with_capacity(records.len() * period.len());
    for record in records {
        for (month, total) in period.months().iter().zip(&monthly_totals) {
            let volume = record.volume_for(month);
            shares.push(MonthlyShare {
                brand: record.brand.clone(),
                month: *month,
                volume,
                share_pct: share_pct(volume, *total),
            });
        }
    }
    Ok(shares)
}
