//! Property-based tests for the share computations.
//!
//! - Shares sum to 100 (within rounding) whenever the total is non-zero
//! - Zero volume always means zero share
//! - Rank is monotonic in volume and ties share a rank
//! - Combination is additive over raw volumes
//! - Every computation is repeatable

mod common;

use proptest::prelude::*;
use share_of_search::compute::{round2, VolumeNormalizer};
use share_of_search::models::{NormalizedRecord, PlatformAggregate};
use share_of_search::{
    compute_aggregate, compute_combined, compute_monthly, BrandVolumeRecord, Platform,
};

use common::period;

/// Between one and eight brands, each with three months of volume.
fn arb_volumes() -> impl Strategy<Value = Vec<[i64; 3]>> {
    prop::collection::vec(prop::array::uniform3(0i64..100_000), 1..8)
}

fn records(platform: Platform, volumes: &[[i64; 3]]) -> Vec<NormalizedRecord> {
    let p = period();
    let normalizer = VolumeNormalizer::new(&p);
    volumes
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let record = BrandVolumeRecord::monthly(
                &format!("brand-{i}"),
                platform,
                p.months().iter().copied().zip(v.iter().copied()),
            );
            normalizer.normalize(&record).unwrap()
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_aggregate_shares_sum_to_one_hundred(volumes in arb_volumes()) {
        let recs = records(Platform::Google, &volumes);
        let shares = compute_aggregate(&recs).unwrap();
        let grand_total: u64 = shares.iter().map(|s| s.total_volume).sum();
        let sum: f64 = shares.iter().map(|s| s.share_pct).sum();
        if grand_total > 0 {
            prop_assert!((sum - 100.0).abs() <= 0.1, "sum was {}", sum);
        } else {
            prop_assert_eq!(sum, 0.0);
        }
    }

    #[test]
    fn prop_zero_volume_means_zero_share(volumes in arb_volumes()) {
        let recs = records(Platform::Google, &volumes);
        for share in compute_aggregate(&recs).unwrap() {
            if share.total_volume == 0 {
                prop_assert_eq!(share.share_pct, 0.0);
            }
        }
    }

    #[test]
    fn prop_rank_is_monotonic_in_volume(volumes in arb_volumes()) {
        let recs = records(Platform::Google, &volumes);
        let shares = compute_aggregate(&recs).unwrap();
        for a in &shares {
            for b in &shares {
                if a.total_volume > b.total_volume {
                    prop_assert!(a.rank < b.rank);
                }
                if a.total_volume == b.total_volume && a.total_volume > 0 {
                    prop_assert_eq!(a.rank, b.rank);
                }
            }
        }
    }

    #[test]
    fn prop_monthly_shares_sum_per_month(volumes in arb_volumes()) {
        let p = period();
        let recs = records(Platform::Google, &volumes);
        let shares = compute_monthly(&recs, &p).unwrap();
        prop_assert_eq!(shares.len(), recs.len() * p.len());
        for key in p.months() {
            let month: Vec<_> = shares.iter().filter(|s| s.month == *key).collect();
            let total: u64 = month.iter().map(|s| s.volume).sum();
            let sum: f64 = month.iter().map(|s| s.share_pct).sum();
            if total > 0 {
                prop_assert!((sum - 100.0).abs() <= 0.1, "{}: {}", key, sum);
            } else {
                prop_assert!(month.iter().all(|s| s.share_pct == 0.0));
            }
        }
    }

    #[test]
    fn prop_combination_is_additive(
        pairs in prop::collection::vec((0u64..1_000_000, 0u64..1_000_000), 1..8)
    ) {
        let google: Vec<(String, u64)> =
            pairs.iter().enumerate().map(|(i, (g, _))| (format!("brand-{i}"), *g)).collect();
        let amazon: Vec<(String, u64)> =
            pairs.iter().enumerate().map(|(i, (_, a))| (format!("brand-{i}"), *a)).collect();

        let combined = compute_combined(&[
            PlatformAggregate::from_totals(Platform::Google, &google),
            PlatformAggregate::from_totals(Platform::Amazon, &amazon),
        ])
        .unwrap();

        let grand_total: u64 = pairs.iter().map(|(g, a)| g + a).sum();
        for row in &combined {
            let i: usize = row.brand.trim_start_matches("brand-").parse().unwrap();
            let (g, a) = pairs[i];
            prop_assert_eq!(row.total_volume, g + a);
            let expected = if grand_total == 0 {
                0.0
            } else {
                round2((g + a) as f64 / grand_total as f64 * 100.0)
            };
            prop_assert_eq!(row.combined_share_pct, expected);
        }
    }

    #[test]
    fn prop_computations_are_repeatable(volumes in arb_volumes()) {
        let p = period();
        let recs = records(Platform::Amazon, &volumes);
        prop_assert_eq!(compute_aggregate(&recs).unwrap(), compute_aggregate(&recs).unwrap());
        prop_assert_eq!(compute_monthly(&recs, &p).unwrap(), compute_monthly(&recs, &p).unwrap());
    }
}
