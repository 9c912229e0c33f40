//! Tests for whole-period share and rank.

mod common;

use share_of_search::{compute_aggregate, ErrorClass, Platform};

use common::{assert_close, normalized, with_total};

#[test]
fn target_with_half_the_volume_ranks_first() {
    let records = vec![
        with_total("A", Platform::Google, 1000),
        with_total("B", Platform::Google, 500),
        with_total("C", Platform::Google, 500),
    ];

    let shares = compute_aggregate(&records).unwrap();

    let view: Vec<(&str, f64, u32)> = shares
        .iter()
        .map(|s| (s.brand.as_str(), s.share_pct, s.rank))
        .collect();
    assert_eq!(view, vec![("A", 50.0, 1), ("B", 25.0, 2), ("C", 25.0, 2)]);
}

#[test]
fn ties_use_competition_ranking() {
    let records = vec![
        with_total("A", Platform::Google, 300),
        with_total("B", Platform::Google, 300),
        with_total("C", Platform::Google, 100),
    ];

    let shares = compute_aggregate(&records).unwrap();

    let c = shares.iter().find(|s| s.brand == "C").unwrap();
    assert_eq!(c.rank, 3, "rank after a two-way tie skips to 3");
    assert!(shares.iter().filter(|s| s.rank == 1).count() == 2);
}

#[test]
fn zero_grand_total_ranks_alphabetically() {
    let records = vec![
        with_total("C", Platform::Amazon, 0),
        with_total("A", Platform::Amazon, 0),
        with_total("B", Platform::Amazon, 0),
    ];

    let shares = compute_aggregate(&records).unwrap();

    let view: Vec<(&str, f64, u32)> = shares
        .iter()
        .map(|s| (s.brand.as_str(), s.share_pct, s.rank))
        .collect();
    assert_eq!(view, vec![("A", 0.0, 1), ("B", 0.0, 2), ("C", 0.0, 3)]);
}

#[test]
fn zero_volume_brand_has_zero_share() {
    let records = vec![
        with_total("A", Platform::Google, 700),
        with_total("B", Platform::Google, 0),
    ];
    let shares = compute_aggregate(&records).unwrap();
    let b = shares.iter().find(|s| s.brand == "B").unwrap();
    assert_close(b.share_pct, 0.0);
    assert_eq!(b.rank, 2);
}

#[test]
fn shares_are_rounded_to_two_decimals() {
    let records = vec![
        with_total("A", Platform::Google, 1),
        with_total("B", Platform::Google, 1),
        with_total("C", Platform::Google, 1),
    ];
    let shares = compute_aggregate(&records).unwrap();
    for share in &shares {
        assert_close(share.share_pct, 33.33);
    }
}

#[test]
fn derived_average_is_the_aggregate_measure() {
    let records = vec![
        normalized("A", Platform::Google, &[100, 200, 300]),
        normalized("B", Platform::Google, &[200, 200, 200]),
    ];
    let shares = compute_aggregate(&records).unwrap();
    assert_eq!(shares[0].total_volume, 200);
    assert_eq!(shares[1].total_volume, 200);
    assert_close(shares[0].share_pct, 50.0);
}

#[test]
fn empty_brand_set_is_a_computation_error() {
    let err = compute_aggregate(&[]).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Computation);
}

#[test]
fn mixed_platforms_are_rejected() {
    let records = vec![
        with_total("A", Platform::Google, 1),
        with_total("B", Platform::Amazon, 1),
    ];
    let err = compute_aggregate(&records).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Computation);
}

#[test]
fn duplicate_brands_are_rejected() {
    let records = vec![
        with_total("A", Platform::Google, 1),
        with_total("A", Platform::Google, 2),
    ];
    assert!(compute_aggregate(&records).is_err());
}

#[test]
fn repeated_calls_give_identical_output() {
    let records = vec![
        with_total("A", Platform::Google, 123),
        with_total("B", Platform::Google, 456),
        with_total("C", Platform::Google, 789),
    ];
    assert_eq!(
        compute_aggregate(&records).unwrap(),
        compute_aggregate(&records).unwrap()
    );
}

#[test]
fn grand_total_overflow_is_a_computation_error() {
    let records = vec![
        with_total("A", Platform::Google, i64::MAX),
        with_total("B", Platform::Google, i64::MAX),
        with_total("C", Platform::Google, 5),
    ];
    let err = compute_aggregate(&records).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Computation);
}
