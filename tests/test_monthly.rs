//! Tests for month-by-month share series.

mod common;

use share_of_search::{compute_monthly, ErrorClass, Platform};

use common::{assert_close, month, normalized, period};

#[test]
fn each_month_is_shared_independently() {
    let period = period();
    let records = vec![
        normalized("A", Platform::Google, &[100, 300, 50]),
        normalized("B", Platform::Google, &[100, 100, 150]),
    ];

    let shares = compute_monthly(&records, &period).unwrap();

    let a: Vec<f64> = shares.iter().filter(|s| s.brand == "A").map(|s| s.share_pct).collect();
    let b: Vec<f64> = shares.iter().filter(|s| s.brand == "B").map(|s| s.share_pct).collect();
    assert_eq!(a, vec![50.0, 75.0, 25.0]);
    assert_eq!(b, vec![50.0, 25.0, 75.0]);
}

#[test]
fn zero_total_month_is_kept_with_zero_shares() {
    let period = period();
    let records = vec![
        normalized("A", Platform::Google, &[10, 0, 30]),
        normalized("B", Platform::Google, &[10, 0, 10]),
    ];

    let shares = compute_monthly(&records, &period).unwrap();

    let may: Vec<_> = shares.iter().filter(|s| s.month == month("2024-05")).collect();
    assert_eq!(may.len(), 2);
    assert!(may.iter().all(|s| s.volume == 0 && s.share_pct == 0.0));
}

#[test]
fn output_is_grouped_by_brand_with_months_ascending() {
    let period = period();
    let records = vec![
        normalized("Zeta", Platform::Amazon, &[1, 2, 3]),
        normalized("Alpha", Platform::Amazon, &[3, 2, 1]),
    ];

    let shares = compute_monthly(&records, &period).unwrap();

    let order: Vec<(String, String)> = shares
        .iter()
        .map(|s| (s.brand.clone(), s.month.to_string()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("Zeta".to_string(), "2024-04".to_string()),
            ("Zeta".to_string(), "2024-05".to_string()),
            ("Zeta".to_string(), "2024-06".to_string()),
            ("Alpha".to_string(), "2024-04".to_string()),
            ("Alpha".to_string(), "2024-05".to_string()),
            ("Alpha".to_string(), "2024-06".to_string()),
        ]
    );
}

#[test]
fn monthly_shares_sum_to_one_hundred() {
    let period = period();
    let records = vec![
        normalized("A", Platform::Google, &[7, 11, 13]),
        normalized("B", Platform::Google, &[17, 19, 23]),
        normalized("C", Platform::Google, &[29, 31, 37]),
    ];

    let shares = compute_monthly(&records, &period).unwrap();

    for key in period.months() {
        let total: f64 = shares.iter().filter(|s| s.month == *key).map(|s| s.share_pct).sum();
        assert!((total - 100.0).abs() <= 0.1, "{key}: {total}");
    }
}

#[test]
fn single_brand_owns_every_non_empty_month() {
    let period = period();
    let records = vec![normalized("Solo", Platform::Google, &[5, 0, 9])];
    let shares = compute_monthly(&records, &period).unwrap();
    assert_close(shares[0].share_pct, 100.0);
    assert_close(shares[1].share_pct, 0.0);
    assert_close(shares[2].share_pct, 100.0);
}

#[test]
fn empty_input_is_a_computation_error() {
    let period = period();
    let err = compute_monthly(&[], &period).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Computation);
}

#[test]
fn series_can_be_rederived() {
    let period = period();
    let records = vec![
        normalized("A", Platform::Google, &[1, 2, 3]),
        normalized("B", Platform::Google, &[4, 5, 6]),
    ];
    assert_eq!(
        compute_monthly(&records, &period).unwrap(),
        compute_monthly(&records, &period).unwrap()
    );
}

#[test]
fn month_total_overflow_is_a_computation_error() {
    let records = vec![
        normalized("A", Platform::Google, &[i64::MAX, 1, 1]),
        normalized("B", Platform::Google, &[i64::MAX, 1, 1]),
        normalized("C", Platform::Google, &[5, 1, 1]),
    ];
    let err = compute_monthly(&records, &period()).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Computation);
}
