//! Tests for month keys and period construction.

mod common;

use chrono::NaiveDate;
use share_of_search::{MonthKey, Period};

use common::month;

// ---------------------------------------------------------------------------
// MonthKey
// ---------------------------------------------------------------------------

#[test]
fn month_key_round_trips_through_text() {
    let key = MonthKey::new(2024, 3).unwrap();
    assert_eq!(key.to_string(), "2024-03");
    assert_eq!("2024-03".parse::<MonthKey>().unwrap(), key);
}

#[test]
fn month_key_rejects_malformed_text() {
    for bad in ["2024-13", "2024-00", "2024-3", "24-03", "2024/03", "", "abcd-ef"] {
        assert!(bad.parse::<MonthKey>().is_err(), "{bad} should be rejected");
    }
}

#[test]
fn month_key_offset_crosses_year_boundaries() {
    assert_eq!(month("2024-01").offset(-1), month("2023-12"));
    assert_eq!(month("2023-11").offset(3), month("2024-02"));
    assert_eq!(month("2024-05").offset(-24), month("2022-05"));
}

#[test]
fn month_keys_order_chronologically() {
    assert!(month("2023-12") < month("2024-01"));
    assert!(month("2024-02") < month("2024-10"));
}

#[test]
fn month_key_serializes_as_string() {
    let json = serde_json::to_string(&month("2024-07")).unwrap();
    assert_eq!(json, "\"2024-07\"");
    let back: MonthKey = serde_json::from_str(&json).unwrap();
    assert_eq!(back, month("2024-07"));
}

// ---------------------------------------------------------------------------
// Period
// ---------------------------------------------------------------------------

#[test]
fn trailing_period_ends_two_months_back() {
    let today = NaiveDate::from_ymd_opt(2024, 8, 15).unwrap();
    let period = Period::trailing(3, today).unwrap();
    let keys: Vec<String> = period.months().iter().map(|m| m.to_string()).collect();
    assert_eq!(keys, vec!["2024-04", "2024-05", "2024-06"]);
}

#[test]
fn trailing_period_wraps_into_previous_year() {
    let today = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
    let period = Period::trailing(12, today).unwrap();
    assert_eq!(period.len(), 12);
    assert_eq!(period.start(), month("2023-12"));
    assert_eq!(period.end(), month("2024-11"));
}

#[test]
fn trailing_period_enforces_bounds() {
    let today = NaiveDate::from_ymd_opt(2024, 8, 15).unwrap();
    assert!(Period::trailing(2, today).is_err());
    assert!(Period::trailing(13, today).is_err());
    assert!(Period::trailing(3, today).is_ok());
    assert!(Period::trailing(12, today).is_ok());
}

#[test]
fn explicit_period_must_be_ascending_and_unique() {
    assert!(Period::from_months(vec![]).is_err());
    assert!(Period::from_months(vec![month("2024-02"), month("2024-01")]).is_err());
    assert!(Period::from_months(vec![month("2024-01"), month("2024-01")]).is_err());

    let period = Period::from_months(vec![month("2024-01"), month("2024-03")]).unwrap();
    assert!(period.contains(&month("2024-03")));
    assert!(!period.contains(&month("2024-02")));
}
