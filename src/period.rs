//! Year-month keys and the canonical requested period.
//!
//! Month keys are exchanged between components (and serialized) in the
//! `YYYY-MM` form. A [`Period`] is the ascending, gap-free list of months an
//! analysis covers; every derived trend series is indexed by it.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::{Result, SosError};

// ---------------------------------------------------------------------------
// MonthKey
// ---------------------------------------------------------------------------

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Create a month key. `month` is 1-based.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(SosError::InvalidArgument(format!(
                "month must be in 1..=12, got {}",
                month
            )));
        }
        Ok(Self { year, month })
    }

    /// The month containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Shift by a signed number of months.
    pub fn offset(&self, months: i32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) + months;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = SosError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || SosError::InvalidArgument(format!("invalid month key '{}', expected YYYY-MM", s));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        MonthKey::new(year, month).map_err(|_| invalid())
    }
}

impl TryFrom<String> for MonthKey {
    type Error = SosError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}

// ---------------------------------------------------------------------------
// Period
// ---------------------------------------------------------------------------

/// The canonical, strictly ascending list of requested months.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Period {
    months: Vec<MonthKey>,
}

impl Period {
    /// The trailing window of `months_back` months ending
    /// [`RECENCY_OFFSET_MONTHS`](config::RECENCY_OFFSET_MONTHS) before the
    /// month of `today`.
    pub fn trailing(months_back: u32, today: NaiveDate) -> Result<Self> {
        if !config::PERIOD_BOUNDS.contains(&months_back) {
            return Err(SosError::InvalidArgument(format!(
                "months_back must be within {}..={}, got {}",
                config::PERIOD_BOUNDS.start(),
                config::PERIOD_BOUNDS.end(),
                months_back
            )));
        }
        let end = MonthKey::from_date(today).offset(-config::RECENCY_OFFSET_MONTHS);
        Self::ending_at(end, months_back as usize)
    }

    /// `len` consecutive months finishing with `end`.
    pub fn ending_at(end: MonthKey, len: usize) -> Result<Self> {
        if len == 0 {
            return Err(SosError::InvalidArgument(
                "a period needs at least one month".to_string(),
            ));
        }
        let months = (0..len as i32)
            .rev()
            .map(|back| end.offset(-back))
            .collect();
        Ok(Self { months })
    }

    /// An explicit list of months, which must be non-empty and strictly ascending.
    pub fn from_months(months: Vec<MonthKey>) -> Result<Self> {
        if months.is_empty() {
            return Err(SosError::InvalidArgument(
                "a period needs at least one month".to_string(),
            ));
        }
        if months.windows(2).any(|w| w[0] >= w[1]) {
            return Err(SosError::InvalidArgument(
                "period months must be unique and in ascending order".to_string(),
            ));
        }
        Ok(Self { months })
    }

    pub fn months(&self) -> &[MonthKey] {
        &self.months
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn start(&self) -> MonthKey {
        self.months[0]
    }

    pub fn end(&self) -> MonthKey {
        self.months[self.months.len() - 1]
    }

    pub fn contains(&self, key: &MonthKey) -> bool {
        self.months.binary_search(key).is_ok()
    }
}
