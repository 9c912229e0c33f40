use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SosError};
use crate::period::{MonthKey, Period};

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Google,
    Amazon,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Google, Platform::Amazon];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Google => "google",
            Platform::Amazon => "amazon",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = SosError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(Platform::Google),
            "amazon" => Ok(Platform::Amazon),
            other => Err(SosError::Computation(format!("unknown platform tag '{}'", other))),
        }
    }
}

// ---------------------------------------------------------------------------
// Granularity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// The source reported a value for each month.
    Monthly,
    /// The source reported one aggregate, repeated across every month.
    FlattenedAggregate,
}

// ---------------------------------------------------------------------------
// BrandVolumeRecord
// ---------------------------------------------------------------------------

/// One brand's raw observation for one platform over the requested period.
///
/// Volumes are signed so that invalid source values survive until
/// normalization rejects them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandVolumeRecord {
    pub brand: String,
    pub platform: Platform,
    pub monthly_volumes: BTreeMap<MonthKey, i64>,
    /// Supplied by the source when `Some`; otherwise derived from `monthly_volumes`.
    pub average_volume: Option<i64>,
    pub granularity: Granularity,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl BrandVolumeRecord {
    /// A record with true monthly data and no supplied average.
    pub fn monthly(
        brand: &str,
        platform: Platform,
        monthly_volumes: impl IntoIterator<Item = (MonthKey, i64)>,
    ) -> Self {
        Self {
            brand: brand.to_string(),
            platform,
            monthly_volumes: monthly_volumes.into_iter().collect(),
            average_volume: None,
            granularity: Granularity::Monthly,
            keywords: Vec::new(),
        }
    }

    /// The degraded mode for sources that only report an aggregate: the value
    /// is repeated for every month of `period`.
    pub fn flattened(brand: &str, platform: Platform, volume: i64, period: &Period) -> Self {
        Self {
            brand: brand.to_string(),
            platform,
            monthly_volumes: period.months().iter().map(|m| (*m, volume)).collect(),
            average_volume: Some(volume),
            granularity: Granularity::FlattenedAggregate,
            keywords: vec![brand.to_string()],
        }
    }

    pub fn with_average(mut self, average: i64) -> Self {
        self.average_volume = Some(average);
        self
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }
}

// ---------------------------------------------------------------------------
// NormalizedRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    pub brand: String,
    pub platform: Platform,
    /// Exactly the period's months, zero-filled where the source had no value.
    pub monthly_volumes: BTreeMap<MonthKey, u64>,
    pub average_volume: u64,
    pub granularity: Granularity,
    pub keywords: Vec<String>,
}

impl NormalizedRecord {
    pub fn volume_for(&self, month: &MonthKey) -> u64 {
        self.monthly_volumes.get(month).copied().unwrap_or(0)
    }
}
