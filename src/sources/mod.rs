//! Search-volume sources.
//!
//! A [`VolumeSource`] turns a brand name into a raw [`BrandVolumeRecord`] for
//! its platform. Network access, credentials and request pacing all live here;
//! the computation core only ever sees the records.

pub mod amazon;
pub mod google;

pub use amazon::AmazonSource;
pub use google::GoogleAdsSource;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, SosError};
use crate::models::{BrandFailure, BrandVolumeRecord, Platform};
use crate::period::Period;

// ---------------------------------------------------------------------------
// VolumeSource
// ---------------------------------------------------------------------------

pub trait VolumeSource: Send + Sync {
    fn platform(&self) -> Platform;

    /// Delay between consecutive brand requests.
    fn pacing(&self) -> Duration {
        Duration::ZERO
    }

    fn fetch(&self, brand: &str, period: &Period) -> Result<BrandVolumeRecord>;
}

// ---------------------------------------------------------------------------
// CancelToken
// ---------------------------------------------------------------------------

/// Cooperative cancellation flag, checked before each brand request.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// collect_records
// ---------------------------------------------------------------------------

/// Records fetched for one platform, plus the brands that failed.
#[derive(Debug, Clone, Default)]
pub struct Collected {
    pub records: Vec<BrandVolumeRecord>,
    pub failures: Vec<BrandFailure>,
}

/// Fetch every brand from `source` in order.
///
/// A failing brand is logged and recorded, and the remaining brands are
/// still fetched. A record labelled with a brand other than the one requested
/// counts as a failed fetch. Returns [`SosError::Cancelled`] if `cancel` is set before a
/// request is made.
pub fn collect_records(
    source: &dyn VolumeSource,
    brands: &[String],
    period: &Period,
    cancel: &CancelToken,
) -> Result<Collected> {
    let platform = source.platform();
    let mut collected = Collected::default();

    for (i, brand) in brands.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(SosError::Cancelled);
        }
        debug!(%platform, brand = brand.as_str(), "fetching {}/{}", i + 1, brands.len());

        let fetched = source.fetch(brand, period).and_then(|record| {
            if record.brand.trim() == brand.trim() {
                Ok(record)
            } else {
                Err(SosError::fetch(
                    platform,
                    brand,
                    format!("source returned a record for '{}'", record.brand),
                ))
            }
        });
        match fetched {
            Ok(record) => collected.records.push(record),
            Err(e) => {
                warn!(%platform, brand = brand.as_str(), error = %e, "fetch failed");
                collected.failures.push(BrandFailure::new(brand, &e));
            }
        }

        if i + 1 < brands.len() && !source.pacing().is_zero() {
            std::thread::sleep(source.pacing());
        }
    }

    Ok(collected)
}

// ---------------------------------------------------------------------------
// StaticSource
// ---------------------------------------------------------------------------

/// In-memory source serving pre-built records, for offline runs and tests.
///
/// Unknown brands fail with [`SosError::Fetch`].
#[derive(Debug, Clone)]
pub struct StaticSource {
    platform: Platform,
    records: HashMap<String, BrandVolumeRecord>,
}

impl StaticSource {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            records: HashMap::new(),
        }
    }

    pub fn with_record(mut self, record: BrandVolumeRecord) -> Self {
        self.records.insert(record.brand.clone(), record);
        self
    }

    /// Serve `volume` as a flattened aggregate for `brand`.
    pub fn with_total(mut self, brand: &str, volume: i64, period: &Period) -> Self {
        let record = BrandVolumeRecord::flattened(brand, self.platform, volume, period);
        self.records.insert(brand.to_string(), record);
        self
    }
}

impl VolumeSource for StaticSource {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn fetch(&self, brand: &str, _period: &Period) -> Result<BrandVolumeRecord> {
        self.records
            .get(brand)
            .cloned()
            .ok_or_else(|| SosError::fetch(self.platform, brand, "no data for brand"))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Read an integer that may be encoded as a JSON number or a numeric string.
fn lenient_i64(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

/// First 200 characters of a response body, for error messages.
fn body_excerpt(body: &str) -> String {
    body.chars().take(200).collect()
}
