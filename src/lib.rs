//! Share of Search for Rust.
//!
//! Measures a brand's fraction of total category search volume against a set
//! of competitors, per platform (Google web search, Amazon marketplace search)
//! and combined across platforms, over a trailing window of months.
//!
//! The computation core ([`compute_aggregate`], [`compute_monthly`],
//! [`compute_combined`]) is pure and synchronous. Fetching lives behind the
//! [`VolumeSource`](sources::VolumeSource) trait.
//!
//! # Quick start
//!
//! ```no_run
//! use share_of_search::sources::{StaticSource, VolumeSource};
//! use share_of_search::{Platform, ShareOfSearch};
//!
//! let sos = ShareOfSearch::builder()
//!     .target_brand("LampTwist")
//!     .competitors(["MOHD", "La Redoute", "west elm"])
//!     .months_back(6)
//!     .build()
//!     .unwrap();
//!
//! let google = StaticSource::new(Platform::Google)
//!     .with_total("LampTwist", 1_000, sos.period())
//!     .with_total("MOHD", 500, sos.period());
//!
//! let report = sos.run(&[&google as &dyn VolumeSource]).unwrap();
//! println!("{}", report.to_json().unwrap());
//! ```

#[cfg(feature = "async")]
pub mod async_runner;
pub mod compute;
pub mod config;
pub mod error;
pub mod models;
pub mod period;
pub mod pipeline;
pub mod sources;

#[cfg(feature = "async")]
pub use async_runner::AsyncShareOfSearch;
pub use compute::{compute_aggregate, compute_combined, compute_monthly};
pub use config::AnalysisConfig;
pub use error::{ErrorClass, Result, SosError};
pub use models::{
    AggregateShare, BrandVolumeRecord, CombinedShare, Granularity, MonthlyShare, Platform,
};
pub use period::{MonthKey, Period};
pub use pipeline::{PlatformReport, PlatformStatus, RunReport};

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tracing::info;

use sources::{AmazonSource, CancelToken, GoogleAdsSource, VolumeSource};

// ---------------------------------------------------------------------------
// ShareOfSearchBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`ShareOfSearch`] analysis.
///
/// Use [`ShareOfSearch::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](ShareOfSearchBuilder::build).
pub struct ShareOfSearchBuilder {
    target_brand: String,
    competitors: Vec<String>,
    months_back: u32,
    today: Option<NaiveDate>,
    period: Option<Period>,
    cancel: CancelToken,
}

impl Default for ShareOfSearchBuilder {
    fn default() -> Self {
        Self {
            target_brand: String::new(),
            competitors: Vec::new(),
            months_back: config::DEFAULT_MONTHS_BACK,
            today: None,
            period: None,
            cancel: CancelToken::new(),
        }
    }
}

impl ShareOfSearchBuilder {
    /// The brand the analysis is about. Required.
    pub fn target_brand(mut self, brand: &str) -> Self {
        self.target_brand = brand.to_string();
        self
    }

    /// Competitor brands. Blank names are ignored.
    pub fn competitors<I, S>(mut self, brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.competitors = brands.into_iter().map(|b| b.as_ref().to_string()).collect();
        self
    }

    /// Size of the trailing window, 3 to 12 months. Defaults to 12.
    pub fn months_back(mut self, months: u32) -> Self {
        self.months_back = months;
        self
    }

    /// Reference date for the trailing window. Defaults to today (UTC).
    pub fn today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Use an explicit period instead of a trailing window.
    pub fn period(mut self, period: Period) -> Self {
        self.period = Some(period);
        self
    }

    /// Share a cancellation token with the caller.
    pub fn cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn build(self) -> Result<ShareOfSearch> {
        let target_brand = self.target_brand.trim().to_string();
        if target_brand.is_empty() {
            return Err(SosError::InvalidArgument(
                "target brand must not be empty".to_string(),
            ));
        }

        let mut brands = vec![target_brand.clone()];
        brands.extend(
            self.competitors
                .iter()
                .map(|b| b.trim().to_string())
                .filter(|b| !b.is_empty()),
        );
        let mut seen = HashSet::new();
        for brand in &brands {
            if !seen.insert(brand.to_lowercase()) {
                return Err(SosError::InvalidArgument(format!("duplicate brand '{}'", brand)));
            }
        }

        let period = match self.period {
            Some(period) => period,
            None => {
                let today = self.today.unwrap_or_else(|| Utc::now().date_naive());
                Period::trailing(self.months_back, today)?
            }
        };

        Ok(ShareOfSearch {
            target_brand,
            brands,
            period,
            cancel: self.cancel,
        })
    }
}

// ---------------------------------------------------------------------------
// ShareOfSearch
// ---------------------------------------------------------------------------

/// A configured analysis: the brand set and the canonical period.
///
/// Created via [`ShareOfSearch::builder()`] or [`ShareOfSearch::from_config`].
/// Every run returns a fresh [`RunReport`]; nothing is retained between runs.
pub struct ShareOfSearch {
    target_brand: String,
    brands: Vec<String>,
    period: Period,
    cancel: CancelToken,
}

impl ShareOfSearch {
    pub fn builder() -> ShareOfSearchBuilder {
        ShareOfSearchBuilder::default()
    }

    /// Build an analysis from a validated configuration, with a trailing
    /// window ending relative to today.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        Self::builder()
            .target_brand(&config.target_brand)
            .competitors(&config.competitors)
            .months_back(config.months_back)
            .build()
    }

    /// Construct a source for every platform configured in `config`.
    pub fn sources_from_config(
        config: &AnalysisConfig,
        timeout: Duration,
    ) -> Result<Vec<Box<dyn VolumeSource>>> {
        let mut sources: Vec<Box<dyn VolumeSource>> = Vec::new();
        if let Some(google) = &config.google {
            sources.push(Box::new(GoogleAdsSource::new(google.clone(), timeout)?));
        }
        if let Some(amazon) = &config.amazon {
            sources.push(Box::new(AmazonSource::new(amazon.clone(), timeout)?));
        }
        Ok(sources)
    }

    pub fn target_brand(&self) -> &str {
        &self.target_brand
    }

    /// Target brand first, then competitors.
    pub fn brands(&self) -> &[String] {
        &self.brands
    }

    pub fn period(&self) -> &Period {
        &self.period
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Fetch every brand from `source` and compute that platform's shares.
    ///
    /// Brand-level failures end up in the report. The only error is
    /// [`SosError::Cancelled`].
    pub fn analyze(&self, source: &dyn VolumeSource) -> Result<PlatformReport> {
        let collected = sources::collect_records(source, &self.brands, &self.period, &self.cancel)?;
        Ok(pipeline::analyze_platform(
            source.platform(),
            &collected.records,
            &self.period,
            collected.failures,
        ))
    }

    /// Compute one platform's shares from records obtained elsewhere.
    pub fn analyze_records(&self, platform: Platform, records: &[BrandVolumeRecord]) -> PlatformReport {
        pipeline::analyze_platform(platform, records, &self.period, Vec::new())
    }

    /// Run every source in turn, then combine the qualifying platforms.
    pub fn run(&self, sources: &[&dyn VolumeSource]) -> Result<RunReport> {
        check_distinct_platforms(sources.iter().map(|s| s.platform()))?;
        info!(
            target_brand = self.target_brand.as_str(),
            brands = self.brands.len(),
            start = %self.period.start(),
            end = %self.period.end(),
            "starting run"
        );

        let mut reports = Vec::with_capacity(sources.len());
        for source in sources {
            reports.push(self.analyze(*source)?);
        }
        Ok(RunReport::assemble(&self.target_brand, self.period.clone(), reports))
    }
}

pub(crate) fn check_distinct_platforms(platforms: impl Iterator<Item = Platform>) -> Result<()> {
    let mut seen = HashSet::new();
    let mut any = false;
    for platform in platforms {
        any = true;
        if !seen.insert(platform) {
            return Err(SosError::InvalidArgument(format!(
                "more than one source for platform {}",
                platform
            )));
        }
    }
    if !any {
        return Err(SosError::InvalidArgument("no sources to run".to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for ShareOfSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ShareOfSearch(target={}, brands=[{}], period={}..{})",
            self.target_brand,
            self.brands.join(", "),
            self.period.start(),
            self.period.end()
        )
    }
}
