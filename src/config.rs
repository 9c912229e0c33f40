//! Endpoints, run constants, code lookup tables and the analysis configuration file.
//!
//! The country, language and marketplace tables are closed enums, so an
//! unknown label is rejected when the configuration is loaded rather than when
//! a source first needs the code.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SosError};

pub const GOOGLE_ADS_API_BASE: &str = "https://googleads.googleapis.com";
pub const GOOGLE_ADS_API_VERSION: &str = "v22";
pub const GOOGLE_OAUTH_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DATAFORSEO_API_BASE: &str = "https://api.dataforseo.com";
pub const DATAFORSEO_AMAZON_VOLUME_PATH: &str = "/v3/keywords_data/amazon/search_volume/live";

/// Most recent complete keyword data lags real time by this many months.
pub const RECENCY_OFFSET_MONTHS: i32 = 2;
/// Allowed trailing window sizes, in months.
pub const PERIOD_BOUNDS: RangeInclusive<u32> = 3..=12;
pub const DEFAULT_MONTHS_BACK: u32 = 12;

pub const GOOGLE_PACING: Duration = Duration::from_secs(2);
pub const AMAZON_PACING: Duration = Duration::from_secs(1);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Version of the country / language / marketplace code tables below.
pub const LOOKUP_TABLE_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Lookup tables
// ---------------------------------------------------------------------------

/// Google Ads geo target countries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Country {
    #[serde(rename = "Belgium")]
    Belgium,
    #[serde(rename = "United States")]
    UnitedStates,
    #[serde(rename = "United Kingdom")]
    UnitedKingdom,
    #[serde(rename = "France")]
    France,
    #[serde(rename = "Germany")]
    Germany,
}

impl Country {
    pub const ALL: [Country; 5] = [
        Country::Belgium,
        Country::UnitedStates,
        Country::UnitedKingdom,
        Country::France,
        Country::Germany,
    ];

    /// Geo target constant id.
    pub fn geo_target_code(&self) -> &'static str {
        match self {
            Country::Belgium => "2056",
            Country::UnitedStates => "2840",
            Country::UnitedKingdom => "2826",
            Country::France => "2250",
            Country::Germany => "2276",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Country::Belgium => "Belgium",
            Country::UnitedStates => "United States",
            Country::UnitedKingdom => "United Kingdom",
            Country::France => "France",
            Country::Germany => "Germany",
        }
    }
}

/// Google Ads keyword-plan languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    English,
    French,
    Dutch,
    German,
    Spanish,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::English,
        Language::French,
        Language::Dutch,
        Language::German,
        Language::Spanish,
    ];

    /// Language constant id.
    pub fn language_code(&self) -> &'static str {
        match self {
            Language::English => "1000",
            Language::German => "1001",
            Language::French => "1002",
            Language::Spanish => "1003",
            Language::Dutch => "1010",
        }
    }
}

/// Amazon marketplaces supported by the DataForSEO keyword endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmazonMarketplace {
    #[serde(rename = "amazon.com (US)")]
    UnitedStates,
    #[serde(rename = "amazon.co.uk (UK)")]
    UnitedKingdom,
    #[serde(rename = "amazon.de (Germany)")]
    Germany,
    #[serde(rename = "amazon.fr (France)")]
    France,
    #[serde(rename = "amazon.it (Italy)")]
    Italy,
    #[serde(rename = "amazon.es (Spain)")]
    Spain,
}

impl AmazonMarketplace {
    pub const ALL: [AmazonMarketplace; 6] = [
        AmazonMarketplace::UnitedStates,
        AmazonMarketplace::UnitedKingdom,
        AmazonMarketplace::Germany,
        AmazonMarketplace::France,
        AmazonMarketplace::Italy,
        AmazonMarketplace::Spain,
    ];

    /// DataForSEO location code.
    pub fn location_code(&self) -> u32 {
        match self {
            AmazonMarketplace::UnitedStates => 2840,
            AmazonMarketplace::UnitedKingdom => 2826,
            AmazonMarketplace::Germany => 2276,
            AmazonMarketplace::France => 2250,
            AmazonMarketplace::Italy => 2380,
            AmazonMarketplace::Spain => 2724,
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// AnalysisConfig
// ---------------------------------------------------------------------------

/// OAuth and account settings for the Google Ads keyword planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleAdsCredentials {
    pub developer_token: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub customer_id: String,
    #[serde(default)]
    pub login_customer_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleSettings {
    pub country: Country,
    pub language: Language,
    pub credentials: GoogleAdsCredentials,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmazonSettings {
    pub marketplace: AmazonMarketplace,
    pub login: String,
    pub password: String,
}

/// Everything a run needs: brands, window size and the enabled platforms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub target_brand: String,
    #[serde(default)]
    pub competitors: Vec<String>,
    #[serde(default = "default_months_back")]
    pub months_back: u32,
    #[serde(default = "default_lookup_version")]
    pub lookup_version: u32,
    #[serde(default)]
    pub google: Option<GoogleSettings>,
    #[serde(default)]
    pub amazon: Option<AmazonSettings>,
}

fn default_months_back() -> u32 {
    DEFAULT_MONTHS_BACK
}

fn default_lookup_version() -> u32 {
    LOOKUP_TABLE_VERSION
}

impl AnalysisConfig {
    /// Read a JSON configuration file and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }

    /// Parse and validate a JSON configuration document.
    ///
    /// Unknown country, language or marketplace labels fail here.
    pub fn from_json(contents: &str) -> Result<Self> {
        let config: AnalysisConfig = serde_json::from_str(contents)
            .map_err(|e| SosError::Config(format!("invalid configuration: {}", e)))?;
        config.validated()
    }

    /// Normalize brand lists and customer ids, then check every constraint.
    pub fn validated(mut self) -> Result<Self> {
        if self.lookup_version != LOOKUP_TABLE_VERSION {
            return Err(SosError::Config(format!(
                "lookup table version {} is not supported (expected {})",
                self.lookup_version, LOOKUP_TABLE_VERSION
            )));
        }

        self.target_brand = self.target_brand.trim().to_string();
        if self.target_brand.is_empty() {
            return Err(SosError::Config("target_brand must not be empty".to_string()));
        }
        self.competitors = self
            .competitors
            .iter()
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .collect();

        let mut seen = HashSet::new();
        for brand in self.brands() {
            if !seen.insert(brand.to_lowercase()) {
                return Err(SosError::Config(format!("duplicate brand '{}'", brand)));
            }
        }

        if !PERIOD_BOUNDS.contains(&self.months_back) {
            return Err(SosError::Config(format!(
                "months_back must be within {}..={}, got {}",
                PERIOD_BOUNDS.start(),
                PERIOD_BOUNDS.end(),
                self.months_back
            )));
        }

        if self.google.is_none() && self.amazon.is_none() {
            return Err(SosError::Config(
                "at least one platform (google or amazon) must be configured".to_string(),
            ));
        }

        if let Some(google) = self.google.as_mut() {
            let creds = &mut google.credentials;
            creds.customer_id = creds.customer_id.replace('-', "");
            creds.login_customer_id = creds
                .login_customer_id
                .as_ref()
                .map(|id| id.replace('-', ""))
                .filter(|id| !id.is_empty());
            if creds.customer_id.is_empty() || creds.developer_token.is_empty() {
                return Err(SosError::Config(
                    "google credentials need a customer_id and developer_token".to_string(),
                ));
            }
        }

        if let Some(amazon) = &self.amazon {
            if amazon.login.is_empty() || amazon.password.is_empty() {
                return Err(SosError::Config(
                    "amazon settings need a DataForSEO login and password".to_string(),
                ));
            }
        }

        Ok(self)
    }

    /// Target brand first, then competitors in configured order.
    pub fn brands(&self) -> Vec<String> {
        std::iter::once(self.target_brand.clone())
            .chain(self.competitors.iter().cloned())
            .collect()
    }
}

pub fn default_config_path() -> PathBuf {
    if let Some(dir) = dirs::config_dir() {
        dir.join("share-of-search").join("config.json")
    } else {
        PathBuf::from(".share-of-search.json")
    }
}
