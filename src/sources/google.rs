//! Google Ads keyword planner source (REST `generateKeywordIdeas`).

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::debug;

use super::{body_excerpt, lenient_i64, VolumeSource};
use crate::config::{self, GoogleSettings};
use crate::error::{Result, SosError};
use crate::models::{BrandVolumeRecord, Platform};
use crate::period::{MonthKey, Period};

const MONTH_NAMES: [&str; 12] = [
    "JANUARY",
    "FEBRUARY",
    "MARCH",
    "APRIL",
    "MAY",
    "JUNE",
    "JULY",
    "AUGUST",
    "SEPTEMBER",
    "OCTOBER",
    "NOVEMBER",
    "DECEMBER",
];

/// Lifetime assumed when the token response carries no `expires_in`.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

/// Refresh this long before the reported expiry.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

struct AccessToken {
    value: String,
    expires_at: Instant,
}

/// Web-search volumes from the Google Ads keyword planner.
///
/// The OAuth access token is obtained from the refresh token on first use and
/// reused for later brands until it is about to expire. A `401` from the API
/// drops the cached token and the request is retried once with a fresh one.
pub struct GoogleAdsSource {
    client: Client,
    settings: GoogleSettings,
    api_base: String,
    token_url: String,
    pacing: Duration,
    access_token: Mutex<Option<AccessToken>>,
}

impl GoogleAdsSource {
    pub fn new(settings: GoogleSettings, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self {
            client,
            settings,
            api_base: config::GOOGLE_ADS_API_BASE.to_string(),
            token_url: config::GOOGLE_OAUTH_TOKEN_URL.to_string(),
            pacing: config::GOOGLE_PACING,
            access_token: Mutex::new(None),
        })
    }

    /// Point the source at a different API host.
    pub fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_token_url(mut self, url: &str) -> Self {
        self.token_url = url.to_string();
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    fn access_token(&self, brand: &str) -> Result<String> {
        let mut cached = self
            .access_token
            .lock()
            .map_err(|_| SosError::fetch(Platform::Google, brand, "token cache poisoned"))?;
        if let Some(token) = cached.as_ref().filter(|t| Instant::now() < t.expires_at) {
            return Ok(token.value.clone());
        }

        let creds = &self.settings.credentials;
        let resp = self
            .client
            .post(&self.token_url)
            .form(&[
                ("client_id", creds.client_id.as_str()),
                ("client_secret", creds.client_secret.as_str()),
                ("refresh_token", creds.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .map_err(|e| SosError::fetch(Platform::Google, brand, e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| SosError::fetch(Platform::Google, brand, e.to_string()))?;
        if !status.is_success() {
            return Err(SosError::fetch(
                Platform::Google,
                brand,
                format!("OAuth token refresh returned {}: {}", status, body_excerpt(&body)),
            ));
        }

        let data = parse_body(brand, &body)?;
        let token = data
            .get("access_token")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                SosError::fetch(Platform::Google, brand, "OAuth response has no access_token")
            })?;
        let lifetime = data
            .get("expires_in")
            .and_then(lenient_i64)
            .map(|secs| Duration::from_secs(secs.clamp(0, 86_400) as u64))
            .unwrap_or(DEFAULT_TOKEN_LIFETIME);
        *cached = Some(AccessToken {
            value: token.clone(),
            expires_at: Instant::now() + lifetime.saturating_sub(TOKEN_EXPIRY_MARGIN),
        });
        Ok(token)
    }

    fn forget_access_token(&self) {
        if let Ok(mut cached) = self.access_token.lock() {
            cached.take();
        }
    }

    fn request_body(&self, brand: &str, period: &Period, page_token: Option<&str>) -> Value {
        let start = period.start();
        let end = period.end();
        let mut body = json!({
            "language": format!("languageConstants/{}", self.settings.language.language_code()),
            "geoTargetConstants": [
                format!("geoTargetConstants/{}", self.settings.country.geo_target_code())
            ],
            "keywordPlanNetwork": "GOOGLE_SEARCH",
            "keywordSeed": { "keywords": [brand.to_lowercase()] },
            "historicalMetricsOptions": {
                "yearMonthRange": {
                    "start": { "year": start.year(), "month": MONTH_NAMES[start.month() as usize - 1] },
                    "end": { "year": end.year(), "month": MONTH_NAMES[end.month() as usize - 1] }
                }
            }
        });
        if let Some(token) = page_token {
            body["pageToken"] = Value::String(token.to_string());
        }
        body
    }
}

impl VolumeSource for GoogleAdsSource {
    fn platform(&self) -> Platform {
        Platform::Google
    }

    fn pacing(&self) -> Duration {
        self.pacing
    }

    fn fetch(&self, brand: &str, period: &Period) -> Result<BrandVolumeRecord> {
        let mut token = self.access_token(brand)?;
        let mut reauthorized = false;
        let creds = &self.settings.credentials;
        let url = format!(
            "{}/{}/customers/{}:generateKeywordIdeas",
            self.api_base,
            config::GOOGLE_ADS_API_VERSION,
            creds.customer_id
        );

        let mut ideas: Vec<Value> = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut req = self
                .client
                .post(&url)
                .bearer_auth(&token)
                .header("developer-token", &creds.developer_token)
                .json(&self.request_body(brand, period, page_token.as_deref()));
            if let Some(login) = &creds.login_customer_id {
                req = req.header("login-customer-id", login);
            }

            let resp = req
                .send()
                .map_err(|e| SosError::fetch(Platform::Google, brand, e.to_string()))?;
            let status = resp.status();
            let body = resp
                .text()
                .map_err(|e| SosError::fetch(Platform::Google, brand, e.to_string()))?;
            if status == StatusCode::UNAUTHORIZED && !reauthorized {
                debug!(brand, "access token rejected, refreshing");
                self.forget_access_token();
                token = self.access_token(brand)?;
                reauthorized = true;
                continue;
            }
            if !status.is_success() {
                return Err(SosError::fetch(
                    Platform::Google,
                    brand,
                    format!("Google Ads API returned {}: {}", status, body_excerpt(&body)),
                ));
            }

            let data = parse_body(brand, &body)?;
            if let Some(results) = data.get("results").and_then(|v| v.as_array()) {
                ideas.extend(results.iter().cloned());
            }
            page_token = data
                .get("nextPageToken")
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string());
            if page_token.is_none() {
                break;
            }
        }

        debug!(brand, ideas = ideas.len(), "received keyword ideas");
        Ok(parse_keyword_ideas(brand, &ideas))
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

fn parse_body(brand: &str, body: &str) -> Result<Value> {
    serde_json::from_str(body).map_err(|e| {
        SosError::fetch(
            Platform::Google,
            brand,
            format!("malformed response: {}: {}", e, body_excerpt(body)),
        )
    })
}

/// Sum the metrics of every idea whose text contains the brand.
pub fn parse_keyword_ideas(brand: &str, ideas: &[Value]) -> BrandVolumeRecord {
    let needle = brand.to_lowercase();
    let mut average = 0i64;
    let mut monthly: BTreeMap<MonthKey, i64> = BTreeMap::new();
    let mut keywords = Vec::new();

    for idea in ideas {
        let text = idea.get("text").and_then(|v| v.as_str()).unwrap_or("");
        if !text.to_lowercase().contains(&needle) {
            continue;
        }
        keywords.push(text.to_string());

        let Some(metrics) = idea.get("keywordIdeaMetrics") else {
            continue;
        };
        average += metrics
            .get("avgMonthlySearches")
            .and_then(lenient_i64)
            .unwrap_or(0);

        let volumes = metrics
            .get("monthlySearchVolumes")
            .and_then(|v| v.as_array())
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        for entry in volumes {
            let year = entry.get("year").and_then(lenient_i64);
            let month = entry.get("month").and_then(month_number);
            let (Some(year), Some(month)) = (year, month) else {
                continue;
            };
            let Ok(key) = MonthKey::new(year as i32, month) else {
                continue;
            };
            let searches = entry.get("monthlySearches").and_then(lenient_i64).unwrap_or(0);
            *monthly.entry(key).or_insert(0) += searches;
        }
    }

    BrandVolumeRecord::monthly(brand, Platform::Google, monthly)
        .with_average(average)
        .with_keywords(keywords)
}

/// Month as an enum name (`"MARCH"`) or a number.
fn month_number(value: &Value) -> Option<u32> {
    if let Some(name) = value.as_str() {
        if let Some(pos) = MONTH_NAMES.iter().position(|m| m.eq_ignore_ascii_case(name)) {
            return Some(pos as u32 + 1);
        }
    }
    lenient_i64(value).map(|n| n as u32)
}
