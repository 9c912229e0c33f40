//! Amazon marketplace search volumes via the DataForSEO keywords API.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::{json, Value};

use super::{body_excerpt, lenient_i64, VolumeSource};
use crate::config::{self, AmazonSettings};
use crate::error::{Result, SosError};
use crate::models::{BrandVolumeRecord, Platform};
use crate::period::Period;

/// DataForSEO status code for a successful request or task.
const STATUS_OK: i64 = 20000;

/// Amazon search volumes from DataForSEO.
///
/// The endpoint only reports one aggregate volume per keyword, so records
/// are produced in the flattened-aggregate mode.
pub struct AmazonSource {
    client: Client,
    settings: AmazonSettings,
    api_base: String,
    pacing: Duration,
}

impl AmazonSource {
    pub fn new(settings: AmazonSettings, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self {
            client,
            settings,
            api_base: config::DATAFORSEO_API_BASE.to_string(),
            pacing: config::AMAZON_PACING,
        })
    }

    /// Point the source at a different API host.
    pub fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }
}

impl VolumeSource for AmazonSource {
    fn platform(&self) -> Platform {
        Platform::Amazon
    }

    fn pacing(&self) -> Duration {
        self.pacing
    }

    fn fetch(&self, brand: &str, period: &Period) -> Result<BrandVolumeRecord> {
        let url = format!("{}{}", self.api_base, config::DATAFORSEO_AMAZON_VOLUME_PATH);
        let payload = json!([{
            "location_code": self.settings.marketplace.location_code(),
            "keywords": [brand.to_lowercase()],
            "search_partners": false
        }]);

        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.settings.login, Some(&self.settings.password))
            .json(&payload)
            .send()
            .map_err(|e| SosError::fetch(Platform::Amazon, brand, e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| SosError::fetch(Platform::Amazon, brand, e.to_string()))?;
        if !status.is_success() {
            return Err(SosError::fetch(
                Platform::Amazon,
                brand,
                format!("DataForSEO returned {}: {}", status, body_excerpt(&body)),
            ));
        }

        let data: Value = serde_json::from_str(&body).map_err(|e| {
            SosError::fetch(
                Platform::Amazon,
                brand,
                format!("malformed response: {}: {}", e, body_excerpt(&body)),
            )
        })?;
        let volume = parse_search_volume(brand, &data)?;
        Ok(BrandVolumeRecord::flattened(brand, Platform::Amazon, volume, period))
    }
}

/// Extract `tasks[0].result[0].search_volume`.
///
/// A task without results means the keyword has no measurable volume and
/// yields `0`. A non-success status on the response or the task is an error.
pub fn parse_search_volume(brand: &str, data: &Value) -> Result<i64> {
    check_status(brand, data)?;

    let Some(task) = data
        .get("tasks")
        .and_then(|t| t.as_array())
        .and_then(|t| t.first())
    else {
        return Ok(0);
    };
    check_status(brand, task)?;

    Ok(task
        .get("result")
        .and_then(|r| r.as_array())
        .and_then(|r| r.first())
        .and_then(|r| r.get("search_volume"))
        .and_then(lenient_i64)
        .unwrap_or(0))
}

fn check_status(brand: &str, value: &Value) -> Result<()> {
    match value.get("status_code").and_then(lenient_i64) {
        Some(code) if code != STATUS_OK => {
            let message = value
                .get("status_message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error");
            Err(SosError::fetch(
                Platform::Amazon,
                brand,
                format!("DataForSEO status {}: {}", code, message),
            ))
        }
        _ => Ok(()),
    }
}
