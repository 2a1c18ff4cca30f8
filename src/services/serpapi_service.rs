use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::LandingConfig;
use crate::models::hotel::Hotel;
use crate::services::http_service::{build_url, HttpClient, UpstreamError};

const HOTEL_SEARCH_TIMEOUT: Duration = Duration::from_secs(20);
const MAX_HOTELS: usize = 6;

/// Google Hotels search through SerpApi.
#[derive(Clone)]
pub struct SerpApiService {
    http: Arc<dyn HttpClient>,
    base: String,
    api_key: String,
    timeout: Duration,
}

impl SerpApiService {
    pub fn new(config: &LandingConfig, http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            base: config.serpapi_base.trim_end_matches('/').to_string(),
            api_key: config.serpapi_key.clone(),
            timeout: config.outbound_timeout.max(HOTEL_SEARCH_TIMEOUT),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub async fn search_hotels(
        &self,
        city: &str,
        check_in: &str,
        check_out: &str,
    ) -> Result<Vec<Hotel>, UpstreamError> {
        if !self.is_configured() {
            return Err(UpstreamError::new("SerpApi (Google Hotels) is not configured").with_status(503));
        }

        let url = build_url(
            &format!("{}/search", self.base),
            &[
                ("engine", "google_hotels".to_string()),
                ("q", format!("hotels in {}", city)),
                ("check_in_date", check_in.to_string()),
                ("check_out_date", check_out.to_string()),
                ("api_key", self.api_key.clone()),
                ("hl", "en".to_string()),
                ("gl", "in".to_string()),
                ("currency", "INR".to_string()),
            ],
        )?;

        let response = self
            .http
            .get(&url, &[], self.timeout)
            .await
            .map_err(|e| {
                let mut wrapped = UpstreamError::new(format!("Hotel search failed: {}", e)).with_status(502);
                wrapped.details = e.details;
                wrapped
            })?;

        Ok(hotels_from(&response.data))
    }
}

fn hotels_from(data: &Value) -> Vec<Hotel> {
    data["properties"]
        .as_array()
        .map(|props| {
            props
                .iter()
                .filter_map(Hotel::from_serpapi)
                .take(MAX_HOTELS)
                .collect()
        })
        .unwrap_or_default()
}
