use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::LandingConfig;
use crate::models::media::Image;
use crate::services::http_service::{build_url, HttpClient, UpstreamError};

#[derive(Clone)]
pub struct PexelsService {
    http: Arc<dyn HttpClient>,
    base: String,
    api_key: String,
    timeout: Duration,
}

impl PexelsService {
    pub fn new(config: &LandingConfig, http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            base: config.pexels_base.trim_end_matches('/').to_string(),
            api_key: config.pexels_api_key.clone(),
            timeout: config.outbound_timeout,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// First landscape photo for `query`.
    ///
    /// `Ok(None)` when no key is configured or nothing matched; only transport
    /// and HTTP failures are errors.
    pub async fn search_image(&self, query: &str) -> Result<Option<Image>, UpstreamError> {
        if !self.is_configured() {
            return Ok(None);
        }

        let url = build_url(
            &format!("{}/search", self.base),
            &[
                ("query", query.to_string()),
                ("per_page", "1".to_string()),
                ("orientation", "landscape".to_string()),
                ("size", "large".to_string()),
            ],
        )?;
        let headers = [("Authorization", self.api_key.clone())];
        let response = self.http.get(&url, &headers, self.timeout).await?;

        Ok(first_photo(&response.data))
    }

    /// Best-effort variant for enrichment: failures are logged and read as
    /// "no image".
    pub async fn find_image(&self, query: &str) -> Option<Image> {
        match self.search_image(query).await {
            Ok(image) => image,
            Err(e) => {
                log::warn!("Pexels search failed for '{}': {}", query, e);
                None
            }
        }
    }
}

fn first_photo(data: &Value) -> Option<Image> {
    let photo = data["photos"].as_array()?.first()?;
    let src = &photo["src"];
    let url = ["landscape", "large", "original"]
        .iter()
        .find_map(|size| src[*size].as_str().filter(|s| !s.is_empty()))?;

    Some(Image {
        url: url.to_string(),
        photographer: photo["photographer"]
            .as_str()
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    })
}
