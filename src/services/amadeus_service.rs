use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::LandingConfig;
use crate::db::CacheStore;
use crate::models::flight::FlightQuery;
use crate::models::location::Place;
use crate::services::http_service::{build_url, HttpClient, UpstreamError};

pub const TOKEN_CACHE_KEY: &str = "amadeus:oauth:access_token:v2";

const DEFAULT_TOKEN_LIFETIME_SECONDS: u64 = 900;
const TOKEN_SAFETY_MARGIN_SECONDS: u64 = 30;
const FLIGHT_SEARCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Amadeus Self-Service client: OAuth client-credentials plus the location
/// and flight-offer searches.
///
/// The access token lives in the shared cache store. A request rejected with
/// 401/403 triggers exactly one forced token refresh and one retry.
#[derive(Clone)]
pub struct AmadeusService {
    http: Arc<dyn HttpClient>,
    cache: Arc<dyn CacheStore>,
    base: String,
    client_id: String,
    client_secret: String,
    timeout: Duration,
}

impl AmadeusService {
    pub fn new(config: &LandingConfig, http: Arc<dyn HttpClient>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            http,
            cache,
            base: config.amadeus_base.trim_end_matches('/').to_string(),
            client_id: config.amadeus_client_id.clone(),
            client_secret: config.amadeus_client_secret.clone(),
            timeout: config.outbound_timeout,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    fn token_url(&self) -> String {
        let root = match self.base.rfind("/v1") {
            Some(idx) => &self.base[..idx],
            None => self.base.as_str(),
        };
        format!("{}/v1/security/oauth2/token", root)
    }

    pub async fn get_access_token(&self, force_refresh: bool) -> Result<String, UpstreamError> {
        if !force_refresh {
            match self.cache.get(TOKEN_CACHE_KEY).await {
                Ok(Some(Value::String(token))) if !token.is_empty() => return Ok(token),
                Ok(_) => {}
                Err(e) => log::warn!("Amadeus token cache read failed: {}", e),
            }
        }

        if !self.is_configured() {
            return Err(UpstreamError::new("Amadeus is not configured").with_status(503));
        }

        log::info!("Requesting Amadeus access token (forced: {})", force_refresh);
        let form = [
            ("grant_type", "client_credentials".to_string()),
            ("client_id", self.client_id.clone()),
            ("client_secret", self.client_secret.clone()),
        ];
        let response = self
            .http
            .post_form(&self.token_url(), &form, &[], self.timeout)
            .await
            .map_err(|e| UpstreamError {
                message: "Amadeus OAuth failed - check AMADEUS_CLIENT_ID/SECRET are valid".to_string(),
                status: Some(e.status.unwrap_or(503)),
                details: e.details,
            })?;

        let token = match &response.data["access_token"] {
            Value::String(token) if !token.is_empty() => token.clone(),
            _ => {
                return Err(
                    UpstreamError::new("Amadeus token missing - credentials may be invalid")
                        .with_status(502)
                        .with_details(response.data.clone()),
                )
            }
        };

        let lifetime = match &response.data["expires_in"] {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
        .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECONDS);
        let ttl = lifetime
            .saturating_sub(TOKEN_SAFETY_MARGIN_SECONDS)
            .max(TOKEN_SAFETY_MARGIN_SECONDS);

        if let Err(e) = self
            .cache
            .set(TOKEN_CACHE_KEY, &Value::String(token.clone()), ttl)
            .await
        {
            log::warn!("Amadeus token cache write failed: {}", e);
        }

        Ok(token)
    }

    async fn get_with_token(&self, url: &str, token: &str, timeout: Duration) -> Result<Value, UpstreamError> {
        let headers = [("Authorization", format!("Bearer {}", token))];
        let response = self.http.get(url, &headers, timeout).await?;
        Ok(response.data)
    }

    /// GET with the cached token, refreshing it once if Amadeus rejects it.
    async fn authorized_get(&self, url: &str, timeout: Duration) -> Result<Value, UpstreamError> {
        let token = self.get_access_token(false).await?;
        match self.get_with_token(url, &token, timeout).await {
            Err(e) if e.is_auth_failure() => {
                log::info!("Amadeus rejected cached token ({:?}), refreshing once", e.status);
                let token = self.get_access_token(true).await?;
                self.get_with_token(url, &token, timeout).await
            }
            other => other,
        }
    }

    /// City and airport lookup. Entries without id and name are dropped.
    pub async fn search_cities(&self, keyword: &str, limit: usize) -> Result<Vec<Place>, UpstreamError> {
        let url = build_url(
            &format!("{}/reference-data/locations", self.base),
            &[
                ("subType", "CITY,AIRPORT".to_string()),
                ("keyword", keyword.to_string()),
                ("page[limit]", limit.to_string()),
            ],
        )?;
        let data = self.authorized_get(&url, self.timeout).await?;

        Ok(data["data"]
            .as_array()
            .map(|items| items.iter().filter_map(Place::from_amadeus).collect())
            .unwrap_or_default())
    }

    /// Raw flight offers priced in USD.
    pub async fn search_flight_offers(&self, query: &FlightQuery) -> Result<Vec<Value>, UpstreamError> {
        let mut params = vec![
            ("originLocationCode", query.origin.clone()),
            ("destinationLocationCode", query.destination.clone()),
            ("departureDate", query.departure_date.clone()),
            ("adults", query.adults.to_string()),
            ("max", query.limit.to_string()),
            ("currencyCode", "USD".to_string()),
        ];
        if let Some(return_date) = &query.return_date {
            params.push(("returnDate", return_date.clone()));
        }
        let base_v2 = self.base.replace("/v1", "/v2");
        let url = build_url(&format!("{}/shopping/flight-offers", base_v2), &params)?;
        let data = self
            .authorized_get(&url, self.timeout.max(FLIGHT_SEARCH_TIMEOUT))
            .await?;

        Ok(data["data"].as_array().cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryCacheStore;
    use crate::services::http_service::ReqwestHttpClient;

    fn service(base: &str) -> AmadeusService {
        let config = LandingConfig {
            amadeus_base: base.to_string(),
            ..LandingConfig::default()
        };
        AmadeusService::new(
            &config,
            Arc::new(ReqwestHttpClient::new()),
            Arc::new(MemoryCacheStore::new()),
        )
    }

    #[test]
    fn test_token_url_strips_version() {
        assert_eq!(
            service("https://test.api.amadeus.com/v1").token_url(),
            "https://test.api.amadeus.com/v1/security/oauth2/token"
        );
        assert_eq!(
            service("http://localhost:9000/").token_url(),
            "http://localhost:9000/v1/security/oauth2/token"
        );
    }

    #[tokio::test]
    async fn test_unconfigured_token_request_is_503() {
        let err = service("https://test.api.amadeus.com/v1")
            .get_access_token(false)
            .await
            .unwrap_err();
        assert_eq!(err.status, Some(503));
    }

    #[tokio::test]
    async fn test_cached_token_is_reused_without_credentials() {
        let svc = service("https://test.api.amadeus.com/v1");
        svc.cache
            .set(TOKEN_CACHE_KEY, &Value::String("abc".to_string()), 60)
            .await
            .unwrap();
        assert_eq!(svc.get_access_token(false).await.unwrap(), "abc");
        assert!(svc.get_access_token(true).await.is_err());
    }
}
