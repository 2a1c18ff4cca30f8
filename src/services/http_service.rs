use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = "GlobeTrotterTechDecks/1.0";

/// Any failure talking to a third-party provider.
///
/// `status` is the upstream HTTP status when one was received (or a status the
/// adapter chose, e.g. 503 for missing credentials). Transport failures such as
/// DNS errors and timeouts carry no status.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct UpstreamError {
    pub message: String,
    pub status: Option<u16>,
    pub details: Option<Value>,
}

impl UpstreamError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            details: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// True when the provider rejected our credentials (401/403).
    pub fn is_auth_failure(&self) -> bool {
        matches!(self.status, Some(401) | Some(403))
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub data: Value,
    pub headers: HashMap<String, String>,
}

pub type Headers<'a> = &'a [(&'a str, String)];

/// Outbound JSON-over-HTTP. No retries happen at this layer.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(
        &self,
        url: &str,
        headers: Headers<'_>,
        timeout: Duration,
    ) -> Result<HttpResponse, UpstreamError>;

    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, String)],
        headers: Headers<'_>,
        timeout: Duration,
    ) -> Result<HttpResponse, UpstreamError>;

    async fn post_json(
        &self,
        url: &str,
        payload: &Value,
        headers: Headers<'_>,
        timeout: Duration,
    ) -> Result<HttpResponse, UpstreamError>;
}

#[derive(Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        headers: Headers<'_>,
        timeout: Duration,
    ) -> Result<HttpResponse, UpstreamError> {
        let mut request = request
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .timeout(timeout);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }

        let response = request.send().await.map_err(|e| {
            UpstreamError::new("Upstream network error").with_details(Value::String(e.to_string()))
        })?;

        let status = response.status();
        let response_headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect::<HashMap<_, _>>();
        let body = response.text().await.map_err(|e| {
            UpstreamError::new("Upstream connection failed")
                .with_details(Value::String(e.to_string()))
        })?;

        if !status.is_success() {
            let details = if body.is_empty() {
                Value::Null
            } else {
                serde_json::from_str(&body).unwrap_or(Value::String(body))
            };
            return Err(UpstreamError::new("Upstream HTTP error")
                .with_status(status.as_u16())
                .with_details(details));
        }

        Ok(HttpResponse {
            status: status.as_u16(),
            data: parse_body(&body)?,
            headers: response_headers,
        })
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_body(body: &str) -> Result<Value, UpstreamError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|_| {
        UpstreamError::new("Upstream returned a non-JSON body")
            .with_details(Value::String(body.to_string()))
    })
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(
        &self,
        url: &str,
        headers: Headers<'_>,
        timeout: Duration,
    ) -> Result<HttpResponse, UpstreamError> {
        self.send(self.client.get(url), headers, timeout).await
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, String)],
        headers: Headers<'_>,
        timeout: Duration,
    ) -> Result<HttpResponse, UpstreamError> {
        self.send(self.client.post(url).form(form), headers, timeout)
            .await
    }

    async fn post_json(
        &self,
        url: &str,
        payload: &Value,
        headers: Headers<'_>,
        timeout: Duration,
    ) -> Result<HttpResponse, UpstreamError> {
        self.send(self.client.post(url).json(payload), headers, timeout)
            .await
    }
}

/// Append query parameters to `base`, percent-encoding values.
pub fn build_url(base: &str, params: &[(&str, String)]) -> Result<String, UpstreamError> {
    let mut url = url::Url::parse(base).map_err(|e| {
        UpstreamError::new(format!("Invalid provider URL '{}'", base))
            .with_details(Value::String(e.to_string()))
    })?;
    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            pairs.append_pair(key, value);
        }
    }
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_url_encodes_params() {
        let url = build_url(
            "https://api.example.com/v1/search",
            &[("query", "Eiffel Tower Paris".to_string()), ("page[limit]", "5".to_string())],
        )
        .unwrap();
        assert_eq!(
            url,
            "https://api.example.com/v1/search?query=Eiffel+Tower+Paris&page%5Blimit%5D=5"
        );
    }

    #[test]
    fn test_build_url_rejects_relative_base() {
        let err = build_url("not a url", &[]).unwrap_err();
        assert!(err.status.is_none());
        assert!(err.message.contains("Invalid provider URL"));
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body("").unwrap(), Value::Null);
        assert_eq!(parse_body("{\"a\":1}").unwrap(), json!({"a": 1}));

        let err = parse_body("<html>oops</html>").unwrap_err();
        assert_eq!(err.details, Some(json!("<html>oops</html>")));
        assert!(err.status.is_none());
    }

    #[test]
    fn test_auth_failure_statuses() {
        assert!(UpstreamError::new("x").with_status(401).is_auth_failure());
        assert!(UpstreamError::new("x").with_status(403).is_auth_failure());
        assert!(!UpstreamError::new("x").with_status(500).is_auth_failure());
        assert!(!UpstreamError::new("x").is_auth_failure());
    }
}
