#![allow(dead_code)]

use actix_web::{web, App};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use globetrotter_landing::config::LandingConfig;
use globetrotter_landing::db::{CacheStore, MemoryCacheStore};
use globetrotter_landing::routes;
use globetrotter_landing::services::http_service::{Headers, HttpClient, HttpResponse, UpstreamError};
use globetrotter_landing::state::AppState;

pub const AMADEUS_BASE: &str = "https://amadeus.test/v1";
pub const TOKEN_URL: &str = "amadeus.test/v1/security/oauth2/token";
pub const LOCATIONS_URL: &str = "amadeus.test/v1/reference-data/locations";
pub const FLIGHTS_URL: &str = "amadeus.test/v2/shopping/flight-offers";
pub const PEXELS_URL: &str = "pexels.test/v1/search";
pub const SERPAPI_URL: &str = "serpapi.test/search";
pub const GROQ_URL: &str = "https://groq.test/openai/v1/chat/completions";
pub const WIKIPEDIA_URL: &str = "wiki.test/w/api.php";

#[derive(Clone)]
pub enum Reply {
    Json(Value),
    Status(u16, Value),
    Network,
}

struct Route {
    method: &'static str,
    fragment: String,
    replies: VecDeque<Reply>,
}

#[derive(Clone, Debug)]
pub struct Call {
    pub method: String,
    pub url: String,
    pub body: Option<Value>,
}

/// Scripted outbound client. Routes match on method and URL substring, first
/// registered wins. Queued replies are consumed in order; the last one repeats.
#[derive(Default)]
pub struct StubHttpClient {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<Call>>,
}

impl StubHttpClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on(&self, method: &'static str, fragment: &str, reply: Reply) -> &Self {
        let mut routes = self.routes.lock().unwrap();
        match routes
            .iter_mut()
            .find(|r| r.method == method && r.fragment == fragment)
        {
            Some(route) => route.replies.push_back(reply),
            None => routes.push(Route {
                method,
                fragment: fragment.to_string(),
                replies: VecDeque::from(vec![reply]),
            }),
        }
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, fragment: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.url.contains(fragment))
            .count()
    }

    fn respond(&self, method: &str, url: &str, body: Option<Value>) -> Result<HttpResponse, UpstreamError> {
        self.calls.lock().unwrap().push(Call {
            method: method.to_string(),
            url: url.to_string(),
            body,
        });

        let reply = {
            let mut routes = self.routes.lock().unwrap();
            routes
                .iter_mut()
                .find(|r| r.method == method && url.contains(&r.fragment))
                .and_then(|route| {
                    if route.replies.len() > 1 {
                        route.replies.pop_front()
                    } else {
                        route.replies.front().cloned()
                    }
                })
        };

        match reply {
            Some(Reply::Json(data)) => Ok(HttpResponse {
                status: 200,
                data,
                headers: HashMap::new(),
            }),
            Some(Reply::Status(status, details)) => Err(UpstreamError::new("Upstream HTTP error")
                .with_status(status)
                .with_details(details)),
            Some(Reply::Network) | None => Err(UpstreamError::new("Upstream network error")
                .with_details(json!(format!("no route to {}", url)))),
        }
    }
}

#[async_trait]
impl HttpClient for StubHttpClient {
    async fn get(&self, url: &str, _headers: Headers<'_>, _timeout: Duration) -> Result<HttpResponse, UpstreamError> {
        self.respond("GET", url, None)
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, String)],
        _headers: Headers<'_>,
        _timeout: Duration,
    ) -> Result<HttpResponse, UpstreamError> {
        let body = form
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
            .collect::<serde_json::Map<_, _>>();
        self.respond("POST", url, Some(Value::Object(body)))
    }

    async fn post_json(
        &self,
        url: &str,
        payload: &Value,
        _headers: Headers<'_>,
        _timeout: Duration,
    ) -> Result<HttpResponse, UpstreamError> {
        self.respond("POST", url, Some(payload.clone()))
    }
}

/// Every provider configured against stub hosts.
pub fn test_config() -> LandingConfig {
    LandingConfig {
        amadeus_base: AMADEUS_BASE.to_string(),
        amadeus_client_id: "client-id".to_string(),
        amadeus_client_secret: "client-secret".to_string(),
        pexels_base: "https://pexels.test/v1".to_string(),
        pexels_api_key: "pexels-key".to_string(),
        serpapi_base: "https://serpapi.test".to_string(),
        serpapi_key: "serp-key".to_string(),
        groq_url: GROQ_URL.to_string(),
        groq_api_key: "groq-key".to_string(),
        wikipedia_base: "https://wiki.test".to_string(),
        ..LandingConfig::default()
    }
}

pub fn app_state(config: LandingConfig, http: Arc<StubHttpClient>) -> web::Data<AppState> {
    let cache: Arc<dyn CacheStore> = Arc::new(MemoryCacheStore::new());
    web::Data::new(AppState::new(config, http, cache))
}

pub fn create_app(
    state: web::Data<AppState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .configure(routes::landing::configure)
}

pub fn token_reply() -> Reply {
    Reply::Json(json!({
        "type": "amadeusOAuth2Token",
        "access_token": "test-token",
        "expires_in": 1799
    }))
}

pub fn location(name: &str, iata: &str, country: &str) -> Value {
    json!({
        "type": "location",
        "subType": "CITY",
        "name": name,
        "iataCode": iata,
        "geoCode": {"latitude": 10.0, "longitude": 20.0},
        "address": {"countryCode": country}
    })
}

pub fn photo(url: &str) -> Reply {
    Reply::Json(json!({
        "photos": [{"photographer": "Stub", "src": {"landscape": url}}]
    }))
}

pub fn completion(content: &str) -> Reply {
    Reply::Json(json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    }))
}
