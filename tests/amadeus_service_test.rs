mod common;

use serde_json::{json, Value};
use std::sync::Arc;

use common::*;
use globetrotter_landing::config::LandingConfig;
use globetrotter_landing::db::{CacheStore, MemoryCacheStore};
use globetrotter_landing::services::amadeus_service::{AmadeusService, TOKEN_CACHE_KEY};

fn service(stub: &Arc<StubHttpClient>) -> (AmadeusService, Arc<MemoryCacheStore>) {
    service_with(test_config(), stub)
}

fn service_with(config: LandingConfig, stub: &Arc<StubHttpClient>) -> (AmadeusService, Arc<MemoryCacheStore>) {
    let cache = Arc::new(MemoryCacheStore::new());
    let amadeus = AmadeusService::new(&config, stub.clone(), cache.clone());
    (amadeus, cache)
}

#[actix_rt::test]
async fn test_token_is_cached_between_searches() {
    let stub = StubHttpClient::new();
    stub.on("POST", TOKEN_URL, token_reply())
        .on("GET", LOCATIONS_URL, Reply::Json(json!({"data": [location("Paris", "PAR", "FR")]})));
    let (amadeus, cache) = service(&stub);

    amadeus.search_cities("Paris", 5).await.unwrap();
    amadeus.search_cities("Lyon", 5).await.unwrap();

    assert_eq!(stub.calls_to(TOKEN_URL), 1);
    assert_eq!(stub.calls_to(LOCATIONS_URL), 2);
    assert_eq!(
        cache.get(TOKEN_CACHE_KEY).await.unwrap(),
        Some(Value::String("test-token".to_string()))
    );

    let token_call = stub.calls().into_iter().find(|c| c.url.contains(TOKEN_URL)).unwrap();
    let form = token_call.body.unwrap();
    assert_eq!(form["grant_type"], "client_credentials");
    assert_eq!(form["client_id"], "client-id");
}

#[actix_rt::test]
async fn test_rejected_token_refreshed_once() {
    let stub = StubHttpClient::new();
    stub.on("POST", TOKEN_URL, token_reply())
        .on("GET", LOCATIONS_URL, Reply::Status(401, json!({"errors": [{"code": 38192}]})))
        .on("GET", LOCATIONS_URL, Reply::Json(json!({"data": [location("Paris", "PAR", "FR")]})));
    let (amadeus, _cache) = service(&stub);

    let places = amadeus.search_cities("Paris", 5).await.unwrap();

    assert_eq!(places.len(), 1);
    assert_eq!(places[0].provider_place_id, "PAR");
    assert_eq!(stub.calls_to(TOKEN_URL), 2);
    assert_eq!(stub.calls_to(LOCATIONS_URL), 2);
}

#[actix_rt::test]
async fn test_second_rejection_is_returned() {
    let stub = StubHttpClient::new();
    stub.on("POST", TOKEN_URL, token_reply())
        .on("GET", LOCATIONS_URL, Reply::Status(403, json!({})));
    let (amadeus, _cache) = service(&stub);

    let err = amadeus.search_cities("Paris", 5).await.unwrap_err();

    assert_eq!(err.status, Some(403));
    assert_eq!(stub.calls_to(TOKEN_URL), 2);
    assert_eq!(stub.calls_to(LOCATIONS_URL), 2);
}

#[actix_rt::test]
async fn test_server_error_not_retried() {
    let stub = StubHttpClient::new();
    stub.on("POST", TOKEN_URL, token_reply())
        .on("GET", LOCATIONS_URL, Reply::Status(500, json!({})));
    let (amadeus, _cache) = service(&stub);

    let err = amadeus.search_cities("Paris", 5).await.unwrap_err();

    assert_eq!(err.status, Some(500));
    assert_eq!(stub.calls_to(TOKEN_URL), 1);
    assert_eq!(stub.calls_to(LOCATIONS_URL), 1);
}

#[actix_rt::test]
async fn test_oauth_failures() {
    let stub = StubHttpClient::new();
    stub.on("POST", TOKEN_URL, Reply::Status(401, json!({"error": "invalid_client"})));
    let (amadeus, _cache) = service(&stub);
    let err = amadeus.get_access_token(false).await.unwrap_err();
    assert_eq!(err.status, Some(401));
    assert!(err.message.contains("OAuth failed"));
    assert_eq!(err.details, Some(json!({"error": "invalid_client"})));

    let stub = StubHttpClient::new();
    stub.on("POST", TOKEN_URL, Reply::Network);
    let (amadeus, _cache) = service(&stub);
    let err = amadeus.get_access_token(false).await.unwrap_err();
    assert_eq!(err.status, Some(503));

    let stub = StubHttpClient::new();
    stub.on("POST", TOKEN_URL, Reply::Json(json!({"state": "approved"})));
    let (amadeus, cache) = service(&stub);
    let err = amadeus.get_access_token(false).await.unwrap_err();
    assert_eq!(err.status, Some(502));
    assert!(cache.is_empty().await);
}

#[actix_rt::test]
async fn test_unconfigured_makes_no_calls() {
    let stub = StubHttpClient::new();
    let config = LandingConfig {
        amadeus_client_secret: String::new(),
        ..test_config()
    };
    let (amadeus, _cache) = service_with(config, &stub);

    assert!(!amadeus.is_configured());
    let err = amadeus.search_cities("Paris", 5).await.unwrap_err();
    assert_eq!(err.status, Some(503));
    assert!(stub.calls().is_empty());
}

#[actix_rt::test]
async fn test_locations_without_id_and_name_dropped() {
    let stub = StubHttpClient::new();
    stub.on("POST", TOKEN_URL, token_reply()).on(
        "GET",
        LOCATIONS_URL,
        Reply::Json(json!({"data": [
            {"subType": "CITY", "address": {"countryCode": "FR"}},
            {"subType": "AIRPORT", "iataCode": "CDG"},
            location("Nice", "NCE", "FR")
        ]})),
    );
    let (amadeus, _cache) = service(&stub);

    let places = amadeus.search_cities("fr", 10).await.unwrap();
    let names: Vec<&str> = places.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["CDG", "Nice"]);

    let calls = stub.calls();
    let url = &calls.last().unwrap().url;
    assert!(url.contains("subType=CITY%2CAIRPORT"));
    assert!(url.contains("keyword=fr"));
}
