use actix_web::web;

use crate::error::ApiError;
use crate::routes::health;

pub mod attractions;
pub mod chat;
pub mod destinations;
pub mod trip;

/// Mount every landing endpoint under `/landing`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/landing")
            .app_data(query_config())
            .app_data(json_config())
            .route("/health", web::get().to(health::health))
            .route("/config", web::get().to(health::integrations))
            .route("/home", web::get().to(destinations::home))
            .route("/banner", web::get().to(destinations::banner))
            .route("/trending", web::get().to(destinations::trending))
            .route("/destinations", web::get().to(destinations::search))
            .route("/attractions", web::get().to(attractions::get_attractions))
            .route("/trip/flights", web::get().to(trip::search_flights))
            .route("/trip/hotels", web::get().to(trip::search_hotels))
            .route("/trip/enhance", web::post().to(trip::enhance))
            .route("/chat", web::post().to(chat::chat)),
    );
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        ApiError::validation("validation_error", format!("Invalid query string: {}", err)).into()
    })
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::validation("validation_error", format!("Invalid JSON body: {}", err)).into()
    })
}

/// Trimmed, non-empty request parameter.
pub(crate) fn param(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Parse a numeric limit, falling back to `default` on junk, then clamp.
pub(crate) fn clamp_limit(raw: &Option<String>, default: usize, min: usize, max: usize) -> usize {
    param(raw)
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
        .clamp(min, max)
}
