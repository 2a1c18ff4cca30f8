use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, middleware::NormalizePath, web, App, HttpServer};
use env_logger::Env;

use globetrotter_landing::config::LandingConfig;
use globetrotter_landing::db::{CacheStore, MemoryCacheStore, RedisCacheStore};
use globetrotter_landing::middleware::throttle::AnonThrottle;
use globetrotter_landing::routes;
use globetrotter_landing::services::http_service::ReqwestHttpClient;
use globetrotter_landing::state::AppState;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

async fn create_cache_store(config: &LandingConfig) -> Arc<dyn CacheStore> {
    if let Some(redis_url) = &config.redis_url {
        match RedisCacheStore::connect(redis_url).await {
            Ok(store) => return Arc::new(store),
            Err(e) => log::warn!("{}; falling back to in-memory cache", e),
        }
    }
    log::info!("Using in-memory cache");
    Arc::new(MemoryCacheStore::with_capacity(config.memory_cache_capacity))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);

    let config = LandingConfig::from_env();
    log::info!("Integrations configured: {:?}", config.integrations());

    let cache = create_cache_store(&config).await;
    let throttle = AnonThrottle::new(config.throttle_per_minute);
    let state = web::Data::new(AppState::new(
        config,
        Arc::new(ReqwestHttpClient::new()),
        cache,
    ));

    log::info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(NormalizePath::trim())
            .wrap(Logger::default())
            .app_data(state.clone())
            .route("/health", web::get().to(|| async { "OK" }))
            .service(
                web::scope("/api/v1")
                    .wrap(throttle.clone())
                    .configure(routes::landing::configure),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
