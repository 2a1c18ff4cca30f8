use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

use crate::config::{Integrations, LandingConfig};
use crate::db::CacheStore;
use crate::services::amadeus_service::AmadeusService;
use crate::services::cache_service::cache_get_or_set;
use crate::services::chat_service::ChatService;
use crate::services::destination_service::DestinationService;
use crate::services::groq_service::GroqService;
use crate::services::http_service::HttpClient;
use crate::services::pexels_service::PexelsService;
use crate::services::serpapi_service::SerpApiService;
use crate::services::wikipedia_service::WikipediaService;

/// Everything a landing handler needs, wired from one config, one outbound
/// client and one cache store.
pub struct AppState {
    pub config: LandingConfig,
    pub cache: Arc<dyn CacheStore>,
    pub amadeus: AmadeusService,
    pub pexels: PexelsService,
    pub serpapi: SerpApiService,
    pub wikipedia: WikipediaService,
    pub groq: GroqService,
    pub destinations: DestinationService,
    pub chat: ChatService,
}

impl AppState {
    pub fn new(config: LandingConfig, http: Arc<dyn HttpClient>, cache: Arc<dyn CacheStore>) -> Self {
        let amadeus = AmadeusService::new(&config, http.clone(), cache.clone());
        let pexels = PexelsService::new(&config, http.clone());
        let serpapi = SerpApiService::new(&config, http.clone());
        let wikipedia = WikipediaService::new(&config, http.clone());
        let groq = GroqService::new(&config, http, pexels.clone());
        let destinations = DestinationService::new(amadeus.clone(), pexels.clone());
        let chat = ChatService::new(
            groq.clone(),
            amadeus.clone(),
            serpapi.clone(),
            pexels.clone(),
            config.chat_default_origin.clone(),
        );

        Self {
            config,
            cache,
            amadeus,
            pexels,
            serpapi,
            wikipedia,
            groq,
            destinations,
            chat,
        }
    }

    pub fn integrations(&self) -> Integrations {
        self.config.integrations()
    }

    /// `cache_get_or_set` with this deployment's TTL and version tag.
    pub async fn cached<T, E, F, Fut>(&self, prefix: &str, payload: Value, compute: F) -> Result<(T, bool), E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        cache_get_or_set(
            self.cache.as_ref(),
            prefix,
            &payload,
            self.config.cache_ttl_seconds,
            &self.config.cache_version,
            compute,
        )
        .await
    }
}
