use serde::Serialize;
use std::env;
use std::time::Duration;

const AMADEUS_API_BASE: &str = "https://test.api.amadeus.com/v1";
const PEXELS_API_BASE: &str = "https://api.pexels.com/v1";
const SERPAPI_BASE: &str = "https://serpapi.com";
const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const GROQ_MODEL: &str = "llama-3.3-70b-versatile";
const WIKIPEDIA_API_BASE: &str = "https://en.wikipedia.org";

const OUTBOUND_TIMEOUT_SECONDS: f64 = 6.0;
const AI_TIMEOUT_SECONDS: f64 = 30.0;
const CACHE_TTL_SECONDS: u64 = 3600;
const CACHE_VERSION: &str = "v2";
const CHAT_DEFAULT_ORIGIN: &str = "DEL";
const THROTTLE_PER_MINUTE: u32 = 120;
const MEMORY_CACHE_CAPACITY: u64 = 10_000;

/// Provider endpoints, credentials and tuning for the landing service.
///
/// Built once at startup and handed to each adapter; nothing reads the
/// environment after that.
#[derive(Debug, Clone)]
pub struct LandingConfig {
    pub amadeus_base: String,
    pub amadeus_client_id: String,
    pub amadeus_client_secret: String,
    pub pexels_base: String,
    pub pexels_api_key: String,
    pub serpapi_base: String,
    pub serpapi_key: String,
    pub groq_url: String,
    pub groq_api_key: String,
    pub groq_model: String,
    pub wikipedia_base: String,
    pub outbound_timeout: Duration,
    pub ai_timeout: Duration,
    pub cache_ttl_seconds: u64,
    pub cache_version: String,
    pub redis_url: Option<String>,
    /// Entry cap for the in-process cache used without Redis.
    pub memory_cache_capacity: u64,
    pub chat_default_origin: String,
    pub throttle_per_minute: u32,
}

impl Default for LandingConfig {
    fn default() -> Self {
        Self {
            amadeus_base: AMADEUS_API_BASE.to_string(),
            amadeus_client_id: String::new(),
            amadeus_client_secret: String::new(),
            pexels_base: PEXELS_API_BASE.to_string(),
            pexels_api_key: String::new(),
            serpapi_base: SERPAPI_BASE.to_string(),
            serpapi_key: String::new(),
            groq_url: GROQ_API_URL.to_string(),
            groq_api_key: String::new(),
            groq_model: GROQ_MODEL.to_string(),
            wikipedia_base: WIKIPEDIA_API_BASE.to_string(),
            outbound_timeout: Duration::from_secs_f64(OUTBOUND_TIMEOUT_SECONDS),
            ai_timeout: Duration::from_secs_f64(AI_TIMEOUT_SECONDS),
            cache_ttl_seconds: CACHE_TTL_SECONDS,
            cache_version: CACHE_VERSION.to_string(),
            redis_url: None,
            memory_cache_capacity: MEMORY_CACHE_CAPACITY,
            chat_default_origin: CHAT_DEFAULT_ORIGIN.to_string(),
            throttle_per_minute: THROTTLE_PER_MINUTE,
        }
    }
}

impl LandingConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            amadeus_base: var_or("AMADEUS_API_BASE", defaults.amadeus_base),
            amadeus_client_id: var_or("AMADEUS_CLIENT_ID", defaults.amadeus_client_id),
            amadeus_client_secret: var_or("AMADEUS_CLIENT_SECRET", defaults.amadeus_client_secret),
            pexels_base: var_or("PEXELS_API_BASE", defaults.pexels_base),
            pexels_api_key: var_or("PEXELS_API_KEY", defaults.pexels_api_key),
            serpapi_base: var_or("SERPAPI_BASE", defaults.serpapi_base),
            serpapi_key: var_or("SERPAPI_KEY", defaults.serpapi_key),
            groq_url: var_or("GROQ_API_URL", defaults.groq_url),
            groq_api_key: var_or("GROQ_API_KEY", defaults.groq_api_key),
            groq_model: var_or("GROQ_MODEL", defaults.groq_model),
            wikipedia_base: var_or("WIKIPEDIA_API_BASE", defaults.wikipedia_base),
            outbound_timeout: seconds_or("OUTBOUND_HTTP_TIMEOUT_SECONDS", defaults.outbound_timeout),
            ai_timeout: seconds_or("AI_HTTP_TIMEOUT_SECONDS", defaults.ai_timeout),
            cache_ttl_seconds: env::var("LANDING_CACHE_TTL_SECONDS")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .filter(|ttl| *ttl > 0)
                .unwrap_or(defaults.cache_ttl_seconds),
            cache_version: var_or("LANDING_CACHE_VERSION", defaults.cache_version),
            redis_url: env::var("REDIS_URL").ok().filter(|v| !v.trim().is_empty()),
            memory_cache_capacity: env::var("LANDING_MEMORY_CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .filter(|capacity| *capacity > 0)
                .unwrap_or(defaults.memory_cache_capacity),
            chat_default_origin: var_or("CHAT_DEFAULT_ORIGIN", defaults.chat_default_origin)
                .to_uppercase(),
            throttle_per_minute: env::var("LANDING_THROTTLE_PER_MINUTE")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.throttle_per_minute),
        }
    }

    pub fn integrations(&self) -> Integrations {
        Integrations {
            amadeus: !self.amadeus_client_id.is_empty() && !self.amadeus_client_secret.is_empty(),
            pexels: !self.pexels_api_key.is_empty(),
            serpapi: !self.serpapi_key.is_empty(),
            groq: !self.groq_api_key.is_empty(),
            wikipedia: true,
        }
    }
}

/// Which providers have credentials. Safe to expose: carries no secrets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Integrations {
    pub amadeus: bool,
    pub pexels: bool,
    pub serpapi: bool,
    pub groq: bool,
    pub wikipedia: bool,
}

fn var_or(name: &str, default: String) -> String {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => default,
    }
}

fn seconds_or(name: &str, default: Duration) -> Duration {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs > 0.0)
        .map(Duration::from_secs_f64)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "AMADEUS_CLIENT_ID",
        "AMADEUS_CLIENT_SECRET",
        "PEXELS_API_KEY",
        "OUTBOUND_HTTP_TIMEOUT_SECONDS",
        "LANDING_CACHE_TTL_SECONDS",
        "CHAT_DEFAULT_ORIGIN",
        "LANDING_MEMORY_CACHE_CAPACITY",
    ];

    fn clear() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_environment() {
        clear();
        let config = LandingConfig::from_env();
        assert_eq!(config.amadeus_base, AMADEUS_API_BASE);
        assert_eq!(config.outbound_timeout, Duration::from_secs(6));
        assert_eq!(config.cache_ttl_seconds, 3600);
        assert_eq!(config.cache_version, "v2");
        assert_eq!(config.memory_cache_capacity, 10_000);

        let integrations = config.integrations();
        assert!(!integrations.amadeus);
        assert!(!integrations.pexels);
        assert!(integrations.wikipedia);
    }

    #[test]
    #[serial]
    fn test_reads_credentials_and_tuning() {
        clear();
        env::set_var("AMADEUS_CLIENT_ID", "id");
        env::set_var("AMADEUS_CLIENT_SECRET", "secret");
        env::set_var("OUTBOUND_HTTP_TIMEOUT_SECONDS", "2.5");
        env::set_var("LANDING_CACHE_TTL_SECONDS", "not-a-number");
        env::set_var("CHAT_DEFAULT_ORIGIN", "bom");
        env::set_var("LANDING_MEMORY_CACHE_CAPACITY", "500");

        let config = LandingConfig::from_env();
        assert!(config.integrations().amadeus);
        assert_eq!(config.outbound_timeout, Duration::from_millis(2500));
        assert_eq!(config.cache_ttl_seconds, 3600);
        assert_eq!(config.chat_default_origin, "BOM");
        assert_eq!(config.memory_cache_capacity, 500);
        clear();
    }

    #[test]
    #[serial]
    fn test_amadeus_needs_both_credentials() {
        clear();
        env::set_var("AMADEUS_CLIENT_ID", "id");
        assert!(!LandingConfig::from_env().integrations().amadeus);
        clear();
    }
}
