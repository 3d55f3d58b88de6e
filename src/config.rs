//! Gateway configuration
//!
//! Defaults mirror the public Sky-Scrapper API on RapidAPI. [`GatewayConfig::from_env`]
//! layers environment overrides on top of them.

use crate::FlightError;
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://sky-scrapper.p.rapidapi.com";
pub const DEFAULT_API_HOST: &str = "sky-scrapper.p.rapidapi.com";

/// One upstream search endpoint variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoint {
    pub name: String,
    pub path: String,
}

impl ApiEndpoint {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
        }
    }

    /// Primary endpoint followed by the two alternates, in priority order
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("primary", "/api/v1/flights/searchFlights"),
            Self::new("v2", "/api/v2/flights/searchFlights"),
            Self::new("legacy-search", "/api/v1/flights/search"),
        ]
    }
}

/// Fixed-window request cap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(60),
            max_requests: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub ttl: Duration,
    pub sweep_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(5 * 60),
            sweep_interval: Duration::from_secs(10 * 60),
        }
    }
}

#[derive(Clone)]
pub struct GatewayConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub api_host: String,
    pub endpoints: Vec<ApiEndpoint>,
    pub request_timeout: Duration,
    pub rate_limit: RateLimitConfig,
    pub cache: CacheConfig,
    /// Substitute synthetic results when every endpoint fails
    pub placeholder_fallback: bool,
    pub currency: String,
    pub market: String,
    pub locale: String,
    pub country_code: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_host: DEFAULT_API_HOST.to_string(),
            endpoints: ApiEndpoint::defaults(),
            request_timeout: Duration::from_secs(15),
            rate_limit: RateLimitConfig::default(),
            cache: CacheConfig::default(),
            placeholder_fallback: true,
            currency: "USD".to_string(),
            market: "US".to_string(),
            locale: "en-US".to_string(),
            country_code: "US".to_string(),
        }
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("api_host", &self.api_host)
            .field("endpoints", &self.endpoints)
            .field("request_timeout", &self.request_timeout)
            .field("rate_limit", &self.rate_limit)
            .field("cache", &self.cache)
            .field("placeholder_fallback", &self.placeholder_fallback)
            .field("currency", &self.currency)
            .finish()
    }
}

impl GatewayConfig {
    /// Defaults plus `RAPIDAPI_KEY` (or `VITE_RAPIDAPI_KEY`), `FLIGHT_GATEWAY_BASE_URL`
    /// and `FLIGHT_GATEWAY_PLACEHOLDER_FALLBACK`
    pub fn from_env() -> Result<Self, FlightError> {
        let mut config = Self::default();

        config.api_key = env::var("RAPIDAPI_KEY")
            .or_else(|_| env::var("VITE_RAPIDAPI_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty());

        if let Ok(base_url) = env::var("FLIGHT_GATEWAY_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }

        if let Ok(flag) = env::var("FLIGHT_GATEWAY_PLACEHOLDER_FALLBACK") {
            config.placeholder_fallback = parse_flag(&flag).ok_or_else(|| {
                FlightError::ConfigError(format!(
                    "FLIGHT_GATEWAY_PLACEHOLDER_FALLBACK must be true or false, got {}",
                    flag
                ))
            })?;
        }

        Ok(config)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// API key if one is configured and non-blank
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
