//! Search orchestration: validate, throttle, cache, query upstream, normalize

use crate::cache::{cache_key, ResponseCache};
use crate::client::{FlightClient, Transport, UpstreamQuery};
use crate::clock::{Clock, SystemClock};
use crate::config::{ApiEndpoint, GatewayConfig};
use crate::parser::parse_payload;
use crate::placeholder::placeholder_flights;
use crate::rate_limit::RateLimiter;
use crate::validation::validate_request;
use crate::{
    FlightError, FlightResult, RateLimitSnapshot, SearchRequest, SearchResponse, SearchResults,
    TripType,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// Entry point for the UI layer. Owns the cache and rate-limit state, so
/// each instance is independent.
pub struct FlightSearchGateway {
    config: GatewayConfig,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    rate_limiter: RateLimiter,
    cache: ResponseCache,
}

impl FlightSearchGateway {
    /// Gateway over the real HTTP transport and system clock
    pub fn new(config: GatewayConfig) -> Result<Self, FlightError> {
        let transport = Arc::new(FlightClient::new(&config)?);
        Ok(Self::with_parts(config, transport, Arc::new(SystemClock)))
    }

    pub fn from_env() -> Result<Self, FlightError> {
        Self::new(GatewayConfig::from_env()?)
    }

    pub fn with_parts(
        config: GatewayConfig,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rate_limiter: RateLimiter::new(config.rate_limit),
            cache: ResponseCache::new(),
            config,
            transport,
            clock,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Run a search. Every failure comes back as `success: false`.
    #[instrument(
        level = "info",
        skip(self, request),
        fields(origin = %request.origin, destination = %request.destination)
    )]
    pub async fn search(&self, request: &SearchRequest) -> SearchResponse {
        match self.try_search(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "Flight search rejected");
                SearchResponse::from_error(&err)
            }
        }
    }

    async fn try_search(&self, request: &SearchRequest) -> Result<SearchResponse, FlightError> {
        validate_request(request, self.clock.today())?;

        let now = self.clock.now_millis();
        self.rate_limiter.check(now)?;

        let key = cache_key(request);
        if let Some(cached) = self.cache.get(&key, now) {
            info!("Returning cached flight results");
            return Ok(cached);
        }

        let api_key = self.config.api_key().ok_or(FlightError::NotConfigured)?;

        let admitted = self.rate_limiter.try_acquire(now)?;
        debug!(remaining = admitted.remaining, "Upstream attempt admitted");

        let query = UpstreamQuery::from_request(request, &self.config);
        let (flights, placeholder) = match self.query_endpoints(&query, api_key).await {
            Some(flights) => (flights, false),
            None if self.config.placeholder_fallback => {
                warn!("All endpoints failed, substituting placeholder results");
                (placeholder_flights(request), true)
            }
            None => return Err(FlightError::UpstreamUnavailable),
        };

        let finished = self.clock.now_millis();
        let data = SearchResults {
            total_results: flights.len(),
            outbound: flights,
            inbound: (request.trip_type == TripType::RoundTrip).then(Vec::new),
            search_id: finished.to_string(),
            currency: self.config.currency.clone(),
            placeholder,
        };
        let response = SearchResponse::ok(data, self.rate_limiter.status(finished));

        self.cache
            .insert(key, response.clone(), finished, self.config.cache.ttl);
        info!(
            flights_found = response.flights().len(),
            placeholder, "Flight search completed"
        );

        Ok(response)
    }

    /// Walk the endpoints in order; the first recognizable payload wins
    async fn query_endpoints(
        &self,
        query: &UpstreamQuery,
        api_key: &str,
    ) -> Option<Vec<FlightResult>> {
        for endpoint in &self.config.endpoints {
            match self.attempt(endpoint, query, api_key).await {
                Ok(flights) => {
                    info!(
                        endpoint = %endpoint.name,
                        flights_found = flights.len(),
                        "Endpoint answered"
                    );
                    return Some(flights);
                }
                Err(err) => {
                    warn!(endpoint = %endpoint.name, error = %err, "Endpoint failed, trying next");
                }
            }
        }

        error!(attempts = self.config.endpoints.len(), "All endpoints failed");
        None
    }

    async fn attempt(
        &self,
        endpoint: &ApiEndpoint,
        query: &UpstreamQuery,
        api_key: &str,
    ) -> Result<Vec<FlightResult>, FlightError> {
        let payload = self.transport.fetch(endpoint, query, api_key).await?;
        parse_payload(&payload).ok_or_else(|| FlightError::UnrecognizedResponse {
            endpoint: endpoint.name.clone(),
        })
    }

    /// Remaining upstream attempts in the current window
    pub fn rate_limit_status(&self) -> RateLimitSnapshot {
        self.rate_limiter.status(self.clock.now_millis())
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("Flight search cache cleared");
    }

    pub fn purge_expired_cache(&self) -> usize {
        self.cache.purge_expired(self.clock.now_millis())
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    /// Periodically purge expired cache entries until the gateway is dropped
    pub fn spawn_cache_sweeper(gateway: &Arc<Self>) -> JoinHandle<()> {
        let period = gateway
            .config
            .cache
            .sweep_interval
            .max(Duration::from_millis(1));
        let gateway = Arc::downgrade(gateway);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // the first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(gateway) = gateway.upgrade() else {
                    debug!("Gateway dropped, stopping cache sweeper");
                    break;
                };
                let purged = gateway.purge_expired_cache();
                if purged > 0 {
                    debug!(purged, "Swept expired cache entries");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::{json, Value};

    struct FixedTransport(Value);

    #[async_trait]
    impl Transport for FixedTransport {
        async fn fetch(
            &self,
            _endpoint: &ApiEndpoint,
            _query: &UpstreamQuery,
            _api_key: &str,
        ) -> Result<Value, FlightError> {
            Ok(self.0.clone())
        }
    }

    fn gateway(config: GatewayConfig, payload: Value) -> FlightSearchGateway {
        let clock = ManualClock::at_date(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap());
        FlightSearchGateway::with_parts(config, Arc::new(FixedTransport(payload)), Arc::new(clock))
    }

    fn request() -> SearchRequest {
        SearchRequest::one_way("Delhi", "Mumbai", NaiveDate::from_ymd_opt(2030, 1, 5).unwrap())
    }

    #[test]
    fn test_missing_api_key_is_reported() {
        let gateway = gateway(GatewayConfig::default(), json!([]));
        let response = tokio_test::block_on(gateway.search(&request()));

        assert!(!response.success);
        assert_eq!(
            response.error.as_deref(),
            Some("API key not configured. Please set RAPIDAPI_KEY in your environment.")
        );
        assert_eq!(gateway.rate_limit_status().remaining, 10);
        assert_eq!(gateway.cached_entries(), 0);
    }

    #[tokio::test]
    async fn test_round_trip_has_inbound_list() {
        let payload = json!({ "data": { "itineraries": [
            { "legs": [
                { "id": "out", "segments": [{ "flightNumber": "AI 1" }] },
                { "id": "back", "segments": [{ "flightNumber": "AI 2" }] }
            ] }
        ] } });
        let gateway = gateway(GatewayConfig::default().with_api_key("k"), payload);
        let request = SearchRequest::round_trip(
            "Delhi",
            "Mumbai",
            NaiveDate::from_ymd_opt(2030, 1, 5).unwrap(),
            NaiveDate::from_ymd_opt(2030, 1, 9).unwrap(),
        );

        let response = gateway.search(&request).await;
        let data = response.data.as_ref().unwrap();
        assert!(response.success);
        assert_eq!(data.outbound.len(), 2);
        assert_eq!(data.total_results, 2);
        assert_eq!(data.inbound, Some(vec![]));
        assert!(!data.placeholder);
        assert_eq!(response.rate_limit.unwrap().remaining, 9);
    }

    #[tokio::test]
    async fn test_placeholder_fallback_can_be_disabled() {
        let mut config = GatewayConfig::default().with_api_key("k");
        config.placeholder_fallback = false;
        let gateway = gateway(config, json!({ "message": "You are not subscribed to this API." }));

        let response = gateway.search(&request()).await;
        assert!(!response.success);
        assert_eq!(
            response.error.as_deref(),
            Some("Flight search is temporarily unavailable. Please try again later.")
        );
        assert_eq!(gateway.cached_entries(), 0);
    }

    #[tokio::test]
    async fn test_sweeper_stops_when_gateway_dropped() {
        let mut config = GatewayConfig::default();
        config.cache.sweep_interval = Duration::from_millis(5);
        let gateway = Arc::new(gateway(config, json!([])));

        let handle = FlightSearchGateway::spawn_cache_sweeper(&gateway);
        drop(gateway);

        let finished = tokio::time::timeout(Duration::from_secs(2), handle).await;
        assert!(finished.is_ok());
    }
}
