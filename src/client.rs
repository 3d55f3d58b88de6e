//! HTTP transport for the Sky-Scrapper API

use crate::airports::airport_code;
use crate::config::{ApiEndpoint, GatewayConfig};
use crate::{FlightError, SearchRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, info, instrument};

const MAX_ERROR_BODY_CHARS: usize = 200;

/// Query string sent to every endpoint variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamQuery {
    pub params: Vec<(&'static str, String)>,
}

impl UpstreamQuery {
    /// Translate a validated request into upstream parameter names
    pub fn from_request(request: &SearchRequest, config: &GatewayConfig) -> Self {
        let origin = airport_code(&request.origin);
        let destination = airport_code(&request.destination);

        let mut params = vec![
            ("originSkyId", origin.clone()),
            ("destinationSkyId", destination.clone()),
            ("originEntityId", origin),
            ("destinationEntityId", destination),
        ];
        if let Some(date) = request.departure_date {
            params.push(("outboundDate", date.to_string()));
        }
        if let Some(date) = request.return_date {
            params.push(("inboundDate", date.to_string()));
        }
        params.extend([
            ("cabinClass", request.cabin_class.upstream_name().to_string()),
            ("adults", request.passengers.adults.to_string()),
            ("children", request.passengers.children.to_string()),
            ("infants", request.passengers.infants().to_string()),
            ("sortBy", "best".to_string()),
            ("currency", config.currency.clone()),
            ("market", config.market.clone()),
            ("locale", config.locale.clone()),
            ("countryCode", config.country_code.clone()),
        ]);

        Self { params }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.as_str())
    }
}

/// One upstream attempt against a single endpoint variant
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(
        &self,
        endpoint: &ApiEndpoint,
        query: &UpstreamQuery,
        api_key: &str,
    ) -> Result<Value, FlightError>;
}

/// reqwest-backed transport
pub struct FlightClient {
    http_client: Client,
    base_url: String,
    api_host: String,
}

impl FlightClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, FlightError> {
        debug!(base_url = %config.base_url, "Creating new flight client");
        let http_client = Client::builder()
            .user_agent(concat!("flight-gateway/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_host: config.api_host.clone(),
        })
    }
}

#[async_trait]
impl Transport for FlightClient {
    #[instrument(level = "info", skip(self, query, api_key), fields(endpoint = %endpoint.name))]
    async fn fetch(
        &self,
        endpoint: &ApiEndpoint,
        query: &UpstreamQuery,
        api_key: &str,
    ) -> Result<Value, FlightError> {
        let url = format!("{}{}", self.base_url, endpoint.path);
        info!(url = %url, "Making HTTP request to flight API");

        let start_time = std::time::Instant::now();
        let response = self
            .http_client
            .get(&url)
            .query(&query.params)
            .header("x-rapidapi-key", api_key)
            .header("x-rapidapi-host", &self.api_host)
            .send()
            .await?;
        let status = response.status();

        info!(
            status = %status,
            duration_ms = start_time.elapsed().as_millis(),
            "HTTP request completed"
        );

        if !status.is_success() {
            let body: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(MAX_ERROR_BODY_CHARS)
                .collect();
            error!(status = %status, "HTTP request failed");
            return Err(FlightError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        debug!(body_length = body.len(), "Received response body");
        Ok(serde_json::from_str(&body)?)
    }
}
