//! Fallback adapter: public Nominatim.
//!
//! Always available but lower precision and rate-limited, so it runs last
//! and only when the authoritative sources are exhausted. Results are
//! restricted to the municipality's viewbox; TLS is verified normally and a
//! distinguishing `User-Agent` is always sent, per the public usage policy.

use std::time::{Duration, Instant};

use reqwest::{Client, Url};
use serde::Deserialize;

use crate::config::ResolverConfig;
use crate::error::GeocodeError;
use crate::providers::step_timeout;
use crate::types::{
    valid_postal_code, AddressComponents, GeocodeResult, ProviderStatus, ResolvedSource,
};

/// The service reports no comparable confidence, so any accepted result
/// carries this fixed score.
const FALLBACK_SCORE: u8 = 80;

pub struct NominatimClient {
    client: Client,
    base_url: Url,
    viewbox: String,
    country_codes: String,
    municipality: String,
    state: String,
    country: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Option<OsmAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct OsmAddress {
    #[serde(default)]
    road: Option<String>,
    #[serde(default)]
    house_number: Option<String>,
    #[serde(default)]
    neighbourhood: Option<String>,
    #[serde(default)]
    suburb: Option<String>,
    #[serde(default)]
    postcode: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    town: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReverseResult {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Option<OsmAddress>,
}

impl NominatimClient {
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GeocodeError::ApiError`] if the base URL
    /// is not parseable.
    pub fn new(config: &ResolverConfig) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .build()?;

        let normalised = format!("{}/", config.fallback_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| {
            GeocodeError::ApiError(format!(
                "invalid fallback provider URL '{}': {e}",
                config.fallback_url
            ))
        })?;

        Ok(Self {
            client,
            base_url,
            viewbox: config.search_extent.viewbox(),
            country_codes: config.country_codes.clone(),
            municipality: config.municipality.clone(),
            state: config.state.clone(),
            country: config.country.clone(),
            timeout: config.fallback_timeout,
        })
    }

    /// Forward geocoding: tries the full-context variant first, then the
    /// country-only variant, stopping at the first success. Failures are
    /// absorbed; `None` means every variant came up empty or errored.
    pub async fn geocode(&self, address: &str, deadline: Instant) -> Option<GeocodeResult> {
        let variants = [
            format!(
                "{address}, {}, {}, {}",
                self.municipality, self.state, self.country
            ),
            format!("{address}, {}", self.country),
        ];

        for query in &variants {
            let Some(timeout) = step_timeout(self.timeout, deadline) else {
                tracing::debug!(query, "latency budget exhausted before fallback attempt");
                return None;
            };
            match self.search(query, timeout).await {
                Ok(Some(result)) => {
                    tracing::info!(query, "fallback geocoder hit");
                    return Some(result);
                }
                Ok(None) => {
                    tracing::debug!(query, "fallback geocoder returned no results");
                }
                Err(err) => {
                    tracing::warn!(query, error = %err, "fallback geocoder attempt failed");
                }
            }
        }
        None
    }

    /// Reverse geocoding with every failure absorbed to `None`.
    pub async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
        timeout: Duration,
    ) -> Option<GeocodeResult> {
        match self.reverse(latitude, longitude, timeout).await {
            Ok(Some(result)) => {
                tracing::info!(latitude, longitude, "fallback reverse geocode hit");
                Some(result)
            }
            Ok(None) => {
                tracing::debug!(latitude, longitude, "fallback reverse geocode empty");
                None
            }
            Err(err) => {
                tracing::warn!(
                    latitude,
                    longitude,
                    error = %err,
                    "fallback reverse geocode failed"
                );
                None
            }
        }
    }

    /// Availability probe against the service's status endpoint.
    pub async fn probe(&self, timeout: Duration) -> ProviderStatus {
        let Ok(url) = self.base_url.join("status") else {
            return ProviderStatus {
                available: false,
                response_time_ms: None,
            };
        };

        let started = Instant::now();
        match self.client.get(url).timeout(timeout).send().await {
            Ok(response) => ProviderStatus {
                available: response.status().is_success(),
                response_time_ms: Some(elapsed_ms(started)),
            },
            Err(err) => {
                tracing::debug!(error = %err, "fallback geocoder probe failed");
                ProviderStatus {
                    available: false,
                    response_time_ms: None,
                }
            }
        }
    }

    async fn search(
        &self,
        query: &str,
        timeout: Duration,
    ) -> Result<Option<GeocodeResult>, GeocodeError> {
        let mut url = self.endpoint("search")?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("format", "json")
            .append_pair("limit", "3")
            .append_pair("addressdetails", "1")
            .append_pair("countrycodes", &self.country_codes)
            .append_pair("viewbox", &self.viewbox)
            .append_pair("bounded", "1");

        let body = self.request(url, timeout).await?;
        let results: Vec<SearchResult> =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
                context: format!("search results for \"{query}\""),
                source: e,
            })?;

        let Some(best) = results.into_iter().next() else {
            return Ok(None);
        };

        let (Ok(latitude), Ok(longitude)) = (best.lat.parse::<f64>(), best.lon.parse::<f64>())
        else {
            return Err(GeocodeError::ApiError(format!(
                "non-numeric coordinates in fallback response for \"{query}\""
            )));
        };

        let components = self.components_from_breakdown(best.address.unwrap_or_default());
        let address = best
            .display_name
            .unwrap_or_else(|| query.to_string());

        Ok(Some(GeocodeResult {
            address,
            latitude,
            longitude,
            score: FALLBACK_SCORE,
            source: ResolvedSource::FallbackProvider,
            components,
        }))
    }

    async fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
        timeout: Duration,
    ) -> Result<Option<GeocodeResult>, GeocodeError> {
        let mut url = self.endpoint("reverse")?;
        url.query_pairs_mut()
            .append_pair("lat", &latitude.to_string())
            .append_pair("lon", &longitude.to_string())
            .append_pair("format", "json")
            .append_pair("addressdetails", "1")
            .append_pair("zoom", "18")
            .append_pair("accept-language", "es");

        let body = self.request(url, timeout).await?;
        let result: ReverseResult =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
                context: format!("reverse geocode for {latitude},{longitude}"),
                source: e,
            })?;

        let Some(display_name) = result.display_name else {
            return Ok(None);
        };

        let components = self.components_from_breakdown(result.address.unwrap_or_default());

        Ok(Some(GeocodeResult {
            address: display_name,
            latitude,
            longitude,
            score: FALLBACK_SCORE,
            source: ResolvedSource::FallbackProvider,
            components,
        }))
    }

    fn components_from_breakdown(&self, address: OsmAddress) -> AddressComponents {
        AddressComponents {
            calle: address.road,
            numero: address.house_number,
            colonia: address.neighbourhood.or(address.suburb),
            codigo_postal: address
                .postcode
                .and_then(|postcode| valid_postal_code(&postcode)),
            ciudad: address
                .city
                .or(address.town)
                .or_else(|| Some(self.municipality.clone())),
            estado: address.state.or_else(|| Some(self.state.clone())),
        }
    }

    fn endpoint(&self, name: &str) -> Result<Url, GeocodeError> {
        self.base_url
            .join(name)
            .map_err(|e| GeocodeError::ApiError(format!("invalid endpoint '{name}': {e}")))
    }

    async fn request(&self, url: Url, timeout: Duration) -> Result<String, GeocodeError> {
        let response = self.client.get(url.clone()).timeout(timeout).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
