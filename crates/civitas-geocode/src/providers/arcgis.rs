//! Primary adapter: the municipal ArcGIS locator.
//!
//! Wraps single request/response cycles against the `findAddressCandidates`
//! and `reverseGeocode` endpoints. The server is authoritative for the
//! municipality but self-hosted and sometimes slow, so every call carries a
//! short per-request timeout and failures fall through to the next source.

use std::time::{Duration, Instant};

use reqwest::{Client, Url};
use serde::Deserialize;

use crate::config::ResolverConfig;
use crate::error::GeocodeError;
use crate::parse;
use crate::types::{
    valid_postal_code, AddressComponents, GeocodeResult, ProviderStatus, ResolvedSource,
};

/// Candidates at or below this score are discarded as too uncertain to show
/// a citizen. Applies to forward geocoding only.
const MIN_CANDIDATE_SCORE: f64 = 40.0;

/// Reverse lookups are accepted whenever the server returns an address; it
/// reports no score for them, so a fixed one is assigned.
const REVERSE_SCORE: u8 = 100;

const OUT_FIELDS: &str = "AddNum,StName,StType,StPreDir,StDir,Nbrhd,District,Postal,City,PlaceName";

pub struct ArcGisLocator {
    client: Client,
    base_url: Url,
    search_extent: String,
    municipality: String,
    state: String,
}

#[derive(Debug, Deserialize)]
struct CandidatesResponse {
    #[serde(default)]
    error: Option<ProviderErrorBody>,
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    location: Option<CandidateLocation>,
    /// Kept untyped: the server sends `AddNum` and `Postal` as either
    /// numbers or strings depending on the underlying locator layer.
    #[serde(default)]
    attributes: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct CandidateLocation {
    x: f64,
    y: f64,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    error: Option<ProviderErrorBody>,
    #[serde(default)]
    address: Option<serde_json::Value>,
}

impl ArcGisLocator {
    /// Creates a locator from the resolver configuration.
    ///
    /// TLS verification is disabled only when the config says so — the
    /// municipal server runs with a self-signed certificate.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GeocodeError::ApiError`] if the base URL
    /// is not parseable.
    pub fn new(config: &ResolverConfig) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        // Ensure the base ends with exactly one slash so join() appends the
        // endpoint instead of replacing the last path segment.
        let normalised = format!("{}/", config.primary_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| {
            GeocodeError::ApiError(format!(
                "invalid primary provider URL '{}': {e}",
                config.primary_url
            ))
        })?;

        Ok(Self {
            client,
            base_url,
            search_extent: config.search_extent.search_extent(),
            municipality: config.municipality.clone(),
            state: config.state.clone(),
        })
    }

    /// Forward geocoding with every failure absorbed to `None`.
    ///
    /// The caller treats `None` uniformly as "try the next source"; the
    /// underlying cause is logged here for diagnostics.
    pub async fn try_geocode(&self, address: &str, timeout: Duration) -> Option<GeocodeResult> {
        match self.find_candidates(address, timeout).await {
            Ok(Some(result)) => {
                tracing::info!(address, score = result.score, "primary geocoder hit");
                Some(result)
            }
            Ok(None) => {
                tracing::debug!(address, "primary geocoder returned no usable candidate");
                None
            }
            Err(err) => {
                tracing::warn!(address, error = %err, "primary geocoder failed; falling through");
                None
            }
        }
    }

    /// Reverse geocoding with every failure absorbed to `None`.
    pub async fn try_reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
        timeout: Duration,
    ) -> Option<GeocodeResult> {
        match self.reverse(latitude, longitude, timeout).await {
            Ok(Some(result)) => {
                tracing::info!(latitude, longitude, "primary reverse geocode hit");
                Some(result)
            }
            Ok(None) => {
                tracing::debug!(latitude, longitude, "primary reverse geocode empty");
                None
            }
            Err(err) => {
                tracing::warn!(
                    latitude,
                    longitude,
                    error = %err,
                    "primary reverse geocode failed; falling through"
                );
                None
            }
        }
    }

    /// Availability probe: one cheap metadata request.
    pub async fn probe(&self, timeout: Duration) -> ProviderStatus {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("f", "json");

        let started = Instant::now();
        match self.client.get(url).timeout(timeout).send().await {
            Ok(response) => ProviderStatus {
                available: response.status().is_success(),
                response_time_ms: Some(elapsed_ms(started)),
            },
            Err(err) => {
                tracing::debug!(error = %err, "primary geocoder probe failed");
                ProviderStatus {
                    available: false,
                    response_time_ms: None,
                }
            }
        }
    }

    async fn find_candidates(
        &self,
        address: &str,
        timeout: Duration,
    ) -> Result<Option<GeocodeResult>, GeocodeError> {
        let clean: String = address.split_whitespace().collect::<Vec<_>>().join(" ");

        let mut url = self.endpoint("findAddressCandidates")?;
        url.query_pairs_mut()
            .append_pair("SingleLine", &clean)
            .append_pair("f", "json")
            .append_pair("outFields", OUT_FIELDS)
            .append_pair("maxLocations", "3")
            .append_pair("outSR", "4326")
            .append_pair("searchExtent", &self.search_extent);

        tracing::debug!(address = %clean, ?timeout, "querying primary geocoder");

        let body = self.request(url, timeout).await?;
        let parsed: CandidatesResponse =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
                context: format!("address candidates for \"{clean}\""),
                source: e,
            })?;

        if let Some(error) = parsed.error {
            return Err(api_error(&error));
        }

        let Some(best) = parsed
            .candidates
            .into_iter()
            .filter(|candidate| candidate.location.is_some())
            .max_by(|a, b| a.score.total_cmp(&b.score))
        else {
            return Ok(None);
        };
        if best.score <= MIN_CANDIDATE_SCORE {
            tracing::debug!(score = best.score, "best candidate below score threshold");
            return Ok(None);
        }
        let Some(location) = best.location.as_ref() else {
            return Ok(None);
        };

        let free_text = best.address.clone().unwrap_or_default();
        let mut components = self.components_from_attributes(&best.attributes);
        if needs_text_fallback(&components) && !free_text.is_empty() {
            parse::fill_components_from_text(&free_text, &self.municipality, &mut components);
        }

        let address_line = if free_text.is_empty() {
            format!("{clean}, {}", self.municipality)
        } else {
            free_text
        };

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let score = best.score.round().clamp(0.0, 100.0) as u8;

        Ok(Some(GeocodeResult {
            address: address_line,
            latitude: location.y,
            longitude: location.x,
            score,
            source: ResolvedSource::PrimaryProvider,
            components,
        }))
    }

    async fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
        timeout: Duration,
    ) -> Result<Option<GeocodeResult>, GeocodeError> {
        let mut url = self.endpoint("reverseGeocode")?;
        url.query_pairs_mut()
            // The server expects lng,lat order.
            .append_pair("location", &format!("{longitude},{latitude}"))
            .append_pair("f", "json")
            .append_pair("outSR", "4326")
            .append_pair("returnIntersection", "false");

        let body = self.request(url, timeout).await?;
        let parsed: ReverseResponse =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
                context: format!("reverse geocode for {latitude},{longitude}"),
                source: e,
            })?;

        if let Some(error) = parsed.error {
            return Err(api_error(&error));
        }
        let Some(address) = parsed.address else {
            return Ok(None);
        };

        let numero = attr_string(&address, "AddNum");
        let st_name = attr_string(&address, "StName");
        let st_type = attr_string(&address, "StType");

        let street_parts: Vec<String> = [numero.clone(), st_name.clone(), st_type.clone()]
            .into_iter()
            .flatten()
            .collect();
        let street_line = if street_parts.is_empty() {
            "Dirección no disponible".to_string()
        } else {
            street_parts.join(" ")
        };

        let ciudad =
            attr_string(&address, "City").unwrap_or_else(|| self.municipality.clone());
        let estado = attr_string(&address, "Region").unwrap_or_else(|| self.state.clone());
        let full_address = format!("{street_line}, {ciudad}, {estado}");

        let calle_parts: Vec<String> = [st_name, st_type].into_iter().flatten().collect();
        let components = AddressComponents {
            calle: (!calle_parts.is_empty()).then(|| calle_parts.join(" ")),
            numero,
            colonia: attr_string(&address, "Nbrhd"),
            codigo_postal: attr_string(&address, "Postal")
                .and_then(|postal| valid_postal_code(&postal)),
            ciudad: Some(ciudad),
            estado: Some(estado),
        };

        Ok(Some(GeocodeResult {
            address: full_address,
            latitude,
            longitude,
            score: REVERSE_SCORE,
            source: ResolvedSource::PrimaryProvider,
            components,
        }))
    }

    fn components_from_attributes(&self, attributes: &serde_json::Value) -> AddressComponents {
        let mut components = AddressComponents {
            ciudad: Some(self.municipality.clone()),
            estado: Some(self.state.clone()),
            ..AddressComponents::default()
        };

        components.numero = attr_string(attributes, "AddNum");

        let street_parts: Vec<String> = ["StPreDir", "StName", "StType", "StDir"]
            .iter()
            .filter_map(|key| attr_string(attributes, key))
            .collect();
        if street_parts.is_empty() {
            components.calle = attr_string(attributes, "PlaceName");
        } else {
            components.calle = Some(street_parts.join(" "));
        }

        components.colonia =
            attr_string(attributes, "Nbrhd").or_else(|| attr_string(attributes, "District"));
        components.codigo_postal =
            attr_string(attributes, "Postal").and_then(|postal| valid_postal_code(&postal));
        if let Some(city) = attr_string(attributes, "City") {
            components.ciudad = Some(city);
        }

        components
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

/// Reads an attribute as a trimmed non-empty string, coercing numbers.
fn attr_string(value: &serde_json::Value, key: &str) -> Option<String> {
    let field = value.get(key)?;
    let text = match field {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Structured fields cover the address well enough when the street is known;
/// otherwise the free-text form is worth mining.
fn needs_text_fallback(components: &AddressComponents) -> bool {
    components.calle.is_none()
        || components.numero.is_none()
        || components.colonia.is_none()
        || components.codigo_postal.is_none()
}

fn api_error(error: &ProviderErrorBody) -> GeocodeError {
    GeocodeError::ApiError(format!(
        "code {}: {}",
        error.code.map_or_else(|| "?".to_string(), |c| c.to_string()),
        error.message.as_deref().unwrap_or("unknown error")
    ))
}

#[allow(clippy::cast_possible_truncation)]
fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
