//! The resolution orchestrator.
//!
//! Runs the source chain in a fixed order and returns the first success:
//!
//! 1. local postal-code table (free, instantaneous) for postal-code queries;
//! 2. quick primary-provider variants for residential addresses;
//! 3. one primary-provider attempt on the normalized address;
//! 4. the public fallback provider on the original text.
//!
//! Deliberately first-success-wins, never best-of-N: the calling request has
//! a tight latency budget and a usable address beats the perfect one. The
//! whole chain shares one deadline; each step's timeout is clamped to the
//! time remaining.

use std::time::{Duration, Instant};

use crate::config::ResolverConfig;
use crate::error::GeocodeError;
use crate::providers::{step_timeout, ArcGisLocator, NominatimClient, SandboxLocator};
use crate::types::{GeocodeResult, ServiceStatus};
use crate::{normalize, parse, postal, validate};

/// The primary slot holds either the live municipal locator or the explicit
/// sandbox stand-in. There is no runtime fallback between the two.
enum PrimaryGeocoder {
    ArcGis(ArcGisLocator),
    Sandbox(SandboxLocator),
}

impl PrimaryGeocoder {
    async fn try_geocode(&self, address: &str, timeout: Duration) -> Option<GeocodeResult> {
        match self {
            PrimaryGeocoder::ArcGis(locator) => locator.try_geocode(address, timeout).await,
            PrimaryGeocoder::Sandbox(locator) => locator.try_geocode(address, timeout).await,
        }
    }

    async fn try_reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
        timeout: Duration,
    ) -> Option<GeocodeResult> {
        match self {
            PrimaryGeocoder::ArcGis(locator) => {
                locator.try_reverse_geocode(latitude, longitude, timeout).await
            }
            PrimaryGeocoder::Sandbox(locator) => {
                locator.try_reverse_geocode(latitude, longitude, timeout).await
            }
        }
    }

    async fn probe(&self, timeout: Duration) -> crate::types::ProviderStatus {
        match self {
            PrimaryGeocoder::ArcGis(locator) => locator.probe(timeout).await,
            PrimaryGeocoder::Sandbox(locator) => locator.probe(timeout).await,
        }
    }
}

pub struct Resolver {
    config: ResolverConfig,
    primary: PrimaryGeocoder,
    fallback: NominatimClient,
}

impl Resolver {
    /// Builds a resolver against the live providers.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if either HTTP client cannot be constructed
    /// or a configured base URL is invalid.
    pub fn new(config: ResolverConfig) -> Result<Self, GeocodeError> {
        let primary = PrimaryGeocoder::ArcGis(ArcGisLocator::new(&config)?);
        let fallback = NominatimClient::new(&config)?;
        Ok(Self {
            config,
            primary,
            fallback,
        })
    }

    /// Builds a resolver whose primary slot is the deterministic sandbox.
    /// The fallback provider is still the configured live one; point it at a
    /// mock server when full isolation is needed.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the fallback client cannot be constructed.
    pub fn with_sandbox(config: ResolverConfig) -> Result<Self, GeocodeError> {
        let primary = PrimaryGeocoder::Sandbox(SandboxLocator::new(&config));
        let fallback = NominatimClient::new(&config)?;
        Ok(Self {
            config,
            primary,
            fallback,
        })
    }

    /// Resolves a free-text address or postal code to at most one result.
    ///
    /// `Ok(None)` is a normal outcome — not every address is resolvable —
    /// and provider failures never surface here; they are logged and the
    /// chain moves on.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::InvalidAddress`] when the input fails the
    /// syntactic pre-flight check. Postal-code queries skip that check (they
    /// are digits-only by definition) and go straight to the local table.
    pub async fn geocode(&self, raw_address: &str) -> Result<Option<GeocodeResult>, GeocodeError> {
        let deadline = Instant::now() + self.config.overall_budget;
        let clean = normalize::normalize(raw_address);
        tracing::info!(raw = raw_address, normalized = %clean, "resolving address");

        if normalize::is_postal_code(&clean) {
            return Ok(self.geocode_postal(&clean, deadline).await);
        }

        validate::validate_address(raw_address)?;

        if normalize::is_residential(&clean) {
            let parsed = parse::parse_components(&clean);
            if let (Some(number), Some(street)) = (&parsed.number, &parsed.street) {
                tracing::debug!(number, street, "residential address detected");
                return Ok(self
                    .geocode_residential(street, number, deadline)
                    .await);
            }
        }

        if let Some(timeout) = step_timeout(self.config.primary_timeout, deadline) {
            if let Some(result) = self.primary.try_geocode(&clean, timeout).await {
                return Ok(Some(result));
            }
        }

        // Last resort takes the original text, not the cleaned form — the
        // public provider does its own normalization.
        Ok(self.fallback.geocode(raw_address, deadline).await)
    }

    /// Resolves coordinates back to an address: primary first, then the
    /// fallback provider. No local-table step (the table is forward-only)
    /// and no validation.
    pub async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Option<GeocodeResult> {
        let deadline = Instant::now() + self.config.overall_budget;
        tracing::info!(latitude, longitude, "reverse geocoding");

        if let Some(timeout) = step_timeout(self.config.primary_timeout, deadline) {
            if let Some(result) = self
                .primary
                .try_reverse_geocode(latitude, longitude, timeout)
                .await
            {
                return Some(result);
            }
        }

        let timeout = step_timeout(self.config.fallback_timeout, deadline)?;
        self.fallback
            .reverse_geocode(latitude, longitude, timeout)
            .await
    }

    /// One cheap probe per provider; diagnostics only.
    pub async fn service_status(&self) -> ServiceStatus {
        let primary = self.primary.probe(self.config.status_timeout).await;
        let fallback = self.fallback.probe(self.config.status_timeout).await;
        ServiceStatus { primary, fallback }
    }

    /// Postal-code strategy: local table, then one primary attempt with the
    /// code itself, then the fallback provider with a `CP`-prefixed query.
    /// The residential path is never consulted for postal codes.
    async fn geocode_postal(&self, postal_code: &str, deadline: Instant) -> Option<GeocodeResult> {
        if let Some(result) = postal::lookup(
            &self.config.postal_table,
            postal_code,
            &self.config.municipality,
            &self.config.state,
        ) {
            tracing::info!(postal_code, "postal code resolved from local table");
            return Some(result);
        }
        tracing::debug!(postal_code, "postal code not in local table");

        if let Some(timeout) = step_timeout(self.config.primary_timeout, deadline) {
            if let Some(result) = self.primary.try_geocode(postal_code, timeout).await {
                return Some(result);
            }
        }

        self.fallback
            .geocode(&format!("CP {postal_code}"), deadline)
            .await
    }

    /// Residential strategy: up to two quick street/number variants against
    /// the primary provider, then straight to the fallback provider (the
    /// general primary retry is skipped — it would repeat the same query).
    async fn geocode_residential(
        &self,
        street: &str,
        number: &str,
        deadline: Instant,
    ) -> Option<GeocodeResult> {
        let variants = [
            format!("{street} {number}, {}", self.config.municipality),
            format!("{number} {street}, {}", self.config.municipality),
        ];

        for variant in &variants {
            let Some(timeout) = step_timeout(self.config.residential_timeout, deadline) else {
                tracing::debug!("latency budget exhausted during residential variants");
                return None;
            };
            if let Some(result) = self.primary.try_geocode(variant, timeout).await {
                return Some(result);
            }
        }

        self.fallback
            .geocode(&format!("{street} {number}"), deadline)
            .await
    }
}
