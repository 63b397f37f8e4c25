//! Resolver configuration.
//!
//! Everything deployment-specific — provider endpoints, the target
//! municipality, the bounding box, timeouts, the postal-code seed table —
//! travels through [`ResolverConfig`] so tests can point the resolver at
//! mock servers and other deployments can retarget it without code changes.

use std::time::Duration;

use crate::postal::{self, PostalCodeEntry};

/// Geographic rectangle used to bias or restrict provider results to the
/// target municipality. Coordinates are WGS84 lon/lat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BoundingBox {
    /// The Chihuahua municipality rectangle.
    pub const CHIHUAHUA: BoundingBox = BoundingBox {
        xmin: -106.5,
        ymin: 28.0,
        xmax: -106.0,
        ymax: 29.0,
    };

    /// `searchExtent` value for the primary provider: `xmin,ymin,xmax,ymax`.
    #[must_use]
    pub(crate) fn search_extent(&self) -> String {
        format!("{},{},{},{}", self.xmin, self.ymin, self.xmax, self.ymax)
    }

    /// `viewbox` value for the fallback provider: `lon1,lat1,lon2,lat2`.
    #[must_use]
    pub(crate) fn viewbox(&self) -> String {
        format!("{},{},{},{}", self.xmin, self.ymin, self.xmax, self.ymax)
    }
}

/// Value object carrying every knob the resolution chain needs.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Base URL of the primary locator (`.../GeocodeServer`).
    pub primary_url: String,
    /// Base URL of the fallback public geocoder.
    pub fallback_url: String,
    /// Sent on every outbound request, as public-API usage policy asks.
    pub user_agent: String,
    /// Skip TLS verification for the primary provider only (the internal
    /// GIS server is self-signed). The fallback provider always verifies.
    pub accept_invalid_certs: bool,
    pub search_extent: BoundingBox,
    pub municipality: String,
    pub state: String,
    pub country: String,
    /// ISO country codes for the fallback provider's `countrycodes` filter.
    pub country_codes: String,
    /// Per-attempt timeout for the residential quick variants.
    pub residential_timeout: Duration,
    /// Per-attempt timeout for the final primary attempt.
    pub primary_timeout: Duration,
    /// Per-variant timeout for the fallback provider.
    pub fallback_timeout: Duration,
    /// Timeout for the health-check probes.
    pub status_timeout: Duration,
    /// Hard ceiling on the whole chain. Each step's timeout is clamped to
    /// the time remaining, so exhausted budgets end the chain instead of
    /// compounding per-step worst cases.
    pub overall_budget: Duration,
    /// Known postal codes for the target municipality. A seed cache, not a
    /// dataset: misses always continue down the network chain.
    pub postal_table: Vec<PostalCodeEntry>,
}

impl ResolverConfig {
    /// Configuration targeting the Chihuahua municipality with default
    /// timeouts and the seed postal table.
    #[must_use]
    pub fn new(primary_url: impl Into<String>, fallback_url: impl Into<String>) -> Self {
        Self {
            primary_url: primary_url.into(),
            fallback_url: fallback_url.into(),
            user_agent: "civitas-geocode/0.1 (citizen-services)".to_string(),
            accept_invalid_certs: false,
            search_extent: BoundingBox::CHIHUAHUA,
            municipality: "Chihuahua".to_string(),
            state: "Chihuahua".to_string(),
            country: "México".to_string(),
            country_codes: "mx".to_string(),
            residential_timeout: Duration::from_secs(2),
            primary_timeout: Duration::from_secs(3),
            fallback_timeout: Duration::from_secs(5),
            status_timeout: Duration::from_secs(5),
            overall_budget: Duration::from_secs(12),
            postal_table: postal::chihuahua_seed(),
        }
    }
}
