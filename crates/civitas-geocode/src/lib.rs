//! Address resolution for the Civitas citizen-services portal.
//!
//! Resolves free-text addresses and postal codes to coordinates (and back)
//! through an ordered chain of sources: a local postal-code table, the
//! municipal ArcGIS locator, and public Nominatim as the last resort. The
//! chain is first-success-wins — provider failures are absorbed and logged,
//! never surfaced to the caller.

pub mod config;
pub mod error;
pub mod normalize;
pub mod parse;
pub mod postal;
pub mod providers;
pub mod resolver;
pub mod types;
pub mod validate;

pub use config::{BoundingBox, ResolverConfig};
pub use error::GeocodeError;
pub use resolver::Resolver;
pub use types::{
    AddressComponents, GeocodeResult, ProviderStatus, ResolvedSource, ServiceStatus,
};
