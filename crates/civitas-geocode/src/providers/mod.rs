//! Provider adapters for the resolution chain.
//!
//! Each adapter wraps one external geocoding service behind the same
//! contract: a fallible inner request that returns
//! `Result<Option<GeocodeResult>, GeocodeError>`, and a `try_*` wrapper that
//! absorbs every failure to `None` with a tracing record. Fallthrough to the
//! next source is the only recovery; adapters never retry on their own.

pub mod arcgis;
pub mod nominatim;
pub mod sandbox;

pub use arcgis::ArcGisLocator;
pub use nominatim::NominatimClient;
pub use sandbox::SandboxLocator;

use std::time::{Duration, Instant};

/// Clamps a step's timeout to the time remaining before `deadline`.
///
/// Returns `None` when the overall latency budget is exhausted — the caller
/// must skip the step (and every later one) instead of compounding per-step
/// worst cases.
pub(crate) fn step_timeout(step: Duration, deadline: Instant) -> Option<Duration> {
    let remaining = deadline.checked_duration_since(Instant::now())?;
    let timeout = step.min(remaining);
    (timeout > Duration::ZERO).then_some(timeout)
}
