//! Client for the municipal address catalog web service.
//!
//! The catalog is the city's authoritative address registry, browsed
//! top-down: colonias → streets → exterior numbers → coordinates by
//! cadastral key. Access is token-gated; [`CatalogClient::authenticate`]
//! must run before any catalog call. For development without connectivity
//! there is an explicitly-constructed [`SandboxCatalog`] — a live client
//! never degrades into it on its own.

pub mod client;
pub mod error;
pub mod sandbox;
pub mod types;

pub use client::CatalogClient;
pub use error::CatalogError;
pub use sandbox::SandboxCatalog;
pub use types::{Calle, Colonia, CompleteAddress, Coordinates, ExteriorNumber};
