//! Local postal-code lookup table.
//!
//! The first source in the resolution chain: free and instantaneous, so
//! postal-code queries try it before any network call. The shipped table is
//! a seed for the Chihuahua municipality — deployments are expected to
//! replace it through [`crate::ResolverConfig::postal_table`], and a miss
//! always continues down the chain.

use serde::{Deserialize, Serialize};

use crate::types::{AddressComponents, GeocodeResult, ResolvedSource};

/// Confidence assigned to local-table hits; higher than any network source.
const LOCAL_TABLE_SCORE: u8 = 95;

/// One known postal code with its centroid and neighborhood name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostalCodeEntry {
    pub codigo_postal: String,
    pub latitude: f64,
    pub longitude: f64,
    pub colonia: String,
}

impl PostalCodeEntry {
    fn new(codigo_postal: &str, latitude: f64, longitude: f64, colonia: &str) -> Self {
        Self {
            codigo_postal: codigo_postal.to_string(),
            latitude,
            longitude,
            colonia: colonia.to_string(),
        }
    }
}

/// The seed table for the Chihuahua municipality.
#[must_use]
pub fn chihuahua_seed() -> Vec<PostalCodeEntry> {
    vec![
        PostalCodeEntry::new("31000", 28.6353, -106.0889, "Centro"),
        PostalCodeEntry::new("31200", 28.6500, -106.1000, "San Felipe"),
        PostalCodeEntry::new("31203", 28.6400, -106.1100, "Bosques del Pedregal"),
        PostalCodeEntry::new("31204", 28.6450, -106.1150, "Quintas del Sol"),
        PostalCodeEntry::new("31210", 28.6300, -106.0800, "Residencial Campestre"),
    ]
}

/// Looks up a postal code in the table and builds the resolved record.
#[must_use]
pub(crate) fn lookup(
    table: &[PostalCodeEntry],
    postal_code: &str,
    municipality: &str,
    state: &str,
) -> Option<GeocodeResult> {
    let entry = table
        .iter()
        .find(|entry| entry.codigo_postal == postal_code)?;

    let components = AddressComponents {
        colonia: Some(entry.colonia.clone()),
        codigo_postal: Some(entry.codigo_postal.clone()),
        ciudad: Some(municipality.to_string()),
        estado: Some(state.to_string()),
        ..AddressComponents::default()
    };

    Some(GeocodeResult {
        address: format!(
            "Código Postal {}, {}, {municipality}",
            entry.codigo_postal, entry.colonia
        ),
        latitude: entry.latitude,
        longitude: entry.longitude,
        score: LOCAL_TABLE_SCORE,
        source: ResolvedSource::LocalTable,
        components,
    })
}
