//! Domain types for address resolution.

use serde::{Deserialize, Serialize};

/// Which source in the resolution chain produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedSource {
    LocalTable,
    PrimaryProvider,
    FallbackProvider,
}

impl ResolvedSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ResolvedSource::LocalTable => "local_table",
            ResolvedSource::PrimaryProvider => "primary_provider",
            ResolvedSource::FallbackProvider => "fallback_provider",
        }
    }
}

impl std::fmt::Display for ResolvedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured address components, using the municipal provider's field
/// vocabulary. Every field is optional; providers rarely return all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressComponents {
    pub calle: Option<String>,
    pub numero: Option<String>,
    pub colonia: Option<String>,
    pub codigo_postal: Option<String>,
    pub ciudad: Option<String>,
    pub estado: Option<String>,
}

impl AddressComponents {
    /// Joins the present fields in fixed order: street+number, colonia,
    /// ciudad, `CP <codigo_postal>`.
    #[must_use]
    pub fn formatted(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(calle) = &self.calle {
            match &self.numero {
                Some(numero) => parts.push(format!("{calle} {numero}")),
                None => parts.push(calle.clone()),
            }
        }
        if let Some(colonia) = &self.colonia {
            parts.push(colonia.clone());
        }
        if let Some(ciudad) = &self.ciudad {
            parts.push(ciudad.clone());
        }
        if let Some(cp) = &self.codigo_postal {
            parts.push(format!("CP {cp}"));
        }
        parts.join(", ")
    }
}

/// Returns the trimmed value when it is a well-formed Mexican postal code
/// (exactly five digits). Anything else is dropped, never an error.
#[must_use]
pub fn valid_postal_code(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (trimmed.len() == 5 && trimmed.bytes().all(|b| b.is_ascii_digit()))
        .then(|| trimmed.to_string())
}

/// One resolved address. At most one is produced per query; candidates from
/// different sources are never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Confidence in `0..=100`. Fixed per source where the provider does not
    /// report one.
    pub score: u8,
    pub source: ResolvedSource,
    pub components: AddressComponents,
}

/// Availability snapshot for one provider. Diagnostics only — resolution
/// decisions never consult it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub available: bool,
    pub response_time_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub primary: ProviderStatus,
    pub fallback: ProviderStatus,
}
