//! Wire types for the municipal address catalog.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Colonia {
    pub id_colonia: i64,
    pub colonia: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calle {
    pub id_calle: i64,
    pub calle: String,
}

/// One exterior (house) number on a street. The registry stores coordinates
/// as strings and leaves them null for unplotted lots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExteriorNumber {
    pub numero: String,
    #[serde(default)]
    pub latitud: Option<String>,
    #[serde(default)]
    pub longitud: Option<String>,
    #[serde(default)]
    pub distrito: Option<String>,
}

impl ExteriorNumber {
    /// Parses the string coordinate pair, `None` when either half is
    /// missing or unparseable.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let latitude = self.latitud.as_ref()?.parse::<f64>().ok()?;
        let longitude = self.longitud.as_ref()?.parse::<f64>().ok()?;
        Some((latitude, longitude))
    }
}

/// Coordinates of a lot looked up by cadastral key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitud: String,
    pub longitud: String,
    #[serde(default)]
    pub direccion: Option<String>,
}

/// Aggregated view of one street within one colonia.
#[derive(Debug, Clone, Serialize)]
pub struct CompleteAddress {
    pub colonia: Option<Colonia>,
    pub calle: Option<Calle>,
    pub numeros_exteriores: Vec<ExteriorNumber>,
    pub total_numeros: usize,
}

/// Token envelope; the service is inconsistent about field casing.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default, alias = "Token")]
    pub token: Option<String>,
    #[serde(default, alias = "Vigencia")]
    pub vigencia: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_parse_string_pair() {
        let number = ExteriorNumber {
            numero: "101".to_string(),
            latitud: Some("28.6329957".to_string()),
            longitud: Some("-106.0691004".to_string()),
            distrito: Some("1".to_string()),
        };
        let (lat, lng) = number.coordinates().unwrap();
        assert!((lat - 28.632_995_7).abs() < 1e-9);
        assert!((lng - (-106.069_100_4)).abs() < 1e-9);
    }

    #[test]
    fn coordinates_none_for_unplotted_lot() {
        let number = ExteriorNumber {
            numero: "107".to_string(),
            latitud: None,
            longitud: None,
            distrito: None,
        };
        assert!(number.coordinates().is_none());
    }

    #[test]
    fn coordinates_none_for_garbage_values() {
        let number = ExteriorNumber {
            numero: "1".to_string(),
            latitud: Some("n/a".to_string()),
            longitud: Some("-106.0".to_string()),
            distrito: None,
        };
        assert!(number.coordinates().is_none());
    }

    #[test]
    fn token_response_accepts_both_casings() {
        let lower: TokenResponse =
            serde_json::from_str(r#"{"token":"abc","vigencia":"2026-12-31"}"#).unwrap();
        assert_eq!(lower.token.as_deref(), Some("abc"));
        assert_eq!(lower.vigencia.as_deref(), Some("2026-12-31"));

        let upper: TokenResponse =
            serde_json::from_str(r#"{"Token":"xyz","Vigencia":"2026-12-31"}"#).unwrap();
        assert_eq!(upper.token.as_deref(), Some("xyz"));
    }
}
