//! Canned catalog data for development and tests.
//!
//! Mirrors [`crate::CatalogClient`]'s read surface over a fixed in-memory
//! registry. Construction is always an explicit choice (a config flag or a
//! CLI switch); the live client never falls back to this on failure.

use crate::types::{Calle, Colonia, CompleteAddress, Coordinates, ExteriorNumber};

pub struct SandboxCatalog;

impl SandboxCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn get_colonias(&self) -> Vec<Colonia> {
        vec![
            colonia(1, "CENTRO"),
            colonia(2, "DALE"),
            colonia(3, "ALTAVISTA"),
            colonia(4, "SAN FELIPE"),
            colonia(5, "LOS FRAILES"),
            colonia(6, "COUNTRY CLUB"),
            colonia(7, "QUINTAS CAROLINAS"),
            colonia(11462, "RESERVA DEL PARQUE II"),
        ]
    }

    #[must_use]
    pub fn get_calles(&self, _id_colonia: i64) -> Vec<Calle> {
        vec![
            calle(2, "AVENIDA HIDALGO"),
            calle(3, "CALLE MORELOS"),
            calle(4, "BOULEVARD INDEPENDENCIA"),
            calle(1791, "AVENIDA MAIN"),
            calle(15506, "CALLE JUAREZ"),
        ]
    }

    /// Three plotted numbers and one unplotted lot, so callers exercise the
    /// missing-coordinates path too.
    #[must_use]
    pub fn get_exterior_numbers(&self, _id_colonia: i64, _id_calle: i64) -> Vec<ExteriorNumber> {
        vec![
            number("101", Some(("28.6329957", "-106.0691004"))),
            number("103", Some(("28.6330123", "-106.0691234"))),
            number("105", Some(("28.6330289", "-106.0691464"))),
            number("107", None),
        ]
    }

    #[must_use]
    pub fn get_coordinates(&self, _clave_catastral: &str) -> Coordinates {
        Coordinates {
            latitud: "28.6329957".to_string(),
            longitud: "-106.0691004".to_string(),
            direccion: Some("Calle Juárez 123, Centro".to_string()),
        }
    }

    #[must_use]
    pub fn search_colonia(&self, nombre: &str) -> Vec<Colonia> {
        let needle = nombre.to_uppercase();
        self.get_colonias()
            .into_iter()
            .filter(|colonia| colonia.colonia.contains(&needle))
            .collect()
    }

    #[must_use]
    pub fn search_calle(&self, id_colonia: i64, nombre: &str) -> Vec<Calle> {
        let needle = nombre.to_uppercase();
        self.get_calles(id_colonia)
            .into_iter()
            .filter(|calle| calle.calle.contains(&needle))
            .collect()
    }

    #[must_use]
    pub fn complete_address(&self, id_colonia: i64, id_calle: i64) -> CompleteAddress {
        let colonia = self
            .get_colonias()
            .into_iter()
            .find(|c| c.id_colonia == id_colonia);
        let calle = self
            .get_calles(id_colonia)
            .into_iter()
            .find(|c| c.id_calle == id_calle);
        let numeros_exteriores = self.get_exterior_numbers(id_colonia, id_calle);
        let total_numeros = numeros_exteriores.len();
        CompleteAddress {
            colonia,
            calle,
            numeros_exteriores,
            total_numeros,
        }
    }
}

impl Default for SandboxCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn colonia(id_colonia: i64, nombre: &str) -> Colonia {
    Colonia {
        id_colonia,
        colonia: nombre.to_string(),
    }
}

fn calle(id_calle: i64, nombre: &str) -> Calle {
    Calle {
        id_calle,
        calle: nombre.to_string(),
    }
}

fn number(numero: &str, coords: Option<(&str, &str)>) -> ExteriorNumber {
    ExteriorNumber {
        numero: numero.to_string(),
        latitud: coords.map(|(lat, _)| lat.to_string()),
        longitud: coords.map(|(_, lng)| lng.to_string()),
        distrito: coords.map(|_| "1".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_colonia_is_case_insensitive() {
        let catalog = SandboxCatalog::new();
        let hits = catalog.search_colonia("quintas");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].colonia, "QUINTAS CAROLINAS");
    }

    #[test]
    fn search_calle_filters_by_fragment() {
        let catalog = SandboxCatalog::new();
        let hits = catalog.search_calle(1, "juarez");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id_calle, 15506);
    }

    #[test]
    fn complete_address_counts_numbers() {
        let catalog = SandboxCatalog::new();
        let complete = catalog.complete_address(1, 15506);
        assert_eq!(complete.colonia.as_ref().unwrap().colonia, "CENTRO");
        assert_eq!(complete.calle.as_ref().unwrap().calle, "CALLE JUAREZ");
        assert_eq!(complete.total_numeros, 4);
    }

    #[test]
    fn unplotted_lot_has_no_coordinates() {
        let catalog = SandboxCatalog::new();
        let numbers = catalog.get_exterior_numbers(1, 15506);
        let unplotted = numbers.iter().find(|n| n.numero == "107").unwrap();
        assert!(unplotted.coordinates().is_none());
    }
}
