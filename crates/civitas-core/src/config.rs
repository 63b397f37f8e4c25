use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid or required combinations are
/// incomplete (a catalog user without a password, or vice versa).
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid or required combinations are
/// incomplete.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected true/false, got \"{other}\""),
            }),
        }
    };

    let env = parse_environment(&or_default("CIVITAS_ENV", "development"));
    let log_level = or_default("CIVITAS_LOG_LEVEL", "info");

    let primary_geocoder_url = or_default(
        "CIVITAS_PRIMARY_GEOCODER_URL",
        "https://sigmunchih.mpiochih.gob.mx/server/rest/services/Composite_Locator/GeocodeServer",
    );
    // The municipal GIS server presents a self-signed certificate, so the
    // default is permissive for the primary provider only.
    let primary_accept_invalid_certs =
        parse_bool("CIVITAS_PRIMARY_ACCEPT_INVALID_CERTS", "true")?;
    let fallback_geocoder_url = or_default(
        "CIVITAS_FALLBACK_GEOCODER_URL",
        "https://nominatim.openstreetmap.org",
    );
    let geocoder_user_agent = or_default(
        "CIVITAS_GEOCODER_USER_AGENT",
        "civitas-geocode/0.1 (citizen-services)",
    );

    let residential_timeout_secs = parse_u64("CIVITAS_RESIDENTIAL_TIMEOUT_SECS", "2")?;
    let primary_timeout_secs = parse_u64("CIVITAS_PRIMARY_TIMEOUT_SECS", "3")?;
    let fallback_timeout_secs = parse_u64("CIVITAS_FALLBACK_TIMEOUT_SECS", "5")?;
    let status_timeout_secs = parse_u64("CIVITAS_STATUS_TIMEOUT_SECS", "5")?;
    let overall_budget_secs = parse_u64("CIVITAS_OVERALL_BUDGET_SECS", "12")?;

    let catalog_url = lookup("CIVITAS_CATALOG_URL").ok();
    let catalog_user = lookup("CIVITAS_CATALOG_USER").ok();
    let catalog_password = lookup("CIVITAS_CATALOG_PASSWORD").ok();
    let catalog_timeout_secs = parse_u64("CIVITAS_CATALOG_TIMEOUT_SECS", "15")?;

    // Credentials only make sense as a pair.
    if catalog_user.is_some() && catalog_password.is_none() {
        return Err(ConfigError::MissingEnvVar(
            "CIVITAS_CATALOG_PASSWORD".to_string(),
        ));
    }
    if catalog_password.is_some() && catalog_user.is_none() {
        return Err(ConfigError::MissingEnvVar(
            "CIVITAS_CATALOG_USER".to_string(),
        ));
    }

    let sandbox = parse_bool("CIVITAS_SANDBOX", "false")?;

    Ok(AppConfig {
        env,
        log_level,
        primary_geocoder_url,
        primary_accept_invalid_certs,
        fallback_geocoder_url,
        geocoder_user_agent,
        residential_timeout_secs,
        primary_timeout_secs,
        fallback_timeout_secs,
        status_timeout_secs,
        overall_budget_secs,
        catalog_url,
        catalog_user,
        catalog_password,
        catalog_timeout_secs,
        sandbox,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn parse_environment_production() {
        assert_eq!(parse_environment("production"), Environment::Production);
    }

    #[test]
    fn parse_environment_unknown_defaults_to_development() {
        assert_eq!(parse_environment("staging"), Environment::Development);
    }

    #[test]
    fn build_app_config_succeeds_with_empty_env() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.env, Environment::Development);
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.primary_geocoder_url.contains("GeocodeServer"));
        assert!(cfg.primary_accept_invalid_certs);
        assert_eq!(
            cfg.fallback_geocoder_url,
            "https://nominatim.openstreetmap.org"
        );
        assert_eq!(cfg.residential_timeout_secs, 2);
        assert_eq!(cfg.primary_timeout_secs, 3);
        assert_eq!(cfg.fallback_timeout_secs, 5);
        assert_eq!(cfg.overall_budget_secs, 12);
        assert!(cfg.catalog_url.is_none());
        assert!(!cfg.sandbox);
    }

    #[test]
    fn build_app_config_overrides_provider_urls() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("CIVITAS_PRIMARY_GEOCODER_URL", "http://localhost:6080/gc");
        map.insert("CIVITAS_FALLBACK_GEOCODER_URL", "http://localhost:8080");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.primary_geocoder_url, "http://localhost:6080/gc");
        assert_eq!(cfg.fallback_geocoder_url, "http://localhost:8080");
    }

    #[test]
    fn build_app_config_rejects_invalid_timeout() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("CIVITAS_PRIMARY_TIMEOUT_SECS", "not-a-number");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CIVITAS_PRIMARY_TIMEOUT_SECS"),
            "expected InvalidEnvVar(CIVITAS_PRIMARY_TIMEOUT_SECS), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rejects_invalid_bool() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("CIVITAS_SANDBOX", "yes");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CIVITAS_SANDBOX"),
            "expected InvalidEnvVar(CIVITAS_SANDBOX), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_accepts_numeric_bool() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("CIVITAS_SANDBOX", "1");
        map.insert("CIVITAS_PRIMARY_ACCEPT_INVALID_CERTS", "0");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(cfg.sandbox);
        assert!(!cfg.primary_accept_invalid_certs);
    }

    #[test]
    fn build_app_config_rejects_catalog_user_without_password() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("CIVITAS_CATALOG_URL", "https://catalog.example");
        map.insert("CIVITAS_CATALOG_USER", "svc-desur");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "CIVITAS_CATALOG_PASSWORD"),
            "expected MissingEnvVar(CIVITAS_CATALOG_PASSWORD), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rejects_catalog_password_without_user() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("CIVITAS_CATALOG_PASSWORD", "secret");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "CIVITAS_CATALOG_USER"),
            "expected MissingEnvVar(CIVITAS_CATALOG_USER), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_accepts_catalog_credential_pair() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("CIVITAS_CATALOG_URL", "https://catalog.example");
        map.insert("CIVITAS_CATALOG_USER", "svc-desur");
        map.insert("CIVITAS_CATALOG_PASSWORD", "secret");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.catalog_user.as_deref(), Some("svc-desur"));
        assert_eq!(cfg.catalog_password.as_deref(), Some("secret"));
    }
}
