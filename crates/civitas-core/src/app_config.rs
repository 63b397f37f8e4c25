#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Base URL of the municipal ArcGIS locator (`.../GeocodeServer`).
    pub primary_geocoder_url: String,
    /// The internal GIS server runs with a self-signed certificate; this
    /// flag applies to the primary provider only.
    pub primary_accept_invalid_certs: bool,
    pub fallback_geocoder_url: String,
    pub geocoder_user_agent: String,
    pub residential_timeout_secs: u64,
    pub primary_timeout_secs: u64,
    pub fallback_timeout_secs: u64,
    pub status_timeout_secs: u64,
    /// Total latency budget for a full resolution chain, not per call.
    pub overall_budget_secs: u64,
    pub catalog_url: Option<String>,
    pub catalog_user: Option<String>,
    pub catalog_password: Option<String>,
    pub catalog_timeout_secs: u64,
    /// When set, the CLI substitutes the deterministic sandbox providers
    /// for every live service. Never consulted by the libraries themselves.
    pub sandbox: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("primary_geocoder_url", &self.primary_geocoder_url)
            .field(
                "primary_accept_invalid_certs",
                &self.primary_accept_invalid_certs,
            )
            .field("fallback_geocoder_url", &self.fallback_geocoder_url)
            .field("geocoder_user_agent", &self.geocoder_user_agent)
            .field("residential_timeout_secs", &self.residential_timeout_secs)
            .field("primary_timeout_secs", &self.primary_timeout_secs)
            .field("fallback_timeout_secs", &self.fallback_timeout_secs)
            .field("status_timeout_secs", &self.status_timeout_secs)
            .field("overall_budget_secs", &self.overall_budget_secs)
            .field("catalog_url", &self.catalog_url)
            .field("catalog_user", &self.catalog_user)
            .field(
                "catalog_password",
                &self.catalog_password.as_ref().map(|_| "[redacted]"),
            )
            .field("catalog_timeout_secs", &self.catalog_timeout_secs)
            .field("sandbox", &self.sandbox)
            .finish()
    }
}
