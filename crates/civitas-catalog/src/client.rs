//! HTTP client for the municipal address catalog.
//!
//! Wraps `reqwest` with catalog-specific error handling and bearer-token
//! management. An HTTP 401 anywhere is surfaced as
//! [`CatalogError::AuthRequired`] — callers decide what to do about missing
//! credentials; the client never substitutes simulated data.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::CatalogError;
use crate::types::{Calle, Colonia, CompleteAddress, Coordinates, ExteriorNumber, TokenResponse};

pub struct CatalogClient {
    client: Client,
    base_url: Url,
    /// Basic-auth pair for deployments fronted by Windows authentication.
    /// Applied to the token request only; catalog calls authorize with the
    /// bearer token alone (one Authorization header per request).
    credentials: Option<(String, String)>,
    token: Option<String>,
    token_expiry: Option<String>,
}

impl CatalogClient {
    /// Creates an unauthenticated client; call [`Self::authenticate`] before
    /// any catalog endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`CatalogError::ApiError`] if `base_url` is
    /// not a valid URL.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| CatalogError::ApiError(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            base_url,
            credentials: None,
            token: None,
            token_expiry: None,
        })
    }

    /// Same as [`Self::new`] with a basic-auth credential pair applied to
    /// every request.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn with_credentials(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        user: &str,
        password: &str,
    ) -> Result<Self, CatalogError> {
        let mut client = Self::new(base_url, timeout_secs, user_agent)?;
        client.credentials = Some((user.to_string(), password.to_string()));
        Ok(client)
    }

    /// Requests a bearer token from `Usuarios/GetToken`.
    ///
    /// Application credentials are optional; some deployments authorize by
    /// the transport-level account alone. The service answers either a JSON
    /// envelope (`token`/`Token`) or the bare token as plain text.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::AuthRequired`] — HTTP 401.
    /// - [`CatalogError::UnexpectedStatus`] — any other non-2xx status.
    /// - [`CatalogError::ApiError`] — a 2xx response carrying no token.
    /// - [`CatalogError::Http`] — network failure.
    pub async fn authenticate(
        &mut self,
        usuario: Option<&str>,
        contrasena: Option<&str>,
    ) -> Result<(), CatalogError> {
        let url = self.endpoint("Usuarios/GetToken")?;

        let mut request = self.client.post(url.clone());
        if let Some((user, password)) = &self.credentials {
            request = request.basic_auth(user, Some(password));
        }
        if let (Some(usuario), Some(contrasena)) = (usuario, contrasena) {
            request = request.json(&serde_json::json!({
                "usuario": usuario,
                "contrasena": contrasena,
            }));
        }

        let response = request.send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(CatalogError::AuthRequired);
        }
        if !status.is_success() {
            return Err(CatalogError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        match serde_json::from_str::<TokenResponse>(&body) {
            Ok(parsed) => {
                self.token = parsed.token;
                self.token_expiry = parsed.vigencia;
            }
            Err(_) => {
                // Plain-text token body.
                let trimmed = body.trim();
                self.token = (!trimmed.is_empty()).then(|| trimmed.to_string());
                self.token_expiry = None;
            }
        }

        if self.token.is_none() {
            return Err(CatalogError::ApiError(
                "token endpoint answered without a token".to_string(),
            ));
        }
        tracing::info!(expiry = ?self.token_expiry, "catalog token obtained");
        Ok(())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    #[must_use]
    pub fn token_expiry(&self) -> Option<&str> {
        self.token_expiry.as_deref()
    }

    /// Lists every colonia in the registry.
    ///
    /// # Errors
    ///
    /// Propagates authentication, HTTP, and deserialization failures.
    pub async fn get_colonias(&self) -> Result<Vec<Colonia>, CatalogError> {
        self.authenticated_post("GetColonias", None).await
    }

    /// Lists the streets of one colonia.
    ///
    /// # Errors
    ///
    /// Propagates authentication, HTTP, and deserialization failures.
    pub async fn get_calles(&self, id_colonia: i64) -> Result<Vec<Calle>, CatalogError> {
        self.authenticated_post(
            "GetCalles",
            Some(serde_json::json!({ "id_colonia": id_colonia })),
        )
        .await
    }

    /// Lists the exterior numbers of one street within one colonia.
    ///
    /// # Errors
    ///
    /// Propagates authentication, HTTP, and deserialization failures.
    pub async fn get_exterior_numbers(
        &self,
        id_colonia: i64,
        id_calle: i64,
    ) -> Result<Vec<ExteriorNumber>, CatalogError> {
        self.authenticated_post(
            "GetNumerosExteriores",
            Some(serde_json::json!({
                "id_colonia": id_colonia,
                "id_calle": id_calle,
            })),
        )
        .await
    }

    /// Looks up the coordinates of a lot by its cadastral key.
    ///
    /// # Errors
    ///
    /// Propagates authentication, HTTP, and deserialization failures.
    pub async fn get_coordinates(
        &self,
        clave_catastral: &str,
    ) -> Result<Coordinates, CatalogError> {
        self.authenticated_post(
            "GetCoordenadas",
            Some(serde_json::json!({ "clave_catastral": clave_catastral })),
        )
        .await
    }

    /// Case-insensitive contains-search over colonia names. Filtering is
    /// client-side; the registry has no search endpoint.
    ///
    /// # Errors
    ///
    /// Propagates any failure from [`Self::get_colonias`].
    pub async fn search_colonia(&self, nombre: &str) -> Result<Vec<Colonia>, CatalogError> {
        let needle = nombre.to_uppercase();
        let colonias = self.get_colonias().await?;
        Ok(colonias
            .into_iter()
            .filter(|colonia| colonia.colonia.to_uppercase().contains(&needle))
            .collect())
    }

    /// Case-insensitive contains-search over one colonia's street names.
    ///
    /// # Errors
    ///
    /// Propagates any failure from [`Self::get_calles`].
    pub async fn search_calle(
        &self,
        id_colonia: i64,
        nombre: &str,
    ) -> Result<Vec<Calle>, CatalogError> {
        let needle = nombre.to_uppercase();
        let calles = self.get_calles(id_colonia).await?;
        Ok(calles
            .into_iter()
            .filter(|calle| calle.calle.to_uppercase().contains(&needle))
            .collect())
    }

    /// Searches colonias by postal code through the registry's public
    /// endpoint (no token needed). A non-2xx answer is an empty list, not an
    /// error — the endpoint is best-effort.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] on network failure or
    /// [`CatalogError::Deserialize`] on a malformed 2xx body.
    pub async fn search_colonia_by_cp(&self, cp: &str) -> Result<Vec<Colonia>, CatalogError> {
        let mut url = self.endpoint("api/colonias/buscar-cp")?;
        url.query_pairs_mut().append_pair("cp", cp);

        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            tracing::debug!(cp, status = %response.status(), "postal-code search unavailable");
            return Ok(vec![]);
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| CatalogError::Deserialize {
            context: format!("colonias for postal code {cp}"),
            source: e,
        })
    }

    /// Aggregates the full picture of one street: its colonia record, the
    /// street record, and every exterior number.
    ///
    /// # Errors
    ///
    /// Propagates any failure from the underlying catalog calls.
    pub async fn complete_address(
        &self,
        id_colonia: i64,
        id_calle: i64,
    ) -> Result<CompleteAddress, CatalogError> {
        let colonia = self
            .get_colonias()
            .await?
            .into_iter()
            .find(|c| c.id_colonia == id_colonia);
        let calle = self
            .get_calles(id_colonia)
            .await?
            .into_iter()
            .find(|c| c.id_calle == id_calle);
        let numeros_exteriores = self.get_exterior_numbers(id_colonia, id_calle).await?;
        let total_numeros = numeros_exteriores.len();

        Ok(CompleteAddress {
            colonia,
            calle,
            numeros_exteriores,
            total_numeros,
        })
    }

    /// Connectivity probe: any answer below 500 counts as reachable.
    pub async fn test_connection(&self) -> bool {
        match self.client.get(self.base_url.clone()).send().await {
            Ok(response) => response.status().as_u16() < 400,
            Err(err) => {
                tracing::debug!(error = %err, "catalog connectivity probe failed");
                false
            }
        }
    }

    async fn authenticated_post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        payload: Option<serde_json::Value>,
    ) -> Result<T, CatalogError> {
        let Some(token) = &self.token else {
            return Err(CatalogError::NotAuthenticated);
        };
        let url = self.endpoint(path)?;

        let mut request = self.client.post(url.clone()).bearer_auth(token);
        if let Some(payload) = payload {
            request = request.json(&payload);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(CatalogError::AuthRequired);
        }
        if !status.is_success() {
            return Err(CatalogError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| CatalogError::Deserialize {
            context: format!("{path} response"),
            source: e,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, CatalogError> {
        self.base_url
            .join(path)
            .map_err(|e| CatalogError::ApiError(format!("invalid endpoint '{path}': {e}")))
    }
}
