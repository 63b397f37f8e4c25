use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("the address catalog rejected the request (HTTP 401); configure service credentials")]
    AuthRequired,

    #[error("no token available; call authenticate() first")]
    NotAuthenticated,

    #[error("catalog error: {0}")]
    ApiError(String),
}
