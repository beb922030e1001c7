use thiserror::Error;

#[derive(Debug, Error)]
pub enum RevolutError {
    #[error("{0} is required")]
    MissingConfig(&'static str),
    #[error("REVOLUT_PRIVATE_KEY must be a full PEM block including -----BEGIN/END-----")]
    MalformedKey,
    #[error("REVOLUT_PRIVATE_KEY is not a usable RSA key: {0}")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),
    #[error("Failed to sign Revolut assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("Revolut request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Revolut API {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Unexpected Revolut payload: {0}")]
    Decode(#[from] serde_json::Error),
}
