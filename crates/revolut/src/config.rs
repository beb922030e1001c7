use std::fmt;

use crate::error::RevolutError;

pub const REVOLUT_API_BASE: &str = "https://b2b.revolut.com/api/1.0";

pub const CLIENT_ID_VAR: &str = "REVOLUT_CLIENT_ID";
pub const ISSUER_VAR: &str = "REVOLUT_JWT_ISSUER";
pub const PRIVATE_KEY_VAR: &str = "REVOLUT_PRIVATE_KEY";
pub const API_BASE_VAR: &str = "REVOLUT_API_BASE";

#[derive(Clone)]
pub struct RevolutConfig {
    pub client_id: String,
    pub issuer: String,
    /// PEM, newlines restored.
    pub private_key: String,
    pub api_base: String,
}

impl fmt::Debug for RevolutConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevolutConfig")
            .field("client_id", &self.client_id)
            .field("issuer", &self.issuer)
            .field("private_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl RevolutConfig {
    pub fn from_env() -> Result<Self, RevolutError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source. Values are trimmed and the
    /// private key may carry literal `\n` escapes, as single-line env files do.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RevolutError> {
        let required = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(RevolutError::MissingConfig(key))
        };

        let client_id = required(CLIENT_ID_VAR)?;
        let issuer = required(ISSUER_VAR)?;

        let private_key = lookup(PRIVATE_KEY_VAR)
            .unwrap_or_default()
            .replace("\\n", "\n")
            .trim()
            .to_string();
        if private_key.is_empty() {
            return Err(RevolutError::MissingConfig(PRIVATE_KEY_VAR));
        }
        if !private_key.contains("-----BEGIN") {
            return Err(RevolutError::MalformedKey);
        }

        let api_base = lookup(API_BASE_VAR)
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| REVOLUT_API_BASE.to_string());

        Ok(RevolutConfig {
            client_id,
            issuer,
            private_key,
            api_base,
        })
    }
}
