//! Client configuration.
//!
//! `ClientConfig` is plain serde data so callers can load it from whatever
//! format they already use; `from_env` covers the common deployment case.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{ApiError, Result};
use crate::transport::TransportConfig;

pub const ENV_HOST: &str = "REKKI_API_HOST";
pub const ENV_TOKEN: &str = "REKKI_API_TOKEN";
pub const ENV_MISSING_REFERENCE: &str = "REKKI_MISSING_REFERENCE";

/// Supplier API token. Zeroized on drop and redacted in `Debug`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken([REDACTED])")
    }
}

impl From<&str> for ApiToken {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for ApiToken {
    fn from(token: String) -> Self {
        Self::new(token)
    }
}

impl<'de> Deserialize<'de> for ApiToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self)
    }
}

/// What a listing does with an order that arrives without a reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingReferencePolicy {
    /// Leave the order out of the resulting map.
    #[default]
    Skip,
    /// Fail the whole listing with `ApiError::MissingReference`.
    Reject,
}

impl FromStr for MissingReferencePolicy {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "reject" => Ok(Self::Reject),
            other => Err(ApiError::Configuration(format!(
                "unknown missing-reference policy {other:?}, expected skip or reject"
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: ApiToken,
    #[serde(default)]
    pub missing_reference: MissingReferencePolicy,
    #[serde(default)]
    pub transport: TransportConfig,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<ApiToken>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            missing_reference: MissingReferencePolicy::default(),
            transport: TransportConfig::default(),
        }
    }

    /// Read `REKKI_API_HOST`, `REKKI_API_TOKEN` and the optional
    /// `REKKI_MISSING_REFERENCE` from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ApiError::Configuration(format!("{key} is not set")))
        };
        let mut config = Self::new(required(ENV_HOST)?, required(ENV_TOKEN)?);
        if let Some(policy) = lookup(ENV_MISSING_REFERENCE) {
            config.missing_reference = policy.parse()?;
        }
        Ok(config)
    }
}
