//! Remote store configuration from the environment.
//!
//! Absence of either value is a legitimate, fully supported state: the
//! engine then runs in degraded (local-only) mode everywhere. It is not an
//! error and nothing logs above info level for it.

use std::env;

pub const REMOTE_URL_VAR: &str = "STORESYNC_REMOTE_URL";
pub const REMOTE_KEY_VAR: &str = "STORESYNC_REMOTE_KEY";

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Endpoint base, without a trailing slash.
    pub url: String,
    /// Access key sent as both the api key and the bearer token.
    pub key: String,
}

impl RemoteConfig {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            url: url.trim_end_matches('/').to_string(),
            key: key.into(),
        }
    }

    /// Read the endpoint URL and access key from the environment. `None`
    /// when either is missing or blank.
    pub fn from_env() -> Option<Self> {
        let url = env::var(REMOTE_URL_VAR).ok().filter(|v| !v.trim().is_empty());
        let key = env::var(REMOTE_KEY_VAR).ok().filter(|v| !v.trim().is_empty());
        match (url, key) {
            (Some(url), Some(key)) => Some(Self::new(url, key)),
            _ => {
                tracing::info!("remote store not configured; running local-only");
                None
            }
        }
    }
}
