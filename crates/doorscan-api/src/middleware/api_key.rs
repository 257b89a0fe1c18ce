//! Static API key check on every protected route.
//!
//! Keys are configured through `DOORSCANNER_API_KEYS`:
//!
//! ```json
//! { "keys": [ { "android": "k1", "ios": "k2" }, { "admin": "k3" } ] }
//! ```
//!
//! Every string value of every object in `keys` is an accepted key; the
//! property names are only labels.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use subtle::ConstantTimeEq;
use tracing::{error, info, warn};

use doorscan_core::{Error, Result};

use crate::AppState;

/// Request header carrying the key.
pub const API_KEY_HEADER: &str = "x-api-key";

const UNAUTHORIZED_MESSAGE: &str = "Invalid or missing API key";

#[derive(Debug, Deserialize)]
struct KeyDocument {
    keys: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// The set of accepted API keys, parsed once at startup.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    keys: Vec<String>,
}

impl ApiKeys {
    /// Parse a `{"keys": [{..}, ..]}` document.
    pub fn from_json(raw: &str) -> Result<Self> {
        let doc: KeyDocument = serde_json::from_str(raw)
            .map_err(|e| Error::Config(format!("DOORSCANNER_API_KEYS is not valid: {}", e)))?;
        let keys = doc
            .keys
            .iter()
            .flat_map(|entry| entry.values())
            .filter_map(|value| value.as_str())
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>();
        Ok(keys.into_iter().collect())
    }

    /// Build from the raw configuration value. A missing or malformed
    /// document yields an empty set, which rejects every request.
    pub fn from_config(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            warn!(subsystem = "auth", "DOORSCANNER_API_KEYS is not set; all requests will be rejected");
            return Self::default();
        };
        match Self::from_json(raw) {
            Ok(keys) => {
                info!(subsystem = "auth", key_count = keys.len(), "Loaded API keys");
                keys
            }
            Err(e) => {
                error!(subsystem = "auth", error = %e, "Error parsing API keys");
                Self::default()
            }
        }
    }

    /// Constant-time membership check. Every configured key is compared.
    pub fn contains(&self, key: &str) -> bool {
        let presented = key.as_bytes();
        self.keys.iter().fold(false, |found, candidate| {
            let matches = candidate.len() == presented.len()
                && bool::from(candidate.as_bytes().ct_eq(presented));
            found | matches
        })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ApiKeys {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut keys: Vec<String> = iter.into_iter().map(Into::into).collect();
        keys.sort();
        keys.dedup();
        Self { keys }
    }
}

/// Reject requests without a configured `x-api-key`.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|key| state.api_keys.contains(key));

    if authorized {
        return next.run(request).await;
    }

    warn!(
        subsystem = "auth",
        path = %request.uri().path(),
        "Rejected request with invalid or missing API key"
    );
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({ "message": UNAUTHORIZED_MESSAGE })),
    )
        .into_response()
}
