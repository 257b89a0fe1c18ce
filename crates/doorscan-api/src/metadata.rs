//! Client for the GCE metadata server (project id, region, access tokens).
//!
//! Every Cloud Run instance can reach the metadata server at
//! `metadata.google.internal`; `GCE_METADATA_HOST` overrides the host for
//! local emulators and tests.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};

use doorscan_core::defaults::FALLBACK_PROJECT_ID;
use doorscan_core::{Error, Result};

const METADATA_FLAVOR: &str = "Metadata-Flavor";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

/// OAuth access token for the instance's default service account.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    /// Seconds until expiry
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: String,
}

#[derive(Debug, Clone)]
pub struct MetadataClient {
    http: reqwest::Client,
    base_url: String,
}

impl MetadataClient {
    /// `host` is `host[:port]`, or a full `http://` URL.
    pub fn new(host: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            host.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", host.trim_end_matches('/'))
        };
        Ok(Self { http, base_url })
    }

    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(format!("{}/computeMetadata/v1/{}", self.base_url, path))
            .header(METADATA_FLAVOR, "Google")
    }

    async fn get_text(&self, path: &str) -> Result<String> {
        let response = self.request(path).send().await?;
        if !response.status().is_success() {
            return Err(Error::Request(format!(
                "metadata server returned {} for {}",
                response.status(),
                path
            )));
        }
        Ok(response.text().await?.trim().to_string())
    }

    /// The project the instance runs in.
    pub async fn project_id(&self) -> Result<String> {
        self.get_text("project/project-id").await
    }

    /// `projects/PROJECT_NUMBER/regions/REGION`.
    pub async fn region(&self) -> Result<String> {
        self.get_text("instance/region").await
    }

    /// Fetch a fresh access token for the default service account.
    pub async fn access_token(&self) -> Result<AccessToken> {
        let response = self
            .request("instance/service-accounts/default/token")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::Request(format!(
                "metadata server returned {} for access token",
                response.status()
            )));
        }
        let token: AccessToken = response.json().await?;
        debug!(
            subsystem = "metadata",
            expires_in = token.expires_in,
            "Fetched access token"
        );
        Ok(token)
    }
}

/// Resolve the project id used for trace correlation.
///
/// Order: the configured value, the metadata server, then `"default"`.
pub async fn resolve_project_id(configured: Option<&str>, client: &MetadataClient) -> String {
    if let Some(project) = configured.filter(|p| !p.is_empty()) {
        return project.to_string();
    }
    match client.project_id().await {
        Ok(project) if !project.is_empty() => {
            info!(subsystem = "metadata", project = %project, "Discovered project id");
            project
        }
        Ok(_) => {
            warn!(subsystem = "metadata", "Metadata server returned an empty project id");
            FALLBACK_PROJECT_ID.to_string()
        }
        Err(e) => {
            warn!(
                subsystem = "metadata",
                error = %e,
                "Could not fetch project id for tracing"
            );
            FALLBACK_PROJECT_ID.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_project_id_requires_flavor_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/computeMetadata/v1/project/project-id"))
            .and(header("Metadata-Flavor", "Google"))
            .respond_with(ResponseTemplate::new(200).set_body_string("lbstech-prod\n"))
            .expect(1)
            .mount(&server)
            .await;

        let client = MetadataClient::new(&server.uri()).unwrap();
        assert_eq!(client.project_id().await.unwrap(), "lbstech-prod");
    }

    #[tokio::test]
    async fn test_configured_project_wins() {
        let server = MockServer::start().await;
        let client = MetadataClient::new(&server.uri()).unwrap();
        let project = resolve_project_id(Some("from-env"), &client).await;
        assert_eq!(project, "from-env");
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_falls_back_to_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = MetadataClient::new(&server.uri()).unwrap();
        assert_eq!(resolve_project_id(None, &client).await, FALLBACK_PROJECT_ID);
    }

    #[tokio::test]
    async fn test_access_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(
                "/computeMetadata/v1/instance/service-accounts/default/token",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.token",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .mount(&server)
            .await;

        let client = MetadataClient::new(&server.uri()).unwrap();
        let token = client.access_token().await.unwrap();
        assert_eq!(token.access_token, "ya29.token");
        assert_eq!(token.expires_in, 3599);
    }

    #[test]
    fn test_host_without_scheme() {
        let client = MetadataClient::new("metadata.google.internal").unwrap();
        assert_eq!(client.base_url, "http://metadata.google.internal");
    }
}
