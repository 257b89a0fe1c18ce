//! Public object storage for uploaded files.
//!
//! [`GcsObjectStore`] writes to a Google Cloud Storage bucket through the JSON
//! API, authenticating with the instance service account via the metadata
//! server. [`MemoryObjectStore`] keeps objects in memory for tests and local
//! runs without GCP credentials.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::body::Bytes;
use futures::future::try_join_all;
use tracing::{debug, error, info, instrument};

use doorscan_core::defaults::GCS_PUBLIC_BASE_URL;
use doorscan_core::{Error, Result};

use crate::metadata::MetadataClient;

/// Refresh tokens this long before the metadata server says they expire.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// A file received from a client, ready to store.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Destination for uploaded files.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `file`, make it publicly readable and return its public URL.
    async fn put_public(&self, file: &UploadFile) -> Result<String>;
}

/// Reduce a client-supplied file name to a safe object name: the last path
/// component with control characters removed.
pub fn sanitize_object_name(raw: &str) -> Result<String> {
    let base = raw
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(raw);
    let cleaned: String = base.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim().to_string();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        return Err(Error::InvalidInput(format!("Invalid file name: {:?}", raw)));
    }
    Ok(cleaned)
}

/// Public URL of `name` in `bucket`.
pub fn public_url(base: &str, bucket: &str, name: &str) -> String {
    format!(
        "{}/{}/{}",
        base.trim_end_matches('/'),
        bucket,
        urlencoding::encode(name)
    )
}

/// Upload every file concurrently. Fails as a whole if any upload fails.
pub async fn upload_all(store: &dyn ObjectStore, files: &[UploadFile]) -> Result<Vec<String>> {
    if files.is_empty() {
        error!(subsystem = "storage", "No files to upload.");
        return Err(Error::InvalidInput("No files to upload.".to_string()));
    }

    let start = Instant::now();
    let urls = try_join_all(files.iter().map(|file| store.put_public(file)))
        .await
        .map_err(|e| {
            error!(subsystem = "storage", error = %e, "Failed to upload one or more files.");
            Error::Storage("Failed to upload one or more files.".to_string())
        })?;

    info!(
        subsystem = "storage",
        op = "upload",
        result_count = urls.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Files uploaded"
    );
    Ok(urls)
}

// =============================================================================
// GOOGLE CLOUD STORAGE
// =============================================================================

#[derive(Debug)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Google Cloud Storage bucket accessed through the JSON API.
pub struct GcsObjectStore {
    http: reqwest::Client,
    bucket: String,
    api_base: String,
    public_base: String,
    metadata: MetadataClient,
    token: tokio::sync::Mutex<Option<CachedToken>>,
}

impl GcsObjectStore {
    pub fn new(bucket: impl Into<String>, metadata: MetadataClient) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(120))
                .build()?,
            bucket: bucket.into(),
            api_base: GCS_PUBLIC_BASE_URL.to_string(),
            public_base: GCS_PUBLIC_BASE_URL.to_string(),
            metadata,
            token: tokio::sync::Mutex::new(None),
        })
    }

    /// Point API calls at another endpoint (emulators, tests). Public URLs
    /// keep the `storage.googleapis.com` form.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn bearer_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.metadata.access_token().await?;
        let lifetime = Duration::from_secs(fresh.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        *cached = Some(CachedToken {
            value: fresh.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(fresh.access_token)
    }

    async fn upload(&self, token: &str, file: &UploadFile) -> Result<()> {
        let url = format!(
            "{}/upload/storage/v1/b/{}/o?uploadType=media&name={}",
            self.api_base,
            self.bucket,
            urlencoding::encode(&file.name)
        );
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, &file.content_type)
            .body(file.bytes.clone())
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::Storage(format!(
                "Failed to upload {}: {}",
                file.name,
                response.status()
            )));
        }
        Ok(())
    }

    async fn make_public(&self, token: &str, name: &str) -> Result<()> {
        let url = format!(
            "{}/storage/v1/b/{}/o/{}/acl",
            self.api_base,
            self.bucket,
            urlencoding::encode(name)
        );
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&serde_json::json!({ "entity": "allUsers", "role": "READER" }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::Storage(format!(
                "Failed to make {} public: {}",
                name,
                response.status()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for GcsObjectStore {
    #[instrument(
        skip(self, file),
        fields(subsystem = "storage", component = "gcs", op = "put_public", name = %file.name)
    )]
    async fn put_public(&self, file: &UploadFile) -> Result<String> {
        let token = self.bearer_token().await?;
        self.upload(&token, file).await?;
        self.make_public(&token, &file.name).await?;

        let url = public_url(&self.public_base, &self.bucket, &file.name);
        info!(url = %url, "Uploaded and made public");
        Ok(url)
    }
}

// =============================================================================
// IN-MEMORY
// =============================================================================

/// Object store that keeps uploads in memory.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    bucket: String,
    objects: Mutex<Vec<UploadFile>>,
    fail_on: Option<String>,
}

impl MemoryObjectStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Default::default()
        }
    }

    /// Reject uploads whose name is `name`.
    pub fn failing_on(mut self, name: impl Into<String>) -> Self {
        self.fail_on = Some(name.into());
        self
    }

    /// Names of stored objects, in upload order.
    pub fn object_names(&self) -> Vec<String> {
        self.objects
            .lock()
            .map(|objects| objects.iter().map(|o| o.name.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_public(&self, file: &UploadFile) -> Result<String> {
        if self.fail_on.as_deref() == Some(file.name.as_str()) {
            return Err(Error::Storage(format!("Failed to upload {}.", file.name)));
        }
        self.objects
            .lock()
            .map_err(|_| Error::Internal("object store lock poisoned".to_string()))?
            .push(file.clone());
        debug!(name = %file.name, size = file.bytes.len(), "Stored object in memory");
        Ok(public_url(GCS_PUBLIC_BASE_URL, &self.bucket, &file.name))
    }
}
