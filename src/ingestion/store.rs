//! Remote object stores the raw dataset is fetched from

use crate::error::{PipelineError, Result};
use reqwest::StatusCode;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Environment variable holding an OAuth access token for GCS
pub const GCS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

const DOWNLOAD_TIMEOUT_SECS: u64 = 300;

/// Something that can copy a named object from a bucket into a local file
pub trait ObjectStore: Send + Sync {
    /// Download `bucket/object` to `dest`, replacing it if present
    fn fetch(&self, bucket: &str, object: &str, dest: &Path)
        -> impl Future<Output = Result<()>> + Send;
}

/// Google Cloud Storage over the JSON API
#[derive(Debug, Clone)]
pub struct GcsStore {
    client: reqwest::Client,
    endpoint: Url,
    token: Option<String>,
}

impl GcsStore {
    /// Create a store talking to `endpoint`
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| PipelineError::ConfigError(format!("Invalid endpoint {endpoint}: {e}")))?;
        if endpoint.cannot_be_a_base() {
            return Err(PipelineError::ConfigError(format!(
                "Endpoint {endpoint} cannot carry a path"
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
            .build()
            .map_err(|e| PipelineError::ConfigError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            token: None,
        })
    }

    /// Create a store and pick up the access token from the environment
    pub fn from_env(endpoint: &str) -> Result<Self> {
        let store = Self::new(endpoint)?;
        Ok(match std::env::var(GCS_TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => store.with_token(token.trim()),
            _ => store,
        })
    }

    /// Authenticate requests with a bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Media download URL for `bucket/object`
    pub fn object_url(&self, bucket: &str, object: &str) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| PipelineError::ConfigError(format!("Endpoint {} cannot carry a path", self.endpoint)))?
            .pop_if_empty()
            .extend(["storage", "v1", "b", bucket, "o", object]);
        url.query_pairs_mut().append_pair("alt", "media");
        Ok(url)
    }
}

impl ObjectStore for GcsStore {
    async fn fetch(&self, bucket: &str, object: &str, dest: &Path) -> Result<()> {
        let url = self.object_url(bucket, object)?;
        info!(url = %url, "Downloading object");

        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| PipelineError::TransferError {
            object: object.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(PipelineError::ObjectNotFound {
                bucket: bucket.to_string(),
                object: object.to_string(),
            });
        }
        if !status.is_success() {
            return Err(PipelineError::TransferError {
                object: object.to_string(),
                reason: format!(
                    "HTTP error {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                ),
            });
        }

        let bytes = response.bytes().await.map_err(|e| PipelineError::TransferError {
            object: object.to_string(),
            reason: format!("Failed to read response body: {e}"),
        })?;
        tokio::fs::write(dest, &bytes).await?;

        debug!(size_bytes = bytes.len(), dest = %dest.display(), "Object written");
        Ok(())
    }
}

/// Local directory laid out as `<root>/<bucket>/<object>`
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path an object would have in this mirror
    pub fn object_path(&self, bucket: &str, object: &str) -> PathBuf {
        self.root.join(bucket).join(object)
    }
}

impl ObjectStore for LocalStore {
    async fn fetch(&self, bucket: &str, object: &str, dest: &Path) -> Result<()> {
        let source = self.object_path(bucket, object);
        if !tokio::fs::try_exists(&source).await? {
            return Err(PipelineError::ObjectNotFound {
                bucket: bucket.to_string(),
                object: object.to_string(),
            });
        }

        let copied = tokio::fs::copy(&source, dest)
            .await
            .map_err(|e| PipelineError::TransferError {
                object: object.to_string(),
                reason: e.to_string(),
            })?;

        debug!(size_bytes = copied, source = %source.display(), "Object copied");
        Ok(())
    }
}

/// Store selected from the configured endpoint
#[derive(Debug, Clone)]
pub enum AnyStore {
    Gcs(GcsStore),
    Local(LocalStore),
}

impl ObjectStore for AnyStore {
    async fn fetch(&self, bucket: &str, object: &str, dest: &Path) -> Result<()> {
        match self {
            AnyStore::Gcs(store) => store.fetch(bucket, object, dest).await,
            AnyStore::Local(store) => store.fetch(bucket, object, dest).await,
        }
    }
}

/// `file://` endpoints map to a [`LocalStore`], `http(s)://` to a [`GcsStore`]
pub fn store_from_endpoint(endpoint: &str) -> Result<AnyStore> {
    let url = Url::parse(endpoint)
        .map_err(|e| PipelineError::ConfigError(format!("Invalid endpoint {endpoint}: {e}")))?;

    match url.scheme() {
        "file" => {
            let root = url.to_file_path().map_err(|_| {
                PipelineError::ConfigError(format!("Endpoint {endpoint} is not a local path"))
            })?;
            Ok(AnyStore::Local(LocalStore::new(root)))
        }
        "http" | "https" => Ok(AnyStore::Gcs(GcsStore::from_env(endpoint)?)),
        scheme => Err(PipelineError::ConfigError(format!(
            "Unsupported endpoint scheme: '{scheme}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url_encodes_object_name() {
        let store = GcsStore::new("https://storage.googleapis.com").unwrap();
        let url = store.object_url("my-bucket", "data/Hotel Reservations.csv").unwrap();

        assert_eq!(
            url.as_str(),
            "https://storage.googleapis.com/storage/v1/b/my-bucket/o/data%2FHotel%20Reservations.csv?alt=media"
        );
    }

    #[test]
    fn test_object_url_keeps_endpoint_prefix() {
        let store = GcsStore::new("http://localhost:4443/gcs/").unwrap();
        let url = store.object_url("b", "raw.csv").unwrap();
        assert_eq!(url.as_str(), "http://localhost:4443/gcs/storage/v1/b/b/o/raw.csv?alt=media");
    }

    #[test]
    fn test_invalid_endpoint() {
        assert!(matches!(
            GcsStore::new("not a url"),
            Err(PipelineError::ConfigError(_))
        ));
        assert!(matches!(
            store_from_endpoint("ftp://example.com"),
            Err(PipelineError::ConfigError(_))
        ));
    }

    #[test]
    fn test_store_from_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let endpoint = Url::from_directory_path(dir.path()).unwrap();

        assert!(matches!(store_from_endpoint(endpoint.as_str()).unwrap(), AnyStore::Local(_)));
        assert!(matches!(
            store_from_endpoint("https://storage.googleapis.com").unwrap(),
            AnyStore::Gcs(_)
        ));
    }

    #[tokio::test]
    async fn test_local_store_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        let source = store.object_path("bucket", "raw.csv");
        std::fs::create_dir_all(source.parent().unwrap()).unwrap();
        std::fs::write(&source, "a,b\n1,2\n").unwrap();

        let dest = dir.path().join("copy.csv");
        store.fetch("bucket", "raw.csv", &dest).await.unwrap();
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "a,b\n1,2\n");
    }

    #[tokio::test]
    async fn test_local_store_missing_object() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        let err = store
            .fetch("bucket", "absent.csv", &dir.path().join("out.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::ObjectNotFound { .. }));
    }
}
