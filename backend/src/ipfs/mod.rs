//! IPFS content store client over the Kubo RPC API.
//!
//! The service owns an optional inner HTTP client with an explicit
//! `initialize`/`stop` lifecycle: `initialize` is idempotent, `stop` releases
//! the client and resets state so a later `initialize` starts clean, and the
//! file operations lazily initialize when needed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

/// Candidate public gateways; the first one is reported as the primary URL.
pub const GATEWAY_PREFIXES: [&str; 3] = [
    "https://ipfs.io/ipfs/",
    "https://w3s.link/ipfs/",
    "https://dweb.link/ipfs/",
];

#[derive(Debug, Error)]
pub enum IpfsError {
    #[error("IPFS transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("IPFS API error: {0}")]
    Api(String),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IpfsUploadResult {
    pub cid: String,
    pub size: u64,
    pub mime_type: String,
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
    pub gateway_url: String,
}

/// Content-store seam used by request handlers; tests substitute a mock.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn upload_file(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        mime_type: &str,
    ) -> Result<IpfsUploadResult, IpfsError>;

    async fn get_file(&self, cid: &str) -> Result<Vec<u8>, IpfsError>;
}

pub struct IpfsService {
    api_url: String,
    inner: RwLock<Option<reqwest::Client>>,
}

#[derive(Debug, Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

impl IpfsService {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            inner: RwLock::new(None),
        }
    }

    /// Idempotent; a second call while initialized is a no-op.
    pub async fn initialize(&self) -> Result<(), IpfsError> {
        let mut guard = self.inner.write().await;
        if guard.is_some() {
            log::info!("IPFS client already initialized");
            return Ok(());
        }
        log::info!("Initializing IPFS client for {}", self.api_url);
        *guard = Some(reqwest::Client::new());
        Ok(())
    }

    pub async fn is_initialized(&self) -> bool {
        self.inner.read().await.is_some()
    }

    /// Releases the underlying client; a later `initialize` starts clean.
    pub async fn stop(&self) {
        let mut guard = self.inner.write().await;
        if guard.take().is_some() {
            log::info!("IPFS client stopped");
        }
    }

    async fn client(&self) -> Result<reqwest::Client, IpfsError> {
        {
            let guard = self.inner.read().await;
            if let Some(client) = guard.as_ref() {
                return Ok(client.clone());
            }
        }
        self.initialize().await?;
        let guard = self.inner.read().await;
        guard
            .as_ref()
            .cloned()
            .ok_or_else(|| IpfsError::Api("client initialization raced with shutdown".to_string()))
    }
}

#[async_trait]
impl FileStore for IpfsService {
    async fn upload_file(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        mime_type: &str,
    ) -> Result<IpfsUploadResult, IpfsError> {
        let client = self.client().await?;
        let size = bytes.len() as u64;
        log::info!("Uploading {} ({} bytes) to IPFS", filename, size);

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mime_type)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = client
            .post(format!("{}/api/v0/add?cid-version=1&pin=true", self.api_url))
            .multipart(form)
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(IpfsError::Api(format!("add returned {}: {}", status, detail)));
        }

        let added: AddResponse = response.json().await?;
        let urls = gateway_urls(&added.hash);
        log::info!("Uploaded to IPFS: cid={} gateway={}", added.hash, urls[0]);

        Ok(IpfsUploadResult {
            cid: added.hash,
            size,
            mime_type: mime_type.to_string(),
            filename: filename.to_string(),
            uploaded_at: Utc::now(),
            gateway_url: urls.into_iter().next().unwrap_or_default(),
        })
    }

    async fn get_file(&self, cid: &str) -> Result<Vec<u8>, IpfsError> {
        let client = self.client().await?;
        log::info!("Fetching {} from IPFS", cid);

        let response = client
            .post(format!("{}/api/v0/cat?arg={}", self.api_url, cid))
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(IpfsError::Api(format!("cat returned {}: {}", status, detail)));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Gateway URLs for a CID, one per known gateway prefix, primary first.
pub fn gateway_urls(cid: &str) -> Vec<String> {
    GATEWAY_PREFIXES
        .iter()
        .map(|prefix| format!("{}{}", prefix, cid))
        .collect()
}
