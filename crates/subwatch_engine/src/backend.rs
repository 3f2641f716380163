use std::time::Duration;

use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use subwatch_core::{Item, StatusSnapshot};
use subwatch_logging::{watch_debug, watch_trace};
use url::Url;

use crate::wire::{ScanResponse, StatusResponse};
use crate::{BackendError, FailureKind};

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/".to_string(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(15),
            max_bytes: 4 * 1024 * 1024,
        }
    }
}

/// The scan/download job service. Calls are never retried here; a failure is
/// reported back to the state machine as-is.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn scan(&self) -> Result<Vec<Item>, BackendError>;

    async fn start_download(&self) -> Result<(), BackendError>;

    async fn status(&self) -> Result<StatusSnapshot, BackendError>;
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    settings: BackendSettings,
    base: Url,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, BackendError> {
        let base = parse_base(&settings.base_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| BackendError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            base,
            client,
        })
    }

    fn endpoint(&self, name: &str) -> Result<Url, BackendError> {
        self.base
            .join(name)
            .map_err(|err| BackendError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, name: &str) -> Result<T, BackendError> {
        let url = self.endpoint(name)?;
        watch_trace!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = self.read_body(check_status(response)?).await?;
        serde_json::from_slice(&body)
            .map_err(|err| BackendError::new(FailureKind::Decode, err.to_string()))
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, BackendError> {
        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, Some(content_len)));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, Some(next_len)));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl Backend for HttpBackend {
    async fn scan(&self) -> Result<Vec<Item>, BackendError> {
        let response: ScanResponse = self.get_json("scan").await?;
        let items = response.into_items();
        watch_debug!("scan returned {} items", items.len());
        Ok(items)
    }

    async fn start_download(&self) -> Result<(), BackendError> {
        let url = self.endpoint("download")?;
        watch_trace!("POST {}", url);
        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        // Body carries nothing the controller needs.
        check_status(response).map(|_| ())
    }

    async fn status(&self) -> Result<StatusSnapshot, BackendError> {
        let response: StatusResponse = self.get_json("status").await?;
        Ok(response.into_snapshot())
    }
}

/// Endpoints are joined relative to the base, so its path must end in `/`.
fn parse_base(raw: &str) -> Result<Url, BackendError> {
    let mut base =
        Url::parse(raw).map_err(|err| BackendError::new(FailureKind::InvalidUrl, err.to_string()))?;
    if base.cannot_be_a_base() {
        return Err(BackendError::new(
            FailureKind::InvalidUrl,
            format!("{raw} cannot be used as a base url"),
        ));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(BackendError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ))
    }
}

fn too_large(max_bytes: u64, actual: Option<u64>) -> BackendError {
    BackendError::new(
        FailureKind::TooLarge { max_bytes, actual },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        return BackendError::new(FailureKind::Timeout, err.to_string());
    }
    BackendError::new(FailureKind::Network, err.to_string())
}
