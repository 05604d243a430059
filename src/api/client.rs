//! The three calls a submission makes, behind the `PrintApi` trait.

use super::models::{JobLogRequest, UploadCredentials};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(StatusCode),
    #[error("invalid URL '{0}'")]
    InvalidUrl(String),
    #[error("malformed response: {0}")]
    Decode(String),
}

/// Remote print API plus the object store behind its pre-signed URLs.
#[async_trait]
pub trait PrintApi: Send + Sync {
    /// `GET <endpoint>?fileName=..&fileType=..`
    async fn request_upload(&self, file_name: &str, file_type: &str) -> Result<UploadCredentials, ApiError>;

    /// `PUT <upload_url>` with the raw document.
    async fn upload_object(&self, upload_url: &str, media_type: &str, content: &[u8]) -> Result<(), ApiError>;

    /// `POST <endpoint>` with the job payload. Returns the raw response body.
    async fn log_job(&self, request: &JobLogRequest) -> Result<String, ApiError>;
}

/// `PrintApi` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpPrintApi {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpPrintApi {
    pub fn new(endpoint: &str) -> Result<Self, ApiError> {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: &str) -> Result<Self, ApiError> {
        let endpoint = Url::parse(endpoint).map_err(|_| ApiError::InvalidUrl(endpoint.to_string()))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn credential_url(&self, file_name: &str, file_type: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("fileName", file_name)
            .append_pair("fileType", file_type);
        url
    }
}

fn ensure_success(response: &reqwest::Response) -> Result<(), ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(ApiError::Status(status))
    }
}

#[async_trait]
impl PrintApi for HttpPrintApi {
    async fn request_upload(&self, file_name: &str, file_type: &str) -> Result<UploadCredentials, ApiError> {
        let url = self.credential_url(file_name, file_type);
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        ensure_success(&response)?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn upload_object(&self, upload_url: &str, media_type: &str, content: &[u8]) -> Result<(), ApiError> {
        let url = Url::parse(upload_url).map_err(|_| ApiError::InvalidUrl(upload_url.to_string()))?;
        tracing::debug!("PUT {} bytes to {}", content.len(), url.path());
        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, media_type)
            .body(content.to_vec())
            .send()
            .await?;
        ensure_success(&response)
    }

    async fn log_job(&self, request: &JobLogRequest) -> Result<String, ApiError> {
        tracing::debug!("POST {} for {}", self.endpoint, request.file_name);
        let response = self.client.post(self.endpoint.clone()).json(request).send().await?;
        ensure_success(&response)?;
        Ok(response.text().await?)
    }
}
