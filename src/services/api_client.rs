//! HTTP client for the classification service.
//!
//! Two calls, both answering with the same result shape:
//! - `POST /predict`: multipart upload of the photo in a `file` field
//! - `POST /update`: JSON `{id, product}` replacing the label of a result

use crate::config::ClientConfig;
use crate::error::ErrorKind;
use crate::models::prediction_types::{parse_prediction, PredictionResult, UpdateRequest};
use crate::services::capture_service::CapturedImage;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use thiserror::Error;

const USER_AGENT: &str = concat!("eco-capture/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ClientError {
    /// Could not reach the service, or the request timed out.
    #[error("Network error: {0}")]
    Transport(String),

    /// Service answered with a non-success status.
    #[error("Service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Body was not a valid result.
    #[error("Malformed response: {0}")]
    Payload(String),

    /// Another request is still in flight for this session.
    #[error("A request is already in progress")]
    Busy,

    /// A correction was asked for before any result exists.
    #[error("There is no result to correct")]
    NoResult,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Transport(_) | ClientError::Status { .. } => ErrorKind::Transport,
            ClientError::Payload(_) => ErrorKind::Payload,
            ClientError::Busy | ClientError::NoResult => ErrorKind::State,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Payload(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

/// The remote classifier as the session sees it.
#[async_trait]
pub trait ClassifierApi: Send + Sync {
    async fn predict(&self, image: &CapturedImage) -> Result<PredictionResult, ClientError>;

    async fn update(&self, id: &str, product: &str) -> Result<PredictionResult, ClientError>;
}

pub struct HttpClassifierApi {
    http_client: reqwest::Client,
    config: ClientConfig,
}

impl HttpClassifierApi {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(Self { http_client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn read_result(&self, response: reqwest::Response) -> Result<PredictionResult, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let body = response.bytes().await?;
        parse_prediction(&body).map_err(ClientError::Payload)
    }
}

#[async_trait]
impl ClassifierApi for HttpClassifierApi {
    async fn predict(&self, image: &CapturedImage) -> Result<PredictionResult, ClientError> {
        let url = self.config.endpoint("predict");
        tracing::info!(url = %url, file = %image.file_name, size = image.bytes.len(), "Uploading image for classification");

        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(image.mime)
            .map_err(|e| ClientError::Transport(format!("invalid image mime {}: {}", image.mime, e)))?;
        let form = Form::new().part("file", part);

        let response = self.http_client.post(&url).multipart(form).send().await?;
        let result = self.read_result(response).await;

        match &result {
            Ok(r) => tracing::info!(id = %r.id, product = %r.product, "Classification received"),
            Err(e) => tracing::warn!(error = %e, "Classification failed"),
        }
        result
    }

    async fn update(&self, id: &str, product: &str) -> Result<PredictionResult, ClientError> {
        let url = self.config.endpoint("update");
        tracing::info!(url = %url, id = %id, product = %product, "Submitting product correction");

        let response = self
            .http_client
            .post(&url)
            .json(&UpdateRequest { id, product })
            .send()
            .await?;
        let result = self.read_result(response).await;

        match &result {
            Ok(r) => tracing::info!(id = %r.id, product = %r.product, "Correction accepted"),
            Err(e) => tracing::warn!(error = %e, "Correction failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_follow_taxonomy() {
        assert_eq!(ClientError::Transport("down".into()).kind(), ErrorKind::Transport);
        assert_eq!(
            ClientError::Status {
                status: 500,
                body: String::new()
            }
            .kind(),
            ErrorKind::Transport
        );
        assert_eq!(ClientError::Payload("bad".into()).kind(), ErrorKind::Payload);
        assert_eq!(ClientError::Busy.kind(), ErrorKind::State);
    }

    #[test]
    fn builds_with_custom_base() {
        let config = ClientConfig::new("http://127.0.0.1:9/").unwrap();
        let api = HttpClassifierApi::new(config).unwrap();
        assert_eq!(api.config().endpoint("predict"), "http://127.0.0.1:9/predict");
    }
}
