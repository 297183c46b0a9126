use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{
    error::ServiceErrorBody,
    protocol::{
        BatchPredictRequest, BatchPredictResponse, HealthStatus, PredictRequest, PredictResponse,
        BATCH_PREDICT_PATH, HEALTH_PATH, PREDICT_PATH,
    },
};
use tracing::{debug, warn};

use crate::{config::ClientSettings, error::ClassifyError};

pub const MAX_BATCH_TEXTS: usize = 100;

#[async_trait]
pub trait Classifier: Send + Sync {
    /// Issues exactly one classification attempt for `request`.
    async fn classify(&self, request: &PredictRequest) -> Result<PredictResponse, ClassifyError>;
}

#[derive(Debug, Clone)]
pub struct HttpClassifier {
    http: Client,
    base_url: String,
}

impl HttpClassifier {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self::new(settings.api_url.clone())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn health(&self) -> Result<HealthStatus, ClassifyError> {
        let url = self.endpoint(HEALTH_PATH);
        debug!(%url, "checking prediction service health");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(ClassifyError::transport)?;
        decode_response(response).await
    }

    pub async fn classify_batch(
        &self,
        texts: Vec<String>,
    ) -> Result<BatchPredictResponse, ClassifyError> {
        if texts.is_empty() {
            return Err(ClassifyError::InvalidBatch(
                "at least one article is required".to_string(),
            ));
        }
        if texts.len() > MAX_BATCH_TEXTS {
            return Err(ClassifyError::InvalidBatch(format!(
                "at most {MAX_BATCH_TEXTS} articles per batch, got {}",
                texts.len()
            )));
        }

        let url = self.endpoint(BATCH_PREDICT_PATH);
        debug!(%url, count = texts.len(), "submitting batch classification");
        let response = self
            .http
            .post(&url)
            .json(&BatchPredictRequest { texts })
            .send()
            .await
            .map_err(ClassifyError::transport)?;
        decode_response(response).await
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, request: &PredictRequest) -> Result<PredictResponse, ClassifyError> {
        let url = self.endpoint(PREDICT_PATH);
        debug!(%url, chars = request.text.chars().count(), "posting article for classification");
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|err| {
                warn!(%url, "prediction service unreachable: {err}");
                ClassifyError::transport(err)
            })?;
        decode_response(response).await
    }
}

async fn decode_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClassifyError> {
    let status = response.status();
    let body = response.bytes().await.map_err(ClassifyError::transport)?;

    if !status.is_success() {
        let message = ServiceErrorBody::message_from_bytes(&body).unwrap_or_else(|| {
            format!(
                "The prediction service responded with status {}",
                status.as_u16()
            )
        });
        warn!(status = status.as_u16(), %message, "prediction service returned an error");
        return Err(ClassifyError::Application {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_slice(&body).map_err(|err| ClassifyError::MalformedResponse(err.to_string()))
}

#[cfg(test)]
#[path = "tests/classifier_tests.rs"]
mod tests;
