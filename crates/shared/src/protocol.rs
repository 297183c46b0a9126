use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PREDICT_PATH: &str = "/api/predict";
pub const BATCH_PREDICT_PATH: &str = "/api/batch-predict";
pub const HEALTH_PATH: &str = "/api/health";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub text: String,
}

impl PredictRequest {
    /// Joins an optional title and the article body with a single space.
    pub fn compose(text: &str, title: Option<&str>) -> Self {
        let text = match title {
            Some(title) if !title.is_empty() => format!("{title} {text}"),
            _ => text.to_string(),
        };
        Self { text }
    }
}

/// Raw classifier verdict. `prediction` is kept as sent; the client
/// normalizes casing and validates it against the known labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_real: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_preview: Option<String>,
}

impl PredictResponse {
    pub fn new(prediction: impl Into<String>, confidence: Option<f64>) -> Self {
        Self {
            prediction: prediction.into(),
            confidence: confidence.map(Value::from),
            is_real: None,
            text_preview: None,
        }
    }

    /// Numeric confidence, if the service sent one.
    pub fn numeric_confidence(&self) -> Option<f64> {
        self.confidence
            .as_ref()
            .and_then(Value::as_f64)
            .filter(|value| value.is_finite())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPredictRequest {
    pub texts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchPredictResponse {
    pub predictions: Vec<PredictResponse>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}
