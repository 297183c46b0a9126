//! Turns raw classifier verdicts into display-ready `Prediction` records.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{
    domain::{Label, PredictionId},
    protocol::{BatchPredictResponse, PredictResponse},
};

use crate::error::ClassifyError;

pub const DEFAULT_CONFIDENCE: f64 = 0.85;
pub const PREVIEW_CHARS: usize = 150;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub id: PredictionId,
    /// Leading slice of the submitted body, kept for previews only.
    pub source_text: String,
    pub label: Label,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
}

impl Prediction {
    pub fn confidence_percent(&self, scale: f64) -> u8 {
        confidence_percent(self.confidence, scale)
    }
}

/// Rescales a raw score into a whole percentage clamped to 0..=100.
pub fn confidence_percent(confidence: f64, scale: f64) -> u8 {
    if !scale.is_finite() || scale <= 0.0 || !confidence.is_finite() {
        return 0;
    }
    ((confidence / scale) * 100.0).round().clamp(0.0, 100.0) as u8
}

pub fn normalize(raw: &PredictResponse, original_text: &str) -> Result<Prediction, ClassifyError> {
    normalize_at(raw, original_text, Utc::now())
}

pub fn normalize_at(
    raw: &PredictResponse,
    original_text: &str,
    now: DateTime<Utc>,
) -> Result<Prediction, ClassifyError> {
    let label = raw
        .prediction
        .parse::<Label>()
        .map_err(|err| ClassifyError::MalformedResponse(err.to_string()))?;
    if let Some(is_real) = raw.is_real {
        if is_real != label.is_real() {
            return Err(ClassifyError::MalformedResponse(format!(
                "label '{}' contradicts is_real={is_real}",
                raw.prediction
            )));
        }
    }

    Ok(Prediction {
        id: next_prediction_id(now),
        source_text: preview(original_text),
        label,
        confidence: raw.numeric_confidence().unwrap_or(DEFAULT_CONFIDENCE),
        created_at: now,
    })
}

/// Pairs each batch verdict with the text it was computed for.
pub fn normalize_batch(
    batch: &BatchPredictResponse,
    texts: &[String],
) -> Result<Vec<Prediction>, ClassifyError> {
    if batch.predictions.len() != texts.len() {
        return Err(ClassifyError::MalformedResponse(format!(
            "expected {} predictions, got {}",
            texts.len(),
            batch.predictions.len()
        )));
    }

    let now = Utc::now();
    batch
        .predictions
        .iter()
        .zip(texts)
        .map(|(raw, text)| normalize_at(raw, text, now))
        .collect()
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

// Millisecond timestamps, bumped past the last issued id so two records
// created in the same millisecond never share one.
fn next_prediction_id(now: DateTime<Utc>) -> PredictionId {
    static LAST_ID: AtomicI64 = AtomicI64::new(0);

    let candidate = now.timestamp_millis();
    let previous = LAST_ID
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
            Some(candidate.max(last + 1))
        })
        .unwrap_or_else(|last| last);
    PredictionId(candidate.max(previous + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_cases_label_and_defaults_confidence() {
        let raw = PredictResponse::new("FAKE", None);
        let prediction = normalize(&raw, "Moon landing staged").expect("normalize");
        assert_eq!(prediction.label, Label::Fake);
        assert_eq!(prediction.label.as_str(), "fake");
        assert_eq!(prediction.confidence, 0.85);
    }

    #[test]
    fn keeps_reported_confidence() {
        let raw = PredictResponse::new("Real", Some(2.7));
        let prediction = normalize(&raw, "Scientists confirm water is wet").expect("normalize");
        assert_eq!(prediction.label, Label::Real);
        assert_eq!(prediction.confidence, 2.7);
    }

    #[test]
    fn non_numeric_confidence_falls_back_to_default() {
        let raw: PredictResponse =
            serde_json::from_str(r#"{"prediction":"real","confidence":null}"#).expect("parse");
        assert_eq!(normalize(&raw, "x").expect("normalize").confidence, 0.85);
    }

    #[test]
    fn unknown_label_is_malformed() {
        let raw = PredictResponse::new("satire", Some(1.0));
        let err = normalize(&raw, "text").expect_err("must fail");
        assert!(matches!(err, ClassifyError::MalformedResponse(_)));
    }

    #[test]
    fn contradictory_is_real_flag_is_malformed() {
        let mut raw = PredictResponse::new("Fake", Some(1.0));
        raw.is_real = Some(true);
        assert!(matches!(
            normalize(&raw, "text"),
            Err(ClassifyError::MalformedResponse(_))
        ));

        raw.is_real = Some(false);
        assert_eq!(normalize(&raw, "text").expect("consistent").label, Label::Fake);
    }

    #[test]
    fn preview_is_a_character_slice() {
        let long = "é".repeat(200);
        let prediction =
            normalize(&PredictResponse::new("real", None), &long).expect("normalize");
        assert_eq!(prediction.source_text.chars().count(), PREVIEW_CHARS);

        let short = normalize(&PredictResponse::new("real", None), "short").expect("normalize");
        assert_eq!(short.source_text, "short");
    }

    #[test]
    fn ids_are_strictly_increasing_within_one_instant() {
        let now = Utc::now();
        let raw = PredictResponse::new("real", None);
        let first = normalize_at(&raw, "a", now).expect("first");
        let second = normalize_at(&raw, "b", now).expect("second");
        assert!(second.id > first.id);
        assert_eq!(first.created_at, second.created_at);
    }

    #[test]
    fn batch_length_mismatch_is_malformed() {
        let batch = BatchPredictResponse {
            predictions: vec![PredictResponse::new("real", None)],
            count: 1,
        };
        let texts = vec!["a".to_string(), "b".to_string()];
        assert!(matches!(
            normalize_batch(&batch, &texts),
            Err(ClassifyError::MalformedResponse(_))
        ));
    }

    #[test]
    fn percent_uses_scale_and_clamps() {
        assert_eq!(confidence_percent(2.7, 3.0), 90);
        assert_eq!(confidence_percent(0.85, 1.0), 85);
        assert_eq!(confidence_percent(4.2, 3.0), 100);
        assert_eq!(confidence_percent(1.0, 0.0), 0);
    }
}
