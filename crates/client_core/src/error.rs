use shared::error::FailureKind;
use thiserror::Error;

pub const VALIDATION_MESSAGE: &str = "Please enter an article to analyze";
pub const TRANSPORT_MESSAGE: &str =
    "Failed to connect to the prediction service. Make sure the backend is running.";
pub const MALFORMED_RESPONSE_MESSAGE: &str =
    "The prediction service returned an unexpected response";

/// Failure of a single classifier round trip.
#[derive(Debug, Clone, Error)]
pub enum ClassifyError {
    #[error("prediction service unreachable: {detail}")]
    Transport { detail: String },
    #[error("prediction service rejected the request (status {status}): {message}")]
    Application { status: u16, message: String },
    #[error("malformed prediction response: {0}")]
    MalformedResponse(String),
    #[error("invalid batch: {0}")]
    InvalidBatch(String),
}

impl ClassifyError {
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        Self::Transport {
            detail: err.to_string(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport { .. } => FailureKind::Transport,
            Self::Application { .. } => FailureKind::Application,
            Self::MalformedResponse(_) => FailureKind::MalformedResponse,
            Self::InvalidBatch(_) => FailureKind::Validation,
        }
    }

    /// Message suitable for an error banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport { .. } => TRANSPORT_MESSAGE.to_string(),
            Self::Application { message, .. } => message.clone(),
            Self::MalformedResponse(_) => MALFORMED_RESPONSE_MESSAGE.to_string(),
            Self::InvalidBatch(reason) => reason.clone(),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum WorkflowError {
    #[error("{}", VALIDATION_MESSAGE)]
    EmptyArticle,
    #[error(transparent)]
    Classify(#[from] ClassifyError),
}

impl WorkflowError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::EmptyArticle => FailureKind::Validation,
            Self::Classify(err) => err.kind(),
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyArticle => VALIDATION_MESSAGE.to_string(),
            Self::Classify(err) => err.user_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_errors_surface_service_message_verbatim() {
        let err = ClassifyError::Application {
            status: 400,
            message: "text too short".to_string(),
        };
        assert_eq!(err.kind(), FailureKind::Application);
        assert_eq!(err.user_message(), "text too short");
    }

    #[test]
    fn transport_errors_hide_low_level_detail() {
        let err = ClassifyError::Transport {
            detail: "tcp connect error: Connection refused".to_string(),
        };
        assert_eq!(err.user_message(), TRANSPORT_MESSAGE);
        assert!(err.to_string().contains("Connection refused"));
    }

    #[test]
    fn empty_article_is_a_local_failure() {
        let err = WorkflowError::EmptyArticle;
        assert_eq!(err.kind(), FailureKind::Validation);
        assert_eq!(err.to_string(), VALIDATION_MESSAGE);
    }
}
