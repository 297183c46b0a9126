use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Rejected locally before any network traffic.
    Validation,
    Transport,
    Application,
    MalformedResponse,
}

/// Error payload returned by the classification service on non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceErrorBody {
    pub error: String,
}

impl ServiceErrorBody {
    /// Parses an error body, ignoring blank messages.
    pub fn message_from_bytes(body: &[u8]) -> Option<String> {
        let parsed: ServiceErrorBody = serde_json::from_slice(body).ok()?;
        let message = parsed.error.trim();
        if message.is_empty() {
            None
        } else {
            Some(parsed.error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_service_message() {
        assert_eq!(
            ServiceErrorBody::message_from_bytes(br#"{"error":"text too short"}"#),
            Some("text too short".to_string())
        );
    }

    #[test]
    fn ignores_missing_or_blank_message() {
        assert_eq!(ServiceErrorBody::message_from_bytes(b"<html>"), None);
        assert_eq!(ServiceErrorBody::message_from_bytes(br#"{"error":"  "}"#), None);
        assert_eq!(ServiceErrorBody::message_from_bytes(br#"{"detail":"x"}"#), None);
    }
}
