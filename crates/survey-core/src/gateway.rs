//! Contract for the remote spreadsheet endpoint.
//!
//! The gateway is the system of record. It offers exactly two operations and
//! no retry, backoff, or idempotency guarantee: each user action makes at
//! most one attempt.

use async_trait::async_trait;

use crate::form::Submission;
use crate::record::SurveyRecord;

/// Failures talking to the gateway.
#[derive(Clone, Debug, thiserror::Error)]
pub enum GatewayError {
    /// The endpoint could not be reached.
    #[error("network error: {0}")]
    Transport(String),
    /// The endpoint answered with a non-success HTTP status.
    #[error("server error {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },
    /// The body was not the JSON shape the operation expects.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    /// The endpoint processed the request and reported a non-success result.
    #[error("{}", rejected_message(.result, .error.as_deref()))]
    Rejected {
        /// Value of the `result` field.
        result: String,
        /// Value of the `error` field, when present.
        error: Option<String>,
    },
}

fn rejected_message(result: &str, error: Option<&str>) -> String {
    match error {
        Some(e) => format!("gateway rejected submission ({result}): {e}"),
        None => format!("gateway rejected submission ({result})"),
    }
}

impl GatewayError {
    /// Whether the failure happened before a usable response arrived.
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }

    /// Short classification string for logging.
    pub const fn error_kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Status { .. } => "status",
            Self::MalformedResponse(_) => "malformed_response",
            Self::Rejected { .. } => "rejected",
        }
    }

    /// Message shown to the user for a failed submission.
    pub fn submit_notice(&self) -> String {
        match self {
            Self::Rejected { error, .. } => format!(
                "An error occurred: {}",
                error.as_deref().unwrap_or("unknown error")
            ),
            _ => "An error occurred while saving.".to_string(),
        }
    }
}

/// Remote store of survey records.
#[async_trait]
pub trait SurveyGateway: Send + Sync {
    /// Submit one record. Succeeds only when the endpoint reports
    /// `result: "success"`; there is no partial success.
    async fn submit(&self, submission: &Submission) -> Result<(), GatewayError>;

    /// Fetch every stored record. The response must be a JSON array.
    async fn fetch_all(&self) -> Result<Vec<SurveyRecord>, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_classification() {
        assert!(GatewayError::Transport("refused".into()).is_transport());
        assert!(GatewayError::Status { status: 502, body: String::new() }.is_transport());
        assert!(!GatewayError::MalformedResponse("html".into()).is_transport());
        assert!(
            !GatewayError::Rejected { result: "error".into(), error: None }.is_transport()
        );
    }

    #[test]
    fn error_kind_strings() {
        assert_eq!(GatewayError::Transport(String::new()).error_kind(), "transport");
        assert_eq!(
            GatewayError::MalformedResponse(String::new()).error_kind(),
            "malformed_response"
        );
    }

    #[test]
    fn rejected_display() {
        let err = GatewayError::Rejected {
            result: "error".into(),
            error: Some("Sheet locked".into()),
        };
        assert_eq!(err.to_string(), "gateway rejected submission (error): Sheet locked");
        assert_eq!(err.submit_notice(), "An error occurred: Sheet locked");
    }

    #[test]
    fn transport_notice_is_generic() {
        let err = GatewayError::Transport("dns".into());
        assert_eq!(err.submit_notice(), "An error occurred while saving.");
    }
}
