use serde_json::{Value, json};
use thiserror::Error;

use crate::email::providers::azure::ErrorDetail;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Email configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid email message: {0}")]
    ValidationError(String),

    #[error("Credential error: {0}")]
    CredentialError(String),

    #[error("Email service returned HTTP {status}: {}", optional_message(.error))]
    HttpError {
        status: u16,
        error: Option<ErrorDetail>,
    },

    #[error("Email send failed: {}", detail_message(.0))]
    ProviderError(ErrorDetail),

    #[error("HTTP transport error: {0}")]
    TransportError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

fn detail_message(error: &ErrorDetail) -> &str {
    error.message.as_deref().unwrap_or("Email not sent")
}

fn optional_message(error: &Option<ErrorDetail>) -> &str {
    error.as_ref().map_or("Email not sent", detail_message)
}

/// Error shape handed back to the host. Every failure leaving an adapter is
/// converted into one of these.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status: u16,
    pub data: Option<Value>,
}

impl ApiError {
    pub fn new(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Builds the error for an operation the service reported as failed.
    pub fn from_provider(error: &ErrorDetail, status: u16) -> Self {
        Self::new(detail_message(error), status).with_data(json!({
            "details": error.details,
            "additionalInfo": error.additional_info,
            "code": error.code,
        }))
    }
}

impl From<EmailError> for ApiError {
    fn from(err: EmailError) -> Self {
        match err {
            EmailError::ConfigError(msg) | EmailError::ValidationError(msg) => {
                ApiError::new(msg, 400)
            }
            EmailError::HttpError {
                status,
                error: Some(error),
            } => ApiError::from_provider(&error, status),
            EmailError::HttpError { status, error: None } => {
                ApiError::new(format!("Email service returned HTTP {}", status), status)
            }
            EmailError::ProviderError(error) => ApiError::from_provider(&error, 500),
            other => ApiError::new(other.to_string(), 500),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_is_bad_request() {
        let err: ApiError = EmailError::ValidationError("bad".to_string()).into();
        assert_eq!(err.status, 400);
        assert_eq!(err.message, "bad");
        assert!(err.data.is_none());
    }

    #[test]
    fn test_http_error_keeps_status_and_details() {
        let detail = ErrorDetail {
            code: Some("Unauthorized".to_string()),
            message: Some("Denied by the service".to_string()),
            ..Default::default()
        };
        let err: ApiError = EmailError::HttpError {
            status: 401,
            error: Some(detail),
        }
        .into();

        assert_eq!(err.status, 401);
        assert_eq!(err.message, "Denied by the service");
        assert_eq!(err.data.unwrap()["code"], "Unauthorized");
    }

    #[test]
    fn test_provider_error_without_message_uses_fallback() {
        let err: ApiError = EmailError::ProviderError(ErrorDetail::default()).into();
        assert_eq!(err.status, 500);
        assert_eq!(err.message, "Email not sent");
    }
}
