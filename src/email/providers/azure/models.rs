//! Wire types for the Communication Services Email REST API.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureEmailMessage {
    pub sender_address: String,
    pub content: EmailContent,
    pub recipients: EmailRecipients,
    pub attachments: Vec<EmailAttachment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reply_to: Vec<EmailAddress>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailContent {
    pub subject: String,
    pub plain_text: String,
    pub html: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmailRecipients {
    pub to: Vec<EmailAddress>,
    pub cc: Vec<EmailAddress>,
    pub bcc: Vec<EmailAddress>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAddress {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAttachment {
    pub name: String,
    pub content_type: String,
    pub content_in_base64: String,
}

/// Status of a send operation, as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SendStatus {
    NotStarted,
    Running,
    Succeeded,
    Failed,
    Canceled,
}

impl SendStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SendStatus::Succeeded | SendStatus::Failed | SendStatus::Canceled
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendOperationResult {
    pub id: String,
    pub status: SendStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ErrorDetail>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<Vec<ErrorAdditionalInfo>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorAdditionalInfo {
    #[serde(rename = "type")]
    pub info_type: String,
    #[serde(default)]
    pub info: serde_json::Value,
}

/// Body of a non-2xx response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_result_with_error() {
        let body = r#"{
            "id": "op-1",
            "status": "Failed",
            "error": {
                "code": "EmailDroppedAllRecipientsSuppressed",
                "message": "Message was dropped",
                "additionalInfo": [{"type": "Suppression", "info": {"count": 1}}]
            }
        }"#;
        let result: SendOperationResult = serde_json::from_str(body).unwrap();

        assert_eq!(result.status, SendStatus::Failed);
        let error = result.error.unwrap();
        assert_eq!(error.code.as_deref(), Some("EmailDroppedAllRecipientsSuppressed"));
        assert_eq!(error.additional_info.unwrap()[0].info_type, "Suppression");
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!SendStatus::NotStarted.is_terminal());
        assert!(!SendStatus::Running.is_terminal());
        assert!(SendStatus::Succeeded.is_terminal());
        assert!(SendStatus::Failed.is_terminal());
        assert!(SendStatus::Canceled.is_terminal());
    }
}
