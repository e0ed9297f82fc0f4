use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::email::EmailError;
use crate::email::providers::azure::{
    AzureEmailMessage, EmailAddress, SendEmailClient, SendOperationResult, SendPoller, SendStatus,
};

/// Stand-in for the real service: logs each message and reports it sent.
pub struct NullEmailClient;

impl NullEmailClient {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NullEmailClient {
    fn default() -> Self {
        Self::new()
    }
}

fn join_addresses(addresses: &[EmailAddress]) -> String {
    if addresses.is_empty() {
        return "(none)".to_string();
    }
    addresses
        .iter()
        .map(|a| match &a.display_name {
            Some(name) => format!("{} <{}>", name, a.address),
            None => a.address.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl SendEmailClient for NullEmailClient {
    async fn begin_send(
        &self,
        message: AzureEmailMessage,
    ) -> Result<Box<dyn SendPoller>, EmailError> {
        let content = &message.content;
        let body_preview = if content.plain_text.is_empty() {
            content.html.chars().take(200).collect::<String>()
        } else {
            content.plain_text.chars().take(200).collect::<String>()
        };

        // Log the email that would have been sent
        info!(
            "NULL EMAIL CLIENT - Would send email:\n\
             From: {}\n\
             To: {}\n\
             Cc: {}\n\
             Bcc: {}\n\
             Subject: {}\n\
             Attachments: {}\n\
             Body (first 200 chars): {}{}",
            message.sender_address,
            join_addresses(&message.recipients.to),
            join_addresses(&message.recipients.cc),
            join_addresses(&message.recipients.bcc),
            content.subject,
            message.attachments.len(),
            body_preview,
            if body_preview.chars().count() >= 200 { "..." } else { "" }
        );

        tracing::debug!(
            "NULL EMAIL CLIENT - Full email message:\n\
             Text:\n{}\n\nHTML:\n{}",
            content.plain_text,
            content.html
        );

        Ok(Box::new(NullPoller {
            state: SendOperationResult {
                id: Uuid::new_v4().to_string(),
                status: SendStatus::Succeeded,
                error: None,
            },
        }))
    }
}

struct NullPoller {
    state: SendOperationResult,
}

#[async_trait]
impl SendPoller for NullPoller {
    fn operation_state(&self) -> &SendOperationResult {
        &self.state
    }

    async fn poll_until_done(&mut self) -> Result<SendOperationResult, EmailError> {
        Ok(self.state.clone())
    }
}
