use base64::{Engine, engine::general_purpose};
use tracing::debug;

use super::models::{
    AzureEmailMessage, EmailAddress, EmailAttachment, EmailContent, EmailRecipients,
};
use crate::email::{
    AddressInput, Attachment, AttachmentContent, EmailError, Recipients, SendEmailOptions,
};

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Translates a host message into the request body the service expects.
///
/// The sender is always `default_from_address`; Communication Services only
/// accepts senders from a verified domain, so the message's own `from` is not
/// used.
pub fn map_message(
    message: &SendEmailOptions,
    default_from_address: &str,
) -> Result<AzureEmailMessage, EmailError> {
    if let Some(from) = &message.from
        && from.address() != default_from_address
    {
        debug!(
            "Ignoring sender {} in favour of configured {}",
            from.address(),
            default_from_address
        );
    }

    Ok(AzureEmailMessage {
        sender_address: default_from_address.to_string(),
        content: EmailContent {
            subject: message.subject.clone().unwrap_or_default(),
            html: message.html.clone().unwrap_or_default(),
            plain_text: message.text.clone().unwrap_or_default(),
        },
        recipients: EmailRecipients {
            to: map_addresses(message.to.as_ref()),
            cc: map_addresses(message.cc.as_ref()),
            bcc: map_addresses(message.bcc.as_ref()),
        },
        attachments: map_attachments(message.attachments.as_deref())?,
        reply_to: map_addresses(message.reply_to.as_ref()),
    })
}

pub fn map_addresses(addresses: Option<&Recipients>) -> Vec<EmailAddress> {
    let Some(addresses) = addresses else {
        return Vec::new();
    };

    addresses.clone().into_vec().into_iter().map(map_address).collect()
}

fn map_address(address: AddressInput) -> EmailAddress {
    match address {
        AddressInput::Plain(address) => EmailAddress {
            address,
            display_name: None,
        },
        AddressInput::Named { address, name } => EmailAddress {
            address,
            display_name: Some(name),
        },
    }
}

pub fn map_attachments(
    attachments: Option<&[Attachment]>,
) -> Result<Vec<EmailAttachment>, EmailError> {
    attachments
        .unwrap_or_default()
        .iter()
        .map(map_attachment)
        .collect()
}

fn map_attachment(attachment: &Attachment) -> Result<EmailAttachment, EmailError> {
    let (Some(filename), Some(content)) = (&attachment.filename, &attachment.content) else {
        return Err(missing_filename_or_content());
    };
    if filename.is_empty() || content.is_empty() {
        return Err(missing_filename_or_content());
    }

    let content_in_base64 = match content {
        AttachmentContent::Text(text) => general_purpose::STANDARD.encode(text.as_bytes()),
        AttachmentContent::Binary(bytes) => general_purpose::STANDARD.encode(bytes),
        AttachmentContent::Other(_) => {
            return Err(EmailError::ValidationError(
                "Attachment content must be a string or a buffer".to_string(),
            ));
        }
    };

    Ok(EmailAttachment {
        name: filename.clone(),
        content_type: attachment
            .content_type
            .clone()
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
        content_in_base64,
    })
}

fn missing_filename_or_content() -> EmailError {
    EmailError::ValidationError("Attachment is missing filename or content".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FROM: &str = "DoNotReply@example.com";

    #[test]
    fn test_plain_address_has_no_display_name() {
        let message = SendEmailOptions::new("a@example.com", "Hello");
        let mapped = map_message(&message, FROM).unwrap();

        assert_eq!(
            mapped.recipients.to,
            vec![EmailAddress {
                address: "a@example.com".to_string(),
                display_name: None,
            }]
        );
        let json = serde_json::to_value(&mapped).unwrap();
        assert_eq!(json["recipients"]["to"], json!([{"address": "a@example.com"}]));
    }

    #[test]
    fn test_named_address_maps_display_name() {
        let message = SendEmailOptions::new(AddressInput::named("a@example.com", "A"), "Hello");
        let mapped = map_message(&message, FROM).unwrap();

        let json = serde_json::to_value(&mapped.recipients.to).unwrap();
        assert_eq!(json, json!([{"address": "a@example.com", "displayName": "A"}]));
    }

    #[test]
    fn test_missing_cc_and_bcc_are_empty_lists() {
        let message = SendEmailOptions::new("a@example.com", "Hello");
        let json = serde_json::to_value(map_message(&message, FROM).unwrap()).unwrap();

        assert_eq!(json["recipients"]["cc"], json!([]));
        assert_eq!(json["recipients"]["bcc"], json!([]));
        assert_eq!(json["attachments"], json!([]));
        assert!(json.get("replyTo").is_none());
    }

    #[test]
    fn test_list_of_mixed_addresses() {
        let message = SendEmailOptions::new("a@example.com", "Hello").with_cc(vec![
            AddressInput::from("b@example.com"),
            AddressInput::named("c@example.com", "C"),
        ]);
        let mapped = map_message(&message, FROM).unwrap();

        assert_eq!(mapped.recipients.cc.len(), 2);
        assert_eq!(mapped.recipients.cc[1].display_name.as_deref(), Some("C"));
    }

    #[test]
    fn test_missing_content_defaults_to_empty_strings() {
        let message = SendEmailOptions {
            to: Some("a@example.com".into()),
            ..Default::default()
        };
        let mapped = map_message(&message, FROM).unwrap();

        assert_eq!(mapped.content, EmailContent::default());
    }

    #[test]
    fn test_sender_is_always_default_address() {
        let message = SendEmailOptions {
            from: Some("someone-else@example.org".into()),
            ..SendEmailOptions::new("a@example.com", "Hello")
        };
        let mapped = map_message(&message, FROM).unwrap();

        assert_eq!(mapped.sender_address, FROM);
    }

    #[test]
    fn test_text_attachment_is_base64_with_default_type() {
        let message = SendEmailOptions::new("a@example.com", "Hello")
            .with_attachment(Attachment::text("f.txt", "hello"));
        let mapped = map_message(&message, FROM).unwrap();

        let attachment = &mapped.attachments[0];
        assert_eq!(attachment.name, "f.txt");
        assert_eq!(attachment.content_type, "application/octet-stream");
        let decoded = general_purpose::STANDARD
            .decode(&attachment.content_in_base64)
            .unwrap();
        assert_eq!(decoded, b"hello");
    }

    #[test]
    fn test_binary_attachment_keeps_content_type() {
        let message = SendEmailOptions::new("a@example.com", "Hello").with_attachment(
            Attachment::binary("logo.png", vec![0x89u8, 0x50, 0x4e, 0x47])
                .with_content_type("image/png"),
        );
        let mapped = map_message(&message, FROM).unwrap();

        assert_eq!(mapped.attachments[0].content_type, "image/png");
        assert_eq!(mapped.attachments[0].content_in_base64, "iVBORw==");
    }

    #[test]
    fn test_attachment_without_filename_is_rejected() {
        let attachment = Attachment {
            filename: None,
            content: Some(AttachmentContent::Text("hello".to_string())),
            content_type: None,
        };
        let message = SendEmailOptions::new("a@example.com", "Hello").with_attachment(attachment);

        match map_message(&message, FROM) {
            Err(EmailError::ValidationError(msg)) => {
                assert_eq!(msg, "Attachment is missing filename or content")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_attachment_with_empty_content_is_rejected() {
        let message = SendEmailOptions::new("a@example.com", "Hello")
            .with_attachment(Attachment::text("f.txt", ""));

        assert!(matches!(
            map_message(&message, FROM),
            Err(EmailError::ValidationError(_))
        ));
    }

    #[test]
    fn test_unsupported_attachment_content_is_rejected() {
        let attachment = Attachment {
            filename: Some("f.txt".to_string()),
            content: Some(AttachmentContent::Other(json!({"path": "/etc/passwd"}))),
            content_type: None,
        };
        let message = SendEmailOptions::new("a@example.com", "Hello").with_attachment(attachment);

        match map_message(&message, FROM) {
            Err(EmailError::ValidationError(msg)) => {
                assert_eq!(msg, "Attachment content must be a string or a buffer")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_empty_binary_attachment_is_sent() {
        let message = SendEmailOptions::new("a@example.com", "Hello")
            .with_attachment(Attachment::binary("empty.bin", Vec::new()));
        let mapped = map_message(&message, FROM).unwrap();

        assert_eq!(mapped.attachments[0].name, "empty.bin");
        assert_eq!(mapped.attachments[0].content_in_base64, "");
        assert_eq!(mapped.attachments[0].content_type, DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn test_falsy_other_content_counts_as_missing() {
        for value in [json!(false), json!(0), json!(0.0), json!(null)] {
            let attachment = Attachment {
                filename: Some("f.txt".to_string()),
                content: Some(AttachmentContent::Other(value.clone())),
                content_type: None,
            };
            let message =
                SendEmailOptions::new("a@example.com", "Hello").with_attachment(attachment);

            match map_message(&message, FROM) {
                Err(EmailError::ValidationError(msg)) => {
                    assert_eq!(msg, "Attachment is missing filename or content", "{}", value)
                }
                other => panic!("unexpected result for {}: {:?}", value, other),
            }
        }
    }

    #[test]
    fn test_truthy_other_content_is_unsupported() {
        for value in [json!(true), json!(42), json!([1, 2])] {
            let attachment = Attachment {
                filename: Some("f.txt".to_string()),
                content: Some(AttachmentContent::Other(value.clone())),
                content_type: None,
            };
            let message =
                SendEmailOptions::new("a@example.com", "Hello").with_attachment(attachment);

            assert!(matches!(
                map_message(&message, FROM),
                Err(EmailError::ValidationError(msg))
                    if msg == "Attachment content must be a string or a buffer"
            ));
        }
    }
}
