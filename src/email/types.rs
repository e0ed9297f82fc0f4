use serde::{Deserialize, Serialize};

/// Vendor-neutral outgoing message, as handed to an adapter by the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendEmailOptions {
    /// Accepted for compatibility; adapters send from their configured address.
    #[serde(default)]
    pub from: Option<AddressInput>,
    #[serde(default)]
    pub to: Option<Recipients>,
    #[serde(default)]
    pub cc: Option<Recipients>,
    #[serde(default)]
    pub bcc: Option<Recipients>,
    #[serde(default, rename = "replyTo")]
    pub reply_to: Option<Recipients>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub attachments: Option<Vec<Attachment>>,
}

/// A single address or a list of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    One(AddressInput),
    Many(Vec<AddressInput>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddressInput {
    Plain(String),
    Named { address: String, name: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub content: Option<AttachmentContent>,
    #[serde(default, rename = "contentType")]
    pub content_type: Option<String>,
}

/// Attachment payload. Anything that is neither text nor raw bytes lands in
/// `Other` and is rejected when the message is mapped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttachmentContent {
    Text(String),
    Binary(Vec<u8>),
    Other(serde_json::Value),
}

impl AttachmentContent {
    /// True when the payload counts as absent. A byte buffer is always
    /// present, even with no bytes in it.
    pub fn is_empty(&self) -> bool {
        match self {
            AttachmentContent::Text(text) => text.is_empty(),
            AttachmentContent::Binary(_) => false,
            AttachmentContent::Other(value) => match value {
                serde_json::Value::Null => true,
                serde_json::Value::Bool(flag) => !flag,
                serde_json::Value::Number(n) => n.as_f64().is_some_and(|n| n == 0.0),
                serde_json::Value::String(s) => s.is_empty(),
                _ => false,
            },
        }
    }
}

impl From<&str> for AddressInput {
    fn from(address: &str) -> Self {
        AddressInput::Plain(address.to_string())
    }
}

impl From<String> for AddressInput {
    fn from(address: String) -> Self {
        AddressInput::Plain(address)
    }
}

impl From<AddressInput> for Recipients {
    fn from(address: AddressInput) -> Self {
        Recipients::One(address)
    }
}

impl From<&str> for Recipients {
    fn from(address: &str) -> Self {
        Recipients::One(address.into())
    }
}

impl From<String> for Recipients {
    fn from(address: String) -> Self {
        Recipients::One(address.into())
    }
}

impl From<Vec<AddressInput>> for Recipients {
    fn from(addresses: Vec<AddressInput>) -> Self {
        Recipients::Many(addresses)
    }
}

impl Recipients {
    pub fn into_vec(self) -> Vec<AddressInput> {
        match self {
            Recipients::One(address) => vec![address],
            Recipients::Many(addresses) => addresses,
        }
    }
}

impl AddressInput {
    pub fn named(address: impl Into<String>, name: impl Into<String>) -> Self {
        AddressInput::Named {
            address: address.into(),
            name: name.into(),
        }
    }

    pub fn address(&self) -> &str {
        match self {
            AddressInput::Plain(address) => address,
            AddressInput::Named { address, .. } => address,
        }
    }
}

impl Attachment {
    pub fn text(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            content: Some(AttachmentContent::Text(content.into())),
            content_type: None,
        }
    }

    pub fn binary(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: Some(filename.into()),
            content: Some(AttachmentContent::Binary(content.into())),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

impl SendEmailOptions {
    pub fn new(to: impl Into<Recipients>, subject: impl Into<String>) -> Self {
        Self {
            to: Some(to.into()),
            subject: Some(subject.into()),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn with_cc(mut self, cc: impl Into<Recipients>) -> Self {
        self.cc = Some(cc.into());
        self
    }

    pub fn with_bcc(mut self, bcc: impl Into<Recipients>) -> Self {
        self.bcc = Some(bcc.into());
        self
    }

    pub fn with_reply_to(mut self, reply_to: impl Into<Recipients>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.get_or_insert_with(Vec::new).push(attachment);
        self
    }
}

/// Successful outcome of a send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResponse {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipients_deserialize_single_or_list() {
        let one: Recipients = serde_json::from_str(r#""a@example.com""#).unwrap();
        assert_eq!(one, Recipients::One(AddressInput::from("a@example.com")));

        let many: Recipients =
            serde_json::from_str(r#"["a@example.com", {"address": "b@example.com", "name": "B"}]"#)
                .unwrap();
        assert_eq!(
            many.into_vec(),
            vec![
                AddressInput::from("a@example.com"),
                AddressInput::named("b@example.com", "B"),
            ]
        );
    }

    #[test]
    fn test_attachment_content_variants() {
        let text: AttachmentContent = serde_json::from_str(r#""hello""#).unwrap();
        assert_eq!(text, AttachmentContent::Text("hello".to_string()));

        let bytes: AttachmentContent = serde_json::from_str("[104, 105]").unwrap();
        assert_eq!(bytes, AttachmentContent::Binary(vec![104, 105]));

        let other: AttachmentContent = serde_json::from_str(r#"{"path": "/tmp/x"}"#).unwrap();
        assert!(matches!(other, AttachmentContent::Other(_)));
    }

    #[test]
    fn test_builder_collects_attachments() {
        let message = SendEmailOptions::new("a@example.com", "Hi")
            .with_text("body")
            .with_attachment(Attachment::text("a.txt", "a"))
            .with_attachment(Attachment::binary("b.bin", vec![1u8, 2, 3]));

        assert_eq!(message.attachments.as_ref().map(Vec::len), Some(2));
        assert_eq!(message.text.as_deref(), Some("body"));
    }
}
