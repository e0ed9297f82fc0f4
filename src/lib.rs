//! Sends host email through Azure Communication Services.
//!
//! ```no_run
//! use azure_email_adapter::email::providers::azure::{AzureEmailAdapter, AzureEmailAdapterArgs};
//! use azure_email_adapter::email::{EmailAdapter, SendEmailOptions};
//!
//! # async fn run() -> Result<(), azure_email_adapter::email::ApiError> {
//! let adapter = AzureEmailAdapter::new(AzureEmailAdapterArgs {
//!     connection_string: Some("endpoint=https://acs.example.com/;accesskey=c2VjcmV0".into()),
//!     default_from_address: "DoNotReply@example.com".into(),
//!     ..Default::default()
//! })?;
//!
//! let delivery = adapter
//!     .send_email(SendEmailOptions::new("user@example.com", "Hello").with_text("Hi there"))
//!     .await?;
//! let sent = delivery.await?;
//! println!("sent {}", sent.id);
//! # Ok(())
//! # }
//! ```

pub mod email;

pub use email::{
    ApiError, Delivery, DynEmailAdapter, EmailAdapter, EmailConfig, EmailError, SendEmailOptions,
    SendResponse, create_adapter,
};
