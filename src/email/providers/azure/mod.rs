//! Adapter for [Azure Communication Services Email](https://learn.microsoft.com/en-us/azure/communication-services/concepts/email/email-overview).

pub mod auth;
pub mod client;
pub mod mapping;
pub mod models;

pub use auth::*;
pub use client::*;
pub use mapping::map_message;
pub use models::*;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info};
use url::Url;

use crate::email::{ApiError, Delivery, EmailAdapter, EmailError, SendEmailOptions, SendResponse};

pub const ADAPTER_NAME: &str = "azure-email";

/// Placeholder; the service shows the sender configured on the domain.
pub const DEFAULT_FROM_NAME: &str = "doesntmatter@example.com";

/// Settings for [`AzureEmailAdapter::new`]. Authenticate with either
/// `connection_string`, or `endpoint` plus `credential`.
#[derive(Clone, Default)]
pub struct AzureEmailAdapterArgs {
    pub connection_string: Option<String>,
    pub endpoint: Option<String>,
    pub credential: Option<Credential>,
    pub options: EmailClientOptions,
    pub default_from_address: String,
}

/// The authentication mode an adapter ends up with.
#[derive(Clone)]
pub enum ClientAuth {
    ConnectionString(String),
    EndpointCredential { endpoint: Url, credential: Credential },
}

impl AzureEmailAdapterArgs {
    pub fn resolve_auth(&self) -> Result<ClientAuth, EmailError> {
        match &self.credential {
            Some(credential) => {
                let Some(endpoint) = self.endpoint.as_deref() else {
                    return Err(EmailError::ConfigError(
                        "The `endpoint` option must be set when using a credential".to_string(),
                    ));
                };
                Ok(ClientAuth::EndpointCredential {
                    endpoint: parse_endpoint(endpoint)?,
                    credential: credential.clone(),
                })
            }
            None => match self.connection_string.as_deref() {
                Some(connection_string) if !connection_string.is_empty() => {
                    Ok(ClientAuth::ConnectionString(connection_string.to_string()))
                }
                _ => Err(EmailError::ConfigError(
                    "The `connectionString` option must be set when not using a credential"
                        .to_string(),
                )),
            },
        }
    }
}

impl ClientAuth {
    pub fn into_client(self, options: EmailClientOptions) -> Result<EmailClient, EmailError> {
        match self {
            ClientAuth::ConnectionString(connection_string) => {
                EmailClient::from_connection_string(&connection_string, options)
            }
            ClientAuth::EndpointCredential {
                endpoint,
                credential: Credential::Key(key),
            } => EmailClient::with_key(endpoint, &key, options),
            ClientAuth::EndpointCredential {
                endpoint,
                credential: Credential::Token(token),
            } => EmailClient::with_token(endpoint, token, options),
        }
    }
}

pub struct AzureEmailAdapter {
    client: Arc<dyn SendEmailClient>,
    default_from_address: String,
}

impl AzureEmailAdapter {
    /// Validates the settings and builds the one client every send shares.
    pub fn new(args: AzureEmailAdapterArgs) -> Result<Self, ApiError> {
        let auth = args.resolve_auth()?;
        let client = auth.into_client(args.options)?;
        debug!("Created email client for {}", client.endpoint());

        Ok(Self::with_client(Arc::new(client), args.default_from_address))
    }

    pub fn with_client(client: Arc<dyn SendEmailClient>, default_from_address: String) -> Self {
        Self {
            client,
            default_from_address,
        }
    }
}

#[async_trait]
impl EmailAdapter for AzureEmailAdapter {
    fn name(&self) -> &str {
        ADAPTER_NAME
    }

    fn default_from_address(&self) -> &str {
        &self.default_from_address
    }

    fn default_from_name(&self) -> &str {
        DEFAULT_FROM_NAME
    }

    async fn send_email(&self, message: SendEmailOptions) -> Result<Delivery, ApiError> {
        let mapped = map_message(&message, &self.default_from_address)?;

        let mut poller = self.client.begin_send(mapped).await.map_err(|e| {
            error!("Failed to submit email: {}", e);
            ApiError::from(e)
        })?;

        // Polling lives inside the future so it only happens once awaited
        Ok(Delivery::new(async move {
            let result = poller.poll_until_done().await?;
            settle(result)
        }))
    }
}

fn settle(result: SendOperationResult) -> Result<SendResponse, ApiError> {
    if let Some(error) = result.error {
        let err = EmailError::ProviderError(error);
        error!("Email operation {} failed: {}", result.id, err);
        return Err(err.into());
    }

    match result.status {
        SendStatus::Failed | SendStatus::Canceled => {
            error!("Email operation {} ended as {:?}", result.id, result.status);
            Err(ApiError::new("Email not sent", 500))
        }
        _ => {
            info!("Email operation {} completed", result.id);
            Ok(SendResponse { id: result.id })
        }
    }
}
