pub mod config;
pub mod delivery;
pub mod error;
pub mod providers;
pub mod types;

pub use config::*;
pub use delivery::Delivery;
pub use error::*;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

use providers::azure::AzureEmailAdapter;
use providers::null::NullEmailClient;

/// Contract the host uses to send mail, independent of the delivery service.
#[async_trait]
pub trait EmailAdapter: Send + Sync {
    fn name(&self) -> &str;
    fn default_from_address(&self) -> &str;
    fn default_from_name(&self) -> &str;

    /// Validates and submits `message`. The returned [`Delivery`] resolves
    /// once the service reports a final status; it only starts waiting when
    /// awaited.
    async fn send_email(&self, message: SendEmailOptions) -> Result<Delivery, ApiError>;
}

pub type DynEmailAdapter = Arc<dyn EmailAdapter>;

pub fn create_adapter(config: &EmailConfig) -> Result<DynEmailAdapter, ApiError> {
    match &config.provider {
        EmailProviderConfig::Azure(azure_config) => {
            let args = azure_config.to_args(&config.default_from_address)?;
            Ok(Arc::new(AzureEmailAdapter::new(args)?))
        }
        EmailProviderConfig::Null => Ok(Arc::new(AzureEmailAdapter::with_client(
            Arc::new(NullEmailClient::new()),
            config.default_from_address.clone(),
        ))),
    }
}
