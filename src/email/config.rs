use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::email::EmailError;
use crate::email::providers::azure::{
    AzureEmailAdapterArgs, AzureKeyCredential, Credential, EmailClientOptions,
    StaticTokenCredential,
};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmailConfig {
    pub default_from_address: String,
    #[serde(flatten)]
    pub provider: EmailProviderConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum EmailProviderConfig {
    Azure(AzureConfig),
    Null,
}

/// File form of the Azure adapter settings. Either `connection_string`, or
/// `endpoint` together with one of `access_key` / `token`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AzureConfig {
    pub connection_string: Option<String>,
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub token: Option<String>,
    #[serde(default)]
    pub options: EmailClientOptions,
}

impl EmailConfig {
    pub fn from_toml(content: &str) -> Result<Self, EmailError> {
        toml_edit::de::from_str::<EmailConfig>(content)
            .map_err(|e| EmailError::ConfigError(format!("Invalid email config: {}", e)))
    }

    pub async fn load_from_file(path: &Path) -> Result<Self, EmailError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            EmailError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }
}

impl AzureConfig {
    pub fn to_args(&self, default_from_address: &str) -> Result<AzureEmailAdapterArgs, EmailError> {
        let credential = match (&self.access_key, &self.token) {
            (Some(_), Some(_)) => {
                return Err(EmailError::ConfigError(
                    "Only one of `access_key` or `token` may be set".to_string(),
                ));
            }
            (Some(key), None) => Some(Credential::Key(AzureKeyCredential::new(key.clone()))),
            (None, Some(token)) => Some(Credential::Token(Arc::new(StaticTokenCredential::new(
                token.clone(),
            )))),
            (None, None) => None,
        };

        Ok(AzureEmailAdapterArgs {
            connection_string: self.connection_string.clone(),
            endpoint: self.endpoint.clone(),
            credential,
            options: self.options.clone(),
            default_from_address: default_from_address.to_string(),
        })
    }
}
