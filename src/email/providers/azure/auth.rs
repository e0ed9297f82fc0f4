use async_trait::async_trait;
use base64::{Engine, engine::general_purpose};
use hmac::{Hmac, Mac};
use reqwest::Method;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;
use url::Url;

use crate::email::EmailError;

type HmacSha256 = Hmac<Sha256>;

pub const COMMUNICATION_SCOPE: &str = "https://communication.azure.com//.default";

/// Shared access key of a Communication Services resource, base64 encoded as
/// shown in the portal.
#[derive(Clone)]
pub struct AzureKeyCredential {
    key: String,
}

impl AzureKeyCredential {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn decode(&self) -> Result<Vec<u8>, EmailError> {
        general_purpose::STANDARD
            .decode(self.key.trim())
            .map_err(|_| EmailError::ConfigError("The access key is not valid base64".to_string()))
    }
}

impl fmt::Debug for AzureKeyCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AzureKeyCredential(***)")
    }
}

#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
}

#[async_trait]
pub trait TokenCredential: Send + Sync {
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken, EmailError>;
}

/// Hands out one pre-acquired bearer token.
pub struct StaticTokenCredential {
    token: String,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(&self, _scopes: &[&str]) -> Result<AccessToken, EmailError> {
        if self.token.is_empty() {
            return Err(EmailError::CredentialError("Token is empty".to_string()));
        }
        Ok(AccessToken {
            token: self.token.clone(),
        })
    }
}

#[derive(Clone)]
pub enum Credential {
    Key(AzureKeyCredential),
    Token(Arc<dyn TokenCredential>),
}

/// Parsed `endpoint=...;accesskey=...` connection string.
#[derive(Debug, Clone)]
pub struct ConnectionString {
    pub endpoint: Url,
    pub credential: AzureKeyCredential,
}

impl ConnectionString {
    pub fn parse(value: &str) -> Result<Self, EmailError> {
        let mut endpoint = None;
        let mut access_key = None;

        for part in value.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let Some((name, value)) = part.split_once('=') else {
                return Err(invalid_connection_string());
            };
            match name.trim().to_lowercase().as_str() {
                "endpoint" => endpoint = Some(value.trim().to_string()),
                "accesskey" => access_key = Some(value.trim().to_string()),
                _ => {}
            }
        }

        match (endpoint, access_key) {
            (Some(endpoint), Some(access_key)) if !access_key.is_empty() => Ok(Self {
                endpoint: parse_endpoint(&endpoint)?,
                credential: AzureKeyCredential::new(access_key),
            }),
            _ => Err(invalid_connection_string()),
        }
    }
}

fn invalid_connection_string() -> EmailError {
    EmailError::ConfigError(
        "Invalid connection string, expected `endpoint=...;accesskey=...`".to_string(),
    )
}

pub fn parse_endpoint(endpoint: &str) -> Result<Url, EmailError> {
    let url = Url::parse(endpoint)
        .map_err(|e| EmailError::ConfigError(format!("Invalid endpoint {}: {}", endpoint, e)))?;
    if url.host_str().is_none() {
        return Err(EmailError::ConfigError(format!(
            "Invalid endpoint {}: missing host",
            endpoint
        )));
    }
    Ok(url)
}

/// Headers that authenticate one request with a shared access key.
#[derive(Debug, Clone)]
pub struct SignedHeaders {
    pub date: String,
    pub content_hash: String,
    pub authorization: String,
}

pub fn content_hash(body: &[u8]) -> String {
    general_purpose::STANDARD.encode(Sha256::digest(body))
}

pub fn sign_request(
    key: &[u8],
    method: &Method,
    url: &Url,
    body: &[u8],
    now: SystemTime,
) -> Result<SignedHeaders, EmailError> {
    let date = httpdate::fmt_http_date(now);
    let content_hash = content_hash(body);

    let path_and_query = match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    };
    let string_to_sign = format!(
        "{}\n{}\n{};{};{}",
        method.as_str(),
        path_and_query,
        date,
        host_header(url),
        content_hash
    );

    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|_| EmailError::CredentialError("Invalid access key".to_string()))?;
    mac.update(string_to_sign.as_bytes());
    let signature = general_purpose::STANDARD.encode(mac.finalize().into_bytes());

    Ok(SignedHeaders {
        date,
        content_hash,
        authorization: format!(
            "HMAC-SHA256 SignedHeaders=x-ms-date;host;x-ms-content-sha256&Signature={}",
            signature
        ),
    })
}

/// Value of the `Host` header reqwest will send for `url`.
pub fn host_header(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}
