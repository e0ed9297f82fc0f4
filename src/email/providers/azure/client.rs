use async_trait::async_trait;
use reqwest::{Method, Response, header::HeaderMap};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{debug, error};
use url::Url;
use uuid::Uuid;

use super::auth::{
    AzureKeyCredential, COMMUNICATION_SCOPE, ConnectionString, TokenCredential, sign_request,
};
use super::models::{AzureEmailMessage, ErrorResponse, SendOperationResult};
use crate::email::EmailError;

pub const DEFAULT_API_VERSION: &str = "2023-03-31";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EmailClientOptions {
    pub api_version: String,
    /// Wait between status checks when the service sends no `Retry-After`.
    pub poll_interval_ms: u64,
    pub user_agent: String,
}

impl Default for EmailClientOptions {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_string(),
            poll_interval_ms: 2000,
            user_agent: concat!("azure-email-adapter/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Provider side of a send: submits the message and hands back a poller for
/// the resulting long-running operation.
#[async_trait]
pub trait SendEmailClient: Send + Sync {
    async fn begin_send(
        &self,
        message: AzureEmailMessage,
    ) -> Result<Box<dyn SendPoller>, EmailError>;
}

#[async_trait]
pub trait SendPoller: Send {
    /// Last status seen, without contacting the service.
    fn operation_state(&self) -> &SendOperationResult;

    async fn poll_until_done(&mut self) -> Result<SendOperationResult, EmailError>;
}

enum Signer {
    Key(Vec<u8>),
    Token(Arc<dyn TokenCredential>),
}

struct ClientInner {
    http: reqwest::Client,
    endpoint: Url,
    signer: Signer,
    options: EmailClientOptions,
}

/// Client for the Communication Services Email REST API.
#[derive(Clone)]
pub struct EmailClient {
    inner: Arc<ClientInner>,
}

impl EmailClient {
    pub fn from_connection_string(
        connection_string: &str,
        options: EmailClientOptions,
    ) -> Result<Self, EmailError> {
        let parsed = ConnectionString::parse(connection_string)?;
        Self::build(parsed.endpoint, Signer::Key(parsed.credential.decode()?), options)
    }

    pub fn with_key(
        endpoint: Url,
        credential: &AzureKeyCredential,
        options: EmailClientOptions,
    ) -> Result<Self, EmailError> {
        Self::build(endpoint, Signer::Key(credential.decode()?), options)
    }

    pub fn with_token(
        endpoint: Url,
        credential: Arc<dyn TokenCredential>,
        options: EmailClientOptions,
    ) -> Result<Self, EmailError> {
        Self::build(endpoint, Signer::Token(credential), options)
    }

    fn build(
        endpoint: Url,
        signer: Signer,
        options: EmailClientOptions,
    ) -> Result<Self, EmailError> {
        let http = reqwest::Client::builder()
            .user_agent(options.user_agent.clone())
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                endpoint,
                signer,
                options,
            }),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// `{endpoint}/{path}?api-version=...`. `Url::join` would read `emails:`
    /// as a scheme, so the path is appended by hand.
    fn operation_url(&self, path: &str) -> Url {
        let mut url = self.inner.endpoint.clone();
        let base = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{}/{}", base, path));
        url.set_query(None);
        url.query_pairs_mut()
            .append_pair("api-version", &self.inner.options.api_version);
        url
    }

    async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Vec<u8>,
    ) -> Result<Response, EmailError> {
        let request_id = Uuid::new_v4().to_string();
        let mut request = self
            .inner
            .http
            .request(method.clone(), url.clone())
            .header("x-ms-client-request-id", &request_id);

        request = match &self.inner.signer {
            Signer::Key(key) => {
                let signed = sign_request(key, &method, &url, &body, SystemTime::now())?;
                request
                    .header("x-ms-date", signed.date)
                    .header("x-ms-content-sha256", signed.content_hash)
                    .header("Authorization", signed.authorization)
            }
            Signer::Token(credential) => {
                let token = credential.get_token(&[COMMUNICATION_SCOPE]).await?;
                request.bearer_auth(token.token)
            }
        };

        if method == Method::POST {
            let first_sent = httpdate::fmt_http_date(SystemTime::now());
            request = request
                .header("Content-Type", "application/json")
                .header("Operation-Id", &request_id)
                .header("repeatability-request-id", &request_id)
                .header("repeatability-first-sent", first_sent)
                .body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let error = serde_json::from_str::<ErrorResponse>(&text)
            .ok()
            .map(|body| body.error);
        error!(
            "Email service request {} {} failed with {}: {}",
            method, url, status, text
        );
        Err(EmailError::HttpError {
            status: status.as_u16(),
            error,
        })
    }

    /// Submits the message. The returned poller has not contacted the
    /// operation endpoint yet.
    pub async fn begin_send(&self, message: &AzureEmailMessage) -> Result<EmailPoller, EmailError> {
        let body = serde_json::to_vec(message)?;
        let url = self.operation_url("emails:send");

        let recipients = &message.recipients;
        debug!(
            "Submitting email to {} recipient(s) via {}",
            recipients.to.len() + recipients.cc.len() + recipients.bcc.len(),
            url.host_str().unwrap_or_default()
        );

        let response = self.execute(Method::POST, url, body).await?;
        let headers = response.headers().clone();
        let state: SendOperationResult = response.json().await?;

        let location = operation_location(&headers)
            .unwrap_or_else(|| self.operation_url(&format!("emails/operations/{}", state.id)));

        debug!("Email operation {} accepted with status {:?}", state.id, state.status);

        Ok(EmailPoller {
            client: self.clone(),
            location,
            retry_after: retry_after(&headers),
            state,
        })
    }

    async fn get_operation(
        &self,
        location: &Url,
    ) -> Result<(SendOperationResult, Option<Duration>), EmailError> {
        let response = self
            .execute(Method::GET, location.clone(), Vec::new())
            .await?;
        let retry = retry_after(response.headers());
        Ok((response.json().await?, retry))
    }
}

#[async_trait]
impl SendEmailClient for EmailClient {
    async fn begin_send(
        &self,
        message: AzureEmailMessage,
    ) -> Result<Box<dyn SendPoller>, EmailError> {
        let poller = EmailClient::begin_send(self, &message).await?;
        Ok(Box::new(poller))
    }
}

fn operation_location(headers: &HeaderMap) -> Option<Url> {
    headers
        .get("operation-location")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Url::parse(v).ok())
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Tracks one send operation until the service reports a terminal status.
pub struct EmailPoller {
    client: EmailClient,
    location: Url,
    retry_after: Option<Duration>,
    state: SendOperationResult,
}

impl EmailPoller {
    fn next_delay(&self) -> Duration {
        self.retry_after
            .unwrap_or_else(|| Duration::from_millis(self.client.inner.options.poll_interval_ms))
    }
}

#[async_trait]
impl SendPoller for EmailPoller {
    fn operation_state(&self) -> &SendOperationResult {
        &self.state
    }

    async fn poll_until_done(&mut self) -> Result<SendOperationResult, EmailError> {
        while !self.state.status.is_terminal() {
            tokio::time::sleep(self.next_delay()).await;

            let (state, retry) = self.client.get_operation(&self.location).await?;
            debug!("Email operation {} is {:?}", state.id, state.status);
            self.state = state;
            self.retry_after = retry;
        }

        Ok(self.state.clone())
    }
}

impl std::fmt::Debug for EmailClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailClient")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("api_version", &self.inner.options.api_version)
            .finish()
    }
}
