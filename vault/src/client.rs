//! Vault store client: the trait the core talks to and its HTTP implementation.

use crate::{
    config::VaultConfig,
    error::{VaultError, VaultResult},
    secrets::{HealthResponse, RawSecret, RenewResponse, TokenLookup},
    session::Session,
};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{debug, instrument};

/// The three Vault calls the supervisor and reader need.
///
/// Errors are opaque: callers only distinguish success from failure.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Look up the current token.
    async fn lookup_self(&self) -> VaultResult<TokenLookup>;

    /// Extend the current token by `increment` seconds.
    async fn renew_self(&self, increment: u64) -> VaultResult<()>;

    /// Read the raw response at `path`. `Ok(None)` means no secret there.
    async fn read(&self, path: &str) -> VaultResult<Option<RawSecret>>;
}

/// HTTP client for the Vault API.
#[derive(Debug, Clone)]
pub struct VaultClient {
    session: Arc<Session>,
    http: Client,
}

impl VaultClient {
    /// Create a new Vault client.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &VaultConfig) -> VaultResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .use_rustls_tls()
            .build()?;

        Ok(Self {
            session: Arc::new(Session::new(&config.addr, config.token.clone())),
            http,
        })
    }

    /// Shared session state.
    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Query cluster health.
    ///
    /// Standby, sealed and uninitialized nodes answer with 299 so the body is
    /// always decoded.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::StoreUnavailable`] if Vault cannot be reached.
    #[instrument(skip(self), fields(addr = %self.session.addr()))]
    pub async fn health(&self) -> VaultResult<HealthResponse> {
        let request = self
            .request(Method::GET, "sys/health")
            .query(&[
                ("standbycode", "299"),
                ("sealedcode", "299"),
                ("uninitcode", "299"),
                ("perfstandbyok", "true"),
            ]);
        let response = Self::send(request).await?;
        Ok(response.json().await?)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/v1/{}", self.session.addr(), path.trim_start_matches('/'));
        let token = self.session.token();
        self.http
            .request(method, url)
            .header("X-Vault-Token", token.expose_secret())
    }

    async fn send(request: RequestBuilder) -> VaultResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| VaultError::unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        Err(VaultError::unavailable(format!("Status {status}: {text}")))
    }
}

#[async_trait]
impl StoreClient for VaultClient {
    #[instrument(skip(self))]
    async fn lookup_self(&self) -> VaultResult<TokenLookup> {
        let response = Self::send(self.request(Method::GET, "auth/token/lookup-self")).await?;
        Ok(response.json().await?)
    }

    #[instrument(skip(self))]
    async fn renew_self(&self, increment: u64) -> VaultResult<()> {
        let request = self
            .request(Method::POST, "auth/token/renew-self")
            .json(&serde_json::json!({ "increment": increment }));
        let response: RenewResponse = Self::send(request).await?.json().await?;

        if let Some(auth) = response.auth {
            debug!(lease_duration = auth.lease_duration, renewable = auth.renewable, "Token renewed");
            self.session
                .replace_token(SecretString::from(auth.client_token));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn read(&self, path: &str) -> VaultResult<Option<RawSecret>> {
        let response = self
            .request(Method::GET, path)
            .send()
            .await
            .map_err(|e| VaultError::unavailable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            // Vault answers 404 for deleted KV v2 versions but still sends
            // the envelope, so keep it when there is one.
            let text = response
                .text()
                .await
                .map_err(|e| VaultError::unavailable(format!("Reading 404 body: {e}")))?;
            return Ok(serde_json::from_str::<RawSecret>(&text)
                .ok()
                .filter(|secret| secret.data.is_some() || !secret.warnings().is_empty()));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(VaultError::unavailable(format!("Status {status}: {text}")));
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        Ok(Some(response.json().await?))
    }
}
