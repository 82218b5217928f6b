//! The Daraja client.

use std::sync::Arc;

use daraja_crypto::TimestampProvider;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::auth::{AccessToken, Authenticator, MemoryTokenCache, NoopTokenCache, TokenCache};
use crate::config::{Credentials, DarajaConfig};
use crate::environment::Environment;
use crate::error::DarajaResult;
use crate::params::Params;
use crate::requests::{
    AccountBalance, B2bPayment, B2cPayment, BuildContext, C2bRegisterUrl, C2bSimulate,
    PreparedRequest, QrCodeGenerate, RequestBuilder, Reversal, StkPushQuery, StkPushSimulate,
    TransactionStatus,
};
use crate::transport::{decode_response, HttpRequest, HttpTransport, Transport, CONTENT_TYPE_JSON};

/// Client for the Daraja APIs.
///
/// Cheap to clone; clones share configuration, transport and token cache.
/// Every operation takes overrides as anything convertible into [`Params`]:
/// a typed request struct, a [`Params`] map, or `Params::new()` for the
/// configured defaults.
///
/// # Example
///
/// ```no_run
/// use daraja::{DarajaClient, DarajaConfig, StkPushRequest};
///
/// # async fn run() -> daraja::DarajaResult<()> {
/// let config = DarajaConfig::load("daraja.toml")?;
/// let client = DarajaClient::new(config)?;
/// let response = client
///     .stk_push(StkPushRequest::new("254708374149", 10))
///     .await?;
/// println!("{}", response["CheckoutRequestID"]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DarajaClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: DarajaConfig,
    credentials: Credentials,
    timestamps: TimestampProvider,
    transport: Arc<dyn Transport>,
    auth: Authenticator,
}

impl DarajaClient {
    /// Create a client that talks to the gateway over HTTPS.
    pub fn new(config: DarajaConfig) -> DarajaResult<Self> {
        let transport = HttpTransport::new(&config.http, config.environment)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over a custom transport.
    ///
    /// The token cache follows `cache.enable` and timestamps use the wall
    /// clock in East Africa Time.
    pub fn with_transport(config: DarajaConfig, transport: Arc<dyn Transport>) -> Self {
        let cache: Arc<dyn TokenCache> = if config.cache.enable {
            Arc::new(MemoryTokenCache::new())
        } else {
            Arc::new(NoopTokenCache)
        };
        Self::from_parts(config, transport, cache, TimestampProvider::east_africa())
    }

    /// Create a client from explicit collaborators.
    pub fn from_parts(
        config: DarajaConfig,
        transport: Arc<dyn Transport>,
        token_cache: Arc<dyn TokenCache>,
        timestamps: TimestampProvider,
    ) -> Self {
        if config.environment == Environment::Production && config.http.accept_invalid_certs {
            warn!("http.accept_invalid_certs is set for production and will not be honoured");
        }
        let credentials = config.credentials();
        let auth = Authenticator::new(transport.clone(), token_cache);
        Self {
            inner: Arc::new(ClientInner {
                config,
                credentials,
                timestamps,
                transport,
                auth,
            }),
        }
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &DarajaConfig {
        &self.inner.config
    }

    /// Target environment.
    pub fn environment(&self) -> Environment {
        self.inner.config.environment
    }

    fn context(&self) -> BuildContext<'_> {
        BuildContext::new(
            &self.inner.config,
            &self.inner.credentials,
            &self.inner.timestamps,
        )
    }

    /// An OAuth access token, from cache when one is still valid.
    pub async fn access_token(&self) -> DarajaResult<AccessToken> {
        self.inner.auth.access_token(&self.context()).await
    }

    /// Build the request for `B` without sending it.
    pub fn prepare<B: RequestBuilder>(
        &self,
        overrides: impl Into<Params>,
    ) -> DarajaResult<PreparedRequest> {
        B::build(&self.context(), overrides.into())
    }

    /// Build the request for `B`, authorise it and send it.
    ///
    /// The request is built before a token is fetched, so configuration
    /// errors surface without touching the network.
    pub async fn execute<B: RequestBuilder>(
        &self,
        overrides: impl Into<Params>,
    ) -> DarajaResult<Value> {
        let prepared = self.prepare::<B>(overrides)?;
        let operation = prepared.operation;
        debug!(operation = %operation, path = %prepared.path, "prepared gateway request");

        let token = self.access_token().await?;
        let environment = self.environment();
        let request = HttpRequest {
            method: prepared.method(),
            url: prepared.url(environment),
            headers: vec![
                ("Authorization".to_string(), token.bearer()),
                ("Content-Type".to_string(), CONTENT_TYPE_JSON.to_string()),
            ],
            body: Some(prepared.body.into_value()),
        };

        let response = self.inner.transport.send(request).await?;
        let status = response.status;
        let body = decode_response(response, environment.error_reporting())?;

        info!(operation = %operation, status, "gateway accepted request");
        Ok(body)
    }

    /// Prompt a customer to pay (M-PESA Express).
    pub async fn stk_push(&self, overrides: impl Into<Params>) -> DarajaResult<Value> {
        self.execute::<StkPushSimulate>(overrides).await
    }

    /// Query the status of an M-PESA Express request.
    pub async fn stk_query(&self, overrides: impl Into<Params>) -> DarajaResult<Value> {
        self.execute::<StkPushQuery>(overrides).await
    }

    /// Register C2B confirmation and validation URLs.
    pub async fn c2b_register_urls(&self, overrides: impl Into<Params>) -> DarajaResult<Value> {
        self.execute::<C2bRegisterUrl>(overrides).await
    }

    /// Simulate a C2B payment.
    pub async fn c2b_simulate(&self, overrides: impl Into<Params>) -> DarajaResult<Value> {
        self.execute::<C2bSimulate>(overrides).await
    }

    /// Pay a customer.
    pub async fn b2c_payment(&self, overrides: impl Into<Params>) -> DarajaResult<Value> {
        self.execute::<B2cPayment>(overrides).await
    }

    /// Pay another business.
    pub async fn b2b_payment(&self, overrides: impl Into<Params>) -> DarajaResult<Value> {
        self.execute::<B2bPayment>(overrides).await
    }

    /// Query a transaction's status.
    pub async fn transaction_status(&self, overrides: impl Into<Params>) -> DarajaResult<Value> {
        self.execute::<TransactionStatus>(overrides).await
    }

    /// Query the account balance.
    pub async fn account_balance(&self, overrides: impl Into<Params>) -> DarajaResult<Value> {
        self.execute::<AccountBalance>(overrides).await
    }

    /// Reverse a transaction.
    pub async fn reversal(&self, overrides: impl Into<Params>) -> DarajaResult<Value> {
        self.execute::<Reversal>(overrides).await
    }

    /// Generate a dynamic payment QR code.
    pub async fn generate_qr_code(&self, overrides: impl Into<Params>) -> DarajaResult<Value> {
        self.execute::<QrCodeGenerate>(overrides).await
    }
}

impl std::fmt::Debug for DarajaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DarajaClient")
            .field("environment", &self.inner.config.environment)
            .field("credentials", &self.inner.credentials)
            .finish_non_exhaustive()
    }
}
