//! OAuth access tokens and their cache.
//!
//! Tokens are fetched with the app's consumer key and secret and cached until
//! shortly before they expire. The cache is best effort: a failing cache is
//! logged and bypassed, never surfaced to the caller. Concurrent callers that
//! miss the cache at the same time each fetch a token.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::error::{DarajaError, DarajaResult};
use crate::requests::{basic_credential, Authorization, BuildContext, RequestBuilder};
use crate::transport::{decode_response, HttpRequest, Transport, CONTENT_TYPE_FORM};

/// Lifetime assumed when the gateway omits `expires_in`.
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3599);

/// Tokens are evicted this long before the gateway expires them.
pub const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Failure inside a token cache.
#[derive(Debug, Error)]
#[error("token cache error: {0}")]
pub struct CacheError(pub String);

/// Key/value store for access tokens.
#[async_trait]
pub trait TokenCache: Send + Sync {
    /// Value for `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key` for `ttl`.
    async fn save(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;
}

/// In-process cache with per-entry expiry.
///
/// Expired entries are dropped when read and swept on every save.
#[derive(Default)]
pub struct MemoryTokenCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

struct CacheEntry {
    value: Zeroizing<String>,
    expires_at: Instant,
}

impl MemoryTokenCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// True if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for MemoryTokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTokenCache")
            .field("entries", &self.len())
            .finish()
    }
}

#[async_trait]
impl TokenCache for MemoryTokenCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        {
            let entries = self
                .entries
                .read()
                .map_err(|e| CacheError(format!("lock poisoned: {}", e)))?;
            match entries.get(key) {
                Some(entry) if entry.expires_at > now => {
                    return Ok(Some(entry.value.to_string()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // expired
        let mut entries = self
            .entries
            .write()
            .map_err(|e| CacheError(format!("lock poisoned: {}", e)))?;
        if entries.get(key).is_some_and(|entry| entry.expires_at <= now) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn save(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut entries = self
            .entries
            .write()
            .map_err(|e| CacheError(format!("lock poisoned: {}", e)))?;
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key.to_string(),
            CacheEntry {
                value: Zeroizing::new(value.to_string()),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }
}

/// Cache that stores nothing; used when `cache.enable` is false.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTokenCache;

#[async_trait]
impl TokenCache for NoopTokenCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn save(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }
}

/// An OAuth bearer token.
#[derive(Clone)]
pub struct AccessToken {
    value: Zeroizing<String>,
    expires_in: Option<Duration>,
}

impl AccessToken {
    /// Wrap a token value.
    pub fn new(value: impl Into<String>, expires_in: Option<Duration>) -> Self {
        Self {
            value: Zeroizing::new(value.into()),
            expires_in,
        }
    }

    /// The raw token.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Lifetime reported by the gateway; `None` when served from cache.
    pub fn expires_in(&self) -> Option<Duration> {
        self.expires_in
    }

    /// `Authorization` header value.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.value.as_str())
    }

    /// Parse the gateway's token response.
    ///
    /// `expires_in` may be a number or a numeric string.
    pub fn from_response(body: &Value) -> DarajaResult<Self> {
        if let Some(code) = body.get("errorCode") {
            let message = body
                .get("errorMessage")
                .and_then(Value::as_str)
                .unwrap_or("token request rejected");
            return Err(DarajaError::transport(format!(
                "{}: {}",
                code.as_str().map(String::from).unwrap_or_else(|| code.to_string()),
                message
            )));
        }

        let token = body
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| DarajaError::malformed("token response has no access_token"))?;

        let expires_in = match body.get("expires_in") {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
            Some(_) => None,
        }
        .map(Duration::from_secs);

        Ok(Self::new(token, expires_in))
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Fetches access tokens through a transport and caches them.
#[derive(Clone)]
pub struct Authenticator {
    transport: Arc<dyn Transport>,
    cache: Arc<dyn TokenCache>,
}

impl Authenticator {
    /// Create an authenticator.
    pub fn new(transport: Arc<dyn Transport>, cache: Arc<dyn TokenCache>) -> Self {
        Self { transport, cache }
    }

    /// A valid token, from cache when possible.
    pub async fn access_token(&self, ctx: &BuildContext<'_>) -> DarajaResult<AccessToken> {
        let key = cache_key(ctx);

        match self.cache.get(&key).await {
            Ok(Some(token)) => {
                debug!("using cached access token");
                return Ok(AccessToken::new(token, None));
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "token cache read failed; fetching a new token"),
        }

        let token = self.fetch(ctx).await?;

        let ttl = token
            .expires_in()
            .unwrap_or(DEFAULT_TOKEN_LIFETIME)
            .saturating_sub(TOKEN_EXPIRY_MARGIN);
        if !ttl.is_zero() {
            if let Err(e) = self.cache.save(&key, token.as_str(), ttl).await {
                warn!(error = %e, "token cache write failed");
            }
        }

        Ok(token)
    }

    /// Fetch a fresh token, bypassing the cache.
    pub async fn fetch(&self, ctx: &BuildContext<'_>) -> DarajaResult<AccessToken> {
        let prepared = Authorization::build(ctx, Default::default())?;
        let environment = ctx.config.environment;
        let request = HttpRequest {
            method: prepared.method(),
            url: prepared.url(environment),
            headers: vec![
                (
                    "Authorization".to_string(),
                    format!("Basic {}", basic_credential(ctx.credentials)?),
                ),
                ("Content-Type".to_string(), CONTENT_TYPE_FORM.to_string()),
            ],
            body: None,
        };

        let response = self.transport.send(request).await?;
        let body = decode_response(response, environment.error_reporting())?;
        let token = AccessToken::from_response(&body)?;

        info!(
            environment = %environment,
            expires_in = ?token.expires_in().map(|d| d.as_secs()),
            "obtained access token"
        );
        Ok(token)
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator").finish_non_exhaustive()
    }
}

fn cache_key(ctx: &BuildContext<'_>) -> String {
    format!(
        "daraja:token:{}:{}",
        ctx.config.environment, ctx.credentials.consumer_key
    )
}
