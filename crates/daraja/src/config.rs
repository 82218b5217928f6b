//! Client configuration.
//!
//! Configuration is loaded once from TOML and then shared read-only. Section
//! and key names follow the gateway account settings:
//!
//! ```toml
//! environment = "sandbox"
//!
//! [app]
//! consumer_key = "${DARAJA_CONSUMER_KEY}"
//! consumer_secret = "${DARAJA_CONSUMER_SECRET}"
//!
//! [account]
//! short_code = "174379"
//! initiator_name = "testapi"
//! initiator_password = "${DARAJA_INITIATOR_PASSWORD}"
//!
//! [stkpush]
//! passkey = "${DARAJA_PASSKEY}"
//! callback_url = "https://example.com/mpesa/stk"
//! ```

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::environment::Environment;
use crate::error::{DarajaError, DarajaResult};

static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env var pattern is valid")
});

/// Expand environment variables in a string.
/// Supports `${VAR_NAME}` syntax; unset variables are left as written.
fn expand_env_vars(input: &str) -> String {
    ENV_VAR_PATTERN
        .replace_all(input, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| caps[0].to_string())
        })
        .to_string()
}

/// Expand `${VAR}` references in every string of a parsed document.
///
/// Values are substituted verbatim; TOML escapes are never applied to them.
fn expand_env_vars_in(value: &mut toml::Value) {
    match value {
        toml::Value::String(s) => {
            if ENV_VAR_PATTERN.is_match(s) {
                *s = expand_env_vars(s);
            }
        }
        toml::Value::Array(items) => items.iter_mut().for_each(expand_env_vars_in),
        toml::Value::Table(table) => {
            for (_, item) in table.iter_mut() {
                expand_env_vars_in(item);
            }
        }
        _ => {}
    }
}

/// Daraja client configuration loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DarajaConfig {
    /// Target deployment.
    pub environment: Environment,
    /// App (OAuth client) credentials.
    pub app: AppConfig,
    /// Merchant account settings.
    pub account: AccountConfig,
    /// M-PESA Express (STK push) settings.
    pub stkpush: StkPushConfig,
    /// Customer-to-business settings.
    pub c2b: C2bConfig,
    /// Business-to-customer settings.
    pub b2c: B2cConfig,
    /// Business-to-business settings.
    pub b2b: B2bConfig,
    /// Transaction status query settings.
    pub transactionstatus: TransactionStatusConfig,
    /// Account balance query settings.
    pub accountbalance: AccountBalanceConfig,
    /// Reversal settings.
    pub reversal: ReversalConfig,
    /// Dynamic QR code settings.
    pub qrcode: QrCodeConfig,
    /// Configurable endpoint paths.
    pub endpoints: EndpointsConfig,
    /// Gateway certificate location.
    pub cert: CertConfig,
    /// HTTP transport settings.
    pub http: HttpConfig,
    /// Access token cache settings.
    pub cache: CacheConfig,
}

impl DarajaConfig {
    /// Load configuration from a TOML file.
    /// Environment variables in `${VAR}` format are expanded inside string values.
    pub fn load(path: impl AsRef<Path>) -> DarajaResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DarajaError::configuration(format!(
                "failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> DarajaResult<Self> {
        let mut document: toml::Value = toml::from_str(contents)?;
        expand_env_vars_in(&mut document);
        Ok(document.try_into()?)
    }

    /// Check the fields every operation depends on.
    ///
    /// Operations check their own requirements when they run; this is for
    /// applications that want to fail at startup instead.
    pub fn validate(&self) -> DarajaResult<()> {
        if self.app.consumer_key.is_empty() {
            return Err(DarajaError::configuration("app.consumer_key is not set"));
        }
        if self.app.consumer_secret.is_empty() {
            return Err(DarajaError::configuration("app.consumer_secret is not set"));
        }
        if self.account.short_code.is_empty() {
            return Err(DarajaError::configuration("account.short_code is not set"));
        }
        if self.http.timeout_secs == 0 {
            return Err(DarajaError::configuration(
                "http.timeout_secs must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Look up a value by dotted key, e.g. `"b2c.command_id"`.
    ///
    /// Keys are case-insensitive. Returns `None` if any segment is missing.
    pub fn get(&self, key: &str) -> Option<toml::Value> {
        let root = toml::Value::try_from(self).ok()?;
        let key = key.to_ascii_lowercase();
        let mut current = &root;
        for segment in key.split('.') {
            current = current.as_table()?.get(segment)?;
        }
        Some(current.clone())
    }

    /// Look up a value by dotted key, falling back to `default`.
    pub fn get_or(&self, key: &str, default: impl Into<toml::Value>) -> toml::Value {
        self.get(key).unwrap_or_else(|| default.into())
    }

    /// Immutable account credentials derived from this configuration.
    pub fn credentials(&self) -> Credentials {
        Credentials {
            consumer_key: self.app.consumer_key.clone(),
            consumer_secret: Zeroizing::new(self.app.consumer_secret.clone()),
            initiator_name: self.account.initiator_name.clone(),
            initiator_password: Zeroizing::new(self.account.initiator_password.clone()),
            short_code: self.account.short_code.clone(),
            pass_key: Zeroizing::new(self.stkpush.passkey.clone()),
        }
    }

    /// Path of the gateway certificate for the configured environment.
    ///
    /// `cert.file` wins when set; otherwise the environment's file name is
    /// joined onto `cert.path`.
    pub fn certificate_path(&self) -> PathBuf {
        match &self.cert.file {
            Some(file) => file.clone(),
            None => self
                .cert
                .path
                .join(self.environment.certificate_file_name()),
        }
    }
}

/// App credentials used for the OAuth token.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Consumer key
    pub consumer_key: String,
    /// Consumer secret
    pub consumer_secret: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"[REDACTED]")
            .finish()
    }
}

/// Merchant account settings.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Business short code (paybill or till)
    pub short_code: String,
    /// Initiator (API operator) user name
    pub initiator_name: String,
    /// Initiator password, encrypted into the security credential
    pub initiator_password: String,
    /// Merchant display name for QR codes
    pub merchant_name: String,
}

impl std::fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountConfig")
            .field("short_code", &self.short_code)
            .field("initiator_name", &self.initiator_name)
            .field("initiator_password", &"[REDACTED]")
            .field("merchant_name", &self.merchant_name)
            .finish()
    }
}

/// M-PESA Express settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StkPushConfig {
    /// Lipa na M-PESA Online pass key
    pub passkey: String,
    /// `CustomerPayBillOnline` or `CustomerBuyGoodsOnline`
    pub transaction_type: String,
    /// URL the payment result is posted to
    pub callback_url: String,
}

impl Default for StkPushConfig {
    fn default() -> Self {
        Self {
            passkey: String::new(),
            transaction_type: "CustomerPayBillOnline".to_string(),
            callback_url: String::new(),
        }
    }
}

impl std::fmt::Debug for StkPushConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StkPushConfig")
            .field("passkey", &"[REDACTED]")
            .field("transaction_type", &self.transaction_type)
            .field("callback_url", &self.callback_url)
            .finish()
    }
}

/// C2B API revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum C2bApiVersion {
    /// `mpesa/c2b/v1/*`
    #[default]
    V1,
    /// `mpesa/c2b/v2/*`
    V2,
}

impl C2bApiVersion {
    /// Path segment.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }
}

/// Customer-to-business settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct C2bConfig {
    /// API revision for register URL and simulate
    pub api_version: C2bApiVersion,
    /// `Completed` or `Cancelled` when the validation URL is unreachable
    pub response_type: String,
    /// Confirmation URL
    pub confirmation_url: String,
    /// Validation URL
    pub validation_url: String,
    /// Command ID used by simulate
    pub command_id: String,
}

impl Default for C2bConfig {
    fn default() -> Self {
        Self {
            api_version: C2bApiVersion::V1,
            response_type: "Completed".to_string(),
            confirmation_url: String::new(),
            validation_url: String::new(),
            command_id: "CustomerPayBillOnline".to_string(),
        }
    }
}

/// Business-to-customer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct B2cConfig {
    /// `BusinessPayment`, `SalaryPayment` or `PromotionPayment`
    pub command_id: String,
    /// Queue time-out URL
    pub queue_time_out_url: String,
    /// Result URL
    pub result_url: String,
}

impl Default for B2cConfig {
    fn default() -> Self {
        Self {
            command_id: "BusinessPayment".to_string(),
            queue_time_out_url: String::new(),
            result_url: String::new(),
        }
    }
}

/// Business-to-business settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct B2bConfig {
    /// `BusinessPayBill` or `BusinessBuyGoods`
    pub command_id: String,
    /// Sender identifier type (4 = short code)
    pub sender_identifier_type: u32,
    /// Receiver identifier type (4 = short code)
    pub reciever_identifier_type: u32,
    /// Queue time-out URL
    pub queue_time_out_url: String,
    /// Result URL
    pub result_url: String,
}

impl Default for B2bConfig {
    fn default() -> Self {
        Self {
            command_id: "BusinessPayBill".to_string(),
            sender_identifier_type: 4,
            reciever_identifier_type: 4,
            queue_time_out_url: String::new(),
            result_url: String::new(),
        }
    }
}

/// Transaction status query settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionStatusConfig {
    /// Command ID
    pub command_id: String,
    /// Identifier type of `PartyA` (4 = short code)
    pub identifier_type: u32,
    /// Queue time-out URL
    pub queue_time_out_url: String,
    /// Result URL
    pub result_url: String,
}

impl Default for TransactionStatusConfig {
    fn default() -> Self {
        Self {
            command_id: "TransactionStatusQuery".to_string(),
            identifier_type: 4,
            queue_time_out_url: String::new(),
            result_url: String::new(),
        }
    }
}

/// Account balance query settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountBalanceConfig {
    /// Command ID
    pub command_id: String,
    /// Identifier type of `PartyA` (4 = short code)
    pub identifier_type: u32,
    /// Queue time-out URL
    pub queue_time_out_url: String,
    /// Result URL
    pub result_url: String,
}

impl Default for AccountBalanceConfig {
    fn default() -> Self {
        Self {
            command_id: "AccountBalance".to_string(),
            identifier_type: 4,
            queue_time_out_url: String::new(),
            result_url: String::new(),
        }
    }
}

/// Reversal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReversalConfig {
    /// Command ID
    pub command_id: String,
    /// Receiver identifier type (11 = till number)
    pub reciever_identifier_type: u32,
    /// Queue time-out URL
    pub queue_time_out_url: String,
    /// Result URL
    pub result_url: String,
}

impl Default for ReversalConfig {
    fn default() -> Self {
        Self {
            command_id: "TransactionReversal".to_string(),
            reciever_identifier_type: 11,
            queue_time_out_url: String::new(),
            result_url: String::new(),
        }
    }
}

/// Dynamic QR code settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QrCodeConfig {
    /// Transaction code: `BG`, `WA`, `PB`, `SM` or `SB`
    pub trx_code: String,
    /// Image size in pixels
    pub size: u32,
}

impl Default for QrCodeConfig {
    fn default() -> Self {
        Self {
            trx_code: "BG".to_string(),
            size: 300,
        }
    }
}

/// Endpoint paths that vary between gateway deployments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    /// Dynamic QR code generation path
    pub qrcode: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            qrcode: "mpesa/qrcode/v1/generate".to_string(),
        }
    }
}

/// Gateway certificate location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CertConfig {
    /// Explicit certificate file; overrides `path`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Directory holding `mpesa_sandbox.cer` and `mpesa_production.cer`.
    pub path: PathBuf,
}

impl Default for CertConfig {
    fn default() -> Self {
        Self {
            file: None,
            path: PathBuf::from("certs"),
        }
    }
}

/// HTTP transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Skip TLS certificate verification. Honoured in sandbox only.
    pub accept_invalid_certs: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            accept_invalid_certs: false,
        }
    }
}

/// Access token cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache OAuth tokens in memory until they expire.
    pub enable: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enable: true }
    }
}

/// Account credentials, fixed for the lifetime of a client.
#[derive(Clone)]
pub struct Credentials {
    /// OAuth consumer key
    pub consumer_key: String,
    /// OAuth consumer secret
    pub consumer_secret: Zeroizing<String>,
    /// Initiator user name
    pub initiator_name: String,
    /// Initiator password
    pub initiator_password: Zeroizing<String>,
    /// Business short code
    pub short_code: String,
    /// STK push pass key
    pub pass_key: Zeroizing<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("initiator_name", &self.initiator_name)
            .field("short_code", &self.short_code)
            .finish_non_exhaustive()
    }
}
