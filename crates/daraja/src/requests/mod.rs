//! Per-operation request builders.
//!
//! Each builder produces the endpoint path and effective body for one
//! gateway operation. Builders never perform I/O other than reading the
//! gateway certificate; the client hands the prepared request to a
//! [`Transport`](crate::transport::Transport).

mod authorization;
mod b2b;
mod b2c;
mod balance;
mod c2b;
mod express;
mod qrcode;
mod reversal;
mod status;

pub use authorization::{basic_credential, Authorization};
pub use b2b::{B2bPayment, B2bRequest};
pub use b2c::{B2cPayment, B2cRequest};
pub use balance::{AccountBalance, AccountBalanceRequest};
pub use c2b::{C2bRegisterRequest, C2bRegisterUrl, C2bSimulate, C2bSimulateRequest};
pub use express::{StkPushQuery, StkPushRequest, StkPushSimulate, StkQueryRequest};
pub use qrcode::{QrCodeGenerate, QrCodeRequest};
pub use reversal::{Reversal, ReversalRequest};
pub use status::{TransactionStatus, TransactionStatusRequest};

use daraja_crypto::{load_certificate, security_credential, stk_password, TimestampProvider};
use tracing::debug;

use crate::config::{Credentials, DarajaConfig};
use crate::environment::Environment;
use crate::error::{DarajaError, DarajaResult};
use crate::params::Params;
use crate::transport::HttpMethod;

/// Gateway operations and their endpoint paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// OAuth access token
    Authorization,
    /// M-PESA Express payment prompt
    StkPushSimulate,
    /// M-PESA Express status query
    StkPushQuery,
    /// C2B confirmation/validation URL registration
    C2bRegisterUrl,
    /// C2B payment simulation (sandbox)
    C2bSimulate,
    /// Business to customer payment
    B2cPayment,
    /// Business to business payment
    B2bPayment,
    /// Transaction status query
    TransactionStatus,
    /// Account balance query
    AccountBalance,
    /// Transaction reversal
    Reversal,
    /// Dynamic QR code generation
    QrCodeGenerate,
}

impl Operation {
    /// Every operation, in endpoint table order.
    pub const ALL: [Operation; 11] = [
        Self::Authorization,
        Self::StkPushSimulate,
        Self::StkPushQuery,
        Self::C2bRegisterUrl,
        Self::C2bSimulate,
        Self::B2cPayment,
        Self::B2bPayment,
        Self::TransactionStatus,
        Self::AccountBalance,
        Self::Reversal,
        Self::QrCodeGenerate,
    ];

    /// Name used in log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Authorization => "authorization",
            Self::StkPushSimulate => "stk_push_simulate",
            Self::StkPushQuery => "stk_push_query",
            Self::C2bRegisterUrl => "c2b_register_url",
            Self::C2bSimulate => "c2b_simulate",
            Self::B2cPayment => "b2c_payment",
            Self::B2bPayment => "b2b_payment",
            Self::TransactionStatus => "transaction_status",
            Self::AccountBalance => "account_balance",
            Self::Reversal => "reversal",
            Self::QrCodeGenerate => "qr_code_generate",
        }
    }

    /// Endpoint path relative to the environment base URL.
    ///
    /// The C2B paths follow `c2b.api_version`; the QR code path comes from
    /// `endpoints.qrcode`.
    pub fn path(&self, config: &DarajaConfig) -> String {
        match self {
            Self::Authorization => "oauth/v1/generate?grant_type=client_credentials".to_string(),
            Self::StkPushSimulate => "mpesa/stkpush/v1/processrequest".to_string(),
            Self::StkPushQuery => "mpesa/stkpushquery/v1/query".to_string(),
            Self::C2bRegisterUrl => {
                format!("mpesa/c2b/{}/registerurl", config.c2b.api_version.as_str())
            }
            Self::C2bSimulate => format!("mpesa/c2b/{}/simulate", config.c2b.api_version.as_str()),
            Self::B2cPayment => "mpesa/b2c/v1/paymentrequest".to_string(),
            Self::B2bPayment => "mpesa/b2b/v1/paymentrequest".to_string(),
            Self::TransactionStatus => "mpesa/transactionstatus/v1/query".to_string(),
            Self::AccountBalance => "mpesa/accountbalance/v1/query".to_string(),
            Self::Reversal => "mpesa/reversal/v1/request".to_string(),
            Self::QrCodeGenerate => config.endpoints.qrcode.trim_start_matches('/').to_string(),
        }
    }

    /// HTTP method the gateway expects.
    pub fn method(&self) -> HttpMethod {
        match self {
            Self::Authorization => HttpMethod::Get,
            _ => HttpMethod::Post,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A finished request: endpoint path plus effective body.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    /// Operation this request performs
    pub operation: Operation,
    /// Path relative to the environment base URL
    pub path: String,
    /// Effective body; empty for the token GET
    pub body: Params,
}

impl PreparedRequest {
    /// Absolute URL in the given environment.
    pub fn url(&self, environment: Environment) -> String {
        environment.url_for(&self.path)
    }

    /// HTTP method for this request.
    pub fn method(&self) -> HttpMethod {
        self.operation.method()
    }
}

/// Read-only inputs shared by every builder for one call.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    /// Client configuration
    pub config: &'a DarajaConfig,
    /// Account credentials
    pub credentials: &'a Credentials,
    /// Timestamp source
    pub timestamps: &'a TimestampProvider,
}

impl<'a> BuildContext<'a> {
    /// Bundle the builder inputs.
    pub fn new(
        config: &'a DarajaConfig,
        credentials: &'a Credentials,
        timestamps: &'a TimestampProvider,
    ) -> Self {
        Self {
            config,
            credentials,
            timestamps,
        }
    }

    /// The account short code, or a configuration error when unset.
    pub fn short_code(&self) -> DarajaResult<&'a str> {
        let short_code = self.credentials.short_code.as_str();
        if short_code.is_empty() {
            return Err(DarajaError::configuration("account.short_code is not set"));
        }
        Ok(short_code)
    }

    /// The initiator name, or a configuration error when unset.
    pub fn initiator_name(&self) -> DarajaResult<&'a str> {
        let name = self.credentials.initiator_name.as_str();
        if name.is_empty() {
            return Err(DarajaError::configuration(
                "account.initiator_name is not set",
            ));
        }
        Ok(name)
    }

    /// Derive a fresh security credential.
    ///
    /// The password is checked before the certificate is looked up, and the
    /// certificate is read from disk on every call.
    pub fn security_credential(&self) -> DarajaResult<String> {
        if self.credentials.initiator_password.is_empty() {
            return Err(DarajaError::configuration(
                "account.initiator_password is not set",
            ));
        }
        let path = self.config.certificate_path();
        debug!(path = %path.display(), "loading gateway certificate");
        let certificate = load_certificate(&path)?;
        Ok(security_credential(
            &self.credentials.initiator_password,
            &certificate,
        )?)
    }

    /// Derive the STK password for `timestamp`.
    pub fn stk_password(&self, timestamp: &str) -> DarajaResult<String> {
        if self.credentials.pass_key.is_empty() {
            return Err(DarajaError::configuration("stkpush.passkey is not set"));
        }
        Ok(stk_password(
            self.short_code()?,
            &self.credentials.pass_key,
            timestamp,
        )?)
    }

    /// Reference number generated from the clock (Unix seconds).
    pub fn generated_reference(&self) -> i64 {
        self.timestamps.unix_seconds()
    }
}

/// Builds the request for one operation.
///
/// Implementors supply the default body; [`RequestBuilder::build`] overlays
/// the caller's overrides and picks the endpoint.
pub trait RequestBuilder {
    /// Operation this builder prepares.
    const OPERATION: Operation;

    /// Canonical default body.
    fn defaults(ctx: &BuildContext<'_>) -> DarajaResult<Params>;

    /// Cross-field rules applied once after the overlay.
    fn reconcile(_body: &mut Params) {}

    /// Default body overlaid with `overrides`.
    fn build(ctx: &BuildContext<'_>, overrides: Params) -> DarajaResult<PreparedRequest> {
        let mut body = Self::defaults(ctx)?;
        body.overlay(overrides);
        Self::reconcile(&mut body);

        Ok(PreparedRequest {
            operation: Self::OPERATION,
            path: Self::OPERATION.path(ctx.config),
            body,
        })
    }
}

/// Convert a typed request into an override map.
///
/// Unset optional fields are skipped, so they never shadow defaults.
pub(crate) fn to_overrides<T: serde::Serialize>(request: &T) -> Params {
    match serde_json::to_value(request) {
        Ok(value) => Params::try_from(value).unwrap_or_default(),
        Err(_) => Params::new(),
    }
}

#[cfg(test)]
pub(crate) mod fixture {
    use chrono::{TimeZone, Utc};
    use daraja_crypto::TimestampProvider;
    use daraja_test_utils::CertificateFixture;
    use serde_json::Value;

    use super::BuildContext;
    use crate::config::{Credentials, DarajaConfig};
    use crate::params::Params;

    /// 2024-03-09 15:30:05 EAT
    pub const TIMESTAMP: &str = "20240309153005";
    pub const UNIX_SECONDS: i64 = 1_709_987_405;
    pub const INITIATOR_PASSWORD: &str = "Safaricom999!*!";

    pub struct Fixture {
        pub config: DarajaConfig,
        pub credentials: Credentials,
        pub timestamps: TimestampProvider,
    }

    impl Fixture {
        pub fn new() -> Self {
            Self::with_config(sandbox_config())
        }

        pub fn with_config(config: DarajaConfig) -> Self {
            let credentials = config.credentials();
            let instant = Utc.with_ymd_and_hms(2024, 3, 9, 12, 30, 5).unwrap();
            Self {
                config,
                credentials,
                timestamps: TimestampProvider::fixed(instant),
            }
        }

        pub fn ctx(&self) -> BuildContext<'_> {
            BuildContext::new(&self.config, &self.credentials, &self.timestamps)
        }
    }

    /// A fixture whose certificate directory holds a generated certificate,
    /// so builders can derive a security credential.
    pub struct SigningFixture {
        pub certificate: CertificateFixture,
        pub fixture: Fixture,
    }

    impl SigningFixture {
        pub fn new() -> Self {
            let certificate = CertificateFixture::generate();
            let mut config = sandbox_config();
            config.account.initiator_password = INITIATOR_PASSWORD.into();
            config.cert.path = certificate.dir().to_path_buf();
            config.b2c.queue_time_out_url = "https://example.com/b2c/timeout".into();
            config.b2c.result_url = "https://example.com/b2c/result".into();
            config.b2b.queue_time_out_url = "https://example.com/b2b/timeout".into();
            config.b2b.result_url = "https://example.com/b2b/result".into();
            config.transactionstatus.queue_time_out_url =
                "https://example.com/status/timeout".into();
            config.transactionstatus.result_url = "https://example.com/status/result".into();
            config.accountbalance.queue_time_out_url =
                "https://example.com/balance/timeout".into();
            config.accountbalance.result_url = "https://example.com/balance/result".into();
            config.reversal.queue_time_out_url = "https://example.com/reversal/timeout".into();
            config.reversal.result_url = "https://example.com/reversal/result".into();
            Self {
                certificate,
                fixture: Fixture::with_config(config),
            }
        }

        pub fn ctx(&self) -> BuildContext<'_> {
            self.fixture.ctx()
        }

        /// The body with `SecurityCredential` replaced by its decryption.
        pub fn decrypted(&self, body: Params) -> Value {
            let mut value = body.into_value();
            if let Some(credential) = value.get_mut("SecurityCredential") {
                let ciphertext = credential.as_str().expect("credential is a string");
                *credential = Value::String(self.certificate.decrypt(ciphertext));
            }
            value
        }
    }

    /// Equal values with keys in the same order.
    pub fn assert_body_eq(actual: &Value, expected: &Value) {
        assert_eq!(actual, expected);
        let keys = |value: &Value| -> Vec<String> {
            value
                .as_object()
                .map(|map| map.keys().cloned().collect())
                .unwrap_or_default()
        };
        assert_eq!(keys(actual), keys(expected));
    }

    pub fn sandbox_config() -> DarajaConfig {
        let mut config = DarajaConfig::default();
        config.app.consumer_key = "consumer-key".into();
        config.app.consumer_secret = "consumer-secret".into();
        config.account.short_code = "174379".into();
        config.account.initiator_name = "testapi".into();
        config.account.merchant_name = "Test Merchant".into();
        config.stkpush.passkey = "passkey".into();
        config.stkpush.callback_url = "https://example.com/stk".into();
        config.c2b.confirmation_url = "https://example.com/confirm".into();
        config.c2b.validation_url = "https://example.com/validate".into();
        config.cert.path = "/nonexistent/certs".into();
        config
    }
}
