//! Client for the M-PESA Daraja payment gateway.
//!
//! The crate builds signed requests for the gateway's REST APIs, sends them
//! through a pluggable [`Transport`], and parses the callbacks the gateway
//! posts back.
//!
//! # Components
//!
//! - **[`config`]**: TOML configuration with `${VAR}` expansion
//! - **[`environment`]**: sandbox/production selection, base URLs, error posture
//! - **[`params`]**: ordered parameter maps and the default/override overlay
//! - **[`requests`]**: one builder per operation, plus typed request structs
//! - **[`auth`]**: OAuth tokens and the token cache
//! - **[`transport`]**: the HTTP seam and its `reqwest` implementation
//! - **[`callback`]**: tolerant callback extraction and acknowledgement bodies
//! - **[`client`]**: [`DarajaClient`], which ties the above together
//!
//! # Operations
//!
//! | Method | Endpoint |
//! |---|---|
//! | [`DarajaClient::access_token`] | `oauth/v1/generate` |
//! | [`DarajaClient::stk_push`] | `mpesa/stkpush/v1/processrequest` |
//! | [`DarajaClient::stk_query`] | `mpesa/stkpushquery/v1/query` |
//! | [`DarajaClient::c2b_register_urls`] | `mpesa/c2b/{v1,v2}/registerurl` |
//! | [`DarajaClient::c2b_simulate`] | `mpesa/c2b/{v1,v2}/simulate` |
//! | [`DarajaClient::b2c_payment`] | `mpesa/b2c/v1/paymentrequest` |
//! | [`DarajaClient::b2b_payment`] | `mpesa/b2b/v1/paymentrequest` |
//! | [`DarajaClient::transaction_status`] | `mpesa/transactionstatus/v1/query` |
//! | [`DarajaClient::account_balance`] | `mpesa/accountbalance/v1/query` |
//! | [`DarajaClient::reversal`] | `mpesa/reversal/v1/request` |
//! | [`DarajaClient::generate_qr_code`] | `endpoints.qrcode` |
//!
//! # Callbacks
//!
//! ```
//! use daraja::callback::{parse_payload, CallbackResponse, StkCallback};
//!
//! let body = r#"{"Body":{"stkCallback":{"MerchantRequestID":"1","CheckoutRequestID":"2",
//!     "ResultCode":0,"ResultDesc":"ok","CallbackMetadata":{"Item":[
//!     {"Name":"Amount","Value":10},{"Name":"MpesaReceiptNumber","Value":"NLJ7RT61SV"}]}}}}"#;
//! let callback = StkCallback::parse(&parse_payload(body)?)?;
//! assert_eq!(callback.amount, Some(10.0));
//! assert_eq!(callback.balance, None);
//!
//! let ack = CallbackResponse::finish(callback.is_success());
//! assert_eq!(ack.result_code, "0");
//! # Ok::<(), daraja::DarajaError>(())
//! ```

pub mod auth;
pub mod callback;
pub mod client;
pub mod config;
pub mod environment;
pub mod error;
pub mod params;
pub mod requests;
pub mod transport;

// Re-export main types
pub use auth::{AccessToken, Authenticator, MemoryTokenCache, NoopTokenCache, TokenCache};
pub use client::DarajaClient;
pub use config::{C2bApiVersion, Credentials, DarajaConfig};
pub use environment::{Environment, ErrorReporting, PRODUCTION_BASE_URL, SANDBOX_BASE_URL};
pub use error::{DarajaError, DarajaResult};
pub use params::Params;
pub use requests::{
    AccountBalanceRequest, B2bRequest, B2cRequest, C2bRegisterRequest, C2bSimulateRequest,
    Operation, PreparedRequest, QrCodeRequest, RequestBuilder, ReversalRequest, StkPushRequest,
    StkQueryRequest, TransactionStatusRequest,
};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, Transport};

pub use daraja_crypto::{Clock, FixedClock, SystemClock, TimestampProvider};
