//! Credential derivation for the M-PESA Daraja APIs.
//!
//! This crate derives the two secrets the gateway requires, plus the
//! timestamp both of them depend on:
//!
//! - **Security credential**: RSA PKCS#1 v1.5 encryption of the initiator
//!   password against the gateway's public certificate, Base64 encoded.
//!   Required by B2C, B2B, transaction status, account balance and reversal.
//! - **STK password**: `Base64(short_code + pass_key + timestamp)`, required by
//!   the online payment (STK push) simulate and query operations.
//! - **Timestamp**: `YYYYMMDDHHmmss` in a fixed timezone (East Africa Time by
//!   default).
//!
//! Every value is derived fresh per request and never cached.
//!
//! # Example
//!
//! ```
//! use daraja_crypto::{stk_password, TimestampProvider};
//!
//! let timestamps = TimestampProvider::east_africa();
//! let timestamp = timestamps.now();
//! let password = stk_password("174379", "passkey", &timestamp).unwrap();
//! assert!(!password.is_empty());
//! ```

mod credential;
mod error;
mod password;
mod timestamp;

pub use credential::{load_certificate, security_credential};
pub use error::{CryptoError, CryptoResult};
pub use password::stk_password;
pub use timestamp::{
    Clock, FixedClock, SystemClock, TimestampProvider, EAST_AFRICA_TIME, TIMESTAMP_FORMAT,
};
