//! Helper functions for creating test fixtures.
//!
//! Provides a throwaway gateway certificate, a fully populated sandbox
//! configuration, and a client wired to a [`MockTransport`] with a frozen
//! clock.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use daraja::{DarajaClient, DarajaConfig, Environment, MemoryTokenCache, TimestampProvider};
use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::rsa::{Padding, Rsa};
use openssl::x509::{X509Builder, X509NameBuilder};
use tempfile::TempDir;

use crate::MockTransport;

/// Initiator password in [`sandbox_config`].
pub const TEST_INITIATOR_PASSWORD: &str = "Safaricom999!*!";

/// Short code in [`sandbox_config`].
pub const TEST_SHORT_CODE: &str = "174379";

/// Pass key in [`sandbox_config`].
pub const TEST_PASS_KEY: &str = "bfb279f9aa9bdbcf158e97dd71a467cd2e0c893059b10f78e6b72ada1ed2c919";

/// Gateway timestamp for [`FROZEN_UNIX_SECONDS`] in East Africa Time.
pub const FROZEN_TIMESTAMP: &str = "20240309153005";

/// Instant the test clock is frozen at (2024-03-09 12:30:05 UTC).
pub const FROZEN_UNIX_SECONDS: i64 = 1_709_987_405;

/// A generated RSA key pair whose self-signed certificate stands in for the
/// gateway's.
///
/// The certificate is written to a temporary directory under both the
/// sandbox and production file names.
pub struct CertificateFixture {
    key: PKey<Private>,
    certificate_pem: Vec<u8>,
    dir: TempDir,
}

impl CertificateFixture {
    /// Generate a 2048-bit key pair and certificate.
    pub fn generate() -> Self {
        let rsa = Rsa::generate(2048).expect("generate RSA key");
        let key = PKey::from_rsa(rsa).expect("wrap RSA key");

        let mut name = X509NameBuilder::new().expect("name builder");
        name.append_entry_by_text("CN", "sandbox.safaricom.co.ke")
            .expect("set CN");
        let name = name.build();

        let mut builder = X509Builder::new().expect("x509 builder");
        builder.set_version(2).expect("set version");
        let serial = BigNum::from_u32(1)
            .and_then(|n| n.to_asn1_integer())
            .expect("serial");
        builder.set_serial_number(&serial).expect("set serial");
        builder.set_subject_name(&name).expect("set subject");
        builder.set_issuer_name(&name).expect("set issuer");
        builder.set_pubkey(&key).expect("set pubkey");
        let not_before = Asn1Time::days_from_now(0).expect("not before");
        let not_after = Asn1Time::days_from_now(365).expect("not after");
        builder.set_not_before(&not_before).expect("set not before");
        builder.set_not_after(&not_after).expect("set not after");
        builder
            .sign(&key, MessageDigest::sha256())
            .expect("sign certificate");
        let certificate_pem = builder.build().to_pem().expect("encode certificate");

        let dir = TempDir::new().expect("create temp dir");
        for env in [Environment::Sandbox, Environment::Production] {
            std::fs::write(dir.path().join(env.certificate_file_name()), &certificate_pem)
                .expect("write certificate");
        }

        Self {
            key,
            certificate_pem,
            dir,
        }
    }

    /// Directory holding `mpesa_sandbox.cer` and `mpesa_production.cer`.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// PEM-encoded certificate.
    pub fn certificate_pem(&self) -> &[u8] {
        &self.certificate_pem
    }

    /// Decrypt a Base64 security credential with the private key.
    pub fn decrypt(&self, credential: &str) -> String {
        let ciphertext = openssl::base64::decode_block(credential).expect("decode base64");
        let rsa = self.key.rsa().expect("rsa key");
        let mut plain = vec![0u8; rsa.size() as usize];
        let len = rsa
            .private_decrypt(&ciphertext, &mut plain, Padding::PKCS1)
            .expect("decrypt credential");
        String::from_utf8(plain[..len].to_vec()).expect("utf-8 password")
    }
}

/// A sandbox configuration with every field populated.
pub fn sandbox_config(cert_dir: &Path) -> DarajaConfig {
    let mut config = DarajaConfig::default();
    config.environment = Environment::Sandbox;
    config.app.consumer_key = "test-consumer-key".into();
    config.app.consumer_secret = "test-consumer-secret".into();
    config.account.short_code = TEST_SHORT_CODE.into();
    config.account.initiator_name = "testapi".into();
    config.account.initiator_password = TEST_INITIATOR_PASSWORD.into();
    config.account.merchant_name = "Test Merchant".into();
    config.stkpush.passkey = TEST_PASS_KEY.into();
    config.stkpush.callback_url = "https://example.com/mpesa/stk".into();
    config.c2b.confirmation_url = "https://example.com/mpesa/confirm".into();
    config.c2b.validation_url = "https://example.com/mpesa/validate".into();
    config.b2c.queue_time_out_url = "https://example.com/mpesa/b2c/timeout".into();
    config.b2c.result_url = "https://example.com/mpesa/b2c/result".into();
    config.b2b.queue_time_out_url = "https://example.com/mpesa/b2b/timeout".into();
    config.b2b.result_url = "https://example.com/mpesa/b2b/result".into();
    config.transactionstatus.queue_time_out_url = "https://example.com/mpesa/status/timeout".into();
    config.transactionstatus.result_url = "https://example.com/mpesa/status/result".into();
    config.accountbalance.queue_time_out_url = "https://example.com/mpesa/balance/timeout".into();
    config.accountbalance.result_url = "https://example.com/mpesa/balance/result".into();
    config.reversal.queue_time_out_url = "https://example.com/mpesa/reversal/timeout".into();
    config.reversal.result_url = "https://example.com/mpesa/reversal/result".into();
    config.cert.path = cert_dir.to_path_buf();
    config
}

/// Timestamps frozen at [`FROZEN_UNIX_SECONDS`].
pub fn frozen_timestamps() -> TimestampProvider {
    let instant = DateTime::<Utc>::from_timestamp(FROZEN_UNIX_SECONDS, 0).expect("valid instant");
    TimestampProvider::fixed(instant)
}

/// A client over `transport` with an in-memory token cache and a frozen clock.
pub fn test_client(config: DarajaConfig, transport: &MockTransport) -> DarajaClient {
    DarajaClient::from_parts(
        config,
        Arc::new(transport.clone()),
        Arc::new(MemoryTokenCache::new()),
        frozen_timestamps(),
    )
}
