//! Security credential generation.
//!
//! The back-office APIs (B2C, B2B, transaction status, account balance and
//! reversal) authenticate the initiator with a security credential:
//!
//! ```text
//! SecurityCredential = Base64(RSA_Encrypt_PKCS1v1.5(initiator_password, gateway_public_key))
//! ```
//!
//! The gateway only accepts PKCS#1 v1.5 padding. OAEP ciphertexts are rejected.

use std::io::ErrorKind;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use openssl::pkey::{PKey, Public};
use openssl::rsa::{Padding, Rsa};
use openssl::x509::X509;

use crate::error::{CryptoError, CryptoResult};

/// Encrypt the initiator password against the gateway certificate.
///
/// `certificate` may be a PEM or DER encoded X.509 certificate, or a bare PEM
/// public key. The output is standard Base64 without line wrapping. PKCS#1
/// v1.5 is randomised, so two calls with the same inputs produce different
/// ciphertexts.
///
/// # Example
/// ```no_run
/// use daraja_crypto::{load_certificate, security_credential};
///
/// let cert = load_certificate("certs/mpesa_sandbox.cer")?;
/// let credential = security_credential("Safaricom999!*!", &cert)?;
/// assert!(!credential.is_empty());
/// # Ok::<(), daraja_crypto::CryptoError>(())
/// ```
pub fn security_credential(initiator_password: &str, certificate: &[u8]) -> CryptoResult<String> {
    if initiator_password.is_empty() {
        return Err(CryptoError::configuration(
            "unable to generate the security credential: the initiator password is not set",
        ));
    }

    let rsa = rsa_public_key(certificate)?;
    // PKCS#1 v1.5 needs 11 bytes of padding
    let max_len = (rsa.size() as usize).saturating_sub(11);
    if initiator_password.len() > max_len {
        return Err(CryptoError::configuration(format!(
            "unable to generate the security credential: the initiator password is {} bytes, \
             the certificate key accepts at most {}",
            initiator_password.len(),
            max_len
        )));
    }

    let mut encrypted = vec![0u8; rsa.size() as usize];
    let len = rsa
        .public_encrypt(initiator_password.as_bytes(), &mut encrypted, Padding::PKCS1)
        .map_err(|e| CryptoError::certificate_invalid(format!("encryption failed: {}", e)))?;
    encrypted.truncate(len);

    Ok(STANDARD.encode(&encrypted))
}

/// Read a certificate file fully and close it.
///
/// Missing files map to [`CryptoError::CertificateNotFound`], other IO
/// failures to [`CryptoError::CertificateUnreadable`] and empty files to
/// [`CryptoError::CertificateInvalid`].
pub fn load_certificate(path: impl AsRef<Path>) -> CryptoResult<Vec<u8>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CryptoError::CertificateNotFound(path.to_path_buf()),
        _ => CryptoError::CertificateUnreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })?;

    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(CryptoError::certificate_invalid(format!(
            "certificate file {} is empty",
            path.display()
        )));
    }

    Ok(bytes)
}

/// Extract the RSA public key from certificate bytes.
fn rsa_public_key(certificate: &[u8]) -> CryptoResult<Rsa<Public>> {
    if certificate.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(CryptoError::certificate_invalid("certificate content is empty"));
    }

    let pkey: PKey<Public> = if let Ok(cert) = X509::from_pem(certificate) {
        cert.public_key()
            .map_err(|e| CryptoError::certificate_invalid(e.to_string()))?
    } else if let Ok(cert) = X509::from_der(certificate) {
        cert.public_key()
            .map_err(|e| CryptoError::certificate_invalid(e.to_string()))?
    } else {
        PKey::public_key_from_pem(certificate).map_err(|_| {
            CryptoError::certificate_invalid("not a PEM/DER X.509 certificate or PEM public key")
        })?
    };

    pkey.rsa()
        .map_err(|_| CryptoError::certificate_invalid("certificate does not carry an RSA key"))
}
