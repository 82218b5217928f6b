//! Lipa na M-PESA Online (STK push) password.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{CryptoError, CryptoResult};

/// Derive the STK push password.
///
/// ```text
/// Password = Base64(short_code + pass_key + timestamp)
/// ```
///
/// The same `timestamp` must be sent in the request's `Timestamp` field.
///
/// # Example
/// ```
/// use daraja_crypto::stk_password;
///
/// let password = stk_password("174379", "passkey", "20240101120000").unwrap();
/// assert_eq!(password, "MTc0Mzc5cGFzc2tleTIwMjQwMTAxMTIwMDAw");
/// ```
pub fn stk_password(short_code: &str, pass_key: &str, timestamp: &str) -> CryptoResult<String> {
    if short_code.is_empty() {
        return Err(CryptoError::configuration(
            "unable to generate the STK push password: the business short code is not set",
        ));
    }

    if pass_key.is_empty() {
        return Err(CryptoError::configuration(
            "unable to generate the STK push password: the pass key is not set",
        ));
    }

    Ok(STANDARD.encode(format!("{}{}{}", short_code, pass_key, timestamp)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_decodes_to_concatenation() {
        let password = stk_password(
            "174379",
            "bfb279f9aa9bdbcf158e97dd71a467cd2e0c893059b10f78e6b72ada1ed2c919",
            "20240131235959",
        )
        .unwrap();

        let decoded = String::from_utf8(STANDARD.decode(password).unwrap()).unwrap();
        assert_eq!(
            decoded,
            "174379bfb279f9aa9bdbcf158e97dd71a467cd2e0c893059b10f78e6b72ada1ed2c91920240131235959"
        );
    }

    #[test]
    fn test_password_is_deterministic() {
        let a = stk_password("600000", "key", "20240101000000").unwrap();
        let b = stk_password("600000", "key", "20240101000000").unwrap();
        assert_eq!(a, b);

        let c = stk_password("600000", "key", "20240101000001").unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_missing_short_code() {
        let err = stk_password("", "key", "20240101000000").unwrap_err();
        assert!(matches!(err, CryptoError::Configuration(_)));
        assert!(err.to_string().contains("short code"));
    }

    #[test]
    fn test_missing_pass_key() {
        let err = stk_password("174379", "", "20240101000000").unwrap_err();
        assert!(matches!(err, CryptoError::Configuration(_)));
        assert!(err.to_string().contains("pass key"));
    }
}
