//! OAuth token request.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use super::{BuildContext, Operation, RequestBuilder};
use crate::config::Credentials;
use crate::error::{DarajaError, DarajaResult};
use crate::params::Params;

/// Builds the token GET. The request has no body; the consumer key and
/// secret travel in the `Authorization: Basic` header.
#[derive(Debug, Clone, Copy)]
pub struct Authorization;

impl RequestBuilder for Authorization {
    const OPERATION: Operation = Operation::Authorization;

    fn defaults(ctx: &BuildContext<'_>) -> DarajaResult<Params> {
        basic_credential(ctx.credentials)?;
        Ok(Params::new())
    }
}

/// `base64(consumer_key:consumer_secret)` for the Basic auth header.
pub fn basic_credential(credentials: &Credentials) -> DarajaResult<String> {
    if credentials.consumer_key.is_empty() {
        return Err(DarajaError::configuration("app.consumer_key is not set"));
    }
    if credentials.consumer_secret.is_empty() {
        return Err(DarajaError::configuration("app.consumer_secret is not set"));
    }
    Ok(STANDARD.encode(format!(
        "{}:{}",
        credentials.consumer_key,
        credentials.consumer_secret.as_str()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requests::fixture::{sandbox_config, Fixture};

    #[test]
    fn test_basic_credential() {
        let credentials = sandbox_config().credentials();
        let encoded = basic_credential(&credentials).unwrap();
        let decoded = STANDARD.decode(encoded).unwrap();
        assert_eq!(decoded, b"consumer-key:consumer-secret");
    }

    #[test]
    fn test_missing_consumer_secret() {
        let mut config = sandbox_config();
        config.app.consumer_secret.clear();
        let fixture = Fixture::with_config(config);
        let err = Authorization::build(&fixture.ctx(), Params::new()).unwrap_err();
        assert!(matches!(err, DarajaError::Configuration(_)));
    }

    #[test]
    fn test_build_has_no_body() {
        let fixture = Fixture::new();
        let request = Authorization::build(&fixture.ctx(), Params::new()).unwrap();
        assert!(request.body.is_empty());
        assert_eq!(
            request.path,
            "oauth/v1/generate?grant_type=client_credentials"
        );
    }
}
