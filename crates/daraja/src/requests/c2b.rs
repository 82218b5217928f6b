//! Customer-to-business URL registration and payment simulation.
//!
//! Neither operation needs a signed secret.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{to_overrides, BuildContext, Operation, RequestBuilder};
use crate::error::DarajaResult;
use crate::params::Params;

/// Registers the confirmation and validation URLs for the short code.
#[derive(Debug, Clone, Copy)]
pub struct C2bRegisterUrl;

impl RequestBuilder for C2bRegisterUrl {
    const OPERATION: Operation = Operation::C2bRegisterUrl;

    fn defaults(ctx: &BuildContext<'_>) -> DarajaResult<Params> {
        let c2b = &ctx.config.c2b;
        Ok(Params::new()
            .with("ShortCode", ctx.short_code()?)
            .with("ResponseType", c2b.response_type.as_str())
            .with("ConfirmationURL", c2b.confirmation_url.as_str())
            .with("ValidationURL", c2b.validation_url.as_str()))
    }
}

/// Simulates a customer paying the short code. Sandbox only on the gateway side.
#[derive(Debug, Clone, Copy)]
pub struct C2bSimulate;

impl RequestBuilder for C2bSimulate {
    const OPERATION: Operation = Operation::C2bSimulate;

    fn defaults(ctx: &BuildContext<'_>) -> DarajaResult<Params> {
        Ok(Params::new()
            .with("ShortCode", ctx.short_code()?)
            .with("CommandID", ctx.config.c2b.command_id.as_str())
            .with("Amount", 0)
            .with("MSISDN", "")
            .with("BillRefNumber", ctx.generated_reference().to_string()))
    }
}

/// Typed overrides for [`C2bRegisterUrl`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct C2bRegisterRequest {
    /// Short code to register
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_code: Option<String>,
    /// `Completed` or `Cancelled`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_type: Option<String>,
    /// Confirmation URL
    #[serde(rename = "ConfirmationURL", skip_serializing_if = "Option::is_none")]
    pub confirmation_url: Option<String>,
    /// Validation URL
    #[serde(rename = "ValidationURL", skip_serializing_if = "Option::is_none")]
    pub validation_url: Option<String>,
    /// Additional raw fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<C2bRegisterRequest> for Params {
    fn from(request: C2bRegisterRequest) -> Self {
        to_overrides(&request)
    }
}

/// Typed overrides for [`C2bSimulate`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct C2bSimulateRequest {
    /// Receiving short code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_code: Option<String>,
    /// `CustomerPayBillOnline` or `CustomerBuyGoodsOnline`
    #[serde(rename = "CommandID", skip_serializing_if = "Option::is_none")]
    pub command_id: Option<String>,
    /// Amount paid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    /// Paying phone number
    #[serde(rename = "MSISDN", skip_serializing_if = "Option::is_none")]
    pub msisdn: Option<String>,
    /// Bill reference (account number)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_ref_number: Option<String>,
    /// Additional raw fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl C2bSimulateRequest {
    /// `msisdn` pays `amount`.
    pub fn new(msisdn: impl Into<String>, amount: u64) -> Self {
        Self {
            msisdn: Some(msisdn.into()),
            amount: Some(amount),
            ..Default::default()
        }
    }
}

impl From<C2bSimulateRequest> for Params {
    fn from(request: C2bSimulateRequest) -> Self {
        to_overrides(&request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::C2bApiVersion;
    use crate::requests::fixture::{sandbox_config, Fixture, UNIX_SECONDS};
    use serde_json::json;

    #[test]
    fn test_register_defaults() {
        let fixture = Fixture::new();
        let request = C2bRegisterUrl::build(&fixture.ctx(), Params::new()).unwrap();
        assert_eq!(request.path, "mpesa/c2b/v1/registerurl");
        assert_eq!(
            request.body.into_value(),
            json!({
                "ShortCode": "174379",
                "ResponseType": "Completed",
                "ConfirmationURL": "https://example.com/confirm",
                "ValidationURL": "https://example.com/validate",
            })
        );
    }

    #[test]
    fn test_register_override() {
        let fixture = Fixture::new();
        let request = C2bRegisterRequest {
            response_type: Some("Cancelled".into()),
            ..Default::default()
        };
        let body = C2bRegisterUrl::build(&fixture.ctx(), request.into())
            .unwrap()
            .body;
        assert_eq!(body.get("ResponseType"), Some(&json!("Cancelled")));
        assert_eq!(body.get("ShortCode"), Some(&json!("174379")));
    }

    #[test]
    fn test_simulate_defaults() {
        let mut config = sandbox_config();
        config.c2b.api_version = C2bApiVersion::V2;
        let fixture = Fixture::with_config(config);
        let request = C2bSimulate::build(
            &fixture.ctx(),
            C2bSimulateRequest::new("254708374149", 100).into(),
        )
        .unwrap();
        assert_eq!(request.path, "mpesa/c2b/v2/simulate");
        assert_eq!(
            request.body.into_value(),
            json!({
                "ShortCode": "174379",
                "CommandID": "CustomerPayBillOnline",
                "Amount": 100,
                "MSISDN": "254708374149",
                "BillRefNumber": UNIX_SECONDS.to_string(),
            })
        );
    }

    #[test]
    fn test_missing_short_code() {
        let mut config = sandbox_config();
        config.account.short_code.clear();
        let fixture = Fixture::with_config(config);
        assert!(C2bRegisterUrl::build(&fixture.ctx(), Params::new()).is_err());
    }
}
