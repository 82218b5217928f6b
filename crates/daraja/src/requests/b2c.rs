//! Business-to-customer payments.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{to_overrides, BuildContext, Operation, RequestBuilder};
use crate::error::DarajaResult;
use crate::params::Params;

/// Pays a customer from the short code.
#[derive(Debug, Clone, Copy)]
pub struct B2cPayment;

impl RequestBuilder for B2cPayment {
    const OPERATION: Operation = Operation::B2cPayment;

    fn defaults(ctx: &BuildContext<'_>) -> DarajaResult<Params> {
        let b2c = &ctx.config.b2c;
        Ok(Params::new()
            .with("InitiatorName", ctx.initiator_name()?)
            .with("SecurityCredential", ctx.security_credential()?)
            .with("CommandID", b2c.command_id.as_str())
            .with("Amount", 0)
            .with("PartyA", ctx.short_code()?)
            .with("PartyB", "")
            .with("Remarks", "Sending a B2C payment request")
            .with("QueueTimeOutURL", b2c.queue_time_out_url.as_str())
            .with("ResultURL", b2c.result_url.as_str())
            .with("Occasion", Value::Null))
    }
}

/// Typed overrides for [`B2cPayment`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct B2cRequest {
    /// `BusinessPayment`, `SalaryPayment` or `PromotionPayment`
    #[serde(rename = "CommandID", skip_serializing_if = "Option::is_none")]
    pub command_id: Option<String>,
    /// Amount to send
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    /// Receiving phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party_b: Option<String>,
    /// Free-text remarks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    /// Optional occasion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occasion: Option<String>,
    /// Queue time-out URL
    #[serde(rename = "QueueTimeOutURL", skip_serializing_if = "Option::is_none")]
    pub queue_time_out_url: Option<String>,
    /// Result URL
    #[serde(rename = "ResultURL", skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,
    /// Additional raw fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl B2cRequest {
    /// Send `amount` to `phone_number`.
    pub fn new(phone_number: impl Into<String>, amount: u64) -> Self {
        Self {
            party_b: Some(phone_number.into()),
            amount: Some(amount),
            ..Default::default()
        }
    }
}

impl From<B2cRequest> for Params {
    fn from(request: B2cRequest) -> Self {
        to_overrides(&request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DarajaError;
    use crate::requests::fixture::{assert_body_eq, Fixture, SigningFixture, INITIATOR_PASSWORD};
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let fixture = SigningFixture::new();
        let request = B2cPayment::build(
            &fixture.ctx(),
            B2cRequest::new("254708374149", 500).into(),
        )
        .unwrap();
        assert_eq!(request.path, "mpesa/b2c/v1/paymentrequest");
        assert_body_eq(
            &fixture.decrypted(request.body),
            &json!({
                "InitiatorName": "testapi",
                "SecurityCredential": INITIATOR_PASSWORD,
                "CommandID": "BusinessPayment",
                "Amount": 500,
                "PartyA": "174379",
                "PartyB": "254708374149",
                "Remarks": "Sending a B2C payment request",
                "QueueTimeOutURL": "https://example.com/b2c/timeout",
                "ResultURL": "https://example.com/b2c/result",
                "Occasion": null,
            }),
        );
    }

    #[test]
    fn test_typed_request_field_names() {
        let request = B2cRequest {
            queue_time_out_url: Some("https://example.com/timeout".into()),
            ..B2cRequest::new("254708374149", 500)
        };
        let params = Params::from(request);
        assert_eq!(
            params.into_value(),
            json!({
                "Amount": 500,
                "PartyB": "254708374149",
                "QueueTimeOutURL": "https://example.com/timeout",
            })
        );
    }

    #[test]
    fn test_requires_initiator_password() {
        let fixture = Fixture::new();
        let err = B2cPayment::build(&fixture.ctx(), B2cRequest::new("254708374149", 1).into())
            .unwrap_err();
        assert!(matches!(err, DarajaError::Configuration(_)));
    }
}
