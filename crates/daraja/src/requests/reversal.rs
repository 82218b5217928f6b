//! Transaction reversal.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{to_overrides, BuildContext, Operation, RequestBuilder};
use crate::error::DarajaResult;
use crate::params::Params;

/// Reverses a completed transaction.
#[derive(Debug, Clone, Copy)]
pub struct Reversal;

impl RequestBuilder for Reversal {
    const OPERATION: Operation = Operation::Reversal;

    fn defaults(ctx: &BuildContext<'_>) -> DarajaResult<Params> {
        let reversal = &ctx.config.reversal;
        Ok(Params::new()
            .with("Initiator", ctx.initiator_name()?)
            .with("SecurityCredential", ctx.security_credential()?)
            .with("CommandID", reversal.command_id.as_str())
            .with("TransactionID", "")
            .with("Amount", 0)
            .with("ReceiverParty", ctx.short_code()?)
            .with("RecieverIdentifierType", reversal.reciever_identifier_type)
            .with("ResultURL", reversal.result_url.as_str())
            .with("QueueTimeOutURL", reversal.queue_time_out_url.as_str())
            .with("Remarks", "Sending a transaction reversal request")
            .with("Occasion", ""))
    }
}

/// Typed overrides for [`Reversal`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReversalRequest {
    /// M-PESA receipt of the transaction to reverse
    #[serde(rename = "TransactionID", skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    /// Amount to reverse
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    /// Organisation receiving the reversal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_party: Option<String>,
    /// Receiver identifier type (the gateway spells it this way)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reciever_identifier_type: Option<u32>,
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

impl ReversalRequest {
    /// Reverse `amount` of `transaction_id`.
    pub fn new(transaction_id: impl Into<String>, amount: u64) -> Self {
        Self {
            transaction_id: Some(transaction_id.into()),
            amount: Some(amount),
            ..Default::default()
        }
    }
}

impl From<ReversalRequest> for Params {
    fn from(request: ReversalRequest) -> Self {
        to_overrides(&request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requests::fixture::{assert_body_eq, SigningFixture, INITIATOR_PASSWORD};
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let fixture = SigningFixture::new();
        let request = Reversal::build(
            &fixture.ctx(),
            ReversalRequest::new("OEI2AK4Q16", 100).into(),
        )
        .unwrap();
        assert_eq!(request.path, "mpesa/reversal/v1/request");
        assert_body_eq(
            &fixture.decrypted(request.body),
            &json!({
                "Initiator": "testapi",
                "SecurityCredential": INITIATOR_PASSWORD,
                "CommandID": "TransactionReversal",
                "TransactionID": "OEI2AK4Q16",
                "Amount": 100,
                "ReceiverParty": "174379",
                "RecieverIdentifierType": 11,
                "ResultURL": "https://example.com/reversal/result",
                "QueueTimeOutURL": "https://example.com/reversal/timeout",
                "Remarks": "Sending a transaction reversal request",
                "Occasion": "",
            }),
        );
    }

    #[test]
    fn test_receiver_identifier_type_override() {
        let fixture = SigningFixture::new();
        let overrides = Params::new().with("RecieverIdentifierType", 4);
        let body = Reversal::build(&fixture.ctx(), overrides).unwrap().body;
        assert_eq!(body.get("RecieverIdentifierType"), Some(&json!(4)));
    }
}
