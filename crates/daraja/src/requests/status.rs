//! Transaction status query.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{to_overrides, BuildContext, Operation, RequestBuilder};
use crate::error::DarajaResult;
use crate::params::Params;

/// Looks up the outcome of a transaction by its ID.
#[derive(Debug, Clone, Copy)]
pub struct TransactionStatus;

impl RequestBuilder for TransactionStatus {
    const OPERATION: Operation = Operation::TransactionStatus;

    fn defaults(ctx: &BuildContext<'_>) -> DarajaResult<Params> {
        let status = &ctx.config.transactionstatus;
        Ok(Params::new()
            .with("Initiator", ctx.initiator_name()?)
            .with("SecurityCredential", ctx.security_credential()?)
            .with("CommandID", status.command_id.as_str())
            .with("TransactionID", "")
            .with("PartyA", ctx.short_code()?)
            .with("IdentifierType", status.identifier_type)
            .with("ResultURL", status.result_url.as_str())
            .with("QueueTimeOutURL", status.queue_time_out_url.as_str())
            .with("Remarks", "Sending a transaction status query")
            .with("Occasion", Value::Null))
    }
}

/// Typed overrides for [`TransactionStatus`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransactionStatusRequest {
    /// M-PESA receipt of the transaction
    #[serde(rename = "TransactionID", skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    /// Party the query is made for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party_a: Option<String>,
    /// Identifier type of `PartyA`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier_type: Option<u32>,
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

impl TransactionStatusRequest {
    /// Query `transaction_id`.
    pub fn new(transaction_id: impl Into<String>) -> Self {
        Self {
            transaction_id: Some(transaction_id.into()),
            ..Default::default()
        }
    }
}

impl From<TransactionStatusRequest> for Params {
    fn from(request: TransactionStatusRequest) -> Self {
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
        let request = TransactionStatus::build(
            &fixture.ctx(),
            TransactionStatusRequest::new("OEI2AK4Q16").into(),
        )
        .unwrap();
        assert_eq!(request.path, "mpesa/transactionstatus/v1/query");
        assert_body_eq(
            &fixture.decrypted(request.body),
            &json!({
                "Initiator": "testapi",
                "SecurityCredential": INITIATOR_PASSWORD,
                "CommandID": "TransactionStatusQuery",
                "TransactionID": "OEI2AK4Q16",
                "PartyA": "174379",
                "IdentifierType": 4,
                "ResultURL": "https://example.com/status/result",
                "QueueTimeOutURL": "https://example.com/status/timeout",
                "Remarks": "Sending a transaction status query",
                "Occasion": null,
            }),
        );
    }
}
