//! Business-to-business payments.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{to_overrides, BuildContext, Operation, RequestBuilder};
use crate::error::DarajaResult;
use crate::params::Params;

/// Moves money from the short code to another business.
#[derive(Debug, Clone, Copy)]
pub struct B2bPayment;

impl RequestBuilder for B2bPayment {
    const OPERATION: Operation = Operation::B2bPayment;

    fn defaults(ctx: &BuildContext<'_>) -> DarajaResult<Params> {
        let b2b = &ctx.config.b2b;
        Ok(Params::new()
            .with("Initiator", ctx.initiator_name()?)
            .with("SecurityCredential", ctx.security_credential()?)
            .with("CommandID", b2b.command_id.as_str())
            .with("SenderIdentifierType", b2b.sender_identifier_type)
            .with("RecieverIdentifierType", b2b.reciever_identifier_type)
            .with("Amount", 0)
            .with("PartyA", ctx.short_code()?)
            .with("PartyB", "")
            .with("AccountReference", ctx.generated_reference().to_string())
            .with("Requester", "")
            .with("Remarks", "Sending a B2B payment request")
            .with("QueueTimeOutURL", b2b.queue_time_out_url.as_str())
            .with("ResultURL", b2b.result_url.as_str()))
    }
}

/// Typed overrides for [`B2bPayment`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct B2bRequest {
    /// `BusinessPayBill` or `BusinessBuyGoods`
    #[serde(rename = "CommandID", skip_serializing_if = "Option::is_none")]
    pub command_id: Option<String>,
    /// Amount to send
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    /// Receiving short code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party_b: Option<String>,
    /// Account number at the receiver
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_reference: Option<String>,
    /// Customer on whose behalf the payment is made
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester: Option<String>,
    /// Free-text remarks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    /// Sender identifier type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_identifier_type: Option<u32>,
    /// Receiver identifier type (the gateway spells it this way)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reciever_identifier_type: Option<u32>,
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

impl B2bRequest {
    /// Send `amount` to the business at `short_code`.
    pub fn new(short_code: impl Into<String>, amount: u64) -> Self {
        Self {
            party_b: Some(short_code.into()),
            amount: Some(amount),
            ..Default::default()
        }
    }
}

impl From<B2bRequest> for Params {
    fn from(request: B2bRequest) -> Self {
        to_overrides(&request)
    }
}
