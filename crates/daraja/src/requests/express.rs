//! M-PESA Express (STK push) simulate and query.
//!
//! Both operations sign with the STK password. The timestamp is taken once
//! per request and shared by `Password` and `Timestamp`, so the two always
//! agree.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{to_overrides, BuildContext, Operation, RequestBuilder};
use crate::error::DarajaResult;
use crate::params::Params;

/// Prompts a customer's handset to authorise a payment.
#[derive(Debug, Clone, Copy)]
pub struct StkPushSimulate;

impl RequestBuilder for StkPushSimulate {
    const OPERATION: Operation = Operation::StkPushSimulate;

    fn defaults(ctx: &BuildContext<'_>) -> DarajaResult<Params> {
        let short_code = ctx.short_code()?;
        let timestamp = ctx.timestamps.now();
        let password = ctx.stk_password(&timestamp)?;
        let stkpush = &ctx.config.stkpush;

        Ok(Params::new()
            .with("BusinessShortCode", short_code)
            .with("Password", password)
            .with("Timestamp", timestamp)
            .with("TransactionType", stkpush.transaction_type.as_str())
            .with("Amount", 0)
            .with("PartyA", "")
            .with("PartyB", short_code)
            .with("PhoneNumber", "")
            .with("CallBackURL", stkpush.callback_url.as_str())
            .with("AccountReference", ctx.generated_reference().to_string())
            .with("TransactionDesc", "LNMO Payment"))
    }

    fn reconcile(body: &mut Params) {
        body.reconcile_party_and_phone();
    }
}

/// Checks the status of an earlier STK push.
#[derive(Debug, Clone, Copy)]
pub struct StkPushQuery;

impl RequestBuilder for StkPushQuery {
    const OPERATION: Operation = Operation::StkPushQuery;

    fn defaults(ctx: &BuildContext<'_>) -> DarajaResult<Params> {
        let timestamp = ctx.timestamps.now();
        let password = ctx.stk_password(&timestamp)?;

        Ok(Params::new()
            .with("BusinessShortCode", ctx.short_code()?)
            .with("Password", password)
            .with("Timestamp", timestamp)
            .with("CheckoutRequestID", ""))
    }
}

/// Typed overrides for [`StkPushSimulate`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StkPushRequest {
    /// Amount to charge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    /// Paying phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party_a: Option<String>,
    /// Receiving short code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party_b: Option<String>,
    /// Phone number that receives the prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Result callback URL
    #[serde(rename = "CallBackURL", skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    /// Account reference shown to the customer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_reference: Option<String>,
    /// Free-text description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_desc: Option<String>,
    /// `CustomerPayBillOnline` or `CustomerBuyGoodsOnline`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<String>,
    /// Additional raw fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StkPushRequest {
    /// Charge `amount` to `phone_number`.
    pub fn new(phone_number: impl Into<String>, amount: u64) -> Self {
        Self {
            amount: Some(amount),
            phone_number: Some(phone_number.into()),
            ..Default::default()
        }
    }
}

impl From<StkPushRequest> for Params {
    fn from(request: StkPushRequest) -> Self {
        to_overrides(&request)
    }
}

/// Typed overrides for [`StkPushQuery`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StkQueryRequest {
    /// Checkout request ID returned by the simulate call
    #[serde(rename = "CheckoutRequestID", skip_serializing_if = "Option::is_none")]
    pub checkout_request_id: Option<String>,
    /// Additional raw fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StkQueryRequest {
    /// Query `checkout_request_id`.
    pub fn new(checkout_request_id: impl Into<String>) -> Self {
        Self {
            checkout_request_id: Some(checkout_request_id.into()),
            ..Default::default()
        }
    }
}

impl From<StkQueryRequest> for Params {
    fn from(request: StkQueryRequest) -> Self {
        to_overrides(&request)
    }
}
