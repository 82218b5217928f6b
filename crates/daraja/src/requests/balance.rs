//! Account balance query.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{to_overrides, BuildContext, Operation, RequestBuilder};
use crate::error::DarajaResult;
use crate::params::Params;

/// Requests the short code's balances. The result arrives by callback.
#[derive(Debug, Clone, Copy)]
pub struct AccountBalance;

impl RequestBuilder for AccountBalance {
    const OPERATION: Operation = Operation::AccountBalance;

    fn defaults(ctx: &BuildContext<'_>) -> DarajaResult<Params> {
        let balance = &ctx.config.accountbalance;
        Ok(Params::new()
            .with("Initiator", ctx.initiator_name()?)
            .with("SecurityCredential", ctx.security_credential()?)
            .with("CommandID", balance.command_id.as_str())
            .with("PartyA", ctx.short_code()?)
            .with("IdentifierType", balance.identifier_type)
            .with("Remarks", "Sending an account balance query")
            .with("QueueTimeOutURL", balance.queue_time_out_url.as_str())
            .with("ResultURL", balance.result_url.as_str()))
    }
}

/// Typed overrides for [`AccountBalance`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountBalanceRequest {
    /// Party whose balance is queried
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party_a: Option<String>,
    /// Identifier type of `PartyA`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier_type: Option<u32>,
    /// Free-text remarks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
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

impl From<AccountBalanceRequest> for Params {
    fn from(request: AccountBalanceRequest) -> Self {
        to_overrides(&request)
    }
}
