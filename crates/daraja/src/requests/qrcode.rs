//! Dynamic QR code generation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{to_overrides, BuildContext, Operation, RequestBuilder};
use crate::error::DarajaResult;
use crate::params::Params;

/// Generates a payment QR code for the merchant.
#[derive(Debug, Clone, Copy)]
pub struct QrCodeGenerate;

impl RequestBuilder for QrCodeGenerate {
    const OPERATION: Operation = Operation::QrCodeGenerate;

    fn defaults(ctx: &BuildContext<'_>) -> DarajaResult<Params> {
        let qrcode = &ctx.config.qrcode;
        Ok(Params::new()
            .with("MerchantName", ctx.config.account.merchant_name.as_str())
            .with("RefNo", ctx.generated_reference().to_string())
            .with("Amount", 0)
            .with("TrxCode", qrcode.trx_code.as_str())
            .with("CPI", ctx.short_code()?)
            .with("Size", qrcode.size))
    }
}

/// Typed overrides for [`QrCodeGenerate`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QrCodeRequest {
    /// Name shown on the code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_name: Option<String>,
    /// Transaction reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_no: Option<String>,
    /// Amount to pay
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    /// `BG`, `WA`, `PB`, `SM` or `SB`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trx_code: Option<String>,
    /// Credit party identifier
    #[serde(rename = "CPI", skip_serializing_if = "Option::is_none")]
    pub cpi: Option<String>,
    /// Image size in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    /// Additional raw fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<QrCodeRequest> for Params {
    fn from(request: QrCodeRequest) -> Self {
        to_overrides(&request)
    }
}
