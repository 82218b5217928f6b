//! Callback payloads posted by the gateway, and the acknowledgements sent back.
//!
//! Payload shapes drift: optional metadata entries come and go, and a list
//! with one element is sometimes sent as a bare object. Field lookups are
//! therefore tolerant. A missing entry is `None`, and only a missing top-level
//! container is an error.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DarajaError, DarajaResult};

/// Format of `TransactionDate` and `TransTime` values.
pub const CALLBACK_TIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// Parse a raw callback body.
pub fn parse_payload(body: &str) -> DarajaResult<Value> {
    if body.trim().is_empty() {
        return Err(DarajaError::callback_shape("callback body is empty"));
    }
    serde_json::from_str(body)
        .map_err(|e| DarajaError::callback_shape(format!("callback body is not JSON: {}", e)))
}

/// Value of the first `{Name, Value}` entry whose `Name` equals `name`.
///
/// `items` may be an array of entries, a single entry, or an object wrapping
/// either (such as `CallbackMetadata`). Matching is case-sensitive.
pub fn value_by_name<'a>(items: &'a Value, name: &str) -> Option<&'a Value> {
    find_value(items, "Name", name)
}

/// Value of the first `{Key, Value}` entry whose `Key` equals `key`.
///
/// Accepts the same shapes as [`value_by_name`], so both
/// `ResultParameters` and `ResultParameters.ResultParameter` work.
pub fn value_by_key<'a>(items: &'a Value, key: &str) -> Option<&'a Value> {
    find_value(items, "Key", key)
}

fn find_value<'a>(items: &'a Value, field: &str, wanted: &str) -> Option<&'a Value> {
    entries(items, field)
        .find(|entry| entry.get(field).and_then(Value::as_str) == Some(wanted))
        .and_then(|entry| entry.get("Value"))
        .filter(|value| !value.is_null())
}

fn entries<'a>(items: &'a Value, field: &str) -> Box<dyn Iterator<Item = &'a Value> + 'a> {
    match items {
        Value::Array(list) => Box::new(list.iter()),
        Value::Object(map) if map.contains_key(field) => Box::new(std::iter::once(items)),
        // wrapper object: flatten one level
        Value::Object(map) => Box::new(map.values().flat_map(|inner| match inner {
            Value::Array(list) => Box::new(list.iter()) as Box<dyn Iterator<Item = &'a Value> + 'a>,
            other => Box::new(std::iter::once(other)),
        })),
        _ => Box::new(std::iter::empty()),
    }
}

/// Render a scalar as text; numbers keep their JSON form.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn scalar_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn scalar_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn field_string(object: &Value, name: &str) -> Option<String> {
    object.get(name).and_then(scalar_string)
}

fn metadata_item<'a>(callback: &'a Value, name: &str) -> Option<&'a Value> {
    value_by_name(callback.get("CallbackMetadata")?, name)
}

fn parse_time(value: Option<&str>) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value?, CALLBACK_TIME_FORMAT).ok()
}

/// Result of an M-PESA Express payment, posted to `CallBackURL`.
#[derive(Debug, Clone, PartialEq)]
pub struct StkCallback {
    /// Merchant request ID
    pub merchant_request_id: String,
    /// Checkout request ID
    pub checkout_request_id: String,
    /// `0` on success
    pub result_code: i64,
    /// Result description
    pub result_desc: String,
    /// Amount paid
    pub amount: Option<f64>,
    /// M-PESA receipt number
    pub mpesa_receipt_number: Option<String>,
    /// Account balance; often omitted by the gateway
    pub balance: Option<String>,
    /// `YYYYMMDDHHmmss`
    pub transaction_date: Option<String>,
    /// Paying phone number
    pub phone_number: Option<String>,
}

impl StkCallback {
    /// Extract from a `{"Body": {"stkCallback": ...}}` payload.
    pub fn parse(payload: &Value) -> DarajaResult<Self> {
        let callback = payload
            .get("Body")
            .and_then(|body| body.get("stkCallback"))
            .ok_or_else(|| DarajaError::callback_shape("missing Body.stkCallback"))?;

        let result_code = callback
            .get("ResultCode")
            .and_then(scalar_i64)
            .ok_or_else(|| DarajaError::callback_shape("stkCallback has no ResultCode"))?;

        Ok(Self {
            merchant_request_id: field_string(callback, "MerchantRequestID").unwrap_or_default(),
            checkout_request_id: field_string(callback, "CheckoutRequestID").unwrap_or_default(),
            result_code,
            result_desc: field_string(callback, "ResultDesc").unwrap_or_default(),
            amount: metadata_item(callback, "Amount").and_then(scalar_f64),
            mpesa_receipt_number: metadata_item(callback, "MpesaReceiptNumber").and_then(scalar_string),
            balance: metadata_item(callback, "Balance").and_then(scalar_string),
            transaction_date: metadata_item(callback, "TransactionDate").and_then(scalar_string),
            phone_number: metadata_item(callback, "PhoneNumber").and_then(scalar_string),
        })
    }

    /// True when the customer completed the payment.
    pub fn is_success(&self) -> bool {
        self.result_code == 0
    }

    /// `transaction_date` as a timestamp (gateway local time).
    pub fn transaction_time(&self) -> Option<NaiveDateTime> {
        parse_time(self.transaction_date.as_deref())
    }
}

/// C2B validation request or confirmation notification.
#[derive(Debug, Clone, PartialEq)]
pub struct C2bNotification {
    /// `Pay Bill` or `Buy Goods`
    pub transaction_type: Option<String>,
    /// M-PESA transaction ID
    pub trans_id: String,
    /// `YYYYMMDDHHmmss`
    pub trans_time: Option<String>,
    /// Amount paid, as sent
    pub trans_amount: Option<String>,
    /// Receiving short code
    pub business_short_code: Option<String>,
    /// Account number entered by the customer
    pub bill_ref_number: Option<String>,
    /// Invoice number
    pub invoice_number: Option<String>,
    /// Organisation balance after the payment
    pub org_account_balance: Option<String>,
    /// ID returned by the validation response
    pub third_party_trans_id: Option<String>,
    /// Paying phone number (often masked)
    pub msisdn: Option<String>,
    /// Customer first name
    pub first_name: Option<String>,
    /// Customer middle name
    pub middle_name: Option<String>,
    /// Customer last name
    pub last_name: Option<String>,
}

impl C2bNotification {
    /// Extract from the flat notification object.
    pub fn parse(payload: &Value) -> DarajaResult<Self> {
        if !payload.is_object() {
            return Err(DarajaError::callback_shape(
                "C2B notification is not an object",
            ));
        }
        let trans_id = field_string(payload, "TransID")
            .ok_or_else(|| DarajaError::callback_shape("C2B notification has no TransID"))?;

        Ok(Self {
            transaction_type: field_string(payload, "TransactionType"),
            trans_id,
            trans_time: field_string(payload, "TransTime"),
            trans_amount: field_string(payload, "TransAmount"),
            business_short_code: field_string(payload, "BusinessShortCode"),
            bill_ref_number: field_string(payload, "BillRefNumber"),
            invoice_number: field_string(payload, "InvoiceNumber"),
            org_account_balance: field_string(payload, "OrgAccountBalance"),
            third_party_trans_id: field_string(payload, "ThirdPartyTransID"),
            msisdn: field_string(payload, "MSISDN"),
            first_name: field_string(payload, "FirstName"),
            middle_name: field_string(payload, "MiddleName"),
            last_name: field_string(payload, "LastName"),
        })
    }

    /// `trans_amount` as a number.
    pub fn amount(&self) -> Option<f64> {
        self.trans_amount.as_deref()?.trim().parse().ok()
    }

    /// `trans_time` as a timestamp (gateway local time).
    pub fn transaction_time(&self) -> Option<NaiveDateTime> {
        parse_time(self.trans_time.as_deref())
    }
}

/// The `Result` envelope shared by the back-office callbacks.
///
/// Queue time-out notifications use the same envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultEnvelope {
    /// Result type
    pub result_type: Option<i64>,
    /// `0` on success
    pub result_code: i64,
    /// Result description
    pub result_desc: String,
    /// Originator conversation ID
    pub originator_conversation_id: Option<String>,
    /// Conversation ID
    pub conversation_id: Option<String>,
    /// M-PESA transaction ID
    pub transaction_id: Option<String>,
    /// `ResultParameters`, absent on most failures
    pub result_parameters: Value,
    /// `ReferenceData`
    pub reference_data: Value,
}

/// Alias for the envelope posted to `QueueTimeOutURL`.
pub type QueueTimeoutNotification = ResultEnvelope;

impl ResultEnvelope {
    /// Extract from a `{"Result": ...}` payload.
    pub fn parse(payload: &Value) -> DarajaResult<Self> {
        let result = payload
            .get("Result")
            .ok_or_else(|| DarajaError::callback_shape("missing Result"))?;

        let result_code = result
            .get("ResultCode")
            .and_then(scalar_i64)
            .ok_or_else(|| DarajaError::callback_shape("Result has no ResultCode"))?;

        Ok(Self {
            result_type: result.get("ResultType").and_then(scalar_i64),
            result_code,
            result_desc: field_string(result, "ResultDesc").unwrap_or_default(),
            originator_conversation_id: field_string(result, "OriginatorConversationID"),
            conversation_id: field_string(result, "ConversationID"),
            transaction_id: field_string(result, "TransactionID"),
            result_parameters: result
                .get("ResultParameters")
                .cloned()
                .unwrap_or(Value::Null),
            reference_data: result.get("ReferenceData").cloned().unwrap_or(Value::Null),
        })
    }

    /// True when the gateway reports success.
    pub fn is_success(&self) -> bool {
        self.result_code == 0
    }

    /// A `ResultParameter` value by key.
    pub fn parameter(&self, key: &str) -> Option<&Value> {
        value_by_key(&self.result_parameters, key)
    }

    /// A `ReferenceItem` value by key.
    pub fn reference(&self, key: &str) -> Option<&Value> {
        value_by_key(&self.reference_data, key)
    }

    fn parameter_string(&self, key: &str) -> Option<String> {
        self.parameter(key).and_then(scalar_string)
    }

    fn parameter_f64(&self, key: &str) -> Option<f64> {
        self.parameter(key).and_then(scalar_f64)
    }

    fn reference_string(&self, key: &str) -> Option<String> {
        self.reference(key).and_then(scalar_string)
    }
}

/// Business-to-customer payment result.
#[derive(Debug, Clone, PartialEq)]
pub struct B2cResult {
    /// Common envelope
    pub envelope: ResultEnvelope,
    /// Receipt number
    pub transaction_receipt: Option<String>,
    /// Amount sent
    pub transaction_amount: Option<f64>,
    /// Working account balance after the payment
    pub working_account_available_funds: Option<f64>,
    /// Utility account balance after the payment
    pub utility_account_available_funds: Option<f64>,
    /// Charges paid account balance after the payment
    pub charges_paid_account_available_funds: Option<f64>,
    /// `DD.MM.YYYY HH:mm:ss`
    pub completed_at: Option<String>,
    /// Recipient's phone number and name
    pub receiver_party_public_name: Option<String>,
    /// Whether the recipient is a registered M-PESA customer
    pub recipient_is_registered_customer: Option<bool>,
    /// Queue time-out URL echoed back
    pub queue_timeout_url: Option<String>,
}

impl B2cResult {
    /// Extract from a B2C result payload.
    pub fn parse(payload: &Value) -> DarajaResult<Self> {
        let envelope = ResultEnvelope::parse(payload)?;
        Ok(Self {
            transaction_receipt: envelope.parameter_string("TransactionReceipt"),
            transaction_amount: envelope.parameter_f64("TransactionAmount"),
            working_account_available_funds: envelope
                .parameter_f64("B2CWorkingAccountAvailableFunds"),
            utility_account_available_funds: envelope
                .parameter_f64("B2CUtilityAccountAvailableFunds"),
            charges_paid_account_available_funds: envelope
                .parameter_f64("B2CChargesPaidAccountAvailableFunds"),
            completed_at: envelope.parameter_string("TransactionCompletedDateTime"),
            receiver_party_public_name: envelope.parameter_string("ReceiverPartyPublicName"),
            recipient_is_registered_customer: envelope
                .parameter_string("B2CRecipientIsRegisteredCustomer")
                .map(|flag| flag.eq_ignore_ascii_case("Y")),
            queue_timeout_url: envelope.reference_string("QueueTimeoutURL"),
            envelope,
        })
    }
}

/// Business-to-business payment result.
#[derive(Debug, Clone, PartialEq)]
pub struct B2bResult {
    /// Common envelope
    pub envelope: ResultEnvelope,
    /// Debit account balance, pipe-delimited
    pub debit_account_balance: Option<String>,
    /// Amount sent
    pub amount: Option<f64>,
    /// Debit party balance after the payment
    pub debit_party_affected_account_balance: Option<String>,
    /// `YYYYMMDDHHmmss`
    pub trans_completed_time: Option<String>,
    /// Charges applied to the debit party
    pub debit_party_charges: Option<String>,
    /// Receiver's short code and name
    pub receiver_party_public_name: Option<String>,
    /// Currency
    pub currency: Option<String>,
    /// Initiator account balance
    pub initiator_account_current_balance: Option<String>,
    /// Back-office completion time
    pub bo_completed_time: Option<String>,
    /// Bill reference echoed back
    pub bill_reference_number: Option<String>,
    /// Queue time-out URL echoed back
    pub queue_timeout_url: Option<String>,
}

impl B2bResult {
    /// Extract from a B2B result payload.
    pub fn parse(payload: &Value) -> DarajaResult<Self> {
        let envelope = ResultEnvelope::parse(payload)?;
        Ok(Self {
            debit_account_balance: envelope.parameter_string("DebitAccountBalance"),
            amount: envelope.parameter_f64("Amount"),
            debit_party_affected_account_balance: envelope
                .parameter_string("DebitPartyAffectedAccountBalance"),
            trans_completed_time: envelope.parameter_string("TransCompletedTime"),
            debit_party_charges: envelope.parameter_string("DebitPartyCharges"),
            receiver_party_public_name: envelope.parameter_string("ReceiverPartyPublicName"),
            currency: envelope.parameter_string("Currency"),
            initiator_account_current_balance: envelope
                .parameter_string("InitiatorAccountCurrentBalance"),
            bo_completed_time: envelope.parameter_string("BOCompletedTime"),
            bill_reference_number: envelope.reference_string("BillReferenceNumber"),
            queue_timeout_url: envelope.reference_string("QueueTimeoutURL"),
            envelope,
        })
    }
}

/// Transaction status query result.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionStatusResult {
    /// Common envelope
    pub envelope: ResultEnvelope,
    /// Receipt number
    pub receipt_no: Option<String>,
    /// Amount
    pub amount: Option<f64>,
    /// `YYYYMMDDHHmmss`
    pub initiated_time: Option<String>,
    /// `YYYYMMDDHHmmss`
    pub finalised_time: Option<String>,
    /// e.g. `Completed`
    pub transaction_status: Option<String>,
    /// Reason type
    pub reason_type: Option<String>,
    /// Reason text
    pub transaction_reason: Option<String>,
    /// Charges applied to the debit party
    pub debit_party_charges: Option<String>,
    /// Debit account type
    pub debit_account_type: Option<String>,
    /// Debit party
    pub debit_party_name: Option<String>,
    /// Credit party
    pub credit_party_name: Option<String>,
    /// Occasion echoed back
    pub occasion: Option<String>,
}

impl TransactionStatusResult {
    /// Extract from a transaction status result payload.
    pub fn parse(payload: &Value) -> DarajaResult<Self> {
        let envelope = ResultEnvelope::parse(payload)?;
        Ok(Self {
            receipt_no: envelope.parameter_string("ReceiptNo"),
            amount: envelope.parameter_f64("Amount"),
            initiated_time: envelope.parameter_string("InitiatedTime"),
            finalised_time: envelope.parameter_string("FinalisedTime"),
            transaction_status: envelope.parameter_string("TransactionStatus"),
            reason_type: envelope.parameter_string("ReasonType"),
            transaction_reason: envelope.parameter_string("TransactionReason"),
            debit_party_charges: envelope.parameter_string("DebitPartyCharges"),
            debit_account_type: envelope.parameter_string("DebitAccountType"),
            debit_party_name: envelope.parameter_string("DebitPartyName"),
            credit_party_name: envelope.parameter_string("CreditPartyName"),
            occasion: envelope.reference_string("Occasion"),
            envelope,
        })
    }
}

/// One account from an account balance result.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountBalanceEntry {
    /// e.g. `Working Account`
    pub name: String,
    /// ISO currency code
    pub currency: String,
    /// Current balance
    pub current: Option<f64>,
    /// Available balance
    pub available: Option<f64>,
    /// Reserved balance
    pub reserved: Option<f64>,
    /// Uncleared balance
    pub uncleared: Option<f64>,
}

/// Account balance query result.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountBalanceResult {
    /// Common envelope
    pub envelope: ResultEnvelope,
    /// Raw balances: `Name|Currency|Current|Available|Reserved|Uncleared&...`
    pub account_balance: Option<String>,
    /// Back-office completion time
    pub bo_completed_time: Option<String>,
    /// Queue time-out URL echoed back
    pub queue_timeout_url: Option<String>,
}

impl AccountBalanceResult {
    /// Extract from an account balance result payload.
    pub fn parse(payload: &Value) -> DarajaResult<Self> {
        let envelope = ResultEnvelope::parse(payload)?;
        Ok(Self {
            account_balance: envelope.parameter_string("AccountBalance"),
            bo_completed_time: envelope.parameter_string("BOCompletedTime"),
            queue_timeout_url: envelope.reference_string("QueueTimeoutURL"),
            envelope,
        })
    }

    /// Split `account_balance` into accounts. Malformed segments are skipped.
    pub fn accounts(&self) -> Vec<AccountBalanceEntry> {
        let Some(raw) = self.account_balance.as_deref() else {
            return Vec::new();
        };
        raw.split('&')
            .filter_map(|segment| {
                let mut fields = segment.split('|').map(str::trim);
                let name = fields.next().filter(|n| !n.is_empty())?;
                let currency = fields.next()?;
                let mut amount = || fields.next().and_then(|v| v.parse().ok());
                Some(AccountBalanceEntry {
                    name: name.to_string(),
                    currency: currency.to_string(),
                    current: amount(),
                    available: amount(),
                    reserved: amount(),
                    uncleared: amount(),
                })
            })
            .collect()
    }
}

/// Reversal result.
#[derive(Debug, Clone, PartialEq)]
pub struct ReversalResult {
    /// Common envelope
    pub envelope: ResultEnvelope,
    /// Debit account balance
    pub debit_account_balance: Option<String>,
    /// Amount reversed
    pub amount: Option<f64>,
    /// `YYYYMMDDHHmmss`
    pub trans_completed_time: Option<String>,
    /// Transaction that was reversed
    pub original_transaction_id: Option<String>,
    /// Charge applied
    pub charge: Option<f64>,
    /// Credit party
    pub credit_party_public_name: Option<String>,
    /// Debit party
    pub debit_party_public_name: Option<String>,
    /// Queue time-out URL echoed back
    pub queue_timeout_url: Option<String>,
}

impl ReversalResult {
    /// Extract from a reversal result payload.
    pub fn parse(payload: &Value) -> DarajaResult<Self> {
        let envelope = ResultEnvelope::parse(payload)?;
        Ok(Self {
            debit_account_balance: envelope.parameter_string("DebitAccountBalance"),
            amount: envelope.parameter_f64("Amount"),
            trans_completed_time: envelope.parameter_string("TransCompletedTime"),
            original_transaction_id: envelope.parameter_string("OriginalTransactionID"),
            charge: envelope.parameter_f64("Charge"),
            credit_party_public_name: envelope.parameter_string("CreditPartyPublicName"),
            debit_party_public_name: envelope.parameter_string("DebitPartyPublicName"),
            queue_timeout_url: envelope.reference_string("QueueTimeoutURL"),
            envelope,
        })
    }
}

/// Reasons a C2B validation can reject a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum C2bRejection {
    /// `C2B00011`
    InvalidMsisdn,
    /// `C2B00012`
    InvalidAccountNumber,
    /// `C2B00013`
    InvalidAmount,
    /// `C2B00014`
    InvalidKycDetails,
    /// `C2B00015`
    InvalidShortCode,
    /// `C2B00016`
    OtherError,
}

impl C2bRejection {
    /// Gateway result code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidMsisdn => "C2B00011",
            Self::InvalidAccountNumber => "C2B00012",
            Self::InvalidAmount => "C2B00013",
            Self::InvalidKycDetails => "C2B00014",
            Self::InvalidShortCode => "C2B00015",
            Self::OtherError => "C2B00016",
        }
    }

    /// Map a result code back to a reason. Unknown codes become `OtherError`.
    pub fn from_code(code: &str) -> Self {
        match code {
            "C2B00011" => Self::InvalidMsisdn,
            "C2B00012" => Self::InvalidAccountNumber,
            "C2B00013" => Self::InvalidAmount,
            "C2B00014" => Self::InvalidKycDetails,
            "C2B00015" => Self::InvalidShortCode,
            _ => Self::OtherError,
        }
    }
}

/// JSON body returned to the gateway from a callback endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CallbackResponse {
    /// `"0"` to accept
    pub result_code: String,
    /// Human-readable description
    pub result_desc: String,
    /// Merchant's own ID, C2B validation only
    #[serde(rename = "ThirdPartyTransID", skip_serializing_if = "Option::is_none")]
    pub third_party_trans_id: Option<String>,
}

impl CallbackResponse {
    fn new(result_code: &str, result_desc: &str) -> Self {
        Self {
            result_code: result_code.to_string(),
            result_desc: result_desc.to_string(),
            third_party_trans_id: None,
        }
    }

    /// Generic acceptance.
    pub fn accepted() -> Self {
        Self::new("0", "Accepted the service request.")
    }

    /// Generic rejection.
    pub fn rejected() -> Self {
        Self::new("1", "Rejected the service request.")
    }

    /// Accept a C2B payment at validation.
    pub fn c2b_validation_accepted(third_party_trans_id: impl Into<String>) -> Self {
        Self {
            third_party_trans_id: Some(third_party_trans_id.into()),
            ..Self::new("0", "Accepted")
        }
    }

    /// Reject a C2B payment at validation.
    pub fn c2b_validation_rejected(reason: C2bRejection) -> Self {
        Self::new(reason.code(), "Rejected")
    }

    /// Acknowledge a C2B confirmation.
    pub fn c2b_confirmation() -> Self {
        Self::new("0", "Success")
    }

    /// Acknowledge a queue time-out notification.
    pub fn timeout_received() -> Self {
        Self::new("0", "Timeout notification received successfully")
    }

    /// Final acknowledgement once the callback has been processed.
    pub fn finish(success: bool) -> Self {
        if success {
            Self::new("0", "The service request is processed successfully")
        } else {
            Self::new("1", "The service request failed")
        }
    }

    /// Serialise to the JSON body.
    pub fn to_json(&self) -> Value {
        // string fields only, serialisation cannot fail
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_by_name() {
        let items = json!([{"Name": "Amount", "Value": 100}, {"Name": "Balance", "Value": 50}]);
        assert_eq!(value_by_name(&items, "Balance"), Some(&json!(50)));
        assert_eq!(value_by_name(&json!([]), "Amount"), None);
        assert_eq!(value_by_name(&json!([{"Name": "X", "Value": 1}]), "Amount"), None);
    }

    #[test]
    fn test_value_by_name_is_case_sensitive() {
        let items = json!([{"Name": "amount", "Value": 100}]);
        assert_eq!(value_by_name(&items, "Amount"), None);
    }

    #[test]
    fn test_value_lookup_tolerates_shapes() {
        // single entry instead of a list
        assert_eq!(
            value_by_key(&json!({"Key": "Occasion", "Value": "x"}), "Occasion"),
            Some(&json!("x"))
        );
        // wrapper holding a single entry
        let reference = json!({"ReferenceItem": {"Key": "QueueTimeoutURL", "Value": "https://q"}});
        assert_eq!(value_by_key(&reference, "QueueTimeoutURL"), Some(&json!("https://q")));
        // wrapper holding a list
        let parameters = json!({"ResultParameter": [{"Key": "A", "Value": 1}, {"Key": "B", "Value": 2}]});
        assert_eq!(value_by_key(&parameters, "B"), Some(&json!(2)));
        // garbage
        assert_eq!(value_by_key(&json!(null), "A"), None);
        assert_eq!(value_by_key(&json!("text"), "A"), None);
        assert_eq!(value_by_key(&json!([1, "two", null]), "A"), None);
        // entry without a Value
        assert_eq!(value_by_key(&json!([{"Key": "A"}]), "A"), None);
    }

    #[test]
    fn test_first_match_wins() {
        let items = json!([{"Key": "A", "Value": 1}, {"Key": "A", "Value": 2}]);
        assert_eq!(value_by_key(&items, "A"), Some(&json!(1)));
    }

    fn stk_payload(items: Value) -> Value {
        json!({
            "Body": {
                "stkCallback": {
                    "MerchantRequestID": "29115-34620561-1",
                    "CheckoutRequestID": "ws_CO_191220191020363925",
                    "ResultCode": 0,
                    "ResultDesc": "The service request is processed successfully.",
                    "CallbackMetadata": {"Item": items}
                }
            }
        })
    }

    #[test]
    fn test_stk_callback_without_balance() {
        let payload = stk_payload(json!([
            {"Name": "Amount", "Value": 1.00},
            {"Name": "MpesaReceiptNumber", "Value": "NLJ7RT61SV"},
            {"Name": "TransactionDate", "Value": 20191219102115u64},
            {"Name": "PhoneNumber", "Value": 254708374149u64}
        ]));
        let callback = StkCallback::parse(&payload).unwrap();
        assert!(callback.is_success());
        assert_eq!(callback.amount, Some(1.0));
        assert_eq!(callback.mpesa_receipt_number.as_deref(), Some("NLJ7RT61SV"));
        assert_eq!(callback.balance, None);
        assert_eq!(callback.phone_number.as_deref(), Some("254708374149"));
        assert_eq!(
            callback.transaction_time().unwrap().to_string(),
            "2019-12-19 10:21:15"
        );
    }

    #[test]
    fn test_stk_callback_cancelled() {
        let payload = json!({
            "Body": {"stkCallback": {
                "MerchantRequestID": "1",
                "CheckoutRequestID": "2",
                "ResultCode": 1032,
                "ResultDesc": "Request cancelled by user"
            }}
        });
        let callback = StkCallback::parse(&payload).unwrap();
        assert!(!callback.is_success());
        assert_eq!(callback.amount, None);
        assert_eq!(callback.transaction_time(), None);
    }

    #[test]
    fn test_stk_callback_shape_error() {
        let err = StkCallback::parse(&json!({"Result": {}})).unwrap_err();
        assert!(matches!(err, DarajaError::CallbackShape(_)));
    }

    #[test]
    fn test_c2b_notification() {
        let payload = json!({
            "TransactionType": "Pay Bill",
            "TransID": "RKTQDM7W6S",
            "TransTime": "20191122063845",
            "TransAmount": "10",
            "BusinessShortCode": "600638",
            "BillRefNumber": "254708374149",
            "InvoiceNumber": "",
            "OrgAccountBalance": "49197.00",
            "ThirdPartyTransID": "",
            "MSISDN": "2547 ***** 149",
            "FirstName": "John"
        });
        let notification = C2bNotification::parse(&payload).unwrap();
        assert_eq!(notification.trans_id, "RKTQDM7W6S");
        assert_eq!(notification.amount(), Some(10.0));
        assert_eq!(notification.first_name.as_deref(), Some("John"));
        assert_eq!(notification.last_name, None);
        assert!(notification.transaction_time().is_some());

        assert!(C2bNotification::parse(&json!([])).is_err());
        assert!(C2bNotification::parse(&json!({"TransAmount": "1"})).is_err());
    }

    #[test]
    fn test_result_envelope_failure_has_no_parameters() {
        let payload = json!({
            "Result": {
                "ResultType": 0,
                "ResultCode": 2001,
                "ResultDesc": "The initiator information is invalid.",
                "OriginatorConversationID": "29112-34801843-1",
                "ConversationID": "AG_20191219_00006c6fddb15123addf",
                "TransactionID": "NLJ0000000",
                "ReferenceData": {"ReferenceItem": {"Key": "QueueTimeoutURL", "Value": "https://q"}}
            }
        });
        let result = B2cResult::parse(&payload).unwrap();
        assert!(!result.envelope.is_success());
        assert_eq!(result.envelope.result_code, 2001);
        assert_eq!(result.transaction_receipt, None);
        assert_eq!(result.queue_timeout_url.as_deref(), Some("https://q"));
    }

    #[test]
    fn test_result_envelope_string_result_code() {
        let payload = json!({"Result": {"ResultCode": "0", "ResultDesc": "ok"}});
        assert!(ResultEnvelope::parse(&payload).unwrap().is_success());
        assert!(matches!(
            ResultEnvelope::parse(&json!({"Body": {}})).unwrap_err(),
            DarajaError::CallbackShape(_)
        ));
    }

    #[test]
    fn test_account_balances() {
        let payload = json!({
            "Result": {
                "ResultCode": 0,
                "ResultDesc": "The service request is processed successfully.",
                "ResultParameters": {"ResultParameter": [
                    {"Key": "AccountBalance", "Value": "Working Account|KES|700000.00|700000.00|0.00|0.00&Float Account|KES|0.00|0.00|0.00|0.00&|broken"},
                    {"Key": "BOCompletedTime", "Value": 20200109125710u64}
                ]}
            }
        });
        let result = AccountBalanceResult::parse(&payload).unwrap();
        let accounts = result.accounts();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].name, "Working Account");
        assert_eq!(accounts[0].available, Some(700000.0));
        assert_eq!(accounts[1].current, Some(0.0));
        assert_eq!(result.bo_completed_time.as_deref(), Some("20200109125710"));
    }

    #[test]
    fn test_acknowledgements() {
        assert_eq!(
            CallbackResponse::accepted().to_json(),
            json!({"ResultCode": "0", "ResultDesc": "Accepted the service request."})
        );
        assert_eq!(
            CallbackResponse::c2b_validation_accepted("TX-1").to_json(),
            json!({"ResultCode": "0", "ResultDesc": "Accepted", "ThirdPartyTransID": "TX-1"})
        );
        assert_eq!(
            CallbackResponse::c2b_validation_rejected(C2bRejection::from_code("C2B00012"))
                .to_json(),
            json!({"ResultCode": "C2B00012", "ResultDesc": "Rejected"})
        );
        assert_eq!(C2bRejection::from_code("nonsense"), C2bRejection::OtherError);
        assert_eq!(
            CallbackResponse::finish(false).to_json(),
            json!({"ResultCode": "1", "ResultDesc": "The service request failed"})
        );
        assert_eq!(CallbackResponse::timeout_received().result_code, "0");
        assert_eq!(CallbackResponse::c2b_confirmation().result_desc, "Success");
    }

    #[test]
    fn test_acknowledgement_matches_serde_form() {
        let response = CallbackResponse::c2b_validation_accepted("TX-9");
        let body = response.to_json();
        assert_eq!(body, serde_json::to_value(&response).unwrap());

        let keys: Vec<&str> = body.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["ResultCode", "ResultDesc", "ThirdPartyTransID"]);

        let back: CallbackResponse = serde_json::from_value(body).unwrap();
        assert_eq!(back, response);
    }

    #[test]
    fn test_parse_payload() {
        assert!(parse_payload("").is_err());
        assert!(matches!(
            parse_payload("{oops").unwrap_err(),
            DarajaError::CallbackShape(_)
        ));
        assert_eq!(parse_payload("{\"a\":1}").unwrap(), json!({"a": 1}));
    }
}
