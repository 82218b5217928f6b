//! Canned gateway responses and callback payloads.
//!
//! Values are taken from the gateway's published sandbox examples.

use daraja::HttpResponse;
use serde_json::{json, Value};

/// Access token returned by [`token_response`].
pub const TEST_ACCESS_TOKEN: &str = "c9SQxWWhmdVRlyh0zh8gZDTkubVF";

/// A successful token response (`expires_in` as a string, as the gateway sends it).
pub fn token_response() -> HttpResponse {
    HttpResponse::new(
        200,
        json!({"access_token": TEST_ACCESS_TOKEN, "expires_in": "3599"}).to_string(),
    )
}

/// The generic "accepted" response of the asynchronous APIs.
pub fn accepted_response() -> HttpResponse {
    HttpResponse::new(
        200,
        json!({
            "ConversationID": "AG_20191219_00005797af5d7d75f652",
            "OriginatorConversationID": "16740-34861180-1",
            "ResponseCode": "0",
            "ResponseDescription": "Accept the service request successfully."
        })
        .to_string(),
    )
}

/// Response to an STK push.
pub fn stk_push_response() -> HttpResponse {
    HttpResponse::new(
        200,
        json!({
            "MerchantRequestID": "29115-34620561-1",
            "CheckoutRequestID": "ws_CO_191220191020363925",
            "ResponseCode": "0",
            "ResponseDescription": "Success. Request accepted for processing",
            "CustomerMessage": "Success. Request accepted for processing"
        })
        .to_string(),
    )
}

/// A gateway error response.
pub fn error_response(status: u16, code: &str, message: &str) -> HttpResponse {
    HttpResponse::new(
        status,
        json!({
            "requestId": "11728-2929992-1",
            "errorCode": code,
            "errorMessage": message
        })
        .to_string(),
    )
}

/// Successful STK push callback without the optional `Balance` item.
pub fn stk_callback_payload() -> Value {
    json!({
        "Body": {
            "stkCallback": {
                "MerchantRequestID": "29115-34620561-1",
                "CheckoutRequestID": "ws_CO_191220191020363925",
                "ResultCode": 0,
                "ResultDesc": "The service request is processed successfully.",
                "CallbackMetadata": {
                    "Item": [
                        {"Name": "Amount", "Value": 1.00},
                        {"Name": "MpesaReceiptNumber", "Value": "NLJ7RT61SV"},
                        {"Name": "TransactionDate", "Value": 20191219102115u64},
                        {"Name": "PhoneNumber", "Value": 254708374149u64}
                    ]
                }
            }
        }
    })
}

/// C2B confirmation notification.
pub fn c2b_confirmation_payload() -> Value {
    json!({
        "TransactionType": "Pay Bill",
        "TransID": "RKTQDM7W6S",
        "TransTime": "20191122063845",
        "TransAmount": "10",
        "BusinessShortCode": "600638",
        "BillRefNumber": "254708374149",
        "InvoiceNumber": "",
        "OrgAccountBalance": "49197.00",
        "ThirdPartyTransID": "",
        "MSISDN": "2547 ***** 126",
        "FirstName": "John",
        "MiddleName": "",
        "LastName": "Doe"
    })
}

/// Successful B2C result. `ReferenceItem` is a bare object, as the gateway
/// sends it when there is a single item.
pub fn b2c_result_payload() -> Value {
    json!({
        "Result": {
            "ResultType": 0,
            "ResultCode": 0,
            "ResultDesc": "The service request is processed successfully.",
            "OriginatorConversationID": "10571-7910404-1",
            "ConversationID": "AG_20191219_00004e48cf7e3533f581",
            "TransactionID": "NLJ41HAY6Q",
            "ResultParameters": {
                "ResultParameter": [
                    {"Key": "TransactionAmount", "Value": 10},
                    {"Key": "TransactionReceipt", "Value": "NLJ41HAY6Q"},
                    {"Key": "B2CRecipientIsRegisteredCustomer", "Value": "Y"},
                    {"Key": "B2CChargesPaidAccountAvailableFunds", "Value": -4510.00},
                    {"Key": "ReceiverPartyPublicName", "Value": "254708374149 - John Doe"},
                    {"Key": "TransactionCompletedDateTime", "Value": "19.12.2019 11:45:50"},
                    {"Key": "B2CUtilityAccountAvailableFunds", "Value": 10116.00},
                    {"Key": "B2CWorkingAccountAvailableFunds", "Value": 900000.00}
                ]
            },
            "ReferenceData": {
                "ReferenceItem": {
                    "Key": "QueueTimeoutURL",
                    "Value": "https://internalsandbox.safaricom.co.ke/mpesa/b2cresults/v1/submit"
                }
            }
        }
    })
}

/// Successful transaction status result.
pub fn transaction_status_payload() -> Value {
    json!({
        "Result": {
            "ResultType": 0,
            "ResultCode": 0,
            "ResultDesc": "The service request is processed successfully.",
            "OriginatorConversationID": "10816-694520-2",
            "ConversationID": "AG_20200120_0000657265d5fa9ae5c0",
            "TransactionID": "OAK0000000",
            "ResultParameters": {
                "ResultParameter": [
                    {"Key": "DebitPartyName", "Value": "600310 - Safaricom333"},
                    {"Key": "CreditPartyName", "Value": "254708374149 - John Doe"},
                    {"Key": "OriginatorConversationID", "Value": "3211-416020-3"},
                    {"Key": "InitiatedTime", "Value": 20200120164825u64},
                    {"Key": "DebitAccountType", "Value": "Utility Account"},
                    {"Key": "DebitPartyCharges", "Value": ""},
                    {"Key": "TransactionReason"},
                    {"Key": "ReasonType", "Value": "Business Payment to Customer via API"},
                    {"Key": "TransactionStatus", "Value": "Completed"},
                    {"Key": "FinalisedTime", "Value": 20200120164825u64},
                    {"Key": "Amount", "Value": 10},
                    {"Key": "ConversationID", "Value": "AG_20200120_000049d7ff4e8f5b56aa"},
                    {"Key": "ReceiptNo", "Value": "OAK0000000"}
                ]
            },
            "ReferenceData": {
                "ReferenceItem": {"Key": "Occasion", "Value": "Test"}
            }
        }
    })
}

/// Successful reversal result.
pub fn reversal_result_payload() -> Value {
    json!({
        "Result": {
            "ResultType": 0,
            "ResultCode": 0,
            "ResultDesc": "The service request is processed successfully.",
            "OriginatorConversationID": "10819-695089-1",
            "ConversationID": "AG_20191219_00004e48cf7e3533f581",
            "TransactionID": "NLJ11HAY8V",
            "ResultParameters": {
                "ResultParameter": [
                    {"Key": "DebitAccountBalance", "Value": "Utility Account|KES|51661.00|51661.00|0.00|0.00"},
                    {"Key": "Amount", "Value": 100},
                    {"Key": "TransCompletedTime", "Value": 20191219121547u64},
                    {"Key": "OriginalTransactionID", "Value": "NLJ41HAY6Q"},
                    {"Key": "Charge", "Value": 0},
                    {"Key": "CreditPartyPublicName", "Value": "254708374149 - John Doe"},
                    {"Key": "DebitPartyPublicName", "Value": "600310 - Safaricom333"}
                ]
            },
            "ReferenceData": {
                "ReferenceItem": {
                    "Key": "QueueTimeoutURL",
                    "Value": "https://internalsandbox.safaricom.co.ke/mpesa/reversalresults/v1/submit"
                }
            }
        }
    })
}
