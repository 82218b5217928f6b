//! Callback parsing against payloads shaped like the gateway's sandbox posts.

use chrono::{NaiveDate, NaiveDateTime};
use daraja::callback::{
    parse_payload, value_by_key, B2cResult, C2bNotification, C2bRejection, CallbackResponse,
    QueueTimeoutNotification, ReversalResult, StkCallback, TransactionStatusResult,
};
use daraja::DarajaError;
use daraja_test_utils::{
    b2c_result_payload, c2b_confirmation_payload, reversal_result_payload, stk_callback_payload,
    transaction_status_payload,
};
use serde_json::json;

fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, s))
        .unwrap()
}

#[test]
fn test_stk_callback_from_raw_body() {
    let raw = stk_callback_payload().to_string();
    let payload = parse_payload(&raw).unwrap();
    let callback = StkCallback::parse(&payload).unwrap();

    assert!(callback.is_success());
    assert_eq!(callback.checkout_request_id, "ws_CO_191220191020363925");
    assert_eq!(callback.amount, Some(1.0));
    assert_eq!(callback.mpesa_receipt_number.as_deref(), Some("NLJ7RT61SV"));
    assert_eq!(callback.phone_number.as_deref(), Some("254708374149"));
    assert_eq!(callback.balance, None);
    assert_eq!(
        callback.transaction_time(),
        Some(at(2019, 12, 19, 10, 21, 15))
    );
}

#[test]
fn test_stk_callback_rejects_other_payloads() {
    let err = StkCallback::parse(&b2c_result_payload()).unwrap_err();
    assert!(matches!(err, DarajaError::CallbackShape(_)));
}

#[test]
fn test_c2b_confirmation() {
    let notification = C2bNotification::parse(&c2b_confirmation_payload()).unwrap();

    assert_eq!(notification.trans_id, "RKTQDM7W6S");
    assert_eq!(notification.transaction_type.as_deref(), Some("Pay Bill"));
    assert_eq!(notification.amount(), Some(10.0));
    assert_eq!(notification.invoice_number.as_deref(), Some(""));
    assert_eq!(
        notification.transaction_time(),
        Some(at(2019, 11, 22, 6, 38, 45))
    );
}

#[test]
fn test_b2c_result_with_single_reference_item() {
    let result = B2cResult::parse(&b2c_result_payload()).unwrap();

    assert!(result.envelope.is_success());
    assert_eq!(result.envelope.transaction_id.as_deref(), Some("NLJ41HAY6Q"));
    assert_eq!(result.transaction_receipt.as_deref(), Some("NLJ41HAY6Q"));
    assert_eq!(result.transaction_amount, Some(10.0));
    assert_eq!(result.charges_paid_account_available_funds, Some(-4510.0));
    assert_eq!(result.working_account_available_funds, Some(900000.0));
    assert_eq!(result.recipient_is_registered_customer, Some(true));
    assert_eq!(
        result.queue_timeout_url.as_deref(),
        Some("https://internalsandbox.safaricom.co.ke/mpesa/b2cresults/v1/submit")
    );
}

#[test]
fn test_transaction_status_result() {
    let result = TransactionStatusResult::parse(&transaction_status_payload()).unwrap();

    assert_eq!(result.receipt_no.as_deref(), Some("OAK0000000"));
    assert_eq!(result.transaction_status.as_deref(), Some("Completed"));
    assert_eq!(result.initiated_time.as_deref(), Some("20200120164825"));
    assert_eq!(result.amount, Some(10.0));
    // entry without a Value
    assert_eq!(result.transaction_reason, None);
    assert_eq!(result.debit_party_charges.as_deref(), Some(""));
    assert_eq!(result.occasion.as_deref(), Some("Test"));
}

#[test]
fn test_reversal_result() {
    let result = ReversalResult::parse(&reversal_result_payload()).unwrap();

    assert_eq!(result.original_transaction_id.as_deref(), Some("NLJ41HAY6Q"));
    assert_eq!(result.amount, Some(100.0));
    assert_eq!(result.charge, Some(0.0));
    assert_eq!(result.trans_completed_time.as_deref(), Some("20191219121547"));
    assert_eq!(
        result.debit_account_balance.as_deref(),
        Some("Utility Account|KES|51661.00|51661.00|0.00|0.00")
    );
}

#[test]
fn test_queue_timeout_notification() {
    let payload = json!({
        "Result": {
            "ResultType": 1,
            "ResultCode": "1037",
            "ResultDesc": "DS timeout user cannot be reached",
            "OriginatorConversationID": "5118-111210482-1",
            "ConversationID": "AG_20230420_2010759fd5662ef6d054"
        }
    });
    let notification = QueueTimeoutNotification::parse(&payload).unwrap();

    assert!(!notification.is_success());
    assert_eq!(notification.result_code, 1037);
    assert_eq!(notification.parameter("TransactionAmount"), None);
    assert_eq!(
        CallbackResponse::timeout_received().to_json()["ResultCode"],
        json!("0")
    );
}

#[test]
fn test_raw_lookup_on_result_parameters() {
    let payload = b2c_result_payload();
    let parameters = &payload["Result"]["ResultParameters"];

    assert_eq!(
        value_by_key(parameters, "ReceiverPartyPublicName"),
        Some(&json!("254708374149 - John Doe"))
    );
    assert_eq!(value_by_key(parameters, "Missing"), None);
}

#[test]
fn test_c2b_validation_responses() {
    let accepted = CallbackResponse::c2b_validation_accepted("1234567890").to_json();
    assert_eq!(
        accepted,
        json!({"ResultCode": "0", "ResultDesc": "Accepted", "ThirdPartyTransID": "1234567890"})
    );

    let rejected =
        CallbackResponse::c2b_validation_rejected(C2bRejection::InvalidAccountNumber).to_json();
    assert_eq!(rejected, json!({"ResultCode": "C2B00012", "ResultDesc": "Rejected"}));
    assert_eq!(
        C2bRejection::from_code("C2B00012"),
        C2bRejection::InvalidAccountNumber
    );
}

#[test]
fn test_malformed_body() {
    assert!(matches!(
        parse_payload("not json"),
        Err(DarajaError::CallbackShape(_))
    ));
}
