//! Tests for the response classifier

use super::*;
use crate::error::{ApiError, Error, ErrorKind};
use crate::http::RawResponse;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

const JSON: Option<&str> = Some("application/json");

fn json_response(status: u16, body: serde_json::Value) -> RawResponse {
    RawResponse::new(status, JSON, body.to_string())
}

fn classify_err(response: &RawResponse, endpoint: &str) -> ApiError {
    classify(response, endpoint).unwrap_err()
}

// ============================================================================
// Success
// ============================================================================

#[test_case(200 ; "ok")]
#[test_case(201 ; "created")]
#[test_case(202 ; "accepted")]
fn test_success_returns_decoded_body(status: u16) {
    let body = json!({"response": {"results": [], "remaining": 0}});
    let payload = classify(&json_response(status, body.clone()), "user").unwrap();

    assert_eq!(payload, Payload::Json(body));
}

#[test]
fn test_no_content() {
    let payload = classify(&RawResponse::new(204, None, ""), "user").unwrap();
    assert_eq!(payload, Payload::NoContent);
}

#[test]
fn test_non_json_success_is_text() {
    let payload = classify(&RawResponse::new(200, Some("text/plain"), "hello"), "user").unwrap();
    assert_eq!(payload, Payload::Text("hello".to_string()));
}

#[test]
fn test_invalid_json_falls_back_to_text() {
    let payload = classify(&RawResponse::new(200, JSON, "{not json"), "user").unwrap();
    assert_eq!(payload, Payload::Text("{not json".to_string()));
}

// ============================================================================
// Status Mapping
// ============================================================================

#[test_case(400, ErrorKind::BadRequest)]
#[test_case(401, ErrorKind::Unauthorized)]
#[test_case(403, ErrorKind::Forbidden)]
#[test_case(404, ErrorKind::NotFound)]
#[test_case(405, ErrorKind::MethodNotAllowed)]
#[test_case(406, ErrorKind::NotAcceptable)]
#[test_case(409, ErrorKind::Conflict)]
#[test_case(410, ErrorKind::Gone)]
#[test_case(411, ErrorKind::LengthRequired)]
#[test_case(412, ErrorKind::PreconditionFailed)]
#[test_case(413, ErrorKind::RequestEntityTooLarge)]
#[test_case(415, ErrorKind::UnsupportedMediaType)]
#[test_case(416, ErrorKind::RequestedRangeNotSatisfiable)]
#[test_case(422, ErrorKind::UnprocessableEntity)]
#[test_case(429, ErrorKind::TooManyRequests)]
#[test_case(500, ErrorKind::InternalServerError)]
#[test_case(501, ErrorKind::NotImplemented)]
#[test_case(503, ErrorKind::ServiceUnavailable)]
#[test_case(504, ErrorKind::GatewayTimeout)]
#[test_case(507, ErrorKind::InsufficientStorage)]
#[test_case(509, ErrorKind::BandwidthLimitExceeded)]
#[test_case(418, ErrorKind::UnknownError ; "teapot is unmapped")]
#[test_case(502, ErrorKind::UnknownError ; "bad gateway is unmapped")]
#[test_case(302, ErrorKind::UnknownError ; "redirect is unmapped")]
fn test_status_maps_to_kind(status: u16, kind: ErrorKind) {
    let err = classify_err(&json_response(status, json!({"body": {"message": "boom"}})), "user");

    assert_eq!(err.kind, kind);
    assert_eq!(err.endpoint, "user");
}

// ============================================================================
// Messages
// ============================================================================

#[test]
fn test_generic_message_uses_body_message() {
    let response = json_response(
        400,
        json!({"statusCode": 400, "body": {"status": "INVALID_DATA", "message": "Bad constraint"}}),
    );
    let err = classify_err(&response, "user");

    assert_eq!(err.message, "Calling endpoint user failed. Error: Bad constraint");
    assert_eq!(
        err.body,
        Some(json!({"statusCode": 400, "body": {"status": "INVALID_DATA", "message": "Bad constraint"}}))
    );
}

#[test]
fn test_generic_message_truncates_and_flattens() {
    let long = format!("line one\nline two {}", "x".repeat(200));
    let response = RawResponse::new(500, Some("text/plain"), long.clone());
    let err = classify_err(&response, "order");

    let expected: String = long.chars().take(100).collect::<String>().replace('\n', " ");
    assert_eq!(err.message, format!("Calling endpoint order failed. Error: {expected}"));
    assert!(!err.message.contains('\n'));
    assert_eq!(err.body, Some(serde_json::Value::String(long)));
}

#[test]
fn test_generic_message_truncates_body_message() {
    let response = json_response(422, json!({"body": {"message": "é".repeat(150)}}));
    let err = classify_err(&response, "user");

    assert_eq!(
        err.message,
        format!("Calling endpoint user failed. Error: {}", "é".repeat(100))
    );
}

#[test]
fn test_generic_message_without_body_message_uses_raw_body() {
    let response = json_response(409, json!({"error": "conflict"}));
    let err = classify_err(&response, "user");

    assert_eq!(
        err.message,
        r#"Calling endpoint user failed. Error: {"error":"conflict"}"#
    );
}

#[test]
fn test_unauthorized_omits_body() {
    let response = json_response(401, json!({"body": {"message": "token abc123 is invalid"}}));
    let err = classify_err(&response, "user");

    assert_eq!(err.kind, ErrorKind::Unauthorized);
    assert!(!err.message.contains("abc123"));
    assert!(err.message.starts_with("Calling endpoint user failed."));
}

#[test]
fn test_not_found_with_endpoint_in_message() {
    let response = json_response(404, json!({"body": {"message": "Resource users not found"}}));
    let err = classify_err(&response, "users");

    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(
        err.message,
        "Endpoint users was not found, check the resource name field"
    );
}

#[test]
fn test_not_found_without_endpoint_in_message() {
    let response = json_response(404, json!({"body": {"message": "Resource not found"}}));
    let err = classify_err(&response, "users");

    assert_eq!(
        err.message,
        "Error when calling endpoint users: Resource not found. Check the API URL configuration."
    );
}

#[test]
fn test_not_found_tolerates_odd_status_fields() {
    let response = json_response(
        404,
        json!({"statusCode": "404", "body": {"status": 404, "message": "Type users not found"}}),
    );
    let err = classify_err(&response, "users");

    assert_eq!(
        err.message,
        "Endpoint users was not found, check the resource name field"
    );
}

#[test_case(json!({"body": {"message": ""}}) ; "empty")]
#[test_case(json!({"body": {"message": "  "}}) ; "blank")]
#[test_case(json!({"body": {"message": null}}) ; "null")]
fn test_not_found_blank_message_falls_back(body: serde_json::Value) {
    let err = classify_err(&json_response(404, body), "users");

    assert_eq!(
        err.message,
        "Error when calling endpoint users: Not found. Check the API URL configuration."
    );
}

#[test]
fn test_not_found_plain_text() {
    let response = RawResponse::new(404, Some("text/html"), "<html>nope</html>");
    let err = classify_err(&response, "users");

    assert_eq!(
        err.message,
        "Error when calling endpoint users: Not found. Check the API URL configuration."
    );
}

// ============================================================================
// Outcome
// ============================================================================

#[test]
fn test_classify_outcome_passes_payload() {
    let payload = classify_outcome(Ok(json_response(200, json!({"a": 1}))), "user").unwrap();
    assert_eq!(payload, Payload::Json(json!({"a": 1})));
}

#[test]
fn test_classify_outcome_wraps_api_error() {
    let err = classify_outcome(Ok(json_response(503, json!({}))), "user").unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::ServiceUnavailable));
}

#[test]
fn test_classify_outcome_passes_other_errors() {
    let err = classify_outcome(Err(Error::config("bad")), "user").unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

#[test]
fn test_error_body_from_value() {
    let value = json!({"statusCode": 404, "body": {"message": "x"}});
    let body = ErrorBody::from_value(&value).unwrap();
    assert_eq!(body.status_code, Some(json!(404)));
    assert_eq!(body.message(), Some("x"));

    let lenient = ErrorBody::from_value(&json!({"statusCode": "404", "body": {"message": "x"}}));
    assert_eq!(lenient.unwrap().message(), Some("x"));

    assert!(ErrorBody::from_value(&json!("text")).is_none());
    assert_eq!(ErrorBody::from_value(&json!({})).unwrap().message(), None);
}
