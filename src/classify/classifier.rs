//! Status-to-error classification

use super::types::{ErrorBody, Payload};
use crate::error::{ApiError, Error, ErrorKind, Result};
use crate::http::RawResponse;
use tracing::debug;

/// Number of characters of the server message kept in error messages
pub const MAX_DETAIL_CHARS: usize = 100;

/// Classify a completed response
///
/// Returns the decoded payload for 2xx successes, or the typed error the
/// status maps to.
pub fn classify(response: &RawResponse, endpoint: &str) -> std::result::Result<Payload, ApiError> {
    match response.status {
        200..=202 => Ok(decode_body(response)),
        204 => Ok(Payload::NoContent),
        status => {
            let kind = ErrorKind::from_status(status);
            debug!("Endpoint {endpoint} answered {status}, classified as {kind}");
            Err(build_error(kind, endpoint, response))
        }
    }
}

/// Classify the outcome of a transport call
///
/// A connection failure that survived every retry becomes a
/// `TransportError`; any other failure is passed through untouched.
pub fn classify_outcome(outcome: Result<RawResponse>, endpoint: &str) -> Result<Payload> {
    match outcome {
        Ok(response) => classify(&response, endpoint).map_err(Error::from),
        Err(Error::Http(e)) => Err(ApiError::transport(endpoint, e).into()),
        Err(other) => Err(other),
    }
}

/// Decode the body as JSON if it was declared as such, text otherwise
fn decode_body(response: &RawResponse) -> Payload {
    if response.is_json() {
        if let Ok(value) = serde_json::from_str(&response.body) {
            return Payload::Json(value);
        }
        debug!("Body declared as JSON but failed to parse, keeping it as text");
    }
    Payload::Text(response.body.clone())
}

fn build_error(kind: ErrorKind, endpoint: &str, response: &RawResponse) -> ApiError {
    let raw = decode_body(response).into_raw_value();
    let error_body = raw.as_ref().and_then(ErrorBody::from_value);
    let server_message = error_body.as_ref().and_then(ErrorBody::message);

    let message = match kind {
        // The body may echo credentials, keep it out of the message
        ErrorKind::Unauthorized => format!(
            "Calling endpoint {endpoint} failed. The API token was rejected, check the token configuration."
        ),
        ErrorKind::NotFound => match server_message {
            Some(msg) if msg.contains(endpoint) => {
                format!("Endpoint {endpoint} was not found, check the resource name field")
            }
            other => format!(
                "Error when calling endpoint {endpoint}: {}. Check the API URL configuration.",
                other.unwrap_or("Not found")
            ),
        },
        _ => {
            let detail = summarize(server_message.unwrap_or(response.body.as_str()));
            format!("Calling endpoint {endpoint} failed. Error: {detail}")
        }
    };

    ApiError::new(kind, endpoint, message, raw)
}

/// First [`MAX_DETAIL_CHARS`] characters with line breaks flattened
fn summarize(text: &str) -> String {
    let head: String = text.chars().take(MAX_DETAIL_CHARS).collect();
    head.replace("\r\n", " ").replace(['\n', '\r'], " ")
}
