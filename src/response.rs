use serde_json::Value as JsonValue;

use crate::{wire::ErrorEnvelope, PrintessError, Request, Response, Result};

/// HTTP status of an empty successful response.
pub const HTTP_NO_CONTENT: u16 = 204;

/// Successful outcome of an API call.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// `204 No Content` with an empty body.
    NoContent,
    Json(JsonValue),
}

impl Payload {
    pub fn into_json(self) -> Option<JsonValue> {
        match self {
            Self::NoContent => None,
            Self::Json(value) => Some(value),
        }
    }

    pub fn is_no_content(&self) -> bool {
        matches!(self, Self::NoContent)
    }
}

/// Turns a buffered response into a payload or a classified error.
///
/// An empty body is only valid for `204`. Bodies are decoded strictly as
/// JSON before the status is looked at, so an error status with a non-JSON
/// body surfaces as a decode error.
pub fn parse_response(response: &Response, request: &Request) -> Result<Payload> {
    let body = response.body();
    if body.is_empty() {
        if response.status() == HTTP_NO_CONTENT {
            return Ok(Payload::NoContent);
        }
        return Err(PrintessError::decode(
            "No response body found",
            String::new(),
            Some(request),
            Some(response),
        ));
    }

    let value = serde_json::from_slice::<JsonValue>(body).map_err(|_| {
        PrintessError::decode(
            "Unable to decode response",
            response.body_text(),
            Some(request),
            Some(response),
        )
    })?;

    if response.status() >= 400 {
        let envelope = serde_json::from_value::<ErrorEnvelope>(value).map_err(|err| {
            PrintessError::decode(
                "Unable to decode error response",
                format!("{err}; body: {}", response.body_text()),
                Some(request),
                Some(response),
            )
        })?;
        return Err(PrintessError::api(envelope, request, response));
    }

    Ok(Payload::Json(value))
}
