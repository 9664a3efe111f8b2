use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value as JsonValue;

use crate::{Payload, PrintessError, Request, Response, Result};

/// Encodes a request body as JSON.
///
/// `null`, `{}` and `[]` encode to no body at all, so such requests go out
/// without a `Content-Type` header.
pub(crate) fn encode_body<B>(data: &B) -> Result<Option<String>>
where
    B: Serialize + ?Sized,
{
    let value = serde_json::to_value(data).map_err(|err| {
        PrintessError::InvalidRequest(format!("Error encoding parameters into JSON: '{err}'."))
    })?;

    let empty = match &value {
        JsonValue::Null => true,
        JsonValue::Object(map) => map.is_empty(),
        JsonValue::Array(items) => items.is_empty(),
        _ => false,
    };
    if empty {
        return Ok(None);
    }

    Ok(Some(value.to_string()))
}

/// Maps a successful payload onto a typed resource.
///
/// Failures keep `request` and `response` for diagnostics, like every other
/// decode error.
pub(crate) fn decode_resource<T>(
    payload: Payload,
    resource: &str,
    request: &Request,
    response: &Response,
) -> Result<T>
where
    T: DeserializeOwned,
{
    let value = payload.into_json().ok_or_else(|| {
        PrintessError::decode(
            "No response body found",
            format!("expected a {resource} resource"),
            Some(request),
            Some(response),
        )
    })?;
    serde_json::from_value(value).map_err(|err| {
        PrintessError::decode(
            "Unable to decode response",
            format!("invalid {resource} resource: {err}"),
            Some(request),
            Some(response),
        )
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::{decode_resource, encode_body};
    use crate::{ErrorKind, Method, Payload, Request, Response};

    fn exchange() -> (Request, Response) {
        (
            Request::new(Method::Post, "https://api.printess.com/production/produce")
                .with_body(r#"{"templateName":"poster_p"}"#),
            Response::new(200, r#"{"orderId":"o1"}"#),
        )
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Job {
        #[serde(rename = "jobId")]
        job_id: String,
    }

    #[test]
    fn empty_containers_encode_to_no_body() {
        assert_eq!(encode_body(&json!({})).expect("encodes"), None);
        assert_eq!(encode_body(&json!([])).expect("encodes"), None);
        assert_eq!(encode_body(&()).expect("encodes"), None);
    }

    #[test]
    fn body_round_trips_through_json() {
        let input = json!({
            "templateName": "poster_p",
            "outputSettings": { "dpi": 150 },
            "outputFiles": [{ "documentName": "poster_p" }]
        });
        let encoded = encode_body(&input).expect("encodes").expect("has body");
        let decoded: serde_json::Value = serde_json::from_str(&encoded).expect("valid json");
        assert_eq!(decoded, input);
    }

    #[test]
    fn typed_resource_is_decoded() {
        let (request, response) = exchange();
        let job: Job = decode_resource(
            Payload::Json(json!({"jobId": "j1", "extra": 1})),
            "job",
            &request,
            &response,
        )
        .expect("decodes");
        assert_eq!(job.job_id, "j1");
    }

    #[test]
    fn no_content_is_not_a_resource() {
        let (request, response) = exchange();
        let err = decode_resource::<Job>(Payload::NoContent, "job", &request, &response)
            .expect_err("must fail");
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn shape_mismatch_keeps_exchange_for_diagnostics() {
        let (request, response) = exchange();
        let err = decode_resource::<Job>(
            Payload::Json(json!({"orderId": "o1"})),
            "job",
            &request,
            &response,
        )
        .expect_err("must fail");
        let api = err.api_error().expect("decode error must carry details");

        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(api.http_status(), 200);
        assert_eq!(api.response(), Some(&response));
        assert!(err.to_string().contains("invalid job resource"));
        assert!(err
            .to_string()
            .ends_with(r#". Request body: {"templateName":"poster_p"}"#));
    }
}
