//! JSON response writing and the shared `{ error, message, data }` envelope.

use std::fmt;

use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EncodeResult;
use crate::writer::ResponseWriter;

/// Uniform response wrapper. `data` is omitted from the JSON when `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    pub error: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            error: false,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl Envelope {
    /// An `error: true` envelope carrying only a message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            data: None,
        }
    }
}

/// Serialize `data` and write it as a JSON response.
///
/// Every key in `headers` replaces all existing values for that key on the
/// writer. `Content-Type` is always forced to `application/json`.
///
/// Nothing is written when serialization fails. A failed body write is
/// returned as [`EncodeError::Write`](crate::EncodeError::Write); by then the
/// head has already been sent.
pub fn write_envelope<W, T>(
    writer: &mut W,
    status: StatusCode,
    data: &T,
    headers: Option<&HeaderMap>,
) -> EncodeResult<()>
where
    W: ResponseWriter + ?Sized,
    T: Serialize + ?Sized,
{
    let body = serde_json::to_vec(data)?;

    let target = writer.headers_mut();
    if let Some(extra) = headers {
        for name in extra.keys() {
            target.remove(name);
            for value in extra.get_all(name) {
                target.append(name.clone(), value.clone());
            }
        }
    }
    target.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    target.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));

    writer.write_head(status)?;
    if let Err(err) = writer.write_body(&body) {
        tracing::warn!(error = %err, status = %status, "Failed to write response body");
        return Err(err.into());
    }
    Ok(())
}

/// Write `err` as an error envelope. `status` defaults to `400 Bad Request`.
pub fn write_error<W, E>(writer: &mut W, err: &E, status: Option<StatusCode>) -> EncodeResult<()>
where
    W: ResponseWriter + ?Sized,
    E: fmt::Display + ?Sized,
{
    let envelope = Envelope::failure(err.to_string());
    write_envelope(
        writer,
        status.unwrap_or(StatusCode::BAD_REQUEST),
        &envelope,
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_envelope_omits_data() {
        let json = serde_json::to_value(Envelope::failure("nope")).unwrap();
        assert_eq!(json, serde_json::json!({ "error": true, "message": "nope" }));
    }

    #[test]
    fn test_success_envelope_carries_data() {
        let json = serde_json::to_value(Envelope::success("ok", vec![1, 2])).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "error": false, "message": "ok", "data": [1, 2] })
        );
    }
}
