//! axum integration.
//!
//! [`StrictJson`] is a drop-in replacement for `axum::Json` on the request
//! side that runs the body through [`JsonCodec::decode_body`], so handlers
//! get the same error classification as any other caller. Rejections and
//! [`JsonResponse`] values are rendered through [`write_error`] and
//! [`write_envelope`].

use axum::extract::{FromRef, FromRequest, Request};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::decode::JsonCodec;
use crate::envelope::{write_envelope, write_error};
use crate::error::{DecodeError, EncodeError};
use crate::writer::ResponseRecorder;

// ---------------------------------------------------------------------------
// Request side
// ---------------------------------------------------------------------------

/// JSON body extractor backed by the [`JsonCodec`] found in router state.
///
/// ```ignore
/// async fn create(StrictJson(input): StrictJson<CreateWidget>) -> impl IntoResponse {
///     JsonResponse::new(StatusCode::CREATED, input)
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictJson<T>(pub T);

impl<T, S> FromRequest<S> for StrictJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
    JsonCodec: FromRef<S>,
{
    type Rejection = JsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let codec = JsonCodec::from_ref(state);
        let max = codec.max_body_size();

        // One byte of headroom so the codec itself sees and reports the overflow.
        let collected = Limited::new(req.into_body(), max.saturating_add(1))
            .collect()
            .await;
        let bytes = match collected {
            Ok(collected) => collected.to_bytes(),
            Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
                return Err(DecodeError::BodyTooLarge { max }.into());
            }
            Err(err) => return Err(DecodeError::Other(err.to_string()).into()),
        };

        let value = codec.decode_body(&bytes[..])?;
        Ok(StrictJson(value))
    }
}

/// Failure produced by the axum integration.
#[derive(Debug, thiserror::Error)]
pub enum JsonRejection {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

impl JsonRejection {
    /// HTTP status used when this rejection is turned into a response.
    ///
    /// - `BodyTooLarge` maps to 413.
    /// - `InvalidDecodeTarget` and encode failures are server bugs and map to 500.
    /// - Every other decode error maps to 400.
    pub fn status(&self) -> StatusCode {
        match self {
            JsonRejection::Decode(DecodeError::BodyTooLarge { .. }) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            JsonRejection::Decode(DecodeError::InvalidDecodeTarget(_))
            | JsonRejection::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            JsonRejection::Decode(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for JsonRejection {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Internal JSON codec error");
            "An internal error occurred".to_string()
        } else {
            tracing::debug!(error = %self, status = %status, "Rejected JSON request body");
            self.to_string()
        };

        let mut recorder = ResponseRecorder::new();
        match write_error(&mut recorder, &message, Some(status)) {
            Ok(()) => recorder.into_response(),
            Err(err) => {
                tracing::error!(error = %err, "Failed to render error envelope");
                status.into_response()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Response side
// ---------------------------------------------------------------------------

/// A JSON response written through [`write_envelope`].
#[derive(Debug, Clone)]
pub struct JsonResponse<T> {
    pub status: StatusCode,
    pub data: T,
    pub headers: Option<HeaderMap>,
}

impl<T> JsonResponse<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        Self {
            status,
            data,
            headers: None,
        }
    }

    pub fn ok(data: T) -> Self {
        Self::new(StatusCode::OK, data)
    }

    /// Extra headers; each key replaces any value already set on the response.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = Some(headers);
        self
    }
}

impl<T: Serialize> IntoResponse for JsonResponse<T> {
    fn into_response(self) -> Response {
        let mut recorder = ResponseRecorder::new();
        match write_envelope(
            &mut recorder,
            self.status,
            &self.data,
            self.headers.as_ref(),
        ) {
            Ok(()) => recorder.into_response(),
            Err(err) => JsonRejection::from(err).into_response(),
        }
    }
}
