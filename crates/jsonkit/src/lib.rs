//! JSON request/response helpers for HTTP handlers.
//!
//! Decodes a size-capped request body into a typed target with precise,
//! user-facing error messages, and writes JSON responses (optionally wrapped
//! in the `{ "error", "message", "data" }` envelope) through any
//! [`ResponseWriter`]. The [`extract`] module plugs both halves into axum.

pub mod config;
pub mod decode;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod limit;
pub mod writer;

pub use config::CodecConfig;
pub use decode::JsonCodec;
pub use envelope::{write_envelope, write_error, Envelope};
pub use error::{DecodeError, DecodeResult, EncodeError, EncodeResult, TypeMismatchAt};
pub use extract::{JsonRejection, JsonResponse, StrictJson};
pub use limit::BoundedReader;
pub use writer::{ResponseRecorder, ResponseWriter, StreamWriter};
