//! Response sinks for [`write_envelope`](crate::write_envelope).
//!
//! A [`ResponseWriter`] takes headers, then a status, then body bytes.
//! [`ResponseRecorder`] keeps everything in memory and converts into an axum
//! response; [`StreamWriter`] puts HTTP/1.1 bytes straight onto a stream.

use std::io::{self, Write};

use axum::body::Body;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;

/// Destination for a single HTTP response.
pub trait ResponseWriter {
    /// Headers that will be sent with the head. Changes after
    /// [`write_head`](Self::write_head) have no effect.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Send the status line and headers. Only the first call counts.
    fn write_head(&mut self, status: StatusCode) -> io::Result<()>;

    /// Send body bytes, writing a `200 OK` head first if none was written.
    fn write_body(&mut self, body: &[u8]) -> io::Result<()>;
}

// ---------------------------------------------------------------------------
// In-memory recorder
// ---------------------------------------------------------------------------

/// Buffers a response in memory.
#[derive(Debug, Default)]
pub struct ResponseRecorder {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ResponseRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The written status, or `200 OK` if no head has been written yet.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_response(self) -> Response {
        let status = self.status();
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl ResponseWriter for ResponseRecorder {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_head(&mut self, status: StatusCode) -> io::Result<()> {
        match self.status {
            Some(current) => {
                tracing::warn!(%current, ignored = %status, "Response head already written");
            }
            None => self.status = Some(status),
        }
        Ok(())
    }

    fn write_body(&mut self, body: &[u8]) -> io::Result<()> {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body.extend_from_slice(body);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Raw HTTP/1.1 stream writer
// ---------------------------------------------------------------------------

/// Writes an HTTP/1.1 response directly to a byte stream.
///
/// The head goes out as soon as [`write_head`](ResponseWriter::write_head)
/// is called, so a later body failure cannot take it back.
#[derive(Debug)]
pub struct StreamWriter<W> {
    inner: W,
    headers: HeaderMap,
    head_written: bool,
}

impl<W: Write> StreamWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            headers: HeaderMap::new(),
            head_written: false,
        }
    }

    pub fn head_written(&self) -> bool {
        self.head_written
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> ResponseWriter for StreamWriter<W> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_head(&mut self, status: StatusCode) -> io::Result<()> {
        if self.head_written {
            return Ok(());
        }

        let mut head = format!(
            "HTTP/1.1 {} {}\r\n",
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        )
        .into_bytes();
        for (name, value) in &self.headers {
            head.extend_from_slice(name.as_str().as_bytes());
            head.extend_from_slice(b": ");
            head.extend_from_slice(value.as_bytes());
            head.extend_from_slice(b"\r\n");
        }
        head.extend_from_slice(b"\r\n");

        self.head_written = true;
        self.inner.write_all(&head)
    }

    fn write_body(&mut self, body: &[u8]) -> io::Result<()> {
        if !self.head_written {
            self.write_head(StatusCode::OK)?;
        }
        self.inner.write_all(body)?;
        self.inner.flush()
    }
}
