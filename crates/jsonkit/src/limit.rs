//! Size-capped reader for request bodies.
//!
//! [`BoundedReader`] passes through at most `limit` bytes. Once the budget is
//! spent it probes the source for one more byte: a clean end of stream is
//! reported as EOF, anything else fails with [`LimitExceeded`] and the reader
//! remembers that the cap was hit. The body is never silently truncated.

use std::io::{self, Read};

/// Payload of the `io::Error` returned when a body outgrows its cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("body exceeds the {limit} byte limit")]
pub struct LimitExceeded {
    pub limit: usize,
}

/// A [`Read`] adapter that fails once more than `limit` bytes are requested.
#[derive(Debug)]
pub struct BoundedReader<R> {
    inner: R,
    limit: usize,
    remaining: usize,
    exceeded: bool,
}

impl<R: Read> BoundedReader<R> {
    pub fn new(inner: R, limit: usize) -> Self {
        Self {
            inner,
            limit,
            remaining: limit,
            exceeded: false,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Whether a read has already run into the cap.
    pub fn limit_exceeded(&self) -> bool {
        self.exceeded
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn exceeded_error(&self) -> io::Error {
        io::Error::other(LimitExceeded { limit: self.limit })
    }
}

impl<R: Read> Read for BoundedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.exceeded {
            return Err(self.exceeded_error());
        }
        if buf.is_empty() {
            return Ok(0);
        }

        if self.remaining == 0 {
            let mut probe = [0u8; 1];
            return match self.inner.read(&mut probe)? {
                0 => Ok(0),
                _ => {
                    self.exceeded = true;
                    Err(self.exceeded_error())
                }
            };
        }

        let want = buf.len().min(self.remaining);
        let n = self.inner.read(&mut buf[..want])?;
        self.remaining -= n;
        Ok(n)
    }
}
