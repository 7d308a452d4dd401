//! Request body decoding.
//!
//! [`JsonCodec::decode_body`] reads at most the configured number of bytes,
//! decodes exactly one JSON value into the target type and turns every
//! failure into a single [`DecodeError`]. When several conditions could
//! apply, the first of these wins: malformed syntax, unexpected end of input,
//! type mismatch, empty body, unknown key, body too large, invalid decode
//! target, anything else.

use std::io::{self, BufReader, Read};

use serde::de::DeserializeOwned;
use serde_json::error::Category;
use serde_json::Value;

use crate::config::CodecConfig;
use crate::error::{DecodeError, DecodeResult, TypeMismatchAt};
use crate::limit::BoundedReader;

/// Stateless JSON body codec. Cheap to clone and safe to share across requests.
#[derive(Debug, Clone, Default)]
pub struct JsonCodec {
    config: CodecConfig,
}

impl JsonCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// The enforced body cap in bytes.
    pub fn max_body_size(&self) -> usize {
        self.config.effective_max_body_size()
    }

    /// Decode exactly one JSON value from `body` into a `T`.
    ///
    /// Unless unknown fields are allowed, any object key that `T` does not
    /// consume fails the call with [`DecodeError::UnknownKey`]. Anything but
    /// whitespace after the first value fails with
    /// [`DecodeError::MultipleValues`].
    pub fn decode_body<T, R>(&self, body: R) -> DecodeResult<T>
    where
        T: DeserializeOwned,
        R: Read,
    {
        let mut input = TrackedInput::new(BoundedReader::new(body, self.max_body_size()));
        let mut unknown_key: Option<String> = None;

        let outcome = {
            let mut record = |path: serde_ignored::Path<'_>| {
                if unknown_key.is_none() {
                    unknown_key = Some(path.to_string());
                }
            };
            let mut de = serde_json::Deserializer::from_reader(&mut input);
            let decoded = {
                let tracked = serde_ignored::Deserializer::new(&mut de, &mut record);
                serde_path_to_error::deserialize::<_, T>(tracked)
            };
            decoded.map(|value| (value, de.end().is_ok()))
        };

        match outcome {
            Ok((value, only_value)) => {
                if !self.config.allow_unknown_fields {
                    if let Some(key) = unknown_key {
                        return Err(DecodeError::UnknownKey(key));
                    }
                }
                if !only_value {
                    return Err(DecodeError::MultipleValues);
                }
                Ok(value)
            }
            Err(err) => match (classify(err, &input), unknown_key) {
                // In strict mode an unknown key outranks a passthrough error.
                (DecodeError::Other(_), Some(key)) if !self.config.allow_unknown_fields => {
                    Err(DecodeError::UnknownKey(key))
                }
                (err, _) => Err(err),
            },
        }
    }

    /// Decode into an existing value. `target` is only overwritten on success.
    pub fn decode_body_into<T, R>(&self, body: R, target: &mut T) -> DecodeResult<()>
    where
        T: DeserializeOwned,
        R: Read,
    {
        *target = self.decode_body(body)?;
        Ok(())
    }

    /// Decode one JSON value and store it at `pointer` (RFC 6901) inside `document`.
    ///
    /// The pointer must name a location that already exists; otherwise the
    /// call fails with [`DecodeError::InvalidDecodeTarget`]. Body errors are
    /// reported first.
    pub fn decode_body_at<R: Read>(
        &self,
        body: R,
        document: &mut Value,
        pointer: &str,
    ) -> DecodeResult<()> {
        let value: Value = self.decode_body(body)?;
        let slot = document.pointer_mut(pointer).ok_or_else(|| {
            DecodeError::InvalidDecodeTarget(format!("no value at JSON pointer \"{pointer}\""))
        })?;
        *slot = value;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

fn classify<R: Read>(
    err: serde_path_to_error::Error<serde_json::Error>,
    input: &TrackedInput<R>,
) -> DecodeError {
    let has_path = err.path().iter().next().is_some();
    let path = err.path().to_string();
    let inner = err.into_inner();
    let offset = || input.offset_of(inner.line(), inner.column());

    match inner.classify() {
        Category::Syntax => DecodeError::MalformedSyntax { offset: offset() },
        Category::Eof if input.saw_content() => DecodeError::UnexpectedEof,
        Category::Data if is_type_mismatch(&inner) => {
            if has_path {
                DecodeError::TypeMismatch(TypeMismatchAt::Field(path))
            } else {
                DecodeError::TypeMismatch(TypeMismatchAt::Offset(offset()))
            }
        }
        Category::Eof => DecodeError::EmptyBody,
        Category::Data => match denied_field(&inner) {
            // The rejected key is already the last segment of the path.
            Some(_) if has_path => DecodeError::UnknownKey(path),
            Some(key) => DecodeError::UnknownKey(key),
            None => DecodeError::Other(inner.to_string()),
        },
        Category::Io if input.limit_exceeded() => DecodeError::BodyTooLarge {
            max: input.limit(),
        },
        Category::Io => DecodeError::Other(inner.to_string()),
    }
}

/// serde reports type errors as data errors; only the message tells them apart.
fn is_type_mismatch(err: &serde_json::Error) -> bool {
    let message = err.to_string();
    ["invalid type:", "invalid value:", "invalid length"]
        .iter()
        .any(|prefix| message.starts_with(prefix))
}

/// Key named by a `#[serde(deny_unknown_fields)]` rejection.
fn denied_field(err: &serde_json::Error) -> Option<String> {
    let message = err.to_string();
    let rest = message.strip_prefix("unknown field `")?;
    let end = rest.find('`')?;
    Some(rest[..end].to_string())
}

// ---------------------------------------------------------------------------
// Input tracking
// ---------------------------------------------------------------------------

/// Records what the parser has consumed so errors can be reported as byte
/// offsets and an all-whitespace body can be told apart from a truncated one.
struct TrackedInput<R> {
    inner: BufReader<BoundedReader<R>>,
    consumed: usize,
    line: usize,
    line_start: usize,
    saw_content: bool,
}

impl<R: Read> TrackedInput<R> {
    fn new(reader: BoundedReader<R>) -> Self {
        Self {
            inner: BufReader::new(reader),
            consumed: 0,
            line: 1,
            line_start: 0,
            saw_content: false,
        }
    }

    fn saw_content(&self) -> bool {
        self.saw_content
    }

    fn limit(&self) -> usize {
        self.inner.get_ref().limit()
    }

    fn limit_exceeded(&self) -> bool {
        self.inner.get_ref().limit_exceeded()
    }

    /// Convert serde_json's 1-based line and column into a zero-based byte offset.
    ///
    /// Errors are raised at the current read position, so only the line being
    /// read is tracked. Column 0 means the failing byte was the newline that
    /// ended the previous line.
    fn offset_of(&self, line: usize, column: usize) -> usize {
        if line != self.line {
            return self.consumed.saturating_sub(1);
        }
        match column {
            0 => self.line_start.saturating_sub(1),
            n => self.line_start + n - 1,
        }
    }
}

impl<R: Read> Read for TrackedInput<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        for (i, byte) in buf[..n].iter().enumerate() {
            match byte {
                b'\n' => {
                    self.line += 1;
                    self.line_start = self.consumed + i + 1;
                }
                b' ' | b'\t' | b'\r' => {}
                _ => self.saw_content = true,
            }
        }
        self.consumed += n;
        Ok(n)
    }
}
