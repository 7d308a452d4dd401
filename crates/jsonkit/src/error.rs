use std::fmt;

/// Why a request body could not be decoded.
///
/// Every variant's `Display` text is safe to show to API clients.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The body is not well-formed JSON. `offset` is the zero-based byte offset.
    #[error("body contains badly-formed JSON (at character {offset})")]
    MalformedSyntax { offset: usize },

    /// The body ended in the middle of a JSON value.
    #[error("body contains badly-formed JSON (unexpected end of input)")]
    UnexpectedEof,

    /// A JSON value has the wrong type for the target.
    #[error("body contains incorrect JSON type {0}")]
    TypeMismatch(TypeMismatchAt),

    #[error("body must not be empty")]
    EmptyBody,

    /// The body has a key the target does not know, and unknown keys are not tolerated.
    #[error("body contains unknown key \"{0}\"")]
    UnknownKey(String),

    #[error("body must not be larger than {max} bytes")]
    BodyTooLarge { max: usize },

    /// The caller handed over a destination that cannot be decoded into.
    #[error("invalid decode target: {0}")]
    InvalidDecodeTarget(String),

    #[error("body must contain only one JSON value")]
    MultipleValues,

    /// Unclassified failure; the underlying message is passed through unchanged.
    #[error("{0}")]
    Other(String),
}

/// Where a type mismatch was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeMismatchAt {
    /// Dotted path of the offending field, e.g. `address.city` or `tags[2]`.
    Field(String),
    /// Zero-based byte offset, used when no field path is available.
    Offset(usize),
}

impl fmt::Display for TypeMismatchAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeMismatchAt::Field(field) => write!(f, "for field \"{field}\""),
            TypeMismatchAt::Offset(offset) => write!(f, "(at character {offset})"),
        }
    }
}

/// Why a response could not be written.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// The payload could not be rendered as JSON. Nothing was written.
    #[error("failed to serialize response body: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The underlying stream failed. The status line and headers may already be out.
    #[error("failed to write response: {0}")]
    Write(#[from] std::io::Error),
}

pub type DecodeResult<T> = Result<T, DecodeError>;

pub type EncodeResult<T> = Result<T, EncodeError>;
