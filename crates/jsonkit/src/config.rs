use serde::Deserialize;

/// Body size used when [`CodecConfig::max_body_size`] is `0` (1 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Codec configuration, fixed for the lifetime of a [`JsonCodec`](crate::JsonCodec).
///
/// Deserializable so the owning application can embed it in its own config.
/// Missing keys fall back to the defaults below.
///
/// | Field                  | Default               |
/// |------------------------|-----------------------|
/// | `max_body_size`        | `0` (means 1 MiB)     |
/// | `allow_unknown_fields` | `false`               |
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Maximum request body size in bytes. `0` selects [`DEFAULT_MAX_BODY_SIZE`].
    pub max_body_size: usize,
    /// Accept object keys that the decode target does not consume.
    pub allow_unknown_fields: bool,
}

impl CodecConfig {
    pub fn with_max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }

    pub fn with_allow_unknown_fields(mut self, allow: bool) -> Self {
        self.allow_unknown_fields = allow;
        self
    }

    /// The cap actually enforced: the configured size, or the default when unset.
    pub fn effective_max_body_size(&self) -> usize {
        if self.max_body_size > 0 {
            self.max_body_size
        } else {
            DEFAULT_MAX_BODY_SIZE
        }
    }
}
