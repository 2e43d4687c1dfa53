use thiserror::Error;

/// Errors produced by field decode and encode operations.
#[derive(Debug, Error)]
pub enum FieldError {
    /// The raw input held no JSON value at all.
    #[error("empty input: no JSON value to decode as {expected}")]
    Empty { expected: &'static str },

    /// The raw input was neither `null` nor a valid value of the target type.
    #[error("cannot decode {expected}: {source}")]
    Decode {
        expected: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot encode {kind}: {source}")]
    Encode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl FieldError {
    /// Returns `true` for failures raised while decoding.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Empty { .. } | Self::Decode { .. })
    }
}

pub type FieldResult<T> = Result<T, FieldError>;
