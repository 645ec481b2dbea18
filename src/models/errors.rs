use thiserror::Error;

/// Errors raised while building a decoder from signatures or fragments.
/// These are fatal: a decoder is never constructed from a malformed input.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("invalid type name: {name}")]
    InvalidType { name: String },
    #[error("unbalanced grouping in signature: {signature}")]
    UnbalancedGrouping { signature: String },
    #[error("malformed signature: {reason}")]
    MalformedSignature { reason: String },
    #[error("malformed parameter '{param}': {reason}")]
    MalformedParameter { param: String, reason: String },
}

/// Errors local to decoding a single record. Batch operations catch these
/// and report the failed position as `None` instead of propagating.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("buffer truncated: need {need} bytes at offset {offset}, region holds {len}")]
    Truncated {
        need: usize,
        offset: usize,
        len: usize,
    },
    #[error("dynamic offset {offset} points outside region of {len} bytes")]
    OffsetOutOfBounds { offset: usize, len: usize },
    #[error("length prefix {declared} exceeds {remaining} remaining bytes")]
    LengthOutOfBounds { declared: usize, remaining: usize },
    #[error("expected {expected} topics for indexed parameters, log has {got}")]
    TopicCountMismatch { expected: usize, got: usize },
    #[error("missing required field in record: {field}")]
    MissingField { field: String },
    #[error("invalid hex in record field {field}")]
    InvalidHex { field: String },
    #[error("no registered signature matches the selector")]
    NoMatchingSignature,
}

/// Errors on stream and height watch handles.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("operation on a closed handle")]
    Closed,
}
