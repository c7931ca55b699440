//! Error types for the message codec layer
//!
//! Follows a strict taxonomy: format errors (malformed text or LLSD input),
//! precondition violations (short buffers, misaligned bit cursors, degenerate
//! quaternions) and protocol-shape mismatches (wrong dynamic value type for an
//! expected slot). Checksum mismatches are deliberately NOT an error anywhere
//! in this crate; checksums are written on encode and read-but-ignored on
//! decode, matching legacy viewer traffic.

use thiserror::Error;

/// Errors raised by the binary packet codecs and the bit packer.
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    #[error("buffer underrun: needed {needed} bytes at offset {offset}, {remaining} remaining")]
    ShortBuffer {
        needed: usize,
        offset: usize,
        remaining: usize,
    },

    #[error("repeated section has {count} entries, protocol limit is 255")]
    RepeatOverflow { count: usize },

    #[error("bit cursor not byte aligned (bit offset {bit})")]
    BitAlignment { bit: usize },

    #[error("bit field width {width} out of range (1..=32)")]
    BitWidth { width: usize },

    #[error("degenerate quaternion: squared norm {norm_sq} too close to zero")]
    DegenerateQuaternion { norm_sq: f64 },

    #[error("string field is {len} bytes, limit is {limit}")]
    StringTooLong { len: usize, limit: usize },

    #[error("message decode failed: {reason}")]
    MessageDecode { reason: String },

    #[error("message encode failed: {reason}")]
    MessageEncode { reason: String },

    #[error("unknown message number {number}")]
    UnknownMessage { number: u16 },
}

pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised by explicit value coercions and text parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("cannot parse {input:?} as {target}")]
    ParseFailed { target: &'static str, input: String },

    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

pub type ValueResult<T> = Result<T, ValueError>;

/// Errors raised by the LLSD-XML and LLSD-Binary codecs.
#[derive(Debug, Error)]
pub enum LlsdError {
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("missing <llsd> document root")]
    MissingRoot,

    #[error("unexpected element <{0}>")]
    UnexpectedElement(String),

    #[error("unexpected end of document")]
    UnexpectedEof,

    #[error("malformed {kind} payload: {reason}")]
    MalformedScalar { kind: &'static str, reason: String },

    #[error("unknown binary marker 0x{0:02X}")]
    UnknownMarker(u8),

    #[error("binary document truncated at offset {0}")]
    Truncated(usize),

    #[error("map key expected")]
    KeyExpected,
}

/// Errors crossing the capability (HTTP) boundary. Each maps to a status code.
#[derive(Debug, Error)]
pub enum CapError {
    #[error("request body is not an LLSD map")]
    BadRequest,

    #[error("unsupported content type: {0}")]
    UnsupportedMediaType(String),

    #[error("missing required key: {0}")]
    MissingKey(&'static str),

    #[error("llsd parse failed: {0}")]
    Llsd(#[from] LlsdError),

    #[error("internal service failure: {reason}")]
    Internal { reason: String },
}

impl CapError {
    /// HTTP status the excluded transport layer should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            CapError::BadRequest | CapError::MissingKey(_) | CapError::Llsd(_) => 400,
            CapError::UnsupportedMediaType(_) => 415,
            CapError::Internal { .. } => 500,
        }
    }
}
