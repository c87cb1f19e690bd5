// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Unified error hierarchy for the FORGE type layer.
//!
//! Every failure in this crate is local and synchronous: it is surfaced to
//! the immediate caller and there is no retry or recovery policy below the
//! service layer. The hierarchy mirrors the four failure classes of the
//! type system:
//!
//! ```text
//! UaError (root)
//! ├── Validation    - Construction-time rejection (range, size, shape)
//! ├── Parse         - Malformed canonical text forms
//! ├── TypeMismatch  - Operations on incompatible value kinds
//! └── Encoding      - Binary/XML encode and decode failures
//! ```
//!
//! # Examples
//!
//! ```
//! use forge_types::error::{UaError, ValidationError};
//!
//! let error: UaError = ValidationError::value_overflow("UInt8", "256").into();
//! assert!(error.status_code().is_bad());
//! ```

use std::fmt;

use thiserror::Error;
use tracing::Level;

use crate::status::StatusCode;

/// Convenience alias used throughout the crate.
pub type UaResult<T> = Result<T, UaError>;

// =============================================================================
// UaError - Root Error Type
// =============================================================================

/// The root error type for the FORGE type layer.
#[derive(Debug, Error)]
pub enum UaError {
    /// Construction or validation rejection.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Malformed canonical text form.
    #[error("{0}")]
    Parse(#[from] ParseError),

    /// Operation on incompatible value kinds.
    #[error("{0}")]
    TypeMismatch(#[from] TypeMismatchError),

    /// Encode or decode failure.
    #[error("{0}")]
    Encoding(#[from] EncodingError),
}

impl UaError {
    /// Returns the status code a service layer would report for this
    /// error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            UaError::Validation(e) => e.status_code(),
            UaError::Parse(_) => StatusCode::BAD_DECODING_ERROR,
            UaError::TypeMismatch(_) => StatusCode::BAD_TYPE_MISMATCH,
            UaError::Encoding(e) => e.status_code(),
        }
    }

    /// Returns the log level appropriate for this error.
    ///
    /// Validation and parse failures are caller mistakes and log at
    /// `DEBUG`; decode failures may indicate a misbehaving peer and log
    /// at `WARN`.
    pub fn log_level(&self) -> Level {
        match self {
            UaError::Validation(_) | UaError::Parse(_) | UaError::TypeMismatch(_) => Level::DEBUG,
            UaError::Encoding(_) => Level::WARN,
        }
    }
}

// =============================================================================
// ValidationError
// =============================================================================

/// Construction-time validation failures.
///
/// These are always rejected at construction and never silently clamped.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// An identifier payload exceeds the allowed size.
    #[error("{kind} identifier of {actual} units exceeds the {limit}-unit limit")]
    OversizedIdentifier {
        /// Identifier kind ("String" or "Opaque").
        kind: &'static str,
        /// Actual payload size.
        actual: usize,
        /// Maximum allowed size.
        limit: usize,
    },

    /// A numeric magnitude does not fit the target width.
    #[error("value {value} out of range for {target}")]
    ValueOverflow {
        /// The target type name.
        target: &'static str,
        /// The offending value, rendered.
        value: String,
    },

    /// Arithmetic underflow below zero.
    #[error("{target} arithmetic underflow: {detail}")]
    Underflow {
        /// The target type name.
        target: &'static str,
        /// Description of the failing operation.
        detail: String,
    },

    /// Arithmetic overflow above the maximum.
    #[error("{target} arithmetic overflow: {detail}")]
    Overflow {
        /// The target type name.
        target: &'static str,
        /// Description of the failing operation.
        detail: String,
    },

    /// An array fails the rectangularity requirement.
    #[error("ragged array: dimensions {dimensions:?} require {expected} elements, found {actual}")]
    RaggedArray {
        /// Declared dimensions.
        dimensions: Vec<u32>,
        /// Element count the dimensions require.
        expected: usize,
        /// Element count actually supplied.
        actual: usize,
    },

    /// An array mixes element kinds.
    #[error("mixed-kind array: expected {expected} elements, found {actual}")]
    MixedArray {
        /// The declared element kind.
        expected: &'static str,
        /// The offending element kind.
        actual: &'static str,
    },

    /// A locale string does not match the `language[-REGION]` subset.
    #[error("invalid locale {locale:?}: {reason}")]
    InvalidLocale {
        /// The offending locale string.
        locale: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl ValidationError {
    /// Creates an oversized-identifier error.
    #[inline]
    pub fn oversized_identifier(kind: &'static str, actual: usize, limit: usize) -> Self {
        Self::OversizedIdentifier { kind, actual, limit }
    }

    /// Creates a value-overflow error.
    #[inline]
    pub fn value_overflow(target: &'static str, value: impl Into<String>) -> Self {
        Self::ValueOverflow {
            target,
            value: value.into(),
        }
    }

    /// Creates an arithmetic-underflow error.
    #[inline]
    pub fn underflow(target: &'static str, detail: impl Into<String>) -> Self {
        Self::Underflow {
            target,
            detail: detail.into(),
        }
    }

    /// Creates an arithmetic-overflow error.
    #[inline]
    pub fn overflow(target: &'static str, detail: impl Into<String>) -> Self {
        Self::Overflow {
            target,
            detail: detail.into(),
        }
    }

    /// Creates an invalid-locale error.
    #[inline]
    pub fn invalid_locale(locale: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidLocale {
            locale: locale.into(),
            reason: reason.into(),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::OversizedIdentifier { .. } => StatusCode::BAD_NODE_ID_INVALID,
            Self::ValueOverflow { .. } | Self::Underflow { .. } | Self::Overflow { .. } => {
                StatusCode::BAD_OUT_OF_RANGE
            }
            Self::RaggedArray { .. } | Self::MixedArray { .. } => StatusCode::BAD_TYPE_MISMATCH,
            Self::InvalidLocale { .. } => StatusCode::BAD_OUT_OF_RANGE,
        }
    }
}

// =============================================================================
// ParseError
// =============================================================================

/// Malformed canonical text forms.
///
/// Every parse error carries the offending input (truncated for display)
/// and a reason, so the caller can locate the problem; parsing never
/// silently defaults.
#[derive(Debug, Error)]
#[error("cannot parse {what} from {input:?}: {reason}")]
pub struct ParseError {
    /// What was being parsed ("NodeId", "locale", "DateTime", ...).
    pub what: &'static str,
    /// The offending input, truncated.
    pub input: String,
    /// Why parsing failed.
    pub reason: String,
}

impl ParseError {
    /// Longest input excerpt carried in an error.
    const MAX_INPUT: usize = 128;

    /// Creates a parse error, truncating over-long input.
    pub fn new(what: &'static str, input: &str, reason: impl Into<String>) -> Self {
        let input = if input.len() > Self::MAX_INPUT {
            let mut end = Self::MAX_INPUT;
            while !input.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", &input[..end])
        } else {
            input.to_string()
        };
        Self {
            what,
            input,
            reason: reason.into(),
        }
    }
}

// =============================================================================
// TypeMismatchError
// =============================================================================

/// Operations applied to incompatible value kinds.
///
/// Raised by `Variant` coercions, comparisons, and enum resolution; never
/// coerced to a default value.
#[derive(Debug, Error)]
#[error("{operation}: expected {expected}, got {actual}")]
pub struct TypeMismatchError {
    /// The operation that failed ("compare", "to_f64", "to_enum", ...).
    pub operation: &'static str,
    /// The kind the operation required.
    pub expected: String,
    /// The kind actually present.
    pub actual: String,
}

impl TypeMismatchError {
    /// Creates a type-mismatch error.
    pub fn new(
        operation: &'static str,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

// =============================================================================
// EncodingError
// =============================================================================

/// Binary/XML encode and decode failures.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// A read ran past the end of the buffer.
    #[error("decode underrun at offset {offset}: need {needed} bytes, {remaining} remaining")]
    BufferUnderrun {
        /// Cursor offset at the failure.
        offset: usize,
        /// Bytes the read required.
        needed: usize,
        /// Bytes remaining in the buffer.
        remaining: usize,
    },

    /// A write ran past the end of the buffer.
    #[error("encode overrun at offset {offset}: need {needed} bytes, {remaining} remaining")]
    BufferOverrun {
        /// Cursor offset at the failure.
        offset: usize,
        /// Bytes the write required.
        needed: usize,
        /// Bytes remaining in the buffer.
        remaining: usize,
    },

    /// A length prefix is negative (other than the -1 null marker) or
    /// impossibly large.
    #[error("invalid length prefix {length} at offset {offset}")]
    InvalidLength {
        /// The decoded length prefix.
        length: i64,
        /// Cursor offset of the prefix.
        offset: usize,
    },

    /// An encoding discriminant byte is not recognized.
    #[error("invalid {what} encoding byte 0x{byte:02X} at offset {offset}")]
    InvalidEncodingByte {
        /// The structure being decoded.
        what: &'static str,
        /// The offending byte.
        byte: u8,
        /// Cursor offset of the byte.
        offset: usize,
    },

    /// Decoded bytes are not valid UTF-8.
    #[error("invalid UTF-8 in {what} at offset {offset}")]
    InvalidUtf8 {
        /// The structure being decoded.
        what: &'static str,
        /// Cursor offset of the string.
        offset: usize,
    },

    /// Recursive decoding exceeded the defensive depth bound.
    #[error("{what} nesting exceeds the depth limit of {limit}")]
    DepthExceeded {
        /// The recursive structure.
        what: &'static str,
        /// The depth limit.
        limit: usize,
    },

    /// A type identifier has no registry entry.
    #[error("no registered type for {type_id}")]
    UnknownType {
        /// The unresolvable type identifier, rendered.
        type_id: String,
    },

    /// The requested target encoding is not supported for the type.
    #[error("unsupported {encoding} encoding for {type_name}")]
    UnsupportedEncoding {
        /// The requested encoding ("xml", "binary").
        encoding: &'static str,
        /// The type that cannot be encoded.
        type_name: String,
    },
}

impl EncodingError {
    /// Creates an unknown-type decode error.
    #[inline]
    pub fn unknown_type(type_id: impl fmt::Display) -> Self {
        Self::UnknownType {
            type_id: type_id.to_string(),
        }
    }

    /// Creates an unsupported-encoding error.
    #[inline]
    pub fn unsupported_encoding(encoding: &'static str, type_name: impl Into<String>) -> Self {
        Self::UnsupportedEncoding {
            encoding,
            type_name: type_name.into(),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::BufferOverrun { .. } | Self::UnsupportedEncoding { .. } => {
                StatusCode::BAD_ENCODING_ERROR
            }
            Self::UnknownType { .. } => StatusCode::BAD_DATA_TYPE_ID_UNKNOWN,
            _ => StatusCode::BAD_DECODING_ERROR,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        let e: UaError = ValidationError::value_overflow("UInt8", "256").into();
        assert_eq!(e.status_code(), StatusCode::BAD_OUT_OF_RANGE);

        let e: UaError = ParseError::new("NodeId", "ns=;i=1", "missing namespace").into();
        assert_eq!(e.status_code(), StatusCode::BAD_DECODING_ERROR);

        let e: UaError = TypeMismatchError::new("to_f64", "numeric", "String").into();
        assert_eq!(e.status_code(), StatusCode::BAD_TYPE_MISMATCH);

        let e: UaError = EncodingError::unknown_type("ns=4;i=99").into();
        assert_eq!(e.status_code(), StatusCode::BAD_DATA_TYPE_ID_UNKNOWN);
    }

    #[test]
    fn test_parse_error_truncates_input() {
        let long = "x".repeat(500);
        let e = ParseError::new("NodeId", &long, "nonsense");
        assert!(e.input.len() <= ParseError::MAX_INPUT + 3);
        assert!(e.input.ends_with("..."));
    }

    #[test]
    fn test_messages_carry_context() {
        let e = ValidationError::oversized_identifier("String", 5000, 4096);
        assert!(e.to_string().contains("5000"));
        assert!(e.to_string().contains("4096"));

        let e = EncodingError::BufferUnderrun {
            offset: 12,
            needed: 4,
            remaining: 1,
        };
        assert!(e.to_string().contains("offset 12"));
    }

    #[test]
    fn test_log_levels() {
        let e: UaError = TypeMismatchError::new("compare", "numeric", "Guid").into();
        assert_eq!(e.log_level(), Level::DEBUG);
        let e: UaError = EncodingError::unknown_type("i=9").into();
        assert_eq!(e.log_level(), Level::WARN);
    }
}
