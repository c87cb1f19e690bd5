// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Binary wire codec primitives.
//!
//! The generic codec walks a structure's declared field list and calls
//! into the per-type primitives here. Every builtin type implements
//! [`UaEncodable`]:
//!
//! - [`byte_length`](UaEncodable::byte_length): the exact wire size,
//!   used to pre-size buffers before encoding
//! - [`encode`](UaEncodable::encode): writes at a cursor position
//! - [`decode`](UaEncodable::decode): reads at a cursor position
//!
//! The wire format is the standard little-endian binary encoding:
//! length-prefixed strings and byte sequences, compact node-id forms,
//! mask-byte optional fields, and recursive variant/extension-object
//! bodies. Decoding of recursive containers is depth-bounded.

mod binary;
mod cursor;

pub use cursor::{ReadCursor, WriteCursor};

use crate::error::UaError;

/// Defensive bound on nested container decoding.
pub const MAX_DECODE_DEPTH: usize = 64;

// =============================================================================
// UaEncodable
// =============================================================================

/// Binary wire encoding of a builtin type.
pub trait UaEncodable: Sized {
    /// Returns the exact encoded size in bytes.
    fn byte_length(&self) -> usize;

    /// Encodes the value at the cursor position.
    ///
    /// # Errors
    ///
    /// Fails if the buffer is too small or the value cannot be
    /// serialized.
    fn encode(&self, cursor: &mut WriteCursor<'_>) -> Result<(), UaError>;

    /// Decodes a value at the cursor position.
    ///
    /// # Errors
    ///
    /// Fails on truncated, malformed, or over-deep input.
    fn decode(cursor: &mut ReadCursor<'_>) -> Result<Self, UaError>;
}

/// Encodes a value into a freshly allocated, exactly-sized buffer.
///
/// # Errors
///
/// Fails if the value cannot be serialized.
pub fn encode_to_vec<T: UaEncodable>(value: &T) -> Result<Vec<u8>, UaError> {
    let mut buffer = vec![0u8; value.byte_length()];
    let mut cursor = WriteCursor::new(&mut buffer);
    value.encode(&mut cursor)?;
    Ok(buffer)
}

/// Decodes a value from the start of a byte slice.
///
/// # Errors
///
/// Fails on truncated or malformed input.
pub fn decode_from_slice<T: UaEncodable>(data: &[u8]) -> Result<T, UaError> {
    let mut cursor = ReadCursor::new(data);
    T::decode(&mut cursor)
}
