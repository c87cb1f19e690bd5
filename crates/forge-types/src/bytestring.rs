// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Immutable byte sequence value.
//!
//! A [`ByteString`] owns its bytes outright: construction from a borrowed
//! slice copies, and no accessor hands out a mutable view, so no
//! caller-held buffer ever aliases stored state. The empty value is the
//! canonical null.
//!
//! # Ordering
//!
//! `ByteString` orders lexicographically over its *rendered* lowercase
//! hex form, not over the raw bytes. This matches the long-documented
//! behavior of the comparison ("best effort" per the original notes) and
//! is deliberately preserved rather than corrected.
//!
//! # Examples
//!
//! ```
//! use forge_types::bytestring::ByteString;
//!
//! let mut source = vec![1u8, 2, 3];
//! let bs = ByteString::from_slice(&source);
//! source[0] = 9;
//! assert_eq!(bs.as_slice(), &[1, 2, 3]);
//! ```

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// ByteString
// =============================================================================

/// An immutable, owned byte sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ByteString {
    data: Vec<u8>,
}

impl ByteString {
    /// The shared empty value; also the canonical null.
    pub const EMPTY: ByteString = ByteString { data: Vec::new() };

    /// Creates a byte string taking ownership of `data`.
    #[inline]
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Creates a byte string by copying `data`.
    #[inline]
    pub fn from_slice(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    /// Returns the stored bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Returns an owned copy of the stored bytes.
    #[inline]
    pub fn to_vec(&self) -> Vec<u8> {
        self.data.clone()
    }

    /// Consumes the value and returns the stored bytes.
    #[inline]
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Returns the number of bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the sequence is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if this is the canonical null (empty) value.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.data.is_empty()
    }

    /// Renders the bytes as lowercase hex.
    pub fn to_hex(&self) -> String {
        use fmt::Write;

        let mut out = String::with_capacity(self.data.len() * 2);
        for b in &self.data {
            // Infallible for String.
            let _ = write!(out, "{:02x}", b);
        }
        out
    }
}

impl Ord for ByteString {
    /// Orders by the rendered hex form, not the raw bytes.
    ///
    /// Documented quirk; see the module docs.
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_hex().cmp(&other.to_hex())
    }
}

impl PartialOrd for ByteString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<Vec<u8>> for ByteString {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&[u8]> for ByteString {
    fn from(data: &[u8]) -> Self {
        Self::from_slice(data)
    }
}

impl AsRef<[u8]> for ByteString {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

// =============================================================================
// Tests
// =============================================================================
